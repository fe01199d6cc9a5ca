use serde::{Deserialize, Serialize};

/// One HTTP exchange as handed over by the host proxy.
///
/// Field names follow the host's flow export, so an NDJSON dump of flows
/// deserializes straight into this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    pub request: FlowRequest,
    /// `None` until the upstream response has completed.
    #[serde(default)]
    pub response: Option<FlowResponse>,
}

/// Request half of a flow. Timestamps are seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRequest {
    pub timestamp_start: f64,
    pub timestamp_end: f64,
    pub method: String,
    pub host: String,
    /// Request-target: path plus optional `?query`.
    pub path: String,
}

/// Response half of a flow. Timestamps are seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowResponse {
    pub timestamp_start: f64,
    pub timestamp_end: f64,
    pub status_code: u16,
}

impl Flow {
    pub fn new(request: FlowRequest, response: Option<FlowResponse>) -> Self {
        Self { request, response }
    }

    /// True once both the request and the response have completed.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.response.is_some()
    }
}
