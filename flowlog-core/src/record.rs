use crate::error::FlowLogError;
use crate::flow::Flow;
use crate::target::split_target;
use crate::timestamp::{TimeZoneSetting, format_millis, to_millis};

/// Number of fields in one output line.
pub const FIELD_COUNT: usize = 12;

/// Column names, in output order. Only written when a header row is enabled.
pub const FIELD_NAMES: [&str; FIELD_COUNT] = [
    "request_start",
    "request_end",
    "request_duration_ms",
    "method",
    "host",
    "path",
    "query",
    "status_code",
    "response_start",
    "response_end",
    "response_duration_ms",
    "total_duration_ms",
];

/// Timing summary of one completed exchange.
///
/// Built from a [`Flow`], serialized, then dropped. Timestamp ordering is not
/// checked: an end before its start yields a negative duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeRecord {
    pub request_start_ms: i64,
    pub request_end_ms: i64,
    pub response_start_ms: i64,
    pub response_end_ms: i64,
    pub method: String,
    pub host: String,
    pub path: String,
    pub query: String,
    pub status_code: u16,
}

impl ExchangeRecord {
    pub fn from_flow(flow: &Flow) -> Result<Self, FlowLogError> {
        let response = flow.response.as_ref().ok_or_else(|| {
            FlowLogError::IncompleteFlow(format!(
                "{} {}{} has no response",
                flow.request.method, flow.request.host, flow.request.path
            ))
        })?;
        let (path, query) = split_target(&flow.request.path);

        Ok(Self {
            request_start_ms: millis("request.timestamp_start", flow.request.timestamp_start)?,
            request_end_ms: millis("request.timestamp_end", flow.request.timestamp_end)?,
            response_start_ms: millis("response.timestamp_start", response.timestamp_start)?,
            response_end_ms: millis("response.timestamp_end", response.timestamp_end)?,
            method: flow.request.method.clone(),
            host: flow.request.host.clone(),
            path,
            query,
            status_code: response.status_code,
        })
    }

    #[inline]
    pub fn request_duration_ms(&self) -> i64 {
        self.request_end_ms - self.request_start_ms
    }

    #[inline]
    pub fn response_duration_ms(&self) -> i64 {
        self.response_end_ms - self.response_start_ms
    }

    /// From the first request byte to the last response byte.
    #[inline]
    pub fn total_duration_ms(&self) -> i64 {
        self.response_end_ms - self.request_start_ms
    }

    /// The output fields in column order, unescaped.
    pub fn fields(&self, tz: TimeZoneSetting) -> Result<[String; FIELD_COUNT], FlowLogError> {
        let mut buf = itoa::Buffer::new();
        let mut int = |n: i64| buf.format(n).to_string();

        Ok([
            format_millis(self.request_start_ms, tz)?,
            format_millis(self.request_end_ms, tz)?,
            int(self.request_duration_ms()),
            self.method.clone(),
            self.host.clone(),
            self.path.clone(),
            self.query.clone(),
            int(i64::from(self.status_code)),
            format_millis(self.response_start_ms, tz)?,
            format_millis(self.response_end_ms, tz)?,
            int(self.response_duration_ms()),
            int(self.total_duration_ms()),
        ])
    }
}

fn millis(field: &str, seconds: f64) -> Result<i64, FlowLogError> {
    to_millis(seconds).map_err(|e| match e {
        FlowLogError::MalformedTimestamp(msg) => {
            FlowLogError::MalformedTimestamp(format!("{field}: {msg}"))
        }
        other => other,
    })
}
