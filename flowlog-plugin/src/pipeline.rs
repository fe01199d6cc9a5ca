use crate::plugin::PluginInstance;
use flowlog_core::Flow;
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of handing one flow to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The flow has no response yet; no hook was called.
    Incomplete,
    /// Every hook ran; `failed` of them returned an error.
    Dispatched { failed: usize },
}

/// Pre-built hook pipeline.
///
/// Hooks are sorted by priority at build time and immutable thereafter, so a
/// single `Arc<PluginPipeline>` can be shared by every host worker thread.
pub struct PluginPipeline {
    /// Sorted by priority (descending).
    hooks: Vec<Arc<dyn PluginInstance>>,
}

impl PluginPipeline {
    /// Build a pipeline from a list of plugin instances.
    pub fn build(mut instances: Vec<Arc<dyn PluginInstance>>) -> Self {
        // Sort by priority, higher first
        instances.sort_by(|a, b| b.priority().cmp(&a.priority()));
        Self { hooks: instances }
    }

    /// Run every hook for a completed exchange.
    ///
    /// A failing hook is logged and does not prevent the others from running.
    pub fn dispatch_response(&self, flow: &Flow) -> DispatchOutcome {
        if !flow.is_complete() {
            debug!(
                method = %flow.request.method,
                host = %flow.request.host,
                "Flow has no response, not dispatching"
            );
            return DispatchOutcome::Incomplete;
        }

        let mut failed = 0;
        for hook in &self.hooks {
            if let Err(e) = hook.response(flow) {
                failed += 1;
                warn!(
                    plugin = hook.name(),
                    method = %flow.request.method,
                    host = %flow.request.host,
                    path = %flow.request.path,
                    error = %e,
                    "Response hook failed"
                );
            }
        }
        DispatchOutcome::Dispatched { failed }
    }

    /// Notify every hook that the host is shutting down.
    /// Returns the number of hooks that failed to shut down cleanly.
    pub fn shutdown(&self) -> usize {
        let mut failed = 0;
        for hook in &self.hooks {
            if let Err(e) = hook.done() {
                failed += 1;
                warn!(plugin = hook.name(), error = %e, "Shutdown hook failed");
            }
        }
        failed
    }

    /// Hook names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }

    /// Total number of plugin instances.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}
