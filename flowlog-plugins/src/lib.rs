pub mod logging;

use flowlog_plugin::registry::PluginRegistry;
use std::sync::Arc;

/// Register all built-in plugins.
pub fn register_all(registry: &mut PluginRegistry) {
    // Logging plugins
    registry.register(Arc::new(logging::flow_logger::FlowLoggerPlugin));
}
