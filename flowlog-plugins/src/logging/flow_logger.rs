use flowlog_core::config::OutputConfig;
use flowlog_core::{ExchangeRecord, Flow};
use flowlog_observability::FlowFileWriter;
use flowlog_plugin::plugin::{Plugin, PluginInstance};
use std::sync::Arc;

/// Flow logger plugin: appends one timing line per completed exchange.
///
/// Config is an [`OutputConfig`] in JSON form; every key is optional.
pub struct FlowLoggerPlugin;

/// Configured flow logger bound to one output file.
pub struct FlowLogger {
    writer: Arc<FlowFileWriter>,
}

impl FlowLogger {
    /// Bind to a writer the host already owns.
    pub fn new(writer: Arc<FlowFileWriter>) -> Self {
        Self { writer }
    }
}

impl Plugin for FlowLoggerPlugin {
    fn name(&self) -> &str {
        "flow-logger"
    }

    fn configure(&self, config: &serde_json::Value) -> anyhow::Result<Box<dyn PluginInstance>> {
        let cfg: OutputConfig = if config.is_null() {
            OutputConfig::default()
        } else {
            serde_json::from_value(config.clone())?
        };
        let writer = FlowFileWriter::open(&cfg)?;
        Ok(Box::new(FlowLogger::new(Arc::new(writer))))
    }
}

impl PluginInstance for FlowLogger {
    fn name(&self) -> &str {
        "flow-logger"
    }

    fn priority(&self) -> i32 {
        400
    }

    fn response(&self, flow: &Flow) -> anyhow::Result<()> {
        let record = ExchangeRecord::from_flow(flow)?;
        self.writer.write_record(&record)?;
        Ok(())
    }

    fn done(&self) -> anyhow::Result<()> {
        self.writer.close()?;
        Ok(())
    }
}
