//! A `null` plugin config falls back to the default output file.
//!
//! Kept in its own test binary: it changes the process working directory.

use flowlog_core::{Flow, FlowRequest, FlowResponse};
use flowlog_plugin::Plugin;
use flowlog_plugins::logging::flow_logger::FlowLoggerPlugin;
use std::env;
use std::fs;

#[test]
fn test_null_config_writes_default_file_in_cwd() {
    let dir = tempfile::tempdir().unwrap();
    let previous = env::current_dir().unwrap();
    env::set_current_dir(dir.path()).unwrap();

    let result = (|| -> anyhow::Result<()> {
        let logger = FlowLoggerPlugin.configure(&serde_json::Value::Null)?;
        logger.response(&Flow::new(
            FlowRequest {
                timestamp_start: 1.0,
                timestamp_end: 1.5,
                method: "GET".into(),
                host: "example.com".into(),
                path: "/health".into(),
            },
            Some(FlowResponse {
                timestamp_start: 2.0,
                timestamp_end: 2.25,
                status_code: 204,
            }),
        ))?;
        logger.done()?;
        Ok(())
    })();
    env::set_current_dir(previous).unwrap();
    result.unwrap();

    let content = fs::read_to_string(dir.path().join("flow-output.csv")).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains(",GET,example.com,/health,,204,"));
    assert!(lines[0].ends_with(",500,250,1250"));
}
