use thiserror::Error;

/// Unified error type for flowlog.
#[derive(Error, Debug)]
pub enum FlowLogError {
    #[error("Malformed timestamp: {0}")]
    MalformedTimestamp(String),

    #[error("Incomplete flow: {0}")]
    IncompleteFlow(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Flow writer lock poisoned")]
    WriterPoisoned,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = FlowLogError::from(io);
        assert!(matches!(err, FlowLogError::Io(_)));
        assert_eq!(err.to_string(), "IO error: disk full");
    }

    #[test]
    fn display_includes_detail() {
        let err = FlowLogError::MalformedTimestamp("request.timestamp_start = NaN".into());
        assert_eq!(
            err.to_string(),
            "Malformed timestamp: request.timestamp_start = NaN"
        );
    }
}
