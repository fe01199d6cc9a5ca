use crate::error::FlowLogError;
use crate::timestamp::TimeZoneSetting;
use figment::{Figment, providers::{Env, Format, Yaml}};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level flowlog configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowLogConfig {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
}

/// Output CSV settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_file_path")]
    pub file_path: PathBuf,
    #[serde(default)]
    pub timezone: TimeZoneSetting,
    /// Write a header row when the file starts out empty.
    #[serde(default)]
    pub header: bool,
    /// Discard existing content on open instead of appending.
    #[serde(default)]
    pub truncate: bool,
}

/// Replay host settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Number of dispatch threads. 0 = number of CPU cores.
    #[serde(default)]
    pub workers: usize,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

// ── Defaults ──────────────────────────────────────────────────

fn default_file_path() -> PathBuf { PathBuf::from("./flow-output.csv") }
fn default_queue_capacity() -> usize { 1024 }

// ── Impls ─────────────────────────────────────────────────────

impl Default for FlowLogConfig {
    fn default() -> Self {
        Self {
            output: OutputConfig::default(),
            replay: ReplayConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_path: default_file_path(),
            timezone: TimeZoneSetting::Local,
            header: false,
            truncate: false,
        }
    }
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl FlowLogConfig {
    /// Load configuration from YAML file + env overrides.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let config: FlowLogConfig = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("FLOWLOG_").split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), FlowLogError> {
        if self.output.file_path.as_os_str().is_empty() {
            return Err(FlowLogError::ConfigError("output.file_path is empty".into()));
        }
        if self.replay.queue_capacity == 0 {
            return Err(FlowLogError::ConfigError(
                "replay.queue_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Effective worker count (0 → available CPUs).
    pub fn effective_workers(&self) -> usize {
        if self.replay.workers == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            self.replay.workers
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // ── Default values ────────────────────────────────────────────

    #[test]
    fn default_output_config_has_expected_values() {
        let cfg = OutputConfig::default();
        assert_eq!(cfg.file_path, PathBuf::from("./flow-output.csv"));
        assert_eq!(cfg.timezone, TimeZoneSetting::Local);
        assert!(!cfg.header);
        assert!(!cfg.truncate);
    }

    #[test]
    fn default_replay_config_has_expected_values() {
        let cfg = ReplayConfig::default();
        assert_eq!(cfg.workers, 0);
        assert_eq!(cfg.queue_capacity, 1024);
    }

    #[test]
    fn default_config_validates() {
        FlowLogConfig::default().validate().unwrap();
    }

    // ── effective_workers() ───────────────────────────────────────

    #[test]
    fn effective_workers_returns_explicit_value_when_nonzero() {
        let mut cfg = FlowLogConfig::default();
        cfg.replay.workers = 4;
        assert_eq!(cfg.effective_workers(), 4);
    }

    #[test]
    fn effective_workers_with_zero_returns_at_least_one() {
        let cfg = FlowLogConfig::default();
        let workers = cfg.effective_workers();
        assert!(workers >= 1, "effective_workers must be at least 1, got {workers}");
    }

    // ── validate() ────────────────────────────────────────────────

    #[test]
    fn zero_queue_capacity_is_rejected() {
        let mut cfg = FlowLogConfig::default();
        cfg.replay.queue_capacity = 0;
        assert!(matches!(cfg.validate(), Err(FlowLogError::ConfigError(_))));
    }

    #[test]
    fn empty_file_path_is_rejected() {
        let mut cfg = FlowLogConfig::default();
        cfg.output.file_path = PathBuf::new();
        assert!(cfg.validate().is_err());
    }

    // ── FlowLogConfig::load() ─────────────────────────────────────

    #[test]
    fn load_from_valid_yaml_overrides_defaults() {
        let mut tmpfile = tempfile::NamedTempFile::new().unwrap();
        write!(
            tmpfile,
            "output:\n  file_path: \"/tmp/flows.csv\"\n  timezone: utc\n  header: true\nreplay:\n  workers: 2\n"
        )
        .unwrap();
        let cfg = FlowLogConfig::load(tmpfile.path()).unwrap();
        assert_eq!(cfg.output.file_path, PathBuf::from("/tmp/flows.csv"));
        assert_eq!(cfg.output.timezone, TimeZoneSetting::Utc);
        assert!(cfg.output.header);
        assert_eq!(cfg.replay.workers, 2);
        // Defaults still apply for unspecified fields
        assert!(!cfg.output.truncate);
        assert_eq!(cfg.replay.queue_capacity, 1024);
    }

    #[test]
    fn load_rejects_unknown_timezone() {
        let mut tmpfile = tempfile::NamedTempFile::new().unwrap();
        write!(tmpfile, "output:\n  timezone: mars\n").unwrap();
        assert!(FlowLogConfig::load(tmpfile.path()).is_err());
    }

    #[test]
    fn load_rejects_invalid_values() {
        let mut tmpfile = tempfile::NamedTempFile::new().unwrap();
        write!(tmpfile, "replay:\n  queue_capacity: 0\n").unwrap();
        assert!(FlowLogConfig::load(tmpfile.path()).is_err());
    }
}
