//! Append-only CSV writer for exchange records.
//!
//! One writer owns the output file for the life of the process. Each record
//! is CSV-encoded in full before the lock is taken, then written with a
//! single `write_all` and flushed, so lines never interleave when several
//! proxy workers log at once.
//!
//! Fields containing a comma, a double quote, CR or LF are quoted and inner
//! quotes doubled. All other fields are written bare.

use flowlog_core::config::OutputConfig;
use flowlog_core::record::FIELD_NAMES;
use flowlog_core::{ExchangeRecord, FlowLogError, TimeZoneSetting};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, info, warn};

// ── Writer ───────────────────────────────────────────────────────────────────

/// The owned output file.
///
/// Call [`FlowFileWriter::write_record`] once per completed exchange and
/// [`FlowFileWriter::close`] on shutdown. Dropping the writer flushes it too.
pub struct FlowFileWriter {
    path: PathBuf,
    timezone: TimeZoneSetting,
    inner: Mutex<WriterState>,
}

struct WriterState {
    /// `None` once closed.
    writer: Option<BufWriter<File>>,
    lines_written: u64,
}

impl FlowFileWriter {
    /// Open (or create) the output file described by `config`.
    pub fn open(config: &OutputConfig) -> Result<Self, FlowLogError> {
        let path = config.file_path.clone();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut options = OpenOptions::new();
        options.create(true);
        if config.truncate {
            options.write(true).truncate(true);
        } else {
            options.append(true);
        }
        let file = options.open(&path)?;
        let existing_len = file.metadata()?.len();

        let mut writer = BufWriter::new(file);
        let mut lines_written = 0;
        if config.header && existing_len == 0 {
            writer.write_all(&encode_line(&FIELD_NAMES)?)?;
            writer.flush()?;
            lines_written += 1;
        }

        info!(
            path = %path.display(),
            timezone = config.timezone.as_str(),
            truncate = config.truncate,
            existing_bytes = existing_len,
            "Flow log file opened"
        );

        Ok(Self {
            path,
            timezone: config.timezone,
            inner: Mutex::new(WriterState {
                writer: Some(writer),
                lines_written,
            }),
        })
    }

    /// Format and append one exchange record.
    pub fn write_record(&self, record: &ExchangeRecord) -> Result<(), FlowLogError> {
        let fields = record.fields(self.timezone)?;
        self.write_fields(&fields)?;
        debug!(
            method = %record.method,
            host = %record.host,
            path = %record.path,
            status = record.status_code,
            total_ms = record.total_duration_ms(),
            "Logged flow"
        );
        Ok(())
    }

    /// Append one CSV line built from `fields`.
    pub fn write_fields<S: AsRef<[u8]>>(&self, fields: &[S]) -> Result<(), FlowLogError> {
        let line = encode_line(fields)?;

        let mut state = self.inner.lock().map_err(|_| FlowLogError::WriterPoisoned)?;
        let writer = state.writer.as_mut().ok_or_else(closed_error)?;
        writer.write_all(&line)?;
        writer.flush()?;
        state.lines_written += 1;
        Ok(())
    }

    /// Flush buffered data to disk.
    pub fn flush(&self) -> Result<(), FlowLogError> {
        let mut state = self.inner.lock().map_err(|_| FlowLogError::WriterPoisoned)?;
        match state.writer.as_mut() {
            Some(writer) => Ok(writer.flush()?),
            None => Err(closed_error().into()),
        }
    }

    /// Flush and close the file. Later writes fail; closing twice is a no-op.
    pub fn close(&self) -> Result<(), FlowLogError> {
        let mut state = self.inner.lock().map_err(|_| FlowLogError::WriterPoisoned)?;
        if let Some(mut writer) = state.writer.take() {
            writer.flush()?;
            writer.get_ref().sync_all()?;
            info!(
                path = %self.path.display(),
                lines = state.lines_written,
                "Flow log file closed"
            );
        }
        Ok(())
    }

    /// Lines written through this writer, header included.
    pub fn lines_written(&self) -> u64 {
        self.inner
            .lock()
            .map(|state| state.lines_written)
            .unwrap_or_default()
    }

    pub fn is_closed(&self) -> bool {
        self.inner
            .lock()
            .map(|state| state.writer.is_none())
            .unwrap_or(true)
    }
}

impl Drop for FlowFileWriter {
    fn drop(&mut self) {
        let state = match self.inner.get_mut() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(writer) = state.writer.as_mut() {
            if let Err(e) = writer.flush() {
                warn!(error = %e, path = %self.path.display(), "Failed to flush flow log on drop");
            }
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// CSV-encode one record, terminated by `\n`.
fn encode_line<S: AsRef<[u8]>>(fields: &[S]) -> Result<Vec<u8>, FlowLogError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::with_capacity(256));
    csv_writer
        .write_record(fields)
        .map_err(|e| FlowLogError::Csv(e.to_string()))?;
    csv_writer
        .into_inner()
        .map_err(|e| FlowLogError::Csv(e.to_string()))
}

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "flow log file already closed")
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn output_config(path: PathBuf) -> OutputConfig {
        OutputConfig {
            file_path: path,
            timezone: TimeZoneSetting::Utc,
            header: false,
            truncate: false,
        }
    }

    fn line(fields: &[&str]) -> String {
        String::from_utf8(encode_line(fields).unwrap()).unwrap()
    }

    #[test]
    fn plain_fields_are_written_bare() {
        assert_eq!(line(&["GET", "example.com", "/api/users", "id=5"]), "GET,example.com,/api/users,id=5\n");
    }

    #[test]
    fn empty_fields_stay_empty() {
        assert_eq!(line(&["/health", "", "200"]), "/health,,200\n");
    }

    #[test]
    fn comma_field_is_quoted() {
        assert_eq!(line(&["/a,b", "x=1,2"]), "\"/a,b\",\"x=1,2\"\n");
    }

    #[test]
    fn quote_field_is_doubled() {
        assert_eq!(line(&["say \"hi\"", "ok"]), "\"say \"\"hi\"\"\",ok\n");
    }

    #[test]
    fn newline_field_is_quoted() {
        assert_eq!(line(&["a\nb", "c"]), "\"a\nb\",c\n");
    }

    #[test]
    fn writer_creates_file_and_writes_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flows.csv");
        let writer = FlowFileWriter::open(&output_config(path.clone())).unwrap();
        writer.write_fields(&["a", "b", "c"]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "a,b,c\n");
        assert_eq!(writer.lines_written(), 1);
    }

    #[test]
    fn writer_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep").join("nested").join("flows.csv");
        let writer = FlowFileWriter::open(&output_config(path.clone())).unwrap();
        writer.write_fields(&["nested-test"]).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn writer_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flows.csv");
        fs::write(&path, "earlier\n").unwrap();

        let writer = FlowFileWriter::open(&output_config(path.clone())).unwrap();
        writer.write_fields(&["later"]).unwrap();
        writer.close().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "earlier\nlater\n");
    }

    #[test]
    fn truncate_discards_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flows.csv");
        fs::write(&path, "earlier\n").unwrap();

        let mut config = output_config(path.clone());
        config.truncate = true;
        let writer = FlowFileWriter::open(&config).unwrap();
        writer.write_fields(&["fresh"]).unwrap();
        writer.close().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "fresh\n");
    }

    #[test]
    fn header_written_only_into_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flows.csv");
        let mut config = output_config(path.clone());
        config.header = true;

        let first = FlowFileWriter::open(&config).unwrap();
        assert_eq!(first.lines_written(), 1);
        first.write_fields(&["row"]).unwrap();
        first.close().unwrap();

        // Reopening a non-empty file must not repeat the header.
        let second = FlowFileWriter::open(&config).unwrap();
        assert_eq!(second.lines_written(), 0);
        second.close().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("request_start,request_end,"));
        assert_eq!(lines[1], "row");
    }

    #[test]
    fn close_is_idempotent_and_blocks_writes() {
        let dir = tempfile::tempdir().unwrap();
        let writer = FlowFileWriter::open(&output_config(dir.path().join("flows.csv"))).unwrap();
        writer.close().unwrap();
        writer.close().unwrap();
        assert!(writer.is_closed());

        let err = writer.write_fields(&["too late"]).unwrap_err();
        assert!(matches!(err, FlowLogError::Io(_)));
        assert!(writer.flush().is_err());
    }

    #[test]
    fn drop_flushes_pending_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flows.csv");
        {
            let writer = FlowFileWriter::open(&output_config(path.clone())).unwrap();
            writer.write_fields(&["kept"]).unwrap();
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), "kept\n");
    }

    #[test]
    fn open_fails_when_path_is_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FlowFileWriter::open(&output_config(dir.path().to_path_buf())).is_err());
    }
}
