use crate::core::message::ChatEntry;
use std::error::Error;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DEFAULT_TRACE_FILTER: &str = "deskchat=info";

/// Where diagnostic tracing output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceTarget {
    /// Tracing disabled. Used by the full-screen UI when no trace file is set,
    /// since anything written to the terminal would corrupt the display.
    Off,
    Stderr,
    File(PathBuf),
}

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the default
/// filter.
pub fn init_tracing(target: TraceTarget) -> Result<(), Box<dyn Error>> {
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_TRACE_FILTER))
    };

    let installed = match target {
        TraceTarget::Off => Ok(()),
        TraceTarget::Stderr => tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_writer(std::io::stderr)
            .try_init(),
        TraceTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };

    installed.map_err(|err| err as Box<dyn Error>)
}

const USER_LABEL: &str = "You";

/// Plain-text transcript log the user opts into with `--log`.
pub struct LoggingState {
    file_path: Option<PathBuf>,
}

impl LoggingState {
    pub fn new(log_file: Option<PathBuf>) -> Result<Self, Box<dyn Error>> {
        if let Some(path) = &log_file {
            Self::test_file_access(path)?;
        }

        Ok(LoggingState {
            file_path: log_file,
        })
    }

    pub fn log_entry(&self, entry: &ChatEntry) -> Result<(), Box<dyn Error>> {
        let Some(file_path) = &self.file_path else {
            return Ok(());
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        let mut writer = BufWriter::new(file);

        if entry.is_user() {
            let mut lines = entry.content().lines();
            let first = lines.next().unwrap_or_default();
            writeln!(writer, "{USER_LABEL}: {first}")?;
            for line in lines {
                writeln!(writer, "{line}")?;
            }
        } else {
            for line in entry.content().lines() {
                writeln!(writer, "{line}")?;
            }
        }

        // Blank line between entries, matching the on-screen spacing.
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn get_status_string(&self) -> String {
        match &self.file_path {
            None => "disabled".to_string(),
            Some(path) => format!(
                "active ({})",
                Path::new(path)
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
            ),
        }
    }

    fn test_file_access(path: &Path) -> Result<(), Box<dyn Error>> {
        OpenOptions::new().create(true).append(true).open(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transcript::Transcript;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn inactive_logging_writes_nothing() {
        let logging = LoggingState::new(None).unwrap();
        let mut transcript = Transcript::new();
        let id = transcript.append_user("hello").unwrap();

        logging.log_entry(transcript.get(id).unwrap()).unwrap();
        assert_eq!(logging.get_status_string(), "disabled");
    }

    #[test]
    fn entries_are_appended_with_user_prefix() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let log_path = temp_dir.path().join("chat.log");
        let logging = LoggingState::new(Some(log_path.clone())).unwrap();
        let mut transcript = Transcript::new();

        let user = transcript.append_user("first line\nsecond line").unwrap();
        let reply = transcript.append_assistant("Hi there");
        logging.log_entry(transcript.get(user).unwrap()).unwrap();
        logging.log_entry(transcript.get(reply).unwrap()).unwrap();

        let contents = fs::read_to_string(&log_path).unwrap();
        assert_eq!(contents, "You: first line\nsecond line\n\nHi there\n\n");
        assert_eq!(logging.get_status_string(), "active (chat.log)");
    }

    #[test]
    fn unwritable_log_path_is_reported_up_front() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let bad_path = temp_dir.path().join("missing-dir").join("chat.log");

        assert!(LoggingState::new(Some(bad_path)).is_err());
    }
}
