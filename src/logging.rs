//! Logging init: file under the XDG state dir, or graceful fallback to stderr.

use std::fs;
use std::io;
use std::path::PathBuf;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Error setting up the log file or installing the subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("cannot prepare log file: {0}")]
    Io(#[from] io::Error),
    #[error("cannot locate XDG state directory: {0}")]
    Xdg(#[from] xdg::BaseDirectoriesError),
    #[error("logging already initialized")]
    AlreadyInitialized,
}

/// Writer that is either the log file or stderr (used when file clone fails).
enum FileOrStderr {
    File(fs::File),
    Stderr,
}

impl io::Write for FileOrStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            FileOrStderr::File(f) => f.write(buf),
            FileOrStderr::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            FileOrStderr::File(f) => f.flush(),
            FileOrStderr::Stderr => io::stderr().lock().flush(),
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,resrc=debug"))
}

/// Initialize structured logging to `resrc.log` under the XDG state
/// directory for this crate (`~/.local/state/resrc/` unless
/// `XDG_STATE_HOME` overrides it). On failure (e.g. log dir unwritable)
/// the caller can fall back to [`init_logging_stderr`].
pub fn init_logging() -> Result<(), LoggingError> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("resrc")?;
    let log_dir = xdg_dirs.get_state_home();

    fs::create_dir_all(&log_dir)?;
    let log_file_path: PathBuf = log_dir.join("resrc.log");

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)?;

    struct FileMakeWriter(fs::File);

    impl<'a> MakeWriter<'a> for FileMakeWriter {
        type Writer = FileOrStderr;

        fn make_writer(&'a self) -> Self::Writer {
            self.0
                .try_clone()
                .map(FileOrStderr::File)
                .unwrap_or(FileOrStderr::Stderr)
        }
    }

    let writer: BoxMakeWriter = BoxMakeWriter::new(FileMakeWriter(file));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)?;

    tracing::info!("resrc logging initialized at {}", log_file_path.display());

    Ok(())
}

/// Initialize logging to stderr only (no file). Safe to call more than once;
/// later calls are no-ops, which keeps test binaries simple.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logging_creates_log_file_under_state_home() {
        let state_home = tempfile::tempdir().unwrap();
        std::env::set_var("XDG_STATE_HOME", state_home.path());

        init_logging().expect("first init");
        let log_path = state_home.path().join("resrc").join("resrc.log");
        assert!(log_path.is_file(), "missing {}", log_path.display());

        // The global subscriber is already installed now.
        match init_logging() {
            Err(LoggingError::AlreadyInitialized) => {}
            other => panic!("expected AlreadyInitialized, got {other:?}"),
        }
    }
}
