//! Log setup. The terminal belongs to the UI, so events go to a file.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "matchdeck=info";

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init(log_file: &Path) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(log_file)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matchdeck.log");

        let _ = init(&path);
        let err = init(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert!(path.exists());
    }
}
