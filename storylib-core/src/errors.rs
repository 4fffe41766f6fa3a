use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no {0} directory is available for this user")]
    MissingProfileDir(&'static str),
    #[error("background task failed: {0}")]
    Task(String),
}

impl CoreError {
    /// Classifies an I/O failure on `path` into the not-found / permission / generic buckets.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        match source.kind() {
            io::ErrorKind::NotFound => CoreError::NotFound { path },
            io::ErrorKind::PermissionDenied => CoreError::PermissionDenied { path },
            _ => CoreError::Io { path, source },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::NotFound { .. })
    }
}

impl From<tokio::task::JoinError> for CoreError {
    fn from(e: tokio::task::JoinError) -> Self {
        CoreError::Task(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_io_kinds() {
        let nf = CoreError::io("/x", io::Error::from(io::ErrorKind::NotFound));
        assert!(nf.is_not_found());

        let pd = CoreError::io("/x", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(pd, CoreError::PermissionDenied { .. }));

        let other = CoreError::io("/x", io::Error::new(io::ErrorKind::Other, "disk full"));
        match other {
            CoreError::Io { path, source } => {
                assert_eq!(path, PathBuf::from("/x"));
                assert_eq!(source.to_string(), "disk full");
            }
            e => panic!("unexpected {e:?}"),
        }
    }
}
