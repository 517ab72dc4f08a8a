use std::path::PathBuf;
use thiserror::Error;

/// Reportable failures of the browser core.
///
/// Expected absences (a class that is on no classpath entry, a class file
/// outside a standard package layout) are not errors and come back as `None`.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("malformed workspace document: {0}")]
    MalformedSession(String),
    #[error("failed to access workspace file {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid class file: {0}")]
    InvalidClassFile(String),
}

impl BrowserError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedSession(msg.into())
    }

    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }
}
