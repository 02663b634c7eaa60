use std::fmt;

/// Errors that can occur during blob storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// No blob exists at the requested path.
    NotFound(String),
    /// An I/O error occurred.
    Io(std::io::Error),
    /// The blob path is structurally invalid.
    InvalidPath(String),
    /// A download URL could not be mapped back to a blob path.
    InvalidUrl(String),
    /// The blob exceeds the configured size limit.
    TooLarge { actual: u64, limit: u64 },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "no blob at {path}"),
            Self::Io(err) => write!(f, "storage IO error: {err}"),
            Self::InvalidPath(msg) => write!(f, "invalid blob path: {msg}"),
            Self::InvalidUrl(msg) => write!(f, "cannot derive blob path from URL: {msg}"),
            Self::TooLarge { actual, limit } => {
                write!(f, "blob exceeds size limit ({actual} > {limit} bytes)")
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
