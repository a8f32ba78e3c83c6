use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Pattern could not be matched")]
    NoMatch,

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("No operator registered for identifier '{0}'")]
    UnknownOperator(String),

    #[error("Malformed operand: {0}")]
    MalformedOperand(String),

    #[error("Offset '{0}' could not be resolved: no definition")]
    UnresolvedOffsetName(String),

    #[error("There is no pattern definition named '{0}'")]
    UnresolvedPatternName(String),

    #[error("Invalid offset document: {0}")]
    InvalidDocument(String),

    #[error("Failed to read memory at address {address:#x}: {message}")]
    MemoryReadFailed { address: u64, message: String },

    #[error("Operation requires a memory reader but none was supplied")]
    MissingMemory,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    /// Check if this error reports a failed single-match search
    pub fn is_no_match(&self) -> bool {
        matches!(self, Error::NoMatch)
    }

    pub(crate) fn read_failed(address: u64, message: impl Into<String>) -> Self {
        Error::MemoryReadFailed {
            address,
            message: message.into(),
        }
    }
}
