use thiserror::Error;

/// Errors produced while identifying ROM files and disc images.
#[derive(Debug, Error)]
pub enum IdentError {
    /// I/O error while reading the input
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The data does not match the format being parsed
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// The header is present but structurally damaged
    #[error("corrupted header: {0}")]
    CorruptedHeader(String),

    /// The input is too small to contain the structure being read
    #[error("input too small: expected at least {expected} bytes, got {actual}")]
    TooSmall { expected: u64, actual: u64 },

    /// A format feature this library does not implement
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// A stored checksum did not match the recomputed value
    #[error("checksum mismatch: got {actual}, want {expected}")]
    ChecksumMismatch { expected: String, actual: String },

    /// A named entry was not found inside a container or filesystem
    #[error("not found: {0}")]
    NotFound(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl IdentError {
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }

    pub fn corrupted_header(msg: impl Into<String>) -> Self {
        Self::CorruptedHeader(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
