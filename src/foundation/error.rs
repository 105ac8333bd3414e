/// Convenience result type used across framefit.
pub type FramefitResult<T> = Result<T, FramefitError>;

/// Top-level error taxonomy used by library APIs.
#[derive(thiserror::Error, Debug)]
pub enum FramefitError {
    /// Rejected input: unsupported MIME type, bad configuration, missing selection.
    #[error("validation error: {0}")]
    Validation(String),

    /// Bytes that claim to be an image but cannot be turned into pixels.
    #[error("decode error: {0}")]
    Decode(String),

    /// Failure while locating the opening or rendering a composite.
    #[error("composition error: {0}")]
    Composition(String),

    /// Failure while encoding or writing an exported composite.
    #[error("export error: {0}")]
    Export(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FramefitError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn composition(msg: impl Into<String>) -> Self {
        Self::Composition(msg.into())
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }
}
