/// Convenience result type used across slidecast.
pub type SlidecastResult<T> = Result<T, SlidecastError>;

/// Top-level error taxonomy used by pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum SlidecastError {
    /// Invalid user-provided input, rejected before any resource is allocated.
    #[error("validation error: {0}")]
    Validation(String),

    /// The live encode session failed mid-capture; partial output is discarded.
    #[error("capture error: {0}")]
    Capture(String),

    /// The audio remux invocation failed or produced no output.
    #[error("remux error: {0}")]
    Remux(String),

    /// The job observed its cancellation token and stopped cooperatively.
    #[error("render job was cancelled")]
    Cancelled,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SlidecastError {
    /// Build a [`SlidecastError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SlidecastError::Capture`] value.
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    /// Build a [`SlidecastError::Remux`] value.
    pub fn remux(msg: impl Into<String>) -> Self {
        Self::Remux(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
