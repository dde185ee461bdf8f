/// Convenience result type used across frameshot.
pub type FrameshotResult<T> = Result<T, FrameshotError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum FrameshotError {
    /// Invalid user-provided, catalog or scene data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Uploaded or fetched bytes could not be interpreted as an image.
    #[error("decode error: {0}")]
    Decode(String),

    /// A referenced resource could not be resolved or read.
    #[error("resource error: {0}")]
    Resource(String),

    /// Errors while compiling or executing a render plan.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FrameshotError {
    /// Build a [`FrameshotError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FrameshotError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`FrameshotError::Resource`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build a [`FrameshotError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`FrameshotError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

/// Failure modes of the export pipeline.
///
/// Export never mutates composition state, so every variant is recoverable: the caller may change
/// inputs (for example pick another background) and retry.
#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    /// Export was requested while no screenshot is loaded.
    #[error("nothing to export: no screenshot loaded")]
    NoScreenshot,

    /// A referenced resource is not readable under cross-origin rules; capturing it would taint
    /// the canvas.
    #[error("tainted canvas: '{url}' is not readable cross-origin")]
    TaintedCanvas {
        /// The offending resource URL.
        url: String,
    },

    /// Any other failure while preparing, rendering, encoding or saving.
    #[error(transparent)]
    Failed(#[from] FrameshotError),
}

impl From<anyhow::Error> for ExportError {
    fn from(err: anyhow::Error) -> Self {
        Self::Failed(FrameshotError::Other(err))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
