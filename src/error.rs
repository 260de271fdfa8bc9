//! Error types for the composer and capture pipeline

use thiserror::Error;

/// Result type alias for ogshot operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while composing, capturing or exporting a post
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to start a capture worker
    #[error("Capture worker initialization failed: {0}")]
    InitializationError(String),

    /// The draft has nothing to capture
    #[error("Draft is not ready: {0}")]
    ValidationError(String),

    /// The capture engine rejected the request
    #[error("Capture failed: {0}")]
    CaptureError(String),

    /// A cross-origin image was not loaded in a mode that allows rasterizing it
    #[error("Cross-origin image would taint the capture: {0}")]
    TaintedImage(String),

    /// Layout or raster step failed
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Decoding or encoding image bytes failed
    #[error("Image processing failed: {0}")]
    ImageError(String),

    /// Malformed `data:` URL
    #[error("Invalid data URL: {0}")]
    DataUrlError(String),

    /// An image URL that no resolver knows about
    #[error("Unknown image source: {0}")]
    UnknownImage(String),

    /// A picked file that is not an image
    #[error("Unsupported media type: {0}")]
    UnsupportedMedia(String),

    /// Filesystem error while saving or loading
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::ImageError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}
