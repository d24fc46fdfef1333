//! Error types for slide document handling.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while opening, walking, or saving a slide document.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read the input file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// ZIP archive error (PPTX is a ZIP container).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing error inside a document part.
    #[error("XML parsing error: {0}")]
    XmlError(String),

    /// Invalid or corrupted document.
    #[error("Invalid or corrupted file: {0}")]
    CorruptedFile(String),

    /// The file format is not supported or could not be detected.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),
}
