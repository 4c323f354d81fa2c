//! Error types for bookfold operations.

use thiserror::Error;

/// Errors that can occur while reading a book.
///
/// Only structural failures surface here. Missing images or section files
/// degrade in place and never produce an `Error`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid EPUB: {0}")]
    InvalidEpub(String),

    #[error("Missing archive entry: {0}")]
    MissingEntry(String),

    #[error("Invalid markup in {path}: {reason}")]
    InvalidMarkup { path: String, reason: String },

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, Error>;
