//! Error types for huffpack

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`HuffmanError`].
pub type Result<T> = std::result::Result<T, HuffmanError>;

/// Errors surfaced by the compression pipeline.
#[derive(Debug, Error)]
pub enum HuffmanError {
    /// Reading or writing an already-open stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A named file could not be opened, read or written.
    #[error("can't access file {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A buffer could not grow to the requested number of elements.
    #[error("memory can't be allocated: {what} needs room for {requested} elements")]
    OutOfMemory { what: &'static str, requested: usize },

    /// The persisted header or payload is inconsistent.
    #[error("corrupt input: {0}")]
    Corrupt(String),

    /// The data contains a byte that the code table has no code for.
    #[error("byte {0:#04x} has no code in the table")]
    MissingCode(u8),

    /// The data's histogram differs from the codec's frequency table.
    #[error("data does not match the codec's frequency table")]
    FrequencyMismatch,

    /// A leaf sits deeper than a code word can represent.
    #[error("code for byte {byte:#04x} would be {depth} bits long")]
    CodeTooLong { byte: u8, depth: usize },
}

impl HuffmanError {
    /// Create a corrupt-input error
    pub fn corrupt(msg: impl Into<String>) -> Self {
        HuffmanError::Corrupt(msg.into())
    }

    /// Attach a path to an I/O error
    pub fn file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        HuffmanError::File {
            path: path.into(),
            source,
        }
    }
}
