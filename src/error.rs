//! Error types for the swift_mt library.

use std::io;
use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during parsing and generation operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred during read or write operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed message envelope (unterminated block, bad block syntax).
    #[error("envelope error: {0}")]
    Envelope(String),

    /// Invalid field tag syntax inside the text block.
    #[error("field tag error: {0}")]
    Tag(String),

    /// Invalid date format.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// Invalid amount format.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Missing mandatory field for the target message type.
    #[error("missing mandatory field :{0}:")]
    MissingField(String),

    /// Malformed structured narrative subfield.
    #[error("narrative error: {0}")]
    Narrative(String),

    /// Message type with no registered business parser/generator.
    #[error("unsupported message type: {0}")]
    UnsupportedType(String),

    /// Header message type and requested document type disagree.
    #[error("message type mismatch: header says MT{header}, requested MT{requested}")]
    TypeMismatch { header: String, requested: String },

    /// Batch summary amount does not equal the sum of transaction amounts.
    #[error("batch summary mismatch: :19: says {declared}, transactions sum to {computed}")]
    SummaryMismatch { declared: String, computed: String },

    /// General parsing error.
    #[error("parse error: {0}")]
    Parse(String),
}
