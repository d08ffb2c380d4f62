//! Error type shared by every reader, buffer and command.

use std::io;
use thiserror::Error;

/// Errors that can occur while streaming sorted genomic records.
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// The global (rid, beg1) sort invariant was violated. Always fatal.
    #[error("{source_name} is unordered: {context}")]
    Unordered {
        source_name: String,
        context: String,
    },

    /// A region query moved backwards on the same chromosome.
    #[error(
        "Region queries must be non-decreasing: {chrom}:{start1} was queried after {chrom}:{previous}"
    )]
    NonMonotonicQuery {
        chrom: String,
        previous: u64,
        start1: u64,
    },
}

impl StreamError {
    /// Build an unordered-input error.
    pub fn unordered(source_name: impl Into<String>, context: impl Into<String>) -> Self {
        StreamError::Unordered {
            source_name: source_name.into(),
            context: context.into(),
        }
    }

    /// Returns true if this is a sort-order violation.
    pub fn is_unordered(&self) -> bool {
        matches!(self, StreamError::Unordered { .. })
    }
}

pub type Result<T> = std::result::Result<T, StreamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unordered_message_names_source() {
        let err = StreamError::unordered("calls.vcf", "rid 0 at 20:100 after rid 1");
        assert!(err.is_unordered());
        assert_eq!(
            err.to_string(),
            "calls.vcf is unordered: rid 0 at 20:100 after rid 1"
        );
    }

    #[test]
    fn test_io_conversion() {
        let err: StreamError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(!err.is_unordered());
        assert!(err.to_string().starts_with("I/O error"));
    }
}
