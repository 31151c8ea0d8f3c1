//! Error types for spectralnorm.

use thiserror::Error;

/// Result type alias using spectralnorm's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the estimator and the checksum harness.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The matrix order must be at least 1.
    #[error("invalid size {size}: the matrix order must be at least 1")]
    InvalidSize {
        /// Requested order
        size: usize,
    },

    /// Element denominators for this order do not fit in `usize`.
    #[error("size {size} overflows the matrix element index arithmetic")]
    SizeOverflow {
        /// Requested order
        size: usize,
    },

    /// The harness was asked to run zero times.
    #[error("invalid repeat count {repeats}: at least one run is required")]
    InvalidRepeats {
        /// Requested repeat count
        repeats: usize,
    },

    /// A computed checksum differs from the expected one.
    #[error("bad checksum: {computed} vs {expected}")]
    ChecksumMismatch {
        /// Value produced by the estimator
        computed: f64,
        /// Reference value
        expected: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_message_matches_shootout_format() {
        let err = Error::ChecksumMismatch {
            computed: 1.5,
            expected: 1.25,
        };
        assert_eq!(err.to_string(), "bad checksum: 1.5 vs 1.25");
    }

    #[test]
    fn test_invalid_size_message() {
        let err = Error::InvalidSize { size: 0 };
        assert!(err.to_string().contains("at least 1"));
    }
}
