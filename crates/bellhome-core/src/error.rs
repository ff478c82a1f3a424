//! Error type shared by every pipeline stage.
//!
//! Every stage is a deterministic transform over fully buffered sequences, so
//! nothing here is retryable: an error means a configuration or programming
//! mistake and is surfaced to the caller as-is.

use thiserror::Error;

/// Errors raised by the Bell@Home pipeline.
#[derive(Error, Debug)]
pub enum BellError {
    /// A sequence does not have its statically expected length (`k*n` or `n`).
    #[error("length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    /// A sequence holds a value other than 0 or 1.
    #[error("non-binary value {value} in {what} at index {index}")]
    NonBinary {
        what: String,
        index: usize,
        value: u8,
    },

    /// A bit sequence could not be encoded or decoded.
    #[error("encoding violation at line {line}: {reason}")]
    Encoding { line: usize, reason: String },

    /// A device name outside the two recognised parties.
    #[error("unknown party '{0}' (expected 'alice' or 'bob')")]
    UnknownParty(String),

    /// Run parameters out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A store was asked for a sequence it never received.
    #[error("missing artifact: {0}")]
    MissingArtifact(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BellError>;

/// Fail with [`BellError::LengthMismatch`] unless `actual == expected`.
pub fn ensure_len(what: &str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(BellError::LengthMismatch {
            what: what.to_string(),
            expected,
            actual,
        })
    }
}

/// Fail with [`BellError::NonBinary`] at the first value outside `{0, 1}`.
pub fn ensure_bits(what: &str, bits: &[u8]) -> Result<()> {
    match bits.iter().position(|&b| b > 1) {
        None => Ok(()),
        Some(index) => Err(BellError::NonBinary {
            what: what.to_string(),
            index,
            value: bits[index],
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_len_ok() {
        assert!(ensure_len("questions", 4, 4).is_ok());
    }

    #[test]
    fn test_ensure_len_mismatch() {
        let err = ensure_len("answers", 10, 9).unwrap_err();
        match err {
            BellError::LengthMismatch {
                what,
                expected,
                actual,
            } => {
                assert_eq!(what, "answers");
                assert_eq!(expected, 10);
                assert_eq!(actual, 9);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_ensure_bits() {
        assert!(ensure_bits("raw randomness", &[]).is_ok());
        assert!(ensure_bits("raw randomness", &[0, 1, 1, 0]).is_ok());
        match ensure_bits("raw randomness", &[0, 1, 2, 255]).unwrap_err() {
            BellError::NonBinary { what, index, value } => {
                assert_eq!(what, "raw randomness");
                assert_eq!(index, 2);
                assert_eq!(value, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_display_messages() {
        let err = BellError::UnknownParty("Charlie".to_string());
        assert_eq!(
            err.to_string(),
            "unknown party 'Charlie' (expected 'alice' or 'bob')"
        );
        let err = BellError::Encoding {
            line: 3,
            reason: "non-binary character 'x'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "encoding violation at line 3: non-binary character 'x'"
        );
    }
}
