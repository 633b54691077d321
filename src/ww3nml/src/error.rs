// ww3nml/src/error.rs

//! Error types for building, validating and writing WW3 namelists.

use std::fmt;
use std::io;
use thiserror::Error;

/// Result type alias for ww3nml operations.
pub type Result<T> = std::result::Result<T, Ww3Error>;

/// Errors raised while normalizing values, validating blocks, composing
/// namelist sets or writing them to disk.
#[derive(Error, Debug)]
pub enum Ww3Error {
    /// A token outside a closed value set
    #[error("Invalid {kind} value {value:?}; expected one of: {}", .accepted.join(", "))]
    InvalidEnumValue {
        kind: String,
        value: String,
        accepted: Vec<String>,
    },

    /// A single block violates one of its own invariants
    #[error("Validation error in {block} ({}): {message}", .fields.join(", "))]
    Validation {
        block: String,
        fields: Vec<String>,
        message: String,
    },

    /// Contradictions between blocks of one composition
    #[error("Inconsistent namelist composition:\n{}", format_findings(.0))]
    CompositionConsistency(Vec<ConsistencyFinding>),

    #[error(transparent)]
    DateFormat(#[from] DateFormatError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Ww3Error {
    /// Build a validation error for `block` naming the offending fields.
    pub fn validation<S: Into<String>>(block: &str, fields: &[&str], message: S) -> Self {
        Ww3Error::Validation {
            block: block.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            message: message.into(),
        }
    }

    /// Re-home a validation error under a parent block, prefixing field paths.
    pub fn nested(self, parent: &str, prefix: &str) -> Self {
        match self {
            Ww3Error::Validation {
                fields, message, ..
            } => Ww3Error::Validation {
                block: parent.to_string(),
                fields: fields
                    .into_iter()
                    .map(|f| format!("{}%{}", prefix, f))
                    .collect(),
                message,
            },
            other => other,
        }
    }
}

/// Date validation failures, split by whether the text had the right shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateFormatError {
    #[error("Invalid date {value:?}: expected 8 digits then space then 6 digits (YYYYMMDD HHMMSS) or YYYY-MM-DD HH:MM:SS")]
    Shape { value: String },

    #[error("Invalid date {value:?}: {reason}")]
    Calendar { value: String, reason: String },
}

/// One cross-block contradiction found by `Composition::validate_consistency`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsistencyFinding {
    /// Composition keys of the blocks involved
    pub keys: Vec<String>,
    pub message: String,
}

impl ConsistencyFinding {
    pub fn new<S: Into<String>>(keys: &[&str], message: S) -> Self {
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConsistencyFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.keys.join(", "), self.message)
    }
}

fn format_findings(findings: &[ConsistencyFinding]) -> String {
    findings
        .iter()
        .map(|finding| format!("  - {}", finding))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_fields() {
        let err = Ww3Error::validation("TIMESTEPS_NML", &["DTXY", "DTMAX"], "dtxy > dtmax");
        let msg = err.to_string();
        assert!(msg.contains("TIMESTEPS_NML"));
        assert!(msg.contains("DTXY, DTMAX"));
    }

    #[test]
    fn test_nested_prefixes_fields() {
        let err = Ww3Error::validation("FILE", &["FILENAME"], "empty").nested("CURV_NML", "XCOORD");
        match err {
            Ww3Error::Validation { block, fields, .. } => {
                assert_eq!(block, "CURV_NML");
                assert_eq!(fields, vec!["XCOORD%FILENAME".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_consistency_lists_each_finding() {
        let err = Ww3Error::CompositionConsistency(vec![
            ConsistencyFinding::new(&["a.nml"], "first"),
            ConsistencyFinding::new(&["b.nml", "c.nml"], "second"),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("[a.nml] first"));
        assert!(msg.contains("[b.nml, c.nml] second"));
    }
}
