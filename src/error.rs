//! Custom error types for tfup.

use thiserror::Error;

/// Errors that leave the Terraform file in a state tfup refuses to write.
#[derive(Error, Debug)]
pub enum TfupError {
    #[error("Failed to read version manifest {path}: {reason}")]
    ManifestRead { path: String, reason: String },

    #[error("Failed to parse version manifest {path}: {reason}")]
    ManifestParse { path: String, reason: String },

    #[error("Marker `{0}` not found in Terraform file")]
    MarkerNotFound(String),

    #[error("Invalid node pool range: start line {start}, end line {end}")]
    InvalidNodePoolRange { start: usize, end: usize },

    #[error("Line {line} does not match pattern {pattern}: {content}")]
    MalformedLine {
        line: usize,
        pattern: String,
        content: String,
    },

    #[error("Node pool name has no numeric suffix: {0}")]
    InvalidPoolName(String),
}

impl TfupError {
    /// Create a malformed line error, trimming the line terminator for display.
    pub fn malformed(line: usize, pattern: &str, content: &str) -> Self {
        TfupError::MalformedLine {
            line,
            pattern: pattern.to_string(),
            content: content.trim_end().to_string(),
        }
    }
}
