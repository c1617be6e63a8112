//! Error types for deck-icons

use crate::types::ConvertOp;
use std::fmt;
use std::path::PathBuf;

/// A single conversion that did not produce its artifact.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("source not found: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("failed to start converter: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("converter exited with status {code:?}: {stderr}")]
    Exit { code: Option<i32>, stderr: String },

    #[error("converter reported success but wrote no output to {}", .0.display())]
    NoOutput(PathBuf),
}

/// Cache directory or metadata IO failure.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("metadata encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One failed target from a refresh pass.
#[derive(Debug)]
pub struct TargetFailure {
    pub op: ConvertOp,
    pub source: PathBuf,
    pub target: PathBuf,
    pub error: ConvertError,
}

/// Outcome of a refresh pass where some targets could not be produced.
///
/// The pass still ran to completion and committed the new freshness signal;
/// the failed targets are picked up again by the next completeness scan.
#[derive(Debug, Default)]
pub struct PartialFailureReport {
    pub failures: Vec<TargetFailure>,
    /// Targets that were produced in the same pass.
    pub converted: usize,
    /// Whether the new freshness signal reached disk.
    pub signal_saved: bool,
}

impl fmt::Display for PartialFailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} icons could not be generated",
            self.failures.len(),
            self.failures.len() + self.converted
        )?;
        for failure in &self.failures {
            write!(
                f,
                "\n  {} ({}): {}",
                failure.target.display(),
                failure.op.label(),
                failure.error
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for PartialFailureReport {}
