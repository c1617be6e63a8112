//! Error types for deck-conf

use std::path::PathBuf;

/// Configuration loading errors.
///
/// Every variant means the launcher cannot start: the binary reports it and
/// exits with a dedicated status.
#[derive(Debug, thiserror::Error)]
pub enum ConfError {
    #[error("configuration file not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },
}
