//! # Render Core Error Types
//!
//! Only *recoverable* faults live here. Usage bugs (dead handles, stock
//! uniform names, exhausted tables) are submission-time assertions, and
//! protocol violations between the two threads abort - neither gets an
//! error value.

use thiserror::Error;

/// Errors the render core can report to its embedder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A renderer configuration file failed to parse or validate.
    #[error("invalid renderer configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for render core operations.
pub type RenderResult<T> = Result<T, RenderError>;
