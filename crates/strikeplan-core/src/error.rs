//! Kernel error type.

use crate::document::Selection;
use thiserror::Error;

/// Recoverable kernel failures.
///
/// None of these are fatal: every operation that can fail builds its result
/// into a fresh document, so an error always leaves the caller's document
/// untouched.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("Arc pull point cannot be collinear with endpoints")]
    DegenerateArc,
    #[error("Set the drawing scale before using this tool")]
    ScaleNotSet,
    #[error("Spacing interval must be a positive distance (got {0})")]
    InvalidInterval(f64),
    #[error("Spacing interval is too small: more than {max} points would be placed")]
    TooManySpacingPoints { max: usize },
    #[error("A traced path needs at least {required} vertices (got {actual})")]
    TooFewVertices { required: usize, actual: usize },
    #[error("Selected {0:?} no longer exists")]
    EntityNotFound(Selection),
    #[error("Handle {handle} does not belong to {selection:?}")]
    HandleMismatch { selection: Selection, handle: String },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for kernel operations.
pub type KernelResult<T> = Result<T, KernelError>;
