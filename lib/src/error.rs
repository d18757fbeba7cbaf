use thiserror::Error;

/// Errors raised by the triangulation process.
///
/// `InvalidDataLength`, `InvalidDimensions`, and `InvalidMaxError` are caller
/// errors, detected up front before any mesh state is touched.
/// `BrokenTriangulation` and `EmptyQueue` indicate an internal invariant was
/// violated; they are not expected to be recoverable, but are surfaced as a
/// `Result` rather than a panic so an embedding host can report them.
#[derive(Debug, Error)]
pub enum TriangulationError {
    #[error("height data length {actual} does not match width * height ({expected})")]
    InvalidDataLength { expected: usize, actual: usize },

    #[error("grid dimensions must be at least 2x2, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("max_error must be a finite, non-negative number, got {0}")]
    InvalidMaxError(f64),

    #[error("broken triangulation: triangle {triangle} is neither queued nor pending")]
    BrokenTriangulation { triangle: usize },

    #[error("priority queue is empty")]
    EmptyQueue,
}
