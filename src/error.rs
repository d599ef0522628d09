use thiserror::Error;

/// Failures surfaced by query initialization and model replacement.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CollisionError {
    #[error("model does not hold triangles")]
    NotTriangles,
    #[error("replacement has {got} vertices, model expects {expected}")]
    VertexCountMismatch { expected: usize, got: usize },
    #[error("no vertex replacement in progress")]
    ReplaceNotStarted,
}
