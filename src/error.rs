use thiserror::Error;

/// Errors produced by the physics core.
///
/// Structural invariant violations inside the dynamic tree are programmer
/// errors and panic instead; soft degradations (out-of-world bodies) are
/// logged and do not surface here.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PhysicsError {
    /// A body produced a non-finite bounding box. NaN bounds are rejected
    /// before tree insertion so they can never corrupt other bodies' nodes.
    #[error("body {body} has a non-finite bounding box and cannot be tracked")]
    InvalidBounds { body: usize },

    /// A polygon needs at least three points.
    #[error("polygon requires at least 3 points, got {points}")]
    DegeneratePolygon { points: usize },
}
