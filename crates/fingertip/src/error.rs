use thiserror::Error;

/// Reasons why no result could be computed for a hand.
///
/// All of these are local to one hand in one frame. Callers are expected to skip the hand and carry
/// on with the next one.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Error {
    /// The masked depth region around the hand point contains no foreground pixels.
    #[error("no hand contour found in the masked depth region")]
    NotFound,

    /// The contour has too few points (or a degenerate hull) to compute a hull or an area.
    #[error("contour with {points} points is too small for hull analysis")]
    InsufficientGeometry { points: usize },

    /// The joint position estimate is not confident enough to run detection.
    #[error("joint confidence {confidence} is below the required {required}")]
    LowConfidence { confidence: f32, required: f32 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
