//! Error types for boundary synthesis.

use thiserror::Error;

/// Structural defects of a candidate boundary loop.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoopError {
    /// Fewer than three primitives.
    #[error("loop has {0} primitives, need at least 3")]
    TooFewPrimitives(usize),

    /// A primitive is shorter than the tolerance.
    #[error("primitive {index} is only {length:.6} long")]
    ShortPrimitive {
        /// Index of the primitive.
        index: usize,
        /// Its length.
        length: f64,
    },

    /// Two consecutive primitives do not meet.
    #[error("gap of {gap:.6} after primitive {index}")]
    Disconnected {
        /// Index of the primitive whose end misses the next start.
        index: usize,
        /// Distance between the two points.
        gap: f64,
    },

    /// Last primitive does not end at the first one's start.
    #[error("loop not closed, gap {0:.6}")]
    NotClosed(f64),
}

/// Failure of one synthesis attempt; the ladder moves on to the next tier.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RetryableFailure {
    /// Fewer than three distinct sample points survived deduplication.
    #[error("only {0} distinct boundary points")]
    TooFewPoints(usize),

    /// The reconstructed loop is structurally invalid.
    #[error("invalid loop: {0}")]
    InvalidLoop(#[from] LoopError),

    /// The reconstructed loop crosses itself.
    #[error("loop intersects itself")]
    SelfIntersecting,
}

/// Terminal synthesis errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SynthesisError {
    /// The camera cannot be sampled.
    #[error("degenerate camera: {0}")]
    DegenerateCamera(String),

    /// Tolerance, jitter or ladder values are unusable.
    #[error("invalid synthesis options: {0}")]
    InvalidOptions(String),

    /// Every tier, including the polygon fallback, failed.
    #[error("no valid boundary after {attempts} attempts: {last_error}")]
    NoValidBoundary {
        /// Number of attempts made.
        attempts: usize,
        /// Failure of the last attempt.
        #[source]
        last_error: RetryableFailure,
    },
}

/// Result type for synthesis operations.
pub type Result<T> = std::result::Result<T, SynthesisError>;
