#![warn(missing_docs)]

//! Curve types for the camfov geometry pipeline.
//!
//! Two curve shapes cover everything the pipeline handles: straight lines
//! and circular arcs.
//!
//! - [`Curve3d`] - model-space input curves (solid edges, standalone curves)
//! - [`Curve2d`] - curves in the working plane (obstacles, boundary primitives)
//! - [`intersect`] - curve/curve and curve/segment intersection
//! - [`bbox`] - 2D bounding boxes used as a broadphase filter

pub mod bbox;
mod curve2d;
mod curve3d;
pub mod intersect;

pub use bbox::Aabb2;
pub use curve2d::{Arc2d, Curve2d, Line2d};
pub use curve3d::{Arc3d, Curve3d, Line3d};

use thiserror::Error;

/// The kind of a curve (for match-free dispatch and run merging).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurveKind {
    /// Straight line segment.
    Line,
    /// Circular arc.
    Arc,
}

/// Errors raised while constructing curves.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeomError {
    /// Line endpoints coincide.
    #[error("line endpoints coincide")]
    DegenerateLine,

    /// Three arc points lie on one line.
    #[error("arc points are collinear")]
    CollinearPoints,

    /// Arc start and end coincide or the sweep is zero.
    #[error("arc has zero sweep")]
    DegenerateArc,

    /// Radius is zero, negative or not finite.
    #[error("invalid arc radius {0}")]
    InvalidRadius(f64),

    /// An input coordinate is NaN or infinite.
    #[error("non-finite coordinate")]
    NonFinite,
}

/// Result type for curve construction.
pub type Result<T> = std::result::Result<T, GeomError>;
