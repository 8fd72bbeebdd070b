#![warn(missing_docs)]

//! Camera field-of-view boundary synthesis.
//!
//! From a camera position, view cone and obstacle set, casts one finite
//! ray per sample angle, keeps the nearest hit (or the max-range point),
//! and rebuilds a closed loop of lines and arcs:
//!
//! - [`sample_fov`] - ray casting into [`FovSample`]s
//! - [`simplify`] - run merging through a [`SegmentBuilder`]
//! - [`BoundaryLoop`] - validated closed loop with a simplicity check
//! - [`synthesize`] - the full retry ladder with a polygon fallback
//!
//! # Example
//!
//! ```ignore
//! use camfov_cone::{synthesize, CameraProfile, SynthesisOptions};
//!
//! let camera = CameraProfile::new(position, 90.0, 93.0, 15.0, 0.5);
//! let boundary = synthesize(&camera, &obstacles, &SynthesisOptions::default())?;
//! println!("{} primitives, area {:.2}", boundary.len(), boundary.area());
//! ```

mod boundary;
pub mod camera;
pub mod error;
pub mod ray;
pub mod sample;
pub mod simplify;
pub mod synth;

pub use boundary::{fallback_polygon, BoundaryLoop};
pub use camera::CameraProfile;
pub use error::{LoopError, Result, RetryableFailure, SynthesisError};
pub use ray::{Ray2, RayHit, Raycaster};
pub use sample::{sample_fov, FovSample, SampleKind};
pub use simplify::{simplify, ExactSegments, Reconstruction, SegmentBuilder};
pub use synth::{
    build_boundary, synthesize, synthesize_once, synthesize_with, Attempt, SynthesisOptions,
};
