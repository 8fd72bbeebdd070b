#![warn(missing_docs)]

//! Obstacle curve extraction for camera field-of-view analysis.
//!
//! Walks element geometry trees (host and linked models), keeps the
//! categories that block a camera's view, projects every edge onto the
//! working plane and deduplicates the result:
//!
//! - **Category filtering**: element categories plus, for linked models,
//!   graphics-style resolution through a [`CategoryResolver`]
//! - **Projection**: lines and three-point arcs rebuilt in the plane's frame
//! - **Deduplication**: order-independent endpoint keys ([`CurveKey`])
//!
//! # Example
//!
//! ```ignore
//! use camfov_obstacles::{ExtractOptions, ObstacleExtractor};
//! use camfov_math::Plane;
//!
//! let mut extractor = ObstacleExtractor::new(Plane::horizontal(0.0), ExtractOptions::default());
//! extractor.add_host_elements(&elements);
//! for link in &links {
//!     extractor.add_linked_model(link, &link_categories);
//! }
//! let obstacles = extractor.finish();
//! ```

pub mod category;
pub mod extractor;
pub mod model;

pub use category::{
    default_whitelist, BuiltInCategory, CategoryId, CategoryResolver, CategoryTable, StyleId,
};
pub use extractor::{
    extract, CurveKey, ElementSource, ExtractOptions, ExtractStats, ExtractionWarning,
    ObstacleCurve, ObstacleExtractor, ObstacleId, ObstacleSet, ObstacleSource,
};
pub use model::{ElementId, GeometryNode, LinkedModel, ModelElement};
