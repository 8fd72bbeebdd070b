#![warn(missing_docs)]

//! Camera field-of-view regions on floor plans.
//!
//! Ties the pipeline together: obstacles are extracted from model
//! geometry, each camera layer is synthesized into a closed boundary, and
//! the result replaces the previous region through a [`RegionSink`].
//!
//! - [`FovSettings`] - persisted settings (TOML or JSON)
//! - [`FovPlanner`] - per-camera render, undo and clear
//! - [`dori`] - DORI range layers
//! - [`heading`] - heading from placement rotation
//!
//! # Example
//!
//! ```ignore
//! use camfov::{FovPlanner, FovSettings, MemoryRegionStore, RenderRequest};
//!
//! let settings = FovSettings::load_or_init(path)?;
//! let obstacles = camfov::obstacles::extract(&elements, ElementSource::Host, &plane, &settings.extract_options());
//! let mut planner = FovPlanner::new(settings)?;
//! let mut store = MemoryRegionStore::new();
//! let report = planner.render(&mut store, &request, &obstacles)?;
//! ```

pub mod dori;
pub mod error;
pub mod heading;
pub mod planner;
pub mod region;
pub mod settings;

pub use camfov_cone as cone;
pub use camfov_geom as geom;
pub use camfov_math as math;
pub use camfov_obstacles as obstacles;

pub use dori::{dori_distance, dori_layers, DoriLevel};
pub use error::{FovError, Result};
pub use heading::{heading_deg, heading_indicator};
pub use planner::{FovPlanner, LayerRequest, RenderReport, RenderRequest, FOV_LAYER, UNDO_DEPTH};
pub use region::{
    CameraId, MemoryRegionStore, NewRegion, RegionBatch, RegionHandle, RegionKey, RegionSink,
    RegionTable,
};
pub use settings::FovSettings;
