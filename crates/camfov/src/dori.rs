//! DORI (detection, observation, recognition, identification) range layers.
//!
//! Each level asks for a minimum pixel density on target. For a sensor
//! `px` pixels wide spread over a `fov` degree view, the density falls
//! below that level at
//!
//! ```text
//! d = px / ppm * 360 / fov / 2π
//! ```
//!
//! rounded to 0.1 m.

use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;

use crate::planner::LayerRequest;
use crate::{FovError, Result};

/// Pixel-density level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DoriLevel {
    /// 25 px/m.
    Detection,
    /// 63 px/m.
    Observation,
    /// 125 px/m.
    Recognition,
    /// 250 px/m.
    Identification,
}

impl DoriLevel {
    /// All levels, coarsest first.
    pub const ALL: [DoriLevel; 4] = [
        DoriLevel::Detection,
        DoriLevel::Observation,
        DoriLevel::Recognition,
        DoriLevel::Identification,
    ];

    /// Required pixels per meter.
    pub fn pixels_per_meter(self) -> u32 {
        match self {
            DoriLevel::Detection => 25,
            DoriLevel::Observation => 63,
            DoriLevel::Recognition => 125,
            DoriLevel::Identification => 250,
        }
    }

    /// Region layer name, e.g. `dori_63px`.
    pub fn layer_name(self) -> String {
        format!("dori_{}px", self.pixels_per_meter())
    }
}

impl fmt::Display for DoriLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DoriLevel::Detection => "detection",
            DoriLevel::Observation => "observation",
            DoriLevel::Recognition => "recognition",
            DoriLevel::Identification => "identification",
        };
        f.write_str(name)
    }
}

impl FromStr for DoriLevel {
    type Err = FovError;

    /// Accepts full names or initials, case-insensitive.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "d" | "detection" => Ok(DoriLevel::Detection),
            "o" | "observation" => Ok(DoriLevel::Observation),
            "r" | "recognition" => Ok(DoriLevel::Recognition),
            "i" | "identification" => Ok(DoriLevel::Identification),
            other => Err(FovError::InvalidRequest(format!(
                "unknown DORI level `{other}`"
            ))),
        }
    }
}

/// Distance in meters at which `level` is still met.
pub fn dori_distance(horizontal_px: u32, fov_deg: f64, level: DoriLevel) -> Result<f64> {
    if horizontal_px == 0 {
        return Err(FovError::InvalidRequest(
            "horizontal resolution must be positive".into(),
        ));
    }
    if !(fov_deg > 0.0 && fov_deg <= 360.0) {
        return Err(FovError::InvalidRequest(format!(
            "field of view must be in (0, 360], got {fov_deg}"
        )));
    }
    let width = f64::from(horizontal_px) / f64::from(level.pixels_per_meter());
    let d = width * 360.0 / fov_deg / TAU;
    Ok((d * 10.0).round() / 10.0)
}

/// One layer per level, each reaching its DORI distance.
pub fn dori_layers(
    horizontal_px: u32,
    fov_deg: f64,
    levels: &[DoriLevel],
) -> Result<Vec<LayerRequest>> {
    levels
        .iter()
        .map(|&level| {
            Ok(LayerRequest::new(
                level.layer_name(),
                dori_distance(horizontal_px, fov_deg, level)?,
            ))
        })
        .collect()
}
