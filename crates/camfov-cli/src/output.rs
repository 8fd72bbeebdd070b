//! JSON records written by `trace` and `draw`, in the scene's unit.

use camfov::cone::BoundaryLoop;
use camfov::geom::{Curve2d, Line2d};
use camfov::math::{LengthUnit, Point2};
use camfov::obstacles::{BuiltInCategory, ExtractStats, ObstacleSet};
use camfov::{RegionKey, RenderReport};
use serde::Serialize;

/// A plan curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum CurveRecord {
    /// Straight segment.
    Line {
        /// Start point.
        start: [f64; 2],
        /// End point.
        end: [f64; 2],
    },
    /// Circular arc.
    Arc {
        /// Start point.
        start: [f64; 2],
        /// End point.
        end: [f64; 2],
        /// Center point.
        center: [f64; 2],
        /// Radius.
        radius: f64,
        /// Signed sweep in degrees, positive counter-clockwise.
        sweep_deg: f64,
    },
}

impl CurveRecord {
    /// Convert a curve from meters to `unit`.
    pub fn new(curve: &Curve2d, unit: LengthUnit) -> Self {
        let p = |p: Point2| [unit.from_meters(p.x), unit.from_meters(p.y)];
        match curve {
            Curve2d::Line(l) => CurveRecord::Line {
                start: p(l.start),
                end: p(l.end),
            },
            Curve2d::Arc(a) => CurveRecord::Arc {
                start: p(a.start()),
                end: p(a.end()),
                center: p(a.center),
                radius: unit.from_meters(a.radius),
                sweep_deg: a.sweep.to_degrees(),
            },
        }
    }
}

/// One obstacle curve and where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObstacleRecord {
    /// Obstacle id.
    pub id: u32,
    /// Source element id.
    pub element: u64,
    /// Source link, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Resolved category, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<BuiltInCategory>,
    /// The projected curve.
    pub curve: CurveRecord,
}

/// Output of `trace`.
#[derive(Debug, Clone, Serialize)]
pub struct TraceOutput {
    /// Unit of every length.
    pub unit: LengthUnit,
    /// Extraction counters.
    pub stats: StatsRecord,
    /// Obstacle curves.
    pub obstacles: Vec<ObstacleRecord>,
    /// Skipped primitives.
    pub warnings: Vec<String>,
}

/// Serializable copy of [`ExtractStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsRecord {
    /// Primitives visited.
    pub visited: usize,
    /// Curves emitted.
    pub emitted: usize,
    /// Duplicates rejected.
    pub duplicates: usize,
    /// Too short after projection.
    pub degenerate: usize,
    /// Rejected by category.
    pub filtered: usize,
    /// Linked standalone curves dropped.
    pub centerlines: usize,
    /// Failed to rebuild.
    pub failed: usize,
}

impl From<&ExtractStats> for StatsRecord {
    fn from(s: &ExtractStats) -> Self {
        Self {
            visited: s.visited,
            emitted: s.emitted,
            duplicates: s.duplicates,
            degenerate: s.degenerate,
            filtered: s.filtered,
            centerlines: s.centerlines,
            failed: s.failed,
        }
    }
}

impl TraceOutput {
    /// Build from an obstacle set.
    pub fn new(set: &ObstacleSet, unit: LengthUnit) -> Self {
        Self {
            unit,
            stats: set.stats().into(),
            obstacles: set
                .iter()
                .map(|o| ObstacleRecord {
                    id: o.id.0,
                    element: o.source.element.0,
                    link: o.source.link.clone(),
                    category: o.source.category,
                    curve: CurveRecord::new(&o.curve, unit),
                })
                .collect(),
            warnings: set.warnings().iter().map(|w| w.to_string()).collect(),
        }
    }
}

/// One drawn region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionRecord {
    /// Camera id.
    pub camera: u64,
    /// Layer name.
    pub layer: String,
    /// Enclosed area in square units.
    pub area: f64,
    /// Outline length.
    pub perimeter: f64,
    /// Outline, counter-clockwise or clockwise as traced.
    pub curves: Vec<CurveRecord>,
}

impl RegionRecord {
    /// Build from a drawn boundary.
    pub fn new(key: &RegionKey, boundary: &BoundaryLoop, unit: LengthUnit) -> Self {
        let scale = unit.from_meters(1.0);
        Self {
            camera: key.camera.0,
            layer: key.layer.clone(),
            area: boundary.area() * scale * scale,
            perimeter: boundary.perimeter() * scale,
            curves: boundary
                .curves()
                .iter()
                .map(|c| CurveRecord::new(c, unit))
                .collect(),
        }
    }
}

/// A layer that could not be drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureRecord {
    /// Camera id.
    pub camera: u64,
    /// Layer name.
    pub layer: String,
    /// Error message.
    pub error: String,
}

/// Per-camera part of `draw` output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraRecord {
    /// Camera id.
    pub camera: u64,
    /// Heading in degrees.
    pub heading_deg: f64,
    /// Camera to max-range point along the heading.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading_indicator: Option<CurveRecord>,
}

impl CameraRecord {
    /// Build from a heading and its indicator line.
    pub fn new(camera: u64, heading_deg: f64, indicator: Option<Line2d>, unit: LengthUnit) -> Self {
        Self {
            camera,
            heading_deg,
            heading_indicator: indicator.map(|l| CurveRecord::new(&Curve2d::Line(l), unit)),
        }
    }
}

/// Output of `draw`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DrawOutput {
    /// Cameras drawn.
    pub cameras: Vec<CameraRecord>,
    /// Regions drawn.
    pub regions: Vec<RegionRecord>,
    /// Layers that failed.
    pub failed: Vec<FailureRecord>,
}

impl DrawOutput {
    /// Record the failures of one render.
    pub fn add_failures(&mut self, report: &RenderReport) {
        self.failed
            .extend(report.failed.iter().map(|(key, err)| FailureRecord {
                camera: key.camera.0,
                layer: key.layer.clone(),
                error: err.to_string(),
            }));
    }
}
