//! Curves in the 2D working plane.

use std::f64::consts::TAU;

use camfov_math::{Point2, Vec2};

use crate::{CurveKind, GeomError, Result};

/// Minimum length for a constructible line (far below any model tolerance).
const MIN_LENGTH: f64 = 1e-12;

/// Angular slack when testing whether an angle lies on an arc.
const ANGLE_EPS: f64 = 1e-9;

fn is_finite(p: &Point2) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

// =============================================================================
// Line2d
// =============================================================================

/// A bounded 2D line segment.
///
/// Parameterization: `P(t) = start + t * (end - start)`, `t ∈ [0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line2d {
    /// Starting point.
    pub start: Point2,
    /// End point.
    pub end: Point2,
}

impl Line2d {
    /// Create a line between two distinct finite points.
    pub fn new(start: Point2, end: Point2) -> Result<Self> {
        if !is_finite(&start) || !is_finite(&end) {
            return Err(GeomError::NonFinite);
        }
        if (end - start).norm() < MIN_LENGTH {
            return Err(GeomError::DegenerateLine);
        }
        Ok(Self { start, end })
    }

    /// Vector from start to end.
    pub fn direction(&self) -> Vec2 {
        self.end - self.start
    }

    /// Segment length.
    pub fn length(&self) -> f64 {
        self.direction().norm()
    }

    /// Evaluate at `t ∈ [0, 1]`.
    pub fn evaluate(&self, t: f64) -> Point2 {
        self.start + t * self.direction()
    }
}

// =============================================================================
// Arc2d
// =============================================================================

/// A circular arc in the plane.
///
/// Parameterization: `P(t) = center + radius * (cos θ, sin θ)` with
/// `θ = start_angle + t * sweep`, `t ∈ [0, 1]`. A positive sweep runs
/// counter-clockwise, a negative one clockwise. `|sweep| ≤ 2π`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc2d {
    /// Center of the supporting circle.
    pub center: Point2,
    /// Radius.
    pub radius: f64,
    /// Angle of the start point in radians.
    pub start_angle: f64,
    /// Signed angular extent in radians.
    pub sweep: f64,
}

impl Arc2d {
    /// Counter-clockwise arc from `start_angle` to `end_angle` (radians).
    ///
    /// If `end_angle < start_angle` the end is advanced by a full turn, so the
    /// arc always runs in the increasing-angle direction.
    pub fn new(center: Point2, radius: f64, start_angle: f64, end_angle: f64) -> Result<Self> {
        if !is_finite(&center) || !start_angle.is_finite() || !end_angle.is_finite() {
            return Err(GeomError::NonFinite);
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(GeomError::InvalidRadius(radius));
        }
        let mut end = end_angle;
        if end < start_angle {
            end += TAU;
        }
        let sweep = end - start_angle;
        if sweep <= ANGLE_EPS || sweep > TAU + ANGLE_EPS {
            return Err(GeomError::DegenerateArc);
        }
        Ok(Self {
            center,
            radius,
            start_angle,
            sweep: sweep.min(TAU),
        })
    }

    /// Arc from `start` through `through` to `end`.
    ///
    /// Fails for collinear points and for coincident start/end points.
    pub fn through_points(start: Point2, through: Point2, end: Point2) -> Result<Self> {
        if !is_finite(&start) || !is_finite(&through) || !is_finite(&end) {
            return Err(GeomError::NonFinite);
        }
        let ab = through - start;
        let ac = end - start;
        if ac.norm() < MIN_LENGTH {
            return Err(GeomError::DegenerateArc);
        }
        let cross = ab.perp(&ac);
        if cross.abs() <= 1e-10 * ab.norm() * ac.norm() {
            return Err(GeomError::CollinearPoints);
        }

        // Circumcenter relative to `start`.
        let d = 2.0 * cross;
        let ab2 = ab.norm_squared();
        let ac2 = ac.norm_squared();
        let ux = (ac.y * ab2 - ab.y * ac2) / d;
        let uy = (ab.x * ac2 - ac.x * ab2) / d;
        let center = Point2::new(start.x + ux, start.y + uy);
        let radius = Vec2::new(ux, uy).norm();
        if !radius.is_finite() {
            return Err(GeomError::InvalidRadius(radius));
        }

        let a0 = angle_of(&center, &start);
        let a1 = angle_of(&center, &end);
        // start -> through -> end turns the same way as the triangle winding
        let sweep = if cross > 0.0 {
            (a1 - a0).rem_euclid(TAU)
        } else {
            -(a0 - a1).rem_euclid(TAU)
        };
        if sweep.abs() <= ANGLE_EPS {
            return Err(GeomError::DegenerateArc);
        }
        Ok(Self {
            center,
            radius,
            start_angle: a0,
            sweep,
        })
    }

    /// True if the arc runs counter-clockwise.
    pub fn is_ccw(&self) -> bool {
        self.sweep > 0.0
    }

    /// Angle of the end point in radians (`start_angle + sweep`).
    pub fn end_angle(&self) -> f64 {
        self.start_angle + self.sweep
    }

    /// Point on the supporting circle at angle `theta`.
    pub fn point_at_angle(&self, theta: f64) -> Point2 {
        let (s, c) = theta.sin_cos();
        self.center + self.radius * Vec2::new(c, s)
    }

    /// Evaluate at `t ∈ [0, 1]`.
    pub fn evaluate(&self, t: f64) -> Point2 {
        self.point_at_angle(self.start_angle + t * self.sweep)
    }

    /// Start point.
    pub fn start(&self) -> Point2 {
        self.evaluate(0.0)
    }

    /// End point.
    pub fn end(&self) -> Point2 {
        self.evaluate(1.0)
    }

    /// Point halfway along the arc.
    pub fn mid(&self) -> Point2 {
        self.evaluate(0.5)
    }

    /// Arc length.
    pub fn length(&self) -> f64 {
        self.radius * self.sweep.abs()
    }

    /// Normalized parameter of angle `theta` along the arc, if it lies on it.
    pub fn param_of_angle(&self, theta: f64) -> Option<f64> {
        let offset = if self.is_ccw() {
            (theta - self.start_angle).rem_euclid(TAU)
        } else {
            (self.start_angle - theta).rem_euclid(TAU)
        };
        let extent = self.sweep.abs();
        if offset <= extent + ANGLE_EPS {
            Some((offset / extent).min(1.0))
        } else if offset >= TAU - ANGLE_EPS {
            Some(0.0)
        } else {
            None
        }
    }

    /// True if angle `theta` lies within the arc's sweep.
    pub fn contains_angle(&self, theta: f64) -> bool {
        self.param_of_angle(theta).is_some()
    }

    /// Same arc traversed in the opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            center: self.center,
            radius: self.radius,
            start_angle: self.start_angle + self.sweep,
            sweep: -self.sweep,
        }
    }
}

/// Bearing of `p` seen from `center`, in radians `(-π, π]`.
pub(crate) fn angle_of(center: &Point2, p: &Point2) -> f64 {
    (p.y - center.y).atan2(p.x - center.x)
}

// =============================================================================
// Curve2d
// =============================================================================

/// A planar curve: either a line segment or a circular arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Curve2d {
    /// Straight segment.
    Line(Line2d),
    /// Circular arc.
    Arc(Arc2d),
}

impl Curve2d {
    /// The kind of this curve.
    pub fn kind(&self) -> CurveKind {
        match self {
            Curve2d::Line(_) => CurveKind::Line,
            Curve2d::Arc(_) => CurveKind::Arc,
        }
    }

    /// Start point.
    pub fn start(&self) -> Point2 {
        match self {
            Curve2d::Line(l) => l.start,
            Curve2d::Arc(a) => a.start(),
        }
    }

    /// End point.
    pub fn end(&self) -> Point2 {
        match self {
            Curve2d::Line(l) => l.end,
            Curve2d::Arc(a) => a.end(),
        }
    }

    /// Evaluate at `t ∈ [0, 1]`.
    pub fn evaluate(&self, t: f64) -> Point2 {
        match self {
            Curve2d::Line(l) => l.evaluate(t),
            Curve2d::Arc(a) => a.evaluate(t),
        }
    }

    /// Curve length.
    pub fn length(&self) -> f64 {
        match self {
            Curve2d::Line(l) => l.length(),
            Curve2d::Arc(a) => a.length(),
        }
    }

    /// Same curve traversed in the opposite direction.
    pub fn reversed(&self) -> Self {
        match self {
            Curve2d::Line(l) => Curve2d::Line(Line2d {
                start: l.end,
                end: l.start,
            }),
            Curve2d::Arc(a) => Curve2d::Arc(a.reversed()),
        }
    }

    /// Signed area contribution of this curve to a closed loop (shoelace
    /// term plus the circular segment for arcs).
    pub fn area_term(&self) -> f64 {
        let (s, e) = (self.start(), self.end());
        let chord = 0.5 * (s.x * e.y - e.x * s.y);
        match self {
            Curve2d::Line(_) => chord,
            Curve2d::Arc(a) => {
                let phi = a.sweep;
                chord + 0.5 * a.radius * a.radius * (phi - phi.sin())
            }
        }
    }
}

impl From<Line2d> for Curve2d {
    fn from(l: Line2d) -> Self {
        Curve2d::Line(l)
    }
}

impl From<Arc2d> for Curve2d {
    fn from(a: Arc2d) -> Self {
        Curve2d::Arc(a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_line_rejects_zero_length() {
        let p = Point2::new(1.0, 1.0);
        assert_eq!(Line2d::new(p, p), Err(GeomError::DegenerateLine));
        assert_eq!(
            Line2d::new(p, Point2::new(f64::NAN, 0.0)),
            Err(GeomError::NonFinite)
        );
    }

    #[test]
    fn test_arc_ccw_wraps_end_angle() {
        // 350° -> 10° is a 20° ccw arc
        let arc = Arc2d::new(Point2::origin(), 2.0, 350f64.to_radians(), 10f64.to_radians())
            .unwrap();
        assert_relative_eq!(arc.sweep, 20f64.to_radians(), epsilon = 1e-12);
        assert!(arc.is_ccw());
        assert_relative_eq!(arc.end().y, 2.0 * 10f64.to_radians().sin(), epsilon = 1e-12);
    }

    #[test]
    fn test_arc_zero_sweep_rejected() {
        assert_eq!(
            Arc2d::new(Point2::origin(), 1.0, 0.3, 0.3),
            Err(GeomError::DegenerateArc)
        );
        assert_eq!(
            Arc2d::new(Point2::origin(), 0.0, 0.0, 1.0),
            Err(GeomError::InvalidRadius(0.0))
        );
    }

    #[test]
    fn test_three_point_arc_ccw() {
        let arc = Arc2d::through_points(
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(-1.0, 0.0),
        )
        .unwrap();
        assert_relative_eq!(arc.center.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(arc.center.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(arc.radius, 1.0, epsilon = 1e-12);
        assert_relative_eq!(arc.sweep, PI, epsilon = 1e-12);
        assert_relative_eq!(arc.mid().y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_three_point_arc_cw() {
        let arc = Arc2d::through_points(
            Point2::new(-1.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 0.0),
        )
        .unwrap();
        assert!(!arc.is_ccw());
        assert_relative_eq!(arc.sweep, -PI, epsilon = 1e-12);
        assert_relative_eq!(arc.end().x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(arc.mid().y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_three_point_arc_collinear() {
        let result = Arc2d::through_points(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0),
        );
        assert_eq!(result, Err(GeomError::CollinearPoints));
    }

    #[test]
    fn test_param_of_angle() {
        let arc = Arc2d::new(Point2::origin(), 1.0, 0.0, FRAC_PI_2).unwrap();
        assert_relative_eq!(arc.param_of_angle(FRAC_PI_2 / 2.0).unwrap(), 0.5, epsilon = 1e-12);
        assert!(arc.param_of_angle(PI).is_none());
        let cw = arc.reversed();
        assert_relative_eq!(cw.param_of_angle(0.0).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_area_of_half_disc() {
        // upper half disc: arc (1,0)->(-1,0) ccw, then line back
        let arc = Curve2d::Arc(Arc2d::new(Point2::origin(), 1.0, 0.0, PI).unwrap());
        let line = Curve2d::Line(Line2d::new(arc.end(), arc.start()).unwrap());
        let area = arc.area_term() + line.area_term();
        assert_relative_eq!(area, PI / 2.0, epsilon = 1e-9);
    }
}
