//! Model-space input curves.

use camfov_math::{Point3, Transform, Vec3};

use crate::{CurveKind, GeomError, Result};

/// A bounded 3D line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line3d {
    /// Starting point.
    pub start: Point3,
    /// End point.
    pub end: Point3,
}

impl Line3d {
    /// Create a line between two points.
    pub fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    /// Segment length.
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }
}

/// A circular arc held as three points on it.
///
/// Storing start/mid/end instead of center and radius means every affine
/// transform maps the arc exactly, and projection only has to move points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc3d {
    /// Starting point.
    pub start: Point3,
    /// A point strictly between start and end.
    pub mid: Point3,
    /// End point.
    pub end: Point3,
}

impl Arc3d {
    /// Arc from three points on it.
    pub fn new(start: Point3, mid: Point3, end: Point3) -> Self {
        Self { start, mid, end }
    }

    /// Arc on the circle `center + r (cos θ · x_dir + sin θ · y_dir)` from
    /// `start_angle` to `end_angle` (radians, counter-clockwise in the
    /// `x_dir`/`y_dir` frame).
    ///
    /// The sweep must be positive and strictly less than a full turn; a
    /// closed circle is several arcs, see [`Arc3d::full_circle`].
    pub fn from_circle(
        center: Point3,
        x_dir: Vec3,
        y_dir: Vec3,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Result<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(GeomError::InvalidRadius(radius));
        }
        let sweep = end_angle - start_angle;
        if !sweep.is_finite() {
            return Err(GeomError::NonFinite);
        }
        if sweep <= 1e-9 || sweep >= std::f64::consts::TAU - 1e-9 {
            return Err(GeomError::DegenerateArc);
        }
        let at = |theta: f64| {
            let (s, c) = theta.sin_cos();
            center + radius * (c * x_dir + s * y_dir)
        };
        Ok(Self {
            start: at(start_angle),
            mid: at(start_angle + 0.5 * sweep),
            end: at(end_angle),
        })
    }

    /// A closed circle as three equal arcs.
    ///
    /// Halves would share both endpoints and collapse to one curve under
    /// endpoint deduplication.
    pub fn full_circle(center: Point3, x_dir: Vec3, y_dir: Vec3, radius: f64) -> Result<[Self; 3]> {
        use std::f64::consts::TAU;
        let third = TAU / 3.0;
        Ok([
            Self::from_circle(center, x_dir, y_dir, radius, 0.0, third)?,
            Self::from_circle(center, x_dir, y_dir, radius, third, 2.0 * third)?,
            Self::from_circle(center, x_dir, y_dir, radius, 2.0 * third, TAU)?,
        ])
    }
}

/// A model-space curve: a solid edge or a standalone curve element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Curve3d {
    /// Straight segment.
    Line(Line3d),
    /// Circular arc.
    Arc(Arc3d),
}

impl Curve3d {
    /// The kind of this curve.
    pub fn kind(&self) -> CurveKind {
        match self {
            Curve3d::Line(_) => CurveKind::Line,
            Curve3d::Arc(_) => CurveKind::Arc,
        }
    }

    /// Start point.
    pub fn start(&self) -> Point3 {
        match self {
            Curve3d::Line(l) => l.start,
            Curve3d::Arc(a) => a.start,
        }
    }

    /// End point.
    pub fn end(&self) -> Point3 {
        match self {
            Curve3d::Line(l) => l.end,
            Curve3d::Arc(a) => a.end,
        }
    }

    /// This curve mapped through `t`.
    pub fn transformed(&self, t: &Transform) -> Self {
        match self {
            Curve3d::Line(l) => Curve3d::Line(Line3d {
                start: t.apply_point(&l.start),
                end: t.apply_point(&l.end),
            }),
            Curve3d::Arc(a) => Curve3d::Arc(Arc3d {
                start: t.apply_point(&a.start),
                mid: t.apply_point(&a.mid),
                end: t.apply_point(&a.end),
            }),
        }
    }

    /// True if every point of the curve is finite.
    pub fn is_finite(&self) -> bool {
        let finite = |p: &Point3| p.iter().all(|v| v.is_finite());
        match self {
            Curve3d::Line(l) => finite(&l.start) && finite(&l.end),
            Curve3d::Arc(a) => finite(&a.start) && finite(&a.mid) && finite(&a.end),
        }
    }
}

impl From<Line3d> for Curve3d {
    fn from(l: Line3d) -> Self {
        Curve3d::Line(l)
    }
}

impl From<Arc3d> for Curve3d {
    fn from(a: Arc3d) -> Self {
        Curve3d::Arc(a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_from_circle_points() {
        let arc =
            Arc3d::from_circle(Point3::new(0.0, 0.0, 2.0), Vec3::x(), Vec3::y(), 3.0, 0.0, PI)
                .unwrap();
        assert_relative_eq!(arc.start, Point3::new(3.0, 0.0, 2.0), epsilon = 1e-12);
        assert_relative_eq!(arc.mid, Point3::new(0.0, 3.0, 2.0), epsilon = 1e-12);
        assert_relative_eq!(arc.end, Point3::new(-3.0, 0.0, 2.0), epsilon = 1e-12);
    }

    #[test]
    fn test_from_circle_rejects_full_turn() {
        let r = Arc3d::from_circle(Point3::origin(), Vec3::x(), Vec3::y(), 1.0, 0.0, 2.0 * PI);
        assert_eq!(r, Err(GeomError::DegenerateArc));
        let parts = Arc3d::full_circle(Point3::origin(), Vec3::x(), Vec3::y(), 1.0).unwrap();
        assert_relative_eq!(parts[0].end, parts[1].start, epsilon = 1e-12);
        assert_relative_eq!(parts[1].end, parts[2].start, epsilon = 1e-12);
        assert_relative_eq!(parts[2].end, parts[0].start, epsilon = 1e-12);
    }

    #[test]
    fn test_transformed_moves_all_points() {
        let c = Curve3d::Arc(Arc3d::new(
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
        ));
        let moved = c.transformed(&Transform::translation(5.0, 0.0, 1.0));
        let Curve3d::Arc(a) = moved else {
            panic!("expected arc");
        };
        assert_relative_eq!(a.mid, Point3::new(5.0, 1.0, 1.0), epsilon = 1e-12);
        assert_eq!(moved.kind(), CurveKind::Arc);
    }
}
