//! Axis-aligned bounding boxes in the working plane.

use std::f64::consts::FRAC_PI_2;

use camfov_math::{Point2, Vec2};

use crate::Curve2d;

/// Axis-aligned box, used to skip curve pairs that cannot meet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb2 {
    /// Minimum corner.
    pub min: Point2,
    /// Maximum corner.
    pub max: Point2,
}

impl Aabb2 {
    /// Inverted box that any included point replaces.
    pub fn empty() -> Self {
        Self {
            min: Point2::new(f64::INFINITY, f64::INFINITY),
            max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Nothing included yet.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Grow to cover `p`.
    pub fn include_point(&mut self, p: &Point2) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Box around a segment.
    pub fn from_segment(a: Point2, b: Point2) -> Self {
        let mut bb = Self::empty();
        bb.include_point(&a);
        bb.include_point(&b);
        bb
    }

    /// Tight box around a curve. Arcs include the circle's axis extremes
    /// they pass through.
    pub fn of_curve(curve: &Curve2d) -> Self {
        let mut bb = Self::from_segment(curve.start(), curve.end());
        if let Curve2d::Arc(arc) = curve {
            for k in 0..4 {
                let theta = k as f64 * FRAC_PI_2;
                if arc.contains_angle(theta) {
                    bb.include_point(&arc.point_at_angle(theta));
                }
            }
        }
        bb
    }

    /// Shared area or a shared edge.
    pub fn overlaps(&self, other: &Aabb2) -> bool {
        let apart_x = self.max.x < other.min.x || other.max.x < self.min.x;
        let apart_y = self.max.y < other.min.y || other.max.y < self.min.y;
        !(apart_x || apart_y)
    }

    /// Copy padded by `margin` on all four sides.
    pub fn expand(&self, margin: f64) -> Self {
        let pad = Vec2::repeat(margin);
        Self {
            min: self.min - pad,
            max: self.max + pad,
        }
    }
}

impl Default for Aabb2 {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Arc2d, Line2d};
    use std::f64::consts::PI;

    #[test]
    fn test_empty_box() {
        let mut bb = Aabb2::empty();
        assert!(bb.is_empty());
        bb.include_point(&Point2::new(1.0, 2.0));
        assert!(!bb.is_empty());
    }

    #[test]
    fn test_arc_box_includes_top() {
        let arc = Curve2d::Arc(Arc2d::new(Point2::origin(), 2.0, 0.0, PI).unwrap());
        let bb = Aabb2::of_curve(&arc);
        assert!((bb.max.y - 2.0).abs() < 1e-12);
        assert!((bb.min.x + 2.0).abs() < 1e-12);
        assert!(bb.min.y.abs() < 1e-12);
    }

    #[test]
    fn test_overlap_with_margin() {
        let a = Aabb2::of_curve(&Curve2d::Line(
            Line2d::new(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)).unwrap(),
        ));
        let b = Aabb2::from_segment(Point2::new(1.05, 0.0), Point2::new(2.0, 1.0));
        assert!(!a.overlaps(&b));
        assert!(a.expand(0.1).overlaps(&b));
    }
}
