//! Closed boundary loops and the point-to-point polygon fallback.

use camfov_geom::{Aabb2, Curve2d, Line2d};
use camfov_math::Point2;

use crate::{FovSample, LoopError, RetryableFailure};

/// A validated closed sequence of curve primitives.
///
/// Consecutive primitives meet within tolerance, the last one ends at the
/// first one's start, there are at least three primitives and none is
/// shorter than the tolerance.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryLoop {
    curves: Vec<Curve2d>,
    tolerance: f64,
}

impl BoundaryLoop {
    /// Validate `curves` as a closed loop.
    pub fn new(curves: Vec<Curve2d>, tolerance: f64) -> Result<Self, LoopError> {
        let n = curves.len();
        if n < 3 {
            return Err(LoopError::TooFewPrimitives(n));
        }
        for (index, curve) in curves.iter().enumerate() {
            let length = curve.length();
            if length < tolerance {
                return Err(LoopError::ShortPrimitive { index, length });
            }
        }
        for index in 0..n - 1 {
            let gap = (curves[index].end() - curves[index + 1].start()).norm();
            if gap > tolerance {
                return Err(LoopError::Disconnected { index, gap });
            }
        }
        let gap = (curves[n - 1].end() - curves[0].start()).norm();
        if gap > tolerance {
            return Err(LoopError::NotClosed(gap));
        }
        Ok(Self { curves, tolerance })
    }

    /// The primitives in order.
    pub fn curves(&self) -> &[Curve2d] {
        &self.curves
    }

    /// Number of primitives.
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// Always false for a validated loop.
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// Start point of every primitive.
    pub fn vertices(&self) -> Vec<Point2> {
        self.curves.iter().map(Curve2d::start).collect()
    }

    /// Signed enclosed area (positive when counter-clockwise).
    pub fn signed_area(&self) -> f64 {
        self.curves.iter().map(Curve2d::area_term).sum()
    }

    /// Enclosed area.
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Total length of the loop.
    pub fn perimeter(&self) -> f64 {
        self.curves.iter().map(Curve2d::length).sum()
    }

    /// True if no two primitives meet except neighbours at their shared
    /// vertex.
    pub fn is_simple(&self) -> bool {
        let n = self.curves.len();
        let tol = self.tolerance;
        let boxes: Vec<Aabb2> = self
            .curves
            .iter()
            .map(|c| Aabb2::of_curve(c).expand(tol))
            .collect();

        for i in 0..n {
            for j in i + 1..n {
                if !boxes[i].overlaps(&boxes[j]) {
                    continue;
                }
                // the vertex shared with a neighbour is allowed to touch
                let shared = if j == i + 1 {
                    Some(self.curves[j].start())
                } else if i == 0 && j == n - 1 {
                    Some(self.curves[0].start())
                } else {
                    None
                };
                let crossing = self.curves[i].intersect(&self.curves[j]).into_iter().any(|p| {
                    shared.map_or(true, |s| (p - s).norm() > tol)
                });
                if crossing {
                    log::trace!("primitives {i} and {j} intersect");
                    return false;
                }
            }
        }
        true
    }
}

/// Collapse consecutive samples closer than `tolerance`, then close the
/// sequence: a distant last point gets the first appended, a near one is
/// snapped onto it.
pub(crate) fn close_samples(
    samples: &[FovSample],
    tolerance: f64,
) -> Result<Vec<FovSample>, RetryableFailure> {
    let mut points: Vec<FovSample> = Vec::with_capacity(samples.len() + 1);
    for s in samples {
        match points.last() {
            Some(prev) if (s.point - prev.point).norm() <= tolerance => {}
            _ => points.push(*s),
        }
    }
    if points.len() < 3 {
        return Err(RetryableFailure::TooFewPoints(points.len()));
    }

    let first = points[0];
    let last = points.len() - 1;
    if (points[last].point - first.point).norm() > tolerance {
        points.push(first);
    } else {
        points[last].point = first.point;
    }
    Ok(points)
}

/// Unoptimized polygon through the raw samples.
///
/// Self-intersection is not checked; callers decide whether to accept a
/// non-simple result.
pub fn fallback_polygon(
    samples: &[FovSample],
    tolerance: f64,
) -> Result<BoundaryLoop, RetryableFailure> {
    let points = close_samples(samples, tolerance)?;
    let curves: Vec<Curve2d> = points
        .windows(2)
        .filter_map(|w| Line2d::new(w[0].point, w[1].point).ok())
        .filter(|l| l.length() >= tolerance)
        .map(Curve2d::Line)
        .collect();
    Ok(BoundaryLoop::new(curves, tolerance)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SampleKind;
    use approx::assert_relative_eq;
    use camfov_geom::Arc2d;
    use std::f64::consts::PI;

    const TOL: f64 = 1e-3;

    fn line(a: (f64, f64), b: (f64, f64)) -> Curve2d {
        Curve2d::Line(Line2d::new(Point2::new(a.0, a.1), Point2::new(b.0, b.1)).unwrap())
    }

    fn sample(x: f64, y: f64) -> FovSample {
        FovSample {
            point: Point2::new(x, y),
            kind: SampleKind::MaxRange,
        }
    }

    #[test]
    fn test_triangle_loop() {
        let tri = BoundaryLoop::new(
            vec![
                line((0.0, 0.0), (4.0, 0.0)),
                line((4.0, 0.0), (0.0, 3.0)),
                line((0.0, 3.0), (0.0, 0.0)),
            ],
            TOL,
        )
        .unwrap();
        assert_relative_eq!(tri.signed_area(), 6.0, epsilon = 1e-12);
        assert_relative_eq!(tri.perimeter(), 12.0, epsilon = 1e-12);
        assert!(tri.is_simple());
        assert_eq!(tri.vertices().len(), 3);
    }

    #[test]
    fn test_rejects_two_primitives() {
        let r = BoundaryLoop::new(
            vec![line((0.0, 0.0), (1.0, 0.0)), line((1.0, 0.0), (0.0, 0.0))],
            TOL,
        );
        assert_eq!(r, Err(LoopError::TooFewPrimitives(2)));
    }

    #[test]
    fn test_rejects_gap_and_open_loop() {
        let gap = BoundaryLoop::new(
            vec![
                line((0.0, 0.0), (4.0, 0.0)),
                line((4.0, 0.5), (0.0, 3.0)),
                line((0.0, 3.0), (0.0, 0.0)),
            ],
            TOL,
        );
        assert!(matches!(gap, Err(LoopError::Disconnected { index: 0, .. })));

        let open = BoundaryLoop::new(
            vec![
                line((0.0, 0.0), (4.0, 0.0)),
                line((4.0, 0.0), (0.0, 3.0)),
                line((0.0, 3.0), (0.0, 1.0)),
            ],
            TOL,
        );
        assert!(matches!(open, Err(LoopError::NotClosed(_))));
    }

    #[test]
    fn test_bow_tie_is_not_simple() {
        let bow = BoundaryLoop::new(
            vec![
                line((0.0, 0.0), (2.0, 2.0)),
                line((2.0, 2.0), (2.0, 0.0)),
                line((2.0, 0.0), (0.0, 2.0)),
                line((0.0, 2.0), (0.0, 0.0)),
            ],
            TOL,
        )
        .unwrap();
        assert!(!bow.is_simple());
    }

    #[test]
    fn test_sector_area_with_arc() {
        let arc = Arc2d::new(Point2::origin(), 2.0, 0.0, PI / 2.0).unwrap();
        let sector = BoundaryLoop::new(
            vec![
                line((0.0, 0.0), (2.0, 0.0)),
                Curve2d::Arc(arc),
                line((0.0, 2.0), (0.0, 0.0)),
            ],
            TOL,
        )
        .unwrap();
        assert!(sector.is_simple());
        assert_relative_eq!(sector.area(), PI, epsilon = 1e-9);
    }

    #[test]
    fn test_fallback_closes_by_appending() {
        let poly = fallback_polygon(
            &[sample(0.0, 0.0), sample(1.0, 0.0), sample(1.0, 1.0)],
            TOL,
        )
        .unwrap();
        assert_eq!(poly.len(), 3);
        assert_relative_eq!(poly.area(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_fallback_snaps_near_closure() {
        let poly = fallback_polygon(
            &[
                sample(0.0, 0.0),
                sample(1.0, 0.0),
                sample(1.0, 1.0),
                sample(0.0, 1.0),
                sample(0.0, 0.0005),
            ],
            TOL,
        )
        .unwrap();
        assert_eq!(poly.len(), 4);
        assert_relative_eq!(poly.curves()[3].end(), Point2::origin());
    }

    #[test]
    fn test_fallback_needs_three_distinct_points() {
        let r = fallback_polygon(
            &[sample(0.0, 0.0), sample(0.0, 0.0002), sample(1.0, 0.0)],
            TOL,
        );
        assert_eq!(r, Err(RetryableFailure::TooFewPoints(2)));
    }
}
