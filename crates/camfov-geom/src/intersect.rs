//! Curve/segment and curve/curve intersection.
//!
//! Results carry the parameter along the *first* operand so ray casting can
//! sort hits by distance without re-projecting points.

use camfov_math::{Point2, Vec2};

use crate::curve2d::angle_of;
use crate::{Arc2d, Curve2d};

/// Parametric slack at segment ends.
const PARAM_EPS: f64 = 1e-9;

/// Distances below this count as zero (parallel, concentric, tangent).
const DIST_EPS: f64 = 1e-9;

/// A point where a segment meets another curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// The intersection point.
    pub point: Point2,
    /// Parameter along the first operand, in `[0, 1]`.
    pub t: f64,
}

fn in_unit(t: f64) -> bool {
    (-PARAM_EPS..=1.0 + PARAM_EPS).contains(&t)
}

/// Intersections of segment `p0→p1` with segment `q0→q1`.
///
/// Collinear overlapping segments report the two ends of the overlap.
pub fn segment_segment(p0: Point2, p1: Point2, q0: Point2, q1: Point2) -> Vec<Intersection> {
    let d = p1 - p0;
    let e = q1 - q0;
    let w = q0 - p0;
    let dl = d.norm();
    let el = e.norm();
    if dl < DIST_EPS || el < DIST_EPS {
        return Vec::new();
    }

    let denom = d.perp(&e);
    if denom.abs() > PARAM_EPS * dl * el {
        let t = w.perp(&e) / denom;
        let u = w.perp(&d) / denom;
        if in_unit(t) && in_unit(u) {
            let t = t.clamp(0.0, 1.0);
            return vec![Intersection {
                point: p0 + t * d,
                t,
            }];
        }
        return Vec::new();
    }

    // Parallel: only collinear segments can touch.
    if (w.perp(&d) / dl).abs() > DIST_EPS {
        return Vec::new();
    }
    let dd = d.norm_squared();
    let ta = w.dot(&d) / dd;
    let tb = (q1 - p0).dot(&d) / dd;
    let lo = ta.min(tb).max(0.0);
    let hi = ta.max(tb).min(1.0);
    if lo > hi + PARAM_EPS {
        return Vec::new();
    }
    let mut out = vec![Intersection {
        point: p0 + lo * d,
        t: lo,
    }];
    if (hi - lo) * dl > DIST_EPS {
        out.push(Intersection {
            point: p0 + hi * d,
            t: hi,
        });
    }
    out
}

/// Intersections of segment `p0→p1` with the circle `(center, radius)`,
/// before any arc-extent filtering.
fn segment_circle(p0: Point2, p1: Point2, center: Point2, radius: f64) -> Vec<Intersection> {
    let d = p1 - p0;
    let f = p0 - center;
    let a = d.norm_squared();
    if a < DIST_EPS * DIST_EPS {
        return Vec::new();
    }
    let b = 2.0 * d.dot(&f);
    let c = f.norm_squared() - radius * radius;
    let mut disc = b * b - 4.0 * a * c;
    // Tangency within a relative tolerance counts as one touching point.
    let scale = (b * b).max(4.0 * a * radius * radius);
    if disc < 0.0 {
        if disc > -PARAM_EPS * scale {
            disc = 0.0;
        } else {
            return Vec::new();
        }
    }
    let sq = disc.sqrt();
    let roots = if sq == 0.0 {
        vec![-b / (2.0 * a)]
    } else {
        vec![(-b - sq) / (2.0 * a), (-b + sq) / (2.0 * a)]
    };
    roots
        .into_iter()
        .filter(|t| in_unit(*t))
        .map(|t| {
            let t = t.clamp(0.0, 1.0);
            Intersection {
                point: p0 + t * d,
                t,
            }
        })
        .collect()
}

/// Intersections of segment `p0→p1` with an arc, ordered along the segment.
pub fn segment_arc(p0: Point2, p1: Point2, arc: &Arc2d) -> Vec<Intersection> {
    segment_circle(p0, p1, arc.center, arc.radius)
        .into_iter()
        .filter(|hit| arc.contains_angle(angle_of(&arc.center, &hit.point)))
        .collect()
}

/// Intersection points of two arcs.
///
/// Concentric arcs on the same circle report the endpoints of each arc that
/// lie on the other.
pub fn arc_arc(a: &Arc2d, b: &Arc2d) -> Vec<Point2> {
    let delta = b.center - a.center;
    let d = delta.norm();

    if d < DIST_EPS {
        if (a.radius - b.radius).abs() > DIST_EPS {
            return Vec::new();
        }
        let mut out: Vec<Point2> = Vec::new();
        let candidates = [
            (a.start(), b.contains_angle(a.start_angle)),
            (a.end(), b.contains_angle(a.end_angle())),
            (b.start(), a.contains_angle(b.start_angle)),
            (b.end(), a.contains_angle(b.end_angle())),
        ];
        for (p, on_other) in candidates {
            if on_other && !out.iter().any(|q| (q - p).norm() < DIST_EPS) {
                out.push(p);
            }
        }
        return out;
    }

    let (r1, r2) = (a.radius, b.radius);
    if d > r1 + r2 + DIST_EPS || d < (r1 - r2).abs() - DIST_EPS {
        return Vec::new();
    }
    let along = (r1 * r1 - r2 * r2 + d * d) / (2.0 * d);
    let h = (r1 * r1 - along * along).max(0.0).sqrt();
    let u = delta / d;
    let base = a.center + along * u;
    let perp = Vec2::new(-u.y, u.x);

    let mut pts = vec![base + h * perp];
    if h > DIST_EPS {
        pts.push(base - h * perp);
    }
    pts.into_iter()
        .filter(|p| {
            a.contains_angle(angle_of(&a.center, p)) && b.contains_angle(angle_of(&b.center, p))
        })
        .collect()
}

impl Curve2d {
    /// Intersections of segment `from→to` with this curve, ordered by the
    /// parameter along the segment.
    pub fn intersect_segment(&self, from: Point2, to: Point2) -> Vec<Intersection> {
        let mut hits = match self {
            Curve2d::Line(l) => segment_segment(from, to, l.start, l.end),
            Curve2d::Arc(a) => segment_arc(from, to, a),
        };
        hits.sort_by(|x, y| x.t.total_cmp(&y.t));
        hits
    }

    /// Intersection points of two curves.
    pub fn intersect(&self, other: &Curve2d) -> Vec<Point2> {
        match (self, other) {
            (Curve2d::Line(l), _) => other
                .intersect_segment(l.start, l.end)
                .into_iter()
                .map(|i| i.point)
                .collect(),
            (Curve2d::Arc(a), Curve2d::Line(l)) => segment_arc(l.start, l.end, a)
                .into_iter()
                .map(|i| i.point)
                .collect(),
            (Curve2d::Arc(a), Curve2d::Arc(b)) => arc_arc(a, b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn test_crossing_segments() {
        let hits = segment_segment(p(0.0, 0.0), p(2.0, 0.0), p(1.0, -1.0), p(1.0, 1.0));
        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0].t, 0.5, epsilon = 1e-12);
        assert_relative_eq!(hits[0].point, p(1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_disjoint_segments() {
        let hits = segment_segment(p(0.0, 0.0), p(1.0, 0.0), p(2.0, -1.0), p(2.0, 1.0));
        assert!(hits.is_empty());
    }

    #[test]
    fn test_touching_at_endpoint() {
        let hits = segment_segment(p(0.0, 0.0), p(1.0, 0.0), p(1.0, 0.0), p(1.0, 1.0));
        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0].t, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_collinear_overlap_reports_both_ends() {
        let hits = segment_segment(p(0.0, 0.0), p(4.0, 0.0), p(3.0, 0.0), p(1.0, 0.0));
        assert_eq!(hits.len(), 2);
        assert_relative_eq!(hits[0].t, 0.25, epsilon = 1e-12);
        assert_relative_eq!(hits[1].t, 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_parallel_offset_segments_miss() {
        let hits = segment_segment(p(0.0, 0.0), p(4.0, 0.0), p(0.0, 1.0), p(4.0, 1.0));
        assert!(hits.is_empty());
    }

    #[test]
    fn test_segment_through_half_circle() {
        let arc = Arc2d::new(p(0.0, 0.0), 1.0, 0.0, PI).unwrap();
        // vertical segment crosses the upper half only
        let hits = segment_arc(p(0.0, -2.0), p(0.0, 2.0), &arc);
        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0].point, p(0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_intersect_segment_sorted_by_distance() {
        let arc = Curve2d::Arc(Arc2d::new(p(0.0, 0.0), 1.0, -PI, PI).unwrap());
        let hits = arc.intersect_segment(p(-3.0, 0.0), p(3.0, 0.0));
        assert_eq!(hits.len(), 2);
        assert!(hits[0].t < hits[1].t);
        assert_relative_eq!(hits[0].point, p(-1.0, 0.0), epsilon = 1e-9);
    }

    #[test]
    fn test_arc_arc_crossing() {
        let a = Arc2d::new(p(0.0, 0.0), 1.0, 0.0, PI).unwrap();
        let b = Arc2d::new(p(1.0, 0.0), 1.0, PI / 2.0, PI).unwrap();
        let pts = arc_arc(&a, &b);
        assert_eq!(pts.len(), 1);
        assert_relative_eq!(pts[0], p(0.5, 3.0_f64.sqrt() / 2.0), epsilon = 1e-12);
    }

    #[test]
    fn test_arc_arc_concentric_overlap() {
        let a = Arc2d::new(p(0.0, 0.0), 2.0, 0.0, PI).unwrap();
        let b = Arc2d::new(p(0.0, 0.0), 2.0, PI / 2.0, 3.0 * PI / 2.0).unwrap();
        let pts = arc_arc(&a, &b);
        assert_eq!(pts.len(), 2);
    }
}
