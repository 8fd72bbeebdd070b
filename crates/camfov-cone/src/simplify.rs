//! Run merging: raw samples to a minimal loop of lines and arcs.

use std::f64::consts::{PI, TAU};

use camfov_geom::{Arc2d, Curve2d, CurveKind, GeomError, Line2d};
use camfov_math::Point2;

use crate::boundary::close_samples;
use crate::{FovSample, RetryableFailure, SampleKind};

/// Outcome of one primitive reconstruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconstruction {
    /// An arc was built.
    Arc(Arc2d),
    /// A line was built.
    Line(Line2d),
    /// Construction failed.
    Failed(GeomError),
}

impl From<Result<Arc2d, GeomError>> for Reconstruction {
    fn from(r: Result<Arc2d, GeomError>) -> Self {
        r.map_or_else(Reconstruction::Failed, Reconstruction::Arc)
    }
}

impl From<Result<Line2d, GeomError>> for Reconstruction {
    fn from(r: Result<Line2d, GeomError>) -> Self {
        r.map_or_else(Reconstruction::Failed, Reconstruction::Line)
    }
}

/// Builds boundary primitives. Swapped out in tests to inject failures.
pub trait SegmentBuilder {
    /// Straight segment `start → end`.
    fn line(&self, start: Point2, end: Point2) -> Reconstruction;

    /// Counter-clockwise arc on `(center, radius)` between two angles in
    /// radians.
    fn arc_centered(&self, center: Point2, radius: f64, start_angle: f64, end_angle: f64)
        -> Reconstruction;

    /// Arc through three points.
    fn arc_through(&self, start: Point2, mid: Point2, end: Point2) -> Reconstruction;
}

/// The default builder: exact curve construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactSegments;

impl SegmentBuilder for ExactSegments {
    fn line(&self, start: Point2, end: Point2) -> Reconstruction {
        Line2d::new(start, end).into()
    }

    fn arc_centered(
        &self,
        center: Point2,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Reconstruction {
        Arc2d::new(center, radius, start_angle, end_angle).into()
    }

    fn arc_through(&self, start: Point2, mid: Point2, end: Point2) -> Reconstruction {
        Arc2d::through_points(start, mid, end).into()
    }
}

fn bearing(center: &Point2, p: &Point2) -> f64 {
    (p.y - center.y).atan2(p.x - center.x)
}

struct Walker<'a, B: SegmentBuilder + ?Sized> {
    points: &'a [FovSample],
    center: Point2,
    tolerance: f64,
    builder: &'a B,
    out: Vec<Curve2d>,
}

impl<B: SegmentBuilder + ?Sized> Walker<'_, B> {
    fn coincident(&self, a: usize, b: usize) -> bool {
        (self.points[a].point - self.points[b].point).norm() <= self.tolerance
    }

    /// Line between samples `a` and `b`; nothing if too short or failed.
    fn line(&mut self, a: usize, b: usize) {
        let (p, q) = (self.points[a].point, self.points[b].point);
        if (q - p).norm() < self.tolerance {
            return;
        }
        match self.builder.line(p, q) {
            Reconstruction::Line(l) => self.out.push(Curve2d::Line(l)),
            Reconstruction::Arc(arc) => self.out.push(Curve2d::Arc(arc)),
            Reconstruction::Failed(e) => log::trace!("line {a}..{b} failed: {e}"),
        }
    }

    /// Take an arc reconstruction, falling back to a line on failure.
    fn arc_or_line(&mut self, r: Reconstruction, a: usize, b: usize) {
        match r {
            Reconstruction::Arc(arc) => self.out.push(Curve2d::Arc(arc)),
            Reconstruction::Line(l) => self.out.push(Curve2d::Line(l)),
            Reconstruction::Failed(e) => {
                log::trace!("arc {a}..{b} failed ({e}), using a line");
                self.line(a, b);
            }
        }
    }

    /// Arc around the camera from sample `a` to sample `b`.
    fn range_arc(&mut self, a: usize, b: usize) {
        let pa = self.points[a].point;
        let radius = (pa - self.center).norm();
        let r = self.builder.arc_centered(
            self.center,
            radius,
            bearing(&self.center, &pa),
            bearing(&self.center, &self.points[b].point),
        );
        self.arc_or_line(r, a, b);
    }

    /// Unobstructed rim from sample `i` to `j`.
    fn max_range_run(&mut self, i: usize, j: usize) {
        if !self.coincident(i, j) {
            self.range_arc(i, j);
            return;
        }
        if self.swept(i, j) <= PI {
            return;
        }
        // whole circle: split so the loop keeps three primitives
        if j - i < 3 {
            for k in i..j {
                self.range_arc(k, k + 1);
            }
            return;
        }
        let k1 = i + (j - i) / 3;
        let k2 = i + 2 * (j - i) / 3;
        self.range_arc(i, k1);
        self.range_arc(k1, k2);
        self.range_arc(k2, j);
    }

    /// Accumulated counter-clockwise bearing change over samples `i..=j`.
    fn swept(&self, i: usize, j: usize) -> f64 {
        (i..j)
            .map(|k| {
                let a = bearing(&self.center, &self.points[k].point);
                let b = bearing(&self.center, &self.points[k + 1].point);
                (b - a).rem_euclid(TAU)
            })
            .sum()
    }

    /// Samples `i..=j` all on one obstacle.
    fn hit_run(&mut self, i: usize, j: usize, kind: CurveKind) {
        if self.coincident(i, j) {
            return;
        }
        let mid = (i + j) / 2;
        if kind == CurveKind::Arc && mid > i && mid < j {
            let r = self.builder.arc_through(
                self.points[i].point,
                self.points[mid].point,
                self.points[j].point,
            );
            self.arc_or_line(r, i, j);
        } else {
            self.line(i, j);
        }
    }

    fn run(mut self) -> Vec<Curve2d> {
        let m = self.points.len();
        let mut i = 0;
        while i + 1 < m {
            let mut j = i;
            while j + 1 < m && self.points[i].same_run(&self.points[j + 1]) {
                j += 1;
            }
            if j == i {
                self.line(i, i + 1);
                i += 1;
                continue;
            }
            match self.points[i].kind {
                SampleKind::MaxRange => self.max_range_run(i, j),
                SampleKind::Hit { curve_kind, .. } => self.hit_run(i, j, curve_kind),
                SampleKind::Apex => {}
            }
            i = j;
        }
        self.out
    }
}

/// Merge runs of samples into boundary primitives.
///
/// Near-duplicate samples collapse and the sequence is closed first. A run
/// of unobstructed samples becomes one arc around `center`; a run on one
/// obstacle becomes an arc (arc obstacles) or a line; everything else is
/// joined by straight lines. The result is not validated.
pub fn simplify<B: SegmentBuilder + ?Sized>(
    samples: &[FovSample],
    center: Point2,
    tolerance: f64,
    builder: &B,
) -> Result<Vec<Curve2d>, RetryableFailure> {
    let points = close_samples(samples, tolerance)?;
    let walker = Walker {
        points: &points,
        center,
        tolerance,
        builder,
        out: Vec::new(),
    };
    Ok(walker.run())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use camfov_obstacles::ObstacleId;
    use std::f64::consts::FRAC_PI_4;

    const TOL: f64 = 1e-4;

    fn at(kind: SampleKind, angle_deg: f64, r: f64) -> FovSample {
        let (s, c) = angle_deg.to_radians().sin_cos();
        FovSample {
            point: Point2::new(r * c, r * s),
            kind,
        }
    }

    fn apex() -> FovSample {
        FovSample {
            point: Point2::origin(),
            kind: SampleKind::Apex,
        }
    }

    fn hit(id: u32, kind: CurveKind) -> SampleKind {
        SampleKind::Hit {
            obstacle: ObstacleId(id),
            curve_kind: kind,
        }
    }

    #[test]
    fn test_open_cone_is_line_arc_line() {
        let mut samples = vec![apex()];
        samples.extend((0..=9).map(|k| at(SampleKind::MaxRange, 45.0 + 10.0 * k as f64, 10.0)));
        let curves = simplify(&samples, Point2::origin(), TOL, &ExactSegments).unwrap();
        assert_eq!(curves.len(), 3);
        assert!(matches!(curves[0], Curve2d::Line(_)));
        let Curve2d::Arc(arc) = curves[1] else {
            panic!("expected arc");
        };
        assert_relative_eq!(arc.radius, 10.0, epsilon = 1e-9);
        assert_relative_eq!(arc.start_angle, FRAC_PI_4, epsilon = 1e-9);
        assert_relative_eq!(arc.sweep, 2.0 * FRAC_PI_4, epsilon = 1e-9);
        assert!(matches!(curves[2], Curve2d::Line(_)));
        assert_relative_eq!(curves[2].end(), Point2::origin());
    }

    #[test]
    fn test_hits_on_arc_obstacle_become_one_arc() {
        let mut samples = vec![apex()];
        samples.extend((0..5).map(|k| at(hit(3, CurveKind::Arc), 80.0 + 5.0 * k as f64, 6.0)));
        let curves = simplify(&samples, Point2::origin(), TOL, &ExactSegments).unwrap();
        assert_eq!(curves.len(), 3);
        let Curve2d::Arc(arc) = curves[1] else {
            panic!("expected arc");
        };
        assert_relative_eq!(arc.center, Point2::origin(), epsilon = 1e-9);
        assert!(arc.is_ccw());
    }

    #[test]
    fn test_two_hit_arc_run_is_a_line() {
        let samples = vec![
            apex(),
            at(hit(3, CurveKind::Arc), 80.0, 6.0),
            at(hit(3, CurveKind::Arc), 90.0, 6.0),
        ];
        let curves = simplify(&samples, Point2::origin(), TOL, &ExactSegments).unwrap();
        assert_eq!(curves.len(), 3);
        assert!(curves.iter().all(|c| matches!(c, Curve2d::Line(_))));
    }

    #[test]
    fn test_adjacent_obstacles_split_runs() {
        let samples = vec![
            apex(),
            at(hit(1, CurveKind::Line), 80.0, 5.0),
            at(hit(1, CurveKind::Line), 85.0, 5.0),
            at(hit(2, CurveKind::Line), 90.0, 5.0),
            at(hit(2, CurveKind::Line), 95.0, 5.0),
        ];
        let curves = simplify(&samples, Point2::origin(), TOL, &ExactSegments).unwrap();
        // apex->h1, run 1, h1->h2 bridge, run 2, back to apex
        assert_eq!(curves.len(), 5);
    }

    #[test]
    fn test_full_circle_split_in_three() {
        let samples: Vec<FovSample> = (0..36)
            .map(|k| at(SampleKind::MaxRange, 10.0 * k as f64, 5.0))
            .collect();
        let curves = simplify(&samples, Point2::origin(), TOL, &ExactSegments).unwrap();
        assert_eq!(curves.len(), 3);
        let total: f64 = curves
            .iter()
            .map(|c| match c {
                Curve2d::Arc(a) => a.sweep,
                Curve2d::Line(_) => 0.0,
            })
            .sum();
        assert_relative_eq!(total, TAU, epsilon = 1e-9);
    }

    struct NoArcs;

    impl SegmentBuilder for NoArcs {
        fn line(&self, start: Point2, end: Point2) -> Reconstruction {
            ExactSegments.line(start, end)
        }

        fn arc_centered(&self, _: Point2, _: f64, _: f64, _: f64) -> Reconstruction {
            Reconstruction::Failed(GeomError::DegenerateArc)
        }

        fn arc_through(&self, _: Point2, _: Point2, _: Point2) -> Reconstruction {
            Reconstruction::Failed(GeomError::CollinearPoints)
        }
    }

    #[test]
    fn test_failed_arc_falls_back_to_line() {
        let mut samples = vec![apex()];
        samples.extend((0..=9).map(|k| at(SampleKind::MaxRange, 45.0 + 10.0 * k as f64, 10.0)));
        let curves = simplify(&samples, Point2::origin(), TOL, &NoArcs).unwrap();
        assert_eq!(curves.len(), 3);
        assert!(matches!(curves[1], Curve2d::Line(_)));
    }
}
