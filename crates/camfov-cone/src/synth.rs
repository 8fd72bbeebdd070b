//! Tiered synthesis: exact reconstruction with retries, then a polygon.

use camfov_math::{Point2, SHORT_CURVE};
use camfov_obstacles::ObstacleSet;

use crate::boundary::fallback_polygon;
use crate::{
    sample_fov, simplify, BoundaryLoop, CameraProfile, ExactSegments, FovSample, Result,
    RetryableFailure, SegmentBuilder, SynthesisError,
};

/// Retry policy and tolerances.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisOptions {
    /// Coarser resolutions (degrees) tried after the requested one fails.
    pub fallback_ladder_deg: Vec<f64>,
    /// Camera displacement along its heading for jittered attempts.
    pub jitter_distance: f64,
    /// Point coincidence and minimum primitive length.
    pub tolerance: f64,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            fallback_ladder_deg: vec![0.5, 1.0, 2.0, 5.0],
            jitter_distance: 0.01,
            tolerance: SHORT_CURVE,
        }
    }
}

/// One rung of the retry ladder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attempt {
    /// Angular resolution in degrees.
    pub resolution_deg: f64,
    /// Whether the camera is nudged along its heading.
    pub jitter: bool,
}

impl SynthesisOptions {
    /// Attempts in order: the requested resolution without and with jitter,
    /// then every coarser ladder rung without and with jitter.
    pub fn attempts(&self, requested_deg: f64) -> Vec<Attempt> {
        std::iter::once(requested_deg)
            .chain(
                self.fallback_ladder_deg
                    .iter()
                    .copied()
                    .filter(|r| r.is_finite() && *r > requested_deg),
            )
            .flat_map(|resolution_deg| {
                [false, true].map(|jitter| Attempt {
                    resolution_deg,
                    jitter,
                })
            })
            .collect()
    }

    /// Reject a non-positive tolerance, a negative jitter or a bad ladder rung.
    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(SynthesisError::InvalidOptions(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if !(self.jitter_distance.is_finite() && self.jitter_distance >= 0.0) {
            return Err(SynthesisError::InvalidOptions(format!(
                "jitter distance must not be negative, got {}",
                self.jitter_distance
            )));
        }
        if let Some(r) = self
            .fallback_ladder_deg
            .iter()
            .find(|r| !(r.is_finite() && **r > 0.0))
        {
            return Err(SynthesisError::InvalidOptions(format!(
                "fallback resolution must be positive, got {r}"
            )));
        }
        Ok(())
    }

    fn camera_for(&self, camera: &CameraProfile, attempt: &Attempt) -> CameraProfile {
        let cam = camera.with_resolution(attempt.resolution_deg);
        if attempt.jitter {
            cam.jittered(self.jitter_distance)
        } else {
            cam
        }
    }
}

/// Turn samples into a validated, non-self-intersecting loop.
pub fn build_boundary<B: SegmentBuilder + ?Sized>(
    samples: &[FovSample],
    center: Point2,
    tolerance: f64,
    builder: &B,
) -> std::result::Result<BoundaryLoop, RetryableFailure> {
    let curves = simplify(samples, center, tolerance, builder)?;
    let boundary = BoundaryLoop::new(curves, tolerance)?;
    if !boundary.is_simple() {
        return Err(RetryableFailure::SelfIntersecting);
    }
    Ok(boundary)
}

/// A single tier: sample the camera as given and reconstruct.
pub fn synthesize_once<B: SegmentBuilder + ?Sized>(
    camera: &CameraProfile,
    obstacles: &ObstacleSet,
    tolerance: f64,
    builder: &B,
) -> std::result::Result<BoundaryLoop, RetryableFailure> {
    let samples = sample_fov(camera, obstacles);
    build_boundary(&samples, camera.position, tolerance, builder)
}

/// Synthesize a camera's visible-area boundary with the exact builder.
pub fn synthesize(
    camera: &CameraProfile,
    obstacles: &ObstacleSet,
    options: &SynthesisOptions,
) -> Result<BoundaryLoop> {
    synthesize_with(camera, obstacles, options, &ExactSegments)
}

/// Synthesize with a custom [`SegmentBuilder`].
///
/// Runs the attempt ladder from [`SynthesisOptions::attempts`]. If every
/// attempt fails, the raw samples of each attempt are tried as a
/// point-to-point polygon in the same order.
pub fn synthesize_with<B: SegmentBuilder + ?Sized>(
    camera: &CameraProfile,
    obstacles: &ObstacleSet,
    options: &SynthesisOptions,
    builder: &B,
) -> Result<BoundaryLoop> {
    options.validate()?;
    camera.validate()?;

    let attempts = options.attempts(camera.angular_resolution_deg);
    let mut failed: Vec<(CameraProfile, Vec<FovSample>)> = Vec::with_capacity(attempts.len());

    for (n, attempt) in attempts.iter().enumerate() {
        let cam = options.camera_for(camera, attempt);
        let samples = sample_fov(&cam, obstacles);
        match build_boundary(&samples, cam.position, options.tolerance, builder) {
            Ok(boundary) => {
                log::debug!(
                    "boundary at {}° (jitter: {}) on attempt {}: {} primitives",
                    attempt.resolution_deg,
                    attempt.jitter,
                    n + 1,
                    boundary.len()
                );
                return Ok(boundary);
            }
            Err(e) => {
                log::debug!(
                    "attempt {} at {}° (jitter: {}) failed: {e}",
                    n + 1,
                    attempt.resolution_deg,
                    attempt.jitter
                );
                failed.push((cam, samples));
            }
        }
    }

    let candidates: Vec<(f64, &[FovSample])> = failed
        .iter()
        .map(|(cam, samples)| (cam.angular_resolution_deg, samples.as_slice()))
        .collect();
    polygon_fallback(&candidates, options.tolerance).map_err(|last_error| {
        SynthesisError::NoValidBoundary {
            attempts: attempts.len() + candidates.len(),
            last_error,
        }
    })
}

/// First simple point-to-point polygon among the failed attempts' samples.
///
/// A self-intersecting polygon is returned only when no candidate yields a
/// simple one.
fn polygon_fallback(
    candidates: &[(f64, &[FovSample])],
    tolerance: f64,
) -> std::result::Result<BoundaryLoop, RetryableFailure> {
    let mut crossing: Option<(f64, BoundaryLoop)> = None;
    let mut last_error = RetryableFailure::TooFewPoints(0);
    for (resolution_deg, samples) in candidates {
        match fallback_polygon(samples, tolerance) {
            Ok(polygon) if polygon.is_simple() => {
                log::warn!(
                    "using point-to-point boundary ({} edges) at {}°",
                    polygon.len(),
                    resolution_deg
                );
                return Ok(polygon);
            }
            Ok(polygon) => {
                if crossing.is_none() {
                    crossing = Some((*resolution_deg, polygon));
                }
            }
            Err(e) => last_error = e,
        }
    }
    match crossing {
        Some((resolution_deg, polygon)) => {
            log::warn!(
                "using self-intersecting point-to-point boundary ({} edges) at {}°",
                polygon.len(),
                resolution_deg
            );
            Ok(polygon)
        }
        None => Err(last_error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Reconstruction;
    use approx::assert_relative_eq;
    use camfov_geom::{Arc2d, Curve2d, GeomError, Line2d};
    use camfov_obstacles::{ElementId, ObstacleSource};
    use std::f64::consts::{FRAC_PI_2, PI};

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn source() -> ObstacleSource {
        ObstacleSource {
            element: ElementId(1),
            link: None,
            category: None,
        }
    }

    fn walls(segments: &[((f64, f64), (f64, f64))]) -> ObstacleSet {
        ObstacleSet::from_curves(segments.iter().map(|(a, b)| {
            let line = Line2d::new(Point2::new(a.0, a.1), Point2::new(b.0, b.1)).unwrap();
            (Curve2d::Line(line), source())
        }))
    }

    fn assert_closed(boundary: &BoundaryLoop) {
        let curves = boundary.curves();
        let first = curves[0].start();
        let last = curves[curves.len() - 1].end();
        assert!((first - last).norm() <= SHORT_CURVE);
    }

    #[test]
    fn test_attempt_ladder_order() {
        let attempts = SynthesisOptions::default().attempts(0.75);
        let rungs: Vec<(f64, bool)> = attempts
            .iter()
            .map(|a| (a.resolution_deg, a.jitter))
            .collect();
        assert_eq!(
            rungs,
            vec![
                (0.75, false),
                (0.75, true),
                (1.0, false),
                (1.0, true),
                (2.0, false),
                (2.0, true),
                (5.0, false),
                (5.0, true),
            ]
        );
        // the requested rung is never repeated
        assert_eq!(SynthesisOptions::default().attempts(0.5).len(), 8);
        assert_eq!(SynthesisOptions::default().attempts(5.0).len(), 2);
    }

    #[test]
    fn test_open_cone_without_obstacles() {
        init();
        let cam = CameraProfile::new(Point2::origin(), 90.0, 90.0, 10.0, 10.0);
        let boundary =
            synthesize(&cam, &ObstacleSet::default(), &SynthesisOptions::default()).unwrap();
        let c = boundary.curves();
        assert_eq!(c.len(), 3);

        let Curve2d::Line(first) = c[0] else {
            panic!("expected apex line");
        };
        assert_relative_eq!(first.start, Point2::origin(), epsilon = 1e-12);
        let rim_start = Point2::new(10.0 * (PI / 4.0).cos(), 10.0 * (PI / 4.0).sin());
        assert_relative_eq!(first.end, rim_start, epsilon = 1e-9);

        let Curve2d::Arc(arc) = c[1] else {
            panic!("expected rim arc");
        };
        assert_relative_eq!(arc.radius, 10.0, epsilon = 1e-9);
        assert_relative_eq!(arc.sweep, FRAC_PI_2, epsilon = 1e-9);

        assert!(matches!(c[2], Curve2d::Line(_)));
        assert_relative_eq!(c[2].end(), Point2::origin(), epsilon = 1e-12);
        assert_closed(&boundary);
    }

    #[test]
    fn test_hits_on_one_wall_become_one_line() {
        let obstacles = walls(&[((-100.0, 5.0), (100.0, 5.0))]);
        // 70, 80, 90, 100, 110 degrees: five hits
        let cam = CameraProfile::new(Point2::origin(), 90.0, 40.0, 10.0, 10.0);
        let boundary = synthesize(&cam, &obstacles, &SynthesisOptions::default()).unwrap();
        let c = boundary.curves();
        assert_eq!(c.len(), 3);
        let Curve2d::Line(run) = c[1] else {
            panic!("expected wall line");
        };
        assert_relative_eq!(run.start.y, 5.0, epsilon = 1e-9);
        assert_relative_eq!(run.end.y, 5.0, epsilon = 1e-9);
        assert!(run.start.x > 0.0 && run.end.x < 0.0);
    }

    #[test]
    fn test_room_full_circle() {
        init();
        let obstacles = walls(&[
            ((-2.0, -2.0), (2.0, -2.0)),
            ((2.0, -2.0), (2.0, 2.0)),
            ((2.0, 2.0), (-2.0, 2.0)),
            ((-2.0, 2.0), (-2.0, -2.0)),
        ]);
        let cam = CameraProfile::new(Point2::origin(), 0.0, 360.0, 10.0, 0.5);
        let boundary = synthesize(&cam, &obstacles, &SynthesisOptions::default()).unwrap();
        assert!(boundary.is_simple());
        assert!(boundary.curves().iter().all(|c| matches!(c, Curve2d::Line(_))));
        assert_relative_eq!(boundary.area(), 16.0, epsilon = 0.01);
        assert_closed(&boundary);
    }

    #[test]
    fn test_unobstructed_full_circle() {
        let cam = CameraProfile::new(Point2::new(3.0, -1.0), 45.0, 360.0, 5.0, 1.0);
        let boundary =
            synthesize(&cam, &ObstacleSet::default(), &SynthesisOptions::default()).unwrap();
        assert_eq!(boundary.len(), 3);
        assert!(boundary.curves().iter().all(|c| matches!(c, Curve2d::Arc(_))));
        assert_relative_eq!(boundary.area(), 25.0 * PI, epsilon = 1e-6);
    }

    #[test]
    fn test_column_shadow() {
        let column = Arc2d::new(Point2::new(4.0, 0.0), 0.5, -PI, PI).unwrap();
        let obstacles = ObstacleSet::from_curves([(Curve2d::Arc(column), source())]);
        let cam = CameraProfile::new(Point2::origin(), 0.0, 60.0, 8.0, 0.5);
        let boundary = synthesize(&cam, &obstacles, &SynthesisOptions::default()).unwrap();
        assert!(boundary.is_simple());
        // the near face of the column is one arc
        let arcs_on_column = boundary
            .curves()
            .iter()
            .filter(|c| matches!(c, Curve2d::Arc(a) if (a.radius - 0.5).abs() < 1e-6))
            .count();
        assert_eq!(arcs_on_column, 1);
        let sector = 8.0 * 8.0 * PI / 6.0;
        assert!(boundary.area() < sector);
    }

    #[test]
    fn test_resynthesis_is_idempotent() {
        let obstacles = walls(&[((3.0, -5.0), (3.0, 5.0)), ((-1.0, 2.0), (1.0, 4.0))]);
        let cam = CameraProfile::new(Point2::new(0.5, 0.5), 30.0, 93.0, 12.0, 0.5);
        let options = SynthesisOptions::default();
        let a = synthesize(&cam, &obstacles, &options).unwrap();
        let b = synthesize(&cam, &obstacles, &options).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_wall_mounted_camera_recovers_by_jitter() {
        init();
        let obstacles = walls(&[
            ((-5.0, 0.0), (5.0, 0.0)),
            ((5.0, 0.0), (5.0, 8.0)),
            ((5.0, 8.0), (-5.0, 8.0)),
            ((-5.0, 8.0), (-5.0, 0.0)),
        ]);
        let cam = CameraProfile::new(Point2::origin(), 90.0, 93.0, 20.0, 0.5);

        // every ray starts on the wall the camera hangs on
        let first = synthesize_once(&cam, &obstacles, SHORT_CURVE, &ExactSegments);
        assert!(matches!(first, Err(RetryableFailure::TooFewPoints(_))));

        let boundary = synthesize(&cam, &obstacles, &SynthesisOptions::default()).unwrap();
        assert!(boundary.is_simple());
        assert!(boundary.len() < 12, "merged loop, got {} primitives", boundary.len());
        assert_relative_eq!(boundary.curves()[0].start(), Point2::new(0.0, 0.01), epsilon = 1e-9);
        // room above the camera minus the two side wedges outside the cone
        let wedge = 0.5 * 5.0 * 5.0 * 43.5f64.to_radians().tan();
        assert_relative_eq!(boundary.area(), 10.0 * 7.99 - 2.0 * wedge, epsilon = 0.05);
        assert_closed(&boundary);
    }

    fn raw(points: &[(f64, f64)]) -> Vec<FovSample> {
        points
            .iter()
            .map(|&(x, y)| FovSample {
                point: Point2::new(x, y),
                kind: crate::SampleKind::MaxRange,
            })
            .collect()
    }

    #[test]
    fn test_polygon_fallback_prefers_simple_candidate() {
        let bowtie = raw(&[(0.0, 0.0), (1.0, 1.0), (1.0, 0.0), (0.0, 1.0)]);
        let square = raw(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);

        let picked =
            polygon_fallback(&[(0.5, bowtie.as_slice()), (1.0, square.as_slice())], SHORT_CURVE)
                .unwrap();
        assert!(picked.is_simple());
        assert_relative_eq!(picked.area().abs(), 4.0, epsilon = 1e-9);

        let only = polygon_fallback(&[(0.5, bowtie.as_slice())], SHORT_CURVE).unwrap();
        assert!(!only.is_simple());

        let none = polygon_fallback(&[(0.5, raw(&[(0.0, 0.0)]).as_slice())], SHORT_CURVE);
        assert!(matches!(none, Err(RetryableFailure::TooFewPoints(_))));
    }

    #[test]
    fn test_invalid_options_rejected() {
        let cam = CameraProfile::new(Point2::origin(), 0.0, 90.0, 5.0, 1.0);
        let bad = [
            SynthesisOptions {
                tolerance: 0.0,
                ..SynthesisOptions::default()
            },
            SynthesisOptions {
                jitter_distance: -0.01,
                ..SynthesisOptions::default()
            },
            SynthesisOptions {
                fallback_ladder_deg: vec![1.0, f64::NAN],
                ..SynthesisOptions::default()
            },
        ];
        for options in &bad {
            assert!(matches!(
                synthesize(&cam, &ObstacleSet::default(), options),
                Err(SynthesisError::InvalidOptions(_))
            ));
        }
        assert!(SynthesisOptions::default().validate().is_ok());
    }

    struct Broken;

    impl SegmentBuilder for Broken {
        fn line(&self, _: Point2, _: Point2) -> Reconstruction {
            Reconstruction::Failed(GeomError::DegenerateLine)
        }

        fn arc_centered(&self, _: Point2, _: f64, _: f64, _: f64) -> Reconstruction {
            Reconstruction::Failed(GeomError::DegenerateArc)
        }

        fn arc_through(&self, _: Point2, _: Point2, _: Point2) -> Reconstruction {
            Reconstruction::Failed(GeomError::CollinearPoints)
        }
    }

    #[test]
    fn test_broken_builder_degrades_to_polygon() {
        init();
        let cam = CameraProfile::new(Point2::origin(), 90.0, 90.0, 10.0, 10.0);
        let boundary =
            synthesize_with(&cam, &ObstacleSet::default(), &SynthesisOptions::default(), &Broken)
                .unwrap();
        // apex plus ten rim points
        assert_eq!(boundary.len(), 11);
        assert!(boundary.curves().iter().all(|c| matches!(c, Curve2d::Line(_))));
        assert_closed(&boundary);
    }

    #[test]
    fn test_single_tier_reports_retryable_failure() {
        let cam = CameraProfile::new(Point2::origin(), 90.0, 90.0, 10.0, 10.0);
        let empty = ObstacleSet::default();
        let ok = synthesize_once(&cam, &empty, SHORT_CURVE, &ExactSegments).unwrap();
        assert_eq!(ok.len(), 3);
        let err = synthesize_once(&cam, &empty, SHORT_CURVE, &Broken).unwrap_err();
        assert_eq!(
            err,
            RetryableFailure::InvalidLoop(crate::LoopError::TooFewPrimitives(0))
        );
    }

    #[test]
    fn test_too_few_points_is_terminal() {
        let cam = CameraProfile::new(Point2::origin(), 0.0, 90.0, 0.0003, 5.0);
        let err =
            synthesize(&cam, &ObstacleSet::default(), &SynthesisOptions::default()).unwrap_err();
        match err {
            SynthesisError::NoValidBoundary {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 4);
                assert!(matches!(last_error, RetryableFailure::TooFewPoints(_)));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_degenerate_camera_is_rejected() {
        let cam = CameraProfile::new(Point2::origin(), 0.0, 90.0, -1.0, 1.0);
        assert!(matches!(
            synthesize(&cam, &ObstacleSet::default(), &SynthesisOptions::default()),
            Err(SynthesisError::DegenerateCamera(_))
        ));
    }
}
