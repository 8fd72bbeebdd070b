//! Boundary samples produced by ray casting.

use camfov_geom::CurveKind;
use camfov_math::Point2;
use camfov_obstacles::{ObstacleId, ObstacleSet};

use crate::{CameraProfile, Ray2, Raycaster};

/// What produced a boundary sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    /// The camera vertex of a cone.
    Apex,
    /// The ray reached full range unobstructed.
    MaxRange,
    /// The ray stopped on an obstacle.
    Hit {
        /// Obstacle that was hit.
        obstacle: ObstacleId,
        /// Shape of that obstacle.
        curve_kind: CurveKind,
    },
}

/// One raw boundary point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FovSample {
    /// Sample position.
    pub point: Point2,
    /// How the sample was produced.
    pub kind: SampleKind,
}

impl FovSample {
    /// True if both samples come from the same obstacle, or both reached
    /// full range.
    pub fn same_run(&self, other: &FovSample) -> bool {
        match (self.kind, other.kind) {
            (SampleKind::MaxRange, SampleKind::MaxRange) => true,
            (SampleKind::Hit { obstacle: a, .. }, SampleKind::Hit { obstacle: b, .. }) => a == b,
            _ => false,
        }
    }
}

/// Cast one ray per sample angle. Cones start with the camera vertex.
pub fn sample_fov(camera: &CameraProfile, obstacles: &ObstacleSet) -> Vec<FovSample> {
    let caster = Raycaster::new(obstacles);
    let angles = camera.sample_angles();
    let mut samples = Vec::with_capacity(angles.len() + 1);
    if !camera.is_full_circle() {
        samples.push(FovSample {
            point: camera.position,
            kind: SampleKind::Apex,
        });
    }
    for angle in angles {
        let ray = Ray2::from_angle(camera.position, angle, camera.max_range);
        let sample = match caster.cast(&ray) {
            Some(hit) => FovSample {
                point: hit.point,
                kind: SampleKind::Hit {
                    obstacle: hit.obstacle,
                    curve_kind: hit.curve_kind,
                },
            },
            None => FovSample {
                point: ray.end(),
                kind: SampleKind::MaxRange,
            },
        };
        samples.push(sample);
    }
    samples
}
