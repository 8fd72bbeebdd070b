//! Camera description and ray angle sampling.

use camfov_math::{direction_from_degrees, Point2, Vec2};

use crate::{Result, SynthesisError};

/// Upper bound on rays per attempt.
const MAX_RAYS: f64 = 1_000_000.0;

/// Angle slack in degrees.
const ANGLE_EPS_DEG: f64 = 1e-9;

/// Camera position and view cone, fixed for one synthesis call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraProfile {
    /// Camera position in the working plane.
    pub position: Point2,
    /// View direction in degrees, counter-clockwise from +X.
    pub orientation_deg: f64,
    /// Half the field-of-view angle in degrees; 180 is a full circle.
    pub half_fov_deg: f64,
    /// Maximum visible distance.
    pub max_range: f64,
    /// Angle between consecutive rays in degrees.
    pub angular_resolution_deg: f64,
}

impl CameraProfile {
    /// Camera with a full field-of-view angle `fov_deg`.
    pub fn new(
        position: Point2,
        orientation_deg: f64,
        fov_deg: f64,
        max_range: f64,
        angular_resolution_deg: f64,
    ) -> Self {
        Self {
            position,
            orientation_deg,
            half_fov_deg: 0.5 * fov_deg,
            max_range,
            angular_resolution_deg,
        }
    }

    /// Check that the camera can be sampled.
    pub fn validate(&self) -> Result<()> {
        let finite = self.position.x.is_finite()
            && self.position.y.is_finite()
            && self.orientation_deg.is_finite()
            && self.half_fov_deg.is_finite()
            && self.max_range.is_finite()
            && self.angular_resolution_deg.is_finite();
        if !finite {
            return Err(SynthesisError::DegenerateCamera(
                "non-finite camera parameter".into(),
            ));
        }
        if self.max_range <= 0.0 {
            return Err(SynthesisError::DegenerateCamera(format!(
                "max_range must be positive, got {}",
                self.max_range
            )));
        }
        if self.angular_resolution_deg <= 0.0 {
            return Err(SynthesisError::DegenerateCamera(format!(
                "angular resolution must be positive, got {}",
                self.angular_resolution_deg
            )));
        }
        if self.half_fov_deg <= 0.0 || self.half_fov_deg > 180.0 {
            return Err(SynthesisError::DegenerateCamera(format!(
                "half field of view must be in (0, 180], got {}",
                self.half_fov_deg
            )));
        }
        if 2.0 * self.half_fov_deg / self.angular_resolution_deg > MAX_RAYS {
            return Err(SynthesisError::DegenerateCamera(format!(
                "angular resolution {} needs too many rays",
                self.angular_resolution_deg
            )));
        }
        Ok(())
    }

    /// True if the view covers the whole circle.
    pub fn is_full_circle(&self) -> bool {
        (2.0 * self.half_fov_deg - 360.0).abs() < ANGLE_EPS_DEG
    }

    /// Unit view direction.
    pub fn direction(&self) -> Vec2 {
        direction_from_degrees(self.orientation_deg)
    }

    /// Same camera sampled at another resolution.
    pub fn with_resolution(&self, angular_resolution_deg: f64) -> Self {
        Self {
            angular_resolution_deg,
            ..*self
        }
    }

    /// Same camera moved `distance` along its view direction.
    pub fn jittered(&self, distance: f64) -> Self {
        Self {
            position: self.position + distance * self.direction(),
            ..*self
        }
    }

    /// Ray angles in degrees.
    ///
    /// A full circle samples `i * res` while below 360. A cone samples
    /// `start + i * res` from `orientation - half` to `orientation + half`
    /// and always ends on the exact end angle.
    pub fn sample_angles(&self) -> Vec<f64> {
        let res = self.angular_resolution_deg;
        if self.is_full_circle() {
            return (0..)
                .map(|i| i as f64 * res)
                .take_while(|a| *a < 360.0 - ANGLE_EPS_DEG)
                .collect();
        }

        let start = self.orientation_deg - self.half_fov_deg;
        let end = self.orientation_deg + self.half_fov_deg;
        let steps = ((end - start) / res + ANGLE_EPS_DEG).floor() as usize;
        let mut angles: Vec<f64> = (0..=steps).map(|i| start + i as f64 * res).collect();
        if let Some(&last) = angles.last() {
            if end - last > ANGLE_EPS_DEG {
                angles.push(end);
            }
        }
        angles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cone(fov: f64, res: f64) -> CameraProfile {
        CameraProfile::new(Point2::origin(), 90.0, fov, 10.0, res)
    }

    #[test]
    fn test_cone_angles_hit_both_edges() {
        let angles = cone(90.0, 10.0).sample_angles();
        assert_eq!(angles.len(), 10);
        assert_relative_eq!(angles[0], 45.0);
        assert_relative_eq!(angles[9], 135.0, epsilon = 1e-9);
    }

    #[test]
    fn test_cone_appends_exact_end() {
        let angles = cone(93.0, 2.0).sample_angles();
        assert_relative_eq!(*angles.last().unwrap(), 136.5, epsilon = 1e-12);
        assert_relative_eq!(angles[angles.len() - 2], 135.5, epsilon = 1e-9);
    }

    #[test]
    fn test_full_circle_angles() {
        let cam = CameraProfile::new(Point2::origin(), 30.0, 360.0, 5.0, 0.5);
        assert!(cam.is_full_circle());
        let angles = cam.sample_angles();
        assert_eq!(angles.len(), 720);
        assert_relative_eq!(angles[0], 0.0);
        assert!(*angles.last().unwrap() < 360.0);
    }

    #[test]
    fn test_validate_rejects_degenerate() {
        assert!(cone(90.0, 1.0).validate().is_ok());
        assert!(cone(0.0, 1.0).validate().is_err());
        assert!(cone(400.0, 1.0).validate().is_err());
        assert!(cone(90.0, 0.0).validate().is_err());
        let mut cam = cone(90.0, 1.0);
        cam.max_range = 0.0;
        assert!(cam.validate().is_err());
        cam.max_range = 10.0;
        cam.position.x = f64::NAN;
        assert!(matches!(
            cam.validate(),
            Err(SynthesisError::DegenerateCamera(_))
        ));
    }

    #[test]
    fn test_jitter_moves_along_heading() {
        let cam = cone(90.0, 1.0).jittered(0.01);
        assert_relative_eq!(cam.position.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(cam.position.y, 0.01, epsilon = 1e-12);
    }
}
