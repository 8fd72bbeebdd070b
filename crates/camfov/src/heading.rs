//! Camera heading helpers.

use camfov_cone::CameraProfile;
use camfov_geom::{GeomError, Line2d};
use camfov_math::normalize_degrees;

/// View heading in degrees from a family placement rotation and the
/// user's extra rotation. A placement of 90° looks along +X.
pub fn heading_deg(placement_rotation_deg: f64, user_rotation_deg: f64) -> f64 {
    normalize_degrees(placement_rotation_deg - 90.0 + user_rotation_deg)
}

/// Line from the camera to its max-range point along the heading.
pub fn heading_indicator(camera: &CameraProfile) -> Result<Line2d, GeomError> {
    let tip = camera.position + camera.max_range * camera.direction();
    Line2d::new(camera.position, tip)
}
