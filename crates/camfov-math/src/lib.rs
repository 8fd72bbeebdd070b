#![warn(missing_docs)]

//! Math types for the camfov geometry pipeline.
//!
//! Thin wrappers around nalgebra providing the types shared by the
//! obstacle extractor and the FOV synthesizer: points, vectors,
//! affine placements, projection planes and length units.
//!
//! All lengths are meters internally. Convert at the boundary with
//! [`LengthUnit`].

use nalgebra::{Matrix4, Unit, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// A point in 3D model space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit direction in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A point in the 2D working plane.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in the 2D working plane.
pub type Vec2 = Vector2<f64>;

/// Shortest curve the host model can draw (about 0.00256 ft), in meters.
pub const SHORT_CURVE: f64 = 0.00078;

// =============================================================================
// Transform
// =============================================================================

/// Affine placement of model geometry, as a homogeneous 4x4 matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Homogeneous matrix; points are columns `[x, y, z, 1]`.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// No-op placement.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Shift by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            matrix: Matrix4::new_translation(&Vec3::new(dx, dy, dz)),
        }
    }

    /// Counter-clockwise turn about +Z by `angle` radians.
    pub fn rotation_z(angle: f64) -> Self {
        Self {
            matrix: Matrix4::from_axis_angle(&Vector3::z_axis(), angle),
        }
    }

    /// Turn about Z by `rotation_z_deg` degrees, then move by `translation`.
    pub fn placement(translation: Vec3, rotation_z_deg: f64) -> Self {
        Self::translation(translation.x, translation.y, translation.z)
            .then(&Self::rotation_z(rotation_z_deg.to_radians()))
    }

    /// `self * other`: applies `other` first.
    ///
    /// A nested frame inside an outer one composes as `outer.then(&local)`.
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Map a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        self.matrix.transform_point(p)
    }

    /// False if any entry is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.matrix.iter().all(|v| v.is_finite())
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

// =============================================================================
// Plane
// =============================================================================

/// Working plane with an orthonormal 2D frame.
///
/// Points are dropped orthogonally along the normal and expressed in
/// `(x_dir, y_dir)` coordinates. A +Z plane keeps world X/Y, so floor-plan
/// coordinates survive projection unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    /// A point on the plane; plane coordinate `(0, 0)`.
    pub origin: Point3,
    /// Plane u axis.
    pub x_dir: Dir3,
    /// Plane v axis.
    pub y_dir: Dir3,
    /// `x_dir × y_dir`.
    pub normal: Dir3,
}

impl Plane {
    /// Floor plane at elevation `z`.
    pub fn horizontal(z: f64) -> Self {
        Self {
            origin: Point3::new(0.0, 0.0, z),
            x_dir: Vector3::x_axis(),
            y_dir: Vector3::y_axis(),
            normal: Vector3::z_axis(),
        }
    }

    /// Plane through `origin` facing `normal`, with an arbitrary in-plane frame.
    ///
    /// `None` for a zero or non-finite normal.
    pub fn from_normal(origin: Point3, normal: Vec3) -> Option<Self> {
        let finite = normal.iter().chain(origin.coords.iter()).all(|v| v.is_finite());
        if !finite {
            return None;
        }
        let n = Dir3::try_new(normal, 1e-12)?;
        let seed = if n.y.abs() < 0.9 { Vec3::y() } else { Vec3::x() };
        let x = Dir3::new_normalize(seed.cross(n.as_ref()));
        let y = Dir3::new_normalize(n.cross(x.as_ref()));
        Some(Self {
            origin,
            x_dir: x,
            y_dir: y,
            normal: n,
        })
    }

    /// Plane coordinates of `p`.
    pub fn to_plane(&self, p: &Point3) -> Point2 {
        let d = p - self.origin;
        Point2::new(d.dot(self.x_dir.as_ref()), d.dot(self.y_dir.as_ref()))
    }
}

// =============================================================================
// Units and angles
// =============================================================================

/// Length unit of an external document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    /// Meters (internal unit).
    #[default]
    Meters,
    /// Millimeters.
    Millimeters,
    /// International feet.
    Feet,
}

impl LengthUnit {
    /// Meters per one unit.
    pub fn meters_per_unit(self) -> f64 {
        match self {
            LengthUnit::Meters => 1.0,
            LengthUnit::Millimeters => 0.001,
            LengthUnit::Feet => 0.3048,
        }
    }

    /// `value` in this unit, as meters.
    pub fn to_meters(self, value: f64) -> f64 {
        value * self.meters_per_unit()
    }

    /// `meters` expressed in this unit.
    pub fn from_meters(self, meters: f64) -> f64 {
        meters / self.meters_per_unit()
    }
}

/// Wrap an angle in degrees into `[0, 360)`.
pub fn normalize_degrees(deg: f64) -> f64 {
    let r = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if r >= 360.0 {
        0.0
    } else {
        r
    }
}

/// Unit vector at `deg` degrees counter-clockwise from +X.
pub fn direction_from_degrees(deg: f64) -> Vec2 {
    let (s, c) = deg.to_radians().sin_cos();
    Vec2::new(c, s)
}
