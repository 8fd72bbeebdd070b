//! Finite 2D rays and nearest-obstacle queries.

use camfov_geom::{Aabb2, CurveKind};
use camfov_math::{direction_from_degrees, Point2, Vec2};
use camfov_obstacles::{ObstacleCurve, ObstacleId, ObstacleSet};

/// A ray segment from `origin` out to `length` along a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray2 {
    /// Origin of the ray.
    pub origin: Point2,
    /// Unit direction.
    pub direction: Vec2,
    /// Length of the ray.
    pub length: f64,
}

impl Ray2 {
    /// Ray at `angle_deg` degrees counter-clockwise from +X.
    pub fn from_angle(origin: Point2, angle_deg: f64, length: f64) -> Self {
        Self {
            origin,
            direction: direction_from_degrees(angle_deg),
            length,
        }
    }

    /// Point at distance `d` along the ray.
    #[inline]
    pub fn at(&self, d: f64) -> Point2 {
        self.origin + d * self.direction
    }

    /// Far end of the ray.
    pub fn end(&self) -> Point2 {
        self.at(self.length)
    }

    /// Bounding box of the ray segment.
    pub fn bbox(&self) -> Aabb2 {
        Aabb2::from_segment(self.origin, self.end())
    }
}

/// Nearest obstacle intersection along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Intersection point.
    pub point: Point2,
    /// Distance from the ray origin.
    pub distance: f64,
    /// Obstacle that was hit.
    pub obstacle: ObstacleId,
    /// Shape of that obstacle.
    pub curve_kind: CurveKind,
}

/// Obstacles with precomputed bounding boxes, queried once per ray.
pub struct Raycaster<'a> {
    entries: Vec<(Aabb2, &'a ObstacleCurve)>,
}

impl<'a> Raycaster<'a> {
    /// Index an obstacle set.
    pub fn new(obstacles: &'a ObstacleSet) -> Self {
        let entries = obstacles
            .iter()
            .map(|o| (Aabb2::of_curve(&o.curve).expand(1e-9), o))
            .collect();
        Self { entries }
    }

    /// Closest hit along `ray`. Ties keep the obstacle listed first.
    pub fn cast(&self, ray: &Ray2) -> Option<RayHit> {
        let ray_box = ray.bbox();
        let mut best: Option<RayHit> = None;
        for (bbox, obstacle) in &self.entries {
            if !bbox.overlaps(&ray_box) {
                continue;
            }
            for hit in obstacle.curve.intersect_segment(ray.origin, ray.end()) {
                let distance = hit.t * ray.length;
                if best.map_or(true, |b| distance < b.distance) {
                    best = Some(RayHit {
                        point: hit.point,
                        distance,
                        obstacle: obstacle.id,
                        curve_kind: obstacle.curve.kind(),
                    });
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use camfov_geom::{Arc2d, Curve2d, Line2d};
    use camfov_obstacles::{ElementId, ObstacleSource};

    fn source() -> ObstacleSource {
        ObstacleSource {
            element: ElementId(1),
            link: None,
            category: None,
        }
    }

    fn wall(y: f64) -> (Curve2d, ObstacleSource) {
        let line = Line2d::new(Point2::new(-10.0, y), Point2::new(10.0, y)).unwrap();
        (Curve2d::Line(line), source())
    }

    #[test]
    fn test_nearest_of_two_walls() {
        let set = ObstacleSet::from_curves([wall(5.0), wall(3.0)]);
        let caster = Raycaster::new(&set);
        let hit = caster
            .cast(&Ray2::from_angle(Point2::origin(), 90.0, 10.0))
            .unwrap();
        assert_eq!(hit.obstacle, ObstacleId(1));
        assert_relative_eq!(hit.distance, 3.0, epsilon = 1e-12);
        assert_eq!(hit.curve_kind, CurveKind::Line);
    }

    #[test]
    fn test_out_of_range_is_miss() {
        let set = ObstacleSet::from_curves([wall(12.0)]);
        let caster = Raycaster::new(&set);
        assert!(caster
            .cast(&Ray2::from_angle(Point2::origin(), 90.0, 10.0))
            .is_none());
    }

    #[test]
    fn test_tie_keeps_first_obstacle() {
        let set = ObstacleSet::from_curves([wall(4.0), wall(4.0)]);
        let hit = Raycaster::new(&set)
            .cast(&Ray2::from_angle(Point2::origin(), 90.0, 10.0))
            .unwrap();
        assert_eq!(hit.obstacle, ObstacleId(0));
    }

    #[test]
    fn test_column_hit_on_near_side() {
        let pi = std::f64::consts::PI;
        let column = Arc2d::new(Point2::new(5.0, 0.0), 1.0, -pi, pi).unwrap();
        let set = ObstacleSet::from_curves([(Curve2d::Arc(column), source())]);
        let hit = Raycaster::new(&set)
            .cast(&Ray2::from_angle(Point2::origin(), 0.0, 10.0))
            .unwrap();
        assert_relative_eq!(hit.point, Point2::new(4.0, 0.0), epsilon = 1e-9);
        assert_eq!(hit.curve_kind, CurveKind::Arc);
    }
}
