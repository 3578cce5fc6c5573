use crate::collision::aabb::BoundingBox;
use crate::error::PhysicsError;
use crate::math::ray::{Projection, Ray};
use crate::math::vec2::Vec2;

/// A convex polygon defined by vertices in the owning body's local frame.
///
/// Points must describe a convex loop with consistent winding; behavior on
/// non-convex input is undefined. World-space vertices and face normals are
/// cached and refreshed once per step by `recalc`.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    /// Offset from the owning body's position.
    pub offset: Vec2,
    points: Vec<Vec2>,
    transformed: Vec<Vec2>,
    axes: Vec<Vec2>,
    center: Vec2,
}

impl Polygon {
    /// Creates a polygon from local-space points.
    pub fn new(points: Vec<Vec2>) -> Result<Self, PhysicsError> {
        if points.len() < 3 {
            return Err(PhysicsError::DegeneratePolygon {
                points: points.len(),
            });
        }
        Ok(Self::from_parts(Vec2::ZERO, points))
    }

    /// An axis-aligned box centered on the owning body, the degenerate
    /// polygon case used for box collision.
    pub fn from_box(width: f64, height: f64) -> Self {
        let hw = width / 2.0;
        let hh = height / 2.0;
        Self::from_parts(
            Vec2::ZERO,
            vec![
                Vec2::new(-hw, -hh),
                Vec2::new(hw, -hh),
                Vec2::new(hw, hh),
                Vec2::new(-hw, hh),
            ],
        )
    }

    fn from_parts(offset: Vec2, points: Vec<Vec2>) -> Self {
        let mut polygon = Self {
            offset,
            transformed: Vec::with_capacity(points.len()),
            axes: Vec::with_capacity(points.len()),
            points,
            center: offset,
        };
        polygon.recalc(Vec2::ZERO, 0.0);
        polygon
    }

    /// Recomputes the cached world-space vertices and face normals from the
    /// owning body's transform.
    pub fn recalc(&mut self, pos: Vec2, rotation: f64) {
        let world = pos + self.offset;
        self.transformed.clear();
        for point in &self.points {
            self.transformed.push(point.rotate(rotation) + world);
        }

        self.axes.clear();
        let n = self.transformed.len();
        for i in 0..n {
            let edge = self.transformed[i] - self.transformed[(i + 1) % n];
            self.axes.push(edge.normal());
        }

        self.center = world;
    }

    /// Center in world coordinates.
    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Vertices in world coordinates, as of the last `recalc`.
    pub fn transformed_points(&self) -> &[Vec2] {
        &self.transformed
    }

    /// Face normals in world coordinates, the polygon's SAT axes.
    pub fn axes(&self) -> &[Vec2] {
        &self.axes
    }

    pub fn bounds(&self) -> BoundingBox {
        // a polygon always has at least 3 transformed points
        BoundingBox::from_points(&self.transformed)
            .unwrap_or(BoundingBox::new(self.center.x, self.center.y, self.center.x, self.center.y))
    }

    /// The vertex furthest along `direction`.
    pub fn furthest_point(&self, direction: Vec2) -> Vec2 {
        let mut furthest = self.transformed[0];
        let mut max_distance = f64::NEG_INFINITY;
        for &point in &self.transformed {
            let distance = direction.dot(point);
            if distance > max_distance {
                max_distance = distance;
                furthest = point;
            }
        }
        furthest
    }

    pub fn project(&self, axis: Vec2) -> Projection {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &point in &self.transformed {
            let scalar = point.dot(axis);
            min = min.min(scalar);
            max = max.max(scalar);
        }
        Projection::new(min, max)
    }

    /// Point-in-polygon test by ray parity: cast toward +x and count edge
    /// crossings.
    pub fn contains_point(&self, point: Vec2) -> bool {
        let test_ray = Ray::new(point, Vec2::new(1.0, 0.0));
        let n = self.transformed.len();
        let mut crossings = 0;
        for i in 0..n {
            let begin = self.transformed[i];
            let end = self.transformed[(i + 1) % n];
            if test_ray.intersect(begin, end) >= 0.0 {
                crossings += 1;
            }
        }
        crossings % 2 == 1
    }

    /// Nearest intersection of a ray with the polygon's sides within `max`
    /// time, in world coordinates.
    pub fn ray_cast(&self, ray: &Ray, max: f64) -> Option<Vec2> {
        let n = self.transformed.len();
        let mut min_time = f64::MAX;
        let mut found = false;
        for i in 0..n {
            let begin = self.transformed[i];
            let end = self.transformed[(i + 1) % n];
            let time = ray.intersect(begin, end);
            if time >= 0.0 && time < min_time {
                min_time = time;
                found = true;
            }
        }
        if found && min_time <= max {
            Some(ray.point_at(min_time))
        } else {
            None
        }
    }

    /// Moment of inertia of the polygon about its local origin.
    pub fn moment_of_inertia(&self, mass: f64) -> f64 {
        let mut numerator = 0.0;
        let mut denominator = 0.0;
        let n = self.points.len();
        for i in 0..n {
            let p0 = self.points[i];
            let p1 = self.points[(i + 1) % n];
            let cross_term = p1.cross(p0);
            numerator += cross_term * (p0.dot(p0) + p0.dot(p1) + p1.dot(p1));
            denominator += cross_term;
        }
        if denominator == 0.0 {
            return 0.0;
        }
        (mass / 6.0) * (numerator / denominator)
    }
}
