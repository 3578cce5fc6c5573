use crate::collision::aabb::BoundingBox;
use crate::math::ray::{Projection, Ray};
use crate::math::vec2::Vec2;

/// A circle, positioned relative to its owning body.
///
/// Circles are rotation-invariant, so unlike [`Polygon`] no geometry is
/// cached; `recalc` only refreshes the world-space center.
///
/// [`Polygon`]: crate::shapes::Polygon
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    /// Center offset from the owning body's position.
    pub offset: Vec2,
    pub radius: f64,
    center: Vec2,
}

impl Circle {
    pub fn new(radius: f64) -> Self {
        Self::with_offset(Vec2::ZERO, radius)
    }

    pub fn with_offset(offset: Vec2, radius: f64) -> Self {
        Self {
            offset,
            radius,
            center: offset,
        }
    }

    /// Refreshes the world-space center from the owning body's position.
    pub fn recalc(&mut self, pos: Vec2, _rotation: f64) {
        self.center = pos + self.offset;
    }

    /// Center in world coordinates.
    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(
            self.center.x - self.radius,
            self.center.y - self.radius,
            self.center.x + self.radius,
            self.center.y + self.radius,
        )
    }

    /// The point on the circle furthest along `direction`.
    pub fn furthest_point(&self, direction: Vec2) -> Vec2 {
        self.center + direction.normalize() * self.radius
    }

    pub fn project(&self, axis: Vec2) -> Projection {
        let c = self.center.dot(axis);
        Projection::new(c - self.radius, c + self.radius)
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        self.center.distance_squared(point) <= self.radius * self.radius
    }

    /// Nearest intersection of a ray with the circle within `max` time, in
    /// world coordinates.
    pub fn ray_cast(&self, ray: &Ray, max: f64) -> Option<Vec2> {
        let m = ray.origin - self.center;
        let b = m.dot(ray.dir);
        let c = m.magnitude_squared() - self.radius * self.radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        let toi = -b - root;
        if toi >= 0.0 && toi <= max {
            return Some(ray.point_at(toi));
        }
        // ray origin inside the circle, exit point is the first hit
        let toi = -b + root;
        if toi >= 0.0 && toi <= max {
            return Some(ray.point_at(toi));
        }
        None
    }

    pub fn moment_of_inertia(&self, mass: f64) -> f64 {
        mass * self.radius * self.radius / 2.0
    }
}
