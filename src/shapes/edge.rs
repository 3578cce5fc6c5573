use crate::collision::aabb::BoundingBox;
use crate::math::ray::{Projection, Ray};
use crate::math::vec2::Vec2;

/// A line segment collision shape, endpoints in the owning body's local
/// frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub begin: Vec2,
    pub end: Vec2,
    t_begin: Vec2,
    t_end: Vec2,
}

impl Edge {
    pub fn new(begin: Vec2, end: Vec2) -> Self {
        Self {
            begin,
            end,
            t_begin: begin,
            t_end: end,
        }
    }

    /// Refreshes the world-space endpoints from the owning body's
    /// transform.
    pub fn recalc(&mut self, pos: Vec2, rotation: f64) {
        self.t_begin = self.begin.rotate(rotation) + pos;
        self.t_end = self.end.rotate(rotation) + pos;
    }

    /// Begin endpoint in world coordinates.
    pub fn world_begin(&self) -> Vec2 {
        self.t_begin
    }

    /// End endpoint in world coordinates.
    pub fn world_end(&self) -> Vec2 {
        self.t_end
    }

    /// Midpoint in world coordinates.
    pub fn center(&self) -> Vec2 {
        self.t_begin.average(self.t_end)
    }

    pub fn length(&self) -> f64 {
        self.t_begin.distance(self.t_end)
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(
            self.t_begin.x.min(self.t_end.x),
            self.t_begin.y.min(self.t_end.y),
            self.t_begin.x.max(self.t_end.x),
            self.t_begin.y.max(self.t_end.y),
        )
    }

    /// The endpoint furthest along `direction`.
    pub fn furthest_point(&self, direction: Vec2) -> Vec2 {
        if direction.dot(self.t_begin) > direction.dot(self.t_end) {
            self.t_begin
        } else {
            self.t_end
        }
    }

    pub fn project(&self, axis: Vec2) -> Projection {
        let a = self.t_begin.dot(axis);
        let b = self.t_end.dot(axis);
        Projection::new(a.min(b), a.max(b))
    }

    /// An infinitely thin segment contains no points.
    pub fn contains_point(&self, _point: Vec2) -> bool {
        false
    }

    pub fn ray_cast(&self, ray: &Ray, max: f64) -> Option<Vec2> {
        let time = ray.intersect(self.t_begin, self.t_end);
        if time >= 0.0 && time <= max {
            Some(ray.point_at(time))
        } else {
            None
        }
    }

    pub fn moment_of_inertia(&self, mass: f64) -> f64 {
        let half_length = self.end.distance(self.begin) / 2.0;
        mass * half_length * half_length
    }
}
