pub mod circle;
pub mod edge;
pub mod polygon;

pub use circle::Circle;
pub use edge::Edge;
pub use polygon::Polygon;

use crate::collision::aabb::BoundingBox;
use crate::math::ray::{Projection, Ray};
use crate::math::vec2::Vec2;

/// Discriminant of a [`Shape`], used for logging and dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Circle,
    Polygon,
    Edge,
}

/// The geometric shape attached to a body.
///
/// A tagged union instead of trait objects so the narrowphase jump table
/// can dispatch on the pair of kinds with an exhaustive match.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Polygon(Polygon),
    Edge(Edge),
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Circle(_) => ShapeKind::Circle,
            Shape::Polygon(_) => ShapeKind::Polygon,
            Shape::Edge(_) => ShapeKind::Edge,
        }
    }

    /// Refreshes cached world-space geometry from the owning body's
    /// transform. Must be called whenever the body moves or rotates,
    /// before any world-space query.
    pub fn recalc(&mut self, pos: Vec2, rotation: f64) {
        match self {
            Shape::Circle(c) => c.recalc(pos, rotation),
            Shape::Polygon(p) => p.recalc(pos, rotation),
            Shape::Edge(e) => e.recalc(pos, rotation),
        }
    }

    /// Geometric center in world coordinates.
    pub fn center(&self) -> Vec2 {
        match self {
            Shape::Circle(c) => c.center(),
            Shape::Polygon(p) => p.center(),
            Shape::Edge(e) => e.center(),
        }
    }

    /// Tight world-space bounding box.
    pub fn bounds(&self) -> BoundingBox {
        match self {
            Shape::Circle(c) => c.bounds(),
            Shape::Polygon(p) => p.bounds(),
            Shape::Edge(e) => e.bounds(),
        }
    }

    /// Support point: the point on the shape furthest along `direction`.
    pub fn furthest_point(&self, direction: Vec2) -> Vec2 {
        match self {
            Shape::Circle(c) => c.furthest_point(direction),
            Shape::Polygon(p) => p.furthest_point(direction),
            Shape::Edge(e) => e.furthest_point(direction),
        }
    }

    /// Scalar interval of the shape projected onto `axis`.
    pub fn project(&self, axis: Vec2) -> Projection {
        match self {
            Shape::Circle(c) => c.project(axis),
            Shape::Polygon(p) => p.project(axis),
            Shape::Edge(e) => e.project(axis),
        }
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        match self {
            Shape::Circle(c) => c.contains_point(point),
            Shape::Polygon(p) => p.contains_point(point),
            Shape::Edge(e) => e.contains_point(point),
        }
    }

    /// Nearest ray intersection within `max` time, in world coordinates.
    pub fn ray_cast(&self, ray: &Ray, max: f64) -> Option<Vec2> {
        match self {
            Shape::Circle(c) => c.ray_cast(ray, max),
            Shape::Polygon(p) => p.ray_cast(ray, max),
            Shape::Edge(e) => e.ray_cast(ray, max),
        }
    }

    /// Moment of inertia about the shape's local origin for the given mass.
    pub fn moment_of_inertia(&self, mass: f64) -> f64 {
        match self {
            Shape::Circle(c) => c.moment_of_inertia(mass),
            Shape::Polygon(p) => p.moment_of_inertia(mass),
            Shape::Edge(e) => e.moment_of_inertia(mass),
        }
    }
}
