use crate::math::vec2::Vec2;

/// A ray with an origin and a unit-length direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec2,
    pub dir: Vec2,
}

impl Ray {
    /// Creates a ray; the direction is normalized at construction.
    pub fn new(origin: Vec2, dir: Vec2) -> Self {
        Self {
            origin,
            dir: dir.normalize(),
        }
    }

    /// Intersects the ray with the line segment from `begin` to `end`.
    /// Returns the parametric time of intersection (>= 0), or -1.0 if the
    /// ray misses the segment.
    pub fn intersect(&self, begin: Vec2, end: Vec2) -> f64 {
        let slope = end - begin;
        let numerator = begin - self.origin;
        let divisor = self.dir.cross(slope);

        // Parallel (possibly collinear) segment never reports a hit.
        if divisor == 0.0 {
            return -1.0;
        }

        let t = numerator.cross(slope) / divisor;
        if t >= 0.0 {
            let u = numerator.cross(self.dir) / divisor;
            let len = slope.magnitude();
            if len > 0.0 {
                let u = u / len;
                if (0.0..=1.0).contains(&u) {
                    return t;
                }
            }
        }
        -1.0
    }

    /// The point along the ray at the given parametric time.
    pub fn point_at(&self, time: f64) -> Vec2 {
        self.origin + self.dir * time
    }
}

/// A one dimensional projection of a shape onto an axis, used by the
/// separating axis test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub min: f64,
    pub max: f64,
}

impl Projection {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Signed overlap with another projection. Zero or negative means the
    /// intervals are disjoint, which on any axis proves the shapes do not
    /// intersect.
    pub fn overlap(&self, other: &Projection) -> f64 {
        self.max.min(other.max) - self.min.max(other.min)
    }
}
