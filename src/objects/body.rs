use crate::collision::aabb::BoundingBox;
use crate::math::vec2::Vec2;
use crate::shapes::Shape;

/// How a body participates in collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Never considered by the broadphase at all.
    PreventCollision,
    /// Detected and reported, but never moved by resolution and never
    /// pushes others.
    Passive,
    /// Fully simulated: pushed out of overlap and velocity-resolved.
    Active,
    /// Like Active, but the arcade solver reflects velocity on contact.
    Elastic,
    /// Immovable. Infinite effective mass and moment of inertia.
    Fixed,
}

/// Per-entity physical state: one body owns exactly one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Position of the body in world coordinates.
    pub pos: Vec2,
    /// Position at the start of the current step.
    pub old_pos: Vec2,
    /// Velocity in pixels per second.
    pub vel: Vec2,
    /// Velocity at the start of the current step.
    pub old_vel: Vec2,
    /// Acceleration in pixels per second per second.
    pub acc: Vec2,
    /// Rotation in radians.
    pub rotation: f64,
    /// Angular velocity in radians per second.
    pub rx: f64,
    /// Torque accumulator.
    pub torque: f64,
    /// Resistance to acceleration.
    pub mass: f64,
    /// Moment of inertia, resistance to rotation.
    pub moi: f64,
    /// Coefficient of friction.
    pub friction: f64,
    /// Coefficient of restitution, energy preserved across a collision.
    pub restitution: f64,
    /// Sleep heuristic; tracked but not used for correctness.
    pub motion: f64,
    pub collision_type: CollisionType,
    pub shape: Shape,
    /// Pending positional correction accumulated during resolution,
    /// applied and reset once per step.
    total_mtv: Vec2,
    dead: bool,
}

impl Body {
    pub const DEFAULT_MASS: f64 = 1.0;
    const DEFAULT_MOI: f64 = 1000.0;

    /// Creates a body at the origin with the given shape and collision
    /// type. Moment of inertia is derived from the shape geometry where
    /// possible.
    pub fn new(shape: Shape, collision_type: CollisionType) -> Self {
        let moi = shape.moment_of_inertia(Self::DEFAULT_MASS);
        let moi = if moi.is_finite() && moi > 0.0 {
            moi
        } else {
            Self::DEFAULT_MOI
        };
        let mut body = Self {
            pos: Vec2::ZERO,
            old_pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            old_vel: Vec2::ZERO,
            acc: Vec2::ZERO,
            rotation: 0.0,
            rx: 0.0,
            torque: 0.0,
            mass: Self::DEFAULT_MASS,
            moi,
            friction: 0.99,
            restitution: 0.2,
            motion: 10.0,
            collision_type,
            shape,
            total_mtv: Vec2::ZERO,
            dead: false,
        };
        body.recalc();
        body
    }

    /// Creates a body at a position; convenience over `new`.
    pub fn at(pos: Vec2, shape: Shape, collision_type: CollisionType) -> Self {
        let mut body = Self::new(shape, collision_type);
        body.pos = pos;
        body.old_pos = pos;
        body.recalc();
        body
    }

    /// Inverse mass; zero for Fixed bodies (infinite effective mass).
    pub fn inv_mass(&self) -> f64 {
        if self.collision_type == CollisionType::Fixed || self.mass == 0.0 {
            0.0
        } else {
            1.0 / self.mass
        }
    }

    /// Inverse moment of inertia; zero for Fixed bodies.
    pub fn inv_moi(&self) -> f64 {
        if self.collision_type == CollisionType::Fixed || self.moi == 0.0 {
            0.0
        } else {
            1.0 / self.moi
        }
    }

    /// Refreshes the shape's cached world-space geometry. Must be called
    /// after any change to `pos` or `rotation`.
    pub fn recalc(&mut self) {
        self.shape.recalc(self.pos, self.rotation);
    }

    /// Tight world-space bounding box of the attached shape.
    pub fn bounds(&self) -> BoundingBox {
        self.shape.bounds()
    }

    /// Shape center in world coordinates.
    pub fn center(&self) -> Vec2 {
        self.shape.center()
    }

    /// Queues a positional correction to be applied at the end of the
    /// step.
    pub fn add_mtv(&mut self, mtv: Vec2) {
        self.total_mtv += mtv;
    }

    /// Applies and resets the accumulated positional correction.
    pub fn apply_mtv(&mut self) {
        if self.total_mtv != Vec2::ZERO {
            self.pos += self.total_mtv;
            self.total_mtv = Vec2::ZERO;
            self.recalc();
        }
    }

    pub fn pending_mtv(&self) -> Vec2 {
        self.total_mtv
    }

    /// Removes the body from simulation; dead bodies stop colliding but
    /// are not destroyed.
    pub fn kill(&mut self) {
        self.dead = true;
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }
}
