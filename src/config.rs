use crate::collision::aabb::BoundingBox;
use crate::math::vec2::Vec2;

/// How contacts are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionResolutionStrategy {
    /// Arcade-style axis-aligned push-apart with naive velocity clamping.
    Box,
    /// Impulse-based rigid body response with friction and restitution.
    RigidBody,
}

/// How candidate collision pairs are found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadphaseStrategy {
    /// All-pairs O(n^2) scan. Useful for small body counts and as a
    /// correctness oracle for the tree strategy.
    Naive,
    /// Self-balancing tree of padded axis-aligned bounding boxes.
    DynamicAabbTree,
}

/// Tunable physics constants, passed explicitly to [`PhysicsWorld`] instead
/// of living in process-wide globals so two simulations with different
/// settings can coexist. Read fresh every step; mutating between steps is
/// allowed.
///
/// [`PhysicsWorld`]: crate::world::PhysicsWorld
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsConfig {
    pub resolution_strategy: CollisionResolutionStrategy,
    pub broadphase_strategy: BroadphaseStrategy,
    /// Global acceleration applied to Active and Elastic bodies, e.g.
    /// gravity.
    pub acc: Vec2,
    /// Number of resolution passes per step. The time step is subdivided
    /// evenly across passes.
    pub collision_passes: u32,
    /// Whether the rigid body solver applies angular impulses.
    pub allow_rigid_body_rotation: bool,
    /// Raycast ahead of fast-moving Active bodies to keep them from
    /// tunneling through thin obstacles.
    pub check_for_fast_bodies: bool,
    /// Perform the fast-body raycast regardless of speed. By default only
    /// bodies traveling more than half their smallest bound per step are
    /// checked.
    pub disable_minimum_speed_for_fast_body: bool,
    /// Constant padding added to tree leaf bounds so slow-moving bodies
    /// do not need reinsertion every frame.
    pub bounds_padding: f64,
    /// Leaf bounds are additionally extended along the velocity vector
    /// scaled by this factor.
    pub dynamic_tree_velocity_multiplier: f64,
    /// Fraction of the time step integrated after MTV application to let
    /// penetrating bodies settle.
    pub collision_shift: f64,
    /// Small bias used to offset raycasts from surfaces already in contact.
    pub surface_epsilon: f64,
    /// Bodies whose bounds leave this region are dropped from tracking.
    pub world_bounds: BoundingBox,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            resolution_strategy: CollisionResolutionStrategy::Box,
            broadphase_strategy: BroadphaseStrategy::DynamicAabbTree,
            acc: Vec2::ZERO,
            collision_passes: 5,
            allow_rigid_body_rotation: true,
            check_for_fast_bodies: true,
            disable_minimum_speed_for_fast_body: false,
            bounds_padding: 5.0,
            dynamic_tree_velocity_multiplier: 2.0,
            collision_shift: 0.3,
            surface_epsilon: 0.1,
            world_bounds: BoundingBox::new(-1e9, -1e9, 1e9, 1e9),
        }
    }
}
