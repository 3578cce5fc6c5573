//! 2D collision detection and rigid body physics core.
//!
//! The crate is organized bottom-up: math primitives, collision shapes,
//! bodies, the narrowphase jump table, the dynamic AABB tree broadphase,
//! contact resolution, and the [`PhysicsWorld`] driver that runs one
//! simulation step end to end.

pub mod collision;
pub mod config;
pub mod error;
pub mod integration;
pub mod math;
pub mod objects;
pub mod shapes;
pub mod world;

// Re-export key types for easier use
pub use collision::{
    BoundingBox, Broadphase, CollisionEvent, Contact, DynamicTree, DynamicTreeBroadphase,
    NaiveBroadphase, Pair, Side, StepStats,
};
pub use config::{BroadphaseStrategy, CollisionResolutionStrategy, PhysicsConfig};
pub use error::PhysicsError;
pub use math::{Projection, Ray, Vec2};
pub use objects::{Body, CollisionType};
pub use shapes::{Circle, Edge, Polygon, Shape};
pub use world::PhysicsWorld;
