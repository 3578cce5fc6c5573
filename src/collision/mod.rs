pub mod aabb;
pub mod broadphase;
pub mod contact;
pub mod detection;
pub mod dynamic_tree;
pub mod solver;

pub use aabb::BoundingBox;
pub use broadphase::{Broadphase, DynamicTreeBroadphase, NaiveBroadphase, StepStats};
pub use contact::{pair_hash, CollisionEvent, Contact, Pair, Side};
pub use dynamic_tree::DynamicTree;
