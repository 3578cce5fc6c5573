pub mod ray;
pub mod vec2;

pub use ray::{Projection, Ray};
pub use vec2::Vec2;
