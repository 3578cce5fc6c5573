use crate::math::vec2::Vec2;
use crate::objects::body::{Body, CollisionType};

/// Advances a body's state by `dt` seconds using semi-implicit Euler.
///
/// The previous position and velocity are recorded first; the fast-body
/// raycast needs `pos - old_pos` to reconstruct the motion of the frame.
/// The global acceleration only affects Active and Elastic bodies; Fixed
/// bodies never move.
pub fn integrate(body: &mut Body, global_acc: Vec2, dt: f64) {
    body.old_pos = body.pos;
    body.old_vel = body.vel;

    if body.collision_type == CollisionType::Fixed {
        return;
    }

    let mut acc = body.acc;
    if matches!(
        body.collision_type,
        CollisionType::Active | CollisionType::Elastic
    ) {
        acc += global_acc;
    }

    body.vel += acc * dt;
    body.rx += body.torque * body.inv_moi() * dt;
    body.pos += body.vel * dt;
    body.rotation = wrap_angle(body.rotation + body.rx * dt);
    body.recalc();
}

/// Wraps an angle in radians to [-PI, PI].
fn wrap_angle(angle: f64) -> f64 {
    angle.sin().atan2(angle.cos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Circle, Shape};
    use std::f64::consts::PI;
    const EPSILON: f64 = 1e-9;

    fn active_circle() -> Body {
        Body::new(Shape::Circle(Circle::new(1.0)), CollisionType::Active)
    }

    #[test]
    fn test_integrate_velocity_only() {
        let mut body = active_circle();
        body.vel = Vec2::new(10.0, -5.0);

        integrate(&mut body, Vec2::ZERO, 0.1);

        assert!((body.pos.x - 1.0).abs() < EPSILON);
        assert!((body.pos.y + 0.5).abs() < EPSILON);
        assert_eq!(body.vel, Vec2::new(10.0, -5.0));
        assert_eq!(body.old_pos, Vec2::ZERO);
        assert_eq!(body.old_vel, Vec2::new(10.0, -5.0));
    }

    #[test]
    fn test_integrate_applies_global_acc_semi_implicitly() {
        let mut body = active_circle();
        let gravity = Vec2::new(0.0, 100.0);
        let dt = 0.1;

        integrate(&mut body, gravity, dt);

        // velocity updates first, then position uses the new velocity
        assert!((body.vel.y - 10.0).abs() < EPSILON);
        assert!((body.pos.y - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_passive_ignores_global_acc() {
        let mut body = active_circle();
        body.collision_type = CollisionType::Passive;
        body.vel = Vec2::new(1.0, 0.0);

        integrate(&mut body, Vec2::new(0.0, 100.0), 0.1);

        // own velocity still moves it, gravity does not
        assert!((body.pos.x - 0.1).abs() < EPSILON);
        assert_eq!(body.vel.y, 0.0);
    }

    #[test]
    fn test_own_acc_applies_to_any_moving_body() {
        let mut body = active_circle();
        body.collision_type = CollisionType::Passive;
        body.acc = Vec2::new(10.0, 0.0);

        integrate(&mut body, Vec2::ZERO, 0.1);

        assert!((body.vel.x - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_fixed_body_does_not_move() {
        let mut body = active_circle();
        body.collision_type = CollisionType::Fixed;
        body.vel = Vec2::new(10.0, 10.0);
        body.rx = 1.0;

        integrate(&mut body, Vec2::new(0.0, 100.0), 0.1);

        assert_eq!(body.pos, Vec2::ZERO);
        assert_eq!(body.rotation, 0.0);
    }

    #[test]
    fn test_torque_spins_body() {
        let mut body = active_circle();
        body.torque = 5.0;
        let inv_moi = body.inv_moi();

        integrate(&mut body, Vec2::ZERO, 0.1);

        assert!((body.rx - 5.0 * inv_moi * 0.1).abs() < EPSILON);
    }

    #[test]
    fn test_rotation_integrates_and_wraps() {
        let mut body = active_circle();
        body.rotation = PI - 0.05;
        body.rx = 1.0;

        integrate(&mut body, Vec2::ZERO, 0.1);

        // crossed PI, wrapped into the negative half
        assert!(body.rotation < 0.0);
        assert!((body.rotation - (-PI + 0.05)).abs() < 1e-6);
    }

    #[test]
    fn test_integrate_refreshes_shape_cache() {
        let mut body = active_circle();
        body.vel = Vec2::new(10.0, 0.0);

        integrate(&mut body, Vec2::ZERO, 1.0);

        assert_eq!(body.center(), Vec2::new(10.0, 0.0));
    }
}
