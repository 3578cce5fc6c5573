//! Contact resolution.
//!
//! Two interchangeable strategies selected by
//! [`PhysicsConfig::resolution_strategy`]: an arcade-style positional
//! push-apart and a sequential-impulse rigid body response. Both emit a
//! [`CollisionEvent`] for each participant, the only signal the actor
//! layer receives.

use crate::collision::contact::{CollisionEvent, Contact, Side};
use crate::config::{CollisionResolutionStrategy, PhysicsConfig};
use crate::math::vec2::Vec2;
use crate::objects::body::{Body, CollisionType};

/// Resolves one contact with the configured strategy.
///
/// `emit_events` should be set only on the first resolution pass of a step
/// so a pair notifies its participants once, not once per pass.
pub fn resolve(
    bodies: &mut [Body],
    contact: &Contact,
    delta: f64,
    config: &PhysicsConfig,
    emit_events: bool,
    events: &mut Vec<CollisionEvent>,
) {
    match config.resolution_strategy {
        CollisionResolutionStrategy::Box => {
            resolve_box(bodies, contact, delta, emit_events, events);
        }
        CollisionResolutionStrategy::RigidBody => {
            resolve_rigid_body(bodies, contact, delta, config, emit_events, events);
        }
    }
}

/// Mutable references to both bodies of a contact, in contact order.
fn body_pair_mut(bodies: &mut [Body], a: usize, b: usize) -> (&mut Body, &mut Body) {
    if a < b {
        let (left, right) = bodies.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = bodies.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

fn resolve_box(
    bodies: &mut [Body],
    contact: &Contact,
    _delta: f64,
    emit_events: bool,
    events: &mut Vec<CollisionEvent>,
) {
    let side = Side::from_direction(contact.mtv);
    // the contact MTV points away from body A; negated it pushes A out
    let mtv = -contact.mtv;

    if emit_events {
        events.push(CollisionEvent {
            body: contact.body_a,
            other: contact.body_b,
            side,
            mtv,
        });
        events.push(CollisionEvent {
            body: contact.body_b,
            other: contact.body_a,
            side: side.opposite(),
            mtv: -mtv,
        });
    }

    let (body_a, body_b) = body_pair_mut(bodies, contact.body_a, contact.body_b);
    apply_box_impulse(body_a, body_b, mtv, side);
    apply_box_impulse(body_b, body_a, -mtv, side.opposite());
}

/// Pushes `body` out of overlap and clamps its velocity. Only Active and
/// Elastic bodies move; Passive bodies also never push anything.
fn apply_box_impulse(body: &mut Body, other: &Body, mtv: Vec2, side: Side) {
    let movable = matches!(
        body.collision_type,
        CollisionType::Active | CollisionType::Elastic
    );
    if !movable || other.collision_type == CollisionType::Passive {
        return;
    }

    let mtv = if body.collision_type == CollisionType::Active
        && other.collision_type == CollisionType::Active
    {
        // both participate, split the separation evenly
        mtv * 0.5
    } else {
        mtv
    };
    body.pos += mtv;
    body.recalc();

    if body.collision_type == CollisionType::Elastic {
        // naive bounce: reflect the velocity component for the side hit
        match side {
            Side::Left => body.vel.x = body.vel.x.abs(),
            Side::Right => body.vel.x = -body.vel.x.abs(),
            Side::Top => body.vel.y = body.vel.y.abs(),
            Side::Bottom => body.vel.y = -body.vel.y.abs(),
            Side::None => {}
        }
    } else {
        // clamp velocity so neither body overtakes through the other on
        // the intersection axis
        if mtv.x != 0.0 {
            body.vel.x = if body.vel.x <= 0.0 && other.vel.x <= 0.0 {
                body.vel.x.min(other.vel.x)
            } else if body.vel.x >= 0.0 && other.vel.x >= 0.0 {
                body.vel.x.max(other.vel.x)
            } else {
                // traveling in opposite directions
                0.0
            };
        }

        if mtv.y != 0.0 {
            body.vel.y = if body.vel.y <= 0.0 && other.vel.y <= 0.0 {
                body.vel.y.min(other.vel.y)
            } else if body.vel.y >= 0.0 && other.vel.y >= 0.0 {
                body.vel.y.max(other.vel.y)
            } else {
                0.0
            };
        }
    }
}

fn resolve_rigid_body(
    bodies: &mut [Body],
    contact: &Contact,
    _delta: f64,
    config: &PhysicsConfig,
    emit_events: bool,
    events: &mut Vec<CollisionEvent>,
) {
    let (body_a, body_b) = body_pair_mut(bodies, contact.body_a, contact.body_b);

    let mtv = contact.mtv;
    let normal = contact.normal.normalize();
    let tangent = normal.normal();

    // Fixed bodies have infinite effective mass and inertia
    let inv_mass_a = body_a.inv_mass();
    let inv_mass_b = body_b.inv_mass();
    let inv_moi_a = body_a.inv_moi();
    let inv_moi_b = body_b.inv_moi();

    let coef_restitution = body_a.restitution.min(body_b.restitution);
    let coef_friction = body_a.friction.min(body_b.friction);

    // moment arms from each shape center to the contact point
    let ra = contact.point - body_a.center();
    let rb = contact.point - body_b.center();

    // relative velocity at the contact point, angular terms included
    let rv = body_b.vel + rb.cross_scalar(-body_b.rx) - (body_a.vel - ra.cross_scalar(body_a.rx));
    let rv_normal = rv.dot(normal);
    let rv_tangent = rv.dot(tangent);

    let ra_tangent = ra.dot(tangent);
    let ra_normal = ra.dot(normal);
    let rb_tangent = rb.dot(tangent);
    let rb_normal = rb.dot(normal);

    // bodies already separating, no impulse
    if rv_normal > 0.0 {
        return;
    }

    if emit_events {
        let side = Side::from_direction(mtv);
        events.push(CollisionEvent {
            body: contact.body_a,
            other: contact.body_b,
            side,
            mtv,
        });
        events.push(CollisionEvent {
            body: contact.body_b,
            other: contact.body_a,
            side: side.opposite(),
            mtv: -mtv,
        });
    }

    let impulse = -((1.0 + coef_restitution) * rv_normal)
        / ((inv_mass_a + inv_mass_b)
            + inv_moi_a * ra_tangent * ra_tangent
            + inv_moi_b * rb_tangent * rb_tangent);

    if body_a.collision_type == CollisionType::Fixed {
        body_b.vel += normal * (impulse * inv_mass_b);
        if config.allow_rigid_body_rotation {
            body_b.rx -= impulse * inv_moi_b * -rb.cross(normal);
        }
        body_b.add_mtv(mtv);
    } else if body_b.collision_type == CollisionType::Fixed {
        body_a.vel -= normal * (impulse * inv_mass_a);
        if config.allow_rigid_body_rotation {
            body_a.rx += impulse * inv_moi_a * -ra.cross(normal);
        }
        body_a.add_mtv(-mtv);
    } else {
        body_b.vel += normal * (impulse * inv_mass_b);
        body_a.vel -= normal * (impulse * inv_mass_a);
        if config.allow_rigid_body_rotation {
            body_b.rx -= impulse * inv_moi_b * -rb.cross(normal);
            body_a.rx += impulse * inv_moi_a * -ra.cross(normal);
        }
        // split the correction between the two free bodies
        body_b.add_mtv(mtv * 0.5);
        body_a.add_mtv(mtv * -0.5);
    }

    // Coulomb friction along the tangent
    if coef_friction != 0.0 && rv_tangent != 0.0 {
        let t = (rv - normal * rv.dot(normal)).normalize();
        let jt = rv.dot(t)
            / (inv_mass_a
                + inv_mass_b
                + ra_normal * ra_normal * inv_moi_a
                + rb_normal * rb_normal * inv_moi_b);

        // clamp to the friction cone
        let friction_impulse = if jt.abs() <= impulse * coef_friction {
            t * -jt
        } else {
            t * (-impulse * coef_friction)
        };

        if body_a.collision_type == CollisionType::Fixed {
            body_b.vel += friction_impulse * inv_mass_b;
            if config.allow_rigid_body_rotation {
                body_b.rx += friction_impulse.dot(t) * inv_moi_b * rb.cross(t);
            }
        } else if body_b.collision_type == CollisionType::Fixed {
            body_a.vel -= friction_impulse * inv_mass_a;
            if config.allow_rigid_body_rotation {
                body_a.rx -= friction_impulse.dot(t) * inv_moi_a * ra.cross(t);
            }
        } else {
            body_b.vel += friction_impulse * inv_mass_b;
            body_a.vel -= friction_impulse * inv_mass_a;
            if config.allow_rigid_body_rotation {
                body_b.rx += friction_impulse.dot(t) * inv_moi_b * rb.cross(t);
                body_a.rx -= friction_impulse.dot(t) * inv_moi_a * ra.cross(t);
            }
        }
    }
}
