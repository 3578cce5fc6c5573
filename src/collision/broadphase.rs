//! Broadphase strategies: candidate pair generation, narrowphase driving
//! and resolution.
//!
//! Two implementations of the same contract: [`DynamicTreeBroadphase`]
//! backed by the dynamic AABB tree (with the fast-body raycast), and
//! [`NaiveBroadphase`], an all-pairs O(n^2) scan useful for small scenes
//! and as a correctness oracle in tests.

use std::collections::HashSet;
use std::time::Duration;

use crate::collision::contact::{pair_hash, CollisionEvent, Pair};
use crate::collision::detection;
use crate::collision::dynamic_tree::DynamicTree;
use crate::collision::solver;
use crate::config::PhysicsConfig;
use crate::error::PhysicsError;
use crate::integration::integrator;
use crate::math::ray::Ray;
use crate::math::vec2::Vec2;
use crate::objects::body::{Body, CollisionType};

/// Per-step diagnostic counters for a stats overlay. Observational only,
/// never fed back into the simulation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepStats {
    /// Candidate pairs emitted by the broadphase.
    pub pairs: usize,
    /// Pairs the narrowphase confirmed as colliding.
    pub collisions: usize,
    /// Bodies that qualified for the fast-body raycast.
    pub fast_bodies: usize,
    /// Fast bodies that actually hit something ahead.
    pub fast_body_collisions: usize,
    /// Tree leaves that needed reinsertion this step.
    pub tree_reinserts: usize,
    /// Wall-clock spent in the broadphase.
    pub broadphase_duration: Duration,
    /// Wall-clock spent in the narrowphase.
    pub narrowphase_duration: Duration,
}

impl StepStats {
    pub fn reset(&mut self) {
        *self = StepStats::default();
    }
}

/// The per-step contract of a broadphase strategy. `narrowphase` and
/// `resolve` are shared; strategies differ in how they track bodies and
/// find candidate pairs.
pub trait Broadphase {
    /// Starts tracking a body for collision.
    fn track(
        &mut self,
        index: usize,
        body: &Body,
        config: &PhysicsConfig,
    ) -> Result<(), PhysicsError>;

    /// Stops tracking a body. Unknown bodies are a silent no-op.
    fn untrack(&mut self, index: usize);

    /// Refreshes the spatial index. Returns how many entries had to be
    /// reinserted (diagnostic only).
    fn update(&mut self, bodies: &[Body], config: &PhysicsConfig) -> usize;

    /// Produces the step's candidate pairs. May move fast bodies to
    /// prevent tunneling.
    fn broadphase(
        &mut self,
        bodies: &mut [Body],
        dt: f64,
        config: &PhysicsConfig,
        stats: &mut StepStats,
    ) -> Vec<Pair>;

    /// Runs the narrowphase jump table over the candidate pairs, recording
    /// each contact on its pair.
    fn narrowphase(&self, bodies: &[Body], pairs: &mut [Pair], stats: &mut StepStats) {
        for pair in pairs.iter_mut() {
            pair.contact = detection::collide(
                &bodies[pair.body_a],
                pair.body_a,
                &bodies[pair.body_b],
                pair.body_b,
            );
            if pair.contact.is_some() {
                stats.collisions += 1;
            }
        }
    }

    /// Applies the configured response model over the configured number of
    /// passes, subdividing the time step evenly, then applies accumulated
    /// positional corrections and a small settling integration.
    fn resolve(
        &self,
        bodies: &mut [Body],
        pairs: &[Pair],
        delta: f64,
        config: &PhysicsConfig,
        events: &mut Vec<CollisionEvent>,
    ) {
        let passes = config.collision_passes.max(1);
        let sub_delta = delta / passes as f64;
        for pass in 0..passes {
            for pair in pairs {
                if let Some(contact) = &pair.contact {
                    // participants are notified once, on the first pass
                    solver::resolve(bodies, contact, sub_delta, config, pass == 0, events);
                }
            }
        }

        // every body of a collided pair applies its accumulated MTV and
        // settles with a fraction of the step
        let mut corrected: HashSet<usize> = HashSet::new();
        for pair in pairs.iter().filter(|pair| pair.contact.is_some()) {
            corrected.insert(pair.body_a);
            corrected.insert(pair.body_b);
        }
        for index in corrected {
            let body = &mut bodies[index];
            body.apply_mtv();
            integrator::integrate(body, config.acc, delta * config.collision_shift);
        }
    }
}

/// Broadphase backed by the dynamic AABB tree.
pub struct DynamicTreeBroadphase {
    tree: DynamicTree,
    /// Pair hashes already emitted this step.
    seen: HashSet<u64>,
}

impl Default for DynamicTreeBroadphase {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicTreeBroadphase {
    pub fn new() -> Self {
        Self {
            tree: DynamicTree::new(),
            seen: HashSet::new(),
        }
    }

    pub fn tree(&self) -> &DynamicTree {
        &self.tree
    }

    /// Raycast ahead of fast-moving Active bodies and synthesize pairs for
    /// whatever they would tunnel through, teleporting them to just short
    /// of the hit point.
    fn check_fast_bodies(
        &mut self,
        bodies: &mut [Body],
        pairs: &mut Vec<Pair>,
        dt: f64,
        config: &PhysicsConfig,
        stats: &mut StepStats,
    ) {
        for i in 0..bodies.len() {
            let body = &bodies[i];
            // only makes sense for live, tracked Active bodies
            if body.is_dead()
                || body.collision_type != CollisionType::Active
                || !self.tree.is_tracked(i)
            {
                continue;
            }

            // maximum travel distance this step
            let update_distance =
                body.vel.magnitude() * dt + 0.5 * body.acc.magnitude() * dt * dt;

            let bounds = body.bounds();
            let min_dimension = bounds.width().min(bounds.height());
            if !config.disable_minimum_speed_for_fast_body
                && update_distance <= min_dimension / 2.0
            {
                continue;
            }
            stats.fast_bodies += 1;

            // start from the old position: integration already ran, and a
            // body resting on a surface may already be slightly inside it
            let update_vec = body.pos - body.old_pos;
            let center = body.center();
            let furthest = body.shape.furthest_point(body.vel);
            let origin = furthest - update_vec;

            let mut ray = Ray::new(origin, body.vel);
            // back the ray up to catch surfaces already in skin contact
            ray.origin += ray.dir * (-2.0 * config.surface_epsilon);

            let mut min_body: Option<usize> = None;
            let mut min_translate = Vec2::new(f64::INFINITY, f64::INFINITY);
            self.tree.ray_cast_query(
                &ray,
                update_distance + config.surface_epsilon * 2.0,
                |other| {
                    if other != i && Pair::can_collide(body, &bodies[other]) {
                        let hit = bodies[other]
                            .shape
                            .ray_cast(&ray, update_distance + config.surface_epsilon * 10.0);
                        if let Some(hit) = hit {
                            let translate = hit - origin;
                            if translate.magnitude() < min_translate.magnitude() {
                                min_translate = translate;
                                min_body = Some(other);
                            }
                        }
                    }
                    false
                },
            );

            if let Some(other) = min_body {
                if !min_translate.is_valid() {
                    continue;
                }
                let hash = pair_hash(i, other);
                if !self.seen.contains(&hash) {
                    self.seen.insert(hash);
                    pairs.push(Pair::new(i, other));
                }

                // teleport to just short of the hit point, biased into the
                // surface so the narrowphase still sees the contact
                let shift = center - furthest;
                let corrected =
                    origin + shift + min_translate + ray.dir * (2.0 * config.surface_epsilon);
                let body = &mut bodies[i];
                body.pos = corrected;
                body.recalc();
                stats.fast_body_collisions += 1;
            }
        }
    }
}

impl Broadphase for DynamicTreeBroadphase {
    fn track(
        &mut self,
        index: usize,
        body: &Body,
        config: &PhysicsConfig,
    ) -> Result<(), PhysicsError> {
        self.tree.track_body(index, body, config)
    }

    fn untrack(&mut self, index: usize) {
        self.tree.untrack_body(index);
    }

    fn update(&mut self, bodies: &[Body], config: &PhysicsConfig) -> usize {
        let mut updated = 0;
        for (index, body) in bodies.iter().enumerate() {
            if body.is_dead() {
                continue;
            }
            if self.tree.update_body(index, body, config) {
                updated += 1;
            }
        }
        updated
    }

    fn broadphase(
        &mut self,
        bodies: &mut [Body],
        dt: f64,
        config: &PhysicsConfig,
        stats: &mut StepStats,
    ) -> Vec<Pair> {
        self.seen.clear();
        let mut pairs = Vec::new();

        {
            let tree = &self.tree;
            let seen = &mut self.seen;
            for (i, body) in bodies.iter().enumerate() {
                if body.is_dead() || body.collision_type == CollisionType::PreventCollision {
                    continue;
                }
                // bodies dropped from tracking are no longer simulated
                if !tree.is_tracked(i) {
                    continue;
                }
                let bounds = body.bounds();
                tree.query(i, &bounds, |other| {
                    let hash = pair_hash(i, other);
                    if !seen.contains(&hash) && Pair::can_collide(body, &bodies[other]) {
                        seen.insert(hash);
                        pairs.push(Pair::new(i, other));
                    }
                    // visit the whole tree
                    false
                });
            }
        }

        if config.check_for_fast_bodies {
            self.check_fast_bodies(bodies, &mut pairs, dt, config, stats);
        }

        stats.pairs += pairs.len();
        pairs
    }
}

/// All-pairs broadphase without a spatial index. Identical contract to the
/// tree strategy; no fast-body correction.
#[derive(Debug, Default)]
pub struct NaiveBroadphase;

impl NaiveBroadphase {
    pub fn new() -> Self {
        Self
    }
}

impl Broadphase for NaiveBroadphase {
    fn track(
        &mut self,
        _index: usize,
        _body: &Body,
        _config: &PhysicsConfig,
    ) -> Result<(), PhysicsError> {
        Ok(())
    }

    fn untrack(&mut self, _index: usize) {}

    fn update(&mut self, _bodies: &[Body], _config: &PhysicsConfig) -> usize {
        0
    }

    fn broadphase(
        &mut self,
        bodies: &mut [Body],
        _dt: f64,
        _config: &PhysicsConfig,
        stats: &mut StepStats,
    ) -> Vec<Pair> {
        let mut pairs = Vec::new();
        for i in 0..bodies.len() {
            let body_a = &bodies[i];
            if body_a.is_dead() || body_a.collision_type == CollisionType::PreventCollision {
                continue;
            }
            for j in (i + 1)..bodies.len() {
                let body_b = &bodies[j];
                if !Pair::can_collide(body_a, body_b) {
                    continue;
                }
                if body_a.bounds().overlaps(&body_b.bounds()) {
                    pairs.push(Pair::new(i, j));
                }
            }
        }
        stats.pairs += pairs.len();
        pairs
    }
}
