//! The per-frame simulation driver.
//!
//! One full step runs synchronously: integrate -> refresh spatial index ->
//! broadphase (with fast-body correction) -> narrowphase -> resolution
//! passes -> positional settling. Bodies and the index are owned by one
//! world; callers must not mutate bodies mid-step.

use std::time::Instant;

use log::{debug, warn};

use crate::collision::broadphase::{
    Broadphase, DynamicTreeBroadphase, NaiveBroadphase, StepStats,
};
use crate::collision::contact::CollisionEvent;
use crate::config::{BroadphaseStrategy, PhysicsConfig};
use crate::integration::integrator;
use crate::objects::body::Body;

pub struct PhysicsWorld {
    pub bodies: Vec<Body>,
    /// Read fresh every step; mutating between steps is allowed, including
    /// switching strategies.
    pub config: PhysicsConfig,
    /// Per-step diagnostics for a stats overlay.
    pub stats: StepStats,
    broadphase: Box<dyn Broadphase>,
    active_strategy: BroadphaseStrategy,
}

impl PhysicsWorld {
    pub fn new(config: PhysicsConfig) -> Self {
        let active_strategy = config.broadphase_strategy;
        Self {
            bodies: Vec::new(),
            broadphase: Self::make_broadphase(active_strategy),
            active_strategy,
            config,
            stats: StepStats::default(),
        }
    }

    fn make_broadphase(strategy: BroadphaseStrategy) -> Box<dyn Broadphase> {
        match strategy {
            BroadphaseStrategy::Naive => Box::new(NaiveBroadphase::new()),
            BroadphaseStrategy::DynamicAabbTree => Box::new(DynamicTreeBroadphase::new()),
        }
    }

    /// Adds a body to the simulation and returns its index.
    pub fn add_body(&mut self, body: Body) -> usize {
        let index = self.bodies.len();
        self.bodies.push(body);
        if let Err(err) = self
            .broadphase
            .track(index, &self.bodies[index], &self.config)
        {
            warn!("body {} will not collide: {}", index, err);
        }
        index
    }

    pub fn body(&self, index: usize) -> Option<&Body> {
        self.bodies.get(index)
    }

    pub fn body_mut(&mut self, index: usize) -> Option<&mut Body> {
        self.bodies.get_mut(index)
    }

    /// Kills a body: it stops colliding but keeps its slot.
    pub fn kill_body(&mut self, index: usize) {
        if let Some(body) = self.bodies.get_mut(index) {
            body.kill();
            self.broadphase.untrack(index);
        }
    }

    /// Rebuilds the broadphase when the configured strategy changed since
    /// the last step.
    fn sync_strategy(&mut self) {
        if self.config.broadphase_strategy == self.active_strategy {
            return;
        }
        debug!(
            "broadphase strategy changed to {:?}, rebuilding",
            self.config.broadphase_strategy
        );
        self.active_strategy = self.config.broadphase_strategy;
        self.broadphase = Self::make_broadphase(self.active_strategy);
        for (index, body) in self.bodies.iter().enumerate() {
            if body.is_dead() {
                continue;
            }
            if let Err(err) = self.broadphase.track(index, body, &self.config) {
                warn!("body {} will not collide: {}", index, err);
            }
        }
    }

    /// Advances the simulation by `dt` seconds, returning the collision
    /// notifications produced this step.
    pub fn step(&mut self, dt: f64) -> Vec<CollisionEvent> {
        let mut events = Vec::new();
        if dt <= 0.0 {
            return events;
        }

        self.sync_strategy();
        self.stats.reset();

        // 1. integrate motion
        for body in self.bodies.iter_mut() {
            if body.is_dead() {
                continue;
            }
            integrator::integrate(body, self.config.acc, dt);
        }

        // 2. refresh the spatial index
        self.stats.tree_reinserts = self.broadphase.update(&self.bodies, &self.config);

        // 3. candidate pairs, with the fast-body raycast correction
        let started = Instant::now();
        let mut pairs =
            self.broadphase
                .broadphase(&mut self.bodies, dt, &self.config, &mut self.stats);
        self.stats.broadphase_duration = started.elapsed();

        // 4. exact contacts
        let started = Instant::now();
        self.broadphase
            .narrowphase(&self.bodies, &mut pairs, &mut self.stats);
        self.stats.narrowphase_duration = started.elapsed();

        // 5. response, corrections, settling
        self.broadphase
            .resolve(&mut self.bodies, &pairs, dt, &self.config, &mut events);

        events
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}
