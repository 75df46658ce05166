// Projectile entity

use glam::Vec2;
use rapier2d::prelude::RigidBodyType;

use super::material::{BirdKind, BirdStats};
use super::BodyState;
use crate::core::math::to_vector;
use crate::engine::physics::body::presets;
use crate::engine::physics::{BodyCategory, BodyTag, PhysicsWorld, RigidBodyHandle};

/// Gap (pixels) between a bird's bottom and the ground still counted as "on the ground"
const GROUND_TOLERANCE: f32 = 2.0;

#[derive(Debug)]
pub struct Bird {
    pub index: u32,
    pub kind: BirdKind,
    pub body: RigidBodyHandle,
    pub state: BodyState,
    stats: BirdStats,
    launched: bool,
    removed: bool,
    /// Ticks since launch
    flight_ticks: u32,
    /// Consecutive ticks spent slower than the rest speed
    idle_ticks: u32,
}

impl Bird {
    /// Create a bird resting at `position` (kinematic until launched)
    pub fn new(index: u32, kind: BirdKind, position: Vec2, world: &mut PhysicsWorld) -> Self {
        let stats = kind.stats();
        let body = world.add_body(
            presets::loaded_bird_body(position.x, position.y),
            presets::bird_collider(stats.radius, stats.mass),
            BodyTag::new(BodyCategory::Bird, index),
        );

        Self {
            index,
            kind,
            body,
            state: BodyState::at(position),
            stats,
            launched: false,
            removed: false,
            flight_ticks: 0,
            idle_ticks: 0,
        }
    }

    /// Move the unlaunched bird to follow the slingshot pouch
    pub fn hold_at(&mut self, world: &mut PhysicsWorld, position: Vec2) {
        if self.launched || self.removed {
            return;
        }
        if let Some(body) = world.get_rigid_body_mut(self.body) {
            body.set_translation(to_vector(position), true);
        }
        self.state = BodyState::at(position);
    }

    /// Release the bird with `velocity`; returns false if it was already launched
    pub fn launch(&mut self, world: &mut PhysicsWorld, velocity: Vec2) -> bool {
        if self.launched || self.removed {
            return false;
        }

        let drag = world.config().air_drag;
        let angular_drag = world.config().angular_drag;
        let Some(body) = world.get_rigid_body_mut(self.body) else {
            return false;
        };

        body.set_body_type(RigidBodyType::Dynamic, true);
        body.set_linear_damping(drag);
        body.set_angular_damping(angular_drag);
        body.set_linvel(to_vector(velocity), true);

        self.state.velocity = velocity;
        self.launched = true;
        log::info!("Launched {:?} bird {} at {:?}", self.kind, self.index, velocity);
        true
    }

    /// Take the bird out of the world (idempotent)
    pub fn remove(&mut self, world: &mut PhysicsWorld) {
        if self.removed {
            return;
        }
        world.remove_body(self.body);
        self.removed = true;
    }

    /// Launched, nearly still, and touching the ground
    ///
    /// Both conditions are required: a bird at the apex of its arc is slow but airborne.
    pub fn is_resting_on_ground(&self, ground_top: f32, rest_speed: f32) -> bool {
        if !self.launched || self.removed {
            return false;
        }
        let on_ground = self.state.position.y >= ground_top - self.stats.radius - GROUND_TOLERANCE;
        self.state.speed() < rest_speed && on_ground
    }

    /// Advance the flight counters from the current snapshot
    pub fn track_flight(&mut self, rest_speed: f32) {
        if !self.launched || self.removed {
            return;
        }
        self.flight_ticks = self.flight_ticks.saturating_add(1);
        if self.state.speed() < rest_speed {
            self.idle_ticks = self.idle_ticks.saturating_add(1);
        } else {
            self.idle_ticks = 0;
        }
    }

    pub fn flight_ticks(&self) -> u32 {
        self.flight_ticks
    }

    pub fn idle_ticks(&self) -> u32 {
        self.idle_ticks
    }

    pub fn radius(&self) -> f32 {
        self.stats.radius
    }

    pub fn mass(&self) -> f32 {
        self.stats.mass
    }

    pub fn damage_multiplier(&self) -> f32 {
        self.stats.damage_multiplier
    }

    pub fn is_launched(&self) -> bool {
        self.launched
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub fn position(&self) -> Vec2 {
        self.state.position
    }
}
