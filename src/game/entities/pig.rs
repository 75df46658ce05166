// Target entity

use glam::Vec2;

use super::material::{PigKind, PigStats};
use super::{BodyState, Health, HitOutcome};
use crate::engine::physics::body::presets;
use crate::engine::physics::{BodyCategory, BodyTag, PhysicsWorld, RigidBodyHandle};

#[derive(Debug)]
pub struct Pig {
    pub index: u32,
    pub kind: PigKind,
    pub body: RigidBodyHandle,
    pub state: BodyState,
    stats: PigStats,
    health: Health,
}

impl Pig {
    pub fn new(index: u32, kind: PigKind, position: Vec2, world: &mut PhysicsWorld) -> Self {
        let stats = kind.stats();
        let drag = world.config().air_drag;
        let angular_drag = world.config().angular_drag;
        let body = world.add_body(
            presets::pig_body(position.x, position.y, drag, angular_drag),
            presets::pig_collider(stats.radius, stats.mass),
            BodyTag::new(BodyCategory::Pig, index),
        );

        Self {
            index,
            kind,
            body,
            state: BodyState::at(position),
            stats,
            health: Health::new(stats.max_health),
        }
    }

    /// Apply already-resisted damage; a kill takes effect immediately and once
    pub fn take_damage(&mut self, damage: f32) -> HitOutcome {
        let outcome = self.health.apply(damage);
        if outcome == HitOutcome::Killed {
            log::debug!("{:?} pig {} eliminated", self.kind, self.index);
        }
        outcome
    }

    pub fn is_dead(&self) -> bool {
        self.health.is_depleted()
    }

    pub fn health(&self) -> f32 {
        self.health.current()
    }

    pub fn max_health(&self) -> f32 {
        self.health.max()
    }

    pub fn health_fraction(&self) -> f32 {
        self.health.fraction()
    }

    pub fn stats(&self) -> &PigStats {
        &self.stats
    }

    pub fn radius(&self) -> f32 {
        self.stats.radius
    }

    pub fn mass(&self) -> f32 {
        self.stats.mass
    }

    pub fn position(&self) -> Vec2 {
        self.state.position
    }
}
