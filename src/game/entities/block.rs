// Destructible structure piece

use glam::Vec2;

use super::material::{Material, MaterialProps};
use super::{BodyState, Health, HitOutcome};
use crate::engine::physics::body::presets;
use crate::engine::physics::{BodyCategory, BodyTag, PhysicsWorld, RigidBodyHandle};

#[derive(Debug)]
pub struct Block {
    pub index: u32,
    pub material: Material,
    pub body: RigidBodyHandle,
    pub state: BodyState,
    pub width: f32,
    pub height: f32,
    mass: f32,
    health: Health,
}

impl Block {
    /// Create an axis-aligned block centered on `center`
    pub fn new(
        index: u32,
        material: Material,
        center: Vec2,
        width: f32,
        height: f32,
        world: &mut PhysicsWorld,
    ) -> Self {
        let props = material.props();
        let mass = material.block_mass(width, height);
        let drag = world.config().air_drag;
        let angular_drag = world.config().angular_drag;
        let body = world.add_body(
            presets::block_body(center.x, center.y, drag, angular_drag),
            presets::block_collider(width, height, mass, props.restitution),
            BodyTag::new(BodyCategory::Block, index),
        );

        Self {
            index,
            material,
            body,
            state: BodyState::at(center),
            width,
            height,
            mass,
            health: Health::new(props.base_health),
        }
    }

    pub fn take_damage(&mut self, damage: f32) -> HitOutcome {
        let outcome = self.health.apply(damage);
        if outcome == HitOutcome::Killed {
            log::debug!("{} block {} destroyed", self.material.name(), self.index);
        }
        outcome
    }

    pub fn is_destroyed(&self) -> bool {
        self.health.is_depleted()
    }

    pub fn props(&self) -> &'static MaterialProps {
        self.material.props()
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

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn position(&self) -> Vec2 {
        self.state.position
    }
}
