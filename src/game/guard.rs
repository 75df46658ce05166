// Numerical safety net between the physics world and everything that reads it

use glam::Vec2;
use rapier2d::prelude::{Isometry, RigidBody};

use crate::core::math::{clamp_speed, finite_or, is_finite_vec, to_vec2, to_vector};
use crate::engine::physics::PhysicsWorld;
use crate::game::entities::{BodyState, EntityStore};

pub const MAX_BODY_SPEED: f32 = 4000.0;
pub const MAX_LAUNCH_SPEED: f32 = 2000.0;
pub const SETTLE_STEPS: u32 = 120;
/// Speed (px/s) below which a body counts as at rest
pub const REST_SPEED: f32 = 5.0;
/// Bodies slower than this after settling are brought to a full stop
pub const SETTLE_SNAP_SPEED: f32 = 40.0;
/// Where a body with no usable history is teleported
pub const SAFE_POSITION: Vec2 = Vec2::new(600.0, 300.0);

#[derive(Debug, Clone)]
pub struct GuardConfig {
    pub max_body_speed: f32,
    pub max_launch_speed: f32,
    pub settle_steps: u32,
    pub rest_speed: f32,
    pub settle_snap_speed: f32,
    pub safe_position: Vec2,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            max_body_speed: MAX_BODY_SPEED,
            max_launch_speed: MAX_LAUNCH_SPEED,
            settle_steps: SETTLE_STEPS,
            rest_speed: REST_SPEED,
            settle_snap_speed: SETTLE_SNAP_SPEED,
            safe_position: SAFE_POSITION,
        }
    }
}

/// What one sanitize pass had to fix
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuardReport {
    /// Bodies with non-finite state that were reset
    pub repaired: usize,
    /// Bodies whose speed was clamped
    pub clamped: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SettleReport {
    pub steps: u32,
    /// Bodies stopped by the final snap
    pub snapped: usize,
    /// Fastest body left after snapping
    pub max_speed: f32,
}

#[derive(Debug, Clone, Default)]
pub struct StabilityGuard {
    config: GuardConfig,
}

impl StabilityGuard {
    pub fn new(config: GuardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Repair every live body and refresh the entity snapshots from the world
    pub fn sanitize(&self, world: &mut PhysicsWorld, entities: &mut EntityStore) -> GuardReport {
        let mut report = GuardReport::default();

        for (handle, state) in entities.live_bodies_mut() {
            let Some(body) = world.get_rigid_body_mut(handle) else {
                continue;
            };

            let position = to_vec2(body.translation());
            let velocity = to_vec2(body.linvel());
            let angle = body.rotation().angle();
            let angular_velocity = body.angvel();

            let finite = is_finite_vec(position)
                && is_finite_vec(velocity)
                && angle.is_finite()
                && angular_velocity.is_finite();
            if !finite {
                let safe = if is_finite_vec(state.position) {
                    state.position
                } else {
                    self.config.safe_position
                };
                log::warn!(
                    "Non-finite body state (pos {:?}, vel {:?}, angle {}); reset to {:?}",
                    position,
                    velocity,
                    angle,
                    safe
                );
                reset_body(body, safe);
                *state = BodyState::at(safe);
                report.repaired += 1;
                continue;
            }

            let limited = clamp_speed(velocity, self.config.max_body_speed);
            if limited != velocity {
                log::debug!("Clamped runaway body from {:.0} px/s", velocity.length());
                body.set_linvel(to_vector(limited), true);
                report.clamped += 1;
            }

            *state = BodyState {
                position,
                velocity: limited,
                angle,
                angular_velocity,
            };
        }

        report
    }

    /// Launch velocity limited to the safe maximum
    pub fn clamp_launch(&self, velocity: Vec2) -> Vec2 {
        clamp_speed(velocity, finite_or(self.config.max_launch_speed, MAX_LAUNCH_SPEED))
    }

    /// Let a freshly built level come to rest before play
    ///
    /// Contacts are discarded; nothing takes damage while settling. Bodies
    /// still drifting slowly at the end are stopped outright.
    pub fn settle(&self, world: &mut PhysicsWorld, entities: &mut EntityStore) -> SettleReport {
        let dt = world.timestep();
        for _ in 0..self.config.settle_steps {
            world.step(dt);
            self.sanitize(world, entities);
        }

        let mut report = SettleReport {
            steps: self.config.settle_steps,
            ..SettleReport::default()
        };
        for (handle, state) in entities.live_bodies_mut() {
            let Some(body) = world.get_rigid_body_mut(handle) else {
                continue;
            };
            if !body.is_dynamic() {
                continue;
            }

            if state.speed() < self.config.settle_snap_speed {
                body.set_linvel(to_vector(Vec2::ZERO), false);
                body.set_angvel(0.0, false);
                state.velocity = Vec2::ZERO;
                state.angular_velocity = 0.0;
                report.snapped += 1;
            } else {
                report.max_speed = report.max_speed.max(state.speed());
            }
        }

        if report.max_speed > self.config.rest_speed {
            log::warn!(
                "Level did not settle after {} steps (fastest body {:.1} px/s)",
                report.steps,
                report.max_speed
            );
        } else {
            log::info!("Level settled after {} steps", report.steps);
        }
        report
    }

    /// Whether every dynamic entity is slower than the rest threshold
    pub fn is_at_rest(&self, entities: &EntityStore) -> bool {
        let pigs = entities.pigs().iter().filter(|p| !p.is_dead()).map(|p| &p.state);
        let blocks = entities.blocks().iter().filter(|b| !b.is_destroyed()).map(|b| &b.state);
        pigs.chain(blocks).all(|s| s.speed() < self.config.rest_speed)
    }
}

fn reset_body(body: &mut RigidBody, position: Vec2) {
    body.set_position(Isometry::translation(position.x, position.y), true);
    body.set_linvel(to_vector(Vec2::ZERO), true);
    body.set_angvel(0.0, true);
}
