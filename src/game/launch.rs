// Slingshot launch and trajectory preview
//
// Pull vectors are displacements from the slingshot's rest anchor in screen
// space. Pulling back (left) and down launches up and to the right.

use glam::Vec2;

use crate::core::math::finite_vec_or;
use crate::engine::physics::PhysicsConfig;

pub const SLINGSHOT_ANCHOR: Vec2 = Vec2::new(150.0, 575.0);
pub const MAX_STRETCH: f32 = 150.0;
pub const LAUNCH_POWER: f32 = 10.0;
/// Pulls shorter than this on both axes use the default pull
pub const MIN_PULL: f32 = 5.0;
pub const DEFAULT_PULL: Vec2 = Vec2::new(-10.0, 10.0);
pub const PREVIEW_STEPS: usize = 72;

#[derive(Debug, Clone)]
pub struct LaunchConfig {
    pub anchor: Vec2,
    pub max_stretch: f32,
    pub power: f32,
    pub min_pull: f32,
    pub default_pull: Vec2,
    pub preview_steps: usize,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            anchor: SLINGSHOT_ANCHOR,
            max_stretch: MAX_STRETCH,
            power: LAUNCH_POWER,
            min_pull: MIN_PULL,
            default_pull: DEFAULT_PULL,
            preview_steps: PREVIEW_STEPS,
        }
    }
}

impl LaunchConfig {
    /// Keep the pull behind the anchor and within the stretch radius
    pub fn clamp_pull(&self, pull: Vec2) -> Vec2 {
        let mut pull = finite_vec_or(pull, Vec2::ZERO);
        if pull.x > 0.0 {
            pull.x = 0.0;
        }
        pull.clamp_length_max(self.max_stretch)
    }

    /// Launch velocity for `pull`, opposite the pull direction
    ///
    /// A negligible pull launches with the default pull so the bird never
    /// leaves stationary.
    pub fn velocity(&self, pull: Vec2) -> Vec2 {
        let mut pull = self.clamp_pull(pull);
        if pull.x.abs() < self.min_pull && pull.y.abs() < self.min_pull {
            pull = self.default_pull;
        }
        -pull * self.power
    }

    /// Where the bird sits for `pull`
    pub fn pouch_position(&self, pull: Vec2) -> Vec2 {
        self.anchor + self.clamp_pull(pull)
    }

    /// Pull strength in [0, 1]
    pub fn power_fraction(&self, pull: Vec2) -> f32 {
        if self.max_stretch <= 0.0 {
            return 0.0;
        }
        (self.clamp_pull(pull).length() / self.max_stretch).min(1.0)
    }
}

/// Launch velocity for `pull` with the default slingshot
pub fn launch_velocity(pull: Vec2) -> Vec2 {
    LaunchConfig::default().velocity(pull)
}

/// Region the preview may occupy
#[derive(Debug, Clone, Copy)]
pub struct PreviewBounds {
    pub left: f32,
    pub right: f32,
    pub ground_top: f32,
}

/// Sampled flight path, one point per physics step
///
/// Integrates the same way the world does (gravity, then drag, then
/// position) so the preview follows the real flight. Stops before the first
/// sample at or below the ground or outside the horizontal bounds.
pub fn trajectory_preview(
    start: Vec2,
    velocity: Vec2,
    physics: &PhysicsConfig,
    bounds: &PreviewBounds,
    steps: usize,
) -> Vec<Vec2> {
    let dt = physics.timestep;
    let damping = 1.0 / (1.0 + dt * physics.air_drag);
    let mut position = finite_vec_or(start, Vec2::ZERO);
    let mut velocity = finite_vec_or(velocity, Vec2::ZERO);
    let mut points = Vec::with_capacity(steps);

    for _ in 0..steps {
        velocity += physics.gravity * dt;
        velocity *= damping;
        position += velocity * dt;

        if position.y >= bounds.ground_top || position.x < bounds.left || position.x > bounds.right {
            break;
        }
        points.push(position);
    }
    points
}
