// Simulation constants shared by the world and the trajectory preview

use glam::Vec2;

use super::PhysicsError;

/// Downward acceleration in pixels/s² (screen space, +y points down)
pub const GRAVITY: f32 = 981.0;

/// Linear damping applied to every dynamic body (air drag, per second)
pub const AIR_DRAG: f32 = 0.05;

/// Angular damping applied to every dynamic body
pub const ANGULAR_DRAG: f32 = 1.0;

/// Fixed simulation timestep (60 Hz)
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;

/// Pixels per simulated meter, used to scale rapier's internal tolerances
pub const PIXELS_PER_METER: f32 = 50.0;

/// How contacts are surfaced after each step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactReporting {
    /// Solver contact-force events (full fidelity)
    ForceEvents,
    /// Reduced-fidelity bird-vs-target distance checks
    DistanceFallback,
}

/// Physics world configuration
#[derive(Debug, Clone)]
pub struct PhysicsConfig {
    pub gravity: Vec2,
    pub air_drag: f32,
    pub angular_drag: f32,
    pub timestep: f32,
    pub length_unit: f32,
    pub contact_reporting: ContactReporting,
}

pub const DEFAULT_PHYSICS: PhysicsConfig = PhysicsConfig {
    gravity: Vec2::new(0.0, GRAVITY),
    air_drag: AIR_DRAG,
    angular_drag: ANGULAR_DRAG,
    timestep: FIXED_TIMESTEP,
    length_unit: PIXELS_PER_METER,
    contact_reporting: ContactReporting::ForceEvents,
};

impl Default for PhysicsConfig {
    fn default() -> Self {
        DEFAULT_PHYSICS
    }
}

impl PhysicsConfig {
    /// Largest timestep accepted before the solver becomes unreliable
    pub const MAX_TIMESTEP: f32 = 0.1;

    /// Reject configurations the solver cannot run with
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if !(self.gravity.x.is_finite() && self.gravity.y.is_finite()) {
            return Err(PhysicsError::InvalidGravity);
        }
        if !self.timestep.is_finite() || self.timestep <= 0.0 || self.timestep > Self::MAX_TIMESTEP
        {
            return Err(PhysicsError::InvalidTimestep(self.timestep));
        }
        if !self.air_drag.is_finite() || self.air_drag < 0.0 {
            return Err(PhysicsError::InvalidDamping(self.air_drag));
        }
        if !self.angular_drag.is_finite() || self.angular_drag < 0.0 {
            return Err(PhysicsError::InvalidDamping(self.angular_drag));
        }
        if !self.length_unit.is_finite() || self.length_unit <= 0.0 {
            return Err(PhysicsError::InvalidLengthUnit(self.length_unit));
        }
        Ok(())
    }
}
