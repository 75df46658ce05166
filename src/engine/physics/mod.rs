// Physics system using rapier2d

pub mod body;
mod collision;
pub mod config;
mod fallback;
mod world;

pub use body::RigidBodyHandle;
pub use collision::{BodyCategory, BodyTag, ContactEvent};
pub use config::{ContactReporting, PhysicsConfig};
pub use world::PhysicsWorld;

/// Errors raised while configuring the physics world
#[derive(Debug, thiserror::Error)]
pub enum PhysicsError {
    #[error("gravity must be finite")]
    InvalidGravity,

    #[error("timestep {0} is outside (0, 0.1]")]
    InvalidTimestep(f32),

    #[error("damping {0} must be finite and non-negative")]
    InvalidDamping(f32),

    #[error("length unit {0} must be finite and positive")]
    InvalidLengthUnit(f32),
}
