// Game rules on top of the physics engine

pub mod combo;
pub mod damage;
pub mod entities;
pub mod guard;
pub mod launch;
pub mod level;
pub mod simulation;

pub use level::{ArenaConfig, BlockDescriptor, LevelDescriptor, PigDescriptor};
pub use simulation::{LevelStatus, Simulation, SimulationConfig, SimulationError, TickReport};
