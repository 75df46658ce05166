//! Physics-driven damage and scoring engine for a slingshot destruction game.
//!
//! Birds are launched from a slingshot at structures of destructible blocks
//! sheltering pigs. The [`game::simulation::Simulation`] context owns a rapier
//! world for one level and, each fixed step, turns solver contacts into
//! material-aware damage, structural collapse, chain reactions and combo
//! scoring.

pub mod core;
pub mod engine;
pub mod game;
