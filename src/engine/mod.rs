// Engine modules: fixed-step loop and rigid-body physics

pub mod game_loop;
pub mod physics;
