/// Fixed timestep accumulator
///
/// Real elapsed time is accumulated and consumed in fixed-size physics steps.
/// The number of steps per frame is capped so that one slow frame cannot snowball
/// into an ever-growing simulation backlog.
use std::time::{Duration, Instant};

use crate::engine::physics::config::FIXED_TIMESTEP;

/// Maximum number of physics steps per frame to prevent spiral of death
pub const MAX_PHYSICS_STEPS: u32 = 5;

/// Game loop timing state
pub struct GameLoop {
    /// Real time consumed by one physics step
    timestep: Duration,

    /// Accumulated time for fixed timestep updates
    accumulator: Duration,

    /// Time of last frame
    last_frame_time: Instant,

    /// Whether the game is paused
    paused: bool,

    frame_count: u64,

    /// Total updates executed
    update_count: u64,

    /// Frames where the step cap discarded time
    dropped_frames: u64,
}

impl GameLoop {
    pub fn new() -> Self {
        Self::with_timestep(FIXED_TIMESTEP)
    }

    /// Loop that consumes `dt` seconds of real time per physics step
    pub fn with_timestep(dt: f32) -> Self {
        let dt = if dt.is_finite() && dt > 0.0 {
            dt
        } else {
            log::warn!("Invalid loop timestep {dt}, using {FIXED_TIMESTEP}");
            FIXED_TIMESTEP
        };

        Self {
            timestep: Duration::from_secs_f32(dt),
            accumulator: Duration::ZERO,
            last_frame_time: Instant::now(),
            paused: false,
            frame_count: 0,
            update_count: 0,
            dropped_frames: 0,
        }
    }

    /// Begin a new frame using wall-clock time, returns the number of fixed updates to run
    pub fn begin_frame(&mut self) -> u32 {
        let now = Instant::now();
        let frame_time = now.duration_since(self.last_frame_time);
        self.last_frame_time = now;
        self.advance(frame_time)
    }

    /// Feed an explicit frame duration, returns the number of fixed updates to run
    pub fn advance(&mut self, frame_time: Duration) -> u32 {
        self.frame_count += 1;

        if self.paused {
            return 0;
        }

        self.accumulator += frame_time;

        let mut updates = 0;
        while self.accumulator >= self.timestep && updates < MAX_PHYSICS_STEPS {
            self.accumulator -= self.timestep;
            updates += 1;
        }

        // Drop the backlog instead of carrying it into the next frame
        if self.accumulator >= self.timestep {
            log::debug!(
                "Frame backlog of {:?} discarded after {} steps",
                self.accumulator,
                updates
            );
            self.accumulator = Duration::ZERO;
            self.dropped_frames += 1;
        }

        self.update_count += updates as u64;
        updates
    }

    /// Get the fixed timestep for physics updates (in seconds)
    pub fn fixed_timestep(&self) -> f32 {
        self.timestep.as_secs_f32()
    }

    /// Get the interpolation alpha for smooth rendering between physics steps
    pub fn alpha(&self) -> f32 {
        self.accumulator.as_secs_f32() / self.timestep.as_secs_f32()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get total number of updates executed
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            log::info!("Simulation paused");
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            // Reset accumulator to prevent update burst
            self.accumulator = Duration::ZERO;
            self.last_frame_time = Instant::now();
            log::info!("Simulation resumed");
        }
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One 60Hz frame
    const FRAME: Duration = Duration::from_micros(16_667);

    #[test]
    fn test_game_loop_creation() {
        let game_loop = GameLoop::new();
        assert_eq!(game_loop.frame_count(), 0);
        assert_eq!(game_loop.update_count(), 0);
        assert!(!game_loop.is_paused());
    }

    #[test]
    fn test_fixed_timestep() {
        let game_loop = GameLoop::new();
        assert!((game_loop.fixed_timestep() - 1.0 / 60.0).abs() < 0.0001);
    }

    #[test]
    fn test_one_frame_one_update() {
        let mut game_loop = GameLoop::new();
        assert_eq!(game_loop.advance(FRAME), 1);
        assert_eq!(game_loop.update_count(), 1);
    }

    #[test]
    fn test_accumulates_partial_frames() {
        let mut game_loop = GameLoop::new();
        let half = FRAME / 2;
        assert_eq!(game_loop.advance(half), 0);
        assert!(game_loop.alpha() > 0.4 && game_loop.alpha() < 0.6);
        assert_eq!(game_loop.advance(half + Duration::from_micros(1)), 1);
    }

    #[test]
    fn test_paused_no_updates() {
        let mut game_loop = GameLoop::new();
        game_loop.pause();
        assert_eq!(game_loop.advance(Duration::from_millis(50)), 0);

        game_loop.resume();
        assert!(!game_loop.is_paused());
        assert_eq!(game_loop.advance(FRAME), 1);
    }

    #[test]
    fn test_max_physics_steps_limit() {
        let mut game_loop = GameLoop::new();

        // 300ms would allow 18 updates
        let updates = game_loop.advance(Duration::from_millis(300));
        assert_eq!(updates, MAX_PHYSICS_STEPS);
        assert_eq!(game_loop.dropped_frames(), 1);

        // The backlog is gone: a normal frame runs a normal number of steps
        assert_eq!(game_loop.advance(FRAME), 1);
    }

    #[test]
    fn test_custom_timestep_consumes_matching_time() {
        let mut game_loop = GameLoop::with_timestep(1.0 / 120.0);
        assert!((game_loop.fixed_timestep() - 1.0 / 120.0).abs() < 1e-6);
        assert_eq!(game_loop.advance(FRAME), 2);

        let mut coarse = GameLoop::with_timestep(1.0 / 30.0);
        assert_eq!(coarse.advance(FRAME), 0);
        assert_eq!(coarse.advance(FRAME), 1);
    }

    #[test]
    fn test_invalid_timestep_uses_default() {
        let game_loop = GameLoop::with_timestep(f32::NAN);
        assert!((game_loop.fixed_timestep() - FIXED_TIMESTEP).abs() < 1e-6);
        assert!((GameLoop::with_timestep(-1.0).fixed_timestep() - FIXED_TIMESTEP).abs() < 1e-6);
    }

    #[test]
    fn test_begin_frame_counts_frames() {
        let mut game_loop = GameLoop::new();
        game_loop.begin_frame();
        game_loop.begin_frame();
        assert_eq!(game_loop.frame_count(), 2);
    }
}
