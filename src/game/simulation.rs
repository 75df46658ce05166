// Per-level simulation context
//
// Owns the physics world and every entity for one level. One tick is exactly
// one world step followed by one resolver pass; a reset throws the whole
// context away and builds a new one.

use std::time::Duration;

use glam::Vec2;

use super::combo::{ComboConfig, ComboTracker};
use super::damage::{CollisionEvent, DamageResolver, Resolution};
use super::entities::{BirdKind, EntityStore};
use super::guard::{GuardConfig, GuardReport, SettleReport, StabilityGuard};
use super::launch::{trajectory_preview, LaunchConfig, PreviewBounds};
use super::level::{ArenaConfig, LevelDescriptor, LevelError, PlacedLevel};
use crate::engine::game_loop::GameLoop;
use crate::engine::physics::{PhysicsConfig, PhysicsError, PhysicsWorld};

/// A launched bird still slow after this many ticks is taken off the field
pub const BIRD_IDLE_TICKS: u32 = 180;
/// Upper bound on a single bird's time in play (20s at 60Hz)
pub const BIRD_MAX_FLIGHT_TICKS: u32 = 1200;

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("No bird is loaded in the slingshot")]
    NoBirdLoaded,

    #[error("A bird is already loaded")]
    BirdAlreadyLoaded,

    #[error("No birds left in the lineup")]
    LineupExhausted,

    #[error("Level is over ({0:?})")]
    LevelOver(LevelStatus),

    #[error("Invalid level: {0}")]
    Level(#[from] LevelError),

    #[error("Physics setup failed: {0}")]
    Physics(#[from] PhysicsError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelStatus {
    Playing,
    /// Every pig eliminated
    Victory,
    /// Birds used up with pigs remaining
    Defeat,
}

#[derive(Debug, Clone, Default)]
pub struct SimulationConfig {
    pub physics: PhysicsConfig,
    pub arena: ArenaConfig,
    pub launch: LaunchConfig,
    pub combo: ComboConfig,
    pub guard: GuardConfig,
}

/// What happened during one fixed step
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub contacts: usize,
    pub events: Vec<CollisionEvent>,
    /// Score before the combo multiplier
    pub raw_score: f32,
    /// Score actually credited this tick
    pub score_delta: f32,
    /// Multiplier after this tick's boosts
    pub multiplier: f32,
    pub birds_retired: usize,
    pub guard: GuardReport,
    pub status: LevelStatus,
}

pub struct Simulation {
    config: SimulationConfig,
    descriptor: LevelDescriptor,
    level: PlacedLevel,

    world: PhysicsWorld,
    entities: EntityStore,
    resolver: DamageResolver,
    combo: ComboTracker,
    guard: StabilityGuard,
    game_loop: GameLoop,

    next_bird: usize,
    loaded: Option<u32>,
    pull: Vec2,

    score: f32,
    tick_count: u64,
    status: LevelStatus,
    settle: SettleReport,
}

impl Simulation {
    /// Build a level, let it settle, and get ready for the first bird
    pub fn new(config: SimulationConfig, descriptor: &LevelDescriptor) -> Result<Self, SimulationError> {
        let level = descriptor.place(&config.arena)?;
        let mut world = PhysicsWorld::new(config.physics.clone())?;
        let arena = config.arena;
        world.add_boundaries(arena.width, arena.height, arena.ground_top());

        let mut entities = EntityStore::new();
        for block in &level.blocks {
            entities.spawn_block(&mut world, block.material, block.center, block.width, block.height);
        }
        for pig in &level.pigs {
            entities.spawn_pig(&mut world, pig.kind, pig.center);
        }

        let guard = StabilityGuard::new(config.guard.clone());
        let settle = guard.settle(&mut world, &mut entities);

        log::info!(
            "Level '{}' ready: {} blocks, {} pigs, {} birds{}",
            level.name,
            level.blocks.len(),
            level.pigs.len(),
            level.birds.len(),
            if world.is_degraded() { " (degraded contacts)" } else { "" }
        );

        let gravity = config.physics.gravity.y;
        let timestep = config.physics.timestep;
        Ok(Self {
            resolver: DamageResolver::new(gravity, timestep),
            combo: ComboTracker::from_config(&config.combo),
            guard,
            game_loop: GameLoop::with_timestep(timestep),
            descriptor: descriptor.clone(),
            level,
            config,
            world,
            entities,
            next_bird: 0,
            loaded: None,
            pull: Vec2::ZERO,
            score: 0.0,
            tick_count: 0,
            status: LevelStatus::Playing,
            settle,
        })
    }

    /// Discard everything and rebuild the same level
    pub fn reset(&mut self) -> Result<(), SimulationError> {
        let descriptor = self.descriptor.clone();
        self.load_level(&descriptor)
    }

    /// Discard everything and build `descriptor`
    pub fn load_level(&mut self, descriptor: &LevelDescriptor) -> Result<(), SimulationError> {
        *self = Self::new(self.config.clone(), descriptor)?;
        Ok(())
    }

    /// Put the next bird from the lineup into the slingshot
    pub fn load_next_bird(&mut self) -> Result<BirdKind, SimulationError> {
        self.ensure_playing()?;
        if self.loaded.is_some() {
            return Err(SimulationError::BirdAlreadyLoaded);
        }
        let kind = *self
            .level
            .birds
            .get(self.next_bird)
            .ok_or(SimulationError::LineupExhausted)?;

        let anchor = self.config.launch.anchor;
        let index = self.entities.spawn_bird(&mut self.world, kind, anchor);
        self.next_bird += 1;
        self.loaded = Some(index);
        self.pull = Vec2::ZERO;
        log::info!("Loaded {:?} bird ({} left)", kind, self.birds_remaining());
        Ok(kind)
    }

    /// Pull the loaded bird back; returns the trajectory preview
    pub fn aim(&mut self, pull: Vec2) -> Result<Vec<Vec2>, SimulationError> {
        self.ensure_playing()?;
        let index = self.loaded.ok_or(SimulationError::NoBirdLoaded)?;

        let launch = &self.config.launch;
        self.pull = launch.clamp_pull(pull);
        let pouch = launch.pouch_position(self.pull);
        if let Some(bird) = self.entities.bird_mut(index) {
            bird.hold_at(&mut self.world, pouch);
        }

        let velocity = self.guard.clamp_launch(launch.velocity(self.pull));
        Ok(trajectory_preview(
            pouch,
            velocity,
            &self.config.physics,
            &self.preview_bounds(),
            launch.preview_steps,
        ))
    }

    /// Release the loaded bird at the current pull; returns its launch velocity
    pub fn release(&mut self) -> Result<Vec2, SimulationError> {
        self.ensure_playing()?;
        let index = self.loaded.ok_or(SimulationError::NoBirdLoaded)?;

        let velocity = self.guard.clamp_launch(self.config.launch.velocity(self.pull));
        if let Some(bird) = self.entities.bird_mut(index) {
            bird.launch(&mut self.world, velocity);
        }
        self.loaded = None;
        self.pull = Vec2::ZERO;
        Ok(velocity)
    }

    /// Aim and release in one go
    pub fn launch(&mut self, pull: Vec2) -> Result<Vec2, SimulationError> {
        self.aim(pull)?;
        self.release()
    }

    /// Run as many fixed steps as `frame_time` covers, capped per frame
    pub fn update(&mut self, frame_time: Duration) -> Vec<TickReport> {
        let steps = self.game_loop.advance(frame_time);
        (0..steps).map(|_| self.tick()).collect()
    }

    /// One fixed step: world, damage, scoring, cleanup, sanitize
    pub fn tick(&mut self) -> TickReport {
        self.tick_count += 1;
        self.combo.tick();

        let contacts = self.world.step(self.config.physics.timestep);
        let resolution = self.resolver.process(&contacts, &mut self.entities);
        self.remove_broken_bodies();

        let raw_score = resolution.score_delta;
        let events = resolution.events.clone();
        let score_delta = self.credit(resolution);

        let birds_retired = self.retire_birds();
        let guard = self.guard.sanitize(&mut self.world, &mut self.entities);
        self.update_status();

        for event in &events {
            log::debug!("{:?} at {:?} (+{})", event.kind, event.position, event.score_delta);
        }

        TickReport {
            tick: self.tick_count,
            contacts: contacts.len(),
            events,
            raw_score,
            score_delta,
            multiplier: self.combo.multiplier(),
            birds_retired,
            guard,
            status: self.status,
        }
    }

    /// Scale a resolution's score by the current multiplier, then apply its boosts
    fn credit(&mut self, resolution: Resolution) -> f32 {
        let scaled = self.combo.scale(resolution.score_delta);
        self.score += scaled;
        for boost in resolution.combo_boosts {
            self.combo.boost(boost);
        }
        scaled
    }

    fn remove_broken_bodies(&mut self) {
        for pig in self.entities.pigs().iter().filter(|p| p.is_dead()) {
            self.world.remove_body(pig.body);
        }
        for block in self.entities.blocks().iter().filter(|b| b.is_destroyed()) {
            self.world.remove_body(block.body);
        }
    }

    /// Take birds that came to rest (or overstayed) out of the world
    fn retire_birds(&mut self) -> usize {
        let ground_top = self.config.arena.ground_top();
        let rest_speed = self.config.guard.rest_speed;
        let width = self.config.arena.width;
        let mut retired = 0;

        for index in 0..self.entities.birds().len() as u32 {
            let Some(bird) = self.entities.bird_mut(index) else {
                continue;
            };
            if !bird.is_launched() || bird.is_removed() {
                continue;
            }
            bird.track_flight(rest_speed);

            let position = bird.position();
            let out_of_arena = position.x < -bird.radius() || position.x > width + bird.radius();
            if bird.is_resting_on_ground(ground_top, rest_speed)
                || bird.idle_ticks() >= BIRD_IDLE_TICKS
                || bird.flight_ticks() >= BIRD_MAX_FLIGHT_TICKS
                || out_of_arena
            {
                bird.remove(&mut self.world);
                log::info!("Bird {} retired after {} ticks", index, bird.flight_ticks());
                retired += 1;
            }
        }
        retired
    }

    fn update_status(&mut self) {
        if self.status != LevelStatus::Playing {
            return;
        }
        if self.entities.remaining_pigs() == 0 {
            self.status = LevelStatus::Victory;
            log::info!("Victory with score {:.0}", self.score);
        } else if self.loaded.is_none()
            && self.next_bird >= self.level.birds.len()
            && self.entities.birds_in_flight() == 0
        {
            self.status = LevelStatus::Defeat;
            log::info!(
                "Defeat: {} pigs left, score {:.0}",
                self.entities.remaining_pigs(),
                self.score
            );
        }
    }

    fn ensure_playing(&self) -> Result<(), SimulationError> {
        match self.status {
            LevelStatus::Playing => Ok(()),
            status => Err(SimulationError::LevelOver(status)),
        }
    }

    fn preview_bounds(&self) -> PreviewBounds {
        PreviewBounds {
            left: 0.0,
            right: self.config.arena.width,
            ground_top: self.config.arena.ground_top(),
        }
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn status(&self) -> LevelStatus {
        self.status
    }

    pub fn entities(&self) -> &EntityStore {
        &self.entities
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn combo(&self) -> &ComboTracker {
        &self.combo
    }

    pub fn guard(&self) -> &StabilityGuard {
        &self.guard
    }

    pub fn game_loop(&self) -> &GameLoop {
        &self.game_loop
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn level_name(&self) -> &str {
        &self.level.name
    }

    /// Index of the bird waiting in the slingshot
    pub fn loaded_bird(&self) -> Option<u32> {
        self.loaded
    }

    /// Birds not yet loaded
    pub fn birds_remaining(&self) -> usize {
        self.level.birds.len().saturating_sub(self.next_bird)
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn settle_report(&self) -> &SettleReport {
        &self.settle
    }
}
