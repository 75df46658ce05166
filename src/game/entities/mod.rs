// Game entities
//
// Each entity pairs a physics body handle with game state. Bodies are owned by
// the physics world; entities only hold the handle plus a sanitized snapshot of
// the body refreshed by the stability guard, which is what damage rules read.
// Entity tables are append-only for the lifetime of a level, so the index in a
// body's tag stays valid after the entity dies.

pub mod bird;
pub mod block;
pub mod material;
pub mod pig;

pub use bird::Bird;
pub use block::Block;
pub use material::{BirdKind, Material, PigKind};
pub use pig::Pig;

use glam::Vec2;

use crate::engine::physics::{PhysicsWorld, RigidBodyHandle};

/// Sanitized copy of a body's kinematic state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub angle: f32,
    pub angular_velocity: f32,
}

impl BodyState {
    /// Body at rest at `position`
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            angle: 0.0,
            angular_velocity: 0.0,
        }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

/// Result of applying damage to an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Entity was already dead/destroyed; nothing changed
    Ignored,
    /// Health dropped but stayed above zero
    Damaged,
    /// Health crossed zero on this hit
    Killed,
}

/// Monotonically decreasing health with a one-shot depletion flag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    current: f32,
    max: f32,
    depleted: bool,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self {
            current: max,
            max,
            depleted: false,
        }
    }

    /// Apply damage; negative or non-finite amounts count as zero
    pub fn apply(&mut self, damage: f32) -> HitOutcome {
        if self.depleted {
            return HitOutcome::Ignored;
        }

        let damage = if damage.is_finite() { damage.max(0.0) } else { 0.0 };
        self.current -= damage;

        if self.current <= 0.0 {
            self.depleted = true;
            HitOutcome::Killed
        } else {
            HitOutcome::Damaged
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn is_depleted(&self) -> bool {
        self.depleted
    }

    /// Remaining health in [0, 1]
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            return 0.0;
        }
        (self.current / self.max).clamp(0.0, 1.0)
    }
}

/// Side table of every entity in a level, indexed by body tag
#[derive(Debug, Default)]
pub struct EntityStore {
    birds: Vec<Bird>,
    pigs: Vec<Pig>,
    blocks: Vec<Block>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a bird in the slingshot at `position`
    pub fn spawn_bird(&mut self, world: &mut PhysicsWorld, kind: BirdKind, position: Vec2) -> u32 {
        let index = self.birds.len() as u32;
        self.birds.push(Bird::new(index, kind, position, world));
        index
    }

    pub fn spawn_pig(&mut self, world: &mut PhysicsWorld, kind: PigKind, position: Vec2) -> u32 {
        let index = self.pigs.len() as u32;
        self.pigs.push(Pig::new(index, kind, position, world));
        index
    }

    /// Spawn a block centered on `center`
    pub fn spawn_block(
        &mut self,
        world: &mut PhysicsWorld,
        material: Material,
        center: Vec2,
        width: f32,
        height: f32,
    ) -> u32 {
        let index = self.blocks.len() as u32;
        self.blocks
            .push(Block::new(index, material, center, width, height, world));
        index
    }

    pub fn bird(&self, index: u32) -> Option<&Bird> {
        self.birds.get(index as usize)
    }

    pub fn bird_mut(&mut self, index: u32) -> Option<&mut Bird> {
        self.birds.get_mut(index as usize)
    }

    pub fn pig(&self, index: u32) -> Option<&Pig> {
        self.pigs.get(index as usize)
    }

    pub fn pig_mut(&mut self, index: u32) -> Option<&mut Pig> {
        self.pigs.get_mut(index as usize)
    }

    pub fn block(&self, index: u32) -> Option<&Block> {
        self.blocks.get(index as usize)
    }

    pub fn block_mut(&mut self, index: u32) -> Option<&mut Block> {
        self.blocks.get_mut(index as usize)
    }

    pub fn birds(&self) -> &[Bird] {
        &self.birds
    }

    pub fn pigs(&self) -> &[Pig] {
        &self.pigs
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub(crate) fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }

    /// Every entity that still has a body in the world
    pub fn live_bodies_mut(&mut self) -> impl Iterator<Item = (RigidBodyHandle, &mut BodyState)> + '_ {
        let birds = self
            .birds
            .iter_mut()
            .filter(|b| !b.is_removed())
            .map(|b| (b.body, &mut b.state));
        let pigs = self
            .pigs
            .iter_mut()
            .filter(|p| !p.is_dead())
            .map(|p| (p.body, &mut p.state));
        let blocks = self
            .blocks
            .iter_mut()
            .filter(|b| !b.is_destroyed())
            .map(|b| (b.body, &mut b.state));
        birds.chain(pigs).chain(blocks)
    }

    pub fn remaining_pigs(&self) -> usize {
        self.pigs.iter().filter(|p| !p.is_dead()).count()
    }

    pub fn intact_blocks(&self) -> usize {
        self.blocks.iter().filter(|b| !b.is_destroyed()).count()
    }

    /// Launched birds still moving through the world
    pub fn birds_in_flight(&self) -> usize {
        self.birds
            .iter()
            .filter(|b| b.is_launched() && !b.is_removed())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_kills_exactly_once() {
        let mut health = Health::new(100.0);
        assert_eq!(health.apply(40.0), HitOutcome::Damaged);
        assert_eq!(health.current(), 60.0);
        assert_eq!(health.apply(40.0), HitOutcome::Damaged);
        assert_eq!(health.current(), 20.0);
        assert_eq!(health.apply(40.0), HitOutcome::Killed);
        assert!(health.is_depleted());

        let after = health.current();
        assert_eq!(health.apply(40.0), HitOutcome::Ignored);
        assert_eq!(health.current(), after);
        assert!(health.is_depleted());
    }

    #[test]
    fn test_health_never_increases() {
        let mut health = Health::new(50.0);
        health.apply(-20.0);
        assert_eq!(health.current(), 50.0);
        health.apply(f32::NAN);
        assert_eq!(health.current(), 50.0);
        health.apply(f32::INFINITY);
        assert_eq!(health.current(), 50.0);
    }

    #[test]
    fn test_health_fraction_clamped() {
        let mut health = Health::new(30.0);
        assert_eq!(health.fraction(), 1.0);
        health.apply(100.0);
        assert_eq!(health.fraction(), 0.0);
    }
}
