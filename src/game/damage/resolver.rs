// Per-pair collision damage rules
//
// Only reads entity snapshots taken before the step, so a contact sees the
// speed a body had going into the collision rather than after the solver
// separated it.

use std::f32::consts::FRAC_PI_3;

use glam::Vec2;

use super::force::{base_damage, impact_force, ImpactKind, MAX_DAMAGE};
use super::{score, CollisionEventKind, ComboBoost, Resolution};
use crate::core::math::wrap_angle;
use crate::engine::physics::config::{FIXED_TIMESTEP, GRAVITY};
use crate::engine::physics::{BodyCategory, ContactEvent};
use crate::game::entities::{EntityStore, HitOutcome, Material};

// Minimum damage once a contact passes its gate, per rule
const BIRD_PIG_FLOOR: f32 = 2.0;
const BIRD_BLOCK_FLOOR: f32 = 1.0;
const BLOCK_PIG_FLOOR: f32 = 0.5;
const BLOCK_BLOCK_FLOOR: f32 = 0.25;
const PIG_FALL_FLOOR: f32 = 1.0;
const BLOCK_FALL_FLOOR: f32 = 0.5;

/// Impulses below this many ticks of the pair's combined weight are resting contacts
const RESTING_IMPULSE_FACTOR: f32 = 3.0;

/// Downward block speed (px/s) that turns a block-pig contact into a crush
const CRUSH_SPEED: f32 = 50.0;
const CRUSH_SPEED_SCALE: f32 = 200.0;
const CRUSH_RESISTANCE: f32 = 0.8;

const SHEAR_SCALE: f32 = 0.3;
const ICE_BRITTLE_FORCE: f32 = 500.0;
const ICE_BRITTLE_MULTIPLIER: f32 = 3.0;

const UNSTABLE_HIT_MULTIPLIER: f32 = 1.5;
const COLLAPSE_DAMAGE: f32 = 20.0;
/// A block counts as supported when its center is this far above the hit block's
const SUPPORT_CLEARANCE: f32 = 20.0;

const CHAIN_FORCE_SCALE: f32 = 0.5;
const CHAIN_FALLOFF_SCALE: f32 = 0.3;

const PIG_FALL_DIVISOR: f32 = 5.0;
const BLOCK_FALL_DIVISOR: f32 = 10.0;
const ICE_FALL_MULTIPLIER: f32 = 5.0;
const ICE_FALL_CHAIN_RADIUS: f32 = 100.0;
const ICE_FALL_CHAIN_SCALE: f32 = 0.2;

const TILT_LIMIT: f32 = FRAC_PI_3;
const TILT_DAMAGE: f32 = 10.0;

/// What hurt a pig; decides which event a hit or kill scores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageSource {
    /// Struck by a bird
    Direct,
    /// Landed on by a block
    Crush,
    /// Hit the ground too fast
    Fall,
}

#[derive(Debug, Clone)]
pub struct DamageResolver {
    /// Impulse needed per unit of mass to count as an impact
    resting_impulse_per_mass: f32,
}

impl Default for DamageResolver {
    fn default() -> Self {
        Self::new(GRAVITY, FIXED_TIMESTEP)
    }
}

impl DamageResolver {
    pub fn new(gravity: f32, timestep: f32) -> Self {
        let support = gravity.abs() * timestep;
        Self {
            resting_impulse_per_mass: if support.is_finite() {
                RESTING_IMPULSE_FACTOR * support
            } else {
                0.0
            },
        }
    }

    /// Resolve one step's contacts, then apply per-tick tilt failure
    pub fn process(&self, contacts: &[ContactEvent], entities: &mut EntityStore) -> Resolution {
        let mut out = Resolution::default();
        for contact in contacts {
            self.resolve_contact(contact.canonical(), entities, &mut out);
        }
        self.check_tilt(entities, &mut out);
        out
    }

    fn resolve_contact(&self, contact: ContactEvent, entities: &mut EntityStore, out: &mut Resolution) {
        let (a, b) = (contact.first, contact.second);
        match (a.category, b.category) {
            (BodyCategory::Bird, BodyCategory::Pig) => self.bird_pig(&contact, a.index, b.index, entities, out),
            (BodyCategory::Bird, BodyCategory::Block) => {
                self.bird_block(&contact, a.index, b.index, entities, out)
            }
            (BodyCategory::Pig, BodyCategory::Block) => self.block_pig(&contact, b.index, a.index, entities, out),
            (BodyCategory::Block, BodyCategory::Block) => {
                self.block_block(&contact, a.index, b.index, entities, out)
            }
            (BodyCategory::Pig, BodyCategory::Ground) => self.pig_ground(a.index, entities, out),
            (BodyCategory::Block, BodyCategory::Ground) => self.block_ground(a.index, entities, out),
            _ => {}
        }
    }

    fn is_impact(&self, impulse: f32, total_mass: f32) -> bool {
        impulse.is_finite() && impulse > self.resting_impulse_per_mass * total_mass
    }

    fn bird_pig(&self, contact: &ContactEvent, bird: u32, pig: u32, entities: &mut EntityStore, out: &mut Resolution) {
        // A bird still in the pouch never scores
        let Some(bird) = entities.bird(bird).filter(|b| b.is_launched()) else {
            return;
        };
        let (bird_mass, multiplier) = (bird.mass(), bird.damage_multiplier());

        let Some(target) = entities.pig(pig) else {
            return;
        };
        if target.is_dead() || !self.is_impact(contact.impulse, bird_mass + target.mass()) {
            return;
        }

        let force = impact_force(
            contact.impulse,
            contact.normal,
            contact.penetration,
            bird_mass,
            target.mass(),
        );
        let damage = base_damage(force * multiplier, 1.0, ImpactKind::Direct) * target.stats().direct_factor;
        self.strike_pig(entities, pig, damage.max(BIRD_PIG_FLOOR), DamageSource::Direct, out);
    }

    fn bird_block(
        &self,
        contact: &ContactEvent,
        bird: u32,
        block: u32,
        entities: &mut EntityStore,
        out: &mut Resolution,
    ) {
        let Some(bird) = entities.bird(bird).filter(|b| b.is_launched()) else {
            return;
        };
        let (bird_mass, bird_kind, multiplier) = (bird.mass(), bird.kind, bird.damage_multiplier());

        let Some(target) = entities.block(block) else {
            return;
        };
        if target.is_destroyed() || !self.is_impact(contact.impulse, bird_mass + target.mass()) {
            return;
        }

        let material = target.material;
        let props = target.props();
        let force = impact_force(
            contact.impulse,
            contact.normal,
            contact.penetration,
            bird_mass,
            target.mass(),
        );
        let scaled = force * multiplier * bird_kind.synergy(material);
        let mut damage = base_damage(scaled, props.resistance, ImpactKind::Direct);

        if damage > props.stability_threshold {
            damage *= UNSTABLE_HIT_MULTIPLIER;
            self.collapse_supported(entities, block, out);
        }

        let Some(target) = entities.block_mut(block) else {
            return;
        };
        let position = target.position();
        match target.take_damage(damage.max(BIRD_BLOCK_FLOOR)) {
            HitOutcome::Killed => {
                out.record(destroyed_kind(material), position, score::BLOCK_DESTROYED);
                out.boost(ComboBoost::BlockDestroyed);
                if let Some(radius) = props.chain_radius {
                    self.chain_reaction(entities, position, force * CHAIN_FORCE_SCALE, radius, out);
                }
            }
            HitOutcome::Damaged => out.record(CollisionEventKind::BlockHit, position, score::BLOCK_HIT),
            HitOutcome::Ignored => {}
        }
    }

    fn block_pig(&self, contact: &ContactEvent, block: u32, pig: u32, entities: &mut EntityStore, out: &mut Resolution) {
        let Some(source) = entities.block(block) else {
            return;
        };
        if source.is_destroyed() {
            return;
        }
        let (block_mass, block_vy, mass_scale) = (source.mass(), source.state.velocity.y, source.props().mass_scale);

        let Some(target) = entities.pig(pig) else {
            return;
        };
        if target.is_dead() || !self.is_impact(contact.impulse, block_mass + target.mass()) {
            return;
        }

        let mut force = impact_force(
            contact.impulse,
            contact.normal,
            contact.penetration,
            block_mass,
            target.mass(),
        );
        let kind = if block_vy > CRUSH_SPEED {
            force *= 1.5 + block_vy / CRUSH_SPEED_SCALE;
            ImpactKind::Crush
        } else {
            ImpactKind::Direct
        };
        force *= mass_scale;

        let damage = base_damage(force, CRUSH_RESISTANCE, kind) * target.stats().crush_factor;
        self.strike_pig(entities, pig, damage.max(BLOCK_PIG_FLOOR), DamageSource::Crush, out);
    }

    fn block_block(
        &self,
        contact: &ContactEvent,
        first: u32,
        second: u32,
        entities: &mut EntityStore,
        out: &mut Resolution,
    ) {
        if first == second {
            return;
        }
        let (Some(a), Some(b)) = (entities.block(first), entities.block(second)) else {
            return;
        };
        if !self.is_impact(contact.impulse, a.mass() + b.mass()) {
            return;
        }
        let force = impact_force(contact.impulse, contact.normal, contact.penetration, a.mass(), b.mass());
        let (res_a, res_b) = (a.props().resistance, b.props().resistance);

        for (target, own_res, other_res) in [(first, res_a, res_b), (second, res_b, res_a)] {
            let Some(block) = entities.block_mut(target) else {
                continue;
            };
            if block.is_destroyed() {
                continue;
            }

            let mut damage = base_damage(force * (other_res / own_res) * SHEAR_SCALE, own_res, ImpactKind::Shear);
            if block.material == Material::Ice && force > ICE_BRITTLE_FORCE {
                damage *= ICE_BRITTLE_MULTIPLIER;
            }

            if block.take_damage(damage.max(BLOCK_BLOCK_FLOOR)) == HitOutcome::Killed {
                out.record(CollisionEventKind::BlockCollapsed, block.position(), score::BLOCK_BROKEN);
            }
        }
    }

    fn pig_ground(&self, pig: u32, entities: &mut EntityStore, out: &mut Resolution) {
        let Some(target) = entities.pig(pig) else {
            return;
        };
        let fall_speed = target.state.velocity.y.abs();
        let threshold = target.stats().fall_threshold;
        if target.is_dead() || !fall_speed.is_finite() || fall_speed <= threshold {
            return;
        }

        let damage = (fall_speed - threshold) / PIG_FALL_DIVISOR;
        self.strike_pig(entities, pig, damage.max(PIG_FALL_FLOOR), DamageSource::Fall, out);
    }

    fn block_ground(&self, block: u32, entities: &mut EntityStore, out: &mut Resolution) {
        let Some(target) = entities.block_mut(block) else {
            return;
        };
        let props = target.props();
        let fall_speed = target.state.velocity.y.abs();
        if target.is_destroyed() || !fall_speed.is_finite() || fall_speed <= props.fall_threshold {
            return;
        }

        let mut damage = (fall_speed - props.fall_threshold) / BLOCK_FALL_DIVISOR / props.resistance;
        let is_ice = target.material == Material::Ice;
        if is_ice {
            damage *= ICE_FALL_MULTIPLIER;
        }

        let position = target.position();
        if target.take_damage(damage.max(BLOCK_FALL_FLOOR)) != HitOutcome::Killed {
            return;
        }
        if is_ice {
            out.record(CollisionEventKind::BlockShattered, position, score::BLOCK_SHATTERED);
            self.chain_reaction(
                entities,
                position,
                fall_speed * ICE_FALL_CHAIN_SCALE,
                ICE_FALL_CHAIN_RADIUS,
                out,
            );
        } else {
            out.record(CollisionEventKind::BlockShattered, position, score::BLOCK_BROKEN);
        }
    }

    /// Apply already-computed damage to a pig and score the outcome
    pub fn strike_pig(
        &self,
        entities: &mut EntityStore,
        pig: u32,
        damage: f32,
        source: DamageSource,
        out: &mut Resolution,
    ) {
        let Some(target) = entities.pig_mut(pig) else {
            return;
        };
        let position = target.position();
        match (target.take_damage(damage), source) {
            (HitOutcome::Killed, DamageSource::Direct) => {
                out.record(CollisionEventKind::PigEliminated, position, score::PIG_ELIMINATED);
                out.boost(ComboBoost::PigEliminated);
            }
            (HitOutcome::Killed, DamageSource::Crush) => {
                out.record(CollisionEventKind::PigCrushed, position, score::PIG_CRUSHED);
                out.boost(ComboBoost::PigCrushed);
            }
            (HitOutcome::Killed, DamageSource::Fall) => {
                out.record(CollisionEventKind::PigFell, position, score::PIG_FELL);
            }
            (HitOutcome::Damaged, DamageSource::Direct) => {
                out.record(CollisionEventKind::PigHit, position, score::PIG_HIT);
            }
            (HitOutcome::Damaged, DamageSource::Crush) => {
                out.record(CollisionEventKind::PigHit, position, score::PIG_DAMAGED);
            }
            (HitOutcome::Damaged, DamageSource::Fall) | (HitOutcome::Ignored, _) => {}
        }
    }

    /// Damage every intact block resting above `origin` within its width
    ///
    /// Scores one structure collapse if anything was supported, plus each
    /// supported block that breaks.
    fn collapse_supported(&self, entities: &mut EntityStore, origin: u32, out: &mut Resolution) {
        let Some(base) = entities.block(origin) else {
            return;
        };
        let (base_position, base_width) = (base.position(), base.width);

        let supported: Vec<u32> = entities
            .blocks()
            .iter()
            .filter(|b| b.index != origin && !b.is_destroyed())
            .filter(|b| {
                let p = b.position();
                p.y < base_position.y - SUPPORT_CLEARANCE && (p.x - base_position.x).abs() < base_width
            })
            .map(|b| b.index)
            .collect();
        if supported.is_empty() {
            return;
        }

        log::debug!("Block {} gave way under {} blocks", origin, supported.len());
        out.record(CollisionEventKind::BlockCollapsed, base_position, score::STRUCTURE_COLLAPSED);
        for index in supported {
            let Some(block) = entities.block_mut(index) else {
                continue;
            };
            if block.take_damage(COLLAPSE_DAMAGE) == HitOutcome::Killed {
                out.record(CollisionEventKind::BlockCollapsed, block.position(), score::BLOCK_BROKEN);
            }
        }
    }

    /// Radial damage around a shattered block
    ///
    /// Single level only: blocks destroyed here never trigger further chains
    /// or collapses.
    pub fn chain_reaction(
        &self,
        entities: &mut EntityStore,
        origin: Vec2,
        force: f32,
        radius: f32,
        out: &mut Resolution,
    ) {
        if !force.is_finite() || force <= 0.0 || !radius.is_finite() || radius <= 0.0 {
            return;
        }

        for block in entities.blocks_mut().iter_mut().filter(|b| !b.is_destroyed()) {
            let distance = block.position().distance(origin);
            if distance >= radius {
                continue;
            }

            let falloff = 1.0 - distance / radius;
            let damage = force * falloff * CHAIN_FALLOFF_SCALE * block.props().chain_multiplier;
            let damage = (damage * ImpactKind::Chain.multiplier()).min(MAX_DAMAGE);
            if block.take_damage(damage) == HitOutcome::Killed {
                out.record(destroyed_kind(block.material), block.position(), score::CHAIN_REACTION);
            }
        }
    }

    /// Steadily break blocks tipped past the stability angle
    fn check_tilt(&self, entities: &mut EntityStore, out: &mut Resolution) {
        for block in entities.blocks_mut().iter_mut().filter(|b| !b.is_destroyed()) {
            if wrap_angle(block.state.angle).abs() <= TILT_LIMIT {
                continue;
            }
            let damage = TILT_DAMAGE / block.props().resistance;
            if block.take_damage(damage) == HitOutcome::Killed {
                out.record(CollisionEventKind::BlockCollapsed, block.position(), score::BLOCK_BROKEN);
            }
        }
    }
}

fn destroyed_kind(material: Material) -> CollisionEventKind {
    if material == Material::Ice {
        CollisionEventKind::BlockShattered
    } else {
        CollisionEventKind::BlockDestroyed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::physics::{BodyTag, PhysicsConfig, PhysicsWorld};
    use crate::game::entities::{BirdKind, BodyState, PigKind};

    fn setup() -> (PhysicsWorld, EntityStore) {
        (PhysicsWorld::new(PhysicsConfig::default()).unwrap(), EntityStore::new())
    }

    fn contact(first: BodyTag, second: BodyTag, impulse: f32) -> ContactEvent {
        ContactEvent {
            first,
            second,
            impulse,
            normal: Vec2::X,
            penetration: 0.0,
        }
    }

    fn bird_tag(i: u32) -> BodyTag {
        BodyTag::new(BodyCategory::Bird, i)
    }

    fn pig_tag(i: u32) -> BodyTag {
        BodyTag::new(BodyCategory::Pig, i)
    }

    fn block_tag(i: u32) -> BodyTag {
        BodyTag::new(BodyCategory::Block, i)
    }

    fn launched_bird(world: &mut PhysicsWorld, entities: &mut EntityStore, kind: BirdKind) -> u32 {
        let bird = entities.spawn_bird(world, kind, Vec2::new(150.0, 575.0));
        assert!(entities.bird_mut(bird).unwrap().launch(world, Vec2::new(500.0, -200.0)));
        bird
    }

    #[test]
    fn test_repeated_hits_eliminate_pig_once() {
        let (mut world, mut entities) = setup();
        let pig = entities.spawn_pig(&mut world, PigKind::Normal, Vec2::new(800.0, 600.0));
        let resolver = DamageResolver::default();
        let mut out = Resolution::default();

        resolver.strike_pig(&mut entities, pig, 40.0, DamageSource::Direct, &mut out);
        assert_eq!(entities.pig(pig).unwrap().health(), 60.0);
        resolver.strike_pig(&mut entities, pig, 40.0, DamageSource::Direct, &mut out);
        assert_eq!(entities.pig(pig).unwrap().health(), 20.0);
        resolver.strike_pig(&mut entities, pig, 40.0, DamageSource::Direct, &mut out);
        assert!(entities.pig(pig).unwrap().is_dead());

        assert_eq!(out.count(CollisionEventKind::PigHit), 2);
        assert_eq!(out.count(CollisionEventKind::PigEliminated), 1);
        assert_eq!(out.score_delta, 2.0 * score::PIG_HIT + score::PIG_ELIMINATED);
        assert_eq!(out.combo_boosts, vec![ComboBoost::PigEliminated]);

        // Further hits on the dead pig change nothing
        resolver.strike_pig(&mut entities, pig, 40.0, DamageSource::Direct, &mut out);
        assert_eq!(out.events.len(), 3);
    }

    #[test]
    fn test_ice_takes_more_damage_than_stone() {
        let (mut world, mut entities) = setup();
        let bird = launched_bird(&mut world, &mut entities, BirdKind::Balanced);
        let ice = entities.spawn_block(&mut world, Material::Ice, Vec2::new(600.0, 630.0), 40.0, 40.0);
        let stone = entities.spawn_block(&mut world, Material::Stone, Vec2::new(900.0, 630.0), 40.0, 40.0);
        let resolver = DamageResolver::default();

        let contacts = [
            contact(bird_tag(bird), block_tag(ice), 2000.0),
            contact(bird_tag(bird), block_tag(stone), 2000.0),
        ];
        resolver.process(&contacts, &mut entities);

        let ice_loss = 30.0 - entities.block(ice).unwrap().health();
        let stone_loss = 150.0 - entities.block(stone).unwrap().health();
        assert!(ice_loss > stone_loss, "ice lost {ice_loss}, stone lost {stone_loss}");
    }

    #[test]
    fn test_resting_contact_does_no_damage() {
        let (mut world, mut entities) = setup();
        let a = entities.spawn_block(&mut world, Material::Wood, Vec2::new(600.0, 630.0), 40.0, 40.0);
        let b = entities.spawn_block(&mut world, Material::Wood, Vec2::new(600.0, 590.0), 40.0, 40.0);
        let resolver = DamageResolver::default();

        // One tick of the upper block's weight
        let weight = 0.5 * GRAVITY * FIXED_TIMESTEP;
        let out = resolver.process(&[contact(block_tag(a), block_tag(b), weight)], &mut entities);

        assert!(out.is_empty());
        assert_eq!(entities.block(a).unwrap().health(), 70.0);
        assert_eq!(entities.block(b).unwrap().health(), 70.0);
    }

    #[test]
    fn test_hard_block_hit_applies_minimum_damage() {
        let (mut world, mut entities) = setup();
        let a = entities.spawn_block(&mut world, Material::Metal, Vec2::new(600.0, 630.0), 40.0, 40.0);
        let b = entities.spawn_block(&mut world, Material::Metal, Vec2::new(640.0, 630.0), 40.0, 40.0);
        let resolver = DamageResolver::default();

        resolver.process(&[contact(block_tag(a), block_tag(b), 1000.0)], &mut entities);
        let loss = 250.0 - entities.block(a).unwrap().health();
        assert!(loss >= BLOCK_BLOCK_FLOOR);
    }

    #[test]
    fn test_block_crush_scores_pig_crushed() {
        let (mut world, mut entities) = setup();
        let pig = entities.spawn_pig(&mut world, PigKind::Normal, Vec2::new(800.0, 635.0));
        let block = entities.spawn_block(&mut world, Material::Stone, Vec2::new(800.0, 590.0), 40.0, 40.0);
        entities.block_mut(block).unwrap().state.velocity = Vec2::new(0.0, 800.0);
        entities.pig_mut(pig).unwrap().take_damage(99.0);
        let resolver = DamageResolver::default();

        // Pig sorts before block in canonical order
        let out = resolver.process(&[contact(block_tag(block), pig_tag(pig), 2000.0)], &mut entities);

        assert!(entities.pig(pig).unwrap().is_dead());
        assert_eq!(out.count(CollisionEventKind::PigCrushed), 1);
        assert_eq!(out.combo_boosts, vec![ComboBoost::PigCrushed]);
    }

    #[test]
    fn test_pig_fall_below_threshold_is_harmless() {
        let (mut world, mut entities) = setup();
        let pig = entities.spawn_pig(&mut world, PigKind::Normal, Vec2::new(800.0, 635.0));
        entities.pig_mut(pig).unwrap().state.velocity = Vec2::new(0.0, 240.0);
        let resolver = DamageResolver::default();

        let out = resolver.process(&[contact(pig_tag(pig), BodyTag::ground(), 500.0)], &mut entities);
        assert!(out.is_empty());
        assert_eq!(entities.pig(pig).unwrap().health(), 100.0);

        entities.pig_mut(pig).unwrap().state.velocity = Vec2::new(0.0, 800.0);
        let out = resolver.process(&[contact(pig_tag(pig), BodyTag::ground(), 500.0)], &mut entities);
        assert!(entities.pig(pig).unwrap().is_dead());
        assert_eq!(out.count(CollisionEventKind::PigFell), 1);
        assert!(out.combo_boosts.is_empty());
    }

    #[test]
    fn test_ice_fall_shatters_and_chains_once() {
        let (mut world, mut entities) = setup();
        let falling = entities.spawn_block(&mut world, Material::Ice, Vec2::new(600.0, 630.0), 40.0, 40.0);
        let neighbour = entities.spawn_block(&mut world, Material::Ice, Vec2::new(640.0, 630.0), 40.0, 40.0);
        let far = entities.spawn_block(&mut world, Material::Ice, Vec2::new(900.0, 630.0), 40.0, 40.0);
        entities.block_mut(falling).unwrap().state.velocity = Vec2::new(0.0, 500.0);
        let resolver = DamageResolver::default();

        let out = resolver.process(&[contact(block_tag(falling), BodyTag::ground(), 100.0)], &mut entities);

        assert!(entities.block(falling).unwrap().is_destroyed());
        assert_eq!(out.events[0].kind, CollisionEventKind::BlockShattered);
        assert_eq!(out.events[0].score_delta, score::BLOCK_SHATTERED);
        assert!(entities.block(neighbour).unwrap().health() < 30.0);
        assert_eq!(entities.block(far).unwrap().health(), 30.0);
    }

    #[test]
    fn test_chain_reaction_does_not_propagate() {
        let (mut world, mut entities) = setup();
        // A row of ice blocks 50px apart; only those within the radius of the origin take damage
        let blocks: Vec<u32> = (0..6)
            .map(|i| {
                let center = Vec2::new(500.0 + 50.0 * i as f32, 630.0);
                entities.spawn_block(&mut world, Material::Ice, center, 40.0, 40.0)
            })
            .collect();
        let resolver = DamageResolver::default();
        let mut out = Resolution::default();

        resolver.chain_reaction(&mut entities, Vec2::new(500.0, 630.0), 10_000.0, 80.0, &mut out);

        assert!(entities.block(blocks[0]).unwrap().is_destroyed());
        assert!(entities.block(blocks[1]).unwrap().is_destroyed());
        for &index in &blocks[2..] {
            assert_eq!(entities.block(index).unwrap().health(), 30.0);
        }
        assert_eq!(out.events.len(), 2);
        assert!(out.events.iter().all(|e| e.score_delta == score::CHAIN_REACTION));
    }

    #[test]
    fn test_unstable_hit_collapses_blocks_above() {
        let (mut world, mut entities) = setup();
        let bird = launched_bird(&mut world, &mut entities, BirdKind::Heavy);
        let base = entities.spawn_block(&mut world, Material::Wood, Vec2::new(600.0, 630.0), 40.0, 40.0);
        // Above the base but outside the wood chain radius
        let top = entities.spawn_block(&mut world, Material::Ice, Vec2::new(600.0, 560.0), 40.0, 40.0);
        let beside = entities.spawn_block(&mut world, Material::Ice, Vec2::new(700.0, 590.0), 40.0, 40.0);
        let resolver = DamageResolver::default();

        let out = resolver.process(&[contact(bird_tag(bird), block_tag(base), 1.0e7)], &mut entities);

        assert_eq!(entities.block(top).unwrap().health(), 10.0);
        assert_eq!(entities.block(beside).unwrap().health(), 30.0);
        assert!(entities.block(base).unwrap().is_destroyed());
        assert!(out
            .events
            .iter()
            .any(|e| e.kind == CollisionEventKind::BlockCollapsed && e.score_delta == score::STRUCTURE_COLLAPSED));
        let total: f32 = out.events.iter().map(|e| e.score_delta).sum();
        assert_eq!(out.score_delta, total);
    }

    #[test]
    fn test_destroyed_block_ignores_hits() {
        let (mut world, mut entities) = setup();
        let bird = launched_bird(&mut world, &mut entities, BirdKind::Balanced);
        let block = entities.spawn_block(&mut world, Material::Wood, Vec2::new(600.0, 630.0), 40.0, 40.0);
        entities.block_mut(block).unwrap().take_damage(1000.0);
        let resolver = DamageResolver::default();

        let out = resolver.process(&[contact(bird_tag(bird), block_tag(block), 5000.0)], &mut entities);
        assert!(out.is_empty());
    }

    #[test]
    fn test_missing_entities_are_ignored() {
        let (_, mut entities) = setup();
        let resolver = DamageResolver::default();
        let out = resolver.process(&[contact(bird_tag(3), pig_tag(7), 5000.0)], &mut entities);
        assert!(out.is_empty());
    }

    #[test]
    fn test_tilted_block_wears_down() {
        let (mut world, mut entities) = setup();
        let block = entities.spawn_block(&mut world, Material::Wood, Vec2::new(600.0, 630.0), 40.0, 40.0);
        entities.block_mut(block).unwrap().state = BodyState {
            angle: 1.3,
            ..BodyState::at(Vec2::new(600.0, 630.0))
        };
        let resolver = DamageResolver::default();

        resolver.process(&[], &mut entities);
        assert_eq!(entities.block(block).unwrap().health(), 60.0);

        let mut destroyed = false;
        for _ in 0..10 {
            let out = resolver.process(&[], &mut entities);
            destroyed |= out.count(CollisionEventKind::BlockCollapsed) == 1;
        }
        assert!(destroyed);
        assert!(entities.block(block).unwrap().is_destroyed());
    }

    #[test]
    fn test_loaded_bird_does_no_damage() {
        let (mut world, mut entities) = setup();
        let bird = entities.spawn_bird(&mut world, BirdKind::Heavy, Vec2::new(150.0, 575.0));
        let pig = entities.spawn_pig(&mut world, PigKind::Normal, Vec2::new(170.0, 575.0));
        let block = entities.spawn_block(&mut world, Material::Ice, Vec2::new(130.0, 575.0), 40.0, 40.0);
        let resolver = DamageResolver::default();

        let contacts = [
            contact(bird_tag(bird), pig_tag(pig), 1.0e6),
            contact(bird_tag(bird), block_tag(block), 1.0e6),
        ];
        let out = resolver.process(&contacts, &mut entities);

        assert!(out.is_empty());
        assert_eq!(entities.pig(pig).unwrap().health(), 100.0);
        assert_eq!(entities.block(block).unwrap().health(), 30.0);

        // Same contacts once the bird is in flight
        entities.bird_mut(bird).unwrap().launch(&mut world, Vec2::new(500.0, 0.0));
        let out = resolver.process(&contacts, &mut entities);
        assert!(!out.is_empty());
    }

    #[test]
    fn test_hard_block_damages_soft_block_more() {
        let (mut world, mut entities) = setup();
        let stone = entities.spawn_block(&mut world, Material::Stone, Vec2::new(600.0, 630.0), 40.0, 40.0);
        let ice = entities.spawn_block(&mut world, Material::Ice, Vec2::new(640.0, 630.0), 40.0, 40.0);
        let resolver = DamageResolver::default();

        let out = resolver.process(&[contact(block_tag(stone), block_tag(ice), 200.0)], &mut entities);

        let stone_loss = 150.0 - entities.block(stone).unwrap().health();
        let ice_loss = 30.0 - entities.block(ice).unwrap().health();
        assert!(stone_loss > 0.0);
        assert!(ice_loss > 10.0 * stone_loss, "ice lost {ice_loss}, stone lost {stone_loss}");
        assert!(out.is_empty());
    }

    #[test]
    fn test_ice_brittle_above_force_threshold() {
        let (mut world, mut entities) = setup();
        let pairs: Vec<(u32, u32)> = [500.0, 700.0]
            .iter()
            .map(|&x| {
                let a = entities.spawn_block(&mut world, Material::Ice, Vec2::new(x, 630.0), 40.0, 40.0);
                let b = entities.spawn_block(&mut world, Material::Ice, Vec2::new(x + 40.0, 630.0), 40.0, 40.0);
                (a, b)
            })
            .collect();
        let resolver = DamageResolver::default();

        // Equal ice masses halve the impulse: forces of 495 and 505
        let contacts = [
            contact(block_tag(pairs[0].0), block_tag(pairs[0].1), 990.0),
            contact(block_tag(pairs[1].0), block_tag(pairs[1].1), 1010.0),
        ];
        resolver.process(&contacts, &mut entities);

        let below = 30.0 - entities.block(pairs[0].0).unwrap().health();
        let above = 30.0 - entities.block(pairs[1].0).unwrap().health();
        assert!(below > 0.0);
        let ratio = above / below;
        assert!(ratio > 2.9 && ratio < 3.2, "brittle ratio {ratio}");
        assert_eq!(entities.block(pairs[0].1).unwrap().health(), entities.block(pairs[0].0).unwrap().health());
    }

    #[test]
    fn test_armored_pig_shrugs_off_direct_hits() {
        let (mut world, mut entities) = setup();
        let bird = launched_bird(&mut world, &mut entities, BirdKind::Balanced);
        let normal = entities.spawn_pig(&mut world, PigKind::Normal, Vec2::new(700.0, 600.0));
        let armored = entities.spawn_pig(&mut world, PigKind::Armored, Vec2::new(900.0, 600.0));
        let resolver = DamageResolver::default();

        let contacts = [
            contact(bird_tag(bird), pig_tag(normal), 5000.0),
            contact(bird_tag(bird), pig_tag(armored), 5000.0),
        ];
        let out = resolver.process(&contacts, &mut entities);

        let normal_loss = 100.0 - entities.pig(normal).unwrap().health();
        let armored_loss = 150.0 - entities.pig(armored).unwrap().health();
        assert!(armored_loss >= BIRD_PIG_FLOOR);
        assert!(armored_loss < normal_loss, "armored lost {armored_loss}, normal lost {normal_loss}");
        assert_eq!(out.count(CollisionEventKind::PigHit), 2);
    }

    #[test]
    fn test_bird_shatters_ice_and_chains_one_level() {
        let (mut world, mut entities) = setup();
        let bird = launched_bird(&mut world, &mut entities, BirdKind::Balanced);
        let target = entities.spawn_block(&mut world, Material::Ice, Vec2::new(600.0, 630.0), 40.0, 40.0);
        let neighbour = entities.spawn_block(&mut world, Material::Ice, Vec2::new(660.0, 630.0), 40.0, 40.0);
        // Out of the first chain's reach but inside the neighbour's
        let outer = entities.spawn_block(&mut world, Material::Ice, Vec2::new(720.0, 630.0), 40.0, 40.0);
        let resolver = DamageResolver::default();

        let out = resolver.process(&[contact(bird_tag(bird), block_tag(target), 1.0e6)], &mut entities);

        assert!(entities.block(target).unwrap().is_destroyed());
        assert!(entities.block(neighbour).unwrap().is_destroyed());
        assert_eq!(entities.block(outer).unwrap().health(), 30.0);

        assert_eq!(out.combo_boosts, vec![ComboBoost::BlockDestroyed]);
        assert_eq!(out.events.len(), 2);
        assert_eq!(out.events[0].kind, CollisionEventKind::BlockShattered);
        assert_eq!(out.events[0].score_delta, score::BLOCK_DESTROYED);
        assert_eq!(out.events[1].score_delta, score::CHAIN_REACTION);
    }

    #[test]
    fn test_chain_terminates_in_packed_ice() {
        let (mut world, mut entities) = setup();
        let bird = launched_bird(&mut world, &mut entities, BirdKind::Light);
        // 5x5 grid 8px apart, all well inside the chain radius
        let mut blocks = Vec::new();
        for row in 0..5 {
            for col in 0..5 {
                let center = Vec2::new(584.0 + 8.0 * col as f32, 584.0 + 8.0 * row as f32);
                blocks.push(entities.spawn_block(&mut world, Material::Ice, center, 40.0, 40.0));
            }
        }
        let target = blocks[12];
        let resolver = DamageResolver::default();

        let out = resolver.process(&[contact(bird_tag(bird), block_tag(target), 1.0e6)], &mut entities);

        assert!(blocks.iter().all(|&b| entities.block(b).unwrap().is_destroyed()));
        assert_eq!(out.count(CollisionEventKind::BlockShattered), blocks.len());
        assert_eq!(
            out.score_delta,
            score::BLOCK_DESTROYED + (blocks.len() - 1) as f32 * score::CHAIN_REACTION
        );
        assert_eq!(out.combo_boosts, vec![ComboBoost::BlockDestroyed]);

        // Nothing left to break on a second pass
        let again = resolver.process(&[contact(bird_tag(bird), block_tag(target), 1.0e6)], &mut entities);
        assert!(again.is_empty());
    }

    #[test]
    fn test_chain_damage_uses_chain_impact_multiplier() {
        let (mut world, mut entities) = setup();
        let block = entities.spawn_block(&mut world, Material::Wood, Vec2::new(640.0, 630.0), 40.0, 40.0);
        let resolver = DamageResolver::default();
        let mut out = Resolution::default();

        // Halfway out: 100 * 0.5 * 0.3 * wood 1.0 * chain 0.8
        resolver.chain_reaction(&mut entities, Vec2::new(600.0, 630.0), 100.0, 80.0, &mut out);

        let health = entities.block(block).unwrap().health();
        assert!((health - 58.0).abs() < 1e-3, "health {health}");
        assert!(out.is_empty());
    }
}
