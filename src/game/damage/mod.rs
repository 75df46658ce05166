// Collision damage and scoring
//
// The resolver turns one step's contacts into health changes, scored events
// and combo boosts. Scores here are raw; the simulation applies the combo
// multiplier once per tick.

pub mod force;
pub mod resolver;
pub mod score;

pub use force::{ImpactKind, MAX_DAMAGE};
pub use resolver::{DamageResolver, DamageSource};

use glam::Vec2;

/// Scored gameplay event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionEventKind {
    PigHit,
    PigEliminated,
    PigCrushed,
    PigFell,
    BlockHit,
    BlockDestroyed,
    BlockShattered,
    BlockCollapsed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    pub kind: CollisionEventKind,
    pub position: Vec2,
    pub score_delta: f32,
}

/// Reason the combo multiplier grows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComboBoost {
    PigEliminated,
    PigCrushed,
    BlockDestroyed,
}

impl ComboBoost {
    pub fn increment(&self) -> f32 {
        match self {
            Self::PigEliminated => 0.2,
            Self::PigCrushed => 0.3,
            Self::BlockDestroyed => 0.1,
        }
    }
}

/// Everything one batch of contacts produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Raw score, always the sum of the events' deltas
    pub score_delta: f32,
    pub events: Vec<CollisionEvent>,
    pub combo_boosts: Vec<ComboBoost>,
}

impl Resolution {
    pub fn record(&mut self, kind: CollisionEventKind, position: Vec2, score_delta: f32) {
        self.score_delta += score_delta;
        self.events.push(CollisionEvent {
            kind,
            position,
            score_delta,
        });
    }

    pub fn boost(&mut self, boost: ComboBoost) {
        self.combo_boosts.push(boost);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn count(&self, kind: CollisionEventKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }
}
