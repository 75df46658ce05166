use glam::Vec2;
use rapier2d::prelude::*;
use std::sync::{Arc, Mutex};

use crate::core::math::to_vec2;

/// Collision categories for filtering what objects can collide with each other
///
/// The discriminant order doubles as the canonical ordering of a contact pair:
/// rules are written for (Bird, Pig), (Bird, Block), (Pig, Block) and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BodyCategory {
    /// Launched projectiles
    Bird = 0b0000_0001,

    /// Targets that must be eliminated
    Pig = 0b0000_0010,

    /// Destructible structure pieces
    Block = 0b0000_0100,

    /// Static ground segment
    Ground = 0b0000_1000,

    /// Static arena side walls
    Wall = 0b0001_0000,
}

impl BodyCategory {
    /// Convert to rapier2d's InteractionGroups
    pub fn to_interaction_groups(self) -> InteractionGroups {
        let memberships = Group::from_bits_truncate(self as u32);

        let filter = match self {
            // Birds never collide with each other
            BodyCategory::Bird => Group::from_bits_truncate(
                BodyCategory::Pig as u32
                    | BodyCategory::Block as u32
                    | BodyCategory::Ground as u32
                    | BodyCategory::Wall as u32,
            ),

            BodyCategory::Pig | BodyCategory::Block => Group::from_bits_truncate(
                BodyCategory::Bird as u32
                    | BodyCategory::Pig as u32
                    | BodyCategory::Block as u32
                    | BodyCategory::Ground as u32
                    | BodyCategory::Wall as u32,
            ),

            // Static geometry only needs to see dynamic bodies
            BodyCategory::Ground | BodyCategory::Wall => Group::from_bits_truncate(
                BodyCategory::Bird as u32 | BodyCategory::Pig as u32 | BodyCategory::Block as u32,
            ),
        };

        InteractionGroups::new(memberships, filter)
    }

    /// Whether bodies of this category are simulated (not static arena geometry)
    pub fn is_dynamic(self) -> bool {
        matches!(self, Self::Bird | Self::Pig | Self::Block)
    }
}

/// Opaque identity carried by every body: its category plus an index into the
/// matching entity table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyTag {
    pub category: BodyCategory,
    pub index: u32,
}

impl BodyTag {
    pub fn new(category: BodyCategory, index: u32) -> Self {
        Self { category, index }
    }

    /// Tag for static arena geometry
    pub fn ground() -> Self {
        Self::new(BodyCategory::Ground, 0)
    }

    pub fn wall(index: u32) -> Self {
        Self::new(BodyCategory::Wall, index)
    }
}

/// A single contact between two tagged bodies, materialized after a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactEvent {
    pub first: BodyTag,
    pub second: BodyTag,
    /// Total impulse magnitude applied by the solver during the step
    pub impulse: f32,
    /// Contact normal pointing from `first` towards `second`
    pub normal: Vec2,
    /// Deepest penetration depth of the contact (>= 0)
    pub penetration: f32,
}

impl ContactEvent {
    /// Same contact seen from the other body
    pub fn swapped(self) -> Self {
        Self {
            first: self.second,
            second: self.first,
            impulse: self.impulse,
            normal: -self.normal,
            penetration: self.penetration,
        }
    }

    /// Reorder so that `first.category <= second.category`
    pub fn canonical(self) -> Self {
        if self.first.category > self.second.category {
            self.swapped()
        } else {
            self
        }
    }

    /// Category pair after canonical ordering
    pub fn categories(&self) -> (BodyCategory, BodyCategory) {
        let c = self.canonical();
        (c.first.category, c.second.category)
    }
}

/// Contact data recorded by the backend before entity tags are resolved
#[derive(Debug, Clone, Copy)]
pub(crate) struct RawContact {
    pub collider1: ColliderHandle,
    pub collider2: ColliderHandle,
    pub impulse: f32,
    pub normal: Vec2,
    pub penetration: f32,
}

/// Queue for storing contact reports during a physics step
pub struct ContactQueue {
    contacts: Arc<Mutex<Vec<RawContact>>>,
}

impl ContactQueue {
    pub fn new() -> Self {
        Self {
            contacts: Arc::new(Mutex::new(Vec::with_capacity(64))),
        }
    }

    /// Clear all contacts (call at start of physics step)
    pub fn clear(&self) {
        if let Ok(mut contacts) = self.contacts.lock() {
            contacts.clear();
        }
    }

    /// Take all contacts recorded since the last clear
    pub(crate) fn drain(&self) -> Vec<RawContact> {
        self.contacts
            .lock()
            .map(|mut contacts| std::mem::take(&mut *contacts))
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.contacts.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&self, contact: RawContact) {
        if let Ok(mut contacts) = self.contacts.lock() {
            contacts.push(contact);
        }
    }
}

impl Default for ContactQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for ContactQueue {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _event: rapier2d::prelude::CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        // Start/stop events carry no impulse; damage is driven by force events
    }

    fn handle_contact_force_event(
        &self,
        dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        contact_pair: &ContactPair,
        total_force_magnitude: Real,
    ) {
        let mut normal = Vector::zeros();
        let mut penetration: Real = 0.0;
        let mut found = false;

        for manifold in &contact_pair.manifolds {
            for point in &manifold.points {
                let depth = (-point.dist).max(0.0);
                if !found || depth > penetration {
                    penetration = depth;
                    normal = manifold.data.normal;
                    found = true;
                }
            }
        }

        if !found {
            return;
        }

        self.push(RawContact {
            collider1: contact_pair.collider1,
            collider2: contact_pair.collider2,
            impulse: total_force_magnitude * dt,
            normal: to_vec2(&normal),
            penetration,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_bits_unique() {
        let categories = [
            BodyCategory::Bird,
            BodyCategory::Pig,
            BodyCategory::Block,
            BodyCategory::Ground,
            BodyCategory::Wall,
        ];

        for (i, a) in categories.iter().enumerate() {
            for (j, b) in categories.iter().enumerate() {
                if i != j {
                    assert_ne!(*a as u32, *b as u32, "Categories must have unique bits");
                }
            }
        }
    }

    #[test]
    fn test_birds_dont_collide_with_birds() {
        let groups = BodyCategory::Bird.to_interaction_groups();
        assert!(!groups.filter.contains(groups.memberships));
    }

    #[test]
    fn test_blocks_collide_with_blocks_and_ground() {
        let groups = BodyCategory::Block.to_interaction_groups();
        assert!(groups.filter.contains(groups.memberships));
        assert!(groups
            .filter
            .contains(Group::from_bits_truncate(BodyCategory::Ground as u32)));
    }

    #[test]
    fn test_canonical_ordering_flips_normal() {
        let contact = ContactEvent {
            first: BodyTag::new(BodyCategory::Block, 3),
            second: BodyTag::new(BodyCategory::Bird, 0),
            impulse: 10.0,
            normal: Vec2::new(0.0, 1.0),
            penetration: 0.5,
        };

        let canonical = contact.canonical();
        assert_eq!(canonical.first.category, BodyCategory::Bird);
        assert_eq!(canonical.second.index, 3);
        assert_eq!(canonical.normal, Vec2::new(0.0, -1.0));
        assert_eq!(
            contact.categories(),
            (BodyCategory::Bird, BodyCategory::Block)
        );
    }

    #[test]
    fn test_queue_drain_empties() {
        let queue = ContactQueue::new();
        assert!(queue.is_empty());
        queue.push(RawContact {
            collider1: ColliderHandle::invalid(),
            collider2: ColliderHandle::invalid(),
            impulse: 1.0,
            normal: Vec2::Y,
            penetration: 0.0,
        });
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.drain().len(), 1);
        assert!(queue.is_empty());
    }
}
