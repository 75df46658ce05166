// Degraded-mode contact detection
//
// Used when the backend cannot report solver contact forces. Only projectile
// hits are detected (bird vs pig, bird vs block); the impulse is estimated from
// the pair's reduced mass and relative speed going into the step, and each
// touching pair is reported once until it separates.

use rapier2d::parry::query;
use rapier2d::prelude::*;
use std::collections::{HashMap, HashSet};

use super::collision::{BodyCategory, BodyTag, ContactEvent};
use crate::core::math::to_vec2;

/// Gap (pixels) under which a bird and a target count as touching; the solver
/// separates bodies before the check runs
const CONTACT_MARGIN: Real = 4.0;

#[derive(Debug, Default)]
pub(crate) struct FallbackDetector {
    touching: HashSet<(RigidBodyHandle, RigidBodyHandle)>,
    /// Velocities captured before the solver ran
    pre_step: HashMap<RigidBodyHandle, Vector<Real>>,
}

impl FallbackDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember every tagged body's velocity ahead of a step
    pub fn record_velocities(&mut self, bodies: &RigidBodySet, tags: &HashMap<RigidBodyHandle, BodyTag>) {
        self.pre_step.clear();
        for handle in tags.keys() {
            if let Some(body) = bodies.get(*handle) {
                self.pre_step.insert(*handle, *body.linvel());
            }
        }
    }

    fn velocity_of(&self, handle: RigidBodyHandle, body: &RigidBody) -> Vector<Real> {
        self.pre_step.get(&handle).copied().unwrap_or(*body.linvel())
    }

    pub fn detect(
        &mut self,
        bodies: &RigidBodySet,
        colliders: &ColliderSet,
        tags: &HashMap<RigidBodyHandle, BodyTag>,
    ) -> Vec<ContactEvent> {
        let mut birds: Vec<(RigidBodyHandle, BodyTag)> = Vec::new();
        let mut targets: Vec<(RigidBodyHandle, BodyTag)> = Vec::new();

        for (&handle, &tag) in tags {
            match tag.category {
                BodyCategory::Bird => birds.push((handle, tag)),
                BodyCategory::Pig | BodyCategory::Block => targets.push((handle, tag)),
                _ => {}
            }
        }

        // Contacts are reported in a stable order regardless of map iteration
        birds.sort_by_key(|(_, tag)| (tag.category, tag.index));
        targets.sort_by_key(|(_, tag)| (tag.category, tag.index));

        let mut touching = HashSet::new();
        let mut contacts = Vec::new();

        for &(bird_handle, bird_tag) in &birds {
            let Some(bird) = bodies.get(bird_handle) else {
                continue;
            };
            if !bird.is_dynamic() {
                continue;
            }
            let Some(bird_collider) = bird.colliders().first().and_then(|h| colliders.get(*h))
            else {
                continue;
            };

            for &(target_handle, target_tag) in &targets {
                let Some(target) = bodies.get(target_handle) else {
                    continue;
                };
                let Some(target_collider) =
                    target.colliders().first().and_then(|h| colliders.get(*h))
                else {
                    continue;
                };

                let hit = query::contact(
                    bird_collider.position(),
                    bird_collider.shape(),
                    target_collider.position(),
                    target_collider.shape(),
                    CONTACT_MARGIN,
                );

                let Ok(Some(contact)) = hit else {
                    continue;
                };

                let key = (bird_handle, target_handle);
                touching.insert(key);
                if self.touching.contains(&key) {
                    continue;
                }

                let m1 = bird.mass();
                let m2 = target.mass();
                let reduced_mass = if m1 + m2 > 0.0 { m1 * m2 / (m1 + m2) } else { 0.0 };
                let relative_speed = (self.velocity_of(bird_handle, bird)
                    - self.velocity_of(target_handle, target))
                .norm();

                contacts.push(ContactEvent {
                    first: bird_tag,
                    second: target_tag,
                    impulse: reduced_mass * relative_speed,
                    normal: to_vec2(&contact.normal1),
                    penetration: (-contact.dist).max(0.0),
                });
            }
        }

        self.touching = touching;
        contacts
    }
}
