use rapier2d::prelude::*;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use super::body::presets;
use super::collision::{BodyTag, ContactEvent, ContactQueue};
use super::config::{ContactReporting, PhysicsConfig};
use super::fallback::FallbackDetector;
use super::PhysicsError;
use crate::core::math::to_vector;

/// Handle to identify rigid bodies
pub type RigidBodyHandle = rapier2d::prelude::RigidBodyHandle;

/// Physics world that owns every body and surfaces contacts after each step
pub struct PhysicsWorld {
    config: PhysicsConfig,

    gravity: Vector<Real>,

    integration_parameters: IntegrationParameters,

    physics_pipeline: PhysicsPipeline,

    /// Island manager for sleeping bodies
    island_manager: IslandManager,

    broad_phase: DefaultBroadPhase,

    narrow_phase: NarrowPhase,

    impulse_joint_set: ImpulseJointSet,

    multibody_joint_set: MultibodyJointSet,

    /// CCD solver for fast-moving objects
    ccd_solver: CCDSolver,

    query_pipeline: QueryPipeline,

    rigid_body_set: RigidBodySet,

    collider_set: ColliderSet,

    contact_queue: ContactQueue,

    /// Present only in degraded mode
    fallback: Option<FallbackDetector>,

    /// Side table from body handle to the owning entity
    body_to_entity: HashMap<RigidBodyHandle, BodyTag>,
}

impl PhysicsWorld {
    /// Create a new physics world from a validated configuration
    pub fn new(config: PhysicsConfig) -> Result<Self, PhysicsError> {
        config.validate()?;

        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = config.timestep;
        integration_parameters.length_unit = config.length_unit;

        let fallback = match config.contact_reporting {
            ContactReporting::DistanceFallback => {
                log::warn!("Contact reporting configured for degraded distance checks");
                Some(FallbackDetector::new())
            }
            ContactReporting::ForceEvents if !probe_contact_events(&integration_parameters) => {
                log::error!(
                    "Physics backend did not report contact forces; \
                     falling back to bird-vs-target distance checks (degraded mode)"
                );
                Some(FallbackDetector::new())
            }
            ContactReporting::ForceEvents => None,
        };

        Ok(Self {
            gravity: to_vector(config.gravity),
            config,
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            contact_queue: ContactQueue::new(),
            fallback,
            body_to_entity: HashMap::new(),
        })
    }

    /// Step the simulation by `dt` and return every contact generated during it
    ///
    /// A panic inside the solver (degenerate geometry) is caught and logged;
    /// that step then reports no contacts.
    pub fn step(&mut self, dt: Real) -> Vec<ContactEvent> {
        if dt.is_finite() && dt > 0.0 && dt <= PhysicsConfig::MAX_TIMESTEP {
            self.integration_parameters.dt = dt;
        } else {
            log::warn!("Rejected timestep {dt}, using {}", self.config.timestep);
            self.integration_parameters.dt = self.config.timestep;
        }

        self.contact_queue.clear();
        if let Some(fallback) = self.fallback.as_mut() {
            fallback.record_velocities(&self.rigid_body_set, &self.body_to_entity);
        }

        let result = catch_unwind(AssertUnwindSafe(|| {
            self.physics_pipeline.step(
                &self.gravity,
                &self.integration_parameters,
                &mut self.island_manager,
                &mut self.broad_phase,
                &mut self.narrow_phase,
                &mut self.rigid_body_set,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                &mut self.ccd_solver,
                Some(&mut self.query_pipeline),
                &(),
                &self.contact_queue,
            );
        }));

        if result.is_err() {
            log::error!("Physics step panicked; treating this tick as contact-free");
            self.contact_queue.clear();
            return Vec::new();
        }

        if let Some(fallback) = self.fallback.as_mut() {
            self.contact_queue.clear();
            return fallback.detect(
                &self.rigid_body_set,
                &self.collider_set,
                &self.body_to_entity,
            );
        }

        self.contact_queue
            .drain()
            .into_iter()
            .filter_map(|raw| {
                let first = self.tag_of_collider(raw.collider1)?;
                let second = self.tag_of_collider(raw.collider2)?;
                Some(ContactEvent {
                    first,
                    second,
                    impulse: raw.impulse,
                    normal: raw.normal,
                    penetration: raw.penetration,
                })
            })
            .collect()
    }

    /// Add a body with its collider and register the owning entity
    pub fn add_body(&mut self, body: RigidBody, collider: Collider, tag: BodyTag) -> RigidBodyHandle {
        let handle = self.rigid_body_set.insert(body);
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);
        self.body_to_entity.insert(handle, tag);
        handle
    }

    /// Remove a body and its colliders; removing an unknown body is a no-op
    pub fn remove_body(&mut self, handle: RigidBodyHandle) -> bool {
        self.body_to_entity.remove(&handle);
        let removed = self
            .rigid_body_set
            .remove(
                handle,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true,
            )
            .is_some();

        if !removed {
            log::trace!("Ignoring removal of absent body {:?}", handle);
        }
        removed
    }

    /// Create the ground slab and both side walls for an arena
    pub fn add_boundaries(&mut self, width: Real, height: Real, ground_top: Real) {
        const THICKNESS: Real = 40.0;

        let (body, collider) = presets::ground(width, ground_top, THICKNESS);
        self.add_body(body, collider, BodyTag::ground());

        let (body, collider) = presets::wall(-THICKNESS / 2.0, height, THICKNESS);
        self.add_body(body, collider, BodyTag::wall(0));

        let (body, collider) = presets::wall(width + THICKNESS / 2.0, height, THICKNESS);
        self.add_body(body, collider, BodyTag::wall(1));
    }

    /// Get a reference to a rigid body
    pub fn get_rigid_body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.rigid_body_set.get(handle)
    }

    /// Get a mutable reference to a rigid body
    pub fn get_rigid_body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.rigid_body_set.get_mut(handle)
    }

    /// Get the entity tag associated with a rigid body
    pub fn tag_of(&self, handle: RigidBodyHandle) -> Option<BodyTag> {
        self.body_to_entity.get(&handle).copied()
    }

    fn tag_of_collider(&self, handle: ColliderHandle) -> Option<BodyTag> {
        let parent = self.collider_set.get(handle)?.parent()?;
        self.tag_of(parent)
    }

    pub fn contains(&self, handle: RigidBodyHandle) -> bool {
        self.rigid_body_set.contains(handle)
    }

    /// Whether contacts come from the reduced-fidelity distance detector
    pub fn is_degraded(&self) -> bool {
        self.fallback.is_some()
    }

    /// Get the configured fixed timestep
    pub fn timestep(&self) -> Real {
        self.config.timestep
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }
}

/// Check that the backend reports contact forces by dropping a ball onto a
/// fixed slab in a scratch world
fn probe_contact_events(parameters: &IntegrationParameters) -> bool {
    let mut bodies = RigidBodySet::new();
    let mut colliders = ColliderSet::new();
    let mut islands = IslandManager::new();
    let mut broad_phase = DefaultBroadPhase::new();
    let mut narrow_phase = NarrowPhase::new();
    let mut impulse_joints = ImpulseJointSet::new();
    let mut multibody_joints = MultibodyJointSet::new();
    let mut ccd = CCDSolver::new();
    let mut pipeline = PhysicsPipeline::new();
    let queue = ContactQueue::new();

    let slab = bodies.insert(RigidBodyBuilder::fixed().translation(vector![0.0, 20.0]));
    colliders.insert_with_parent(
        ColliderBuilder::cuboid(50.0, 10.0).active_events(ActiveEvents::CONTACT_FORCE_EVENTS),
        slab,
        &mut bodies,
    );
    let ball = bodies.insert(RigidBodyBuilder::dynamic().translation(vector![0.0, 5.0]));
    colliders.insert_with_parent(
        ColliderBuilder::ball(10.0).active_events(ActiveEvents::CONTACT_FORCE_EVENTS),
        ball,
        &mut bodies,
    );

    let gravity = vector![0.0, 981.0];
    let stepped = catch_unwind(AssertUnwindSafe(|| {
        for _ in 0..4 {
            pipeline.step(
                &gravity,
                parameters,
                &mut islands,
                &mut broad_phase,
                &mut narrow_phase,
                &mut bodies,
                &mut colliders,
                &mut impulse_joints,
                &mut multibody_joints,
                &mut ccd,
                None,
                &(),
                &queue,
            );
            if !queue.is_empty() {
                return true;
            }
        }
        false
    }));

    stepped.unwrap_or(false)
}
