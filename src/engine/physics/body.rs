use super::collision::BodyCategory;
use rapier2d::prelude::*;

pub use rapier2d::prelude::{ColliderHandle, RigidBodyHandle};

/// Builder for creating rigid bodies with common configurations
pub struct BodyBuilder {
    body_type: RigidBodyType,
    position: Isometry<Real>,
    linvel: Vector<Real>,
    can_sleep: bool,
    ccd: bool,
    linear_damping: Real,
    angular_damping: Real,
}

impl BodyBuilder {
    /// Create a new dynamic body (affected by forces and collisions)
    pub fn new_dynamic() -> Self {
        Self {
            body_type: RigidBodyType::Dynamic,
            position: Isometry::identity(),
            linvel: Vector::zeros(),
            can_sleep: true,
            ccd: false,
            linear_damping: 0.0,
            angular_damping: 0.0,
        }
    }

    /// Create a new kinematic position-based body (not affected by forces)
    pub fn new_kinematic_position_based() -> Self {
        Self {
            body_type: RigidBodyType::KinematicPositionBased,
            can_sleep: false,
            ..Self::new_dynamic()
        }
    }

    /// Create a new fixed (static) body (completely immovable)
    pub fn new_fixed() -> Self {
        Self {
            body_type: RigidBodyType::Fixed,
            can_sleep: false,
            ..Self::new_dynamic()
        }
    }

    /// Set the initial position of the body
    pub fn position(mut self, x: Real, y: Real) -> Self {
        self.position = Isometry::translation(x, y);
        self
    }

    /// Set the initial linear velocity
    pub fn linvel(mut self, x: Real, y: Real) -> Self {
        self.linvel = vector![x, y];
        self
    }

    /// Set whether the body can sleep when inactive
    pub fn can_sleep(mut self, can_sleep: bool) -> Self {
        self.can_sleep = can_sleep;
        self
    }

    /// Enable continuous collision detection (fast projectiles)
    pub fn ccd(mut self, enabled: bool) -> Self {
        self.ccd = enabled;
        self
    }

    /// Air drag for dynamic bodies
    pub fn damping(mut self, linear: Real, angular: Real) -> Self {
        self.linear_damping = linear;
        self.angular_damping = angular;
        self
    }

    /// Build the rigid body
    pub fn build(self) -> RigidBody {
        let mut body = RigidBodyBuilder::new(self.body_type)
            .position(self.position)
            .linvel(self.linvel)
            .can_sleep(self.can_sleep)
            .ccd_enabled(self.ccd)
            .build();

        if self.body_type == RigidBodyType::Dynamic {
            body.set_linear_damping(self.linear_damping);
            body.set_angular_damping(self.angular_damping);
        }

        body
    }
}

/// Builder for creating colliders with common configurations
pub struct ColliderBuilder2D {
    shape: SharedShape,
    category: BodyCategory,
    friction: Real,
    restitution: Real,
    mass: Option<Real>,
}

impl ColliderBuilder2D {
    /// Create a box-shaped collider
    pub fn box_shape(half_width: Real, half_height: Real) -> Self {
        Self {
            shape: SharedShape::cuboid(half_width, half_height),
            category: BodyCategory::Block,
            friction: 0.5,
            restitution: 0.0,
            mass: None,
        }
    }

    /// Create a circle-shaped collider
    pub fn circle(radius: Real) -> Self {
        Self {
            shape: SharedShape::ball(radius),
            category: BodyCategory::Bird,
            friction: 0.5,
            restitution: 0.0,
            mass: None,
        }
    }

    /// Set the collision category used for filtering
    pub fn category(mut self, category: BodyCategory) -> Self {
        self.category = category;
        self
    }

    /// Set friction coefficient (0.0 = no friction, 1.0 = high friction)
    pub fn friction(mut self, friction: Real) -> Self {
        self.friction = friction;
        self
    }

    /// Set restitution/bounciness (0.0 = no bounce, 1.0 = perfect bounce)
    pub fn restitution(mut self, restitution: Real) -> Self {
        self.restitution = restitution;
        self
    }

    /// Set mass directly; the body's mass becomes exactly this value
    pub fn mass(mut self, mass: Real) -> Self {
        self.mass = Some(mass);
        self
    }

    /// Build the collider
    pub fn build(self) -> Collider {
        let mut builder = rapier2d::prelude::ColliderBuilder::new(self.shape)
            .collision_groups(self.category.to_interaction_groups())
            .friction(self.friction)
            .restitution(self.restitution)
            .active_events(ActiveEvents::CONTACT_FORCE_EVENTS)
            .contact_force_event_threshold(0.0);

        if let Some(mass) = self.mass {
            builder = builder.mass(mass);
        }

        builder.build()
    }
}

/// Body and collider configurations for each game object
pub mod presets {
    use super::*;

    /// Bird resting in the slingshot: kinematic until released
    pub fn loaded_bird_body(x: Real, y: Real) -> RigidBody {
        BodyBuilder::new_kinematic_position_based()
            .position(x, y)
            .ccd(true)
            .build()
    }

    pub fn bird_collider(radius: Real, mass: Real) -> Collider {
        ColliderBuilder2D::circle(radius)
            .category(BodyCategory::Bird)
            .friction(0.5)
            .restitution(0.4)
            .mass(mass)
            .build()
    }

    pub fn pig_body(x: Real, y: Real, drag: Real, angular_drag: Real) -> RigidBody {
        BodyBuilder::new_dynamic()
            .position(x, y)
            .damping(drag, angular_drag)
            .build()
    }

    pub fn pig_collider(radius: Real, mass: Real) -> Collider {
        ColliderBuilder2D::circle(radius)
            .category(BodyCategory::Pig)
            .friction(0.5)
            .restitution(0.3)
            .mass(mass)
            .build()
    }

    pub fn block_body(x: Real, y: Real, drag: Real, angular_drag: Real) -> RigidBody {
        BodyBuilder::new_dynamic()
            .position(x, y)
            .damping(drag, angular_drag)
            .build()
    }

    pub fn block_collider(width: Real, height: Real, mass: Real, restitution: Real) -> Collider {
        ColliderBuilder2D::box_shape(width / 2.0, height / 2.0)
            .category(BodyCategory::Block)
            .friction(0.5)
            .restitution(restitution)
            .mass(mass)
            .build()
    }

    /// Static slab whose top surface sits at `top_y`
    pub fn ground(width: Real, top_y: Real, thickness: Real) -> (RigidBody, Collider) {
        let body = BodyBuilder::new_fixed()
            .position(width / 2.0, top_y + thickness / 2.0)
            .build();
        let collider = ColliderBuilder2D::box_shape(width / 2.0, thickness / 2.0)
            .category(BodyCategory::Ground)
            .friction(1.0)
            .restitution(0.6)
            .build();
        (body, collider)
    }

    /// Static wall centered on `x`
    pub fn wall(x: Real, height: Real, thickness: Real) -> (RigidBody, Collider) {
        let body = BodyBuilder::new_fixed().position(x, height / 2.0).build();
        let collider = ColliderBuilder2D::box_shape(thickness / 2.0, height / 2.0)
            .category(BodyCategory::Wall)
            .friction(0.5)
            .restitution(0.6)
            .build();
        (body, collider)
    }
}
