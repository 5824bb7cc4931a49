//! Rigid body simulation for the orchard scene, on top of rapier3d.
//!
//! [`PhysicsWorld`] owns the rapier sets and steps them at a fixed rate.
//! Bodies are described with [`RigidBodyDesc`] and carry one or more
//! [`ColliderDesc`]s; a body with several colliders moves as one rigid
//! compound. Colliders tagged with a [`MaterialTag`] take friction and
//! restitution from the world's [`ContactMaterialTable`] instead of their own.
//!
//! Contact starts and ends are handed to a [`PhysicsEventHandler`] inside
//! [`PhysicsWorld::step_with_handler`], after the substep that produced them
//! and before the call returns:
//!
//! ```ignore
//! use orchard_physics::prelude::*;
//!
//! let mut physics = PhysicsWorld::new(PhysicsConfig::default());
//! let (apple, _) = physics.create_body_with_colliders(
//!     RigidBodyDesc::dynamic().with_position(0.0, 10.0, 0.0).with_mass(14.0),
//!     vec![ColliderDesc::new(ColliderShape::sphere(0.6))
//!         .with_material(MaterialTag::Object)
//!         .with_collision_events(true)],
//! );
//!
//! let mut collector = EventCollector::new();
//! physics.step_with_handler(1.0 / 60.0, &mut collector);
//! let touched: Vec<_> = collector.started().filter_map(|e| e.partner_of(apple)).collect();
//! ```

pub mod body;
pub mod collider;
pub mod config;
pub mod error;
pub mod events;
pub mod material;
pub mod world;

pub mod prelude {
    pub use crate::body::{BodyKind, CcdParams, RigidBodyDesc, RigidBodyHandle};
    pub use crate::collider::{ColliderDesc, ColliderHandle, ColliderShape};
    pub use crate::config::PhysicsConfig;
    pub use crate::error::{PhysicsError, Result};
    pub use crate::events::{CollisionEvent, ContactInfo, ContactPhase, EventCollector, PhysicsEventHandler};
    pub use crate::material::{ContactMaterial, ContactMaterialTable, MaterialTag};
    pub use crate::world::PhysicsWorld;
}

pub use prelude::*;
