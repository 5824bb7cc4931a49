//! Collider shapes and descriptions

use crate::body::isometry;
use crate::material::MaterialTag;
use rapier3d::na::Unit;
use rapier3d::prelude as rapier;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderHandle(pub(crate) rapier::ColliderHandle);

/// Collision geometry in the collider's local frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColliderShape {
    Ball { radius: f32 },
    Cuboid { half_extents: [f32; 3] },
    /// Axis along local +Y
    Cylinder { half_height: f32, radius: f32 },
    /// Infinite plane; solid on the side opposite the normal
    HalfSpace { normal: [f32; 3] },
}

impl ColliderShape {
    pub fn sphere(radius: f32) -> Self {
        Self::Ball { radius }
    }

    pub fn cuboid(hx: f32, hy: f32, hz: f32) -> Self {
        Self::Cuboid { half_extents: [hx, hy, hz] }
    }

    pub fn cylinder(half_height: f32, radius: f32) -> Self {
        Self::Cylinder { half_height, radius }
    }

    /// Upward-facing plane through the collider origin
    pub fn ground_plane() -> Self {
        Self::HalfSpace { normal: [0.0, 1.0, 0.0] }
    }

    /// Enclosed volume, used to spread a body's mass over its colliders.
    /// Half-spaces report zero.
    pub fn volume(&self) -> f32 {
        match *self {
            Self::Ball { radius } => 4.0 / 3.0 * PI * radius.powi(3),
            Self::Cuboid { half_extents: [x, y, z] } => 8.0 * x * y * z,
            Self::Cylinder { half_height, radius } => 2.0 * half_height * PI * radius * radius,
            Self::HalfSpace { .. } => 0.0,
        }
    }

    pub(crate) fn to_rapier(&self) -> rapier::SharedShape {
        match *self {
            Self::Ball { radius } => rapier::SharedShape::ball(radius),
            Self::Cuboid { half_extents: [x, y, z] } => rapier::SharedShape::cuboid(x, y, z),
            Self::Cylinder { half_height, radius } => rapier::SharedShape::cylinder(half_height, radius),
            Self::HalfSpace { normal: [x, y, z] } => {
                rapier::SharedShape::halfspace(Unit::new_normalize(rapier::Vector::new(x, y, z)))
            }
        }
    }
}

/// A collider to insert, optionally under a parent body.
///
/// `friction` and `restitution` only apply when the pair has no entry in the
/// world's contact table; a tagged pair always uses the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColliderDesc {
    pub shape: ColliderShape,
    /// Translation relative to the parent body
    pub offset: [f32; 3],
    /// (x, y, z, w) rotation relative to the parent body
    pub rotation: [f32; 4],
    pub material: Option<MaterialTag>,
    pub friction: f32,
    pub restitution: f32,
    /// Overrides the density-derived mass
    pub mass: Option<f32>,
    /// Report contact begin/end for this collider
    pub collision_events: bool,
}

impl ColliderDesc {
    pub fn new(shape: ColliderShape) -> Self {
        Self {
            shape,
            offset: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
            material: None,
            friction: 0.5,
            restitution: 0.0,
            mass: None,
            collision_events: false,
        }
    }

    pub fn with_offset(mut self, x: f32, y: f32, z: f32) -> Self {
        self.offset = [x, y, z];
        self
    }

    pub fn with_rotation(mut self, rotation: [f32; 4]) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_material(mut self, material: MaterialTag) -> Self {
        self.material = Some(material);
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = Some(mass);
        self
    }

    pub fn with_collision_events(mut self, enabled: bool) -> Self {
        self.collision_events = enabled;
        self
    }

    pub(crate) fn to_rapier_builder(&self) -> rapier::ColliderBuilder {
        let mut builder = rapier::ColliderBuilder::new(self.shape.to_rapier())
            .position(isometry(self.offset, self.rotation))
            .friction(self.friction)
            .restitution(self.restitution);

        if let Some(mass) = self.mass {
            builder = builder.mass(mass);
        }
        if self.collision_events {
            builder = builder.active_events(rapier::ActiveEvents::COLLISION_EVENTS);
        }
        // Tagged colliders get their contacts rewritten from the table
        if self.material.is_some() {
            builder = builder.active_hooks(rapier::ActiveHooks::MODIFY_SOLVER_CONTACTS);
        }

        builder
    }
}
