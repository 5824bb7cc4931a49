//! Contact materials defining how two surfaces interact

use rapier3d::prelude as rapier;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Surface tag attached to colliders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialTag {
    /// Static ground plane
    Ground,
    /// Loose spawned objects
    Object,
    /// The container walls and floor
    Container,
}

/// Friction and restitution for a pair of surfaces
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactMaterial {
    /// Friction coefficient (0 = frictionless, 1 = high friction)
    pub friction: f32,
    /// Restitution/bounciness (0 = no bounce, 1 = perfect bounce)
    pub restitution: f32,
}

impl ContactMaterial {
    /// Create a new contact material
    pub fn new(friction: f32, restitution: f32) -> Self {
        Self {
            friction: friction.clamp(0.0, 1.0),
            restitution: restitution.clamp(0.0, 1.0),
        }
    }
}

/// Contact rules keyed by unordered pairs of material tags
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactMaterialTable {
    rules: HashMap<(MaterialTag, MaterialTag), ContactMaterial>,
}

impl ContactMaterialTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// The scene's rules: ground/object, object/container, container/ground
    pub fn orchard() -> Self {
        let mut table = Self::new();
        table.insert(MaterialTag::Ground, MaterialTag::Object, ContactMaterial::new(0.4, 0.2));
        table.insert(MaterialTag::Object, MaterialTag::Container, ContactMaterial::new(0.3, 0.2));
        table.insert(MaterialTag::Container, MaterialTag::Ground, ContactMaterial::new(0.1, 0.1));
        table
    }

    /// Add or replace the rule for a pair (order does not matter)
    pub fn insert(&mut self, a: MaterialTag, b: MaterialTag, material: ContactMaterial) {
        self.rules.insert(Self::key(a, b), material);
    }

    /// Look up the rule for a pair (order does not matter)
    pub fn get(&self, a: MaterialTag, b: MaterialTag) -> Option<&ContactMaterial> {
        self.rules.get(&Self::key(a, b))
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the table has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn key(a: MaterialTag, b: MaterialTag) -> (MaterialTag, MaterialTag) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

/// Physics hooks applying the contact table to solver contacts
pub(crate) struct ContactMaterialHooks<'a> {
    pub(crate) table: &'a ContactMaterialTable,
    pub(crate) tags: &'a HashMap<rapier::ColliderHandle, MaterialTag>,
}

impl<'a> rapier::PhysicsHooks for ContactMaterialHooks<'a> {
    fn modify_solver_contacts(&self, context: &mut rapier::ContactModificationContext) {
        let (Some(a), Some(b)) = (
            self.tags.get(&context.collider1),
            self.tags.get(&context.collider2),
        ) else {
            return;
        };

        if let Some(material) = self.table.get(*a, *b) {
            for contact in context.solver_contacts.iter_mut() {
                contact.friction = material.friction;
                contact.restitution = material.restitution;
            }
        }
    }
}
