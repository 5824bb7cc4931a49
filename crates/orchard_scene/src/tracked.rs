//! Body/visual pairs and the role each body plays

use crate::proxy::ProxyId;
use orchard_physics::RigidBodyHandle;
use serde::{Deserialize, Serialize};

/// What a tracked body is, with its per-role state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyRole {
    /// A loose spawned object
    Object { in_basket: bool },
    /// The single container
    Container { contained_count: u32 },
}

impl BodyRole {
    pub fn object() -> Self {
        Self::Object { in_basket: false }
    }

    pub fn container() -> Self {
        Self::Container { contained_count: 0 }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Self::Container { .. })
    }
}

/// A rigid body and its visual proxy, created and destroyed together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedBody {
    pub body: RigidBodyHandle,
    pub visual: ProxyId,
    pub role: BodyRole,
}

impl TrackedBody {
    pub fn new(body: RigidBodyHandle, visual: ProxyId, role: BodyRole) -> Self {
        Self { body, visual, role }
    }

    /// Whether this object has been counted into the container
    pub fn in_basket(&self) -> bool {
        matches!(self.role, BodyRole::Object { in_basket: true })
    }

    /// Objects counted so far; zero for objects
    pub fn contained_count(&self) -> u32 {
        match self.role {
            BodyRole::Container { contained_count } => contained_count,
            BodyRole::Object { .. } => 0,
        }
    }
}
