//! Physics errors

use crate::body::RigidBodyHandle;
use crate::collider::ColliderHandle;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PhysicsError {
    /// The body was never created or has been removed
    #[error("no rigid body {0:?} in this world")]
    BodyNotFound(RigidBodyHandle),

    #[error("no collider {0:?} in this world")]
    ColliderNotFound(ColliderHandle),

    #[error("physics config: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, PhysicsError>;
