//! Scene errors

use orchard_physics::PhysicsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error(transparent)]
    Physics(#[from] PhysicsError),

    #[error("invalid scene configuration: {0}")]
    Config(String),
}

pub type SceneResult<T> = std::result::Result<T, SceneError>;
