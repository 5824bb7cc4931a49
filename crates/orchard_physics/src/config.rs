//! Physics configuration

use crate::error::{PhysicsError, Result};
use serde::{Deserialize, Serialize};

/// Tuning for [`PhysicsWorld`](crate::world::PhysicsWorld)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// m/s², world axes
    pub gravity: [f32; 3],

    /// Seconds per substep
    pub timestep: f32,

    /// Maximum number of substeps per `step` call
    pub max_substeps: u32,

    pub velocity_iterations: usize,

    /// Let resting bodies sleep. Sleeping bodies stop reporting new contacts.
    pub sleeping_enabled: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.81, 0.0],
            timestep: 1.0 / 60.0,
            max_substeps: 4,
            velocity_iterations: 4,
            sleeping_enabled: true,
        }
    }
}

impl PhysicsConfig {
    pub fn with_gravity(mut self, x: f32, y: f32, z: f32) -> Self {
        self.gravity = [x, y, z];
        self
    }

    pub fn with_timestep(mut self, timestep: f32) -> Self {
        self.timestep = timestep;
        self
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        let invalid = |field, reason: String| Err(PhysicsError::InvalidConfig { field, reason });

        if !(self.timestep > 0.0 && self.timestep.is_finite()) {
            return invalid("timestep", format!("must be positive, got {}", self.timestep));
        }
        if self.velocity_iterations == 0 {
            return invalid("velocity_iterations", "must be at least 1".into());
        }
        if self.max_substeps == 0 {
            return invalid("max_substeps", "must be at least 1".into());
        }
        Ok(())
    }
}
