//! Scene configuration
//!
//! Every tunable of the scene lives here with its default value. The
//! runtime deserializes this from TOML; tests build it in code.

use crate::error::{SceneError, SceneResult};
use orchard_physics::{CcdParams, ContactMaterial, ContactMaterialTable, MaterialTag, PhysicsConfig};
use serde::{Deserialize, Serialize};

/// Complete scene configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub physics: PhysicsConfig,
    pub ground: GroundConfig,
    pub materials: Vec<MaterialRule>,
    pub assets: AssetNames,
    pub spawn: SpawnConfig,
    pub container: ContainerConfig,
    pub rules: RulesConfig,
    pub delivery: DeliveryConfig,
    pub interaction: InteractionConfig,
    pub camera: CameraConfig,
    pub lighting: LightingConfig,
    /// Viewport size in pixels
    pub viewport: [f32; 2],
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig {
                sleeping_enabled: false,
                ..PhysicsConfig::default()
            },
            ground: GroundConfig::default(),
            materials: MaterialRule::defaults(),
            assets: AssetNames::default(),
            spawn: SpawnConfig::default(),
            container: ContainerConfig::default(),
            rules: RulesConfig::default(),
            delivery: DeliveryConfig::default(),
            interaction: InteractionConfig::default(),
            camera: CameraConfig::default(),
            lighting: LightingConfig::default(),
            viewport: [1280.0, 720.0],
        }
    }
}

impl SceneConfig {
    /// Check values that would break the simulation or geometry
    pub fn validate(&self) -> SceneResult<()> {
        self.physics.validate()?;

        if self.spawn.interval_secs <= 0.0 {
            return Err(SceneError::Config("spawn interval must be positive".into()));
        }
        if self.container.wall_segments < 3 {
            return Err(SceneError::Config("container needs at least 3 wall segments".into()));
        }
        if self.container.scale <= 0.0 || self.spawn.scale <= 0.0 {
            return Err(SceneError::Config("prototype scales must be positive".into()));
        }
        if self.rules.threshold == 0 {
            return Err(SceneError::Config("delivery threshold must be at least 1".into()));
        }
        if self.viewport[0] <= 0.0 || self.viewport[1] <= 0.0 {
            return Err(SceneError::Config("viewport must have a positive size".into()));
        }
        Ok(())
    }

    /// Contact table built from `materials`
    pub fn contact_table(&self) -> ContactMaterialTable {
        let mut table = ContactMaterialTable::new();
        for rule in &self.materials {
            table.insert(rule.first, rule.second, ContactMaterial::new(rule.friction, rule.restitution));
        }
        table
    }
}

/// Static ground plane
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    pub height: f32,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self { height: -5.0 }
    }
}

/// One row of the contact table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialRule {
    pub first: MaterialTag,
    pub second: MaterialTag,
    pub friction: f32,
    pub restitution: f32,
}

impl MaterialRule {
    fn defaults() -> Vec<Self> {
        let rule = |first, second, friction, restitution| Self {
            first,
            second,
            friction,
            restitution,
        };
        vec![
            rule(MaterialTag::Ground, MaterialTag::Object, 0.4, 0.2),
            rule(MaterialTag::Object, MaterialTag::Container, 0.3, 0.2),
            rule(MaterialTag::Container, MaterialTag::Ground, 0.1, 0.1),
        ]
    }
}

/// Prototype identifiers handed to the asset gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetNames {
    pub object: String,
    pub container: String,
}

impl Default for AssetNames {
    fn default() -> Self {
        Self {
            object: "apple.glb".into(),
            container: "cesto.glb".into(),
        }
    }
}

/// Spawned objects
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub interval_secs: f32,
    /// Visual scale applied to the prototype
    pub scale: f32,
    /// Horizontal spread; x is drawn from [-spread/2, spread/2)
    pub spread: f32,
    pub height: f32,
    pub depth: f32,
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub radius: f32,
    pub ccd: CcdParams,
    /// Seed for spawn offsets; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5.0,
            scale: 0.2,
            spread: 10.0,
            height: 10.0,
            depth: 2.0,
            mass: 14.0,
            linear_damping: 0.3,
            angular_damping: 0.1,
            radius: 0.6,
            ccd: CcdParams::new(0.6, 0.1),
            seed: None,
        }
    }
}

/// The basket body built around its prototype
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    pub scale: f32,
    /// Wall thickness before scaling
    pub wall_thickness: f32,
    /// Floor thickness before scaling
    pub floor_thickness: f32,
    pub wall_segments: u32,
    /// Wall half height is the measured height divided by this
    pub wall_height_divisor: f32,
    pub position: [f32; 3],
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub ccd: CcdParams,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            scale: 4.0,
            wall_thickness: 0.4,
            floor_thickness: 0.4,
            wall_segments: 16,
            wall_height_divisor: 2.1,
            position: [0.0, -2.5, -16.0],
            mass: 50.0,
            linear_damping: 0.5,
            angular_damping: 0.5,
            ccd: CcdParams::new(0.6, 0.1),
        }
    }
}

/// Containment rule
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Added to the safe horizontal radius
    pub tolerance: f32,
    /// Contained count that arms delivery
    pub threshold: u32,
    pub message: String,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.5,
            threshold: 3,
            message: "Carry the basket to the sun".into(),
        }
    }
}

/// Delivery to the sun
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    pub target: [f32; 3],
    /// Delivery fires strictly below this distance
    pub proximity: f32,
    pub intensity_step: f32,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            target: [0.0, -4.0, -50.0],
            proximity: 1.5,
            intensity_step: 1.0,
        }
    }
}

/// Drag and keyboard nudges
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub drag_strength: f32,
    pub container_drag_multiplier: f32,
    pub nudge_step: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            drag_strength: 500.0,
            container_drag_multiplier: 2.0,
            nudge_step: 0.2,
        }
    }
}

/// Perspective camera
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub direction: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 74.0,
            position: [0.0, 2.0, 10.0],
            direction: [0.0, 0.0, -1.0],
        }
    }
}

/// Sun light and sun material
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub light_intensity: f32,
    pub emissive_intensity: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            light_intensity: 1.0,
            emissive_intensity: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = SceneConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.contact_table().len(), 3);
        assert!(!config.physics.sleeping_enabled);
    }

    #[test]
    fn test_bad_values_rejected() {
        let mut config = SceneConfig::default();
        config.container.wall_segments = 2;
        assert!(matches!(config.validate(), Err(SceneError::Config(_))));

        let mut config = SceneConfig::default();
        config.physics.timestep = 0.0;
        assert!(matches!(config.validate(), Err(SceneError::Physics(_))));
    }
}
