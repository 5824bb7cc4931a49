//! Rigid body descriptions

use rapier3d::na::{Quaternion, UnitQuaternion};
use rapier3d::prelude as rapier;
use serde::{Deserialize, Serialize};

/// Handle to a rigid body in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RigidBodyHandle(pub(crate) rapier::RigidBodyHandle);

/// How a body takes part in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyKind {
    /// Mass 0: never moves
    Fixed,
    #[default]
    Dynamic,
}

/// Continuous collision parameters.
///
/// Small bodies moving fast relative to the timestep would otherwise tunnel
/// through thin wall colliders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CcdParams {
    /// Radius of the sphere swept along the motion path
    pub swept_sphere_radius: f32,
    /// Minimum displacement per step before the sweep kicks in
    pub motion_threshold: f32,
}

impl CcdParams {
    pub fn new(swept_sphere_radius: f32, motion_threshold: f32) -> Self {
        Self {
            swept_sphere_radius,
            motion_threshold,
        }
    }
}

/// Everything needed to insert a body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RigidBodyDesc {
    pub kind: BodyKind,
    pub position: [f32; 3],
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Total mass, spread over the colliders attached at creation.
    /// Zero means the colliders' own densities decide.
    pub mass: f32,
    pub ccd: Option<CcdParams>,
}

impl RigidBodyDesc {
    pub fn fixed() -> Self {
        Self {
            kind: BodyKind::Fixed,
            ..Default::default()
        }
    }

    pub fn dynamic() -> Self {
        Self::default()
    }

    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = [x, y, z];
        self
    }

    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.linear_damping = linear;
        self.angular_damping = angular;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_ccd(mut self, ccd: CcdParams) -> Self {
        self.ccd = Some(ccd);
        self
    }

    pub(crate) fn to_rapier_builder(&self) -> rapier::RigidBodyBuilder {
        let builder = match self.kind {
            BodyKind::Fixed => rapier::RigidBodyBuilder::fixed(),
            BodyKind::Dynamic => rapier::RigidBodyBuilder::dynamic(),
        };
        let [x, y, z] = self.position;
        let builder = builder
            .translation(rapier::Vector::new(x, y, z))
            .linear_damping(self.linear_damping)
            .angular_damping(self.angular_damping);

        match self.ccd {
            // The prediction distance covers the swept sphere plus the motion slack
            Some(ccd) => builder
                .ccd_enabled(true)
                .soft_ccd_prediction(ccd.swept_sphere_radius + ccd.motion_threshold),
            None => builder,
        }
    }
}

/// Build an isometry from a translation and an (x, y, z, w) quaternion
pub(crate) fn isometry(position: [f32; 3], rotation: [f32; 4]) -> rapier::Isometry<f32> {
    let [x, y, z] = position;
    let [qx, qy, qz, qw] = rotation;
    rapier::Isometry::from_parts(
        rapier::Translation::new(x, y, z),
        UnitQuaternion::from_quaternion(Quaternion::new(qw, qx, qy, qz)),
    )
}

/// Quaternion (x, y, z, w) turning `angle` radians about +Y
pub fn yaw_rotation(angle: f32) -> [f32; 4] {
    let (s, c) = (angle * 0.5).sin_cos();
    [0.0, s, 0.0, c]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    #[test]
    fn test_quarter_yaw() {
        let q = yaw_rotation(FRAC_PI_2);
        assert_relative_eq!(q[1], FRAC_PI_4.sin(), epsilon = 1e-6);
        assert_relative_eq!(q[3], FRAC_PI_4.cos(), epsilon = 1e-6);

        let iso = isometry([0.0; 3], q);
        let turned = iso.rotation * rapier::Vector::new(1.0, 0.0, 0.0);
        assert_relative_eq!(turned.z, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_builder() {
        let desc = RigidBodyDesc::dynamic()
            .with_position(1.0, 2.0, 3.0)
            .with_mass(14.0)
            .with_ccd(CcdParams::new(0.6, 0.1));
        assert_eq!(desc.kind, BodyKind::Dynamic);
        assert_eq!(desc.position, [1.0, 2.0, 3.0]);
        assert_eq!(desc.mass, 14.0);
        assert!(desc.ccd.is_some());
        assert_eq!(RigidBodyDesc::fixed().kind, BodyKind::Fixed);
    }
}
