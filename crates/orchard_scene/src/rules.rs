//! Collision rule engine
//!
//! Containment is judged from body centers rather than exact contact
//! geometry: an object touching the container counts once it sits inside the
//! wall ring horizontally and inside the container's height band.

use crate::config::RulesConfig;
use crate::container::{ActiveContainer, ContainerGeometry};
use crate::message::MessageSink;
use crate::tracked::{BodyRole, TrackedBody};
use glam::Vec3;
use orchard_physics::{CollisionEvent, PhysicsEventHandler, PhysicsWorld};

/// Whether an object center lies inside the container
pub fn is_contained(object: Vec3, container: Vec3, geometry: &ContainerGeometry, tolerance: f32) -> bool {
    let safe = geometry.safe_radius(tolerance);
    let horizontal = (object.x - container.x).abs() < safe && (object.z - container.z).abs() < safe;

    let half_height = geometry.height / 2.0;
    let vertical = object.y > container.y - half_height && object.y < container.y + half_height;

    horizontal && vertical
}

/// Step handler counting objects into the active container
pub struct CollisionRules<'a> {
    objects: &'a mut [TrackedBody],
    container: Option<&'a mut ActiveContainer>,
    config: &'a RulesConfig,
    messages: &'a mut dyn MessageSink,
    newly_contained: u32,
}

impl<'a> CollisionRules<'a> {
    pub fn new(
        objects: &'a mut [TrackedBody],
        container: Option<&'a mut ActiveContainer>,
        config: &'a RulesConfig,
        messages: &'a mut dyn MessageSink,
    ) -> Self {
        Self {
            objects,
            container,
            config,
            messages,
            newly_contained: 0,
        }
    }

    /// Objects counted during this step
    pub fn newly_contained(&self) -> u32 {
        self.newly_contained
    }
}

impl PhysicsEventHandler for CollisionRules<'_> {
    fn on_collision(&mut self, event: &CollisionEvent, world: &PhysicsWorld) {
        if !event.is_started() {
            return;
        }
        let Some(container) = self.container.as_deref_mut() else {
            return;
        };
        let Some(partner) = event.partner_of(container.tracked.body) else {
            return;
        };
        let Some(object) = self.objects.iter_mut().find(|o| o.body == partner) else {
            return;
        };
        let BodyRole::Object { in_basket } = &mut object.role else {
            return;
        };
        if *in_basket {
            return;
        }

        let (Ok(object_pos), Ok(container_pos)) = (
            world.get_body_position(partner),
            world.get_body_position(container.tracked.body),
        ) else {
            return;
        };

        if !is_contained(
            Vec3::from(object_pos),
            Vec3::from(container_pos),
            &container.geometry,
            self.config.tolerance,
        ) {
            return;
        }

        *in_basket = true;
        let count = container.increment();
        self.newly_contained += 1;
        log::info!("Objects in container: {}", count);

        if count >= self.config.threshold && !container.message_shown {
            container.message_shown = true;
            self.messages.show(&self.config.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContainerConfig;
    use orchard_asset::Bounds;

    fn geometry() -> ContainerGeometry {
        // 8 x 4 x 8 after scaling: safe radius 4 - 0.8 + 0.5 = 3.7
        ContainerGeometry::from_bounds(&Bounds::from_size(8.0, 4.0, 8.0), &ContainerConfig::default())
    }

    #[test]
    fn test_center_is_contained() {
        let c = Vec3::new(0.0, -2.5, -16.0);
        assert!(is_contained(c, c, &geometry(), 0.5));
    }

    #[test]
    fn test_horizontal_limit_is_strict() {
        let c = Vec3::ZERO;
        let g = geometry();
        assert!(is_contained(Vec3::new(3.69, 0.0, 0.0), c, &g, 0.5));
        assert!(!is_contained(Vec3::new(3.71, 0.0, 0.0), c, &g, 0.5));
        assert!(!is_contained(Vec3::new(0.0, 0.0, -3.71), c, &g, 0.5));
        // Square test, not circular
        assert!(is_contained(Vec3::new(3.6, 0.0, 3.6), c, &g, 0.5));
    }

    #[test]
    fn test_vertical_band_is_strict() {
        let c = Vec3::ZERO;
        let g = geometry();
        assert!(is_contained(Vec3::new(0.0, 1.99, 0.0), c, &g, 0.5));
        assert!(!is_contained(Vec3::new(0.0, 2.0, 0.0), c, &g, 0.5));
        assert!(!is_contained(Vec3::new(0.0, -2.0, 0.0), c, &g, 0.5));
    }

    #[test]
    fn test_tolerance_widens_radius() {
        let c = Vec3::ZERO;
        let g = geometry();
        assert!(!is_contained(Vec3::new(3.5, 0.0, 0.0), c, &g, 0.0));
        assert!(is_contained(Vec3::new(3.5, 0.0, 0.0), c, &g, 0.5));
    }
}
