//! Delivery trigger: a full container carried to the sun resets the round

use crate::config::LightingConfig;
use crate::message::MessageSink;
use crate::session::Scene;
use glam::Vec3;
use orchard_asset::AssetGateway;
use serde::{Deserialize, Serialize};

/// Sun light and sun material intensities
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Illumination {
    pub light_intensity: f32,
    pub emissive_intensity: f32,
}

impl Illumination {
    pub fn new(config: &LightingConfig) -> Self {
        Self {
            light_intensity: config.light_intensity,
            emissive_intensity: config.emissive_intensity,
        }
    }

    /// Raise both intensities by `step`
    pub fn escalate(&mut self, step: f32) {
        self.light_intensity += step;
        self.emissive_intensity += step;
    }
}

/// Whether a container holding `count` objects at `distance` from the
/// target gets delivered
pub fn should_deliver(count: u32, distance: f32, threshold: u32, proximity: f32) -> bool {
    count >= threshold && distance < proximity
}

impl<G: AssetGateway, M: MessageSink> Scene<G, M> {
    /// Check the active container against the delivery target and, if it
    /// qualifies, reset the round. Returns whether a delivery happened.
    pub fn evaluate_delivery(&mut self) -> bool {
        let Some(active) = self.container.active() else {
            return false;
        };
        let count = active.contained_count();
        let Ok(position) = self.world.get_body_position(active.tracked.body) else {
            return false;
        };

        let target = Vec3::from(self.config.delivery.target);
        let distance = Vec3::from(position).distance(target);
        if !should_deliver(count, distance, self.config.rules.threshold, self.config.delivery.proximity) {
            return false;
        }

        log::info!("Delivered {} objects at distance {:.2}", count, distance);

        self.destroy_container();
        self.illumination.escalate(self.config.delivery.intensity_step);
        self.request_container();
        self.clear_objects();
        self.messages.hide();

        self.stats.deliveries += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_distance() {
        assert!(should_deliver(3, 1.49, 3, 1.5));
        assert!(!should_deliver(3, 1.5, 3, 1.5));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert!(!should_deliver(2, 0.0, 3, 1.5));
        assert!(should_deliver(3, 0.0, 3, 1.5));
        assert!(should_deliver(7, 0.0, 3, 1.5));
    }

    #[test]
    fn test_escalate() {
        let mut light = Illumination::new(&LightingConfig::default());
        light.escalate(1.0);
        light.escalate(1.0);
        assert_eq!(light.light_intensity, 3.0);
        assert_eq!(light.emissive_intensity, 4.0);
    }
}
