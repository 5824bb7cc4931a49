//! Frame loop
//!
//! One host callback runs, in order:
//! 1. drain asset completions
//! 2. one fixed physics step, collision rules applied inside the step
//! 3. mirror body transforms onto their proxies
//! 4. delivery check
//! 5. message timers
//! 6. render

use crate::message::{MessageSink, MessageSnapshot};
use crate::proxy::ProxyId;
use crate::rules::CollisionRules;
use crate::session::Scene;
use glam::{Quat, Vec3};
use orchard_asset::AssetGateway;
use serde::{Deserialize, Serialize};

/// Render-facing state of one proxy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxySnapshot {
    pub id: ProxyId,
    pub prototype: String,
    pub position: [f32; 3],
    /// Quaternion (x, y, z, w)
    pub rotation: [f32; 4],
    pub scale: f32,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub proxies: Vec<ProxySnapshot>,
    pub sun_position: [f32; 3],
    pub light_intensity: f32,
    pub emissive_intensity: f32,
    pub message: Option<MessageSnapshot>,
}

/// Output hook receiving per-frame transform data
pub trait RenderSurface {
    fn render(&mut self, frame: &FrameSnapshot);
}

/// Surface that discards frames
#[derive(Debug, Default)]
pub struct NullSurface;

impl RenderSurface for NullSurface {
    fn render(&mut self, _frame: &FrameSnapshot) {}
}

/// What happened during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameReport {
    pub frame: u64,
    pub steps: u32,
    pub newly_contained: u32,
    pub delivered: bool,
}

impl<G: AssetGateway, M: MessageSink> Scene<G, M> {
    /// Run one host callback
    pub fn frame(&mut self, delta_time: f32, surface: &mut dyn RenderSurface) -> FrameReport {
        if self.shut_down {
            return FrameReport {
                frame: self.frame_count,
                ..Default::default()
            };
        }

        self.poll_assets();

        let mut rules = CollisionRules::new(
            &mut self.objects,
            self.container.active_mut(),
            &self.config.rules,
            &mut self.messages,
        );
        let steps = self
            .world
            .step_with_handler(self.config.physics.timestep, &mut rules);
        let newly_contained = rules.newly_contained();
        self.stats.contained += u64::from(newly_contained);

        self.mirror_transforms();
        let delivered = self.evaluate_delivery();
        self.messages.update(delta_time);

        self.frame_count += 1;
        surface.render(&self.snapshot());

        FrameReport {
            frame: self.frame_count,
            steps,
            newly_contained,
            delivered,
        }
    }

    /// Copy every tracked body transform onto its proxy
    pub fn mirror_transforms(&mut self) {
        let container = self.container.active().map(|c| &c.tracked);
        for tracked in self.objects.iter().chain(container) {
            let (Ok(p), Ok(r)) = (
                self.world.get_body_position(tracked.body),
                self.world.get_body_rotation(tracked.body),
            ) else {
                continue;
            };
            self.proxies
                .set_transform(tracked.visual, Vec3::from(p), Quat::from_array(r));
        }
    }

    /// Current render state
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            frame: self.frame_count,
            proxies: self
                .proxies
                .iter()
                .map(|p| ProxySnapshot {
                    id: p.id,
                    prototype: p.prototype.name.clone(),
                    position: p.position.to_array(),
                    rotation: p.rotation.to_array(),
                    scale: p.scale,
                    cast_shadow: p.cast_shadow,
                    receive_shadow: p.receive_shadow,
                })
                .collect(),
            sun_position: self.config.delivery.target,
            light_intensity: self.illumination.light_intensity,
            emissive_intensity: self.illumination.emissive_intensity,
            message: self.messages.current(),
        }
    }
}
