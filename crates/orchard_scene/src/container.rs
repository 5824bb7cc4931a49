//! Container lifecycle and the composite basket body
//!
//! ```text
//!   Idle/Removed ──request──► Loading ──ok──► Active ──destroy──► Removed
//!                                │
//!                                └──err──► Idle
//! ```
//!
//! A request made while Loading or Active is dropped, so at most one
//! construction is ever in flight.

use crate::config::ContainerConfig;
use crate::proxy::ProxyRegistry;
use crate::tracked::{BodyRole, TrackedBody};
use glam::Vec3;
use orchard_asset::{AssetGateway, Bounds, LoadError, LoadTicket, VisualPrototype};
use orchard_physics::{
    body::yaw_rotation, ColliderDesc, ColliderShape, MaterialTag, PhysicsWorld, RigidBodyDesc,
};
use std::f32::consts::TAU;

/// Measured dimensions of a scaled container and the shapes derived from them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerGeometry {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    /// Half of the larger horizontal extent
    pub base_radius: f32,
    pub wall_thickness: f32,
    pub floor_thickness: f32,
    /// Distance from the center to the middle of each wall segment
    pub wall_radius: f32,
    pub segment_count: u32,
    pub segment_length: f32,
    pub wall_height_divisor: f32,
}

impl ContainerGeometry {
    /// Derive the geometry from already scaled bounds
    pub fn from_bounds(bounds: &Bounds, config: &ContainerConfig) -> Self {
        let size = bounds.size();
        let base_radius = size.x.max(size.z) / 2.0;
        let wall_thickness = config.wall_thickness * config.scale;
        let segment_count = config.wall_segments.max(3);

        Self {
            width: size.x,
            height: size.y,
            depth: size.z,
            base_radius,
            wall_thickness,
            floor_thickness: config.floor_thickness * config.scale,
            wall_radius: base_radius - wall_thickness / 2.0,
            segment_count,
            segment_length: TAU * base_radius / segment_count as f32,
            wall_height_divisor: config.wall_height_divisor,
        }
    }

    /// Radius inside which an object counts as horizontally contained
    pub fn safe_radius(&self, tolerance: f32) -> f32 {
        self.base_radius - self.wall_thickness / 2.0 + tolerance
    }

    /// Floor cylinder followed by the ring of wall boxes, in body space
    pub fn colliders(&self) -> Vec<ColliderDesc> {
        let mut shapes = Vec::with_capacity(self.segment_count as usize + 1);

        shapes.push(
            ColliderDesc::new(ColliderShape::cylinder(self.floor_thickness / 2.0, self.base_radius))
                .with_offset(0.0, -self.height / 2.0 + self.floor_thickness / 2.0, 0.0),
        );

        let step = TAU / self.segment_count as f32;
        for i in 0..self.segment_count {
            let angle = i as f32 * step;
            // Local x is the wall thickness; turn it to point at the center
            shapes.push(
                ColliderDesc::new(ColliderShape::cuboid(
                    self.wall_thickness / 2.0,
                    self.height / self.wall_height_divisor,
                    self.segment_length / 2.0,
                ))
                .with_offset(angle.cos() * self.wall_radius, 0.0, angle.sin() * self.wall_radius)
                .with_rotation(yaw_rotation(-angle)),
            );
        }

        shapes
            .into_iter()
            .map(|c| c.with_material(MaterialTag::Container).with_collision_events(true))
            .collect()
    }
}

/// The live container
#[derive(Debug, Clone)]
pub struct ActiveContainer {
    pub tracked: TrackedBody,
    pub geometry: ContainerGeometry,
    /// Whether the threshold message was already shown for this container
    pub message_shown: bool,
}

impl ActiveContainer {
    pub fn contained_count(&self) -> u32 {
        self.tracked.contained_count()
    }

    /// Count one more contained object and return the new total
    pub fn increment(&mut self) -> u32 {
        if let BodyRole::Container { contained_count } = &mut self.tracked.role {
            *contained_count += 1;
        }
        self.contained_count()
    }
}

#[derive(Debug, Clone)]
pub enum ContainerLifecycle {
    Idle,
    Loading { ticket: LoadTicket },
    Active(ActiveContainer),
    /// Destroyed by a delivery or teardown
    Removed,
}

/// Lifecycle state without the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Idle,
    Loading,
    Active,
    Removed,
}

/// Owns the single container and its construction
#[derive(Debug)]
pub struct ContainerManager {
    config: ContainerConfig,
    identifier: String,
    lifecycle: ContainerLifecycle,
    requests_issued: u32,
}

impl ContainerManager {
    pub fn new(config: ContainerConfig, identifier: impl Into<String>) -> Self {
        Self {
            config,
            identifier: identifier.into(),
            lifecycle: ContainerLifecycle::Idle,
            requests_issued: 0,
        }
    }

    pub fn state(&self) -> ContainerState {
        match self.lifecycle {
            ContainerLifecycle::Idle => ContainerState::Idle,
            ContainerLifecycle::Loading { .. } => ContainerState::Loading,
            ContainerLifecycle::Active(_) => ContainerState::Active,
            ContainerLifecycle::Removed => ContainerState::Removed,
        }
    }

    pub fn lifecycle(&self) -> &ContainerLifecycle {
        &self.lifecycle
    }

    pub fn active(&self) -> Option<&ActiveContainer> {
        match &self.lifecycle {
            ContainerLifecycle::Active(active) => Some(active),
            _ => None,
        }
    }

    pub fn active_mut(&mut self) -> Option<&mut ActiveContainer> {
        match &mut self.lifecycle {
            ContainerLifecycle::Active(active) => Some(active),
            _ => None,
        }
    }

    /// Construction requests that reached the gateway
    pub fn requests_issued(&self) -> u32 {
        self.requests_issued
    }

    /// Start building a container. Returns false when one is already
    /// loading or active.
    pub fn request(&mut self, gateway: &mut dyn AssetGateway) -> bool {
        match self.lifecycle {
            ContainerLifecycle::Idle | ContainerLifecycle::Removed => {
                let ticket = gateway.request(&self.identifier);
                self.requests_issued += 1;
                self.lifecycle = ContainerLifecycle::Loading { ticket };
                log::debug!("Container requested (ticket {})", ticket.0);
                true
            }
            ContainerLifecycle::Loading { .. } | ContainerLifecycle::Active(_) => {
                log::debug!("Container construction already under way, request dropped");
                false
            }
        }
    }

    /// Whether `ticket` is the construction in flight
    pub fn owns(&self, ticket: LoadTicket) -> bool {
        matches!(self.lifecycle, ContainerLifecycle::Loading { ticket: t } if t == ticket)
    }

    /// Finish a construction. Completions for other tickets are ignored.
    pub fn on_loaded(
        &mut self,
        ticket: LoadTicket,
        result: Result<VisualPrototype, LoadError>,
        world: &mut PhysicsWorld,
        proxies: &mut ProxyRegistry,
    ) -> bool {
        if !self.owns(ticket) {
            log::debug!("Dropping stale container completion (ticket {})", ticket.0);
            return false;
        }

        let prototype = match result {
            Ok(prototype) => prototype,
            Err(e) => {
                log::error!("Failed to load container {}: {}", self.identifier, e);
                self.lifecycle = ContainerLifecycle::Idle;
                return false;
            }
        };

        let geometry = ContainerGeometry::from_bounds(&prototype.scaled_bounds(self.config.scale), &self.config);
        let [x, y, z] = self.config.position;

        let desc = RigidBodyDesc::dynamic()
            .with_position(x, y, z)
            .with_mass(self.config.mass)
            .with_damping(self.config.linear_damping, self.config.angular_damping)
            .with_ccd(self.config.ccd);
        let (body, _) = world.create_body_with_colliders(desc, geometry.colliders());
        let visual = proxies.instantiate(&prototype, self.config.scale, Vec3::new(x, y, z));

        log::info!(
            "Container constructed: {:.2} x {:.2} x {:.2}, base radius {:.2}",
            geometry.width,
            geometry.height,
            geometry.depth,
            geometry.base_radius
        );

        self.lifecycle = ContainerLifecycle::Active(ActiveContainer {
            tracked: TrackedBody::new(body, visual, BodyRole::container()),
            geometry,
            message_shown: false,
        });
        true
    }

    /// Remove the visual, then the body. Returns false if nothing was active.
    pub fn destroy(&mut self, world: &mut PhysicsWorld, proxies: &mut ProxyRegistry) -> bool {
        match std::mem::replace(&mut self.lifecycle, ContainerLifecycle::Removed) {
            ContainerLifecycle::Active(active) => {
                proxies.release(active.tracked.visual);
                world.remove_rigid_body(active.tracked.body);
                log::info!("Container removed after {} objects", active.contained_count());
                true
            }
            other => {
                self.lifecycle = other;
                false
            }
        }
    }

    /// Teardown: drop any in-flight construction and remove the container
    pub fn shutdown(&mut self, world: &mut PhysicsWorld, proxies: &mut ProxyRegistry) {
        self.destroy(world, proxies);
        self.lifecycle = ContainerLifecycle::Removed;
    }
}
