//! Pointer and keyboard interaction
//!
//! Dragging pulls the picked body toward the pointer ray with a spring-like
//! force. Arrow keys, Space and Shift move the container in fixed steps and
//! stop it dead.

use crate::camera::Camera;
use crate::message::MessageSink;
use crate::proxy::ProxyId;
use crate::session::Scene;
use glam::{Vec2, Vec3};
use orchard_asset::AssetGateway;
use orchard_physics::{PhysicsWorld, RigidBodyHandle};

/// Keys the scene reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Space,
    Shift,
    Other,
}

/// Host input, in viewport pixels
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    MouseDown { x: f32, y: f32 },
    MouseMove { x: f32, y: f32 },
    MouseUp,
    /// Only the first touch point is used
    TouchStart { touches: Vec<Vec2> },
    TouchMove { touches: Vec<Vec2> },
    TouchEnd,
    KeyDown(Key),
}

impl InputEvent {
    /// Pointer position carried by the event
    pub fn pointer(&self) -> Option<Vec2> {
        match self {
            Self::MouseDown { x, y } | Self::MouseMove { x, y } => Some(Vec2::new(*x, *y)),
            Self::TouchStart { touches } | Self::TouchMove { touches } => touches.first().copied(),
            _ => None,
        }
    }
}

/// The body being dragged
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragTarget {
    pub body: RigidBodyHandle,
    pub is_container: bool,
    /// Camera-to-body distance when the drag began
    pub distance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Dragging(DragTarget),
}

/// Pointer state machine
#[derive(Debug)]
pub struct InteractionController {
    state: DragState,
    attached: bool,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionController {
    pub fn new() -> Self {
        Self {
            state: DragState::Idle,
            attached: true,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn begin_drag(&mut self, target: DragTarget) {
        self.state = DragState::Dragging(target);
    }

    pub fn end_drag(&mut self) {
        self.state = DragState::Idle;
    }

    /// Stop dragging `body` if it is the current target
    pub fn release_body(&mut self, body: RigidBodyHandle) {
        if matches!(self.state, DragState::Dragging(t) if t.body == body) {
            self.state = DragState::Idle;
        }
    }

    /// Stop reacting to input for good
    pub fn detach(&mut self) {
        self.attached = false;
        self.state = DragState::Idle;
    }
}

/// Positional step for a nudge key
pub fn nudge_offset(key: Key, step: f32) -> Option<Vec3> {
    match key {
        Key::ArrowUp => Some(Vec3::new(0.0, 0.0, -step)),
        Key::ArrowDown => Some(Vec3::new(0.0, 0.0, step)),
        Key::ArrowLeft => Some(Vec3::new(-step, 0.0, 0.0)),
        Key::ArrowRight => Some(Vec3::new(step, 0.0, 0.0)),
        Key::Space => Some(Vec3::new(0.0, step, 0.0)),
        Key::Shift => Some(Vec3::new(0.0, -step, 0.0)),
        Key::Other => None,
    }
}

/// Force pulling a body at `body` toward `target`
pub fn drag_force(target: Vec3, body: Vec3, strength: f32) -> Vec3 {
    (target - body) * strength
}

impl<G: AssetGateway, M: MessageSink> Scene<G, M> {
    /// Feed one host input event
    pub fn handle_input(&mut self, event: &InputEvent) {
        if self.shut_down || !self.controller.is_attached() {
            return;
        }

        match event {
            InputEvent::MouseDown { .. } | InputEvent::TouchStart { .. } => {
                if let Some(pixel) = event.pointer() {
                    self.pointer_down(pixel);
                }
            }
            InputEvent::MouseMove { .. } | InputEvent::TouchMove { .. } => {
                if let Some(pixel) = event.pointer() {
                    self.pointer_move(pixel);
                }
            }
            InputEvent::MouseUp | InputEvent::TouchEnd => self.controller.end_drag(),
            InputEvent::KeyDown(key) => self.nudge_container(*key),
        }
    }

    /// Track a new viewport size
    pub fn resize(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.viewport = [width, height];
            self.camera.set_aspect(width, height);
        }
    }

    fn pointer_down(&mut self, pixel: Vec2) {
        let ray = self.camera.ray_from_ndc(Camera::ndc(pixel, self.viewport));

        let container = self.container.active().map(|c| c.tracked.clone());
        let candidates: Vec<ProxyId> = self
            .objects
            .iter()
            .map(|o| o.visual)
            .chain(container.as_ref().map(|c| c.visual))
            .collect();

        let Some(hit) = self.proxies.pick(&ray, candidates) else {
            return;
        };

        let owner = self
            .objects
            .iter()
            .find(|o| o.visual == hit.proxy)
            .map(|o| (o.body, false))
            .or_else(|| {
                container
                    .as_ref()
                    .filter(|c| c.visual == hit.proxy)
                    .map(|c| (c.body, true))
            });
        let Some((body, is_container)) = owner else {
            return;
        };
        let Some(proxy) = self.proxies.get(hit.proxy) else {
            return;
        };

        let distance = self.camera.position().distance(proxy.position);
        self.controller.begin_drag(DragTarget {
            body,
            is_container,
            distance,
        });
    }

    fn pointer_move(&mut self, pixel: Vec2) {
        let DragState::Dragging(target) = self.controller.state() else {
            return;
        };
        let Ok(position) = self.world.get_body_position(target.body) else {
            self.controller.end_drag();
            return;
        };

        let ray = self.camera.ray_from_ndc(Camera::ndc(pixel, self.viewport));
        let goal = ray.at(target.distance);

        let config = &self.config.interaction;
        let strength = if target.is_container {
            config.drag_strength * config.container_drag_multiplier
        } else {
            config.drag_strength
        };

        let force = drag_force(goal, Vec3::from(position), strength);
        if let Err(e) = self.world.apply_force(target.body, force.to_array()) {
            log::debug!("Dropping drag: {}", e);
            self.controller.end_drag();
        }
    }

    fn nudge_container(&mut self, key: Key) {
        let Some(offset) = nudge_offset(key, self.config.interaction.nudge_step) else {
            return;
        };
        let Some(body) = self.container.active().map(|c| c.tracked.body) else {
            return;
        };
        let Ok(position) = self.world.get_body_position(body) else {
            return;
        };

        if let Err(e) = place_at_rest(&mut self.world, body, Vec3::from(position) + offset) {
            log::debug!("Ignoring nudge: {}", e);
        }
    }
}

/// Teleport a body and stop it
fn place_at_rest(world: &mut PhysicsWorld, body: RigidBodyHandle, at: Vec3) -> orchard_physics::Result<()> {
    world.set_body_position(body, at.x, at.y, at.z)?;
    world.set_body_linear_velocity(body, 0.0, 0.0, 0.0)?;
    world.set_body_angular_velocity(body, 0.0, 0.0, 0.0)
}
