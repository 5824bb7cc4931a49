//! Collision events

use crate::body::RigidBodyHandle;
use crate::collider::ColliderHandle;
use crate::world::PhysicsWorld;

/// Whether a contact pair just began or just ended touching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    Began,
    Ended,
}

/// Deepest point of a touching pair when the event was raised
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactInfo {
    /// World-space unit normal, from the first collider toward the second
    pub normal: [f32; 3],
    /// Penetration depth, zero when only touching
    pub depth: f32,
}

/// A change in contact between two colliders
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionEvent {
    pub phase: ContactPhase,
    pub colliders: [ColliderHandle; 2],
    /// Owning bodies, in collider order. `None` for parentless colliders.
    pub bodies: [Option<RigidBodyHandle>; 2],
    /// Absent for pairs that separated or never produced contact points
    pub contact: Option<ContactInfo>,
}

impl CollisionEvent {
    pub fn is_started(&self) -> bool {
        self.phase == ContactPhase::Began
    }

    /// Whether `body` owns either collider
    pub fn involves(&self, body: RigidBodyHandle) -> bool {
        self.bodies.contains(&Some(body))
    }

    /// The other body, if `body` takes part in this event
    pub fn partner_of(&self, body: RigidBodyHandle) -> Option<RigidBodyHandle> {
        match self.bodies {
            [Some(a), b] if a == body => b,
            [a, Some(b)] if b == body => a,
            _ => None,
        }
    }
}

/// Receives collision events while the world steps.
///
/// Called from inside [`PhysicsWorld::step_with_handler`], once per event,
/// after the substep that produced it. The world is readable but frozen.
pub trait PhysicsEventHandler {
    fn on_collision(&mut self, event: &CollisionEvent, world: &PhysicsWorld);
}

/// Handler that keeps every event it is given
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<CollisionEvent>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[CollisionEvent] {
        &self.events
    }

    pub fn started(&self) -> impl Iterator<Item = &CollisionEvent> {
        self.events.iter().filter(|e| e.is_started())
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl PhysicsEventHandler for EventCollector {
    fn on_collision(&mut self, event: &CollisionEvent, _world: &PhysicsWorld) {
        self.events.push(event.clone());
    }
}

impl Extend<CollisionEvent> for EventCollector {
    fn extend<I: IntoIterator<Item = CollisionEvent>>(&mut self, iter: I) {
        self.events.extend(iter);
    }
}
