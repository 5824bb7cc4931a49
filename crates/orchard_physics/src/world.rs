//! The simulation world

use crate::body::{RigidBodyDesc, RigidBodyHandle};
use crate::collider::{ColliderDesc, ColliderHandle};
use crate::config::PhysicsConfig;
use crate::error::{PhysicsError, Result};
use crate::events::{CollisionEvent, ContactInfo, ContactPhase, EventCollector, PhysicsEventHandler};
use crate::material::{ContactMaterialHooks, ContactMaterialTable, MaterialTag};
use rapier3d::prelude as rapier;
use std::collections::HashMap;
use std::num::NonZeroUsize;

/// Rigid body simulation for one scene.
///
/// Owns every rapier set. Stepping is fixed-rate: `step` accumulates host
/// time and runs up to `max_substeps` substeps of `timestep` each.
pub struct PhysicsWorld {
    config: PhysicsConfig,
    gravity: rapier::Vector<f32>,
    integration_params: rapier::IntegrationParameters,

    pipeline: rapier::PhysicsPipeline,
    islands: rapier::IslandManager,
    broad_phase: rapier::DefaultBroadPhase,
    narrow_phase: rapier::NarrowPhase,
    impulse_joints: rapier::ImpulseJointSet,
    multibody_joints: rapier::MultibodyJointSet,
    ccd_solver: rapier::CCDSolver,
    bodies: rapier::RigidBodySet,
    colliders: rapier::ColliderSet,

    contact_materials: ContactMaterialTable,
    collider_tags: HashMap<rapier::ColliderHandle, MaterialTag>,
    /// Events from the last `step` call
    events: EventCollector,
    /// Host time not yet consumed by a substep
    accumulated_time: f32,
}

impl PhysicsWorld {
    pub fn new(config: PhysicsConfig) -> Self {
        let [gx, gy, gz] = config.gravity;
        let integration_params = rapier::IntegrationParameters {
            dt: config.timestep,
            num_solver_iterations: NonZeroUsize::new(config.velocity_iterations)
                .unwrap_or(NonZeroUsize::MIN),
            ..Default::default()
        };

        Self {
            gravity: rapier::Vector::new(gx, gy, gz),
            integration_params,
            pipeline: rapier::PhysicsPipeline::new(),
            islands: rapier::IslandManager::new(),
            broad_phase: rapier::DefaultBroadPhase::new(),
            narrow_phase: rapier::NarrowPhase::new(),
            impulse_joints: rapier::ImpulseJointSet::new(),
            multibody_joints: rapier::MultibodyJointSet::new(),
            ccd_solver: rapier::CCDSolver::new(),
            bodies: rapier::RigidBodySet::new(),
            colliders: rapier::ColliderSet::new(),
            contact_materials: ContactMaterialTable::new(),
            collider_tags: HashMap::new(),
            events: EventCollector::new(),
            accumulated_time: 0.0,
            config,
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Replace the whole contact table
    pub fn set_contact_materials(&mut self, table: ContactMaterialTable) {
        self.contact_materials = table;
    }

    // ---- bodies ----

    fn body(&self, handle: RigidBodyHandle) -> Result<&rapier::RigidBody> {
        self.bodies.get(handle.0).ok_or(PhysicsError::BodyNotFound(handle))
    }

    fn body_mut(&mut self, handle: RigidBodyHandle) -> Result<&mut rapier::RigidBody> {
        self.bodies.get_mut(handle.0).ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Insert a body with no colliders
    pub fn create_rigid_body(&mut self, desc: RigidBodyDesc) -> RigidBodyHandle {
        let mut builder = desc.to_rapier_builder();
        if !self.config.sleeping_enabled {
            builder = builder.can_sleep(false);
        }
        RigidBodyHandle(self.bodies.insert(builder))
    }

    /// Create a body together with its colliders.
    ///
    /// When the description carries a mass, it is spread over the colliders
    /// in proportion to their volume.
    pub fn create_body_with_colliders(
        &mut self,
        desc: RigidBodyDesc,
        colliders: Vec<ColliderDesc>,
    ) -> (RigidBodyHandle, Vec<ColliderHandle>) {
        let mass = desc.mass;
        let body = self.create_rigid_body(desc);

        let total_volume: f32 = colliders.iter().map(|c| c.shape.volume()).sum();
        let count = colliders.len().max(1) as f32;

        let handles = colliders
            .into_iter()
            .map(|mut collider| {
                if mass > 0.0 {
                    let share = if total_volume > 0.0 {
                        collider.shape.volume() / total_volume
                    } else {
                        1.0 / count
                    };
                    collider.mass = Some(mass * share);
                }
                self.create_collider(collider, Some(body))
            })
            .collect();

        (body, handles)
    }

    /// Remove a rigid body and its colliders. Returns false if it was absent.
    pub fn remove_rigid_body(&mut self, handle: RigidBodyHandle) -> bool {
        let removed = self.bodies.remove(
            handle.0,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true, // Remove attached colliders
        );

        match removed {
            Some(body) => {
                for collider in body.colliders() {
                    self.collider_tags.remove(collider);
                }
                true
            }
            None => false,
        }
    }

    /// Remove every body and collider
    pub fn clear(&mut self) {
        let handles: Vec<_> = self.bodies.iter().map(|(h, _)| RigidBodyHandle(h)).collect();
        for handle in handles {
            self.remove_rigid_body(handle);
        }

        // Parentless colliders
        let loose: Vec<_> = self.colliders.iter().map(|(h, _)| h).collect();
        for handle in loose {
            self.colliders.remove(handle, &mut self.islands, &mut self.bodies, false);
        }

        self.collider_tags.clear();
        self.events.clear();
        self.accumulated_time = 0.0;
    }

    pub fn contains_body(&self, handle: RigidBodyHandle) -> bool {
        self.bodies.contains(handle.0)
    }

    pub fn get_body_position(&self, handle: RigidBodyHandle) -> Result<[f32; 3]> {
        let t = self.body(handle)?.translation();
        Ok([t.x, t.y, t.z])
    }

    /// Teleport a body. Velocities are left untouched.
    pub fn set_body_position(&mut self, handle: RigidBodyHandle, x: f32, y: f32, z: f32) -> Result<()> {
        self.body_mut(handle)?.set_translation(rapier::Vector::new(x, y, z), true);
        Ok(())
    }

    /// Orientation as an (x, y, z, w) quaternion
    pub fn get_body_rotation(&self, handle: RigidBodyHandle) -> Result<[f32; 4]> {
        let q = self.body(handle)?.rotation();
        Ok([q.i, q.j, q.k, q.w])
    }

    pub fn get_body_linear_velocity(&self, handle: RigidBodyHandle) -> Result<[f32; 3]> {
        let v = self.body(handle)?.linvel();
        Ok([v.x, v.y, v.z])
    }

    pub fn set_body_linear_velocity(&mut self, handle: RigidBodyHandle, x: f32, y: f32, z: f32) -> Result<()> {
        self.body_mut(handle)?.set_linvel(rapier::Vector::new(x, y, z), true);
        Ok(())
    }

    pub fn set_body_angular_velocity(&mut self, handle: RigidBodyHandle, x: f32, y: f32, z: f32) -> Result<()> {
        self.body_mut(handle)?.set_angvel(rapier::Vector::new(x, y, z), true);
        Ok(())
    }

    /// Push a body through its center of mass.
    ///
    /// Forces act during the next step only; they are cleared afterwards.
    pub fn apply_force(&mut self, handle: RigidBodyHandle, force: [f32; 3]) -> Result<()> {
        let [fx, fy, fz] = force;
        self.body_mut(handle)?.add_force(rapier::Vector::new(fx, fy, fz), true);
        Ok(())
    }

    pub fn get_body_mass(&self, handle: RigidBodyHandle) -> Result<f32> {
        Ok(self.body(handle)?.mass())
    }

    // ---- colliders ----

    /// Create a collider, optionally attached to a rigid body
    pub fn create_collider(&mut self, desc: ColliderDesc, parent: Option<RigidBodyHandle>) -> ColliderHandle {
        let builder = desc.to_rapier_builder();
        let handle = match parent {
            Some(body) => self.colliders.insert_with_parent(builder, body.0, &mut self.bodies),
            None => self.colliders.insert(builder),
        };

        if let Some(tag) = desc.material {
            self.collider_tags.insert(handle, tag);
        }

        ColliderHandle(handle)
    }

    /// Material tag of a collider
    pub fn collider_material(&self, handle: ColliderHandle) -> Option<MaterialTag> {
        self.collider_tags.get(&handle.0).copied()
    }

    /// Body a collider is attached to
    pub fn collider_parent(&self, handle: ColliderHandle) -> Result<Option<RigidBodyHandle>> {
        self.colliders
            .get(handle.0)
            .map(|c| c.parent().map(RigidBodyHandle))
            .ok_or(PhysicsError::ColliderNotFound(handle))
    }

    /// Number of colliders attached to a body
    pub fn body_collider_count(&self, handle: RigidBodyHandle) -> Result<usize> {
        Ok(self.body(handle)?.colliders().len())
    }

    // ---- stepping ----

    /// Step the physics simulation with fixed timestep.
    ///
    /// Returns the number of fixed substeps taken.
    pub fn step(&mut self, delta_time: f32) -> u32 {
        self.step_with_handler(delta_time, &mut IgnoreEvents)
    }

    /// Step the simulation, handing every collision event to `handler`
    /// before returning.
    pub fn step_with_handler(&mut self, delta_time: f32, handler: &mut dyn PhysicsEventHandler) -> u32 {
        self.accumulated_time += delta_time;
        self.events.clear();

        let mut steps = 0;
        while self.accumulated_time >= self.config.timestep && steps < self.config.max_substeps {
            let events = self.step_internal();
            for event in &events {
                handler.on_collision(event, self);
            }
            self.events.extend(events);

            self.accumulated_time -= self.config.timestep;
            steps += 1;
        }

        if self.accumulated_time >= self.config.timestep {
            log::debug!(
                "Physics fell behind by {:.3}s, dropping backlog",
                self.accumulated_time
            );
            self.accumulated_time = 0.0;
        }

        steps
    }

    /// Internal fixed timestep
    fn step_internal(&mut self) -> Vec<CollisionEvent> {
        let (collision_send, collision_recv) = crossbeam_channel::unbounded();

        let event_handler = ChannelEventCollector {
            collision_events: collision_send,
        };

        let hooks = ContactMaterialHooks {
            table: &self.contact_materials,
            tags: &self.collider_tags,
        };

        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &hooks,
            &event_handler,
        );

        // User forces only last one step
        for (_, body) in self.bodies.iter_mut() {
            body.reset_forces(false);
        }

        let mut events = Vec::new();
        while let Ok((event, contact)) = collision_recv.try_recv() {
            if event.removed() {
                continue;
            }

            let (h1, h2, phase) = match event {
                rapier::CollisionEvent::Started(h1, h2, _) => (h1, h2, ContactPhase::Began),
                rapier::CollisionEvent::Stopped(h1, h2, _) => (h1, h2, ContactPhase::Ended),
            };
            let parent = |h: rapier::ColliderHandle| self.colliders.get(h).and_then(|c| c.parent()).map(RigidBodyHandle);

            events.push(CollisionEvent {
                phase,
                colliders: [ColliderHandle(h1), ColliderHandle(h2)],
                bodies: [parent(h1), parent(h2)],
                contact,
            });
        }

        events
    }

    /// Contact starts from the last `step` call
    pub fn collision_started(&self) -> impl Iterator<Item = &CollisionEvent> {
        self.events.started()
    }

    /// Bodies currently simulated
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }
}

/// Handler used by plain `step`
struct IgnoreEvents;

impl PhysicsEventHandler for IgnoreEvents {
    fn on_collision(&mut self, _event: &CollisionEvent, _world: &PhysicsWorld) {}
}

/// Forwards rapier's events out of the pipeline, which only lends `&self`
struct ChannelEventCollector {
    collision_events: crossbeam_channel::Sender<(rapier::CollisionEvent, Option<ContactInfo>)>,
}

impl rapier::EventHandler for ChannelEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &rapier::RigidBodySet,
        _colliders: &rapier::ColliderSet,
        event: rapier::CollisionEvent,
        contact_pair: Option<&rapier::ContactPair>,
    ) {
        let contact = contact_pair
            .and_then(|pair| pair.find_deepest_contact())
            .map(|(manifold, point)| {
                let n = manifold.data.normal;
                ContactInfo {
                    normal: [n.x, n.y, n.z],
                    depth: (-point.dist).max(0.0),
                }
            });
        let _ = self.collision_events.send((event, contact));
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &rapier::RigidBodySet,
        _colliders: &rapier::ColliderSet,
        _contact_pair: &rapier::ContactPair,
        _total_force_magnitude: f32,
    ) {
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}
