//! Scene session - the context every handler and the frame loop run against

use crate::camera::Camera;
use crate::config::SceneConfig;
use crate::container::{ActiveContainer, ContainerManager, ContainerState};
use crate::delivery::Illumination;
use crate::error::SceneResult;
use crate::interaction::InteractionController;
use crate::message::MessageSink;
use crate::proxy::ProxyRegistry;
use crate::spawner::Spawner;
use crate::timer::SpawnSchedule;
use crate::tracked::TrackedBody;
use orchard_asset::AssetGateway;
use orchard_physics::{ColliderDesc, ColliderShape, MaterialTag, PhysicsWorld, RigidBodyDesc, RigidBodyHandle};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Running totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneStats {
    pub spawned: u64,
    pub contained: u64,
    pub deliveries: u32,
}

/// One mounted scene.
///
/// Owns the physics world, the visual proxies and every registry. Input,
/// timer ticks and frames all go through `&mut Scene`, so no state is shared
/// outside it.
pub struct Scene<G, M> {
    pub(crate) config: SceneConfig,
    pub(crate) world: PhysicsWorld,
    pub(crate) ground: RigidBodyHandle,
    pub(crate) gateway: G,
    pub(crate) messages: M,
    pub(crate) proxies: ProxyRegistry,
    pub(crate) objects: Vec<TrackedBody>,
    pub(crate) spawner: Spawner,
    pub(crate) schedule: SpawnSchedule,
    pub(crate) container: ContainerManager,
    pub(crate) illumination: Illumination,
    pub(crate) controller: InteractionController,
    pub(crate) camera: Camera,
    pub(crate) viewport: [f32; 2],
    pub(crate) frame_count: u64,
    pub(crate) stats: SceneStats,
    pub(crate) shut_down: bool,
}

impl<G: AssetGateway, M: MessageSink> Scene<G, M> {
    /// Mount the scene: build the ground, then request both prototypes
    pub fn new(config: SceneConfig, gateway: G, messages: M) -> SceneResult<Self> {
        config.validate()?;

        let mut world = PhysicsWorld::new(config.physics.clone());
        world.set_contact_materials(config.contact_table());

        let ground = world.create_rigid_body(RigidBodyDesc::fixed().with_position(0.0, config.ground.height, 0.0));
        world.create_collider(
            ColliderDesc::new(ColliderShape::ground_plane()).with_material(MaterialTag::Ground),
            Some(ground),
        );

        let mut scene = Self {
            world,
            ground,
            gateway,
            messages,
            proxies: ProxyRegistry::new(),
            objects: Vec::new(),
            spawner: Spawner::new(config.spawn.clone()),
            schedule: SpawnSchedule::new(Duration::from_secs_f32(config.spawn.interval_secs)),
            container: ContainerManager::new(config.container.clone(), config.assets.container.clone()),
            illumination: Illumination::new(&config.lighting),
            controller: InteractionController::new(),
            camera: Camera::new(&config.camera, config.viewport),
            viewport: config.viewport,
            frame_count: 0,
            stats: SceneStats::default(),
            shut_down: false,
            config,
        };

        scene
            .spawner
            .request_prototype(&mut scene.gateway, &scene.config.assets.object);
        scene.container.request(&mut scene.gateway);

        log::info!("Scene mounted");
        Ok(scene)
    }

    // ==================== Accessors ====================

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world
    }

    pub fn ground(&self) -> RigidBodyHandle {
        self.ground
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    pub fn messages(&self) -> &M {
        &self.messages
    }

    pub fn proxies(&self) -> &ProxyRegistry {
        &self.proxies
    }

    /// Tracked objects, in spawn order
    pub fn objects(&self) -> &[TrackedBody] {
        &self.objects
    }

    pub fn object(&self, body: RigidBodyHandle) -> Option<&TrackedBody> {
        self.objects.iter().find(|o| o.body == body)
    }

    pub fn container_state(&self) -> ContainerState {
        self.container.state()
    }

    pub fn container(&self) -> Option<&ActiveContainer> {
        self.container.active()
    }

    /// Construction requests that reached the gateway
    pub fn container_requests(&self) -> u32 {
        self.container.requests_issued()
    }

    pub fn illumination(&self) -> Illumination {
        self.illumination
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn schedule(&self) -> &SpawnSchedule {
        &self.schedule
    }

    pub fn stats(&self) -> SceneStats {
        self.stats
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    // ==================== Lifecycle ====================

    /// Route finished asset loads to the spawner or the container.
    /// Completions nobody is waiting for are dropped.
    pub fn poll_assets(&mut self) -> usize {
        let completions = self.gateway.poll();
        let count = completions.len();

        for completion in completions {
            if self.spawner.owns(completion.ticket) {
                if self.spawner.on_loaded(&completion.identifier, completion.result) {
                    self.spawn_object();
                    self.schedule.arm();
                }
            } else if self.container.owns(completion.ticket) {
                self.container.on_loaded(
                    completion.ticket,
                    completion.result,
                    &mut self.world,
                    &mut self.proxies,
                );
            } else {
                log::debug!("Dropping stale completion for {}", completion.identifier);
            }
        }

        count
    }

    /// Ask for a new container; dropped while one is loading or active
    pub fn request_container(&mut self) -> bool {
        if self.shut_down {
            return false;
        }
        self.container.request(&mut self.gateway)
    }

    /// Remove the active container, visual first
    pub fn destroy_container(&mut self) -> bool {
        if let Some(active) = self.container.active() {
            self.controller.release_body(active.tracked.body);
        }
        self.container.destroy(&mut self.world, &mut self.proxies)
    }

    /// Spawn one object now
    pub fn spawn_object(&mut self) -> Option<RigidBodyHandle> {
        if self.shut_down {
            return None;
        }
        let tracked = self.spawner.spawn(&mut self.world, &mut self.proxies)?;
        let body = tracked.body;
        self.objects.push(tracked);
        self.stats.spawned += 1;
        Some(body)
    }

    /// Advance the spawn schedule by host time; returns objects spawned
    pub fn tick_spawn_timer(&mut self, delta: Duration) -> usize {
        let fired = self.schedule.tick(delta);
        (0..fired).filter_map(|_| self.spawn_object()).count()
    }

    /// Remove every tracked object, visual and body together
    pub fn clear_objects(&mut self) -> usize {
        let count = self.objects.len();
        for tracked in self.objects.drain(..) {
            self.proxies.release(tracked.visual);
            self.world.remove_rigid_body(tracked.body);
            self.controller.release_body(tracked.body);
        }
        count
    }

    /// Unmount. Safe to call more than once and after partial construction.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }

        self.schedule.cancel();
        self.controller.detach();
        self.spawner.shutdown();
        self.container.shutdown(&mut self.world, &mut self.proxies);
        self.clear_objects();
        self.proxies.release_all();
        self.world.clear();
        self.messages.hide();
        self.shut_down = true;

        log::info!(
            "Scene shut down after {} frames ({} spawned, {} deliveries)",
            self.frame_count,
            self.stats.spawned,
            self.stats.deliveries
        );
    }
}
