//! Spawner - apples from the object prototype

use crate::config::SpawnConfig;
use crate::proxy::ProxyRegistry;
use crate::tracked::{BodyRole, TrackedBody};
use glam::Vec3;
use orchard_asset::{AssetGateway, LoadError, LoadTicket, VisualPrototype};
use orchard_physics::{ColliderDesc, ColliderShape, MaterialTag, PhysicsWorld, RigidBodyDesc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Load state of the object prototype
#[derive(Debug, Clone)]
pub enum PrototypeState {
    Unrequested,
    Loading(LoadTicket),
    Ready(VisualPrototype),
    Failed,
}

/// Produces one object body + proxy per call
pub struct Spawner {
    config: SpawnConfig,
    rng: StdRng,
    prototype: PrototypeState,
}

impl Spawner {
    pub fn new(config: SpawnConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            config,
            rng,
            prototype: PrototypeState::Unrequested,
        }
    }

    pub fn prototype_state(&self) -> &PrototypeState {
        &self.prototype
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.prototype, PrototypeState::Ready(_))
    }

    /// Ask the gateway for the object prototype
    pub fn request_prototype(&mut self, gateway: &mut dyn AssetGateway, identifier: &str) {
        if let PrototypeState::Unrequested = self.prototype {
            self.prototype = PrototypeState::Loading(gateway.request(identifier));
        }
    }

    /// Whether `ticket` is the pending prototype request
    pub fn owns(&self, ticket: LoadTicket) -> bool {
        matches!(self.prototype, PrototypeState::Loading(t) if t == ticket)
    }

    /// Store the prototype load outcome. Returns true when spawning can start.
    pub fn on_loaded(&mut self, identifier: &str, result: Result<VisualPrototype, LoadError>) -> bool {
        match result {
            Ok(prototype) => {
                log::info!("Object prototype {} ready", identifier);
                self.prototype = PrototypeState::Ready(prototype);
                true
            }
            Err(e) => {
                log::error!("Failed to load object prototype {}: {}", identifier, e);
                self.prototype = PrototypeState::Failed;
                false
            }
        }
    }

    /// Forget the prototype; nothing spawns afterwards
    pub fn shutdown(&mut self) {
        self.prototype = PrototypeState::Failed;
    }

    /// Next spawn point: random x, fixed height and depth
    pub fn next_position(&mut self) -> Vec3 {
        spawn_point(&self.config, self.rng.random())
    }

    /// Create one object. `None` until the prototype is ready.
    pub fn spawn(&mut self, world: &mut PhysicsWorld, proxies: &mut ProxyRegistry) -> Option<TrackedBody> {
        let PrototypeState::Ready(prototype) = &self.prototype else {
            return None;
        };
        // One draw per spawned object
        let position = spawn_point(&self.config, self.rng.random());

        let visual = proxies.instantiate(prototype, self.config.scale, position);

        let desc = RigidBodyDesc::dynamic()
            .with_position(position.x, position.y, position.z)
            .with_mass(self.config.mass)
            .with_damping(self.config.linear_damping, self.config.angular_damping)
            .with_ccd(self.config.ccd);
        let collider = ColliderDesc::new(ColliderShape::sphere(self.config.radius))
            .with_material(MaterialTag::Object)
            .with_collision_events(true);
        let (body, _) = world.create_body_with_colliders(desc, vec![collider]);

        log::debug!("Spawned object at ({:.2}, {:.2}, {:.2})", position.x, position.y, position.z);
        Some(TrackedBody::new(body, visual, BodyRole::object()))
    }
}

fn spawn_point(config: &SpawnConfig, r: f32) -> Vec3 {
    Vec3::new((r - 0.5) * config.spread, config.height, config.depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use orchard_asset::{Bounds, ManualGateway};
    use orchard_physics::PhysicsConfig;

    fn seeded() -> Spawner {
        Spawner::new(SpawnConfig {
            seed: Some(7),
            ..SpawnConfig::default()
        })
    }

    #[test]
    fn test_positions_in_band() {
        let mut spawner = seeded();
        for _ in 0..100 {
            let p = spawner.next_position();
            assert!(p.x >= -5.0 && p.x < 5.0);
            assert_eq!(p.y, 10.0);
            assert_eq!(p.z, 2.0);
        }
    }

    #[test]
    fn test_no_spawn_before_prototype() {
        let mut spawner = seeded();
        let mut world = PhysicsWorld::new(PhysicsConfig::default());
        let mut proxies = ProxyRegistry::new();
        assert!(spawner.spawn(&mut world, &mut proxies).is_none());
        assert_eq!(world.body_count(), 0);
        assert!(proxies.is_empty());
    }

    #[test]
    fn test_spawn_pairs_body_and_proxy() {
        let mut spawner = seeded();
        let mut gateway = ManualGateway::new();
        spawner.request_prototype(&mut gateway, "apple.glb");
        let ticket = gateway.pending_ticket("apple.glb").unwrap();
        assert!(spawner.owns(ticket));

        let proto = VisualPrototype::from_bounds("apple", Bounds::from_size(6.0, 6.0, 6.0));
        assert!(spawner.on_loaded("apple.glb", Ok(proto)));

        let mut world = PhysicsWorld::new(PhysicsConfig::default());
        let mut proxies = ProxyRegistry::new();
        let tracked = spawner.spawn(&mut world, &mut proxies).unwrap();

        assert!(world.contains_body(tracked.body));
        assert!(proxies.contains(tracked.visual));
        assert!(!tracked.in_basket());
        assert_eq!(proxies.get(tracked.visual).unwrap().scale, 0.2);
    }

    #[test]
    fn test_early_spawn_keeps_seeded_sequence() {
        let expected = seeded().next_position();

        let mut spawner = seeded();
        let mut world = PhysicsWorld::new(PhysicsConfig::default());
        let mut proxies = ProxyRegistry::new();
        assert!(spawner.spawn(&mut world, &mut proxies).is_none());
        assert!(spawner.spawn(&mut world, &mut proxies).is_none());

        let mut gateway = ManualGateway::new();
        spawner.request_prototype(&mut gateway, "apple.glb");
        let proto = VisualPrototype::from_bounds("apple", Bounds::from_size(6.0, 6.0, 6.0));
        assert!(spawner.on_loaded("apple.glb", Ok(proto)));

        let tracked = spawner.spawn(&mut world, &mut proxies).unwrap();
        let x = world.get_body_position(tracked.body).unwrap()[0];
        assert_eq!(x, expected.x);
    }

    #[test]
    fn test_failed_prototype_never_spawns() {
        let mut spawner = seeded();
        let mut gateway = ManualGateway::new();
        spawner.request_prototype(&mut gateway, "apple.glb");
        assert!(!spawner.on_loaded("apple.glb", Err(LoadError::NotFound("apple.glb".into()))));

        let mut world = PhysicsWorld::new(PhysicsConfig::default());
        let mut proxies = ProxyRegistry::new();
        assert!(spawner.spawn(&mut world, &mut proxies).is_none());
    }
}
