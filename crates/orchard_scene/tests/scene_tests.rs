//! Integration tests for orchard_scene

use approx::assert_relative_eq;
use orchard_asset::{Bounds, LoadError, ManualGateway, VisualPrototype};
use orchard_physics::RigidBodyHandle;
use orchard_scene::prelude::*;
use std::time::Duration;

const DT: f32 = 1.0 / 60.0;

fn apple() -> VisualPrototype {
    VisualPrototype::from_bounds("apple", Bounds::from_size(3.0, 3.0, 3.0))
}

fn basket() -> VisualPrototype {
    // 8 x 4 x 8 once scaled by 4
    VisualPrototype::from_bounds("basket", Bounds::from_size(2.0, 1.0, 2.0))
}

fn config() -> SceneConfig {
    let mut config = SceneConfig::default();
    config.spawn.seed = Some(42);
    config
}

fn stocked_scene() -> Scene<ManualGateway, MessageLog> {
    stocked_scene_with(config())
}

fn stocked_scene_with(config: SceneConfig) -> Scene<ManualGateway, MessageLog> {
    let gateway = ManualGateway::new()
        .with_prototype("apple.glb", apple())
        .with_prototype("cesto.glb", basket());
    Scene::new(config, gateway, MessageLog::new()).unwrap()
}

fn run(scene: &mut Scene<ManualGateway, MessageLog>, frames: usize) {
    for _ in 0..frames {
        scene.frame(DT, &mut NullSurface);
    }
}

fn place(scene: &mut Scene<ManualGateway, MessageLog>, body: RigidBodyHandle, x: f32, y: f32, z: f32) {
    let world = scene.world_mut();
    world.set_body_position(body, x, y, z).unwrap();
    world.set_body_linear_velocity(body, 0.0, 0.0, 0.0).unwrap();
    world.set_body_angular_velocity(body, 0.0, 0.0, 0.0).unwrap();
}

/// Drop an object just above the container floor
fn drop_into_basket(scene: &mut Scene<ManualGateway, MessageLog>, body: RigidBodyHandle, dx: f32, dz: f32) {
    let center = scene.world().get_body_position(scene.container().unwrap().tracked.body).unwrap();
    place(scene, body, center[0] + dx, center[1] + 1.5, center[2] + dz);
}

/// Settle the container and fill it with `count` objects
fn filled_scene(count: usize) -> Scene<ManualGateway, MessageLog> {
    let mut scene = stocked_scene();
    run(&mut scene, 90);
    assert_eq!(scene.container_state(), ContainerState::Active);

    let offsets = [(-1.5, 0.0), (0.0, 0.0), (1.5, 0.0), (0.0, 1.5), (0.0, -1.5)];
    let loaded: Vec<_> = scene.objects().iter().map(|o| o.body).collect();
    let mut bodies = loaded;
    while bodies.len() < count {
        bodies.push(scene.spawn_object().unwrap());
    }
    for (body, (dx, dz)) in bodies.into_iter().take(count).zip(offsets) {
        drop_into_basket(&mut scene, body, dx, dz);
    }
    run(&mut scene, 120);
    scene
}

#[test]
fn test_mount_requests_both_prototypes() {
    let scene = Scene::new(config(), ManualGateway::new(), MessageLog::new()).unwrap();

    assert_eq!(scene.gateway().requests_made(), 2);
    assert_eq!(scene.container_state(), ContainerState::Loading);
    assert!(scene.objects().is_empty());
    // Only the ground exists yet
    assert_eq!(scene.world().body_count(), 1);
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut bad = config();
    bad.spawn.interval_secs = 0.0;
    let result = Scene::new(bad, ManualGateway::new(), MessageLog::new());
    assert!(matches!(result, Err(SceneError::Config(_))));
}

#[test]
fn test_prototype_load_spawns_and_arms() {
    let mut scene = stocked_scene();
    run(&mut scene, 1);

    assert_eq!(scene.objects().len(), 1);
    assert_eq!(scene.schedule().state(), ScheduleState::Armed);
    assert_eq!(scene.container_state(), ContainerState::Active);

    assert_eq!(scene.tick_spawn_timer(Duration::from_secs(4)), 0);
    assert_eq!(scene.tick_spawn_timer(Duration::from_secs(1)), 1);
    assert_eq!(scene.tick_spawn_timer(Duration::from_secs(10)), 2);
    assert_eq!(scene.objects().len(), 4);
    assert_eq!(scene.stats().spawned, 4);

    // Every object has a proxy, plus the container's
    assert_eq!(scene.proxies().len(), 5);
}

#[test]
fn test_failed_object_prototype_never_spawns() {
    let gateway = ManualGateway::new().with_prototype("cesto.glb", basket());
    let mut scene = Scene::new(config(), gateway, MessageLog::new()).unwrap();

    let ticket = scene.gateway().pending_ticket("apple.glb").unwrap();
    scene
        .gateway_mut()
        .resolve(ticket, Err(LoadError::NotFound("apple.glb".into())));
    run(&mut scene, 1);

    assert_eq!(scene.schedule().state(), ScheduleState::Disarmed);
    assert_eq!(scene.tick_spawn_timer(Duration::from_secs(60)), 0);
    assert!(scene.spawn_object().is_none());
    assert!(scene.objects().is_empty());
    // The container is unaffected
    assert_eq!(scene.container_state(), ContainerState::Active);
}

#[test]
fn test_container_single_flight() {
    let gateway = ManualGateway::new().with_prototype("apple.glb", apple());
    let mut scene = Scene::new(config(), gateway, MessageLog::new()).unwrap();

    assert!(!scene.request_container());
    assert!(!scene.request_container());
    assert_eq!(scene.container_requests(), 1);

    let ticket = scene.gateway().pending_ticket("cesto.glb").unwrap();
    scene.gateway_mut().reject(ticket, "offline");
    run(&mut scene, 1);
    assert_eq!(scene.container_state(), ContainerState::Idle);

    assert!(scene.request_container());
    assert!(!scene.request_container());
    assert_eq!(scene.container_requests(), 2);

    let ticket = scene.gateway().pending_ticket("cesto.glb").unwrap();
    scene.gateway_mut().resolve(ticket, Ok(basket()));
    run(&mut scene, 1);
    assert_eq!(scene.container_state(), ContainerState::Active);
    assert!(!scene.request_container());
}

#[test]
fn test_container_settles_on_ground() {
    let mut scene = stocked_scene();
    run(&mut scene, 180);

    let container = scene.container().unwrap();
    assert_relative_eq!(container.geometry.base_radius, 4.0);
    let [x, y, z] = scene.world().get_body_position(container.tracked.body).unwrap();
    assert!(x.abs() < 0.1 && (z + 16.0).abs() < 0.1);
    assert!((y + 3.0).abs() < 0.15, "container should rest on the ground, got y = {y}");
}

#[test]
fn test_threshold_message_shown_once() {
    let mut scene = filled_scene(3);

    assert_eq!(scene.container().unwrap().contained_count(), 3);
    assert!(scene.objects().iter().all(|o| o.in_basket()));
    assert_eq!(scene.messages().shown, vec!["Carry the basket to the sun".to_string()]);
    assert!(scene.messages().is_visible());

    let fourth = scene.spawn_object().unwrap();
    drop_into_basket(&mut scene, fourth, 0.0, 1.5);
    run(&mut scene, 120);

    assert_eq!(scene.container().unwrap().contained_count(), 4);
    assert_eq!(scene.messages().show_count(), 1);
}

#[test]
fn test_containment_counts_each_object_once() {
    let mut scene = filled_scene(2);
    assert_eq!(scene.container().unwrap().contained_count(), 2);
    assert_eq!(scene.stats().contained, 2);

    // Lift and drop the same objects again
    let bodies: Vec<_> = scene.objects().iter().map(|o| o.body).collect();
    for (body, dx) in bodies.into_iter().zip([-1.0, 1.0]) {
        drop_into_basket(&mut scene, body, dx, 0.0);
    }
    run(&mut scene, 120);

    assert_eq!(scene.container().unwrap().contained_count(), 2);
    assert_eq!(scene.messages().show_count(), 0);
}

#[test]
fn test_object_outside_is_not_counted() {
    let mut scene = stocked_scene();
    run(&mut scene, 90);

    // Lands beside the container, outside the wall ring
    let body = scene.objects()[0].body;
    let center = scene.world().get_body_position(scene.container().unwrap().tracked.body).unwrap();
    place(&mut scene, body, center[0] + 6.0, -4.0, center[2]);
    run(&mut scene, 120);

    assert_eq!(scene.container().unwrap().contained_count(), 0);
    assert!(!scene.objects()[0].in_basket());
}

#[test]
fn test_delivery_needs_threshold() {
    let mut scene = filled_scene(2);
    let body = scene.container().unwrap().tracked.body;
    place(&mut scene, body, 0.0, -3.0, -50.0);

    let report = scene.frame(DT, &mut NullSurface);
    assert!(!report.delivered);
    assert_eq!(scene.container_state(), ContainerState::Active);
}

#[test]
fn test_delivery_needs_proximity() {
    let mut scene = filled_scene(3);
    let body = scene.container().unwrap().tracked.body;
    place(&mut scene, body, 2.0, -3.0, -50.0);

    let report = scene.frame(DT, &mut NullSurface);
    assert!(!report.delivered);
    assert_eq!(scene.stats().deliveries, 0);
}

#[test]
fn test_delivery_resets_round() {
    let mut scene = filled_scene(3);
    let before = scene.illumination();
    let old_container = scene.container().unwrap().tracked.body;
    let old_visual = scene.container().unwrap().tracked.visual;
    place(&mut scene, old_container, 0.0, -3.0, -50.0);

    let report = scene.frame(DT, &mut NullSurface);
    assert!(report.delivered);

    assert!(scene.objects().is_empty());
    assert!(!scene.world().contains_body(old_container));
    assert!(!scene.proxies().contains(old_visual));
    assert!(scene.proxies().is_empty());
    assert_eq!(scene.container_state(), ContainerState::Loading);
    assert_eq!(scene.container_requests(), 2);

    let after = scene.illumination();
    assert_relative_eq!(after.light_intensity, before.light_intensity + 1.0);
    assert_relative_eq!(after.emissive_intensity, before.emissive_intensity + 1.0);
    assert!(!scene.messages().is_visible());
    assert_eq!(scene.stats().deliveries, 1);

    // The replacement arrives on the next poll with a fresh count
    run(&mut scene, 1);
    let replacement = scene.container().unwrap();
    assert_ne!(replacement.tracked.body, old_container);
    assert_eq!(replacement.contained_count(), 0);
    assert!(!replacement.message_shown);
}

#[test]
fn test_pointer_drag_pulls_object() {
    let mut scene = stocked_scene();
    run(&mut scene, 1);
    let body = scene.objects()[0].body;

    // Straight ahead of the camera, in the middle of the view
    place(&mut scene, body, 0.0, 2.0, 0.0);
    scene.mirror_transforms();

    scene.handle_input(&InputEvent::MouseDown { x: 640.0, y: 360.0 });
    match scene.controller().state() {
        DragState::Dragging(target) => {
            assert_eq!(target.body, body);
            assert!(!target.is_container);
            assert_relative_eq!(target.distance, 10.0, epsilon = 1e-3);
        }
        DragState::Idle => panic!("expected a drag on the object"),
    }

    scene.handle_input(&InputEvent::MouseMove { x: 900.0, y: 360.0 });
    run(&mut scene, 1);
    let [vx, _, _] = scene.world().get_body_linear_velocity(body).unwrap();
    assert!(vx > 0.0, "drag should pull the object right, got vx = {vx}");

    scene.handle_input(&InputEvent::MouseUp);
    assert!(!scene.controller().is_dragging());
}

/// Lift the settled container into view, grab it at the screen centre and
/// pull right for one frame. Returns the container's x velocity.
fn container_pull(multiplier: f32) -> f32 {
    let mut config = config();
    config.interaction.container_drag_multiplier = multiplier;
    let mut scene = stocked_scene_with(config);
    run(&mut scene, 90);

    let body = scene.container().unwrap().tracked.body;
    place(&mut scene, body, 0.0, 2.0, -2.0);
    scene.mirror_transforms();

    scene.handle_input(&InputEvent::MouseDown { x: 640.0, y: 360.0 });
    match scene.controller().state() {
        DragState::Dragging(target) => {
            assert_eq!(target.body, body);
            assert!(target.is_container);
            assert_relative_eq!(target.distance, 12.0, epsilon = 1e-3);
        }
        DragState::Idle => panic!("expected a drag on the container"),
    }

    scene.handle_input(&InputEvent::MouseMove { x: 900.0, y: 360.0 });
    run(&mut scene, 1);
    scene.world().get_body_linear_velocity(body).unwrap()[0]
}

#[test]
fn test_container_drag_is_doubled() {
    let single = container_pull(1.0);
    let doubled = container_pull(2.0);

    assert!(single > 0.0, "drag should pull the container right, got vx = {single}");
    assert_relative_eq!(doubled, 2.0 * single, max_relative = 0.05);
}

#[test]
fn test_drag_ends_when_body_vanishes() {
    let mut scene = stocked_scene();
    run(&mut scene, 1);
    let body = scene.objects()[0].body;
    place(&mut scene, body, 0.0, 2.0, 0.0);
    scene.mirror_transforms();

    scene.handle_input(&InputEvent::MouseDown { x: 640.0, y: 360.0 });
    assert!(scene.controller().is_dragging());

    scene.world_mut().remove_rigid_body(body);
    scene.handle_input(&InputEvent::MouseMove { x: 900.0, y: 360.0 });
    assert!(!scene.controller().is_dragging());
}

#[test]
fn test_touch_uses_first_point() {
    let mut scene = stocked_scene();
    run(&mut scene, 1);
    let body = scene.objects()[0].body;
    place(&mut scene, body, 0.0, 2.0, 0.0);
    scene.mirror_transforms();

    scene.handle_input(&InputEvent::TouchStart {
        touches: vec![glam::Vec2::new(640.0, 360.0), glam::Vec2::new(0.0, 0.0)],
    });
    assert!(scene.controller().is_dragging());
    scene.handle_input(&InputEvent::TouchEnd);
    assert!(!scene.controller().is_dragging());
}

#[test]
fn test_miss_does_not_drag() {
    let mut scene = stocked_scene();
    run(&mut scene, 1);
    scene.handle_input(&InputEvent::MouseDown { x: 5.0, y: 5.0 });
    assert!(!scene.controller().is_dragging());
}

#[test]
fn test_keyboard_nudges_container() {
    let mut scene = stocked_scene();
    run(&mut scene, 60);
    let body = scene.container().unwrap().tracked.body;
    let [x, y, z] = scene.world().get_body_position(body).unwrap();

    scene.handle_input(&InputEvent::KeyDown(Key::ArrowLeft));
    scene.handle_input(&InputEvent::KeyDown(Key::ArrowUp));
    let [nx, ny, nz] = scene.world().get_body_position(body).unwrap();
    assert_relative_eq!(nx, x - 0.2, epsilon = 1e-5);
    assert_relative_eq!(ny, y, epsilon = 1e-5);
    assert_relative_eq!(nz, z - 0.2, epsilon = 1e-5);
    assert_eq!(scene.world().get_body_linear_velocity(body).unwrap(), [0.0, 0.0, 0.0]);

    scene.handle_input(&InputEvent::KeyDown(Key::Other));
    assert_eq!(scene.world().get_body_position(body).unwrap(), [nx, ny, nz]);
}

#[test]
fn test_nudge_without_container_is_ignored() {
    let mut scene = Scene::new(config(), ManualGateway::new(), MessageLog::new()).unwrap();
    scene.handle_input(&InputEvent::KeyDown(Key::Space));
    assert_eq!(scene.world().body_count(), 1);
}

#[test]
fn test_resize_ignores_zero() {
    let mut scene = stocked_scene();
    scene.resize(0.0, 0.0);
    scene.resize(800.0, 600.0);
    let projection = scene.camera().projection_matrix();
    assert_relative_eq!(projection.x_axis.x * 800.0 / 600.0, projection.y_axis.y, epsilon = 1e-4);
}

#[derive(Default)]
struct Recorder {
    frames: Vec<FrameSnapshot>,
}

impl RenderSurface for Recorder {
    fn render(&mut self, frame: &FrameSnapshot) {
        self.frames.push(frame.clone());
    }
}

#[test]
fn test_frame_mirrors_transforms() {
    let mut scene = stocked_scene();
    let mut recorder = Recorder::default();
    for _ in 0..30 {
        scene.frame(DT, &mut recorder);
    }

    assert_eq!(recorder.frames.len(), 30);
    let last = recorder.frames.last().unwrap();
    assert_eq!(last.frame, 30);
    assert_eq!(last.sun_position, [0.0, -4.0, -50.0]);
    assert_eq!(last.proxies.len(), 2);

    // The apple has fallen from its spawn height and its proxy followed
    let object = scene.objects()[0].clone();
    let proxy = last.proxies.iter().find(|p| p.id == object.visual).unwrap();
    let body = scene.world().get_body_position(object.body).unwrap();
    assert!(proxy.position[1] < 10.0);
    assert_eq!(proxy.position, body);
}

#[test]
fn test_shutdown_releases_everything() {
    let mut scene = filled_scene(3);
    scene.handle_input(&InputEvent::KeyDown(Key::ArrowRight));
    assert!(scene.proxies().live_resources() > 0);

    scene.shutdown();

    assert!(scene.is_shut_down());
    assert_eq!(scene.world().body_count(), 0);
    assert_eq!(scene.world().collider_count(), 0);
    assert!(scene.proxies().is_empty());
    assert_eq!(scene.proxies().live_resources(), 0);
    assert!(scene.objects().is_empty());
    assert_eq!(scene.container_state(), ContainerState::Removed);
    assert!(!scene.controller().is_attached());

    // Nothing happens after teardown
    assert_eq!(scene.tick_spawn_timer(Duration::from_secs(60)), 0);
    assert!(scene.spawn_object().is_none());
    assert!(!scene.request_container());
    let report = scene.frame(DT, &mut NullSurface);
    assert_eq!(report.steps, 0);
    assert_eq!(scene.world().body_count(), 0);

    scene.shutdown();
    assert!(scene.is_shut_down());
}

#[test]
fn test_shutdown_after_delivery_releases_everything() {
    let mut scene = filled_scene(3);
    let body = scene.container().unwrap().tracked.body;
    place(&mut scene, body, 0.0, -3.0, -50.0);
    assert!(scene.frame(DT, &mut NullSurface).delivered);

    run(&mut scene, 10);
    assert_eq!(scene.container_state(), ContainerState::Active);
    assert_eq!(scene.tick_spawn_timer(Duration::from_secs(11)), 2);
    assert_eq!(scene.objects().len(), 2);
    assert_eq!(scene.stats().deliveries, 1);

    scene.shutdown();

    assert_eq!(scene.world().body_count(), 0);
    assert_eq!(scene.world().collider_count(), 0);
    assert!(scene.proxies().is_empty());
    assert_eq!(scene.proxies().live_resources(), 0);
    assert!(scene.objects().is_empty());

    assert_eq!(scene.tick_spawn_timer(Duration::from_secs(60)), 0);
    run(&mut scene, 5);
    assert!(scene.objects().is_empty());
    assert_eq!(scene.world().body_count(), 0);
}

#[test]
fn test_late_completion_after_shutdown_is_dropped() {
    let mut scene = Scene::new(config(), ManualGateway::new(), MessageLog::new()).unwrap();
    let apple_ticket = scene.gateway().pending_ticket("apple.glb").unwrap();
    let basket_ticket = scene.gateway().pending_ticket("cesto.glb").unwrap();

    scene.shutdown();
    scene.gateway_mut().resolve(apple_ticket, Ok(apple()));
    scene.gateway_mut().resolve(basket_ticket, Ok(basket()));
    assert_eq!(scene.poll_assets(), 2);

    assert!(scene.objects().is_empty());
    assert!(scene.proxies().is_empty());
    assert_eq!(scene.world().body_count(), 0);
    assert_eq!(scene.container_state(), ContainerState::Removed);
}
