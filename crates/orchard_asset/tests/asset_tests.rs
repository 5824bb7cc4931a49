//! Integration tests for orchard_asset

use orchard_asset::*;
use std::path::PathBuf;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

#[test]
fn test_server_decodes_fixture() {
    let mut server = PrototypeServer::with_asset_dir(fixtures());
    let ticket = server.request("basket.gltf");

    let done = server.poll();
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].ticket, ticket);

    let proto = done[0].result.as_ref().expect("fixture should decode");
    assert_eq!(proto.mesh_count(), 1);

    let size = proto.scaled_bounds(4.0).size();
    assert!((size.x - 16.0).abs() < 1e-4);
    assert!((size.y - 4.0).abs() < 1e-4);
    assert!((size.z - 16.0).abs() < 1e-4);
}

#[test]
fn test_server_caches_decoded_prototypes() {
    let mut server = PrototypeServer::with_asset_dir(fixtures());
    assert!(!server.is_cached("basket.gltf"));

    server.request("basket.gltf");
    server.request("basket.gltf");
    let done = server.poll();

    assert_eq!(done.len(), 2);
    assert!(server.is_cached("basket.gltf"));
    assert_eq!(
        done[0].result.as_ref().ok(),
        done[1].result.as_ref().ok()
    );
}

#[test]
fn test_tickets_are_distinct() {
    let mut server = PrototypeServer::with_asset_dir(fixtures());
    let a = server.request("basket.gltf");
    let b = server.request("apple.glb");
    assert_ne!(a, b);

    let done = server.poll();
    let missing = done.iter().find(|c| c.ticket == b).unwrap();
    assert!(matches!(missing.result, Err(LoadError::NotFound(_))));
}

#[test]
fn test_boxed_gateway_forwards() {
    let proto = VisualPrototype::from_bounds("apple", Bounds::from_size(0.5, 0.5, 0.5));
    let mut gateway: Box<dyn AssetGateway> =
        Box::new(ManualGateway::new().with_prototype("apple.glb", proto));

    gateway.request("apple.glb");
    assert_eq!(gateway.pending_count(), 1);
    assert_eq!(gateway.poll().len(), 1);
}
