//! Visual proxy registry
//!
//! A proxy is one renderable instance of a [`VisualPrototype`], paired with
//! a rigid body for its whole life. Every mesh node of an instance holds a
//! geometry and a material resource; the registry counts them so teardown
//! can be checked.

use crate::camera::Ray;
use glam::{Mat4, Quat, Vec3};
use orchard_asset::{Bounds, VisualPrototype};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resources held by each mesh node (geometry + material)
const RESOURCES_PER_MESH: usize = 2;

/// Identifier of a proxy in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProxyId(pub u64);

/// A renderable instance mirrored from a body
#[derive(Debug, Clone)]
pub struct VisualProxy {
    pub id: ProxyId,
    pub prototype: VisualPrototype,
    pub scale: f32,
    pub position: Vec3,
    pub rotation: Quat,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl VisualProxy {
    /// Instance-to-world transform
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), self.rotation, self.position)
    }

    /// World-space bounds of one mesh node
    pub fn node_bounds(&self, node: usize) -> Option<Bounds> {
        let local = self.prototype.nodes.get(node)?.bounds?;
        Some(local.transformed(&self.world_matrix()))
    }

    fn resource_count(&self) -> usize {
        self.prototype.mesh_count() * RESOURCES_PER_MESH
    }
}

/// Result of a successful pick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    /// Proxy owning the hit
    pub proxy: ProxyId,
    /// Mesh node that was hit
    pub node: usize,
    /// Root of the hit node's hierarchy
    pub root: usize,
    /// Distance along the ray
    pub distance: f32,
}

/// All live visual proxies
#[derive(Debug, Default)]
pub struct ProxyRegistry {
    proxies: BTreeMap<ProxyId, VisualProxy>,
    next_id: u64,
    live_resources: usize,
    released_resources: usize,
}

impl ProxyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instance a prototype; shadows are cast and received
    pub fn instantiate(&mut self, prototype: &VisualPrototype, scale: f32, position: Vec3) -> ProxyId {
        self.next_id += 1;
        let id = ProxyId(self.next_id);
        let proxy = VisualProxy {
            id,
            prototype: prototype.clone(),
            scale,
            position,
            rotation: Quat::IDENTITY,
            cast_shadow: true,
            receive_shadow: true,
        };
        self.live_resources += proxy.resource_count();
        self.proxies.insert(id, proxy);
        id
    }

    pub fn get(&self, id: ProxyId) -> Option<&VisualProxy> {
        self.proxies.get(&id)
    }

    pub fn contains(&self, id: ProxyId) -> bool {
        self.proxies.contains_key(&id)
    }

    /// Copy a body transform onto a proxy. Unknown ids are ignored.
    pub fn set_transform(&mut self, id: ProxyId, position: Vec3, rotation: Quat) {
        if let Some(proxy) = self.proxies.get_mut(&id) {
            proxy.position = position;
            proxy.rotation = rotation;
        }
    }

    /// Remove a proxy and release its resources. Returns false if absent.
    pub fn release(&mut self, id: ProxyId) -> bool {
        match self.proxies.remove(&id) {
            Some(proxy) => {
                let count = proxy.resource_count();
                self.live_resources -= count;
                self.released_resources += count;
                true
            }
            None => false,
        }
    }

    /// Release every proxy
    pub fn release_all(&mut self) -> usize {
        let ids: Vec<_> = self.proxies.keys().copied().collect();
        ids.into_iter().filter(|id| self.release(*id)).count()
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    /// Geometry and material resources currently held
    pub fn live_resources(&self) -> usize {
        self.live_resources
    }

    /// Resources released since creation
    pub fn released_resources(&self) -> usize {
        self.released_resources
    }

    pub fn iter(&self) -> impl Iterator<Item = &VisualProxy> {
        self.proxies.values()
    }

    /// Nearest mesh hit among `candidates`, resolved to its owning proxy
    pub fn pick(&self, ray: &Ray, candidates: impl IntoIterator<Item = ProxyId>) -> Option<PickHit> {
        let mut best: Option<PickHit> = None;

        for id in candidates {
            let Some(proxy) = self.proxies.get(&id) else {
                continue;
            };

            for (node, _) in proxy.prototype.nodes.iter().enumerate().filter(|(_, n)| n.has_mesh()) {
                let Some(bounds) = proxy.node_bounds(node) else {
                    continue;
                };
                let Some(distance) = bounds.ray_intersection(ray.origin, ray.direction) else {
                    continue;
                };

                if best.map_or(true, |b| distance < b.distance) {
                    best = Some(PickHit {
                        proxy: id,
                        node,
                        root: proxy.prototype.root_of(node),
                        distance,
                    });
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orchard_asset::PrototypeNode;

    fn cube() -> VisualPrototype {
        VisualPrototype::from_bounds("cube", Bounds::from_size(1.0, 1.0, 1.0))
    }

    fn nested() -> VisualPrototype {
        let identity = Mat4::IDENTITY.to_cols_array_2d();
        VisualPrototype::new(
            "basket",
            vec![
                PrototypeNode { name: "root".into(), parent: None, transform: identity, bounds: None },
                PrototypeNode {
                    name: "weave".into(),
                    parent: Some(0),
                    transform: identity,
                    bounds: Some(Bounds::from_size(2.0, 1.0, 2.0)),
                },
            ],
        )
    }

    #[test]
    fn test_resources_tracked() {
        let mut registry = ProxyRegistry::new();
        let a = registry.instantiate(&cube(), 1.0, Vec3::ZERO);
        let b = registry.instantiate(&nested(), 4.0, Vec3::ZERO);
        assert_eq!(registry.live_resources(), 4);

        assert!(registry.release(a));
        assert!(!registry.release(a));
        assert_eq!(registry.live_resources(), 2);

        assert_eq!(registry.release_all(), 1);
        assert!(!registry.contains(b));
        assert_eq!(registry.live_resources(), 0);
        assert_eq!(registry.released_resources(), 4);
    }

    #[test]
    fn test_pick_nearest_owner() {
        let mut registry = ProxyRegistry::new();
        let near = registry.instantiate(&cube(), 1.0, Vec3::new(0.0, 0.0, -2.0));
        let far = registry.instantiate(&nested(), 2.0, Vec3::new(0.0, 0.0, -10.0));

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let hit = registry.pick(&ray, [far, near]).unwrap();
        assert_eq!(hit.proxy, near);

        let hit = registry.pick(&ray, [far]).unwrap();
        assert_eq!(hit.proxy, far);
        assert_eq!(hit.node, 1);
        assert_eq!(hit.root, 0);
    }

    #[test]
    fn test_pick_uses_current_transform() {
        let mut registry = ProxyRegistry::new();
        let id = registry.instantiate(&cube(), 1.0, Vec3::new(0.0, 0.0, -5.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!(registry.pick(&ray, [id]).is_some());

        registry.set_transform(id, Vec3::new(10.0, 0.0, -5.0), Quat::IDENTITY);
        assert!(registry.pick(&ray, [id]).is_none());
    }
}
