//! glTF/GLB loader producing visual prototypes
//!
//! Only the node hierarchy and per-primitive bounding boxes are kept. Vertex
//! data stays with the renderer.

use crate::error::LoadError;
use crate::prototype::{Bounds, PrototypeNode, VisualPrototype};
use glam::Mat4;

/// Decoder for glTF/GLB files
#[derive(Debug, Default, Clone)]
pub struct GlbPrototypeLoader;

impl GlbPrototypeLoader {
    pub fn new() -> Self {
        Self
    }

    /// Whether the identifier looks like something this loader handles
    pub fn supports(identifier: &str) -> bool {
        let lower = identifier.to_ascii_lowercase();
        lower.ends_with(".glb") || lower.ends_with(".gltf")
    }

    /// Decode from file bytes (GLB or glTF JSON with embedded buffers)
    pub fn load(&self, data: &[u8], identifier: &str) -> Result<VisualPrototype, LoadError> {
        let (document, _buffers, _images) =
            gltf::import_slice(data).map_err(|e| LoadError::Parse {
                identifier: identifier.to_string(),
                reason: e.to_string(),
            })?;

        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or_else(|| LoadError::Empty(identifier.to_string()))?;

        let mut nodes = Vec::new();
        for root in scene.nodes() {
            Self::visit(&root, None, Mat4::IDENTITY, &mut nodes);
        }

        let prototype = VisualPrototype::new(identifier, nodes);
        if !prototype.has_geometry() {
            return Err(LoadError::Empty(identifier.to_string()));
        }

        log::debug!(
            "Decoded {} ({} nodes, {} meshes)",
            identifier,
            prototype.nodes.len(),
            prototype.mesh_count()
        );

        Ok(prototype)
    }

    fn visit(
        node: &gltf::Node,
        parent: Option<usize>,
        parent_world: Mat4,
        out: &mut Vec<PrototypeNode>,
    ) {
        let local = node.transform().matrix();
        let world = parent_world * Mat4::from_cols_array_2d(&local);

        let bounds = node.mesh().and_then(|mesh| {
            mesh.primitives()
                .map(|primitive| {
                    let bb = primitive.bounding_box();
                    Bounds::new(bb.min, bb.max).transformed(&world)
                })
                .reduce(|a, b| a.union(&b))
        });

        let index = out.len();
        out.push(PrototypeNode {
            name: node.name().unwrap_or("").to_string(),
            parent,
            transform: local,
            bounds,
        });

        for child in node.children() {
            Self::visit(&child, Some(index), world, out);
        }
    }
}
