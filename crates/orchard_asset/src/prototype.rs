//! Visual prototypes: the decoded, render-agnostic shape of an asset

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Default for Bounds {
    fn default() -> Self {
        Self::empty()
    }
}

impl Bounds {
    /// Create from corners
    pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self { min, max }
    }

    /// Box centered on the origin with the given full size
    pub fn from_size(width: f32, height: f32, depth: f32) -> Self {
        Self {
            min: [-width / 2.0, -height / 2.0, -depth / 2.0],
            max: [width / 2.0, height / 2.0, depth / 2.0],
        }
    }

    /// Inverted box that any `grow` replaces
    pub fn empty() -> Self {
        Self {
            min: [f32::MAX; 3],
            max: [f32::MIN; 3],
        }
    }

    /// Whether min <= max on every axis
    pub fn is_valid(&self) -> bool {
        (0..3).all(|i| self.min[i] <= self.max[i])
    }

    /// Full extent along each axis
    pub fn size(&self) -> Vec3 {
        Vec3::from(self.max) - Vec3::from(self.min)
    }

    /// Center point
    pub fn center(&self) -> Vec3 {
        (Vec3::from(self.max) + Vec3::from(self.min)) * 0.5
    }

    /// Extend to include a point
    pub fn grow(&mut self, point: Vec3) {
        for i in 0..3 {
            self.min[i] = self.min[i].min(point[i]);
            self.max[i] = self.max[i].max(point[i]);
        }
    }

    /// Smallest box containing both
    pub fn union(&self, other: &Bounds) -> Bounds {
        let mut out = *self;
        for i in 0..3 {
            out.min[i] = out.min[i].min(other.min[i]);
            out.max[i] = out.max[i].max(other.max[i]);
        }
        out
    }

    /// Box around the eight transformed corners
    pub fn transformed(&self, matrix: &Mat4) -> Bounds {
        let mut out = Bounds::empty();
        for corner in 0..8 {
            let p = Vec3::new(
                if corner & 1 == 0 { self.min[0] } else { self.max[0] },
                if corner & 2 == 0 { self.min[1] } else { self.max[1] },
                if corner & 4 == 0 { self.min[2] } else { self.max[2] },
            );
            out.grow(matrix.transform_point3(p));
        }
        out
    }

    /// Uniformly scaled about the origin
    pub fn scaled(&self, scale: f32) -> Bounds {
        let a = Vec3::from(self.min) * scale;
        let b = Vec3::from(self.max) * scale;
        Bounds {
            min: a.min(b).to_array(),
            max: a.max(b).to_array(),
        }
    }

    /// Slab test. Returns the entry distance along the ray, if any.
    pub fn ray_intersection(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let inv = direction.recip();
        let t1 = (Vec3::from(self.min) - origin) * inv;
        let t2 = (Vec3::from(self.max) - origin) * inv;

        let t_min = t1.min(t2).max_element();
        let t_max = t1.max(t2).min_element();

        if t_max < 0.0 || t_min > t_max {
            None
        } else {
            Some(t_min.max(0.0))
        }
    }
}

/// One node of a prototype's hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct PrototypeNode {
    pub name: String,
    /// Index of the parent node; roots have none
    pub parent: Option<usize>,
    /// Local transform matrix (column-major)
    pub transform: [[f32; 4]; 4],
    /// Mesh bounds in prototype space; `None` for nodes without a mesh
    pub bounds: Option<Bounds>,
}

impl PrototypeNode {
    pub fn has_mesh(&self) -> bool {
        self.bounds.is_some()
    }
}

/// A decoded asset ready to be instanced
#[derive(Debug, Clone, PartialEq)]
pub struct VisualPrototype {
    pub name: String,
    pub nodes: Vec<PrototypeNode>,
    bounds: Bounds,
}

impl VisualPrototype {
    /// Build from a node list; overall bounds are the union of mesh bounds
    pub fn new(name: impl Into<String>, nodes: Vec<PrototypeNode>) -> Self {
        let bounds = nodes
            .iter()
            .filter_map(|n| n.bounds)
            .fold(Bounds::empty(), |acc, b| acc.union(&b));

        Self {
            name: name.into(),
            nodes,
            bounds,
        }
    }

    /// Single-mesh prototype with the given bounds
    pub fn from_bounds(name: impl Into<String>, bounds: Bounds) -> Self {
        let name = name.into();
        let node = PrototypeNode {
            name: name.clone(),
            parent: None,
            transform: Mat4::IDENTITY.to_cols_array_2d(),
            bounds: Some(bounds),
        };
        Self::new(name, vec![node])
    }

    /// Bounds of all meshes
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Bounds after a uniform scale
    pub fn scaled_bounds(&self, scale: f32) -> Bounds {
        self.bounds.scaled(scale)
    }

    /// Whether any node carries geometry
    pub fn has_geometry(&self) -> bool {
        self.nodes.iter().any(PrototypeNode::has_mesh)
    }

    /// Number of nodes with a mesh
    pub fn mesh_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.has_mesh()).count()
    }

    /// Walk parent links up to the root of `node`
    pub fn root_of(&self, mut node: usize) -> usize {
        while let Some(parent) = self.nodes.get(node).and_then(|n| n.parent) {
            node = parent;
        }
        node
    }
}
