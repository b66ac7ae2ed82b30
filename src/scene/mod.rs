//! In-memory scene model.
//!
//! [`Scene`] is the unit the pipeline operates on: an ordered list of meshes plus
//! the materials they reference. Vertex attributes are stored structure-of-arrays
//! per mesh; the normal and UV channels are optional and, when present, run
//! parallel to the position array.

pub mod stats;

pub use stats::{BoundingBox, MeshStats, SceneStats};

use glam::Vec3;

/// A polygon face: indices into the owning mesh's vertex buffer.
///
/// Arity is kept open so that upstream data violating the triangles-only
/// contract can be detected and reported instead of silently mangled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
    /// Vertex indices, in winding order.
    pub indices: Vec<u32>,
}

impl Face {
    /// Create a triangle face.
    pub fn triangle(a: u32, b: u32, c: u32) -> Self {
        Self {
            indices: vec![a, b, c],
        }
    }

    /// The face's indices as a triangle, or `None` if the arity is wrong.
    pub fn as_triangle(&self) -> Option<[u32; 3]> {
        match self.indices[..] {
            [a, b, c] => Some([a, b, c]),
            _ => None,
        }
    }
}

/// A single mesh: vertex channels, faces, and an optional material reference.
///
/// Mesh identity is positional — its index in [`Scene::meshes`] is what ties it
/// to an atlas tile during consolidation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Mesh name, as found in the source file. May be empty.
    pub name: String,
    /// Vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals, parallel to `positions` when present.
    pub normals: Option<Vec<[f32; 3]>>,
    /// Texture coordinates, parallel to `positions` when present.
    pub uvs: Option<Vec<[f32; 2]>>,
    /// Faces indexing into this mesh's vertex buffer.
    pub faces: Vec<Face>,
    /// Index into [`Scene::materials`], if the mesh has a material.
    pub material: Option<usize>,
}

impl Mesh {
    /// Create a named empty mesh.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Number of vertices in this mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of faces in this mesh.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Returns `true` if this mesh has a texture-coordinate channel.
    pub fn has_uvs(&self) -> bool {
        self.uvs.is_some()
    }

    /// Returns `true` if this mesh has a normal channel.
    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    /// Returns `true` if this mesh contains no vertices.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// A material with a single diffuse-texture slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    /// Material name.
    pub name: String,
    /// Path of the base-color image, relative to the scene's source directory.
    pub diffuse_texture: Option<String>,
}

impl Material {
    /// Create a named material without a texture.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            diffuse_texture: None,
        }
    }

    /// Builder-style diffuse texture assignment.
    pub fn with_diffuse_texture(mut self, path: impl Into<String>) -> Self {
        self.diffuse_texture = Some(path.into());
        self
    }
}

/// A scene: ordered meshes plus the materials they reference.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// Meshes in source order. Order is load-bearing for consolidation.
    pub meshes: Vec<Mesh>,
    /// Materials referenced by the meshes.
    pub materials: Vec<Material>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total vertex count across all meshes.
    pub fn total_vertices(&self) -> usize {
        self.meshes.iter().map(Mesh::vertex_count).sum()
    }

    /// Total face count across all meshes.
    pub fn total_faces(&self) -> usize {
        self.meshes.iter().map(Mesh::face_count).sum()
    }

    /// The material referenced by a mesh, if any.
    pub fn material_of(&self, mesh: &Mesh) -> Option<&Material> {
        mesh.material.and_then(|i| self.materials.get(i))
    }

    /// Uniformly scale every vertex position in the scene.
    pub fn scale(&mut self, factor: f32) {
        for mesh in &mut self.meshes {
            for position in &mut mesh.positions {
                *position = (Vec3::from_array(*position) * factor).to_array();
            }
        }
    }
}
