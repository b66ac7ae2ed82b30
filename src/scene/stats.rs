//! Per-mesh statistics: bounding boxes, volumes, channel summaries.

use crate::error::{ConsolidateError, Result};
use crate::scene::{Mesh, Scene};
use glam::Vec3;
use std::fmt;

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl BoundingBox {
    pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self { min, max }
    }

    /// Bounding box of a point cloud. `None` when there are no points.
    pub fn from_points(points: impl Iterator<Item = [f32; 3]>) -> Option<Self> {
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        let mut has_points = false;

        for p in points {
            has_points = true;
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }

        has_points.then_some(Self { min, max })
    }

    /// Extent along each axis.
    pub fn dimensions(&self) -> [f32; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }
}

/// Signed volume of the tetrahedron spanned by a triangle and the origin.
fn face_volume(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    a.dot(b.cross(c)) / 6.0
}

/// Statistics for one mesh.
#[derive(Debug, Clone)]
pub struct MeshStats {
    pub name: String,
    pub vertex_count: usize,
    pub face_count: usize,
    /// `None` for meshes without vertices.
    pub bounds: Option<BoundingBox>,
    /// Signed volume; meaningful for closed meshes with consistent winding.
    pub volume: f32,
    pub has_uvs: bool,
    pub has_normals: bool,
}

impl MeshStats {
    /// Collect statistics for a single mesh.
    ///
    /// Fails on non-triangular faces and out-of-range indices, the same
    /// contract the combiner enforces.
    pub fn collect(mesh_index: usize, mesh: &Mesh) -> Result<Self> {
        let mut volume = 0.0;
        for (face_index, face) in mesh.faces.iter().enumerate() {
            let [a, b, c] =
                face.as_triangle()
                    .ok_or_else(|| ConsolidateError::NonTriangleFace {
                        mesh: mesh_index,
                        face: face_index,
                        arity: face.indices.len(),
                    })?;
            for index in [a, b, c] {
                if index as usize >= mesh.positions.len() {
                    return Err(ConsolidateError::FaceIndexOutOfRange {
                        mesh: mesh_index,
                        face: face_index,
                        index,
                        vertex_count: mesh.positions.len(),
                    });
                }
            }
            volume += face_volume(
                Vec3::from_array(mesh.positions[a as usize]),
                Vec3::from_array(mesh.positions[b as usize]),
                Vec3::from_array(mesh.positions[c as usize]),
            );
        }

        Ok(Self {
            name: mesh.name.clone(),
            vertex_count: mesh.vertex_count(),
            face_count: mesh.face_count(),
            bounds: BoundingBox::from_points(mesh.positions.iter().copied()),
            volume,
            has_uvs: mesh.has_uvs(),
            has_normals: mesh.has_normals(),
        })
    }
}

impl fmt::Display for MeshStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mesh - {}", self.name)?;
        writeln!(f, "  {} faces", self.face_count)?;
        writeln!(f, "  {} vertices", self.vertex_count)?;
        if let Some(bb) = &self.bounds {
            let [dx, dy, dz] = bb.dimensions();
            writeln!(
                f,
                "  BBox ({}, {}, {})  ({}, {}, {})",
                bb.min[0], bb.min[1], bb.min[2], bb.max[0], bb.max[1], bb.max[2]
            )?;
            writeln!(f, "  X {}", dx)?;
            writeln!(f, "  Y {}", dy)?;
            writeln!(f, "  Z {}", dz)?;
        }
        writeln!(f, "  Volume {} ({})", self.volume, self.volume / 1000.0)?;
        writeln!(f, "  UV channels: {}", u8::from(self.has_uvs))?;
        write!(f, "  Normal channels: {}", u8::from(self.has_normals))
    }
}

/// Statistics for a whole scene.
#[derive(Debug, Clone)]
pub struct SceneStats {
    pub meshes: Vec<MeshStats>,
}

impl SceneStats {
    /// Collect statistics for every mesh in the scene.
    pub fn collect(scene: &Scene) -> Result<Self> {
        let meshes = scene
            .meshes
            .iter()
            .enumerate()
            .map(|(i, mesh)| MeshStats::collect(i, mesh))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { meshes })
    }

    pub fn total_vertices(&self) -> usize {
        self.meshes.iter().map(|m| m.vertex_count).sum()
    }

    pub fn total_faces(&self) -> usize {
        self.meshes.iter().map(|m| m.face_count).sum()
    }
}

impl fmt::Display for SceneStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Scene: {} meshes, {} vertices, {} faces",
            self.meshes.len(),
            self.total_vertices(),
            self.total_faces()
        )?;
        for (i, mesh) in self.meshes.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for line in mesh.to_string().lines() {
                writeln!(f, "  {}", line)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Face;

    /// Unit cube as 12 triangles, CCW outward winding.
    fn unit_cube() -> Mesh {
        let mut mesh = Mesh::new("cube");
        mesh.positions = vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [0.0, 1.0, 1.0],
        ];
        let quads: [[u32; 4]; 6] = [
            [3, 2, 1, 0], // -z
            [4, 5, 6, 7], // +z
            [0, 1, 5, 4], // -y
            [2, 3, 7, 6], // +y
            [1, 2, 6, 5], // +x
            [3, 0, 4, 7], // -x
        ];
        for [a, b, c, d] in quads {
            mesh.faces.push(Face::triangle(a, b, c));
            mesh.faces.push(Face::triangle(a, c, d));
        }
        mesh
    }

    #[test]
    fn test_cube_stats() {
        let stats = MeshStats::collect(0, &unit_cube()).unwrap();
        assert_eq!(stats.vertex_count, 8);
        assert_eq!(stats.face_count, 12);
        assert!((stats.volume.abs() - 1.0).abs() < 1e-5);

        let bb = stats.bounds.unwrap();
        assert_eq!(bb.min, [0.0, 0.0, 0.0]);
        assert_eq!(bb.max, [1.0, 1.0, 1.0]);
        assert_eq!(bb.dimensions(), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_empty_mesh_has_no_bounds() {
        let stats = MeshStats::collect(0, &Mesh::new("empty")).unwrap();
        assert!(stats.bounds.is_none());
        assert_eq!(stats.volume, 0.0);
    }

    #[test]
    fn test_non_triangle_face_is_fatal() {
        let mut mesh = unit_cube();
        mesh.faces.push(Face {
            indices: vec![0, 1, 2, 3],
        });

        let err = MeshStats::collect(0, &mesh).unwrap_err();
        assert!(matches!(
            err,
            ConsolidateError::NonTriangleFace { face: 12, arity: 4, .. }
        ));
    }

    #[test]
    fn test_scene_stats_totals() {
        let mut scene = Scene::new();
        scene.meshes.push(unit_cube());
        scene.meshes.push(unit_cube());

        let stats = SceneStats::collect(&scene).unwrap();
        assert_eq!(stats.total_vertices(), 16);
        assert_eq!(stats.total_faces(), 24);
        assert!(stats.to_string().contains("Mesh - cube"));
    }
}
