//! Mesh consolidation.
//!
//! Combining is two passes. The sizing pass ([`CombinePlan::for_meshes`])
//! validates every face and computes exact buffer sizes and per-mesh vertex
//! offsets; the copy pass ([`combine_with_plan`]) allocates each combined
//! buffer once and fills it. Nothing is allocated before the input has been
//! accepted whole, so a contract violation can never leave a half-built mesh.

use crate::atlas::TileAssignment;
use crate::error::{ConsolidateError, Result};
use crate::scene::{Face, Mesh};

/// Sizing-pass output: validated totals and per-mesh vertex offsets.
#[derive(Debug, Clone)]
pub struct CombinePlan {
    vertex_offsets: Vec<u32>,
    total_vertices: usize,
    total_faces: usize,
    any_uvs: bool,
    all_normals: bool,
}

impl CombinePlan {
    /// Size and validate a mesh list for combining.
    ///
    /// Rejects non-triangular faces, face indices outside their mesh's vertex
    /// buffer, and vertex totals beyond the 32-bit index range — all before
    /// any combined buffer exists.
    pub fn for_meshes(meshes: &[Mesh]) -> Result<Self> {
        let mut offsets = Vec::with_capacity(meshes.len());
        let mut total_vertices: usize = 0;
        let mut total_faces: usize = 0;

        for (mesh_index, mesh) in meshes.iter().enumerate() {
            for (face_index, face) in mesh.faces.iter().enumerate() {
                let [a, b, c] =
                    face.as_triangle()
                        .ok_or_else(|| ConsolidateError::NonTriangleFace {
                            mesh: mesh_index,
                            face: face_index,
                            arity: face.indices.len(),
                        })?;
                for index in [a, b, c] {
                    if index as usize >= mesh.vertex_count() {
                        return Err(ConsolidateError::FaceIndexOutOfRange {
                            mesh: mesh_index,
                            face: face_index,
                            index,
                            vertex_count: mesh.vertex_count(),
                        });
                    }
                }
            }
            offsets.push(total_vertices);
            total_vertices += mesh.vertex_count();
            total_faces += mesh.face_count();
        }

        if total_vertices > u32::MAX as usize {
            return Err(ConsolidateError::CapacityExceeded {
                vertices: total_vertices,
            });
        }

        log::debug!(
            "combine plan: {} meshes, {} vertices, {} faces",
            meshes.len(),
            total_vertices,
            total_faces
        );

        Ok(Self {
            vertex_offsets: offsets.into_iter().map(|o| o as u32).collect(),
            total_vertices,
            total_faces,
            any_uvs: meshes.iter().any(Mesh::has_uvs),
            all_normals: !meshes.is_empty() && meshes.iter().all(Mesh::has_normals),
        })
    }

    /// Total vertex count of the combined mesh.
    pub fn total_vertices(&self) -> usize {
        self.total_vertices
    }

    /// Total face count of the combined mesh.
    pub fn total_faces(&self) -> usize {
        self.total_faces
    }
}

/// Copy pass: fill pre-sized combined buffers from a validated plan.
///
/// Vertices are copied verbatim in mesh order; UVs of tile-assigned meshes are
/// rewritten through `assignment`; face indices are shifted by the owning
/// mesh's vertex offset. Deterministic: identical input yields byte-identical
/// buffers.
pub fn combine_with_plan(
    meshes: &[Mesh],
    assignment: &TileAssignment,
    plan: &CombinePlan,
) -> Mesh {
    let mut combined = Mesh::new("combined");
    combined.positions = Vec::with_capacity(plan.total_vertices);
    combined.faces = Vec::with_capacity(plan.total_faces);
    let mut normals = plan
        .all_normals
        .then(|| Vec::with_capacity(plan.total_vertices));
    let mut uvs = plan
        .any_uvs
        .then(|| Vec::with_capacity(plan.total_vertices));

    for (mesh_index, mesh) in meshes.iter().enumerate() {
        let offset = plan.vertex_offsets[mesh_index];

        combined.positions.extend_from_slice(&mesh.positions);

        if let (Some(dst), Some(src)) = (normals.as_mut(), mesh.normals.as_ref()) {
            dst.extend_from_slice(src);
        }

        if let Some(dst) = uvs.as_mut() {
            match mesh.uvs.as_ref() {
                Some(src) => dst.extend(
                    src.iter()
                        .map(|&uv| assignment.remap(mesh_index, uv).unwrap_or(uv)),
                ),
                // Geometry-only contribution: UV-less meshes fill their slots
                // with a neutral coordinate.
                None => dst.resize(dst.len() + mesh.vertex_count(), [0.0, 0.0]),
            }
        }

        for face in &mesh.faces {
            combined.faces.push(Face {
                indices: face.indices.iter().map(|&i| i + offset).collect(),
            });
        }
    }

    combined.normals = normals;
    combined.uvs = uvs;
    combined
}

/// Combine a mesh list into one mesh, remapping UVs through `assignment`.
///
/// Runs the sizing pass, then the copy pass. The returned mesh satisfies
/// `vertex_count == Σ source vertex counts`, `face_count == Σ source face
/// counts`, and every face index is within the combined vertex buffer.
pub fn combine(meshes: &[Mesh], assignment: &TileAssignment) -> Result<Mesh> {
    let plan = CombinePlan::for_meshes(meshes)?;
    Ok(combine_with_plan(meshes, assignment, &plan))
}
