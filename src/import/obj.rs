//! OBJ/MTL scene import.
//!
//! Thin wrapper over `tobj` that maps loaded models into the crate's [`Scene`]
//! model, preserving mesh order. Loading uses a single unified index so that
//! vertex channels line up, and triangulates on import — the consolidation
//! core itself only accepts triangles.

use crate::error::Result;
use crate::scene::{Face, Material, Mesh, Scene};
use std::path::Path;

/// Load an OBJ file (plus its MTL, if present) into a [`Scene`].
pub fn load_obj_scene(path: impl AsRef<Path>) -> Result<Scene> {
    let path = path.as_ref();
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            single_index: true,
            triangulate: true,
            ..Default::default()
        },
    )?;

    // A missing or broken MTL degrades to an untextured scene.
    let materials = match materials {
        Ok(mats) => mats.into_iter().map(convert_material).collect(),
        Err(e) => {
            log::warn!("no usable material library for {}: {}", path.display(), e);
            Vec::new()
        }
    };

    let meshes = models.into_iter().map(convert_model).collect();

    Ok(Scene { meshes, materials })
}

fn convert_material(material: tobj::Material) -> Material {
    Material {
        name: material.name,
        diffuse_texture: material.diffuse_texture,
    }
}

fn convert_model(model: tobj::Model) -> Mesh {
    let tobj::Mesh {
        positions,
        normals,
        texcoords,
        indices,
        face_arities,
        material_id,
        ..
    } = model.mesh;

    let mut mesh = Mesh::new(model.name);
    mesh.positions = positions
        .chunks_exact(3)
        .map(|p| [p[0], p[1], p[2]])
        .collect();
    if !normals.is_empty() {
        mesh.normals = Some(normals.chunks_exact(3).map(|n| [n[0], n[1], n[2]]).collect());
    }
    if !texcoords.is_empty() {
        mesh.uvs = Some(texcoords.chunks_exact(2).map(|t| [t[0], t[1]]).collect());
    }
    mesh.faces = collect_faces(&indices, &face_arities);
    mesh.material = material_id;
    mesh
}

/// Split the flat index buffer into faces.
///
/// `face_arities` is empty when every face is a triangle.
fn collect_faces(indices: &[u32], face_arities: &[u32]) -> Vec<Face> {
    if face_arities.is_empty() {
        return indices
            .chunks_exact(3)
            .map(|c| Face::triangle(c[0], c[1], c[2]))
            .collect();
    }

    let mut faces = Vec::with_capacity(face_arities.len());
    let mut start = 0;
    for &arity in face_arities {
        let end = start + arity as usize;
        faces.push(Face {
            indices: indices[start..end].to_vec(),
        });
        start = end;
    }
    faces
}
