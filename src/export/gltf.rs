//! glTF/GLB export.

use crate::error::{ConsolidateError, Result};
use crate::scene::{Mesh, Scene};
use gltf_json as json;
use json::validation::Checked::Valid;
use json::validation::USize64;
use std::mem;

/// Export a scene to GLB format (binary glTF).
///
/// Each mesh becomes one triangle primitive; materials with a diffuse texture
/// reference their image by relative URI, so the atlas stays the standalone
/// file the rest of the pipeline committed to. The sampler clamps to edge:
/// repeat wrapping would bleed pixels across atlas tile boundaries.
pub fn export_glb(scene: &Scene) -> Result<Vec<u8>> {
    if scene.meshes.iter().all(Mesh::is_empty) {
        return Err(ConsolidateError::Export(
            "Cannot export empty scene".to_string(),
        ));
    }

    let mut buffer_data: Vec<u8> = Vec::new();
    let mut buffer_views = Vec::new();
    let mut accessors = Vec::new();
    let mut primitives = Vec::new();

    for (mesh_index, mesh) in scene.meshes.iter().enumerate() {
        if mesh.is_empty() {
            continue;
        }
        let primitive = append_mesh(
            mesh_index,
            mesh,
            &mut buffer_data,
            &mut buffer_views,
            &mut accessors,
        )?;
        primitives.push(primitive);
    }

    let total_buffer_size = buffer_data.len();

    let mut images = Vec::new();
    let mut textures = Vec::new();
    let mut materials = Vec::new();
    let mut needs_sampler = false;
    for material in &scene.materials {
        let base_color_texture = material.diffuse_texture.as_ref().map(|uri| {
            needs_sampler = true;
            let image_idx = images.len() as u32;
            images.push(json::Image {
                buffer_view: None,
                mime_type: None,
                uri: Some(uri.clone()),
                extensions: Default::default(),
                extras: Default::default(),
            });
            let texture_idx = textures.len() as u32;
            textures.push(json::Texture {
                sampler: Some(json::Index::new(0)),
                source: json::Index::new(image_idx),
                extensions: Default::default(),
                extras: Default::default(),
            });
            json::texture::Info {
                index: json::Index::new(texture_idx),
                tex_coord: 0,
                extensions: Default::default(),
                extras: Default::default(),
            }
        });
        materials.push(create_material(base_color_texture));
    }

    let samplers = if needs_sampler {
        vec![json::texture::Sampler {
            mag_filter: Some(Valid(json::texture::MagFilter::Linear)),
            min_filter: Some(Valid(json::texture::MinFilter::Linear)),
            wrap_s: Valid(json::texture::WrappingMode::ClampToEdge),
            wrap_t: Valid(json::texture::WrappingMode::ClampToEdge),
            extensions: Default::default(),
            extras: Default::default(),
        }]
    } else {
        Vec::new()
    };

    let root = json::Root {
        accessors,
        buffers: vec![json::Buffer {
            byte_length: USize64(total_buffer_size as u64),
            extensions: Default::default(),
            extras: Default::default(),
            uri: None,
        }],
        buffer_views,
        images,
        samplers,
        textures,
        materials,
        meshes: vec![json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            primitives,
            weights: None,
        }],
        nodes: vec![json::Node {
            camera: None,
            children: None,
            extensions: Default::default(),
            extras: Default::default(),
            matrix: None,
            mesh: Some(json::Index::new(0)),
            rotation: None,
            scale: None,
            translation: None,
            skin: None,
            weights: None,
        }],
        scenes: vec![json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            nodes: vec![json::Index::new(0)],
        }],
        scene: Some(json::Index::new(0)),
        ..Default::default()
    };

    let json_string = json::serialize::to_string(&root)
        .map_err(|e| ConsolidateError::Export(format!("Failed to serialize glTF JSON: {}", e)))?;
    let json_bytes = json_string.as_bytes();

    // Pad JSON and BIN chunks to 4-byte alignment.
    let json_padding = (4 - (json_bytes.len() % 4)) % 4;
    let padded_json_len = json_bytes.len() + json_padding;
    let buffer_padding = (4 - (buffer_data.len() % 4)) % 4;
    let padded_buffer_len = buffer_data.len() + buffer_padding;

    let total_size = 12 + 8 + padded_json_len + 8 + padded_buffer_len;

    let mut glb = Vec::with_capacity(total_size);

    // GLB header
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total_size as u32).to_le_bytes());

    // JSON chunk
    glb.extend_from_slice(&(padded_json_len as u32).to_le_bytes());
    glb.extend_from_slice(&0x4E4F534Au32.to_le_bytes());
    glb.extend_from_slice(json_bytes);
    glb.extend_from_slice(&vec![0x20u8; json_padding]);

    // BIN chunk
    glb.extend_from_slice(&(padded_buffer_len as u32).to_le_bytes());
    glb.extend_from_slice(&0x004E4942u32.to_le_bytes());
    glb.extend_from_slice(&buffer_data);
    glb.extend_from_slice(&vec![0u8; buffer_padding]);

    Ok(glb)
}

/// Append one mesh's vertex and index data to the binary buffer and emit the
/// buffer views, accessors, and primitive describing it.
fn append_mesh(
    mesh_index: usize,
    mesh: &Mesh,
    buffer_data: &mut Vec<u8>,
    buffer_views: &mut Vec<json::buffer::View>,
    accessors: &mut Vec<json::Accessor>,
) -> Result<json::mesh::Primitive> {
    let positions: Vec<f32> = mesh.positions.iter().flatten().copied().collect();
    let indices = triangle_indices(mesh_index, mesh)?;

    let (min, max) = position_bounds(&mesh.positions);
    let mut attributes = std::collections::BTreeMap::new();

    let pos_offset = buffer_data.len();
    buffer_data.extend_from_slice(cast_slice(&positions));
    let pos_view = push_view(
        buffer_views,
        pos_offset,
        buffer_data.len() - pos_offset,
        Some(json::buffer::Target::ArrayBuffer),
    );
    accessors.push(create_accessor(
        pos_view,
        mesh.vertex_count(),
        json::accessor::Type::Vec3,
        json::accessor::ComponentType::F32,
        Some(min),
        Some(max),
    ));
    attributes.insert(
        Valid(json::mesh::Semantic::Positions),
        json::Index::new(accessors.len() as u32 - 1),
    );

    if let Some(normals) = &mesh.normals {
        let flat: Vec<f32> = normals.iter().flatten().copied().collect();
        let offset = buffer_data.len();
        buffer_data.extend_from_slice(cast_slice(&flat));
        let view = push_view(
            buffer_views,
            offset,
            buffer_data.len() - offset,
            Some(json::buffer::Target::ArrayBuffer),
        );
        accessors.push(create_accessor(
            view,
            mesh.vertex_count(),
            json::accessor::Type::Vec3,
            json::accessor::ComponentType::F32,
            None,
            None,
        ));
        attributes.insert(
            Valid(json::mesh::Semantic::Normals),
            json::Index::new(accessors.len() as u32 - 1),
        );
    }

    if let Some(uvs) = &mesh.uvs {
        let flat: Vec<f32> = uvs.iter().flatten().copied().collect();
        let offset = buffer_data.len();
        buffer_data.extend_from_slice(cast_slice(&flat));
        let view = push_view(
            buffer_views,
            offset,
            buffer_data.len() - offset,
            Some(json::buffer::Target::ArrayBuffer),
        );
        accessors.push(create_accessor(
            view,
            mesh.vertex_count(),
            json::accessor::Type::Vec2,
            json::accessor::ComponentType::F32,
            None,
            None,
        ));
        attributes.insert(
            Valid(json::mesh::Semantic::TexCoords(0)),
            json::Index::new(accessors.len() as u32 - 1),
        );
    }

    let idx_offset = buffer_data.len();
    buffer_data.extend_from_slice(cast_slice(&indices));
    let idx_view = push_view(
        buffer_views,
        idx_offset,
        buffer_data.len() - idx_offset,
        Some(json::buffer::Target::ElementArrayBuffer),
    );
    accessors.push(create_accessor(
        idx_view,
        indices.len(),
        json::accessor::Type::Scalar,
        json::accessor::ComponentType::U32,
        None,
        None,
    ));
    let indices_accessor = accessors.len() as u32 - 1;

    Ok(json::mesh::Primitive {
        attributes,
        extensions: Default::default(),
        extras: Default::default(),
        indices: Some(json::Index::new(indices_accessor)),
        material: mesh.material.map(|m| json::Index::new(m as u32)),
        mode: Valid(json::mesh::Mode::Triangles),
        targets: None,
    })
}

/// Flatten the face list into a triangle index buffer.
fn triangle_indices(mesh_index: usize, mesh: &Mesh) -> Result<Vec<u32>> {
    let mut indices = Vec::with_capacity(mesh.face_count() * 3);
    for (face_index, face) in mesh.faces.iter().enumerate() {
        let [a, b, c] = face
            .as_triangle()
            .ok_or_else(|| ConsolidateError::NonTriangleFace {
                mesh: mesh_index,
                face: face_index,
                arity: face.indices.len(),
            })?;
        indices.extend_from_slice(&[a, b, c]);
    }
    Ok(indices)
}

fn position_bounds(positions: &[[f32; 3]]) -> ([f32; 3], [f32; 3]) {
    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];
    for position in positions {
        for i in 0..3 {
            min[i] = min[i].min(position[i]);
            max[i] = max[i].max(position[i]);
        }
    }
    if min[0] == f32::MAX {
        min = [0.0; 3];
        max = [0.0; 3];
    }
    (min, max)
}

fn push_view(
    buffer_views: &mut Vec<json::buffer::View>,
    offset: usize,
    size: usize,
    target: Option<json::buffer::Target>,
) -> u32 {
    buffer_views.push(json::buffer::View {
        buffer: json::Index::new(0),
        byte_length: USize64(size as u64),
        byte_offset: Some(USize64(offset as u64)),
        byte_stride: None,
        extensions: Default::default(),
        extras: Default::default(),
        target: target.map(Valid),
    });
    buffer_views.len() as u32 - 1
}

fn create_accessor(
    buffer_view: u32,
    count: usize,
    type_: json::accessor::Type,
    component_type: json::accessor::ComponentType,
    min: Option<[f32; 3]>,
    max: Option<[f32; 3]>,
) -> json::Accessor {
    json::Accessor {
        buffer_view: Some(json::Index::new(buffer_view)),
        byte_offset: Some(USize64(0)),
        count: USize64(count as u64),
        component_type: Valid(json::accessor::GenericComponentType(component_type)),
        extensions: Default::default(),
        extras: Default::default(),
        type_: Valid(type_),
        min: min.map(|m| json::Value::from(m.to_vec())),
        max: max.map(|m| json::Value::from(m.to_vec())),
        normalized: false,
        sparse: None,
    }
}

fn create_material(base_color_texture: Option<json::texture::Info>) -> json::Material {
    json::Material {
        pbr_metallic_roughness: json::material::PbrMetallicRoughness {
            base_color_texture,
            base_color_factor: json::material::PbrBaseColorFactor([1.0, 1.0, 1.0, 1.0]),
            metallic_factor: json::material::StrengthFactor(0.0),
            roughness_factor: json::material::StrengthFactor(1.0),
            metallic_roughness_texture: None,
            extensions: Default::default(),
            extras: Default::default(),
        },
        alpha_mode: Valid(json::material::AlphaMode::Opaque),
        alpha_cutoff: None,
        double_sided: false,
        normal_texture: None,
        occlusion_texture: None,
        emissive_texture: None,
        emissive_factor: json::material::EmissiveFactor([0.0, 0.0, 0.0]),
        extensions: Default::default(),
        extras: Default::default(),
    }
}

/// Cast a slice of T to a slice of bytes.
fn cast_slice<T: Copy>(slice: &[T]) -> &[u8] {
    let ptr = slice.as_ptr() as *const u8;
    let len = slice.len() * mem::size_of::<T>();
    unsafe { std::slice::from_raw_parts(ptr, len) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Face, Material};

    fn triangle_scene() -> Scene {
        let mut mesh = Mesh::new("tri");
        mesh.positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]];
        mesh.normals = Some(vec![[0.0, 1.0, 0.0]; 3]);
        mesh.uvs = Some(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);
        mesh.faces = vec![Face::triangle(0, 1, 2)];
        mesh.material = Some(0);

        Scene {
            meshes: vec![mesh],
            materials: vec![Material::new("atlas").with_diffuse_texture("out_tex.jpg")],
        }
    }

    #[test]
    fn test_export_simple_scene() {
        let glb = export_glb(&triangle_scene()).unwrap();

        assert_eq!(&glb[0..4], b"glTF");
        assert_eq!(u32::from_le_bytes([glb[4], glb[5], glb[6], glb[7]]), 2);
        // Total length field matches the actual byte count.
        assert_eq!(
            u32::from_le_bytes([glb[8], glb[9], glb[10], glb[11]]) as usize,
            glb.len()
        );
    }

    #[test]
    fn test_atlas_referenced_by_uri() {
        let glb = export_glb(&triangle_scene()).unwrap();
        let json_len = u32::from_le_bytes([glb[12], glb[13], glb[14], glb[15]]) as usize;
        let json_text = std::str::from_utf8(&glb[20..20 + json_len]).unwrap();
        assert!(json_text.contains("out_tex.jpg"));
    }

    #[test]
    fn test_export_without_optional_channels() {
        let mut scene = triangle_scene();
        scene.meshes[0].normals = None;
        scene.meshes[0].uvs = None;
        scene.meshes[0].material = None;
        scene.materials.clear();

        let glb = export_glb(&scene).unwrap();
        assert_eq!(&glb[0..4], b"glTF");
    }

    #[test]
    fn test_export_empty_scene_fails() {
        let result = export_glb(&Scene::new());
        assert!(matches!(result, Err(ConsolidateError::Export(_))));
    }

    #[test]
    fn test_export_non_triangle_fails() {
        let mut scene = triangle_scene();
        scene.meshes[0].faces.push(Face {
            indices: vec![0, 1, 2, 0],
        });
        let result = export_glb(&scene);
        assert!(matches!(
            result,
            Err(ConsolidateError::NonTriangleFace { .. })
        ));
    }
}
