//! Wavefront OBJ export.
//!
//! OBJ is a simple, widely-supported text-based 3D format. The MTL companion
//! references the atlas image through `map_Kd`.

use crate::error::{ConsolidateError, Result};
use crate::scene::{Mesh, Scene};
use std::fmt::Write;

/// An OBJ export: the .obj text and its .mtl companion.
#[derive(Debug, Clone)]
pub struct ObjExport {
    /// OBJ file content.
    pub obj: String,
    /// MTL file content.
    pub mtl: String,
}

impl ObjExport {
    /// Export a scene to OBJ format under the given object name.
    pub fn from_scene(scene: &Scene, name: &str) -> Result<Self> {
        export_obj(scene, name)
    }
}

/// Export a scene to OBJ + MTL text.
pub fn export_obj(scene: &Scene, name: &str) -> Result<ObjExport> {
    if scene.meshes.iter().all(Mesh::is_empty) {
        return Err(ConsolidateError::Export(
            "Cannot export empty scene".to_string(),
        ));
    }

    let total_verts = scene.total_vertices();
    let total_faces = scene.total_faces();

    // Pre-size: ~60 bytes per vertex line (v/vt/vn) x 3 + ~40 per face.
    let mut obj = String::with_capacity(256 + total_verts * 180 + total_faces * 40);
    let mut mtl = String::with_capacity(512);

    writeln!(obj, "# {} vertices, {} faces", total_verts, total_faces).unwrap();
    writeln!(obj, "mtllib {}.mtl", name).unwrap();
    writeln!(obj, "o {}", name).unwrap();
    writeln!(obj).unwrap();

    // OBJ index pools are global; write all channels first, then faces with
    // running offsets.
    for mesh in &scene.meshes {
        for p in &mesh.positions {
            writeln!(obj, "v {} {} {}", p[0], p[1], p[2]).unwrap();
        }
    }
    for mesh in &scene.meshes {
        if let Some(uvs) = &mesh.uvs {
            for uv in uvs {
                writeln!(obj, "vt {} {}", uv[0], uv[1]).unwrap();
            }
        }
    }
    for mesh in &scene.meshes {
        if let Some(normals) = &mesh.normals {
            for n in normals {
                writeln!(obj, "vn {} {} {}", n[0], n[1], n[2]).unwrap();
            }
        }
    }
    writeln!(obj).unwrap();

    let mut vertex_offset: usize = 0;
    let mut uv_offset: usize = 0;
    let mut normal_offset: usize = 0;
    // UV and normal pools only advance for meshes that have those channels, so
    // the per-channel offsets are tracked separately from the vertex offset.
    for mesh in &scene.meshes {
        if let Some(material) = scene.material_of(mesh) {
            writeln!(obj, "usemtl {}", material.name).unwrap();
        }
        for face in &mesh.faces {
            write!(obj, "f").unwrap();
            for &index in &face.indices {
                let v = index as usize + vertex_offset + 1;
                match (mesh.has_uvs(), mesh.has_normals()) {
                    (true, true) => write!(
                        obj,
                        " {}/{}/{}",
                        v,
                        index as usize + uv_offset + 1,
                        index as usize + normal_offset + 1
                    )
                    .unwrap(),
                    (true, false) => {
                        write!(obj, " {}/{}", v, index as usize + uv_offset + 1).unwrap()
                    }
                    (false, true) => {
                        write!(obj, " {}//{}", v, index as usize + normal_offset + 1).unwrap()
                    }
                    (false, false) => write!(obj, " {}", v).unwrap(),
                }
            }
            writeln!(obj).unwrap();
        }

        vertex_offset += mesh.vertex_count();
        if mesh.has_uvs() {
            uv_offset += mesh.vertex_count();
        }
        if mesh.has_normals() {
            normal_offset += mesh.vertex_count();
        }
    }

    for material in &scene.materials {
        writeln!(mtl, "newmtl {}", material.name).unwrap();
        writeln!(mtl, "Kd 1.0 1.0 1.0").unwrap();
        if let Some(texture) = &material.diffuse_texture {
            writeln!(mtl, "map_Kd {}", texture).unwrap();
        }
        writeln!(mtl).unwrap();
    }

    Ok(ObjExport { obj, mtl })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Face, Material};

    fn textured_scene() -> Scene {
        let mut mesh = Mesh::new("combined");
        mesh.positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        mesh.uvs = Some(vec![[0.0, 0.0], [0.5, 0.0], [0.0, 0.5]]);
        mesh.faces = vec![Face::triangle(0, 1, 2)];
        mesh.material = Some(0);

        Scene {
            meshes: vec![mesh],
            materials: vec![Material::new("scene_tex").with_diffuse_texture("scene_tex.jpg")],
        }
    }

    #[test]
    fn test_obj_structure() {
        let export = export_obj(&textured_scene(), "scene").unwrap();

        assert!(export.obj.contains("mtllib scene.mtl"));
        assert!(export.obj.contains("o scene"));
        assert!(export.obj.contains("v 0 0 0"));
        assert!(export.obj.contains("vt 0.5 0"));
        assert!(export.obj.contains("usemtl scene_tex"));
        // 1-based v/vt indices, no normals.
        assert!(export.obj.contains("f 1/1 2/2 3/3"));
    }

    #[test]
    fn test_mtl_references_atlas() {
        let export = export_obj(&textured_scene(), "scene").unwrap();
        assert!(export.mtl.contains("newmtl scene_tex"));
        assert!(export.mtl.contains("map_Kd scene_tex.jpg"));
    }

    #[test]
    fn test_untextured_scene() {
        let mut scene = textured_scene();
        scene.meshes[0].uvs = None;
        scene.meshes[0].material = None;
        scene.materials.clear();

        let export = export_obj(&scene, "bare").unwrap();
        assert!(export.obj.contains("f 1 2 3"));
        assert!(!export.obj.contains("usemtl"));
        assert!(export.mtl.is_empty());
    }

    #[test]
    fn test_empty_scene_fails() {
        assert!(matches!(
            export_obj(&Scene::new(), "x"),
            Err(ConsolidateError::Export(_))
        ));
    }
}
