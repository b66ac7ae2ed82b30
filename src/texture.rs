//! Diffuse-texture location.

use crate::scene::{Material, Mesh};
use std::path::{Path, PathBuf};

/// Resolve the on-disk path of a mesh's diffuse texture.
///
/// Returns `None` — not an error — when the mesh has no texture coordinates, no
/// material, or a material without a diffuse texture; such meshes are skipped by
/// every UV-dependent step. Paths are resolved relative to `scene_dir`, the
/// directory containing the source scene file, which is where MTL-style texture
/// references point.
pub fn locate_diffuse(mesh: &Mesh, materials: &[Material], scene_dir: &Path) -> Option<PathBuf> {
    if !mesh.has_uvs() {
        return None;
    }
    let material = materials.get(mesh.material?)?;
    let texture = material.diffuse_texture.as_deref()?;
    Some(scene_dir.join(texture))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textured_mesh() -> Mesh {
        let mut mesh = Mesh::new("m");
        mesh.positions = vec![[0.0; 3]];
        mesh.uvs = Some(vec![[0.0, 0.0]]);
        mesh.material = Some(0);
        mesh
    }

    fn materials() -> Vec<Material> {
        vec![Material::new("mat").with_diffuse_texture("textures/wood.png")]
    }

    #[test]
    fn test_resolves_relative_to_scene_dir() {
        let path = locate_diffuse(&textured_mesh(), &materials(), Path::new("/scenes/barn"));
        assert_eq!(
            path,
            Some(PathBuf::from("/scenes/barn/textures/wood.png"))
        );
    }

    #[test]
    fn test_no_uvs_is_not_an_error() {
        let mut mesh = textured_mesh();
        mesh.uvs = None;
        assert_eq!(locate_diffuse(&mesh, &materials(), Path::new(".")), None);
    }

    #[test]
    fn test_missing_material_or_texture() {
        let mut no_material = textured_mesh();
        no_material.material = None;
        assert_eq!(locate_diffuse(&no_material, &materials(), Path::new(".")), None);

        let untextured = vec![Material::new("flat")];
        assert_eq!(
            locate_diffuse(&textured_mesh(), &untextured, Path::new(".")),
            None
        );
    }

    #[test]
    fn test_dangling_material_index() {
        let mut mesh = textured_mesh();
        mesh.material = Some(7);
        assert_eq!(locate_diffuse(&mesh, &materials(), Path::new(".")), None);
    }
}
