//! The consolidation pipeline.
//!
//! Strictly sequential: tile assignment → sizing/validation → atlas build →
//! copy pass. Validation runs before the atlas is written, so a rejected scene
//! leaves nothing on disk; the atlas is committed before the copy pass runs,
//! and tile order and count reach the combiner only through the
//! [`TileAssignment`] both stages share.

use crate::atlas::{AtlasBuilder, AtlasRef, TileAssignment, DEFAULT_ATLAS_SIZE};
use crate::combine::{combine_with_plan, CombinePlan};
use crate::error::Result;
use crate::scene::{Material, Scene};
use std::path::{Path, PathBuf};

/// Consolidator configuration.
#[derive(Debug, Clone)]
pub struct ConsolidatorConfig {
    /// Edge length of the square atlas canvas.
    pub atlas_size: u32,
    /// Suffix appended to the output stem for the atlas file name.
    pub atlas_suffix: String,
    /// File extension (and thereby encoding) of the atlas image.
    pub atlas_extension: String,
}

impl Default for ConsolidatorConfig {
    fn default() -> Self {
        Self {
            atlas_size: DEFAULT_ATLAS_SIZE,
            atlas_suffix: "_tex".to_string(),
            atlas_extension: "jpg".to_string(),
        }
    }
}

impl ConsolidatorConfig {
    /// Builder-style atlas size override.
    pub fn with_atlas_size(mut self, atlas_size: u32) -> Self {
        self.atlas_size = atlas_size;
        self
    }

    /// Builder-style atlas extension override.
    pub fn with_atlas_extension(mut self, extension: impl Into<String>) -> Self {
        self.atlas_extension = extension.into();
        self
    }
}

/// Result of consolidating a scene: the one-mesh output scene and the atlas
/// identity, when one was built.
#[derive(Debug)]
pub struct ConsolidatedScene {
    /// A scene with a single combined mesh and at most one material.
    pub scene: Scene,
    /// The written atlas, `None` when no source mesh was textured.
    pub atlas: Option<AtlasRef>,
}

/// The consolidation entry point.
#[derive(Debug, Clone, Default)]
pub struct Consolidator {
    config: ConsolidatorConfig,
}

impl Consolidator {
    /// Create a consolidator with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a consolidator with the given configuration.
    pub fn with_config(config: ConsolidatorConfig) -> Self {
        Self { config }
    }

    /// The atlas path derived from an output path: `<stem><suffix>.<ext>`
    /// next to the output file.
    pub fn atlas_path_for(&self, output_path: &Path) -> PathBuf {
        let stem = output_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("scene");
        output_path.with_file_name(format!(
            "{}{}.{}",
            stem, self.config.atlas_suffix, self.config.atlas_extension
        ))
    }

    /// Consolidate `scene` into one mesh plus one atlas.
    ///
    /// `scene_dir` is the directory of the source scene file, the base for
    /// texture resolution. `output_path` is where the scene file will later be
    /// written; the atlas lands next to it. On any failure nothing is written
    /// and the scene file is never produced.
    pub fn consolidate(
        &self,
        scene: &Scene,
        scene_dir: &Path,
        output_path: &Path,
    ) -> Result<ConsolidatedScene> {
        let assignment = TileAssignment::build(scene, scene_dir);

        // Sizing and validation before any file is touched.
        let plan = CombinePlan::for_meshes(&scene.meshes)?;

        let atlas = if assignment.is_empty() {
            log::debug!("no textured meshes; skipping atlas");
            None
        } else {
            let atlas_path = self.atlas_path_for(output_path);
            let builder = AtlasBuilder::new(self.config.atlas_size);
            Some(builder.build(assignment.texture_paths(), &atlas_path)?)
        };

        let mut combined = combine_with_plan(&scene.meshes, &assignment, &plan);

        let mut materials = Vec::new();
        if let Some(atlas) = &atlas {
            let file_name = atlas
                .path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("atlas")
                .to_string();
            let stem = atlas
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("atlas")
                .to_string();
            combined.material = Some(materials.len());
            materials.push(Material::new(stem).with_diffuse_texture(file_name));
        }

        Ok(ConsolidatedScene {
            scene: Scene {
                meshes: vec![combined],
                materials,
            },
            atlas,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConsolidateError;
    use crate::scene::{Face, Mesh};
    use image::{Rgba, RgbaImage};

    fn textured_mesh(name: &str, material: usize, uv: [f32; 2]) -> Mesh {
        let mut mesh = Mesh::new(name);
        mesh.positions = vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ];
        mesh.uvs = Some(vec![uv, [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
        mesh.faces = vec![Face::triangle(0, 1, 2), Face::triangle(0, 2, 3)];
        mesh.material = Some(material);
        mesh
    }

    fn scene_with_textures(dir: &Path) -> Scene {
        for (name, color) in [("a.png", [255, 0, 0, 255]), ("b.png", [0, 255, 0, 255])] {
            RgbaImage::from_pixel(2, 2, Rgba(color))
                .save(dir.join(name))
                .unwrap();
        }
        Scene {
            meshes: vec![
                textured_mesh("a", 0, [0.5, 0.5]),
                textured_mesh("b", 1, [0.5, 0.5]),
            ],
            materials: vec![
                Material::new("a").with_diffuse_texture("a.png"),
                Material::new("b").with_diffuse_texture("b.png"),
            ],
        }
    }

    #[test]
    fn test_consolidate_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let scene = scene_with_textures(dir.path());
        let output = dir.path().join("out.glb");

        let consolidator =
            Consolidator::with_config(ConsolidatorConfig::default().with_atlas_size(8));
        let result = consolidator
            .consolidate(&scene, dir.path(), &output)
            .unwrap();

        let atlas = result.atlas.unwrap();
        assert_eq!(atlas.tile_count, 2);
        assert_eq!(atlas.path, dir.path().join("out_tex.jpg"));
        assert!(atlas.path.is_file());

        assert_eq!(result.scene.meshes.len(), 1);
        let combined = &result.scene.meshes[0];
        assert_eq!(combined.vertex_count(), 8);
        assert_eq!(combined.face_count(), 4);
        assert_eq!(combined.uvs.as_ref().unwrap()[0], [0.25, 0.5]);
        assert_eq!(combined.uvs.as_ref().unwrap()[4], [0.75, 0.5]);

        // The single material references the atlas by file name.
        let material = result.scene.material_of(combined).unwrap();
        assert_eq!(material.diffuse_texture.as_deref(), Some("out_tex.jpg"));
    }

    #[test]
    fn test_missing_texture_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut scene = scene_with_textures(dir.path());
        scene.materials[1] = Material::new("b").with_diffuse_texture("gone.png");
        let output = dir.path().join("out.glb");

        let consolidator = Consolidator::new();
        let err = consolidator
            .consolidate(&scene, dir.path(), &output)
            .unwrap_err();

        assert!(matches!(err, ConsolidateError::TextureNotFound(_)));
        assert!(!dir.path().join("out_tex.jpg").exists());
        assert!(!output.exists());
    }

    #[test]
    fn test_non_triangle_face_fails_before_atlas_write() {
        let dir = tempfile::tempdir().unwrap();
        let mut scene = scene_with_textures(dir.path());
        scene.meshes[0].faces.push(Face {
            indices: vec![0, 1, 2, 3],
        });
        let output = dir.path().join("out.glb");

        let err = Consolidator::new()
            .consolidate(&scene, dir.path(), &output)
            .unwrap_err();

        assert!(matches!(err, ConsolidateError::NonTriangleFace { .. }));
        assert!(!dir.path().join("out_tex.jpg").exists());
    }

    #[test]
    fn test_untextured_scene_has_no_atlas_and_no_material() {
        let dir = tempfile::tempdir().unwrap();
        let mut bare = Mesh::new("bare");
        bare.positions = vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        bare.faces = vec![Face::triangle(0, 1, 2)];
        let scene = Scene {
            meshes: vec![bare],
            materials: Vec::new(),
        };

        let result = Consolidator::new()
            .consolidate(&scene, dir.path(), &dir.path().join("out.glb"))
            .unwrap();

        assert!(result.atlas.is_none());
        assert!(result.scene.materials.is_empty());
        assert_eq!(result.scene.meshes[0].material, None);
        assert!(!dir.path().join("out_tex.jpg").exists());
    }

    #[test]
    fn test_atlas_path_derivation() {
        let consolidator = Consolidator::new();
        assert_eq!(
            consolidator.atlas_path_for(Path::new("/tmp/model.glb")),
            PathBuf::from("/tmp/model_tex.jpg")
        );

        let png = Consolidator::with_config(
            ConsolidatorConfig::default().with_atlas_extension("png"),
        );
        assert_eq!(
            png.atlas_path_for(Path::new("scene.obj")),
            PathBuf::from("scene_tex.png")
        );
    }
}
