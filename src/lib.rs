//! # Scene Consolidator
//!
//! A Rust library for consolidating multi-mesh 3D scenes into a single mesh
//! with a shared texture atlas.
//!
//! ## Overview
//!
//! This library takes a scene of independently textured meshes and produces
//! one combined mesh plus one atlas image, suitable for engines that prefer a
//! single draw call over many. Source textures are tiled horizontally into the
//! atlas, one equal-width tile per textured mesh in scene order, and each
//! mesh's texture coordinates are remapped into its tile.
//!
//! ## Quick Start
//!
//! ```ignore
//! use scene_consolidator::{load_obj_scene, Consolidator, OutputFormat, write_scene};
//!
//! // Load a scene
//! let scene = load_obj_scene("path/to/scene.obj")?;
//!
//! // Consolidate: combines meshes and writes the atlas next to the output
//! let consolidator = Consolidator::new();
//! let result = consolidator.consolidate(&scene, "path/to".as_ref(), "out.glb".as_ref())?;
//!
//! // Serialize the combined scene
//! write_scene(&result.scene, OutputFormat::Glb, "out.glb".as_ref())?;
//! ```

pub mod atlas;
pub mod combine;
pub mod error;
pub mod export;
pub mod import;
pub mod pipeline;
pub mod scene;
pub mod texture;

// Re-export main types for convenience
pub use atlas::{remap_uv, AtlasBuilder, AtlasRef, TileAssignment};
pub use combine::{combine, CombinePlan};
pub use error::{ConsolidateError, Result};
pub use export::{export_glb, export_obj, write_scene, ObjExport, OutputFormat};
pub use import::load_obj_scene;
pub use pipeline::{ConsolidatedScene, Consolidator, ConsolidatorConfig};
pub use scene::{BoundingBox, Face, Material, Mesh, Scene, SceneStats};
pub use texture::locate_diffuse;

use std::path::Path;

/// Consolidate a scene file end to end: load, combine, write atlas and scene.
pub fn consolidate_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    format: OutputFormat,
) -> Result<ConsolidatedScene> {
    let input = input.as_ref();
    let output = output.as_ref();
    let scene = load_obj_scene(input)?;
    let scene_dir = input.parent().unwrap_or_else(|| Path::new("."));

    let consolidator = Consolidator::new();
    let result = consolidator.consolidate(&scene, scene_dir, output)?;
    write_scene(&result.scene, format, output)?;
    Ok(result)
}
