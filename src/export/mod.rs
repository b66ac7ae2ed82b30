//! Scene serialization.

pub mod gltf;
pub mod obj;

pub use gltf::export_glb;
pub use obj::{export_obj, ObjExport};

use crate::error::{ConsolidateError, Result};
use crate::scene::Scene;
use std::fmt;
use std::fs;
use std::path::Path;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    /// Binary glTF.
    Glb,
    /// Wavefront OBJ (plus MTL).
    Obj,
}

impl OutputFormat {
    /// Every supported format, in listing order.
    pub fn supported() -> &'static [OutputFormat] {
        &[OutputFormat::Glb, OutputFormat::Obj]
    }

    /// The format matching a file extension, if any.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "glb" => Some(OutputFormat::Glb),
            "obj" => Some(OutputFormat::Obj),
            _ => None,
        }
    }

    /// The format for an output path, by its extension.
    pub fn for_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Canonical file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Glb => "glb",
            OutputFormat::Obj => "obj",
        }
    }

    /// Human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            OutputFormat::Glb => "Binary glTF",
            OutputFormat::Obj => "Wavefront OBJ",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (.{})", self.description(), self.extension())
    }
}

/// Serialize a scene to `path` in the given format.
///
/// The atlas image is not written here — the pipeline has already committed it
/// by the time a scene reaches serialization.
pub fn write_scene(scene: &Scene, format: OutputFormat, path: &Path) -> Result<()> {
    match format {
        OutputFormat::Glb => {
            let glb = export_glb(scene)?;
            fs::write(path, glb)?;
        }
        OutputFormat::Obj => {
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| {
                    ConsolidateError::Export(format!("invalid output path: {}", path.display()))
                })?;
            let export = export_obj(scene, name)?;
            fs::write(path, export.obj)?;
            fs::write(path.with_extension("mtl"), export.mtl)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Face, Material, Mesh};

    fn triangle_scene() -> Scene {
        let mut mesh = Mesh::new("tri");
        mesh.positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        mesh.uvs = Some(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);
        mesh.faces = vec![Face::triangle(0, 1, 2)];
        mesh.material = Some(0);
        Scene {
            meshes: vec![mesh],
            materials: vec![Material::new("tex").with_diffuse_texture("tex.jpg")],
        }
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(OutputFormat::from_extension("glb"), Some(OutputFormat::Glb));
        assert_eq!(OutputFormat::from_extension("OBJ"), Some(OutputFormat::Obj));
        assert_eq!(OutputFormat::from_extension("fbx"), None);

        assert_eq!(
            OutputFormat::for_path(Path::new("/tmp/out.glb")),
            Some(OutputFormat::Glb)
        );
        assert_eq!(OutputFormat::for_path(Path::new("/tmp/out")), None);
    }

    #[test]
    fn test_write_glb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.glb");
        write_scene(&triangle_scene(), OutputFormat::Glb, &path).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[0..4], b"glTF");
    }

    #[test]
    fn test_write_obj_with_mtl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.obj");
        write_scene(&triangle_scene(), OutputFormat::Obj, &path).unwrap();

        let obj = fs::read_to_string(&path).unwrap();
        assert!(obj.contains("mtllib out.mtl"));
        let mtl = fs::read_to_string(dir.path().join("out.mtl")).unwrap();
        assert!(mtl.contains("map_Kd tex.jpg"));
    }

    #[test]
    fn test_supported_listing() {
        let listing: Vec<String> = OutputFormat::supported()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(listing, vec!["Binary glTF (.glb)", "Wavefront OBJ (.obj)"]);
    }
}
