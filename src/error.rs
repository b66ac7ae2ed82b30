//! Error types for scene consolidation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using ConsolidateError.
pub type Result<T> = std::result::Result<T, ConsolidateError>;

/// Main error type for scene consolidation operations.
#[derive(Error, Debug)]
pub enum ConsolidateError {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to read or process an image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Failed to load an OBJ/MTL scene.
    #[error("OBJ load error: {0}")]
    ObjLoad(#[from] tobj::LoadError),

    /// A face with other than 3 indices reached the consolidation core.
    /// Triangulation is an upstream contract; the input is rejected whole.
    #[error("mesh {mesh} face {face} has {arity} indices, expected 3")]
    NonTriangleFace {
        /// Index of the offending mesh in the scene's mesh list.
        mesh: usize,
        /// Index of the offending face within that mesh.
        face: usize,
        /// Number of indices the face actually has.
        arity: usize,
    },

    /// A face references a vertex outside its mesh's vertex buffer.
    #[error(
        "mesh {mesh} face {face} references vertex {index}, but the mesh has {vertex_count} vertices"
    )]
    FaceIndexOutOfRange {
        /// Index of the offending mesh in the scene's mesh list.
        mesh: usize,
        /// Index of the offending face within that mesh.
        face: usize,
        /// The out-of-range vertex index.
        index: u32,
        /// Vertex count of the mesh.
        vertex_count: usize,
    },

    /// The combined vertex count exceeds the addressable index range.
    #[error("combined scene has {vertices} vertices, exceeding the 32-bit index range")]
    CapacityExceeded {
        /// Total vertex count across all source meshes.
        vertices: usize,
    },

    /// A referenced texture file is missing or not a regular file.
    #[error("texture is not a readable file: {}", .0.display())]
    TextureNotFound(PathBuf),

    /// Failed to build the texture atlas.
    #[error("Atlas building error: {0}")]
    AtlasBuild(String),

    /// Failed to export the consolidated scene.
    #[error("Export error: {0}")]
    Export(String),
}
