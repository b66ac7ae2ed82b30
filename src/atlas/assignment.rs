//! Mesh-to-tile assignment.

use crate::scene::Scene;
use crate::texture::locate_diffuse;
use std::path::{Path, PathBuf};

/// Remap a UV coordinate into its atlas tile.
///
/// Tile `tile` of `tile_count` covers the horizontal sub-range
/// `[tile / tile_count, (tile + 1) / tile_count)` of the atlas, full V range;
/// adding the tile index before dividing maps `u ∈ [0, 1)` into exactly that
/// sub-range while preserving the intra-texture mapping. V is unchanged.
pub fn remap_uv(uv: [f32; 2], tile: usize, tile_count: usize) -> [f32; 2] {
    [(uv[0] + tile as f32) / tile_count as f32, uv[1]]
}

/// The ordered mapping from mesh index to atlas tile.
///
/// Built once per scene and threaded through both the atlas builder and the
/// mesh combiner. Tile order equals combine order by construction: meshes are
/// walked in scene order, and a mesh receives the next free tile iff it has
/// texture coordinates and a resolvable diffuse texture. Meshes without either
/// never consume a slot, so they cannot shift the tile indices of later meshes.
#[derive(Debug, Clone)]
pub struct TileAssignment {
    /// Tile index per mesh, indexed by mesh position in the scene.
    tile_of: Vec<Option<usize>>,
    /// Resolved texture path per tile, in tile order.
    texture_paths: Vec<PathBuf>,
}

impl TileAssignment {
    /// Build the assignment for a scene whose textures live under `scene_dir`.
    pub fn build(scene: &Scene, scene_dir: &Path) -> Self {
        let mut tile_of = Vec::with_capacity(scene.meshes.len());
        let mut texture_paths = Vec::new();

        for (index, mesh) in scene.meshes.iter().enumerate() {
            match locate_diffuse(mesh, &scene.materials, scene_dir) {
                Some(path) => {
                    tile_of.push(Some(texture_paths.len()));
                    texture_paths.push(path);
                }
                None => {
                    if mesh.has_uvs() {
                        log::warn!(
                            "mesh {} ({:?}) has UVs but no diffuse texture; \
                             its coordinates are kept unchanged",
                            index,
                            mesh.name
                        );
                    }
                    tile_of.push(None);
                }
            }
        }

        Self {
            tile_of,
            texture_paths,
        }
    }

    /// Number of atlas tiles (textured meshes).
    pub fn tile_count(&self) -> usize {
        self.texture_paths.len()
    }

    /// Returns `true` if no mesh was assigned a tile.
    pub fn is_empty(&self) -> bool {
        self.texture_paths.is_empty()
    }

    /// Number of meshes the assignment was built over.
    pub fn mesh_count(&self) -> usize {
        self.tile_of.len()
    }

    /// The tile assigned to a mesh, if any.
    pub fn tile_of(&self, mesh_index: usize) -> Option<usize> {
        self.tile_of.get(mesh_index).copied().flatten()
    }

    /// Resolved texture paths in tile order — the atlas builder's input.
    pub fn texture_paths(&self) -> &[PathBuf] {
        &self.texture_paths
    }

    /// Remap a UV coordinate of the given mesh into its atlas tile.
    ///
    /// `None` for meshes without a tile; their coordinates stay as they are.
    pub fn remap(&self, mesh_index: usize, uv: [f32; 2]) -> Option<[f32; 2]> {
        self.tile_of(mesh_index)
            .map(|tile| remap_uv(uv, tile, self.tile_count()))
    }
}
