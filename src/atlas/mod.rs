//! Texture atlas construction.
//!
//! [`TileAssignment`] binds each textured mesh to a horizontal atlas tile;
//! [`AtlasBuilder`] composes the assigned source images into one output image.
//! Both sides consume the same assignment, so tile order and tile count cannot
//! drift apart between atlas building and UV remapping.

mod assignment;
mod builder;

pub use assignment::{remap_uv, TileAssignment};
pub use builder::{AtlasBuilder, AtlasRef, DEFAULT_ATLAS_SIZE};
