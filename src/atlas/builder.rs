//! Atlas image composition.

use crate::error::{ConsolidateError, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};

/// Default edge length of the square atlas canvas, in pixels.
pub const DEFAULT_ATLAS_SIZE: u32 = 4096;

/// Identity of a built atlas: where it was written and how many tiles it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasRef {
    /// Path the atlas image was written to.
    pub path: PathBuf,
    /// Number of horizontal tiles, equal to the number of source textures.
    pub tile_count: usize,
}

/// Builder composing source textures into one horizontally tiled atlas image.
///
/// The canvas is nominally `atlas_size × atlas_size`; its width is divided into
/// equal cells, one per source texture, in input order. Input order must equal
/// combine order — it is the only linkage between a mesh's remapped UV range
/// and its pixel content — which is why callers feed this builder from a
/// [`TileAssignment`](crate::atlas::TileAssignment) rather than an ad-hoc list.
#[derive(Debug, Clone)]
pub struct AtlasBuilder {
    atlas_size: u32,
}

impl Default for AtlasBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_ATLAS_SIZE)
    }
}

impl AtlasBuilder {
    /// Create a builder with the given canvas size.
    pub fn new(atlas_size: u32) -> Self {
        Self { atlas_size }
    }

    /// Compose the textures at `ordered_paths` and write the result to
    /// `output_path`. The encoding is chosen by the output extension; JPEG
    /// output is flattened to RGB since the format carries no alpha.
    ///
    /// Every path must point at a readable regular file. Any violation aborts
    /// the whole build before anything is decoded or written: UV remapping has
    /// already committed to tile assignment by mesh order, so a skipped tile
    /// would silently corrupt the appearance of every mesh after it.
    pub fn build(&self, ordered_paths: &[PathBuf], output_path: &Path) -> Result<AtlasRef> {
        if ordered_paths.is_empty() {
            return Err(ConsolidateError::AtlasBuild(
                "no source textures to tile".to_string(),
            ));
        }
        for path in ordered_paths {
            let is_file = fs::metadata(path).map(|m| m.is_file()).unwrap_or(false);
            if !is_file {
                return Err(ConsolidateError::TextureNotFound(path.clone()));
            }
        }

        let canvas = self.compose(ordered_paths)?;
        encode(canvas, output_path)?;

        Ok(AtlasRef {
            path: output_path.to_path_buf(),
            tile_count: ordered_paths.len(),
        })
    }

    /// Decode and tile the source images onto a transparent canvas.
    fn compose(&self, ordered_paths: &[PathBuf]) -> Result<RgbaImage> {
        let tile_count = ordered_paths.len() as u32;
        let cell_w = self.atlas_size / tile_count;
        let cell_h = self.atlas_size;
        if cell_w == 0 {
            return Err(ConsolidateError::AtlasBuild(format!(
                "cannot fit {} tiles into a {}px wide atlas",
                tile_count, self.atlas_size
            )));
        }

        // Zero-initialized RGBA is fully transparent, which is the background
        // fill for any tile smaller than its cell.
        let mut canvas = RgbaImage::new(cell_w * tile_count, cell_h);
        log::debug!(
            "composing {}x{} atlas, {} cells of {}x{}",
            canvas.width(),
            canvas.height(),
            tile_count,
            cell_w,
            cell_h
        );

        for (tile, path) in ordered_paths.iter().enumerate() {
            let image = image::open(path)?.to_rgba8();
            let image = fit_to_cell(image, cell_w, cell_h);
            imageops::overlay(&mut canvas, &image, (tile as u32 * cell_w) as i64, 0);
        }

        Ok(canvas)
    }
}

/// Downscale an image to fit within a cell, preserving aspect ratio.
/// Images already within the cell are placed at native size.
fn fit_to_cell(image: RgbaImage, cell_w: u32, cell_h: u32) -> RgbaImage {
    let (w, h) = image.dimensions();
    if w <= cell_w && h <= cell_h {
        return image;
    }
    let scale = (cell_w as f64 / w as f64).min(cell_h as f64 / h as f64);
    let new_w = ((w as f64 * scale) as u32).max(1);
    let new_h = ((h as f64 * scale) as u32).max(1);
    imageops::resize(&image, new_w, new_h, FilterType::Triangle)
}

/// Encode the canvas, flattening to RGB for formats without alpha.
fn encode(canvas: RgbaImage, output_path: &Path) -> Result<()> {
    let is_jpeg = output_path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"));

    if is_jpeg {
        DynamicImage::ImageRgba8(canvas).to_rgb8().save(output_path)?;
    } else {
        canvas.save(output_path)?;
    }
    Ok(())
}
