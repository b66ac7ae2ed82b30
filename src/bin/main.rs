//! Scene Consolidator CLI
//!
//! Combine a multi-mesh scene into one mesh with a shared texture atlas.

use clap::{Parser, Subcommand};
use scene_consolidator::{
    load_obj_scene, write_scene, Consolidator, ConsolidatorConfig, OutputFormat, SceneStats,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "scene-consolidator")]
#[command(author, version, about = "Consolidate multi-mesh 3D scenes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Combine a scene's meshes and textures into one mesh and one atlas
    Consolidate {
        /// Input scene file (OBJ)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Output format (derived from the output extension when omitted)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Uniform scale factor applied before combining
        #[arg(short, long)]
        scale: Option<f32>,

        /// Atlas canvas size in pixels
        #[arg(long, default_value = "4096")]
        atlas_size: u32,

        /// Print per-mesh statistics before combining
        #[arg(short = 't', long)]
        stats: bool,
    },

    /// Print per-mesh statistics for a scene
    Info {
        /// Input scene file (OBJ)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// List supported output formats
    Formats,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Consolidate {
            input,
            output,
            format,
            scale,
            atlas_size,
            stats,
        } => consolidate(&input, &output, format, scale, atlas_size, stats)?,
        Commands::Info { input } => info(&input)?,
        Commands::Formats => formats(),
    }

    Ok(())
}

fn consolidate(
    input: &Path,
    output: &Path,
    format: Option<OutputFormat>,
    scale: Option<f32>,
    atlas_size: u32,
    stats: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let format = format
        .or_else(|| OutputFormat::for_path(output))
        .ok_or("no output format specified and none could be derived from the output path")?;

    println!("Loading scene from {:?}...", input);
    let mut scene = load_obj_scene(input)?;
    println!(
        "  Found {} meshes, {} vertices, {} faces",
        scene.meshes.len(),
        scene.total_vertices(),
        scene.total_faces()
    );

    if stats {
        println!("{}", SceneStats::collect(&scene)?);
    }

    if let Some(factor) = scale {
        println!("Scaling scene by {}", factor);
        scene.scale(factor);
    }

    let scene_dir = input.parent().unwrap_or_else(|| Path::new("."));
    let consolidator =
        Consolidator::with_config(ConsolidatorConfig::default().with_atlas_size(atlas_size));
    let result = consolidator.consolidate(&scene, scene_dir, output)?;

    match &result.atlas {
        Some(atlas) => println!(
            "  Atlas: {} tiles, written to {:?}",
            atlas.tile_count, atlas.path
        ),
        None => println!("  No textured meshes; no atlas written"),
    }
    let combined = &result.scene.meshes[0];
    println!(
        "  Combined mesh: {} vertices, {} faces",
        combined.vertex_count(),
        combined.face_count()
    );

    write_scene(&result.scene, format, output)?;
    println!("Exported {} to {:?}", format, output);

    Ok(())
}

fn info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading scene from {:?}...", input);
    let scene = load_obj_scene(input)?;
    println!("{}", SceneStats::collect(&scene)?);
    Ok(())
}

fn formats() {
    let supported = OutputFormat::supported();
    println!("There are {} export formats available", supported.len());
    for (i, format) in supported.iter().enumerate() {
        println!("{} - {}", i, format);
    }
}
