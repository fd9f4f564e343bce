//! Bitmap font baker
//!
//! Renders every character a TrueType font supports into one power-of-two PNG
//! atlas and writes a `.fontdata` JSON sidecar locating each character.
//!
//! Usage:
//!   cargo run -- assets/fonts/box_test.ttf 16 out/
//!   cargo run -- /usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf 13 out/ --config atlas.ron --inspect
//!
//! The first produces `out/box_test.16.png` and `out/box_test.16.fontdata`.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use bont::{config::AtlasConfig, generate_bitmap_font_with, inspect::inspect};
use clap::Parser;
use log::warn;

#[derive(Parser, Debug)]
#[command(about = "Bake a TrueType font into a bitmap atlas + .fontdata", version, author)]
struct Args {
    /// TrueType / OpenType font file.
    font: PathBuf,
    /// Em size in pixels.
    size: u32,
    /// Directory receiving `<font-stem>.<size>.png` and `.fontdata`.
    #[arg(default_value = ".")]
    out_dir: PathBuf,
    /// RON file with `AtlasConfig` fields (background, file_stem).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Read the written artifacts back and print a summary.
    #[arg(long)]
    inspect: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(p) => AtlasConfig::load_from_file(p).map_err(|e| anyhow::anyhow!("{}: {e}", p.display()))?,
        None => AtlasConfig::default(),
    };
    cfg.size = args.size;

    fs::create_dir_all(&args.out_dir).with_context(|| format!("create {}", args.out_dir.display()))?;
    let outputs = generate_bitmap_font_with(&args.font, &args.out_dir, &cfg)?;
    println!("Generated {} + {}", outputs.png.display(), outputs.font_data.display());

    if args.inspect {
        let report = inspect(&outputs.font_data, Some(&outputs.png))?;
        let (w, h) = report.atlas_dim.unwrap_or_default();
        println!(
            "Atlas: {}x{} glyphs={} max_glyph={}x{}",
            w, h, report.glyph_count, report.max_glyph.0, report.max_glyph.1
        );
        if !report.out_of_bounds.is_empty() {
            warn!("{} glyphs extend past the canvas edge: {:?}", report.out_of_bounds.len(), report.out_of_bounds);
        }
    }
    Ok(())
}
