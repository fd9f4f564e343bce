//! The atlas aggregate and the top-level generation entry points.
//!
//! A [`FontAtlas`] starts out unpopulated. The first request for the image or
//! the metadata rasterizes every supported character and lays the grid out;
//! later requests reuse that result.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::RgbaImage;
use log::{info, warn};

use crate::{
    compose::{self, DEFAULT_BACKGROUND},
    config::AtlasConfig,
    error::AtlasError,
    fontdata::{self, FontData},
    layout::{compute_layout, AtlasLayout, Placement},
    raster::{FontRasterizer, Glyph, GlyphSource},
};

/// Rasterized glyphs in code-point order plus their computed layout.
#[derive(Clone, Debug)]
pub struct PackedAtlas {
    pub glyphs: Vec<Glyph>,
    pub layout: AtlasLayout,
}

impl PackedAtlas {
    pub fn from_glyphs(glyphs: Vec<Glyph>) -> Result<Self, AtlasError> {
        let layout = compute_layout(&glyphs)?;
        Ok(Self { glyphs, layout })
    }

    pub fn placed(&self) -> impl Iterator<Item = (&Glyph, Placement)> + '_ {
        self.glyphs.iter().zip(self.layout.placements.iter().copied())
    }

    pub fn render(&self, background: [u8; 3]) -> RgbaImage {
        compose::composite(&self.glyphs, &self.layout, background)
    }

    pub fn font_data(&self) -> FontData {
        fontdata::build_font_data(&self.glyphs, &self.layout)
    }
}

pub struct FontAtlas<S: GlyphSource = FontRasterizer> {
    source: S,
    background: [u8; 3],
    /// `None` until the first rasterize + layout pass.
    packed: Option<PackedAtlas>,
}

impl FontAtlas<FontRasterizer> {
    /// Load the font at `path`; fails before any output exists if it cannot be parsed.
    pub fn open(path: impl AsRef<Path>, size: u32) -> Result<Self> {
        Ok(Self::new(FontRasterizer::open(path, size)?))
    }
}

impl<S: GlyphSource> FontAtlas<S> {
    pub fn new(source: S) -> Self {
        Self { source, background: DEFAULT_BACKGROUND, packed: None }
    }

    pub fn with_background(mut self, background: [u8; 3]) -> Self {
        self.background = background;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn is_populated(&self) -> bool {
        self.packed.is_some()
    }

    /// Rasterize and lay out on first call; return the cached result afterwards.
    pub fn ensure_populated(&mut self) -> Result<&PackedAtlas> {
        let packed = match self.packed.take() {
            Some(packed) => packed,
            None => pack(&self.source)?,
        };
        Ok(&*self.packed.insert(packed))
    }

    pub fn render(&mut self) -> Result<RgbaImage> {
        let background = self.background;
        Ok(self.ensure_populated()?.render(background))
    }

    pub fn font_data(&mut self) -> Result<FontData> {
        Ok(self.ensure_populated()?.font_data())
    }

    pub fn write_image(&mut self, png_file: &Path) -> Result<()> {
        info!("Writing image: {}", png_file.display());
        let image = self.render()?;
        compose::write_png(&image, png_file).with_context(|| format!("write atlas image {}", png_file.display()))
    }

    pub fn write_font_data(&mut self, font_data_file: &Path) -> Result<()> {
        info!("Writing font data: {}", font_data_file.display());
        let data = self.font_data()?;
        fontdata::write_font_data(&data, font_data_file)
            .with_context(|| format!("write font data {}", font_data_file.display()))
    }
}

fn pack<S: GlyphSource>(source: &S) -> Result<PackedAtlas> {
    let mut characters = source.characters()?;
    characters.sort_unstable();
    characters.dedup();
    let glyphs: Vec<Glyph> = characters.into_iter().map(|c| source.rasterize(c)).collect();
    let packed = PackedAtlas::from_glyphs(glyphs)?;
    let l = &packed.layout;
    info!(
        "Packed {} glyphs: grid {}x{} cell {}x{} canvas {}",
        packed.glyphs.len(),
        l.columns,
        l.rows,
        l.cell_width,
        l.cell_height,
        l.canvas_size
    );
    Ok(packed)
}

/// Paths of the two artifacts written by a generation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AtlasOutputs {
    pub png: PathBuf,
    pub font_data: PathBuf,
}

impl AtlasOutputs {
    pub fn new(output_dir: &Path, name: &str) -> Self {
        Self {
            png: output_dir.join(format!("{name}.png")),
            font_data: output_dir.join(format!("{name}.fontdata")),
        }
    }
}

/// Write `<font-stem>.<size>.png` and `<font-stem>.<size>.fontdata` into `output_dir`.
pub fn generate_bitmap_font(ttf_font_file: &Path, output_dir: &Path, size: u32) -> Result<AtlasOutputs> {
    generate_bitmap_font_with(ttf_font_file, output_dir, &AtlasConfig::with_size(size))
}

pub fn generate_bitmap_font_with(ttf_font_file: &Path, output_dir: &Path, cfg: &AtlasConfig) -> Result<AtlasOutputs> {
    for w in cfg.validate() {
        warn!("config: {w}");
    }
    let source = FontRasterizer::open(ttf_font_file, cfg.size)?;
    let outputs = AtlasOutputs::new(output_dir, &cfg.output_name(ttf_font_file));
    write_atlas(FontAtlas::new(source).with_background(cfg.background), &outputs)?;
    Ok(outputs)
}

/// Populate once, then write both artifacts.
///
/// Population runs before the first write so an empty glyph set leaves no files behind.
pub fn write_atlas<S: GlyphSource>(mut atlas: FontAtlas<S>, outputs: &AtlasOutputs) -> Result<()> {
    atlas.ensure_populated()?;
    atlas.write_image(&outputs.png)?;
    atlas.write_font_data(&outputs.font_data)?;
    Ok(())
}
