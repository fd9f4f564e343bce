//! `.fontdata` sidecar: where each character lives in the atlas image.
//!
//! The file is pretty-printed JSON keyed by the literal character:
//!
//! ```text
//! {
//!   "A": {
//!     "char": "A",
//!     "x": 0,
//!     "y": 0,
//!     "width": 10,
//!     "height": 19
//!   }
//! }
//! ```
//!
//! Keys come out in code-point order, so regenerating from the same font
//! produces byte-identical output.
//!
//! Non-ASCII characters are written as raw UTF-8 (`"é"`), not as `\uXXXX`
//! escapes. Any JSON reader decodes both forms to the same key, but a textual
//! diff against an escaped `.fontdata` file will show every such line.

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    layout::{AtlasLayout, Placement},
    output::write_atomic,
    raster::Glyph,
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GlyphRecord {
    #[serde(rename = "char")]
    pub character: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl GlyphRecord {
    pub fn new(glyph: &Glyph, at: Placement) -> Self {
        Self { character: glyph.character.to_string(), x: at.x, y: at.y, width: glyph.width(), height: glyph.height() }
    }
}

/// Character (as a one-character string) to its record.
pub type FontData = BTreeMap<String, GlyphRecord>;

pub fn build_font_data(glyphs: &[Glyph], layout: &AtlasLayout) -> FontData {
    glyphs
        .iter()
        .zip(&layout.placements)
        .map(|(g, at)| (g.character.to_string(), GlyphRecord::new(g, *at)))
        .collect()
}

pub fn to_text(data: &FontData) -> Result<String> {
    serde_json::to_string_pretty(data).context("serialize font data")
}

pub fn write_font_data(data: &FontData, path: &Path) -> Result<()> {
    let text = to_text(data)?;
    write_atomic(path, text.as_bytes())?;
    Ok(())
}

pub fn read_font_data(path: &Path) -> Result<FontData> {
    let txt = fs::read_to_string(path).with_context(|| format!("read font data {}", path.display()))?;
    serde_json::from_str(&txt).with_context(|| format!("parse font data {}", path.display()))
}
