//! Read a generated atlas back and sanity-check it.

use std::path::Path;

use anyhow::{bail, Context, Result};
use image::GenericImageView;

use crate::fontdata::{read_font_data, FontData};

#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    pub glyph_count: usize,
    /// Image dimensions, when a PNG was supplied.
    pub atlas_dim: Option<(u32, u32)>,
    /// Largest width and height over all entries.
    pub max_glyph: (u32, u32),
    /// Entries whose box reaches past the image edge.
    pub out_of_bounds: Vec<String>,
    /// Entries whose key and `char` field disagree.
    pub mismatched_keys: Vec<String>,
}

impl Inspection {
    pub fn is_clean(&self) -> bool {
        self.out_of_bounds.is_empty() && self.mismatched_keys.is_empty()
    }
}

pub fn inspect(fontdata_path: &Path, maybe_png: Option<&Path>) -> Result<Inspection> {
    let data = read_font_data(fontdata_path)?;
    let atlas_dim = match maybe_png {
        Some(p) => {
            let img = image::open(p).with_context(|| format!("open atlas {}", p.display()))?;
            let (w, h) = img.dimensions();
            if w != h || !w.is_power_of_two() {
                bail!("atlas {} is {w}x{h}; expected a power-of-two square", p.display());
            }
            Some((w, h))
        }
        None => None,
    };
    Ok(summarize(&data, atlas_dim))
}

pub fn summarize(data: &FontData, atlas_dim: Option<(u32, u32)>) -> Inspection {
    let mut max_glyph = (0, 0);
    let mut out_of_bounds = Vec::new();
    let mut mismatched_keys = Vec::new();
    for (key, rec) in data {
        max_glyph = (max_glyph.0.max(rec.width), max_glyph.1.max(rec.height));
        if *key != rec.character || key.chars().count() != 1 {
            mismatched_keys.push(key.clone());
        }
        if let Some((w, h)) = atlas_dim {
            if rec.x as u64 + rec.width as u64 > w as u64 || rec.y as u64 + rec.height as u64 > h as u64 {
                out_of_bounds.push(key.clone());
            }
        }
    }
    Inspection { glyph_count: data.len(), atlas_dim, max_glyph, out_of_bounds, mismatched_keys }
}
