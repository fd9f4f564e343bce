//! Compositing glyph bitmaps into the final RGBA atlas image.

use std::{io::Cursor, path::Path};

use anyhow::{Context, Result};
use image::{imageops, GrayImage, ImageFormat, Rgba, RgbaImage};

use crate::{layout::AtlasLayout, output::write_atomic, raster::Glyph};

/// Opaque white.
pub const DEFAULT_BACKGROUND: [u8; 3] = [255, 255, 255];

/// Single-channel coverage canvas of `canvas_size` squared.
///
/// Each glyph bitmap is copied (not blended) at its placement with its own
/// dimensions, so the part of a cell the glyph does not cover stays zero.
/// Anything past the canvas edge is clipped.
pub fn coverage_canvas(glyphs: &[Glyph], layout: &AtlasLayout) -> GrayImage {
    let mut mask = GrayImage::new(layout.canvas_size, layout.canvas_size);
    for (glyph, at) in glyphs.iter().zip(&layout.placements) {
        imageops::replace(&mut mask, &glyph.bitmap, at.x as i64, at.y as i64);
    }
    mask
}

/// Background colour everywhere, coverage as alpha.
pub fn apply_coverage(mask: &GrayImage, background: [u8; 3]) -> RgbaImage {
    let [r, g, b] = background;
    RgbaImage::from_fn(mask.width(), mask.height(), |x, y| Rgba([r, g, b, mask.get_pixel(x, y)[0]]))
}

pub fn composite(glyphs: &[Glyph], layout: &AtlasLayout, background: [u8; 3]) -> RgbaImage {
    apply_coverage(&coverage_canvas(glyphs, layout), background)
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png).context("encode png")?;
    Ok(buf.into_inner())
}

pub fn write_png(image: &RgbaImage, path: &Path) -> Result<()> {
    let bytes = encode_png(image)?;
    write_atomic(path, &bytes)?;
    Ok(())
}
