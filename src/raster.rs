//! Glyph rasterization.
//!
//! `ttf-parser` answers "which characters does this font support" (cmap
//! subtable selection); `ab_glyph` supplies metrics and coverage masks.

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use ab_glyph::{point, Font, FontVec, PxScale, ScaleFont};
use anyhow::Result;
use image::{GrayImage, Luma};
use ttf_parser as ttf;

use crate::{diagnostics::with_quiet_logs, error::AtlasError};

/// One character rendered into a greyscale coverage bitmap.
///
/// The bitmap spans the advance width and the font's line height, not the ink
/// bounding box; a glyph without ink is a blank bitmap of that size.
#[derive(Clone, Debug, PartialEq)]
pub struct Glyph {
    pub character: char,
    pub bitmap: GrayImage,
}

impl Glyph {
    pub fn new(character: char, bitmap: GrayImage) -> Self {
        Self { character, bitmap }
    }

    /// Blank (all-transparent) glyph of the given size.
    pub fn blank(character: char, width: u32, height: u32) -> Self {
        Self::new(character, GrayImage::new(width, height))
    }

    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }

    /// True when no pixel carries coverage.
    pub fn is_blank(&self) -> bool {
        self.bitmap.pixels().all(|p| p[0] == 0)
    }
}

/// Anything that can enumerate characters and render them as [`Glyph`]s.
pub trait GlyphSource {
    /// Supported characters, ascending by code point.
    fn characters(&self) -> Result<Vec<char>>;
    fn rasterize(&self, character: char) -> Glyph;
}

/// cmap subtables in order of preference: full-repertoire Unicode encodings
/// first, BMP-only next, legacy Unicode revisions last.
const CMAP_PREFERENCE: [(ttf::PlatformId, u16); 8] = [
    (ttf::PlatformId::Windows, 10),
    (ttf::PlatformId::Unicode, 6),
    (ttf::PlatformId::Unicode, 4),
    (ttf::PlatformId::Windows, 1),
    (ttf::PlatformId::Unicode, 3),
    (ttf::PlatformId::Unicode, 2),
    (ttf::PlatformId::Unicode, 1),
    (ttf::PlatformId::Unicode, 0),
];

/// A loaded TrueType font rendered at a fixed pixel size.
pub struct FontRasterizer {
    path: PathBuf,
    data: Vec<u8>,
    font: FontVec,
    size: u32,
    scale: PxScale,
}

impl FontRasterizer {
    pub fn open(path: impl AsRef<Path>, size: u32) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|e| AtlasError::FontLoad { path: path.to_path_buf(), reason: e.to_string() })?;
        Self::from_bytes(path, data, size)
    }

    /// Parse `data` as a font; `path` is only used for naming and error messages.
    pub fn from_bytes(path: impl AsRef<Path>, data: Vec<u8>, size: u32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let load_err = |reason: String| AtlasError::FontLoad { path: path.clone(), reason };
        ttf::Face::parse(&data, 0).map_err(|e| load_err(format!("ttf parse failed: {e}")))?;
        let font = FontVec::try_from_vec(data.clone()).map_err(|e| load_err(format!("decode font: {e}")))?;
        // `size` is the em size in pixels; ab_glyph scales by ascent-descent height.
        let units_per_em = font.units_per_em().ok_or_else(|| load_err("missing unitsPerEm".into()))?;
        let scale = PxScale::from(size as f32 * font.height_unscaled() / units_per_em);
        Ok(Self { path, data, font, size, scale })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Whole-pixel ascent above the baseline.
    pub fn ascent(&self) -> u32 {
        self.font.as_scaled(self.scale).ascent().max(0.0).ceil() as u32
    }

    /// Whole-pixel descent below the baseline (positive).
    pub fn descent(&self) -> u32 {
        (-self.font.as_scaled(self.scale).descent()).max(0.0).ceil() as u32
    }

    /// Height of every glyph bitmap produced by this rasterizer.
    pub fn line_height(&self) -> u32 {
        self.ascent() + self.descent()
    }

    /// Advance width in pixels, truncated.
    pub fn advance_width(&self, character: char) -> u32 {
        let scaled = self.font.as_scaled(self.scale);
        scaled.h_advance(self.font.glyph_id(character)).max(0.0).floor() as u32
    }
}

impl GlyphSource for FontRasterizer {
    fn characters(&self) -> Result<Vec<char>> {
        let codes = with_quiet_logs(|| -> Result<BTreeSet<u32>> {
            let face = ttf::Face::parse(&self.data, 0)
                .map_err(|e| AtlasError::FontLoad { path: self.path.clone(), reason: format!("ttf parse failed: {e}") })?;
            Ok(best_cmap_codepoints(&face))
        })?;
        Ok(codes.into_iter().filter_map(char::from_u32).collect())
    }

    fn rasterize(&self, character: char) -> Glyph {
        let width = self.advance_width(character);
        let height = self.line_height();
        let mut bitmap = GrayImage::new(width, height);

        let glyph = self
            .font
            .glyph_id(character)
            .with_scale_and_position(self.scale, point(0.0, self.ascent() as f32));
        let Some(outlined) = self.font.outline_glyph(glyph) else {
            return Glyph::new(character, bitmap);
        };
        let bounds = outlined.px_bounds();
        if bounds.height() <= 0.0 {
            return Glyph::new(character, bitmap);
        }

        // Ink may overhang the advance box (negative bearings, wide italics); clip to it.
        let (ox, oy) = (bounds.min.x as i64, bounds.min.y as i64);
        outlined.draw(|gx, gy, coverage| {
            let (px, py) = (ox + gx as i64, oy + gy as i64);
            if px < 0 || py < 0 || px >= width as i64 || py >= height as i64 {
                return;
            }
            let v = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
            bitmap.put_pixel(px as u32, py as u32, Luma([v]));
        });
        Glyph::new(character, bitmap)
    }
}

/// Code points of the most complete Unicode cmap subtable that map to a real glyph.
pub fn best_cmap_codepoints(face: &ttf::Face<'_>) -> BTreeSet<u32> {
    let mut codes = BTreeSet::new();
    let Some(cmap) = face.tables().cmap else { return codes };
    let subtables: Vec<ttf::cmap::Subtable<'_>> = cmap.subtables.into_iter().collect();

    let best = CMAP_PREFERENCE
        .iter()
        .find_map(|(platform, encoding)| {
            subtables.iter().find(|s| s.platform_id == *platform && s.encoding_id == *encoding)
        })
        .or_else(|| subtables.iter().find(|s| s.is_unicode()));
    let Some(subtable) = best else { return codes };

    subtable.codepoints(|code| {
        if matches!(subtable.glyph_index(code), Some(id) if id.0 != 0) {
            codes.insert(code);
        }
    });
    codes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_glyph_has_size_but_no_ink() {
        let g = Glyph::blank(' ', 5, 12);
        assert_eq!((g.width(), g.height()), (5, 12));
        assert!(g.is_blank());
    }

    #[test]
    fn zero_sized_glyph_is_allowed() {
        let g = Glyph::blank('\u{200B}', 0, 0);
        assert_eq!((g.width(), g.height()), (0, 0));
        assert!(g.is_blank());
    }

    #[test]
    fn missing_font_is_a_load_error() {
        let err = FontRasterizer::open("no/such/font.ttf", 16).err().expect("open must fail");
        assert!(matches!(err.downcast_ref::<AtlasError>(), Some(AtlasError::FontLoad { .. })));
    }

    #[test]
    fn garbage_bytes_are_a_load_error() {
        let err = FontRasterizer::from_bytes("junk.ttf", b"definitely not a font".to_vec(), 16)
            .err()
            .expect("parse must fail");
        match err.downcast_ref::<AtlasError>() {
            Some(AtlasError::FontLoad { path, .. }) => assert_eq!(path, Path::new("junk.ttf")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    // 1000 units/em, ascender 800, descender -200. Glyphs: .notdef (empty,
    // advance 500), space (empty, advance 250), 'A' (box x 100..500, y 0..700,
    // advance 600). At 20px one unit is 0.02px.
    const BOX_FONT: &[u8] = include_bytes!("../assets/fonts/box_test.ttf");

    fn box_font(size: u32) -> FontRasterizer {
        FontRasterizer::from_bytes("box_test.ttf", BOX_FONT.to_vec(), size).expect("bundled font parses")
    }

    fn row_ink(g: &Glyph, y: u32) -> u32 {
        (0..g.width()).map(|x| g.bitmap.get_pixel(x, y)[0] as u32).sum()
    }

    #[test]
    fn bundled_font_metrics() {
        let raster = box_font(20);
        assert_eq!((raster.ascent(), raster.descent()), (16, 4));
        assert_eq!(raster.line_height(), 20);
        assert_eq!(raster.advance_width('A'), 12);
        assert_eq!(raster.advance_width(' '), 5);
    }

    #[test]
    fn bundled_font_characters_skip_notdef() {
        let _lock = crate::diagnostics::level_lock();
        let before = log::max_level();
        assert_eq!(box_font(20).characters().unwrap(), vec![' ', 'A']);
        assert_eq!(log::max_level(), before);
    }

    #[test]
    fn space_is_blank_at_advance_by_line_height() {
        let space = box_font(20).rasterize(' ');
        assert_eq!((space.width(), space.height()), (5, 20));
        assert!(space.is_blank());
    }

    #[test]
    fn ink_is_pasted_at_its_bounding_box_offset() {
        let raster = box_font(20);
        let a = raster.rasterize('A');
        assert_eq!((a.width(), a.height()), (12, 20));
        // Top of the box is ascent - yMax = 16 - 14 = 2; bottom sits on the baseline at row 16.
        let top = (0..a.height()).find(|&y| row_ink(&a, y) > 0).expect("'A' has ink");
        assert_eq!(top, raster.ascent() - 14);
        assert!(a.bitmap.get_pixel(6, 2)[0] >= 250);
        assert!(a.bitmap.get_pixel(6, 15)[0] >= 250);
        assert_eq!(row_ink(&a, 16), 0);
        // Left bearing 100 units = 2px; right edge at 500 units = 10px.
        assert_eq!(a.bitmap.get_pixel(1, 8)[0], 0);
        assert!(a.bitmap.get_pixel(2, 8)[0] >= 250);
        assert!(a.bitmap.get_pixel(9, 8)[0] >= 250);
        assert_eq!(a.bitmap.get_pixel(10, 8)[0], 0);
    }

    #[test]
    fn ink_wider_than_advance_is_clipped() {
        // At 3px the advance truncates to 1px while the box reaches x 1.5.
        for size in [3, 10] {
            let raster = box_font(size);
            let a = raster.rasterize('A');
            assert_eq!((a.width(), a.height()), (raster.advance_width('A'), raster.line_height()));
            assert!(!a.is_blank(), "size {size}");
        }
    }

    #[test]
    fn unmapped_character_falls_back_to_empty_notdef() {
        let g = box_font(20).rasterize('Z');
        assert_eq!((g.width(), g.height()), (10, 20));
        assert!(g.is_blank());
    }

    #[test]
    fn cmap_preference_puts_full_unicode_first() {
        assert_eq!(CMAP_PREFERENCE[0], (ttf::PlatformId::Windows, 10));
        let bmp = CMAP_PREFERENCE.iter().position(|p| *p == (ttf::PlatformId::Windows, 1));
        let legacy = CMAP_PREFERENCE.iter().position(|p| *p == (ttf::PlatformId::Unicode, 0));
        assert!(bmp < legacy);
    }
}
