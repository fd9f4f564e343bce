pub mod atlas;
pub mod compose;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fontdata;
pub mod inspect;
pub mod layout;
pub mod output;
pub mod raster;

// Curated re-exports
pub use atlas::{generate_bitmap_font, generate_bitmap_font_with, AtlasOutputs, FontAtlas, PackedAtlas};
pub use config::AtlasConfig;
pub use error::AtlasError;
pub use layout::{compute_layout, AtlasLayout, Placement};
pub use raster::{FontRasterizer, Glyph, GlyphSource};
