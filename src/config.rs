// Atlas generation settings, loadable from a RON file.
// Missing fields fall back to defaults.

use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::compose::DEFAULT_BACKGROUND;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct AtlasConfig {
    /// Font em size in pixels.
    pub size: u32,
    /// RGB fill of the atlas; glyph coverage becomes the alpha channel.
    pub background: [u8; 3],
    /// Output name stem. Defaults to the font file stem.
    pub file_stem: Option<String>,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self { size: 16, background: DEFAULT_BACKGROUND, file_stem: None }
    }
}

impl AtlasConfig {
    pub fn with_size(size: u32) -> Self {
        Self { size, ..Self::default() }
    }

    /// Load from a single RON file (errors contain human-readable context).
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let data = fs::read_to_string(&path).map_err(|e| format!("read config: {e}"))?;
        ron::from_str(&data).map_err(|e| format!("parse RON: {e}"))
    }

    /// Load file; on failure returns default config plus error string.
    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, Option<String>) {
        match Self::load_from_file(&path) {
            Ok(cfg) => (cfg, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Produce validation warnings (non-fatal) for suspicious values.
    pub fn validate(&self) -> Vec<String> {
        let mut w = Vec::new();
        if self.size == 0 {
            w.push("size is 0; every glyph will be empty".into());
        }
        if self.size > 512 {
            w.push(format!("size {} very large; atlas may exceed texture limits", self.size));
        }
        if let Some(stem) = &self.file_stem {
            if stem.is_empty() {
                w.push("file_stem is empty; outputs would be named '.<size>.png'".into());
            }
            if stem.contains(['/', '\\']) {
                w.push(format!("file_stem '{stem}' contains a path separator"));
            }
        }
        w
    }

    /// `<stem>.<size>`, the shared base name of both artifacts.
    pub fn output_name(&self, font_path: &Path) -> String {
        let stem = match &self.file_stem {
            Some(s) => s.clone(),
            None => font_path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_else(|| "font".into()),
        };
        format!("{stem}.{}", self.size)
    }
}
