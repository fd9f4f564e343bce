use std::{fmt, io, path::PathBuf};

/// Fatal failure categories of atlas generation.
///
/// Functions return `anyhow::Result`; callers that need to branch on the
/// category can `downcast_ref::<AtlasError>()`.
#[derive(Debug)]
pub enum AtlasError {
    /// Font file missing, unreadable or not a parseable TrueType/OpenType face.
    FontLoad { path: PathBuf, reason: String },
    /// The font exposes no supported characters, so there is no grid to lay out.
    EmptyGlyphSet,
    /// Writing an output artifact failed. Nothing is left under `path`.
    Output { path: PathBuf, source: io::Error },
}

impl fmt::Display for AtlasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtlasError::FontLoad { path, reason } => write!(f, "load font {}: {reason}", path.display()),
            AtlasError::EmptyGlyphSet => write!(f, "font has no supported characters; cannot lay out an empty atlas"),
            AtlasError::Output { path, source } => write!(f, "write {}: {source}", path.display()),
        }
    }
}

impl std::error::Error for AtlasError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AtlasError::Output { source, .. } => Some(source),
            _ => None,
        }
    }
}
