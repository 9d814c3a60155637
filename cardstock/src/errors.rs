use std::path::PathBuf;

/// The error type for building the configured selection groups.
#[derive(Debug)]
pub enum SelectionError {
    /// A group was configured with zero cards.
    EmptyGroup { category: String },
}

impl std::error::Error for SelectionError {}

impl std::fmt::Display for SelectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionError::EmptyGroup { category } => {
                write!(f, "Group '{}' is configured to select zero games", category)
            }
        }
    }
}

/// The error type for rendering a single card. A failed card aborts only
/// itself, never the surrounding run.
#[derive(Debug)]
pub enum RenderError {
    /// The artwork cache has no entry for this game. The card is unusable
    /// without its art, so this is fatal for the card.
    MissingArtwork { id: u64, path: PathBuf },
    /// A font file could not be read or parsed.
    FontLoad { path: PathBuf, reason: String },
    /// The composed card markup was rejected by the rasterizer.
    Svg { reason: String },
    /// The pixel buffer for the card could not be allocated.
    CanvasAlloc { width: u32, height: u32 },
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    PngEncode {
        source: png::EncodingError,
    },
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Io { source, .. } => Some(source),
            RenderError::PngEncode { source } => Some(source),
            _ => None,
        }
    }
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::MissingArtwork { id, path } => write!(
                f,
                "No cached artwork for game {} at '{}'",
                id,
                path.display()
            ),
            RenderError::FontLoad { path, reason } => {
                write!(f, "Could not load font '{}': {}", path.display(), reason)
            }
            RenderError::Svg { reason } => write!(f, "Card markup was rejected: {}", reason),
            RenderError::CanvasAlloc { width, height } => {
                write!(f, "Could not allocate a {}x{} canvas", width, height)
            }
            RenderError::Io { path, source } => {
                write!(f, "IO error on '{}': {}", path.display(), source)
            }
            RenderError::PngEncode { source } => write!(f, "PNG encoding failed: {}", source),
        }
    }
}
