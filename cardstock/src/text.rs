use std::path::Path;
use std::sync::Arc;

use ttf_parser::Face;

use crate::errors::RenderError;

/// Text measurement at a font size given in pixels.
///
/// This is the seam between layout math and actual font files: the card
/// renderer only talks to this trait, so fitting logic can be exercised
/// with synthetic metrics in tests.
pub trait Measure {
    /// Advance width of a single line of text.
    fn line_width(&self, text: &str, size: f32) -> f32;
    /// Baseline offset below the top of the line box.
    fn ascent(&self, size: f32) -> f32;
}

/// An owned font file plus the metrics the renderer needs from it.
pub struct Typeface {
    data: Vec<u8>,
    family: String,
}

impl Typeface {
    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let data = std::fs::read(path).map_err(|err| RenderError::FontLoad {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        let face = Face::parse(&data, 0).map_err(|err| RenderError::FontLoad {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        let family = face
            .names()
            .into_iter()
            .filter(|name| {
                name.name_id == ttf_parser::name_id::TYPOGRAPHIC_FAMILY
                    || name.name_id == ttf_parser::name_id::FAMILY
            })
            .find_map(|name| name.to_string())
            .ok_or_else(|| RenderError::FontLoad {
                path: path.to_path_buf(),
                reason: String::from("font has no readable family name"),
            })?;
        Ok(Self { data, family })
    }

    /// Family name, as referenced from the card markup.
    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    // Parsing is cheap (no allocation, table lookups only) and the data
    // was validated in load(), so re-parsing per call is fine.
    fn face(&self) -> Face<'_> {
        Face::parse(&self.data, 0).unwrap()
    }
}

impl Measure for Typeface {
    fn line_width(&self, text: &str, size: f32) -> f32 {
        let face = self.face();
        let upem = u32::from(face.units_per_em());
        // Characters without a glyph still advance, by half an em.
        let fallback = u32::from(face.units_per_em() / 2);
        let units: u32 = text
            .chars()
            .map(|ch| {
                face.glyph_index(ch)
                    .and_then(|glyph| face.glyph_hor_advance(glyph))
                    .map(u32::from)
                    .unwrap_or(fallback)
            })
            .sum();
        units as f32 * size / upem as f32
    }

    fn ascent(&self, size: f32) -> f32 {
        let face = self.face();
        f32::from(face.ascender()) * size / f32::from(face.units_per_em())
    }
}

/// The two card fonts plus the font database handed to rasterization.
pub struct FontLibrary {
    pub main: Typeface,
    pub heading: Typeface,
    fontdb: Arc<usvg::fontdb::Database>,
}

impl FontLibrary {
    pub fn load(main_path: &Path, heading_path: &Path) -> Result<Self, RenderError> {
        let main = Typeface::load(main_path)?;
        let heading = Typeface::load(heading_path)?;
        let mut db = usvg::fontdb::Database::new();
        db.load_font_data(main.data().to_vec());
        db.load_font_data(heading.data().to_vec());
        Ok(Self {
            main,
            heading,
            fontdb: Arc::new(db),
        })
    }

    pub fn database(&self) -> Arc<usvg::fontdb::Database> {
        self.fontdb.clone()
    }
}

/// Result of shrinking a line of text until it fits a box.
#[derive(Clone, Copy, Debug)]
pub struct FittedText {
    pub size: f32,
    pub width: f32,
    /// The floor was reached and the text still overflows. A data-quality
    /// warning, not a failure: the card renders, flagged for review.
    pub clipped: bool,
}

// Backstop for degenerate step/floor combinations; the size decrement
// alone already terminates the loop for any sane configuration.
const MAX_FIT_STEPS: u32 = 64;

/// Shrink `start_size` by `step` until `text` fits into `max_width` or
/// `min_size` is reached.
pub fn fit_font_size(
    measure: &dyn Measure,
    text: &str,
    max_width: f32,
    start_size: f32,
    min_size: f32,
    step: f32,
) -> FittedText {
    let mut size = start_size;
    let mut width = measure.line_width(text, size);
    let mut steps = 0;
    while width > max_width && size - step >= min_size && steps < MAX_FIT_STEPS {
        size -= step;
        width = measure.line_width(text, size);
        steps += 1;
    }
    FittedText {
        size,
        width,
        clipped: width > max_width,
    }
}
