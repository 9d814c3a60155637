use std::path::PathBuf;

use serde::Deserialize;

const MM_PER_INCH: f64 = 25.4;

/// Physical and typographic constants for one rendering run.
///
/// Loaded once and read-only afterwards. Every key must be present; the
/// loader does not invent defaults.
#[derive(Clone, Debug, Deserialize)]
pub struct CardLayout {
    pub dpi: u32,
    /// Printed card width in mm, excluding the cut border.
    pub width: f64,
    /// Printed card height in mm, excluding the cut border.
    pub height: f64,
    /// Extra margin around the printed card, in mm.
    pub cut_border: f64,
    /// Inset of the colored card panel from the cut boundary, in mm.
    pub card_border: f64,
    /// Whether to draw the faint cut-guide rectangle.
    pub cut_guide: bool,
    /// Fill color of the name and statistic backdrop boxes.
    pub box_color: String,
    pub font_main: PathBuf,
    pub font_heading: PathBuf,
    /// Back-design image, shown through the rounded interior of the card back.
    pub back_image: PathBuf,
    /// Category icons, pasted last at fixed positions.
    pub icons: Vec<IconPlacement>,
}

/// One icon file and its position on the card, in mm.
#[derive(Clone, Debug, Deserialize)]
pub struct IconPlacement {
    pub file: PathBuf,
    pub x: f64,
    pub y: f64,
}

impl CardLayout {
    pub fn scale(&self) -> Scale {
        Scale::new(self.dpi)
    }
}

/// Millimetre to pixel conversion at a fixed DPI. Every coordinate, box,
/// radius and icon placement goes through [`Scale::px`], so the whole card
/// scales consistently with the configured DPI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scale {
    dpi: u32,
}

impl Scale {
    pub fn new(dpi: u32) -> Self {
        Self { dpi }
    }

    pub fn px(&self, mm: f64) -> i32 {
        (mm * f64::from(self.dpi) / MM_PER_INCH).round() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn px_rounds_to_the_nearest_pixel() {
        let scale = Scale::new(300);
        // 4.8 mm is not an integer multiple of 25.4/300 mm.
        assert_eq!(scale.px(4.8), 57);
        assert_eq!(scale.px(25.4), 300);
        assert_eq!(scale.px(0.2), 2);
        assert_eq!(scale.px(0.0), 0);
    }

    #[test]
    fn px_scales_linearly_with_dpi() {
        assert_eq!(Scale::new(150).px(50.8), 300);
        assert_eq!(Scale::new(300).px(50.8), 600);
    }
}
