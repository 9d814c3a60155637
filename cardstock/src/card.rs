use std::path::Path;

use tiny_skia::Pixmap;
use tracing::warn;

use crate::canvas::{rasterize, SvgCanvas};
use crate::errors::RenderError;
use crate::format::{compact_number, compact_range};
use crate::game::GameRecord;
use crate::layout::{CardLayout, Scale};
use crate::poll::poll_summary;
use crate::selection::{SelectedGame, SelectionGroup};
use crate::text::{fit_font_size, FontLibrary, Measure};

// Card geometry in millimetres. The canvas dimensions, borders, DPI,
// fonts and icon placements come from the layout configuration; the
// positions of the elements on the card are fixed here.
const GUIDE_RADIUS: f64 = 5.0;
const PANEL_RADIUS: f64 = 3.0;
const BOX_RADIUS: f64 = 1.0;

const HEADER_BOTTOM: f64 = 20.0;
const HEADER_STRIP_TOP: f64 = 13.0;
const HEADER_TEXT_LEFT: f64 = 9.0;
const HEADER_TOP: f64 = 7.0;
const HEADER_SIZE: f64 = 4.8;

const ART_TOP: f64 = 14.0;
const ART_MAX_WIDTH: f64 = 49.0;
const ART_MAX_HEIGHT: f64 = 37.0;

const NAME_BOX_LEFT: f64 = 9.0;
const NAME_BOX_TOP: f64 = 52.0;
const NAME_BOX_RIGHT: f64 = 56.0;
const NAME_BOX_BOTTOM: f64 = 57.0;
const NAME_MAX_WIDTH: f64 = 47.5;
const NAME_BASELINE: f64 = 55.8;
const NAME_SIZE: f64 = 4.8;
const NAME_MIN_SIZE: f64 = 2.0;
const NAME_SIZE_STEP: f64 = 0.2;

const STAT_TOP: f64 = 58.0;
const STAT_BOX_HEIGHT: f64 = 5.0;
const STAT_STEP: f64 = 6.0;
const STAT_ROWS: usize = 5;
const STAT_LEFT_BOX_LEFT: f64 = 9.0;
const STAT_LEFT_BOX_RIGHT: f64 = 30.0;
const STAT_RIGHT_BOX_LEFT: f64 = 35.0;
const STAT_RIGHT_BOX_RIGHT: f64 = 56.0;
const STAT_LEFT_TEXT: f64 = 14.0;
const STAT_RIGHT_TEXT: f64 = 40.0;
const STAT_SIZE: f64 = 4.0;

const ICON_SIZE: f64 = 3.0;

// Play counts up to this render as tally marks, larger ones as a number.
const TALLY_LIMIT: u32 = 10;
const TALLY_X: f64 = 40.0;
const TALLY_Y: f64 = 83.0;
const TALLY_HEIGHT: f64 = 3.0;
const TALLY_STEP: f64 = 0.6;
const TALLY_GROUP_STEP: f64 = 0.8;
const TALLY_STROKE: f64 = 0.2;

const WHITE: &str = "#ffffff";
const BLACK: &str = "#000000";
const GUIDE_COLOR: &str = "#c8c8c8";

/// Everything the renderer needs to know about one card: the game record
/// plus its position and colors within its selection group.
pub struct CardFace<'a> {
    pub record: &'a GameRecord,
    pub index: usize,
    pub group: &'a str,
    pub category: &'a str,
    pub base_color: &'a str,
    pub header_color: &'a str,
}

impl<'a> CardFace<'a> {
    pub fn new(group: &'a SelectionGroup, selected: &'a SelectedGame) -> Self {
        Self {
            record: &selected.record,
            index: selected.index,
            group: &group.label,
            category: &group.category,
            base_color: &group.base_color,
            header_color: &group.header_color,
        }
    }

    /// With a different record than the one embedded in the selection,
    /// e.g. when the collection is the source of truth for game data.
    pub fn with_record(
        group: &'a SelectionGroup,
        selected: &'a SelectedGame,
        record: &'a GameRecord,
    ) -> Self {
        Self {
            record,
            ..Self::new(group, selected)
        }
    }

    /// Output identity of this card, e.g. `A3-174430`.
    pub fn file_stem(&self) -> String {
        format!("{}{}-{}", self.group, self.index, self.record.id)
    }
}

pub struct CardRenderer<'a> {
    layout: &'a CardLayout,
    fonts: &'a FontLibrary,
}

impl<'a> CardRenderer<'a> {
    pub fn new(layout: &'a CardLayout, fonts: &'a FontLibrary) -> Self {
        Self { layout, fonts }
    }

    fn canvas_size(&self) -> (i32, i32) {
        let scale = self.layout.scale();
        let cut = scale.px(self.layout.cut_border);
        (
            scale.px(self.layout.width) + 2 * cut,
            scale.px(self.layout.height) + 2 * cut,
        )
    }

    /// Render one game as a card. The artwork must already sit in the
    /// cache; a card without its art is useless, so that aborts the card.
    pub fn render(&self, face: &CardFace<'_>, artwork: &Path) -> Result<Pixmap, RenderError> {
        if !artwork.is_file() {
            return Err(RenderError::MissingArtwork {
                id: face.record.id,
                path: artwork.to_path_buf(),
            });
        }

        let scale = self.layout.scale();
        let (width, height) = self.canvas_size();
        let cut = scale.px(self.layout.cut_border);
        let border = cut + scale.px(self.layout.card_border);
        let right = scale.px(self.layout.width) + cut;
        let bottom = scale.px(self.layout.height) + cut;
        let game = face.record;

        let mut canvas = SvgCanvas::new(width, height, WHITE);
        if self.layout.cut_guide {
            canvas.stroke_rounded_rect(cut, cut, right, bottom, scale.px(GUIDE_RADIUS), GUIDE_COLOR);
        }

        // Card panel in the group's base color.
        canvas.fill_rounded_rect(
            border,
            border,
            right - border + cut,
            bottom - border + cut,
            scale.px(PANEL_RADIUS),
            face.base_color,
        );

        // Backdrops: name box, then one column of stat boxes per side.
        canvas.fill_rounded_rect(
            scale.px(NAME_BOX_LEFT),
            scale.px(NAME_BOX_TOP),
            scale.px(NAME_BOX_RIGHT),
            scale.px(NAME_BOX_BOTTOM),
            scale.px(BOX_RADIUS),
            &self.layout.box_color,
        );
        self.row_of_boxes(
            &mut canvas,
            scale,
            scale.px(STAT_LEFT_BOX_LEFT),
            scale.px(STAT_LEFT_BOX_RIGHT),
        );
        self.row_of_boxes(
            &mut canvas,
            scale,
            scale.px(STAT_RIGHT_BOX_LEFT),
            scale.px(STAT_RIGHT_BOX_RIGHT),
        );

        // Header band with its lower strip in the base color.
        canvas.fill_rounded_rect(
            border,
            border,
            right - border + cut,
            scale.px(HEADER_BOTTOM),
            scale.px(PANEL_RADIUS),
            face.header_color,
        );
        canvas.fill_rect(
            border,
            scale.px(HEADER_STRIP_TOP),
            right - border + cut,
            scale.px(HEADER_BOTTOM),
            face.base_color,
        );

        let heading = &self.fonts.heading;
        let heading_family = heading.family();
        let heading_size = scale.px(HEADER_SIZE) as f32;
        let heading_baseline = scale.px(HEADER_TOP) as f32 + heading.ascent(heading_size);
        canvas.text(
            scale.px(HEADER_TEXT_LEFT) as f32,
            heading_baseline,
            &format!("{}{}", face.index, face.group),
            heading_family,
            heading_size,
            WHITE,
        );
        let category_width = heading.line_width(face.category, heading_size);
        canvas.text(
            (width as f32 - category_width) / 2.0,
            heading_baseline,
            face.category,
            heading_family,
            heading_size,
            WHITE,
        );

        // Game name, shrunk to fit its box and centered.
        let fitted = fit_font_size(
            heading,
            &game.name,
            scale.px(NAME_MAX_WIDTH) as f32,
            scale.px(NAME_SIZE) as f32,
            scale.px(NAME_MIN_SIZE) as f32,
            (scale.px(NAME_SIZE_STEP) as f32).max(1.0),
        );
        if fitted.clipped {
            warn!(
                id = game.id,
                name = %game.name,
                "game name does not fit the name box even at minimum size, flagging for review"
            );
        }
        canvas.text(
            (width as f32 - fitted.width) / 2.0,
            scale.px(NAME_BASELINE) as f32,
            &game.name,
            heading_family,
            fitted.size,
            BLACK,
        );

        // Statistic readouts. A missing value leaves its backdrop blank
        // rather than failing the card.
        let main = &self.fonts.main;
        let main_family = main.family();
        let stat_size = scale.px(STAT_SIZE) as f32;
        let stat_left = scale.px(STAT_LEFT_TEXT) as f32;
        let stat_right = scale.px(STAT_RIGHT_TEXT) as f32;
        let baseline =
            |row: usize| scale.px(STAT_TOP + row as f64 * STAT_STEP) as f32 + main.ascent(stat_size);
        let stat = |canvas: &mut SvgCanvas, x: f32, row: usize, value: String| {
            canvas.text(x, baseline(row), &value, main_family, stat_size, BLACK);
        };

        stat(&mut canvas, stat_left, 0, game.year_published.to_string());
        stat(
            &mut canvas,
            stat_left,
            1,
            compact_range(game.min_playtime, game.max_playtime),
        );
        if let Some(rating) = game.average_rating {
            stat(&mut canvas, stat_left, 2, format!("{:.2}", rating));
        }
        stat(&mut canvas, stat_left, 3, compact_number(game.owned_count));
        if let Some(weight) = game.average_weight {
            stat(&mut canvas, stat_left, 4, format!("{:.2}", weight));
        }

        stat(
            &mut canvas,
            stat_right,
            0,
            compact_range(game.min_players, game.max_players),
        );
        stat(
            &mut canvas,
            stat_right,
            1,
            poll_summary(&game.player_count_poll),
        );
        stat(
            &mut canvas,
            stat_right,
            2,
            format!("{}+", game.age_recommendation),
        );
        if let Some(rating) = game.user_rating {
            stat(&mut canvas, stat_right, 3, rating.to_string());
        }
        if game.user_play_count > TALLY_LIMIT {
            stat(&mut canvas, stat_right, 4, game.user_play_count.to_string());
        } else {
            let stroke = scale.px(TALLY_STROKE).max(1);
            for (x0, y0, x1, y1) in tally_segments(game.user_play_count) {
                canvas.line(
                    scale.px(x0),
                    scale.px(y0),
                    scale.px(x1),
                    scale.px(y1),
                    stroke,
                    BLACK,
                );
            }
        }

        // Artwork, centered within its box, then the icons on top of
        // everything.
        canvas.fitted_image(
            (width - scale.px(ART_MAX_WIDTH)) / 2,
            scale.px(ART_TOP),
            scale.px(ART_MAX_WIDTH),
            scale.px(ART_MAX_HEIGHT),
            artwork,
        );
        for icon in &self.layout.icons {
            canvas.fitted_image(
                scale.px(icon.x),
                scale.px(icon.y),
                scale.px(ICON_SIZE),
                scale.px(ICON_SIZE),
                &icon.file,
            );
        }

        rasterize(&canvas.finish(), self.fonts, width as u32, height as u32)
    }

    /// The shared card back: the back design shows through the rounded
    /// interior of the card, the cut margin stays blank.
    pub fn render_back(&self) -> Result<Pixmap, RenderError> {
        let back = self.layout.back_image.as_path();
        if !back.is_file() {
            return Err(RenderError::Io {
                path: back.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }

        let scale = self.layout.scale();
        let (width, height) = self.canvas_size();
        let cut = scale.px(self.layout.cut_border);
        let border = cut + scale.px(self.layout.card_border);
        let right = scale.px(self.layout.width) + cut;
        let bottom = scale.px(self.layout.height) + cut;

        let mut canvas = SvgCanvas::new(width, height, WHITE);
        if self.layout.cut_guide {
            canvas.stroke_rounded_rect(cut, cut, right, bottom, scale.px(GUIDE_RADIUS), GUIDE_COLOR);
        }
        canvas.rounded_window_image(
            border,
            border,
            right - border + cut,
            bottom - border + cut,
            scale.px(PANEL_RADIUS),
            back,
        );

        rasterize(&canvas.finish(), self.fonts, width as u32, height as u32)
    }

    fn row_of_boxes(&self, canvas: &mut SvgCanvas, scale: Scale, left: i32, right: i32) {
        let mut top = scale.px(STAT_TOP);
        for _ in 0..STAT_ROWS {
            canvas.fill_rounded_rect(
                left,
                top,
                right,
                top + scale.px(STAT_BOX_HEIGHT),
                scale.px(BOX_RADIUS),
                &self.layout.box_color,
            );
            top += scale.px(STAT_STEP);
        }
    }
}

/// Five-bar tally notation, in mm: four vertical strokes at a small step,
/// then a diagonal strike back across the group advancing by a larger one.
fn tally_segments(count: u32) -> Vec<(f64, f64, f64, f64)> {
    let mut segments = Vec::new();
    let mut x = TALLY_X;
    for i in 0..count {
        if (i + 1) % 5 == 0 {
            segments.push((x, TALLY_Y, x - TALLY_HEIGHT, TALLY_Y + TALLY_HEIGHT));
            x += TALLY_GROUP_STEP;
        } else {
            segments.push((x, TALLY_Y, x, TALLY_Y + TALLY_HEIGHT));
            x += TALLY_STEP;
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn three_plays_are_three_vertical_strokes() {
        let segments = tally_segments(3);
        assert_eq!(segments.len(), 3);
        for (i, &(x0, y0, x1, y1)) in segments.iter().enumerate() {
            assert!(close(x0, TALLY_X + i as f64 * TALLY_STEP));
            assert_eq!(x0, x1);
            assert!(close(y1 - y0, TALLY_HEIGHT));
        }
    }

    #[test]
    fn every_fifth_stroke_strikes_back_across_the_group() {
        let segments = tally_segments(5);
        assert_eq!(segments.len(), 5);
        let (x0, y0, x1, y1) = segments[4];
        // Diagonal, leaning back over the four vertical strokes.
        assert!(close(x1, x0 - TALLY_HEIGHT));
        assert!(close(y1 - y0, TALLY_HEIGHT));
        assert!(x1 < segments[0].0);
    }

    #[test]
    fn groups_advance_by_the_larger_step() {
        let segments = tally_segments(7);
        // The sixth stroke starts a new group after the strike.
        let fifth_x = TALLY_X + 4.0 * TALLY_STEP;
        assert!(close(segments[5].0, fifth_x + TALLY_GROUP_STEP));
        assert!(close(segments[6].0, fifth_x + TALLY_GROUP_STEP + TALLY_STEP));
    }

    #[test]
    fn zero_plays_draw_nothing() {
        assert!(tally_segments(0).is_empty());
    }

    #[test]
    fn file_stem_is_group_then_index_then_id() {
        use std::collections::{BTreeMap, BTreeSet};

        let record = GameRecord {
            id: 174430,
            name: String::from("Gloomhaven"),
            image: String::new(),
            year_published: 2017,
            min_players: 1,
            max_players: 4,
            min_playtime: 60,
            max_playtime: 120,
            average_rating: None,
            bgg_rank: None,
            owned_count: 0,
            average_weight: None,
            user_rating: None,
            user_play_count: 0,
            age_recommendation: 14,
            player_count_poll: BTreeMap::new(),
            category_ids: BTreeSet::new(),
        };
        let group = SelectionGroup {
            label: String::from("A"),
            category: String::from("Top ranked"),
            base_color: String::from("#5d8aa8"),
            header_color: String::from("#00308f"),
            games: Vec::new(),
        };
        let selected = SelectedGame {
            index: 3,
            group: String::from("A"),
            record: record.clone(),
        };
        let face = CardFace::with_record(&group, &selected, &record);
        assert_eq!(face.file_stem(), "A3-174430");
    }
}
