use std::fmt::Write as _;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tiny_skia::Pixmap;

use crate::errors::RenderError;
use crate::text::FontLibrary;

/// A card canvas, composed as SVG markup and rasterized in one go.
///
/// Elements paint in insertion order, later ones over earlier ones; the
/// renderer relies on that for its layering.
pub struct SvgCanvas {
    width: i32,
    height: i32,
    defs: String,
    body: String,
    clip_count: usize,
}

impl SvgCanvas {
    pub fn new(width: i32, height: i32, background: &str) -> Self {
        let mut canvas = Self {
            width,
            height,
            defs: String::new(),
            body: String::new(),
            clip_count: 0,
        };
        let _ = write!(
            canvas.body,
            "<rect x='0' y='0' width='{}' height='{}' fill='{}'/>",
            width, height, background
        );
        canvas
    }

    pub fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: &str) {
        let _ = write!(
            self.body,
            "<rect x='{}' y='{}' width='{}' height='{}' fill='{}'/>",
            x0,
            y0,
            x1 - x0,
            y1 - y0,
            color
        );
    }

    pub fn fill_rounded_rect(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        radius: i32,
        color: &str,
    ) {
        let _ = write!(
            self.body,
            "<rect x='{}' y='{}' width='{}' height='{}' rx='{}' fill='{}'/>",
            x0,
            y0,
            x1 - x0,
            y1 - y0,
            radius,
            color
        );
    }

    /// Hairline rounded outline, used for the cut guide.
    pub fn stroke_rounded_rect(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        radius: i32,
        color: &str,
    ) {
        let _ = write!(
            self.body,
            "<rect x='{}' y='{}' width='{}' height='{}' rx='{}' fill='none' stroke='{}' stroke-width='1'/>",
            x0,
            y0,
            x1 - x0,
            y1 - y0,
            radius,
            color
        );
    }

    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, stroke_width: i32, color: &str) {
        let _ = write!(
            self.body,
            "<line x1='{}' y1='{}' x2='{}' y2='{}' stroke='{}' stroke-width='{}'/>",
            x0, y0, x1, y1, color, stroke_width
        );
    }

    /// Text with `y` on the baseline, sized in pixels.
    pub fn text(&mut self, x: f32, y: f32, content: &str, family: &str, size: f32, color: &str) {
        let _ = write!(
            self.body,
            "<text x='{:.2}' y='{:.2}' font-family='{}' font-size='{:.2}' fill='{}'>{}</text>",
            x,
            y,
            escape_text(family),
            size,
            color,
            escape_text(content)
        );
    }

    /// A raster image scaled to fit inside the given box, preserving its
    /// aspect ratio, horizontally centered and top-aligned.
    pub fn fitted_image(&mut self, x: i32, y: i32, max_width: i32, max_height: i32, file: &Path) {
        let _ = write!(
            self.body,
            "<image x='{}' y='{}' width='{}' height='{}' preserveAspectRatio='xMidYMin meet' href='{}'/>",
            x,
            y,
            max_width,
            max_height,
            escape_text(&file.display().to_string())
        );
    }

    /// A raster image covering the given box edge to edge, visible only
    /// through a rounded-corner window of the same box.
    pub fn rounded_window_image(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        radius: i32,
        file: &Path,
    ) {
        self.clip_count += 1;
        let clip_id = format!("window{}", self.clip_count);
        let _ = write!(
            self.defs,
            "<clipPath id='{}'><rect x='{}' y='{}' width='{}' height='{}' rx='{}'/></clipPath>",
            clip_id,
            x0,
            y0,
            x1 - x0,
            y1 - y0,
            radius
        );
        let _ = write!(
            self.body,
            "<g clip-path='url(#{})'><image x='{}' y='{}' width='{}' height='{}' preserveAspectRatio='xMidYMid slice' href='{}'/></g>",
            clip_id,
            x0,
            y0,
            x1 - x0,
            y1 - y0,
            escape_text(&file.display().to_string())
        );
    }

    pub fn finish(self) -> String {
        let defs = if self.defs.is_empty() {
            String::new()
        } else {
            format!("<defs>{}</defs>", self.defs)
        };
        format!(
            "<svg xmlns='http://www.w3.org/2000/svg' width='{w}' height='{h}' viewBox='0 0 {w} {h}'>{defs}{body}</svg>",
            w = self.width,
            h = self.height,
            defs = defs,
            body = self.body
        )
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\'', "&apos;")
}

/// Rasterize finished card markup into a pixel buffer.
pub fn rasterize(
    svg: &str,
    fonts: &FontLibrary,
    width: u32,
    height: u32,
) -> Result<Pixmap, RenderError> {
    let mut options = usvg::Options::default();
    options.fontdb = fonts.database();
    // Relative image hrefs resolve against the working directory.
    options.resources_dir = std::env::current_dir().ok();
    let tree = usvg::Tree::from_str(svg, &options).map_err(|err| RenderError::Svg {
        reason: err.to_string(),
    })?;
    let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::CanvasAlloc { width, height })?;
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());
    Ok(pixmap)
}

pub fn write_png(pixmap: &Pixmap, path: &Path) -> Result<(), RenderError> {
    let file = File::create(path).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), pixmap.width(), pixmap.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder
        .write_header()
        .map_err(|source| RenderError::PngEncode { source })?;
    writer
        .write_image_data(pixmap.data())
        .map_err(|source| RenderError::PngEncode { source })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_fills_the_whole_canvas() {
        let canvas = SvgCanvas::new(100, 160, "#ffffff");
        let svg = canvas.finish();
        assert!(svg.starts_with("<svg "));
        assert!(svg.contains("<rect x='0' y='0' width='100' height='160' fill='#ffffff'/>"));
    }

    #[test]
    fn elements_keep_insertion_order() {
        let mut canvas = SvgCanvas::new(10, 10, "#ffffff");
        canvas.fill_rect(0, 0, 5, 5, "#ff0000");
        canvas.fill_rounded_rect(1, 1, 6, 6, 2, "#00ff00");
        let svg = canvas.finish();
        let red = svg.find("#ff0000").unwrap();
        let green = svg.find("#00ff00").unwrap();
        assert!(red < green);
    }

    #[test]
    fn rounded_rect_converts_corners_to_extent() {
        let mut canvas = SvgCanvas::new(50, 50, "#ffffff");
        canvas.fill_rounded_rect(10, 20, 40, 45, 3, "#123456");
        let svg = canvas.finish();
        assert!(svg.contains("<rect x='10' y='20' width='30' height='25' rx='3' fill='#123456'/>"));
    }

    #[test]
    fn text_is_xml_escaped() {
        let mut canvas = SvgCanvas::new(10, 10, "#ffffff");
        canvas.text(0.0, 5.0, "Tom & Jerry <3", "Card Font", 4.0, "#000000");
        let svg = canvas.finish();
        assert!(svg.contains("Tom &amp; Jerry &lt;3"));
    }

    #[test]
    fn window_image_is_clipped_by_a_rounded_rect() {
        let mut canvas = SvgCanvas::new(100, 100, "#ffffff");
        canvas.rounded_window_image(5, 5, 95, 95, 8, Path::new("back.png"));
        let svg = canvas.finish();
        assert!(svg.contains("<clipPath id='window1'>"));
        assert!(svg.contains("rx='8'"));
        assert!(svg.contains("clip-path='url(#window1)'"));
        assert!(svg.contains("preserveAspectRatio='xMidYMid slice'"));
    }
}
