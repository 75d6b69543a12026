//! Text rendering using fontdue, with built-in bitmap fonts as fallback.

use crate::layout::FontSpec;
use embedded_graphics::mono_font::{iso_8859_1, MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use fontdue::{Font, FontSettings};
use std::collections::HashMap;
use std::path::Path;
use tiny_skia::Pixmap;
use tracing::{debug, warn};

/// Built-in fonts from smallest to largest.
static BUILTIN_FONTS: &[&MonoFont<'static>] = &[
    &iso_8859_1::FONT_6X10,
    &iso_8859_1::FONT_7X13,
    &iso_8859_1::FONT_9X15,
    &iso_8859_1::FONT_10X20,
];

/// A font at a fixed pixel size.
pub enum FontFace {
    TrueType { font: Font, size: f32 },
    Builtin(&'static MonoFont<'static>),
}

impl FontFace {
    /// Picks the largest built-in font no taller than `size`.
    pub fn builtin_for(size: f32) -> Self {
        let font = BUILTIN_FONTS
            .iter()
            .rev()
            .find(|f| f.character_size.height as f32 <= size)
            .unwrap_or(&BUILTIN_FONTS[0]);
        FontFace::Builtin(*font)
    }

    /// Nominal pixel height.
    pub fn size(&self) -> f32 {
        match self {
            FontFace::TrueType { size, .. } => *size,
            FontFace::Builtin(font) => font.character_size.height as f32,
        }
    }

    /// Height of one line of text, used for vertical centring.
    pub fn line_height(&self) -> f32 {
        match self {
            FontFace::TrueType { font, size } => font
                .horizontal_line_metrics(*size)
                .map_or(*size, |m| m.ascent - m.descent),
            FontFace::Builtin(font) => font.character_size.height as f32,
        }
    }

    /// Draws `text` with its top-left corner at (x, y).
    pub fn draw(&self, pixmap: &mut Pixmap, x: i32, y: i32, text: &str, color: u32) {
        match self {
            FontFace::TrueType { font, size } => draw_truetype(font, *size, pixmap, x, y, text, color),
            FontFace::Builtin(font) => {
                let style = MonoTextStyle::new(font, to_rgb888(color));
                let mut target = PixmapTarget(pixmap);
                // Drawing into a pixmap cannot fail
                let _ = Text::with_baseline(text, Point::new(x, y), style, Baseline::Top)
                    .draw(&mut target);
            }
        }
    }
}

fn draw_truetype(font: &Font, size: f32, pixmap: &mut Pixmap, x: i32, y: i32, text: &str, color: u32) {
    let baseline = y + ascent(font, size).round() as i32;
    let (width, height) = (pixmap.width() as i32, pixmap.height() as i32);
    let data = pixmap.data_mut();

    let mut pen = x as f32;
    for ch in text.chars() {
        let (metrics, coverage) = font.rasterize(ch, size);
        let left = pen.round() as i32 + metrics.xmin;
        let top = baseline - metrics.ymin - metrics.height as i32;

        for (row, line) in coverage.chunks(metrics.width.max(1)).enumerate() {
            let py = top + row as i32;
            if !(0..height).contains(&py) {
                continue;
            }
            for (col, &alpha) in line.iter().enumerate() {
                let px = left + col as i32;
                if alpha == 0 || !(0..width).contains(&px) {
                    continue;
                }
                let idx = (py * width + px) as usize * 4;
                blend(&mut data[idx..idx + 4], color, alpha);
            }
        }
        pen += metrics.advance_width;
    }
}

/// Distance from the top of the line box to the baseline.
fn ascent(font: &Font, size: f32) -> f32 {
    font.horizontal_line_metrics(size).map_or(size, |m| m.ascent)
}

/// Mixes `color` over an opaque RGBA pixel by glyph coverage.
fn blend(pixel: &mut [u8], color: u32, coverage: u8) {
    let alpha = coverage as f32 / 255.0;
    for (channel, shift) in pixel.iter_mut().zip([16, 8, 0]) {
        let src = ((color >> shift) & 0xFF) as f32;
        *channel = (src * alpha + *channel as f32 * (1.0 - alpha)) as u8;
    }
    pixel[3] = 0xFF;
}

fn to_rgb888(color: u32) -> Rgb888 {
    Rgb888::new(
        ((color >> 16) & 0xFF) as u8,
        ((color >> 8) & 0xFF) as u8,
        (color & 0xFF) as u8,
    )
}

/// Opaque RGB draw target over a pixmap.
struct PixmapTarget<'a>(&'a mut Pixmap);

impl OriginDimensions for PixmapTarget<'_> {
    fn size(&self) -> Size {
        Size::new(self.0.width(), self.0.height())
    }
}

impl DrawTarget for PixmapTarget<'_> {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (width, height) = (self.0.width() as i32, self.0.height() as i32);
        let data = self.0.data_mut();
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 || point.x >= width || point.y >= height {
                continue;
            }
            let idx = (point.y * width + point.x) as usize * 4;
            data[idx] = color.r();
            data[idx + 1] = color.g();
            data[idx + 2] = color.b();
            data[idx + 3] = 255;
        }
        Ok(())
    }
}

/// Font names the renderer relies on, with their nominal sizes.
const STANDARD_FONTS: &[(&str, f32)] = &[("small", 14.0), ("medium", 18.0), ("large", 22.0)];

/// Named fonts from the layout.
pub struct FontSet {
    faces: HashMap<String, FontFace>,
    fallback: FontFace,
}

impl FontSet {
    /// Loads every font in `specs` from `font_dir`.
    ///
    /// Fonts that cannot be read or parsed fall back to the closest built-in size.
    pub fn load(specs: &HashMap<String, FontSpec>, font_dir: &Path) -> Self {
        let mut faces = HashMap::new();
        for (name, spec) in specs {
            let path = font_dir.join(&spec.path);
            let face = match std::fs::read(&path)
                .map_err(|e| e.to_string())
                .and_then(|bytes| Font::from_bytes(bytes, FontSettings::default()).map_err(str::to_string))
            {
                Ok(font) => {
                    debug!("Loaded font '{}' from {}", name, path.display());
                    FontFace::TrueType { font, size: spec.size }
                }
                Err(e) => {
                    warn!(
                        "Font '{}' unavailable at {} ({}); using built-in font",
                        name,
                        path.display(),
                        e
                    );
                    FontFace::builtin_for(spec.size)
                }
            };
            faces.insert(name.clone(), face);
        }
        for &(name, size) in STANDARD_FONTS {
            faces
                .entry(name.to_string())
                .or_insert_with(|| FontFace::builtin_for(size));
        }
        Self {
            faces,
            fallback: FontFace::Builtin(&iso_8859_1::FONT_9X15),
        }
    }

    /// Returns the named font; unknown names get `medium`.
    pub fn get(&self, name: &str) -> &FontFace {
        self.faces
            .get(name)
            .or_else(|| self.faces.get("medium"))
            .unwrap_or(&self.fallback)
    }
}
