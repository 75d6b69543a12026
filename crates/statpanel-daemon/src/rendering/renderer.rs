//! Screen renderer.
//!
//! Paints, in order: content background, title bar, navigation arrows,
//! title, then each widget as declared. Later widgets draw over earlier ones.

use super::canvas::Canvas;
use super::color::{self, Palette};
use super::text::FontSet;
use crate::layout::{Layout, Screen, ScreenKind, Widget, WidgetKind};
use crate::sources::DataFetch;
use anyhow::Result;
use image::imageops::FilterType;
use image::RgbImage;
use statpanel_hw::Framebuffer;
use std::path::Path;
use tracing::{debug, warn};

/// Height of the title bar in pixels.
pub const TITLE_BAR_HEIGHT: i32 = 30;

const TITLE_X: i32 = 40;
const NAV_TIP_INSET: f32 = 10.0;
const NAV_WIDTH: f32 = 16.0;
const NAV_HALF_HEIGHT: f32 = 8.0;
const ERROR_COLOR: u32 = 0xFF0000;
const NO_SCREENS_MESSAGE: &str = "Error: No screens configured";

/// Prepared hero image, or the reason it could not be loaded.
type Hero = std::result::Result<RgbImage, String>;

/// Turns layout screens into framebuffers.
pub struct ScreenRenderer {
    layout: Layout,
    palette: Palette,
    fonts: FontSet,
    heroes: Vec<Option<Hero>>,
    canvas: Canvas,
}

impl ScreenRenderer {
    /// Prepares fonts, colours and hero images for `layout` at `size`.
    ///
    /// Fonts are resolved under `<assets>/fonts`, hero images under `<assets>`.
    pub fn new(layout: Layout, assets: &Path, size: (u16, u16)) -> Result<Self> {
        let (width, height) = (size.0 as u32, size.1 as u32);
        let canvas = Canvas::new(width, height)?;
        let palette = Palette::from_roles(&layout.colors);
        let fonts = FontSet::load(&layout.fonts, &assets.join("fonts"));
        let heroes = layout
            .screens
            .iter()
            .map(|screen| match screen.kind {
                ScreenKind::Hero => Some(load_hero(screen, assets, width, height)),
                ScreenKind::Standard => None,
            })
            .collect();

        Ok(Self {
            layout,
            palette,
            fonts,
            heroes,
            canvas,
        })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn screen_count(&self) -> usize {
        self.layout.screens.len()
    }

    /// Renders screen `index` (wrapping) into a fresh framebuffer.
    pub fn render(&mut self, index: usize, data: &dyn DataFetch) -> Framebuffer {
        let palette = self.palette;
        self.canvas.fill(palette.content_background);

        if self.layout.screens.is_empty() {
            draw_chrome(&mut self.canvas, &palette);
            let font = self.fonts.get("medium");
            self.canvas
                .draw_text(10, 10, NO_SCREENS_MESSAGE, font, ERROR_COLOR);
            return self.canvas.to_framebuffer();
        }

        let index = index % self.layout.screens.len();
        let screen = &self.layout.screens[index];

        match (&screen.kind, &self.heroes[index]) {
            (ScreenKind::Hero, Some(hero)) => {
                draw_hero(&mut self.canvas, &self.fonts, hero);
            }
            _ => {
                draw_chrome(&mut self.canvas, &palette);
                draw_title(&mut self.canvas, &self.fonts, &palette, screen);
                for widget in &screen.widgets {
                    draw_widget(&mut self.canvas, &self.fonts, &palette, widget, data);
                }
            }
        }

        self.canvas.to_framebuffer()
    }
}

/// Title bar background and navigation arrows.
fn draw_chrome(canvas: &mut Canvas, palette: &Palette) {
    let (width, _) = canvas.dimensions();
    canvas.fill_rect(0, 0, width, TITLE_BAR_HEIGHT as u32, palette.title_background);

    let cy = (TITLE_BAR_HEIGHT / 2) as f32;
    let left_tip = NAV_TIP_INSET;
    canvas.fill_polygon(
        &[
            (left_tip, cy),
            (left_tip + NAV_WIDTH, cy - NAV_HALF_HEIGHT),
            (left_tip + NAV_WIDTH, cy + NAV_HALF_HEIGHT),
        ],
        palette.nav_buttons,
    );
    let right_tip = width as f32 - NAV_TIP_INSET;
    canvas.fill_polygon(
        &[
            (right_tip, cy),
            (right_tip - NAV_WIDTH, cy - NAV_HALF_HEIGHT),
            (right_tip - NAV_WIDTH, cy + NAV_HALF_HEIGHT),
        ],
        palette.nav_buttons,
    );
}

fn load_hero(screen: &Screen, assets: &Path, width: u32, height: u32) -> Hero {
    let Some(rel) = &screen.image_path else {
        return Err("Error: no image_path".to_string());
    };
    let path = assets.join(rel);
    match image::open(&path) {
        Ok(img) => {
            debug!("Loaded hero image {}", path.display());
            Ok(img.resize(width, height, FilterType::Lanczos3).to_rgb8())
        }
        Err(e) => {
            warn!("Hero image {} unavailable: {}", path.display(), e);
            Err(format!("Error: {} not found", rel))
        }
    }
}

fn draw_hero(canvas: &mut Canvas, fonts: &FontSet, hero: &Hero) {
    match hero {
        Ok(image) => {
            let (width, height) = canvas.dimensions();
            let x = (width as i32 - image.width() as i32) / 2;
            let y = (height as i32 - image.height() as i32) / 2;
            canvas.blit(image, x, y);
        }
        Err(message) => canvas.draw_text(10, 10, message, fonts.get("medium"), ERROR_COLOR),
    }
}

fn draw_title(canvas: &mut Canvas, fonts: &FontSet, palette: &Palette, screen: &Screen) {
    let font = fonts.get("large");
    let color = color::resolve(screen.color.as_deref(), palette.title_text);
    let y = ((TITLE_BAR_HEIGHT as f32 - font.line_height()) / 2.0).round() as i32;
    canvas.draw_text(TITLE_X, y, &screen.title, font, color);
}

fn draw_widget(
    canvas: &mut Canvas,
    fonts: &FontSet,
    palette: &Palette,
    widget: &Widget,
    data: &dyn DataFetch,
) {
    let color = color::resolve(widget.color.as_deref(), palette.widget_default);
    let font = fonts.get(&widget.font);
    let (x, y) = widget.position;
    let source = widget.data_source.as_ref();

    match &widget.kind {
        WidgetKind::LineItem => {
            let value = data.fetch(source);
            canvas.draw_text(x, y, &widget.label, font, color);
            canvas.draw_text(x + widget.data_x_offset, y, &value.to_string(), font, color);
        }
        WidgetKind::LineItemWithSub => {
            let (main, sub) = data.fetch(source).into_pair();
            let data_x = x + widget.data_x_offset;
            canvas.draw_text(x, y, &widget.label, font, color);
            canvas.draw_text(data_x, y, &main, font, color);
            let sub_color = color::resolve(Some(&widget.sub_color), 0x808080);
            canvas.draw_text(
                data_x,
                y + widget.sub_y_offset,
                &format!("({})", sub),
                fonts.get(&widget.sub_font),
                sub_color,
            );
        }
        WidgetKind::DynamicText => {
            let value = data.fetch(source);
            let text = widget.template.replace("{data}", &value.to_string());
            canvas.draw_text(x, y, &text, font, color);
        }
        WidgetKind::StaticText => {
            let value = data.fetch(source);
            canvas.draw_text(x, y, &value.to_string(), font, color);
        }
        WidgetKind::Unknown(kind) => {
            warn!("Unknown widget type: {}", kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{DataSourceRef, DataValue, CALL_ERROR};
    use std::cell::RefCell;

    /// Returns canned values and records which sources were asked for.
    struct FakeData {
        calls: RefCell<Vec<String>>,
    }

    impl FakeData {
        fn new() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl DataFetch for FakeData {
        fn fetch(&self, source: Option<&DataSourceRef>) -> DataValue {
            let Some(source) = source else {
                return DataValue::single("N/A");
            };
            self.calls.borrow_mut().push(source.name().to_string());
            match source.name() {
                "pair" => DataValue::pair("50%", "1/2"),
                "broken" => DataValue::single(CALL_ERROR),
                _ => DataValue::single("ok"),
            }
        }
    }

    fn renderer(doc: &str) -> ScreenRenderer {
        let layout: Layout = toml::from_str(doc).unwrap();
        ScreenRenderer::new(layout, Path::new("/nonexistent"), (320, 240)).unwrap()
    }

    fn has_color(fb: &Framebuffer, x0: u16, y0: u16, x1: u16, y1: u16, rgb: [u8; 3]) -> bool {
        (y0..y1).any(|y| (x0..x1).any(|x| fb.pixel(x, y) == Some(rgb)))
    }

    const WHITE: [u8; 3] = [0xFF, 0xFF, 0xFF];
    const RED: [u8; 3] = [0xFF, 0, 0];

    #[test]
    fn test_empty_layout_renders_diagnostic() {
        let mut renderer = renderer("");
        let fb = renderer.render(3, &FakeData::new());
        assert_eq!(fb.dimensions(), (320, 240));
        assert!(has_color(&fb, 10, 10, 320, 40, RED));
    }

    #[test]
    fn test_chrome_and_title() {
        let mut renderer = renderer(
            r##"
            [colors]
            title_background = "#000080"
            content_background = "#102010"

            [[screens]]
            title = "System"
            "##,
        );
        let fb = renderer.render(0, &FakeData::new());
        // Title bar and content
        assert_eq!(fb.pixel(160, 2), Some([0, 0, 0x80]));
        assert_eq!(fb.pixel(160, 200), Some([0x10, 0x20, 0x10]));
        // Arrow interiors
        assert_eq!(fb.pixel(20, 15), Some(WHITE));
        assert_eq!(fb.pixel(300, 15), Some(WHITE));
        // Title text starts at x = 40
        assert!(has_color(&fb, 40, 0, 200, 30, WHITE));
    }

    #[test]
    fn test_widgets_draw_in_order_and_fetch_once() {
        let mut renderer = renderer(
            r#"
            [[screens]]
            title = ""

            [[screens.widgets]]
            type = "line_item"
            position = [10, 50]
            label = "CPU:"
            data_source = "cpu"

            [[screens.widgets]]
            type = "line_item_with_sub"
            position = [10, 100]
            label = "RAM:"
            data_source = "pair"
            sub_color = "RED"
            "#,
        );
        let data = FakeData::new();
        let fb = renderer.render(0, &data);
        assert_eq!(*data.calls.borrow(), vec!["cpu", "pair"]);
        // Label and value
        assert!(has_color(&fb, 10, 50, 100, 70, WHITE));
        assert!(has_color(&fb, 150, 50, 300, 70, WHITE));
        // Sub-value 20px below the main value
        assert!(has_color(&fb, 150, 120, 300, 140, RED));
    }

    #[test]
    fn test_unknown_widget_does_not_stop_rendering() {
        let mut renderer = renderer(
            r#"
            [[screens]]
            title = ""

            [[screens.widgets]]
            type = "sparkline"
            position = [10, 50]

            [[screens.widgets]]
            type = "static_text"
            position = [10, 150]
            data_source = "broken"
            "#,
        );
        let fb = renderer.render(0, &FakeData::new());
        assert!(!has_color(&fb, 0, 40, 320, 100, WHITE));
        assert!(has_color(&fb, 10, 150, 200, 170, WHITE));
    }

    #[test]
    fn test_dynamic_text_template() {
        let mut renderer = renderer(
            r#"
            [[screens]]
            title = ""

            [[screens.widgets]]
            type = "dynamic_text"
            position = [0, 100]
            template = "{data}"
            "#,
        );
        let fb = renderer.render(0, &FakeData::new());
        // "N/A" with no data source
        assert!(has_color(&fb, 0, 100, 60, 120, WHITE));
    }

    #[test]
    fn test_hero_screen_without_image() {
        let mut renderer = renderer(
            r#"
            [[screens]]
            title = "Logo"
            type = "hero"
            image_path = "logo.png"
            "#,
        );
        let fb = renderer.render(0, &FakeData::new());
        assert!(has_color(&fb, 10, 10, 260, 30, RED));
        // No right arrow; the message ends well before it
        assert_eq!(fb.pixel(300, 15), Some([0, 0, 0]));
    }

    #[test]
    fn test_hero_image_is_scaled_and_centered() {
        let dir = std::env::temp_dir().join(format!("statpanel-hero-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        RgbImage::from_pixel(100, 100, image::Rgb([0, 0xFF, 0]))
            .save(dir.join("logo.png"))
            .unwrap();

        let layout: Layout = toml::from_str(
            r#"
            [[screens]]
            type = "hero"
            image_path = "logo.png"
            "#,
        )
        .unwrap();
        let mut renderer = ScreenRenderer::new(layout, &dir, (320, 240)).unwrap();
        let fb = renderer.render(0, &FakeData::new());
        std::fs::remove_dir_all(&dir).ok();

        // 240x240 square centered horizontally
        let green = |x, y| fb.pixel(x, y).map_or(false, |[r, g, b]| g > 200 && r < 50 && b < 50);
        assert!(green(160, 120));
        assert!(green(45, 120));
        assert!(green(274, 120));
        assert_eq!(fb.pixel(30, 120), Some([0, 0, 0]));
        assert_eq!(fb.pixel(290, 120), Some([0, 0, 0]));
        // No title bar or arrows around the image
        assert_eq!(fb.pixel(20, 15), Some([0, 0, 0]));
        assert_eq!(fb.pixel(300, 15), Some([0, 0, 0]));
    }

    #[test]
    fn test_index_wraps() {
        let mut renderer = renderer(
            r#"
            [[screens]]
            title = "A"
            [[screens]]
            title = "B"
            "#,
        );
        let data = FakeData::new();
        assert_eq!(
            renderer.render(1, &data).data(),
            renderer.render(3, &data).data()
        );
    }
}
