//! Canvas for drawing a screen before it becomes a framebuffer.

use anyhow::{anyhow, Result};
use image::RgbImage;
use statpanel_hw::Framebuffer;
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Rect, Transform};

use super::text::FontFace;

fn paint(color: u32) -> Paint<'static> {
    let r = ((color >> 16) & 0xFF) as u8;
    let g = ((color >> 8) & 0xFF) as u8;
    let b = (color & 0xFF) as u8;

    let mut paint = Paint::default();
    paint.set_color(Color::from_rgba8(r, g, b, 255));
    paint
}

/// Opaque RGB drawing surface.
pub struct Canvas {
    width: u32,
    height: u32,
    pixmap: Pixmap,
}

impl Canvas {
    /// Creates a new canvas.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let pixmap = Pixmap::new(width, height)
            .ok_or_else(|| anyhow!("Invalid canvas size {}x{}", width, height))?;
        Ok(Self {
            width,
            height,
            pixmap,
        })
    }

    /// Returns the canvas dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Fills the whole canvas.
    pub fn fill(&mut self, color: u32) {
        let r = ((color >> 16) & 0xFF) as u8;
        let g = ((color >> 8) & 0xFF) as u8;
        let b = (color & 0xFF) as u8;
        self.pixmap.fill(Color::from_rgba8(r, g, b, 255));
    }

    /// Draws a filled rectangle.
    pub fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: u32) {
        if let Some(rect) = Rect::from_xywh(x as f32, y as f32, width as f32, height as f32) {
            self.pixmap
                .fill_rect(rect, &paint(color), Transform::identity(), None);
        }
    }

    /// Draws a filled polygon through `points`.
    pub fn fill_polygon(&mut self, points: &[(f32, f32)], color: u32) {
        let Some((&(x0, y0), rest)) = points.split_first() else {
            return;
        };
        let mut pb = PathBuilder::new();
        pb.move_to(x0, y0);
        for &(x, y) in rest {
            pb.line_to(x, y);
        }
        pb.close();

        if let Some(path) = pb.finish() {
            self.pixmap.fill_path(
                &path,
                &paint(color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    /// Draws text with its top-left corner at (x, y).
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, font: &FontFace, color: u32) {
        font.draw(&mut self.pixmap, x, y, text, color);
    }

    /// Copies an image onto the canvas at (x, y), clipping at the edges.
    pub fn blit(&mut self, image: &RgbImage, x: i32, y: i32) {
        let width = self.width as i32;
        let data = self.pixmap.data_mut();
        for (ix, iy, pixel) in image.enumerate_pixels() {
            let px = x + ix as i32;
            let py = y + iy as i32;
            if px < 0 || py < 0 || px >= width || py >= self.height as i32 {
                continue;
            }
            let idx = (py * width + px) as usize * 4;
            data[idx..idx + 3].copy_from_slice(&pixel.0);
            data[idx + 3] = 255;
        }
    }

    /// Returns the RGB value at (x, y).
    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        let p = self.pixmap.pixel(x, y)?;
        Some([p.red(), p.green(), p.blue()])
    }

    /// Copies the canvas into a new framebuffer.
    ///
    /// Every pixel is opaque, so premultiplied values equal straight RGB.
    pub fn to_framebuffer(&self) -> Framebuffer {
        let mut fb = Framebuffer::new(self.width as u16, self.height as u16);
        for (i, pixel) in self.pixmap.pixels().iter().enumerate() {
            let x = (i as u32 % self.width) as u16;
            let y = (i as u32 / self.width) as u16;
            fb.set_pixel(x, y, [pixel.red(), pixel.green(), pixel.blue()]);
        }
        fb
    }
}
