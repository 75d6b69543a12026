//! RGB888 framebuffer.

use crate::{Error, Result};

/// Packed RGB888 framebuffer, row-major, three bytes per pixel.
///
/// A framebuffer always replaces the whole panel; there is no partial update.
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    data: Vec<u8>,
    width: u16,
    height: u16,
}

impl std::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Framebuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl Framebuffer {
    /// Creates a black framebuffer.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            data: vec![0; width as usize * height as usize * 3],
            width,
            height,
        }
    }

    /// Wraps existing RGB8 pixel data.
    pub fn from_rgb8(width: u16, height: u16, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(Error::FramebufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Returns the width of the framebuffer.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Returns the height of the framebuffer.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Returns (width, height).
    pub fn dimensions(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Returns the raw RGB8 bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Fills the framebuffer with a solid color.
    pub fn fill(&mut self, rgb: [u8; 3]) {
        for px in self.data.chunks_exact_mut(3) {
            px.copy_from_slice(&rgb);
        }
    }

    /// Sets a pixel at the given coordinates. Out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: u16, y: u16, rgb: [u8; 3]) {
        if x < self.width && y < self.height {
            let idx = (y as usize * self.width as usize + x as usize) * 3;
            self.data[idx..idx + 3].copy_from_slice(&rgb);
        }
    }

    /// Gets a pixel at the given coordinates.
    pub fn pixel(&self, x: u16, y: u16) -> Option<[u8; 3]> {
        if x < self.width && y < self.height {
            let idx = (y as usize * self.width as usize + x as usize) * 3;
            Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framebuffer_ops() {
        let mut fb = Framebuffer::new(320, 240);
        assert_eq!(fb.dimensions(), (320, 240));
        assert_eq!(fb.pixel(0, 0), Some([0, 0, 0]));

        fb.set_pixel(10, 20, [0xFF, 0, 0]);
        assert_eq!(fb.pixel(10, 20), Some([0xFF, 0, 0]));
        assert_eq!(fb.pixel(320, 0), None);

        fb.fill([1, 2, 3]);
        assert_eq!(fb.pixel(319, 239), Some([1, 2, 3]));
    }

    #[test]
    fn test_from_rgb8_checks_length() {
        assert!(Framebuffer::from_rgb8(2, 2, vec![0; 12]).is_ok());
        match Framebuffer::from_rgb8(2, 2, vec![0; 11]) {
            Err(Error::FramebufferSize { expected, actual }) => {
                assert_eq!(expected, 12);
                assert_eq!(actual, 11);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
