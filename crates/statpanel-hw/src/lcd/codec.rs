//! RGB888 to RGB565 wire encoding.
//!
//! Lossy and one-way: the panel never hands pixels back.

use super::framebuffer::Framebuffer;

/// Converts RGB888 to RGB565.
#[inline]
pub fn rgb888_to_rgb565(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3)
}

/// Encodes a framebuffer as big-endian RGB565, two bytes per pixel.
pub fn encode(frame: &Framebuffer) -> Vec<u8> {
    let mut out = Vec::with_capacity(frame.width() as usize * frame.height() as usize * 2);
    for px in frame.data().chunks_exact(3) {
        out.extend_from_slice(&rgb888_to_rgb565(px[0], px[1], px[2]).to_be_bytes());
    }
    out
}
