//! LCD display module.
//!
//! Provides control over the 240x320 ST7789 display over SPI, plus the
//! RGB888 framebuffer and its RGB565 wire encoding.

pub mod codec;
mod device;
pub mod framebuffer;
pub mod protocol;

pub use codec::{encode, rgb888_to_rgb565};
pub use device::{ColorOrder, St7789};
pub use framebuffer::Framebuffer;
pub use protocol::{Command, InitStep, ST7789_INIT_SEQUENCE};
