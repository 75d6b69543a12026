//! Statpanel Hardware Library
//!
//! Provides hardware abstraction for the ST7789 SPI display and CST816D
//! I2C touch controller found on small single-board-computer status panels.
//! Drivers are generic over the `embedded-hal` 1.0 traits.

pub mod error;
pub mod lcd;
pub mod orientation;
pub mod sink;
pub mod touch;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
pub use lcd::{ColorOrder, Framebuffer, St7789};
pub use orientation::Orientation;
pub use sink::{DisplaySink, TouchSource};
pub use touch::{
    classify_zone, CoordinateMapper, Cst816d, MirrorConvention, TouchConfig, TouchSample, Zone,
};

/// Native panel dimensions (portrait, as wired).
pub const NATIVE_WIDTH: u16 = 240;
pub const NATIVE_HEIGHT: u16 = 320;

/// Maximum backlight level.
pub const BACKLIGHT_MAX: u8 = 100;
