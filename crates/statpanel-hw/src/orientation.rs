//! Display orientation support.
//!
//! The ST7789 rotates in hardware through the memory-access-control (MADCTL)
//! register. Each of the four angles maps to a fixed combination of the
//! row/column exchange and mirror bits.

use crate::{Error, Result, NATIVE_HEIGHT, NATIVE_WIDTH};
use std::str::FromStr;

/// MADCTL bits.
pub const MADCTL_MY: u8 = 0x80;
pub const MADCTL_MX: u8 = 0x40;
pub const MADCTL_MV: u8 = 0x20;
pub const MADCTL_BGR: u8 = 0x08;

/// Display orientation, measured clockwise from the native portrait layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Portrait (240x320), hardware native.
    #[default]
    Deg0,
    /// Landscape (320x240), rotated 90° clockwise.
    Deg90,
    /// Portrait upside-down (240x320).
    Deg180,
    /// Landscape (320x240), rotated 270° clockwise.
    Deg270,
}

impl Orientation {
    /// Maps an angle in degrees to an orientation.
    /// Anything other than 0, 90, 180 or 270 falls back to the native orientation.
    pub fn from_degrees(degrees: u16) -> Self {
        match degrees {
            90 => Orientation::Deg90,
            180 => Orientation::Deg180,
            270 => Orientation::Deg270,
            _ => Orientation::Deg0,
        }
    }

    /// Returns the angle in degrees.
    pub fn degrees(&self) -> u16 {
        match self {
            Orientation::Deg0 => 0,
            Orientation::Deg90 => 90,
            Orientation::Deg180 => 180,
            Orientation::Deg270 => 270,
        }
    }

    /// Returns the MADCTL payload for this orientation (RGB color order).
    pub fn madctl(&self) -> u8 {
        match self {
            Orientation::Deg0 => 0x00,
            Orientation::Deg90 => MADCTL_MX | MADCTL_MV,
            Orientation::Deg180 => MADCTL_MY | MADCTL_MX,
            Orientation::Deg270 => MADCTL_MY | MADCTL_MV,
        }
    }

    /// Returns true if rows and columns are exchanged.
    pub fn is_landscape(&self) -> bool {
        matches!(self, Orientation::Deg90 | Orientation::Deg270)
    }

    /// Returns the logical (UI) dimensions for this orientation.
    pub fn dimensions(&self) -> (u16, u16) {
        if self.is_landscape() {
            (NATIVE_HEIGHT, NATIVE_WIDTH)
        } else {
            (NATIVE_WIDTH, NATIVE_HEIGHT)
        }
    }
}

impl FromStr for Orientation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "0" | "portrait" => Ok(Orientation::Deg0),
            "90" | "landscape" => Ok(Orientation::Deg90),
            "180" | "portrait-upside-down" | "portrait_upside_down" => Ok(Orientation::Deg180),
            "270" | "landscape-upside-down" | "landscape_upside_down" => {
                Ok(Orientation::Deg270)
            }
            _ => Err(Error::InvalidOrientation(s.to_string())),
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}
