//! Raw touch coordinates to UI space.
//!
//! The touch controller always reports in the native portrait frame. Panel
//! revisions disagree on whether the secondary axis is mirrored once the
//! display is rotated, so the convention is a parameter.

use crate::orientation::Orientation;
use crate::{NATIVE_HEIGHT, NATIVE_WIDTH};
use std::str::FromStr;

/// Whether the secondary UI axis is inverted relative to the raw axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MirrorConvention {
    /// `ui_y = raw_x` at 90°.
    #[default]
    None,
    /// `ui_y = logical_height - 1 - raw_x` at 90°.
    Inverted,
}

impl FromStr for MirrorConvention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "normal" => Ok(MirrorConvention::None),
            "inverted" | "mirrored" => Ok(MirrorConvention::Inverted),
            _ => Err(format!("invalid mirror convention: {}", s)),
        }
    }
}

/// Horizontal navigation zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Left,
    Center,
    Right,
}

/// Classifies a UI x coordinate into thirds.
///
/// `ui_x < w/3` is Left and `ui_x > w - w/3` is Right; both boundary values
/// fall in Center.
pub fn classify_zone(ui_x: u16, logical_width: u16) -> Zone {
    let third = logical_width / 3;
    if ui_x < third {
        Zone::Left
    } else if ui_x > logical_width - third {
        Zone::Right
    } else {
        Zone::Center
    }
}

/// Maps native touch coordinates into the rotated UI frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateMapper {
    orientation: Orientation,
    mirror: MirrorConvention,
}

impl CoordinateMapper {
    /// Creates a mapper for the given orientation and mirror convention.
    pub fn new(orientation: Orientation, mirror: MirrorConvention) -> Self {
        Self {
            orientation,
            mirror,
        }
    }

    /// Returns the logical (UI) dimensions.
    pub fn logical_size(&self) -> (u16, u16) {
        self.orientation.dimensions()
    }

    /// Transforms raw native coordinates to UI coordinates.
    pub fn to_ui_space(&self, raw_x: u16, raw_y: u16) -> (u16, u16) {
        let x = raw_x.min(NATIVE_WIDTH - 1);
        let y = raw_y.min(NATIVE_HEIGHT - 1);
        let (ui_x, ui_y) = match self.orientation {
            Orientation::Deg0 => (x, y),
            Orientation::Deg90 => (y, x),
            Orientation::Deg180 => (NATIVE_WIDTH - 1 - x, NATIVE_HEIGHT - 1 - y),
            Orientation::Deg270 => (NATIVE_HEIGHT - 1 - y, NATIVE_WIDTH - 1 - x),
        };
        match self.mirror {
            MirrorConvention::None => (ui_x, ui_y),
            MirrorConvention::Inverted => {
                let (_, logical_height) = self.logical_size();
                (ui_x, logical_height - 1 - ui_y)
            }
        }
    }

    /// Maps raw coordinates straight to a navigation zone.
    pub fn zone(&self, raw_x: u16, raw_y: u16) -> Zone {
        let (ui_x, _) = self.to_ui_space(raw_x, raw_y);
        classify_zone(ui_x, self.logical_size().0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_zone() {
        assert_eq!(classify_zone(50, 320), Zone::Left);
        assert_eq!(classify_zone(160, 320), Zone::Center);
        assert_eq!(classify_zone(300, 320), Zone::Right);
    }

    #[test]
    fn test_classify_zone_boundaries() {
        assert_eq!(classify_zone(105, 320), Zone::Left);
        assert_eq!(classify_zone(106, 320), Zone::Center);
        assert_eq!(classify_zone(214, 320), Zone::Center);
        assert_eq!(classify_zone(215, 320), Zone::Right);
        assert_eq!(classify_zone(0, 320), Zone::Left);
        assert_eq!(classify_zone(319, 320), Zone::Right);
    }

    #[test]
    fn test_corners_at_90_no_mirror() {
        let mapper = CoordinateMapper::new(Orientation::Deg90, MirrorConvention::None);
        assert_eq!(mapper.to_ui_space(0, 0), (0, 0));
        assert_eq!(mapper.to_ui_space(239, 319), (319, 239));
    }

    #[test]
    fn test_corners_at_90_inverted() {
        let mapper = CoordinateMapper::new(Orientation::Deg90, MirrorConvention::Inverted);
        assert_eq!(mapper.to_ui_space(0, 0), (0, 239));
        assert_eq!(mapper.to_ui_space(239, 319), (319, 0));
    }

    #[test]
    fn test_corners_stay_in_bounds_for_all_orientations() {
        for orientation in [
            Orientation::Deg0,
            Orientation::Deg90,
            Orientation::Deg180,
            Orientation::Deg270,
        ] {
            for mirror in [MirrorConvention::None, MirrorConvention::Inverted] {
                let mapper = CoordinateMapper::new(orientation, mirror);
                let (w, h) = mapper.logical_size();
                let a = mapper.to_ui_space(0, 0);
                let b = mapper.to_ui_space(NATIVE_WIDTH - 1, NATIVE_HEIGHT - 1);
                assert!(a.0 < w && a.1 < h && b.0 < w && b.1 < h);
                // Opposite corners
                assert_eq!(a.0 + b.0, w - 1);
                assert_eq!(a.1 + b.1, h - 1);
            }
        }
    }

    #[test]
    fn test_out_of_range_input_is_clamped() {
        let mapper = CoordinateMapper::new(Orientation::Deg90, MirrorConvention::None);
        assert_eq!(mapper.to_ui_space(1000, 1000), (319, 239));
    }

    #[test]
    fn test_zone_uses_raw_y_at_90() {
        let mapper = CoordinateMapper::new(Orientation::Deg90, MirrorConvention::None);
        assert_eq!(mapper.zone(120, 10), Zone::Left);
        assert_eq!(mapper.zone(120, 160), Zone::Center);
        assert_eq!(mapper.zone(120, 310), Zone::Right);
    }

    #[test]
    fn test_mirror_from_str() {
        assert_eq!("none".parse::<MirrorConvention>(), Ok(MirrorConvention::None));
        assert_eq!(
            "Inverted".parse::<MirrorConvention>(),
            Ok(MirrorConvention::Inverted)
        );
        assert!("sideways".parse::<MirrorConvention>().is_err());
    }
}
