//! Screen layout document.
//!
//! The layout names the screens shown on the panel, the fonts and colours
//! they use, and the inactivity timeout. It is loaded once at startup.

use crate::sources::DataSourceRef;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Parsed layout document.
#[derive(Debug, Clone, Deserialize)]
pub struct Layout {
    /// Seconds without a touch before the backlight turns off; `<= 0` disables sleep
    #[serde(default = "default_screen_timeout")]
    pub screen_timeout: f64,

    /// Named fonts, e.g. `small`, `medium`, `large`
    #[serde(default)]
    pub fonts: HashMap<String, FontSpec>,

    /// Colour roles such as `title_background` or `widget_default`
    #[serde(default)]
    pub colors: HashMap<String, String>,

    #[serde(default)]
    pub screens: Vec<Screen>,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            screen_timeout: default_screen_timeout(),
            fonts: HashMap::new(),
            colors: HashMap::new(),
            screens: Vec::new(),
        }
    }
}

impl Layout {
    /// Parses the layout at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read layout: {}", path.display()))?;
        let layout: Layout = toml::from_str(&content)
            .with_context(|| format!("Failed to parse layout: {}", path.display()))?;
        Ok(layout)
    }

    /// Parses the layout, degrading to an empty one when it cannot be read.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(layout) => layout,
            Err(e) => {
                warn!("{:#}; continuing with no screens", e);
                Self::default()
            }
        }
    }

    /// Inactivity timeout, or `None` when sleep is disabled.
    pub fn inactivity_timeout(&self) -> Option<Duration> {
        if self.screen_timeout <= 0.0 || !self.screen_timeout.is_finite() {
            return None;
        }
        match Duration::try_from_secs_f64(self.screen_timeout) {
            Ok(timeout) => Some(timeout),
            Err(e) => {
                warn!(
                    "screen_timeout {} out of range ({}); sleep disabled",
                    self.screen_timeout, e
                );
                None
            }
        }
    }
}

fn default_screen_timeout() -> f64 {
    60.0
}

/// Font file relative to `<assets>/fonts`, and pixel size.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FontSpec {
    pub path: String,
    pub size: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum ScreenKind {
    #[default]
    Standard,
    /// Full-screen pre-rendered image
    Hero,
}

impl From<String> for ScreenKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "hero" => ScreenKind::Hero,
            _ => ScreenKind::Standard,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Screen {
    #[serde(default)]
    pub title: String,

    #[serde(default, rename = "type")]
    pub kind: ScreenKind,

    /// Title colour override
    #[serde(default)]
    pub color: Option<String>,

    /// Image for hero screens, relative to the assets directory
    #[serde(default)]
    pub image_path: Option<String>,

    #[serde(default)]
    pub widgets: Vec<Widget>,
}

/// Widget rendering behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum WidgetKind {
    LineItem,
    LineItemWithSub,
    DynamicText,
    StaticText,
    Unknown(String),
}

impl From<String> for WidgetKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "line_item" => WidgetKind::LineItem,
            "line_item_with_sub" => WidgetKind::LineItemWithSub,
            "dynamic_text" => WidgetKind::DynamicText,
            "static_text" => WidgetKind::StaticText,
            _ => WidgetKind::Unknown(s),
        }
    }
}

impl Default for WidgetKind {
    fn default() -> Self {
        WidgetKind::Unknown("unknown".to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Widget {
    #[serde(default, rename = "type")]
    pub kind: WidgetKind,

    #[serde(default)]
    pub position: (i32, i32),

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub data_source: Option<DataSourceRef>,

    /// Overrides the `widget_default` colour role
    #[serde(default)]
    pub color: Option<String>,

    #[serde(default = "default_font")]
    pub font: String,

    #[serde(default = "default_sub_font")]
    pub sub_font: String,

    #[serde(default = "default_sub_color")]
    pub sub_color: String,

    /// Horizontal distance from the label to the value
    #[serde(default = "default_data_x_offset")]
    pub data_x_offset: i32,

    /// Vertical distance from the value to the sub-value
    #[serde(default = "default_sub_y_offset")]
    pub sub_y_offset: i32,

    /// Text with a `{data}` slot, for `dynamic_text`
    #[serde(default = "default_template")]
    pub template: String,
}

fn default_font() -> String {
    "medium".to_string()
}

fn default_sub_font() -> String {
    "small".to_string()
}

fn default_sub_color() -> String {
    "GRAY".to_string()
}

fn default_data_x_offset() -> i32 {
    140
}

fn default_sub_y_offset() -> i32 {
    20
}

fn default_template() -> String {
    "{data}".to_string()
}
