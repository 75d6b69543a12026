//! Daemon configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the screen layout document
    #[serde(default = "default_layout")]
    pub layout: String,

    /// Directory fonts and hero images are resolved against
    #[serde(default = "default_assets")]
    pub assets: String,

    /// Directory screenshots are written to
    #[serde(default = "default_screenshots")]
    pub screenshots: String,

    /// Control loop idle delay in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Extra delay after a touch is handled, in milliseconds
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,

    /// Display configuration
    #[serde(default)]
    pub display: DisplayConfig,

    /// Touch panel configuration
    #[serde(default)]
    pub touch: TouchSettings,
}

/// SPI display configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// spidev device path
    #[serde(default = "default_spi")]
    pub spi: String,

    /// SPI clock in Hz
    #[serde(default = "default_spi_speed")]
    pub spi_speed_hz: u32,

    /// GPIO character device
    #[serde(default = "default_gpio_chip")]
    pub gpio_chip: String,

    /// Data/command line
    #[serde(default = "default_dc_pin")]
    pub dc_pin: u32,

    /// Reset line
    #[serde(default = "default_display_reset_pin")]
    pub reset_pin: u32,

    /// Rotation in degrees (0, 90, 180, 270)
    #[serde(default = "default_orientation")]
    pub orientation: u16,

    /// Subpixel order: "rgb" or "bgr"
    #[serde(default = "default_color_order")]
    pub color_order: String,

    /// Backlight output
    #[serde(default)]
    pub backlight: BacklightConfig,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            spi: default_spi(),
            spi_speed_hz: default_spi_speed(),
            gpio_chip: default_gpio_chip(),
            dc_pin: default_dc_pin(),
            reset_pin: default_display_reset_pin(),
            orientation: default_orientation(),
            color_order: default_color_order(),
            backlight: BacklightConfig::default(),
        }
    }
}

/// How the backlight is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BacklightMode {
    /// Kernel PWM channel (dimmable).
    #[default]
    Pwm,
    /// Plain GPIO line (on/off).
    Gpio,
}

/// Backlight configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacklightConfig {
    #[serde(default)]
    pub mode: BacklightMode,

    /// GPIO line used in "gpio" mode
    #[serde(default = "default_backlight_pin")]
    pub pin: u32,

    /// /sys/class/pwm/pwmchipN
    #[serde(default)]
    pub pwm_chip: u32,

    /// PWM channel on the chip
    #[serde(default)]
    pub pwm_channel: u32,

    /// PWM period in nanoseconds
    #[serde(default = "default_pwm_period")]
    pub period_ns: u32,
}

impl Default for BacklightConfig {
    fn default() -> Self {
        Self {
            mode: BacklightMode::default(),
            pin: default_backlight_pin(),
            pwm_chip: 0,
            pwm_channel: 0,
            period_ns: default_pwm_period(),
        }
    }
}

/// I2C touch panel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TouchSettings {
    /// i2c-dev device path
    #[serde(default = "default_i2c")]
    pub i2c: String,

    /// 7-bit controller address
    #[serde(default = "default_touch_address")]
    pub address: u8,

    /// Interrupt (touch ready) line, active low
    #[serde(default = "default_int_pin")]
    pub int_pin: u32,

    /// Reset line
    #[serde(default = "default_touch_reset_pin")]
    pub reset_pin: u32,

    /// Bytes per point in the coordinate block
    #[serde(default = "default_point_block_len")]
    pub point_block_len: usize,

    /// Secondary axis convention: "none" or "inverted"
    #[serde(default = "default_mirror")]
    pub mirror: String,
}

impl Default for TouchSettings {
    fn default() -> Self {
        Self {
            i2c: default_i2c(),
            address: default_touch_address(),
            int_pin: default_int_pin(),
            reset_pin: default_touch_reset_pin(),
            point_block_len: default_point_block_len(),
            mirror: default_mirror(),
        }
    }
}

// Default value functions
fn default_layout() -> String {
    "config/layout.toml".to_string()
}

fn default_assets() -> String {
    "assets".to_string()
}

fn default_screenshots() -> String {
    "screenshots".to_string()
}

fn default_poll_interval() -> u64 {
    100
}

fn default_debounce() -> u64 {
    100
}

fn default_spi() -> String {
    "/dev/spidev0.0".to_string()
}

fn default_spi_speed() -> u32 {
    40_000_000
}

fn default_gpio_chip() -> String {
    "/dev/gpiochip0".to_string()
}

fn default_dc_pin() -> u32 {
    25
}

fn default_display_reset_pin() -> u32 {
    27
}

fn default_orientation() -> u16 {
    90
}

fn default_color_order() -> String {
    "rgb".to_string()
}

fn default_backlight_pin() -> u32 {
    18
}

fn default_pwm_period() -> u32 {
    1_000_000 // 1 kHz
}

fn default_i2c() -> String {
    "/dev/i2c-1".to_string()
}

fn default_touch_address() -> u8 {
    0x15
}

fn default_int_pin() -> u32 {
    4
}

fn default_touch_reset_pin() -> u32 {
    17
}

fn default_point_block_len() -> usize {
    4
}

fn default_mirror() -> String {
    "none".to_string()
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse configuration")?;
        Ok(config)
    }

    /// Control loop idle delay.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Delay applied after a handled touch.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            layout: default_layout(),
            assets: default_assets(),
            screenshots: default_screenshots(),
            poll_interval_ms: default_poll_interval(),
            debounce_ms: default_debounce(),
            display: DisplayConfig::default(),
            touch: TouchSettings::default(),
        }
    }
}
