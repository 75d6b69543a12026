//! Linux wiring for the panel: spidev, i2c-dev, GPIO character device and sysfs PWM.

use crate::config::{BacklightConfig, BacklightMode, DisplayConfig, TouchSettings};
use anyhow::{anyhow, Context, Result};
use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::{self, ErrorKind, ErrorType, SetDutyCycle};
use linux_embedded_hal::gpio_cdev::{Chip, LineRequestFlags};
use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::{CdevPin, Delay, I2cdev, SpidevDevice};
use statpanel_hw::{ColorOrder, Cst816d, Orientation, St7789, TouchConfig};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

const CONSUMER: &str = "statpaneld";

pub type PanelDisplay = St7789<SpidevDevice, CdevPin, CdevPin, Backlight, Delay>;
pub type PanelTouch = Cst816d<I2cdev, CdevPin, CdevPin, Delay>;

/// Backlight failure.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct BacklightError(String);

impl pwm::Error for BacklightError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Kernel PWM channel exported through /sys/class/pwm.
pub struct SysfsPwm {
    dir: PathBuf,
    period_ns: u32,
}

impl SysfsPwm {
    /// Exports and enables `pwmchip<chip>/pwm<channel>`.
    pub fn open(chip: u32, channel: u32, period_ns: u32) -> Result<Self> {
        let chip_dir = PathBuf::from(format!("/sys/class/pwm/pwmchip{}", chip));
        let dir = chip_dir.join(format!("pwm{}", channel));
        if !dir.exists() {
            fs::write(chip_dir.join("export"), channel.to_string())
                .with_context(|| format!("Failed to export PWM channel {}", dir.display()))?;
        }
        fs::write(dir.join("period"), period_ns.to_string())
            .with_context(|| format!("Failed to set PWM period on {}", dir.display()))?;
        fs::write(dir.join("enable"), "1")
            .with_context(|| format!("Failed to enable {}", dir.display()))?;
        debug!("PWM backlight on {}", dir.display());
        Ok(Self { dir, period_ns })
    }
}

/// Backlight output: dimmable PWM or an on/off GPIO line.
pub enum Backlight {
    Pwm(SysfsPwm),
    Gpio(CdevPin),
}

impl ErrorType for Backlight {
    type Error = BacklightError;
}

impl SetDutyCycle for Backlight {
    fn max_duty_cycle(&self) -> u16 {
        100
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        match self {
            Backlight::Pwm(pwm) => {
                let duty_ns = pwm.period_ns as u64 * duty.min(100) as u64 / 100;
                fs::write(pwm.dir.join("duty_cycle"), duty_ns.to_string())
                    .map_err(|e| BacklightError(e.to_string()))
            }
            Backlight::Gpio(pin) => {
                let result = if duty > 0 {
                    pin.set_high()
                } else {
                    pin.set_low()
                };
                result.map_err(|e| BacklightError(format!("{:?}", e)))
            }
        }
    }
}

fn output_pin(chip: &mut Chip, line: u32, initial: u8) -> Result<CdevPin> {
    let handle = chip
        .get_line(line)
        .and_then(|l| l.request(LineRequestFlags::OUTPUT, initial, CONSUMER))
        .with_context(|| format!("Failed to request GPIO line {} as output", line))?;
    CdevPin::new(handle).map_err(|e| anyhow!("GPIO line {}: {:?}", line, e))
}

fn input_pin(chip: &mut Chip, line: u32) -> Result<CdevPin> {
    let handle = chip
        .get_line(line)
        .and_then(|l| l.request(LineRequestFlags::INPUT, 0, CONSUMER))
        .with_context(|| format!("Failed to request GPIO line {} as input", line))?;
    CdevPin::new(handle).map_err(|e| anyhow!("GPIO line {}: {:?}", line, e))
}

fn open_backlight(chip: &mut Chip, config: &BacklightConfig) -> Result<Backlight> {
    match config.mode {
        BacklightMode::Pwm => Ok(Backlight::Pwm(SysfsPwm::open(
            config.pwm_chip,
            config.pwm_channel,
            config.period_ns,
        )?)),
        BacklightMode::Gpio => Ok(Backlight::Gpio(output_pin(chip, config.pin, 0)?)),
    }
}

/// Opens and initializes the display in the configured orientation.
pub fn open_display(config: &DisplayConfig) -> Result<PanelDisplay> {
    let mut spi = SpidevDevice::open(&config.spi)
        .map_err(|e| anyhow!("Failed to open {}: {:?}", config.spi, e))?;
    let options = SpidevOptions::new()
        .bits_per_word(8)
        .max_speed_hz(config.spi_speed_hz)
        .mode(SpiModeFlags::SPI_MODE_0)
        .build();
    spi.0
        .configure(&options)
        .with_context(|| format!("Failed to configure {}", config.spi))?;

    let mut chip = Chip::new(&config.gpio_chip)
        .with_context(|| format!("Failed to open {}", config.gpio_chip))?;
    let dc = output_pin(&mut chip, config.dc_pin, 0)?;
    let rst = output_pin(&mut chip, config.reset_pin, 1)?;
    let backlight = open_backlight(&mut chip, &config.backlight)?;

    let color_order = match config.color_order.to_lowercase().as_str() {
        "bgr" => ColorOrder::Bgr,
        _ => ColorOrder::Rgb,
    };
    let orientation = Orientation::from_degrees(config.orientation);

    let mut display = St7789::new(spi, dc, rst, backlight, Delay).with_color_order(color_order);
    display
        .initialize(orientation)
        .context("Failed to initialize display")?;
    info!(
        "Display on {} ({:?}, {})",
        config.spi, color_order, orientation
    );
    Ok(display)
}

/// Opens the touch controller and pulses its reset line.
pub fn open_touch(settings: &TouchSettings, gpio_chip: &str) -> Result<PanelTouch> {
    let i2c = I2cdev::new(&settings.i2c)
        .map_err(|e| anyhow!("Failed to open {}: {:?}", settings.i2c, e))?;
    let mut chip =
        Chip::new(gpio_chip).with_context(|| format!("Failed to open {}", gpio_chip))?;
    let int = input_pin(&mut chip, settings.int_pin)?;
    let rst = output_pin(&mut chip, settings.reset_pin, 1)?;

    let config = TouchConfig {
        address: settings.address,
        point_block_len: settings.point_block_len,
        ..TouchConfig::default()
    };
    let mut touch = Cst816d::new(i2c, int, rst, Delay, config);
    touch.reset().context("Failed to reset touch controller")?;
    info!(
        "Touch controller on {} at {:#04x}",
        settings.i2c, settings.address
    );
    Ok(touch)
}
