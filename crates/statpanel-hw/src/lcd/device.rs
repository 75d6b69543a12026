//! ST7789 display driver over SPI.

use crate::orientation::{Orientation, MADCTL_BGR};
use crate::{Error, Result, BACKLIGHT_MAX};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use embedded_hal::spi::SpiDevice;
use tracing::{debug, info};

use super::codec;
use super::framebuffer::Framebuffer;
use super::protocol::{address_range, Command, InitStep, CHUNK_SIZE, ST7789_INIT_SEQUENCE};

/// Hardware reset pulse width in milliseconds.
const RESET_PULSE_MS: u32 = 10;

/// Subpixel order of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorOrder {
    #[default]
    Rgb,
    Bgr,
}

/// ST7789 display controller.
///
/// Owns the SPI device, the data/command and reset lines, and the backlight
/// PWM output. Created once at startup and lent to the control loop.
pub struct St7789<SPI, DC, RST, BL, D> {
    spi: SPI,
    dc: DC,
    rst: RST,
    backlight: BL,
    delay: D,
    orientation: Orientation,
    color_order: ColorOrder,
    init_sequence: &'static [InitStep],
    backlight_level: u8,
}

impl<SPI, DC, RST, BL, D> St7789<SPI, DC, RST, BL, D>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BL: SetDutyCycle,
    D: DelayNs,
{
    /// Creates a driver using the default 240x320 init table.
    pub fn new(spi: SPI, dc: DC, rst: RST, backlight: BL, delay: D) -> Self {
        Self {
            spi,
            dc,
            rst,
            backlight,
            delay,
            orientation: Orientation::default(),
            color_order: ColorOrder::default(),
            init_sequence: ST7789_INIT_SEQUENCE,
            backlight_level: 0,
        }
    }

    /// Replaces the panel initialization table.
    pub fn with_init_sequence(mut self, sequence: &'static [InitStep]) -> Self {
        self.init_sequence = sequence;
        self
    }

    /// Sets the subpixel order written with every orientation change.
    pub fn with_color_order(mut self, order: ColorOrder) -> Self {
        self.color_order = order;
        self
    }

    /// Resets the panel, replays the init table and applies `orientation`.
    pub fn initialize(&mut self, orientation: Orientation) -> Result<()> {
        self.reset()?;
        for step in self.init_sequence {
            self.write_command(step.command, step.data)?;
            if step.delay_ms > 0 {
                self.delay.delay_ms(step.delay_ms);
            }
        }
        self.set_orientation(orientation)?;
        info!(
            "ST7789 initialized ({} steps, orientation {})",
            self.init_sequence.len(),
            orientation
        );
        Ok(())
    }

    /// Pulses the reset line high, low, high.
    pub fn reset(&mut self) -> Result<()> {
        self.rst.set_high().map_err(Error::gpio)?;
        self.delay.delay_ms(RESET_PULSE_MS);
        self.rst.set_low().map_err(Error::gpio)?;
        self.delay.delay_ms(RESET_PULSE_MS);
        self.rst.set_high().map_err(Error::gpio)?;
        self.delay.delay_ms(RESET_PULSE_MS);
        Ok(())
    }

    /// Sets the display orientation with a single MADCTL write.
    pub fn set_orientation(&mut self, orientation: Orientation) -> Result<()> {
        let mut madctl = orientation.madctl();
        if self.color_order == ColorOrder::Bgr {
            madctl |= MADCTL_BGR;
        }
        self.write_command(Command::MemoryAccessControl as u8, &[madctl])?;
        self.orientation = orientation;
        debug!("Set orientation to {} (MADCTL {:#04X})", orientation, madctl);
        Ok(())
    }

    /// Sets the orientation from an angle; unsupported angles select 0°.
    pub fn set_orientation_degrees(&mut self, degrees: u16) -> Result<()> {
        self.set_orientation(Orientation::from_degrees(degrees))
    }

    /// Gets the current orientation.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Returns the logical dimensions for the current orientation.
    pub fn dimensions(&self) -> (u16, u16) {
        self.orientation.dimensions()
    }

    /// Sets the backlight level (0-100), linearly mapped to PWM duty.
    pub fn set_backlight(&mut self, level: u8) -> Result<()> {
        let level = level.min(BACKLIGHT_MAX);
        self.backlight
            .set_duty_cycle_percent(level)
            .map_err(Error::backlight)?;
        self.backlight_level = level;
        debug!("Backlight set to {}%", level);
        Ok(())
    }

    /// Returns the last backlight level written.
    pub fn backlight(&self) -> u8 {
        self.backlight_level
    }

    /// Pushes a full frame. The framebuffer must match the logical dimensions.
    pub fn push_frame(&mut self, frame: &Framebuffer) -> Result<()> {
        let (width, height) = self.dimensions();
        if frame.dimensions() != (width, height) {
            return Err(Error::FramebufferSize {
                expected: width as usize * height as usize,
                actual: frame.width() as usize * frame.height() as usize,
            });
        }
        let bytes = codec::encode(frame);
        self.set_window(width, height)?;
        self.stream(&bytes)?;
        debug!(
            "Frame pushed ({} bytes, {} chunks)",
            bytes.len(),
            bytes.len().div_ceil(CHUNK_SIZE)
        );
        Ok(())
    }

    /// Clears the panel to black through the regular frame path.
    pub fn clear(&mut self) -> Result<()> {
        let (width, height) = self.dimensions();
        self.push_frame(&Framebuffer::new(width, height))
    }

    /// Opens a full-panel addressing window and issues `MemoryWrite`.
    fn set_window(&mut self, width: u16, height: u16) -> Result<()> {
        self.write_command(
            Command::ColumnAddressSet as u8,
            &address_range(0, width.saturating_sub(1)),
        )?;
        self.write_command(
            Command::RowAddressSet as u8,
            &address_range(0, height.saturating_sub(1)),
        )?;
        self.write_command(Command::MemoryWrite as u8, &[])
    }

    /// Streams pixel bytes in fixed-size chunks.
    fn stream(&mut self, bytes: &[u8]) -> Result<()> {
        self.dc.set_high().map_err(Error::gpio)?;
        for chunk in bytes.chunks(CHUNK_SIZE) {
            self.spi.write(chunk).map_err(Error::spi)?;
        }
        Ok(())
    }

    fn write_command(&mut self, command: u8, data: &[u8]) -> Result<()> {
        self.dc.set_low().map_err(Error::gpio)?;
        self.spi.write(&[command]).map_err(Error::spi)?;
        if !data.is_empty() {
            self.dc.set_high().map_err(Error::gpio)?;
            self.spi.write(data).map_err(Error::spi)?;
        }
        Ok(())
    }
}
