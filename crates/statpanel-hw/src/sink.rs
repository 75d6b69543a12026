//! Seams between the drivers and the control loop.

use crate::lcd::Framebuffer;
use crate::touch::TouchSample;
use crate::{Cst816d, Result, St7789};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::i2c::I2c;
use embedded_hal::pwm::SetDutyCycle;
use embedded_hal::spi::SpiDevice;

/// Something that can show full frames and has a backlight.
pub trait DisplaySink {
    /// Logical (UI) dimensions frames must have.
    fn dimensions(&self) -> (u16, u16);

    /// Replaces the whole panel contents.
    fn push_frame(&mut self, frame: &Framebuffer) -> Result<()>;

    /// Sets the backlight level (0-100).
    fn set_backlight(&mut self, level: u8) -> Result<()>;
}

/// Something that reports touches. Polling never blocks and never fails.
pub trait TouchSource {
    fn poll(&mut self) -> TouchSample;
}

impl<SPI, DC, RST, BL, D> DisplaySink for St7789<SPI, DC, RST, BL, D>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BL: SetDutyCycle,
    D: DelayNs,
{
    fn dimensions(&self) -> (u16, u16) {
        St7789::dimensions(self)
    }

    fn push_frame(&mut self, frame: &Framebuffer) -> Result<()> {
        St7789::push_frame(self, frame)
    }

    fn set_backlight(&mut self, level: u8) -> Result<()> {
        St7789::set_backlight(self, level)
    }
}

impl<I2C, INT, RST, D> TouchSource for Cst816d<I2C, INT, RST, D>
where
    I2C: I2c,
    INT: InputPin,
    RST: OutputPin,
    D: DelayNs,
{
    fn poll(&mut self) -> TouchSample {
        Cst816d::poll(self)
    }
}
