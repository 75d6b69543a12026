//! Error types for the statpanel hardware library.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when interacting with the hardware.
#[derive(Error, Debug)]
pub enum Error {
    /// SPI bus write failed.
    #[error("SPI error: {0}")]
    Spi(String),

    /// I2C bus transfer failed.
    #[error("I2C error: {0}")]
    I2c(String),

    /// Digital line could not be driven or read.
    #[error("GPIO error: {0}")]
    Gpio(String),

    /// Backlight duty cycle could not be set.
    #[error("Backlight error: {0}")]
    Backlight(String),

    /// Invalid orientation value.
    #[error("Invalid orientation: {0}")]
    InvalidOrientation(String),

    /// Framebuffer size mismatch.
    #[error("Framebuffer size mismatch: expected {expected}, got {actual}")]
    FramebufferSize { expected: usize, actual: usize },
}

impl Error {
    pub(crate) fn spi(e: impl std::fmt::Debug) -> Self {
        Error::Spi(format!("{:?}", e))
    }

    pub(crate) fn i2c(e: impl std::fmt::Debug) -> Self {
        Error::I2c(format!("{:?}", e))
    }

    pub(crate) fn gpio(e: impl std::fmt::Debug) -> Self {
        Error::Gpio(format!("{:?}", e))
    }

    pub(crate) fn backlight(e: impl std::fmt::Debug) -> Self {
        Error::Backlight(format!("{:?}", e))
    }
}
