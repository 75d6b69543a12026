//! CST816D touch controller driver.

use crate::{Error, Result, NATIVE_HEIGHT, NATIVE_WIDTH};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::i2c::I2c;
use tracing::{debug, info, warn};

/// Reset pulse low time in milliseconds.
const RESET_LOW_MS: u32 = 10;

/// Settle time after releasing reset, in milliseconds.
const RESET_SETTLE_MS: u32 = 50;

/// Consecutive failed reads between repeated warnings (one minute at 100 ms).
const FAILURE_LOG_EVERY: u32 = 600;

/// Register layout of a touch controller variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchConfig {
    /// 7-bit I2C address.
    pub address: u8,
    /// Register holding the number of active points.
    pub count_register: u8,
    /// First register of the coordinate block.
    pub point_register: u8,
    /// Bytes per point in the coordinate block (4-6 depending on variant).
    pub point_block_len: usize,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            address: 0x15,
            count_register: 0x02,
            point_register: 0x03,
            point_block_len: 4,
        }
    }
}

/// One poll result. Only the first point is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TouchSample {
    /// Number of points reported by the controller.
    pub points: u8,
    /// Raw X in native panel space.
    pub x: u16,
    /// Raw Y in native panel space.
    pub y: u16,
}

impl TouchSample {
    /// A sample with no touch.
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns true if at least one point is down.
    pub fn is_touch(&self) -> bool {
        self.points > 0
    }
}

/// CST816D touch controller.
pub struct Cst816d<I2C, INT, RST, D> {
    i2c: I2C,
    int: INT,
    rst: RST,
    delay: D,
    config: TouchConfig,
    current: TouchSample,
    failures: u32,
}

impl<I2C, INT, RST, D> Cst816d<I2C, INT, RST, D>
where
    I2C: I2c,
    INT: InputPin,
    RST: OutputPin,
    D: DelayNs,
{
    /// Creates a driver for the given register layout.
    pub fn new(i2c: I2C, int: INT, rst: RST, delay: D, config: TouchConfig) -> Self {
        Self {
            i2c,
            int,
            rst,
            delay,
            config,
            current: TouchSample::none(),
            failures: 0,
        }
    }

    /// Pulses the reset line low then high and waits for the controller to settle.
    pub fn reset(&mut self) -> Result<()> {
        self.rst.set_low().map_err(Error::gpio)?;
        self.delay.delay_ms(RESET_LOW_MS);
        self.rst.set_high().map_err(Error::gpio)?;
        self.delay.delay_ms(RESET_SETTLE_MS);
        debug!("Touch controller reset");
        Ok(())
    }

    /// Polls the controller.
    ///
    /// The bus is only read while the interrupt line is asserted (low). Bus
    /// errors are reported as "no touch"; a run of them is logged on the first
    /// failure and then every `FAILURE_LOG_EVERY` polls.
    pub fn poll(&mut self) -> TouchSample {
        self.current = match self.read_sample() {
            Ok(sample) => {
                if self.failures > 0 {
                    info!("Touch reads recovered after {} failures", self.failures);
                    self.failures = 0;
                }
                sample
            }
            Err(e) => {
                self.failures = self.failures.saturating_add(1);
                if should_log_failure(self.failures) {
                    warn!("Touch read failed ({} in a row): {}", self.failures, e);
                }
                TouchSample::none()
            }
        };
        self.current
    }

    /// Number of consecutive failed reads.
    pub fn consecutive_failures(&self) -> u32 {
        self.failures
    }

    /// Returns the sample from the last poll.
    pub fn last_sample(&self) -> TouchSample {
        self.current
    }

    fn read_sample(&mut self) -> Result<TouchSample> {
        if !self.int.is_low().map_err(Error::gpio)? {
            return Ok(TouchSample::none());
        }

        let mut count = [0u8; 1];
        self.read_register(self.config.count_register, &mut count)?;
        if count[0] == 0 {
            return Ok(TouchSample::none());
        }

        let mut block = vec![0u8; self.config.point_block_len.max(4)];
        let register = self.config.point_register;
        self.read_register(register, &mut block)?;
        let (x, y) = decode_point(&block);

        Ok(TouchSample {
            points: count[0],
            x: x.min(NATIVE_WIDTH - 1),
            y: y.min(NATIVE_HEIGHT - 1),
        })
    }

    fn read_register(&mut self, register: u8, buf: &mut [u8]) -> Result<()> {
        self.i2c
            .write_read(self.config.address, &[register], buf)
            .map_err(Error::i2c)
    }
}

/// Decodes the 12-bit X/Y pair at the start of a point block.
/// The high nibble of bytes 0 and 2 carries event flags and is discarded.
pub fn decode_point(block: &[u8]) -> (u16, u16) {
    let x = ((block[0] as u16 & 0x0F) << 8) | block[1] as u16;
    let y = ((block[2] as u16 & 0x0F) << 8) | block[3] as u16;
    (x, y)
}

fn should_log_failure(failures: u32) -> bool {
    failures == 1 || failures % FAILURE_LOG_EVERY == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeDelay, FakeI2c, FakeInterrupt, FakePin};

    fn touch(
        config: TouchConfig,
    ) -> (
        Cst816d<FakeI2c, FakeInterrupt, FakePin, FakeDelay>,
        FakeI2c,
        FakeInterrupt,
    ) {
        let i2c = FakeI2c::default();
        let int = FakeInterrupt::default();
        let driver = Cst816d::new(
            i2c.clone(),
            int.clone(),
            FakePin::default(),
            FakeDelay::default(),
            config,
        );
        (driver, i2c, int)
    }

    #[test]
    fn test_decode_point() {
        assert_eq!(decode_point(&[0x80, 0x78, 0x01, 0x2C]), (0x078, 0x12C));
        assert_eq!(decode_point(&[0xFF, 0xFF, 0xFF, 0xFF]), (0xFFF, 0xFFF));
    }

    #[test]
    fn test_reset_pulse() {
        let rst = FakePin::default();
        let delay = FakeDelay::default();
        let mut driver = Cst816d::new(
            FakeI2c::default(),
            FakeInterrupt::default(),
            rst.clone(),
            delay.clone(),
            TouchConfig::default(),
        );
        driver.reset().unwrap();
        assert_eq!(rst.levels(), vec![false, true]);
        assert_eq!(delay.total_ms(), 60);
    }

    #[test]
    fn test_poll_skips_bus_when_idle() {
        let (mut driver, i2c, _int) = touch(TouchConfig::default());
        assert_eq!(driver.poll(), TouchSample::none());
        assert_eq!(i2c.transfers(), 0);
    }

    #[test]
    fn test_poll_reads_first_point() {
        let (mut driver, i2c, int) = touch(TouchConfig::default());
        i2c.set_register(0x02, &[1]);
        i2c.set_register(0x03, &[0x00, 0x64, 0x01, 0x00]);
        int.set_asserted(true);

        let sample = driver.poll();
        assert_eq!(sample, TouchSample { points: 1, x: 100, y: 256 });
        assert!(sample.is_touch());
        assert_eq!(i2c.transfers(), 2);
    }

    #[test]
    fn test_poll_clamps_to_native_bounds() {
        let (mut driver, i2c, int) = touch(TouchConfig::default());
        i2c.set_register(0x02, &[2]);
        i2c.set_register(0x03, &[0x0F, 0xFF, 0x0F, 0xFF]);
        int.set_asserted(true);

        let sample = driver.poll();
        assert_eq!(sample.points, 2);
        assert_eq!((sample.x, sample.y), (239, 319));
    }

    #[test]
    fn test_zero_count_clears_state() {
        let (mut driver, i2c, int) = touch(TouchConfig::default());
        i2c.set_register(0x02, &[1]);
        i2c.set_register(0x03, &[0x00, 0x10, 0x00, 0x20]);
        int.set_asserted(true);
        assert!(driver.poll().is_touch());

        i2c.set_register(0x02, &[0]);
        assert_eq!(driver.poll(), TouchSample::none());
        assert_eq!(driver.last_sample(), TouchSample::none());
    }

    #[test]
    fn test_bus_error_is_no_touch() {
        let (mut driver, i2c, int) = touch(TouchConfig::default());
        int.set_asserted(true);
        i2c.set_failing(true);
        assert_eq!(driver.poll(), TouchSample::none());
    }

    #[test]
    fn test_failure_run_counts_and_resets() {
        let (mut driver, i2c, int) = touch(TouchConfig::default());
        int.set_asserted(true);
        i2c.set_failing(true);
        for _ in 0..5 {
            driver.poll();
        }
        assert_eq!(driver.consecutive_failures(), 5);

        i2c.set_failing(false);
        i2c.set_register(0x02, &[0]);
        driver.poll();
        assert_eq!(driver.consecutive_failures(), 0);
    }

    #[test]
    fn test_failure_logging_is_throttled() {
        assert!(should_log_failure(1));
        assert!(!should_log_failure(2));
        assert!(!should_log_failure(FAILURE_LOG_EVERY - 1));
        assert!(should_log_failure(FAILURE_LOG_EVERY));
        assert_eq!((1..=3000).filter(|&n| should_log_failure(n)).count(), 6);
    }

    #[test]
    fn test_six_byte_variant() {
        let config = TouchConfig {
            point_block_len: 6,
            ..TouchConfig::default()
        };
        let (mut driver, i2c, int) = touch(config);
        i2c.set_register(0x02, &[1]);
        i2c.set_register(0x03, &[0x40, 0x20, 0x00, 0x30, 0xAA, 0xBB]);
        int.set_asserted(true);
        let sample = driver.poll();
        assert_eq!((sample.x, sample.y), (0x20, 0x30));
    }
}
