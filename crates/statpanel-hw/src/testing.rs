//! In-memory fakes for the embedded-hal traits used in unit tests.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, InputPin, OutputPin};
use embedded_hal::i2c::{self, I2c};
use embedded_hal::pwm::{self, SetDutyCycle};
use embedded_hal::spi::{self, Operation, SpiDevice};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct FakeError;

impl spi::Error for FakeError {
    fn kind(&self) -> spi::ErrorKind {
        spi::ErrorKind::Other
    }
}

impl i2c::Error for FakeError {
    fn kind(&self) -> i2c::ErrorKind {
        i2c::ErrorKind::Other
    }
}

impl digital::Error for FakeError {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

impl pwm::Error for FakeError {
    fn kind(&self) -> pwm::ErrorKind {
        pwm::ErrorKind::Other
    }
}

/// A byte run on the display bus, classified by the DC line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    Command(u8),
    Data(Vec<u8>),
}

#[derive(Default)]
struct BusState {
    dc_high: bool,
    failing: bool,
    events: Vec<BusEvent>,
}

/// Shared SPI bus and DC line recording command/data traffic.
#[derive(Clone, Default)]
pub struct FakeBus(Rc<RefCell<BusState>>);

impl FakeBus {
    pub fn spi(&self) -> FakeSpi {
        FakeSpi(self.clone())
    }

    pub fn dc(&self) -> FakeDc {
        FakeDc(self.clone())
    }

    pub fn events(&self) -> Vec<BusEvent> {
        self.0.borrow().events.clone()
    }

    pub fn clear_events(&self) {
        self.0.borrow_mut().events.clear();
    }

    pub fn set_failing(&self, failing: bool) {
        self.0.borrow_mut().failing = failing;
    }
}

pub struct FakeSpi(FakeBus);

impl spi::ErrorType for FakeSpi {
    type Error = FakeError;
}

impl SpiDevice for FakeSpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), FakeError> {
        let mut state = (self.0).0.borrow_mut();
        if state.failing {
            return Err(FakeError);
        }
        for op in operations.iter() {
            if let Operation::Write(bytes) = op {
                let event = if state.dc_high {
                    BusEvent::Data(bytes.to_vec())
                } else {
                    BusEvent::Command(bytes[0])
                };
                state.events.push(event);
            }
        }
        Ok(())
    }
}

pub struct FakeDc(FakeBus);

impl digital::ErrorType for FakeDc {
    type Error = FakeError;
}

impl OutputPin for FakeDc {
    fn set_low(&mut self) -> Result<(), FakeError> {
        (self.0).0.borrow_mut().dc_high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), FakeError> {
        (self.0).0.borrow_mut().dc_high = true;
        Ok(())
    }
}

/// Output line recording every level written.
#[derive(Clone, Default)]
pub struct FakePin(Rc<RefCell<Vec<bool>>>);

impl FakePin {
    pub fn levels(&self) -> Vec<bool> {
        self.0.borrow().clone()
    }
}

impl digital::ErrorType for FakePin {
    type Error = FakeError;
}

impl OutputPin for FakePin {
    fn set_low(&mut self) -> Result<(), FakeError> {
        self.0.borrow_mut().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), FakeError> {
        self.0.borrow_mut().push(true);
        Ok(())
    }
}

/// Active-low ready line.
#[derive(Clone, Default)]
pub struct FakeInterrupt(Rc<Cell<bool>>);

impl FakeInterrupt {
    pub fn set_asserted(&self, asserted: bool) {
        self.0.set(asserted);
    }
}

impl digital::ErrorType for FakeInterrupt {
    type Error = FakeError;
}

impl InputPin for FakeInterrupt {
    fn is_high(&mut self) -> Result<bool, FakeError> {
        Ok(!self.0.get())
    }

    fn is_low(&mut self) -> Result<bool, FakeError> {
        Ok(self.0.get())
    }
}

/// PWM output with a 0-100 duty range.
#[derive(Clone, Default)]
pub struct FakePwm(Rc<RefCell<Vec<u16>>>);

impl FakePwm {
    pub fn duties(&self) -> Vec<u16> {
        self.0.borrow().clone()
    }
}

impl pwm::ErrorType for FakePwm {
    type Error = FakeError;
}

impl SetDutyCycle for FakePwm {
    fn max_duty_cycle(&self) -> u16 {
        100
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), FakeError> {
        self.0.borrow_mut().push(duty);
        Ok(())
    }
}

/// Delay that only accumulates the requested time.
#[derive(Clone, Default)]
pub struct FakeDelay(Rc<Cell<u64>>);

impl FakeDelay {
    pub fn total_ms(&self) -> u64 {
        self.0.get() / 1_000_000
    }
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.set(self.0.get() + ns as u64);
    }
}

/// Register-file I2C device.
#[derive(Clone, Default)]
pub struct FakeI2c {
    registers: Rc<RefCell<HashMap<u8, Vec<u8>>>>,
    failing: Rc<Cell<bool>>,
    transfers: Rc<Cell<usize>>,
}

impl FakeI2c {
    pub fn set_register(&self, register: u8, bytes: &[u8]) {
        self.registers.borrow_mut().insert(register, bytes.to_vec());
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub fn transfers(&self) -> usize {
        self.transfers.get()
    }
}

impl i2c::ErrorType for FakeI2c {
    type Error = FakeError;
}

impl I2c for FakeI2c {
    fn transaction(
        &mut self,
        _address: u8,
        operations: &mut [i2c::Operation<'_>],
    ) -> Result<(), FakeError> {
        self.transfers.set(self.transfers.get() + 1);
        if self.failing.get() {
            return Err(FakeError);
        }
        let registers = self.registers.borrow();
        let mut register = 0u8;
        for op in operations.iter_mut() {
            match op {
                i2c::Operation::Write(bytes) => register = bytes.first().copied().unwrap_or(0),
                i2c::Operation::Read(buf) => {
                    let src = registers.get(&register).cloned().unwrap_or_default();
                    for (i, b) in buf.iter_mut().enumerate() {
                        *b = src.get(i).copied().unwrap_or(0);
                    }
                }
            }
        }
        Ok(())
    }
}
