//! ST7789 command set and initialization table.
//!
//! Every transfer is a single command byte (DC low) followed by zero or more
//! parameter bytes (DC high). Pixel data is streamed after `MemoryWrite` in
//! chunks of `CHUNK_SIZE` bytes.

/// Maximum bytes per SPI transfer when streaming pixel data.
pub const CHUNK_SIZE: usize = 4096;

/// ST7789 command bytes used by this driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    SleepOut = 0x11,
    InversionOn = 0x21,
    DisplayOn = 0x29,
    ColumnAddressSet = 0x2A,
    RowAddressSet = 0x2B,
    MemoryWrite = 0x2C,
    MemoryAccessControl = 0x36,
    PixelFormat = 0x3A,
    PorchSetting = 0xB2,
    GateControl = 0xB7,
    VcomSetting = 0xBB,
    LcmControl = 0xC0,
    VdvVrhEnable = 0xC2,
    VrhSet = 0xC3,
    VdvSet = 0xC4,
    FrameRateControl = 0xC6,
    PowerControl1 = 0xD0,
    PositiveGamma = 0xE0,
    NegativeGamma = 0xE1,
}

/// One entry of a panel initialization table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitStep {
    pub command: u8,
    pub data: &'static [u8],
    /// Delay after the step, in milliseconds.
    pub delay_ms: u32,
}

impl InitStep {
    const fn new(command: Command, data: &'static [u8], delay_ms: u32) -> Self {
        Self {
            command: command as u8,
            data,
            delay_ms,
        }
    }
}

/// Vendor initialization sequence for the 2" 240x320 ST7789 module.
/// Replayed verbatim; alternate panel revisions supply their own table.
pub const ST7789_INIT_SEQUENCE: &[InitStep] = &[
    InitStep::new(Command::SleepOut, &[], 120),
    InitStep::new(Command::MemoryAccessControl, &[0x00], 0),
    InitStep::new(Command::PixelFormat, &[0x05], 0), // 16 bits/pixel
    InitStep::new(Command::PorchSetting, &[0x0C, 0x0C, 0x00, 0x33, 0x33], 0),
    InitStep::new(Command::GateControl, &[0x35], 0),
    InitStep::new(Command::VcomSetting, &[0x19], 0),
    InitStep::new(Command::LcmControl, &[0x2C], 0),
    InitStep::new(Command::VdvVrhEnable, &[0x01, 0xFF], 0),
    InitStep::new(Command::VrhSet, &[0x12], 0),
    InitStep::new(Command::VdvSet, &[0x20], 0),
    InitStep::new(Command::FrameRateControl, &[0x0F], 0),
    InitStep::new(Command::PowerControl1, &[0xA4, 0xA1], 0),
    InitStep::new(
        Command::PositiveGamma,
        &[
            0xD0, 0x04, 0x0D, 0x11, 0x13, 0x2B, 0x3F, 0x54, 0x4C, 0x18, 0x0D, 0x0B, 0x1F, 0x23,
        ],
        0,
    ),
    InitStep::new(
        Command::NegativeGamma,
        &[
            0xD0, 0x04, 0x0C, 0x11, 0x13, 0x2C, 0x3F, 0x44, 0x51, 0x2F, 0x1F, 0x1F, 0x20, 0x23,
        ],
        0,
    ),
    InitStep::new(Command::InversionOn, &[], 0),
    InitStep::new(Command::SleepOut, &[], 120),
    InitStep::new(Command::DisplayOn, &[], 0),
];

/// Encodes an inclusive start/end address pair as the 4-byte CASET/RASET payload.
pub fn address_range(start: u16, end: u16) -> [u8; 4] {
    let s = start.to_be_bytes();
    let e = end.to_be_bytes();
    [s[0], s[1], e[0], e[1]]
}
