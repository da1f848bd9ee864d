//! ST7789 TFT controller (SPI, 4-wire)
//!
//! The controller latches a command byte while DC is low and parameter or
//! pixel bytes while DC is high. Pixels are streamed after `RAMWR` into the
//! window last set with `CASET`/`RASET`.
//!
//! # States
//!
//! ```text
//! Uninitialized ──initialize()──► Initialized ──set_window()──► Ready
//!       ▲                                                         │
//!       └──────────── any bus error ◄──── Streaming ◄──show()─────┘
//! ```

use embedded_hal::delay::DelayNs;
use log::{debug, trace};
use ocellus_core::traits::{EyePanel, PanelFault};
use ocellus_hal::{OutputPin, SpiBus};

/// ST7789 command bytes
pub mod cmd {
    /// Sleep out
    pub const SLPOUT: u8 = 0x11;
    /// Display inversion on
    pub const INVON: u8 = 0x21;
    /// Display on
    pub const DISPON: u8 = 0x29;
    /// Column address set
    pub const CASET: u8 = 0x2A;
    /// Row address set
    pub const RASET: u8 = 0x2B;
    /// Memory write
    pub const RAMWR: u8 = 0x2C;
    /// Memory data access control
    pub const MADCTL: u8 = 0x36;
    /// Interface pixel format
    pub const COLMOD: u8 = 0x3A;
    /// Porch setting
    pub const PORCTRL: u8 = 0xB2;
    /// Gate control
    pub const GCTRL: u8 = 0xB7;
    /// VCOM setting
    pub const VCOMS: u8 = 0xBB;
    /// LCM control
    pub const LCMCTRL: u8 = 0xC0;
    /// VDV and VRH command enable
    pub const VDVVRHEN: u8 = 0xC2;
    /// VRH set
    pub const VRHS: u8 = 0xC3;
    /// VDV set
    pub const VDVS: u8 = 0xC4;
    /// Frame rate control in normal mode
    pub const FRCTRL2: u8 = 0xC6;
    /// Power control 1
    pub const PWCTRL1: u8 = 0xD0;
    /// Positive voltage gamma
    pub const PVGAMCTRL: u8 = 0xE0;
    /// Negative voltage gamma
    pub const NVGAMCTRL: u8 = 0xE1;
}

/// Register bring-up after reset: portrait, RGB565, panel power and gamma
pub const INIT_SEQUENCE: &[(u8, &[u8])] = &[
    (cmd::MADCTL, &[0x00]),
    (cmd::COLMOD, &[0x05]),
    (cmd::PORCTRL, &[0x05, 0x05, 0x00, 0x30, 0x30]),
    (cmd::GCTRL, &[0x35]),
    (cmd::VCOMS, &[0x19]),
    (cmd::LCMCTRL, &[0x2C]),
    (cmd::VDVVRHEN, &[0x01]),
    (cmd::VRHS, &[0x12]),
    (cmd::VDVS, &[0x20]),
    (cmd::FRCTRL2, &[0x0F]),
    (cmd::PWCTRL1, &[0xA4, 0xA1]),
    (
        cmd::PVGAMCTRL,
        &[
            0xD0, 0x04, 0x0D, 0x11, 0x13, 0x2B, 0x3F, 0x54, 0x4C, 0x18, 0x0D, 0x0B, 0x1F, 0x23,
        ],
    ),
    (
        cmd::NVGAMCTRL,
        &[
            0xD0, 0x04, 0x0C, 0x11, 0x13, 0x2C, 0x3F, 0x44, 0x51, 0x2F, 0x1F, 0x1F, 0x20, 0x23,
        ],
    ),
    (cmd::INVON, &[]),
    (cmd::SLPOUT, &[]),
    (cmd::DISPON, &[]),
];

/// Reset line hold time for each phase
const RESET_PHASE_MS: u32 = 40;

/// Panel geometry and transfer settings
#[derive(Debug, Clone, Copy)]
pub struct St7789Config {
    pub width: u16,
    pub height: u16,
    /// Controller row of the first visible line
    pub row_offset: u16,
    /// Largest single SPI write
    pub chunk_size: usize,
}

impl Default for St7789Config {
    fn default() -> Self {
        Self {
            width: 240,
            height: 240,
            row_offset: 40,
            chunk_size: 4096,
        }
    }
}

/// Address window, inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub x0: u16,
    pub y0: u16,
    pub x1: u16,
    pub y1: u16,
}

impl Window {
    fn pixels(&self) -> usize {
        (self.x1 - self.x0 + 1) as usize * (self.y1 - self.y0 + 1) as usize
    }
}

/// Driver state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Uninitialized,
    Initialized,
    Ready(Window),
    Streaming,
}

/// ST7789 errors
#[derive(Debug, thiserror::Error)]
pub enum DisplayError<S, P> {
    #[error("SPI write failed: {0:?}")]
    Spi(S),
    #[error("control pin failed: {0:?}")]
    Pin(P),
    #[error("frame is {found} bytes, panel needs {expected}")]
    BufferLength { expected: usize, found: usize },
    #[error("window outside the panel")]
    OutOfBounds,
    #[error("panel not initialized")]
    NotInitialized,
}

/// ST7789 panel on one chip select
///
/// `PIN` drives both the reset and the data/command line.
pub struct St7789<SPI, PIN, D> {
    spi: SPI,
    dc: PIN,
    rst: PIN,
    delay: D,
    config: St7789Config,
    state: PanelState,
}

type Result<T, SPI, PIN> =
    core::result::Result<T, DisplayError<<SPI as SpiBus>::Error, <PIN as OutputPin>::Error>>;

impl<SPI, PIN, D> St7789<SPI, PIN, D>
where
    SPI: SpiBus,
    PIN: OutputPin,
    D: DelayNs,
{
    pub fn new(spi: SPI, dc: PIN, rst: PIN, delay: D, config: St7789Config) -> Self {
        Self {
            spi,
            dc,
            rst,
            delay,
            config,
            state: PanelState::Uninitialized,
        }
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    pub fn config(&self) -> &St7789Config {
        &self.config
    }

    /// Bytes in one full-panel frame
    pub fn frame_bytes(&self) -> usize {
        self.config.width as usize * self.config.height as usize * 2
    }

    fn chunk_size(&self) -> usize {
        self.config.chunk_size.min(self.spi.max_transfer_size()).max(2)
    }

    /// Run `f`, dropping back to `Uninitialized` if it fails on the bus
    fn guarded<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, SPI, PIN>,
    ) -> Result<T, SPI, PIN> {
        let result = f(self);
        if let Err(DisplayError::Spi(_) | DisplayError::Pin(_)) = &result {
            self.state = PanelState::Uninitialized;
        }
        result
    }

    fn dc(&mut self, data: bool) -> Result<(), SPI, PIN> {
        self.dc.set_state(data).map_err(DisplayError::Pin)
    }

    fn write_chunked(&mut self, data: &[u8]) -> Result<(), SPI, PIN> {
        let chunk = self.chunk_size();
        for part in data.chunks(chunk) {
            self.spi.write(part).map_err(DisplayError::Spi)?;
        }
        Ok(())
    }

    /// Command byte with DC low, then its parameters with DC high
    fn command(&mut self, command: u8, params: &[u8]) -> Result<(), SPI, PIN> {
        self.dc(false)?;
        self.spi.write(&[command]).map_err(DisplayError::Spi)?;
        if !params.is_empty() {
            self.dc(true)?;
            self.write_chunked(params)?;
        }
        Ok(())
    }

    fn hard_reset(&mut self) -> Result<(), SPI, PIN> {
        self.rst.set_high().map_err(DisplayError::Pin)?;
        self.delay.delay_ms(RESET_PHASE_MS);
        self.rst.set_low().map_err(DisplayError::Pin)?;
        self.delay.delay_ms(RESET_PHASE_MS);
        self.rst.set_high().map_err(DisplayError::Pin)?;
        self.delay.delay_ms(RESET_PHASE_MS);
        Ok(())
    }

    /// Hardware reset followed by the register bring-up sequence
    pub fn initialize(&mut self) -> Result<(), SPI, PIN> {
        self.state = PanelState::Uninitialized;
        self.guarded(|panel| {
            panel.hard_reset()?;
            for &(command, params) in INIT_SEQUENCE {
                panel.command(command, params)?;
            }
            Ok(())
        })?;
        self.state = PanelState::Initialized;
        debug!(
            "ST7789 {}x{} initialized",
            self.config.width, self.config.height
        );
        Ok(())
    }

    fn require_init(&self) -> Result<(), SPI, PIN> {
        match self.state {
            PanelState::Uninitialized => Err(DisplayError::NotInitialized),
            _ => Ok(()),
        }
    }

    /// Select the inclusive window `(x0, y0)..=(x1, y1)` and open RAM writes
    pub fn set_window(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<(), SPI, PIN> {
        self.require_init()?;
        if x0 > x1 || y0 > y1 || x1 >= self.config.width || y1 >= self.config.height {
            return Err(DisplayError::OutOfBounds);
        }
        let off = self.config.row_offset;
        let (r0, r1) = (y0 + off, y1 + off);
        self.guarded(|panel| {
            panel.command(cmd::CASET, &[(x0 >> 8) as u8, x0 as u8, (x1 >> 8) as u8, x1 as u8])?;
            panel.command(cmd::RASET, &[(r0 >> 8) as u8, r0 as u8, (r1 >> 8) as u8, r1 as u8])?;
            panel.command(cmd::RAMWR, &[])
        })?;
        let window = Window { x0, y0, x1, y1 };
        trace!("ST7789 window {:?}", window);
        self.state = PanelState::Ready(window);
        Ok(())
    }

    /// Stream a full-panel RGB565 frame
    pub fn show(&mut self, pixels: &[u8]) -> Result<(), SPI, PIN> {
        self.require_init()?;
        let expected = self.frame_bytes();
        if pixels.len() != expected {
            return Err(DisplayError::BufferLength {
                expected,
                found: pixels.len(),
            });
        }
        self.set_window(0, 0, self.config.width - 1, self.config.height - 1)?;
        self.guarded(|panel| {
            panel.dc(true)?;
            panel.write_chunked(pixels)
        })?;
        self.state = PanelState::Streaming;
        Ok(())
    }

    /// Fill the current window with `count` copies of `color`
    fn fill(&mut self, count: usize, color: u16) -> Result<(), SPI, PIN> {
        let word = color.to_be_bytes();
        let chunk = self.chunk_size() & !1;
        let buf: Vec<u8> = word.iter().copied().cycle().take(chunk).collect();
        let mut remaining = count * 2;
        self.guarded(|panel| {
            panel.dc(true)?;
            while remaining > 0 {
                let n = remaining.min(buf.len());
                panel.spi.write(&buf[..n]).map_err(DisplayError::Spi)?;
                remaining -= n;
            }
            Ok(())
        })?;
        self.state = PanelState::Streaming;
        Ok(())
    }

    /// Fill the whole panel with one colour
    pub fn clear(&mut self, color: u16) -> Result<(), SPI, PIN> {
        self.clear_window(0, 0, self.config.width - 1, self.config.height - 1, color)
    }

    /// Fill the inclusive window with one colour
    pub fn clear_window(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
        color: u16,
    ) -> Result<(), SPI, PIN> {
        self.set_window(x0, y0, x1, y1)?;
        let count = Window { x0, y0, x1, y1 }.pixels();
        self.fill(count, color)
    }

    /// Set one pixel
    pub fn set_pixel(&mut self, x: u16, y: u16, color: u16) -> Result<(), SPI, PIN> {
        self.set_window(x, y, x, y)?;
        self.fill(1, color)
    }

    /// Release the bus and pins
    pub fn release(self) -> (SPI, PIN, PIN, D) {
        (self.spi, self.dc, self.rst, self.delay)
    }
}

impl<SPI, PIN, D> EyePanel for St7789<SPI, PIN, D>
where
    SPI: SpiBus,
    PIN: OutputPin,
    D: DelayNs,
{
    type Error = DisplayError<SPI::Error, PIN::Error>;

    fn initialize(&mut self) -> core::result::Result<(), Self::Error> {
        St7789::initialize(self)
    }

    fn show(&mut self, frame: &[u8]) -> core::result::Result<(), Self::Error> {
        St7789::show(self, frame)
    }

    fn clear(&mut self, color: u16) -> core::result::Result<(), Self::Error> {
        St7789::clear(self, color)
    }

    fn is_initialized(&self) -> bool {
        self.state != PanelState::Uninitialized
    }

    fn fault(error: &Self::Error) -> PanelFault {
        match error {
            DisplayError::Spi(_) | DisplayError::Pin(_) | DisplayError::NotInitialized => {
                PanelFault::Link
            }
            DisplayError::BufferLength { .. } | DisplayError::OutOfBounds => PanelFault::Usage,
        }
    }
}
