#![cfg_attr(not(test), no_std)]

use core::convert::Infallible;

use embedded_graphics_core::pixelcolor::{Rgb565, raw::RawU16};
use embedded_graphics_core::prelude::RawData;
use embedded_hal::digital::OutputPin;
#[cfg(not(feature = "async"))]
use embedded_hal::spi::SpiDevice;
#[cfg(feature = "async")]
use embedded_hal_async::spi::SpiDevice;

macro_rules! debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "defmt")]
        defmt::debug!($($arg)*);
    };
}

macro_rules! warn {
    ($($arg:tt)*) => {
        #[cfg(feature = "defmt")]
        defmt::warn!($($arg)*);
    };
}

pub mod register;

use register::{DISPLAY_OFF, DISPLAY_ON, PANEL_SETUP_SEQUENCE, POWER_ON_SEQUENCE, Register, Step};

// Panel geometry for ILI9225 176RGB×220
pub const SCREEN_WIDTH: u16 = 176; // Physical width (short edge)
pub const SCREEN_HEIGHT: u16 = 220; // Physical height (long edge)
/// Registers and their values are 16 bits wide on the bus.
pub const REGISTER_WIDTH: u8 = 16;

const BYTES_PER_PIXEL: usize = 2;
// Pixels per SPI write when streaming a solid color
const BATCH_PIXELS: usize = 256;

// Reset pulse timing
const RESET_PULSE_MS: u64 = 1;
const RESET_SETTLE_MS: u64 = 120;

/// Static capability and geometry description of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    pub name: &'static str,
    /// Device tree compatible string
    pub compatible: &'static str,
    pub aliases: &'static [&'static str],
    pub register_width: u8,
    pub width: u16,
    pub height: u16,
}

pub const DESCRIPTOR: Descriptor = Descriptor {
    name: "fb_ili9225",
    compatible: "ilitek,ili9225",
    aliases: &[
        "spi:fb_ili9225",
        "platform:fb_ili9225",
        "spi:ili9225",
        "platform:ili9225",
    ],
    register_width: REGISTER_WIDTH,
    width: SCREEN_WIDTH,
    height: SCREEN_HEIGHT,
};

/// Display rotation, clockwise from the panel's native portrait orientation.
///
/// The controller only distinguishes the transposed cases (90° and 270°) from
/// the upright ones; 180° scans the same way as 0°.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Get the next rotation in the cycle
    pub fn next(self) -> Self {
        match self {
            Rotation::Deg0 => Rotation::Deg90,
            Rotation::Deg90 => Rotation::Deg180,
            Rotation::Deg180 => Rotation::Deg270,
            Rotation::Deg270 => Rotation::Deg0,
        }
    }

    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Parse a rotation given in degrees. Only multiples of 90 below 360 are accepted.
    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    /// True when rows and columns are swapped (`degrees % 180 != 0`).
    pub const fn is_transposed(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Config {
    pub rotation: Rotation,
}

#[derive(Debug)]
pub enum Error<E = ()> {
    /// Communication error
    Comm(E),
    /// Pin setting error
    Pin(Infallible),
    /// Framebuffer shorter than one full frame
    BufferTooSmall { expected: usize, provided: usize },
}

/// ILI9225 driver over a 4-wire SPI bus (SPI device plus data/command pin).
///
/// Registers are addressed with a 16-bit index sent while DC is low, followed
/// by 16-bit big-endian values while DC is high. Pixel data is RGB565,
/// big-endian, and follows the `GramData` (22h) index written by
/// [`set_address_window`](Self::set_address_window).
pub struct ILI9225<SPI, DC, RST, TIMER>
where
    SPI: SpiDevice,
    DC: OutputPin<Error = Infallible>,
    RST: OutputPin<Error = Infallible>,
    TIMER: Timer,
{
    spi: SPI,
    dc: DC,
    rst: RST,
    config: Config,
    _timer: core::marker::PhantomData<TIMER>,
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), self = "ILI9225",),
    async(feature = "async", keep_self)
)]
impl<SPI, DC, RST, E, TIMER> ILI9225<SPI, DC, RST, TIMER>
where
    SPI: SpiDevice<Error = E>,
    DC: OutputPin<Error = Infallible>,
    RST: OutputPin<Error = Infallible>,
    TIMER: Timer,
{
    pub fn new(config: Config, spi: SPI, dc: DC, rst: RST) -> Self {
        Self {
            spi,
            dc,
            rst,
            config,
            _timer: core::marker::PhantomData,
        }
    }

    /// Release the SPI device and pins, deconstructing the driver.
    pub fn release(self) -> (SPI, DC, RST) {
        (self.spi, self.dc, self.rst)
    }

    /// Reset the controller and run the power-on, timing and gamma sequence.
    pub async fn init(&mut self) -> Result<(), Error<E>> {
        debug!("init_display(rotation={})", self.config.rotation.degrees());

        self.reset().await?;

        self.run_sequence(POWER_ON_SEQUENCE).await?;
        self.run_sequence(&register::scan_direction(self.config.rotation))
            .await?;
        self.run_sequence(PANEL_SETUP_SEQUENCE).await?;

        debug!("init_display done");
        Ok(())
    }

    pub async fn reset(&mut self) -> Result<(), Error<E>> {
        debug!("reset");
        self.rst.set_low().map_err(Error::Pin)?;
        TIMER::delay_ms(RESET_PULSE_MS).await;
        self.rst.set_high().map_err(Error::Pin)?;
        TIMER::delay_ms(RESET_SETTLE_MS).await;

        Ok(())
    }

    pub fn rotation(&self) -> Rotation {
        self.config.rotation
    }

    /// Change the rotation and update the GRAM scan direction to match.
    pub async fn set_rotation(&mut self, rotation: Rotation) -> Result<(), Error<E>> {
        debug!("set_rotation({})", rotation.degrees());
        self.run_sequence(&register::scan_direction(rotation))
            .await?;
        self.config.rotation = rotation;
        Ok(())
    }

    /// Logical width for the current rotation
    pub fn width(&self) -> u16 {
        if self.config.rotation.is_transposed() {
            SCREEN_HEIGHT
        } else {
            SCREEN_WIDTH
        }
    }

    /// Logical height for the current rotation
    pub fn height(&self) -> u16 {
        if self.config.rotation.is_transposed() {
            SCREEN_WIDTH
        } else {
            SCREEN_HEIGHT
        }
    }

    pub async fn display_on(&mut self) -> Result<(), Error<E>> {
        self.write_register(Register::DisplayControl1, DISPLAY_ON)
            .await
    }

    pub async fn display_off(&mut self) -> Result<(), Error<E>> {
        self.write_register(Register::DisplayControl1, DISPLAY_OFF)
            .await
    }

    /// Sets the GRAM window (inclusive corners, logical coordinates) and
    /// starts a GRAM write.
    ///
    /// The GRAM address counter is placed at the window origin. Coordinates
    /// are written as given; callers are expected to stay inside
    /// [`width`](Self::width) × [`height`](Self::height).
    pub async fn set_address_window(
        &mut self,
        xs: u16,
        ys: u16,
        xe: u16,
        ye: u16,
    ) -> Result<(), Error<E>> {
        debug!(
            "set_addr_win(xs={}, ys={}, xe={}, ye={})",
            xs, ys, xe, ye
        );

        if self.config.rotation.is_transposed() {
            self.write_register(Register::VerticalWindowEnd, xe).await?;
            self.write_register(Register::VerticalWindowStart, xs)
                .await?;
            self.write_register(Register::HorizontalWindowEnd, ye)
                .await?;
            self.write_register(Register::HorizontalWindowStart, ys)
                .await?;
            self.write_register(Register::RamAddressSet2, xs).await?;
            self.write_register(Register::RamAddressSet1, ys).await?;
        } else {
            self.write_register(Register::HorizontalWindowEnd, xe)
                .await?;
            self.write_register(Register::HorizontalWindowStart, xs)
                .await?;
            self.write_register(Register::VerticalWindowEnd, ye).await?;
            self.write_register(Register::VerticalWindowStart, ys)
                .await?;
            self.write_register(Register::RamAddressSet1, xs).await?;
            self.write_register(Register::RamAddressSet2, ys).await?;
        }

        self.write_command(Register::GramData).await
    }

    /// Write raw RGB565 (big-endian) pixel data into the current window.
    ///
    /// [`set_address_window`](Self::set_address_window) must be called first.
    pub async fn write_pixels(&mut self, data: &[u8]) -> Result<(), Error<E>> {
        self.dc.set_high().map_err(Error::Pin)?;
        self.spi.write(data).await.map_err(Error::Comm)
    }

    /// Push rows `start_line..=end_line` of a full frame to the display.
    ///
    /// `framebuffer` holds one logical frame, row-major, two bytes per pixel.
    /// An inverted or out-of-range line span falls back to the whole frame.
    pub async fn flush(
        &mut self,
        framebuffer: &[u8],
        start_line: u16,
        end_line: u16,
    ) -> Result<(), Error<E>> {
        let (width, height) = (self.width(), self.height());
        let row_bytes = width as usize * BYTES_PER_PIXEL;
        let expected = row_bytes * height as usize;
        if framebuffer.len() < expected {
            return Err(Error::BufferTooSmall {
                expected,
                provided: framebuffer.len(),
            });
        }

        let last_line = height - 1;
        let (mut start, mut end) = (start_line, end_line);
        if start > end {
            warn!(
                "flush: start_line={} is larger than end_line={}, updating whole display",
                start, end
            );
            start = 0;
            end = last_line;
        }
        if start > last_line || end > last_line {
            warn!(
                "flush: start_line={} or end_line={} beyond last line {}, updating whole display",
                start, end, last_line
            );
            start = 0;
            end = last_line;
        }

        self.set_address_window(0, start, width - 1, end).await?;
        let rows = &framebuffer[start as usize * row_bytes..(end as usize + 1) * row_bytes];
        self.write_pixels(rows).await
    }

    /// Fill entire screen with a single color
    pub async fn fill_screen(&mut self, color: Rgb565) -> Result<(), Error<E>> {
        let (width, height) = (self.width(), self.height());
        self.set_address_window(0, 0, width - 1, height - 1).await?;
        self.write_repeated(color, width as u32 * height as u32)
            .await
    }

    /// Fill a rectangular area with a color, clipped to the screen
    pub async fn fill_rect(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        color: Rgb565,
    ) -> Result<(), Error<E>> {
        let (screen_width, screen_height) = (self.width(), self.height());

        if x >= screen_width || y >= screen_height {
            return Ok(());
        }

        let actual_width = width.min(screen_width - x);
        let actual_height = height.min(screen_height - y);

        if actual_width == 0 || actual_height == 0 {
            return Ok(());
        }

        self.set_address_window(x, y, x + actual_width - 1, y + actual_height - 1)
            .await?;
        self.write_repeated(color, actual_width as u32 * actual_height as u32)
            .await
    }

    /// Draw a single pixel
    pub async fn set_pixel(&mut self, x: u16, y: u16, color: Rgb565) -> Result<(), Error<E>> {
        if x >= self.width() || y >= self.height() {
            return Ok(());
        }

        self.set_address_window(x, y, x, y).await?;
        self.write_pixels(&color_bytes(color)).await
    }

    async fn write_repeated(&mut self, color: Rgb565, pixels: u32) -> Result<(), Error<E>> {
        let bytes = color_bytes(color);
        let mut batch = [0u8; BATCH_PIXELS * BYTES_PER_PIXEL];
        for chunk in batch.chunks_exact_mut(BYTES_PER_PIXEL) {
            chunk.copy_from_slice(&bytes);
        }

        let full_batches = pixels / BATCH_PIXELS as u32;
        for _ in 0..full_batches {
            self.write_pixels(&batch).await?;
        }

        let remaining = (pixels % BATCH_PIXELS as u32) as usize;
        if remaining > 0 {
            self.write_pixels(&batch[..remaining * BYTES_PER_PIXEL])
                .await?;
        }
        Ok(())
    }

    async fn run_sequence(&mut self, steps: &[Step]) -> Result<(), Error<E>> {
        for step in steps {
            match *step {
                Step::Write(register, value) => self.write_register(register, value).await?,
                Step::DelayMs(ms) => TIMER::delay_ms(ms).await,
            }
        }
        Ok(())
    }

    /// Write a 16-bit value to a register
    async fn write_register(&mut self, register: Register, value: u16) -> Result<(), Error<E>> {
        self.write_command(register).await?;
        self.dc.set_high().map_err(Error::Pin)?;
        self.spi
            .write(&value.to_be_bytes())
            .await
            .map_err(Error::Comm)
    }

    /// Select a register without a payload
    async fn write_command(&mut self, register: Register) -> Result<(), Error<E>> {
        self.dc.set_low().map_err(Error::Pin)?;
        self.spi
            .write(&register.index().to_be_bytes())
            .await
            .map_err(Error::Comm)
    }
}

fn color_bytes(color: Rgb565) -> [u8; BYTES_PER_PIXEL] {
    RawU16::from(color).into_inner().to_be_bytes()
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), self = "Timer",),
    async(feature = "async", keep_self)
)]
/// Simplified timer trait for delay operations.
pub trait Timer {
    /// Delay for the specified number of milliseconds.
    async fn delay_ms(milliseconds: u64);
}

/// [`Timer`] backed by `embassy-time`.
#[cfg(feature = "embassy-time")]
pub struct EmbassyTimer;

#[cfg(all(feature = "embassy-time", feature = "async"))]
impl Timer for EmbassyTimer {
    async fn delay_ms(milliseconds: u64) {
        embassy_time::Timer::after_millis(milliseconds).await;
    }
}

#[cfg(all(feature = "embassy-time", not(feature = "async")))]
impl Timer for EmbassyTimer {
    fn delay_ms(milliseconds: u64) {
        embassy_time::block_for(embassy_time::Duration::from_millis(milliseconds));
    }
}
