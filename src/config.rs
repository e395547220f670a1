//! Matrix configuration types and builder

use embedded_hal::spi::{MODE_0, Mode};

pub use crate::error::BuilderError;

/// Largest number of pixels the bridge microcontroller can buffer
///
/// The bridge keeps a full frame in SRAM (3 bytes per pixel).
pub const MAX_PIXELS: u32 = 4096;

/// Lowest SPI clock the bridge samples reliably
pub const MIN_SPI_FREQUENCY_HZ: u32 = 450_000;

/// Highest SPI clock the bridge samples reliably
pub const MAX_SPI_FREQUENCY_HZ: u32 = 500_000;

/// Minimum time the reset line must be held high
pub const MIN_RESET_PULSE_MS: u32 = 1;

/// Minimum time the bridge needs after the reset line falls
pub const MIN_RESET_SETTLE_MS: u32 = 20;

/// Matrix dimensions in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    /// Number of columns
    pub width: u16,
    /// Number of rows
    pub height: u16,
}

impl Dimensions {
    /// Create new dimensions with validation
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidDimensions` if either side is zero or the
    /// pixel count exceeds [`MAX_PIXELS`].
    pub fn new(width: u16, height: u16) -> Result<Self, BuilderError> {
        if width == 0 || height == 0 || u32::from(width) * u32::from(height) > MAX_PIXELS {
            return Err(BuilderError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    /// Number of pixels in the grid
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Number of bytes in one frame (3 channels per pixel)
    pub fn frame_len(&self) -> usize {
        self.pixel_count() * 3
    }

    /// Whether the matrix is square
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            width: 16,
            height: 16,
        }
    }
}

/// Orientation of logical coordinates relative to the physical wiring
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rotation {
    /// No rotation
    #[default]
    Rotate0,
    /// Rotate 90 degrees clockwise
    Rotate90,
    /// Rotate 180 degrees
    Rotate180,
    /// Rotate 270 degrees clockwise
    Rotate270,
}

/// Bus parameters the bridge expects
///
/// embedded-hal has no portable way to program a bus, so the host applies
/// these when it builds its [`SpiDevice`](embedded_hal::spi::SpiDevice).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpiConfig {
    /// Clock polarity and phase
    pub mode: Mode,
    /// Word size, the bridge only understands 8-bit words
    pub bits_per_word: u8,
    /// Clock frequency in Hz
    pub frequency_hz: u32,
}

impl SpiConfig {
    /// Check the parameters against what the bridge can sample
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidSpiConfig` when the word size is not 8 or
    /// the clock is outside 450-500 kHz.
    pub fn validate(&self) -> Result<(), BuilderError> {
        if self.bits_per_word != 8
            || !(MIN_SPI_FREQUENCY_HZ..=MAX_SPI_FREQUENCY_HZ).contains(&self.frequency_hz)
        {
            return Err(BuilderError::InvalidSpiConfig {
                bits_per_word: self.bits_per_word,
                frequency_hz: self.frequency_hz,
            });
        }
        Ok(())
    }
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            mode: MODE_0,
            bits_per_word: 8,
            frequency_hz: MIN_SPI_FREQUENCY_HZ,
        }
    }
}

/// Driver configuration
///
/// Use [`Builder`] to create a Config.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Matrix dimensions
    pub dimensions: Dimensions,
    /// Coordinate rotation
    pub rotation: Rotation,
    /// Bus parameters
    pub spi: SpiConfig,
    /// How long the reset line is held high
    pub reset_pulse_ms: u32,
    /// How long to wait after the reset line falls
    pub reset_settle_ms: u32,
    /// Wait after the first frame during initialization
    pub settle_ms: u32,
    /// Frames between automatic reset pulses (0 disables)
    pub resync_interval: u32,
    /// Number of fade steps run on shutdown
    pub fade_out_steps: u16,
    /// Fade divisor applied on each shutdown step
    pub fade_out_speed: f64,
    /// Wait between shutdown steps
    pub fade_out_delay_ms: u32,
}

/// Builder for constructing driver configuration
///
/// # Example
///
/// ```
/// use spi_led_matrix::{Builder, Dimensions, Rotation};
///
/// let dims = match Dimensions::new(16, 16) {
///     Ok(dims) => dims,
///     Err(_) => return,
/// };
/// let config = match Builder::new().dimensions(dims).rotation(Rotation::Rotate90).build() {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// assert_eq!(config.dimensions.frame_len(), 768);
/// ```
#[must_use]
#[derive(Clone, Debug)]
pub struct Builder {
    dimensions: Dimensions,
    rotation: Rotation,
    spi: SpiConfig,
    reset_pulse_ms: u32,
    reset_settle_ms: u32,
    settle_ms: u32,
    resync_interval: u32,
    fade_out_steps: u16,
    fade_out_speed: f64,
    fade_out_delay_ms: u32,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            dimensions: Dimensions::default(),
            rotation: Rotation::Rotate0,
            spi: SpiConfig::default(),
            reset_pulse_ms: MIN_RESET_PULSE_MS,
            reset_settle_ms: MIN_RESET_SETTLE_MS,
            settle_ms: 20,
            resync_interval: 0,
            fade_out_steps: 64,
            fade_out_speed: 1.2,
            fade_out_delay_ms: 20,
        }
    }
}

impl Builder {
    /// Create a new Builder with default values (16x16, mode 0 at 450 kHz)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set matrix dimensions
    pub fn dimensions(mut self, dims: Dimensions) -> Self {
        self.dimensions = dims;
        self
    }

    /// Set coordinate rotation
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set bus parameters
    pub fn spi(mut self, spi: SpiConfig) -> Self {
        self.spi = spi;
        self
    }

    /// Set the reset pulse width and the settle time after it
    pub fn reset_timing(mut self, pulse_ms: u32, settle_ms: u32) -> Self {
        self.reset_pulse_ms = pulse_ms;
        self.reset_settle_ms = settle_ms;
        self
    }

    /// Set the wait after the first frame during initialization
    pub fn settle_ms(mut self, settle_ms: u32) -> Self {
        self.settle_ms = settle_ms;
        self
    }

    /// Pulse reset before every `frames`-th frame (0 disables)
    ///
    /// The bridge counts incoming bytes; a periodic reset realigns it if a
    /// byte was ever dropped on the wire.
    pub fn resync_interval(mut self, frames: u32) -> Self {
        self.resync_interval = frames;
        self
    }

    /// Configure the shutdown fade-out
    pub fn fade_out(mut self, steps: u16, speed: f64, delay_ms: u32) -> Self {
        self.fade_out_steps = steps;
        self.fade_out_speed = speed;
        self.fade_out_delay_ms = delay_ms;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// - `BuilderError::RotationNeedsSquare` for a quarter turn on a
    ///   rectangular matrix
    /// - `BuilderError::InvalidSpiConfig` for bus parameters the bridge can't use
    /// - `BuilderError::InvalidTiming` for reset timing below the hardware
    ///   minimum or a fade speed that isn't a positive number
    pub fn build(self) -> Result<Config, BuilderError> {
        let quarter_turn = matches!(self.rotation, Rotation::Rotate90 | Rotation::Rotate270);
        if quarter_turn && !self.dimensions.is_square() {
            return Err(BuilderError::RotationNeedsSquare {
                width: self.dimensions.width,
                height: self.dimensions.height,
            });
        }
        self.spi.validate()?;
        if self.reset_pulse_ms < MIN_RESET_PULSE_MS
            || self.reset_settle_ms < MIN_RESET_SETTLE_MS
            || !self.fade_out_speed.is_finite()
            || self.fade_out_speed <= 0.0
        {
            return Err(BuilderError::InvalidTiming);
        }

        Ok(Config {
            dimensions: self.dimensions,
            rotation: self.rotation,
            spi: self.spi,
            reset_pulse_ms: self.reset_pulse_ms,
            reset_settle_ms: self.reset_settle_ms,
            settle_ms: self.settle_ms,
            resync_interval: self.resync_interval,
            fade_out_steps: self.fade_out_steps,
            fade_out_speed: self.fade_out_speed,
            fade_out_delay_ms: self.fade_out_delay_ms,
        })
    }
}
