//! Display driver lifecycle
//!
//! [`DisplayDriver`] owns the framebuffer and the link and walks them through
//! `Initializing -> Ready -> ShuttingDown -> Closed`:
//!
//! - [`DisplayDriver::new`] clears the frame, pulses reset, sends the first
//!   (black) frame and waits for the bridge to settle. If any step fails the
//!   driver is dropped before it is returned and the control line is released.
//! - While `Ready`, pixel setters only touch memory; [`DisplayDriver::present`]
//!   pushes the frame.
//! - [`DisplayDriver::close`], or dropping the driver, fades the matrix out
//!   over a fixed number of frames and parks the control line. This happens
//!   exactly once, on every exit path, and never fails.

use embedded_hal::delay::DelayNs;
use log::{debug, warn};

use crate::color::{Color, Rgb};
use crate::config::{Config, Dimensions};
use crate::error::Error;
use crate::framebuffer::Framebuffer;
use crate::link::DeviceLink;

type DriverResult<T, L> = core::result::Result<T, Error<L>>;

/// Lifecycle state of a [`DisplayDriver`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    /// Reset and first frame in progress
    Initializing,
    /// Accepting pixel writes and frames
    Ready,
    /// Running the fade-out
    ShuttingDown,
    /// Control line released
    Closed,
}

/// LED matrix driver
///
/// ## Type Parameters
///
/// * `L` - Link implementing [`DeviceLink`]
/// * `D` - Delay implementing [`DelayNs`], kept for resets and the fade-out
/// * `B` - Framebuffer storage, at least `dimensions.frame_len()` bytes
///
/// ## Example
///
/// ```rust,no_run
/// use spi_led_matrix::{Builder, Color, DisplayDriver, Link};
/// # use core::convert::Infallible;
/// # use embedded_hal::delay::DelayNs;
/// # use embedded_hal::digital::OutputPin;
/// # use embedded_hal::spi::{Operation, SpiDevice};
/// # struct MockSpi;
/// # impl embedded_hal::spi::ErrorType for MockSpi { type Error = Infallible; }
/// # impl SpiDevice for MockSpi {
/// #     fn transaction(
/// #         &mut self,
/// #         _operations: &mut [Operation<'_, u8>],
/// #     ) -> Result<(), Self::Error> {
/// #         Ok(())
/// #     }
/// # }
/// # struct MockPin;
/// # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
/// # impl OutputPin for MockPin {
/// #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
/// #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
/// # }
/// # struct MockDelay;
/// # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
/// let config = match Builder::new().build() {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// let link = match Link::open(MockSpi, MockPin, &config) {
///     Ok(link) => link,
///     Err(_) => return,
/// };
/// let mut driver = match DisplayDriver::new(link, MockDelay, [0u8; 768], config) {
///     Ok(driver) => driver,
///     Err(_) => return,
/// };
///
/// driver.fill(&Color::from_rgb(16, 16, 16));
/// let _ = driver.present();
///
/// // fades out and releases the reset line
/// let _link = driver.close();
/// ```
pub struct DisplayDriver<L, D, B>
where
    L: DeviceLink,
    D: DelayNs,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Link to the bridge, taken by `close`
    link: Option<L>,
    /// Delay for reset pulses and fade-out pacing
    delay: D,
    /// Pixel grid
    framebuffer: Framebuffer<B>,
    /// Driver configuration
    config: Config,
    /// Lifecycle state
    state: DriverState,
    /// Frames sent since construction (wrapping)
    frames: u32,
    /// Frames sent since the last reset pulse
    since_reset: u32,
}

impl<L, D, B> DisplayDriver<L, D, B>
where
    L: DeviceLink,
    D: DelayNs,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Bring up the matrix
    ///
    /// Clears `buffer`, pulses reset, sends the black frame and waits
    /// `config.settle_ms`.
    ///
    /// # Errors
    ///
    /// - `Error::Frame(FrameError::BufferTooSmall)` if `buffer` can't hold a frame
    /// - `Error::Frame(FrameError::RotationNeedsSquare)` for a quarter turn on a
    ///   rectangular matrix (only reachable when `config` was edited by hand)
    /// - `Error::Link` if the reset pulse or the first frame fails
    ///
    /// On error the control line has already been released.
    pub fn new(mut link: L, delay: D, buffer: B, config: Config) -> DriverResult<Self, L> {
        let framebuffer = match Framebuffer::new(config.dimensions, buffer)
            .and_then(|fb| fb.with_rotation(config.rotation))
        {
            Ok(fb) => fb,
            Err(e) => {
                if let Err(release) = link.release() {
                    warn!("failed to release control line: {:?}", release);
                }
                return Err(e.into());
            }
        };

        let mut driver = Self {
            link: Some(link),
            delay,
            framebuffer,
            config,
            state: DriverState::Initializing,
            frames: 0,
            since_reset: 0,
        };
        driver.init()?;
        Ok(driver)
    }

    fn init(&mut self) -> DriverResult<(), L> {
        let dims = self.config.dimensions;
        debug!("initializing {}x{} matrix", dims.width, dims.height);
        self.reset()?;
        self.write_frame()?;
        self.delay.delay_ms(self.config.settle_ms);
        self.state = DriverState::Ready;
        debug!("matrix ready");
        Ok(())
    }

    /// Pulse the bridge's reset line
    ///
    /// Realigns the bridge with the start of a frame.
    pub fn reset(&mut self) -> DriverResult<(), L> {
        // only `close` takes the link, and it consumes the driver
        if let Some(link) = self.link.as_mut() {
            link.reset(&mut self.delay).map_err(Error::Link)?;
        }
        self.since_reset = 0;
        Ok(())
    }

    /// Send the framebuffer to the matrix
    ///
    /// Blocks until the bytes are written. When a resync interval is
    /// configured and due, a reset pulse goes out first. Failures are not
    /// retried; the caller decides whether to send the frame again.
    pub fn present(&mut self) -> DriverResult<(), L> {
        let interval = self.config.resync_interval;
        if interval > 0 && self.since_reset >= interval {
            self.reset()?;
        }
        self.write_frame()
    }

    fn write_frame(&mut self) -> DriverResult<(), L> {
        if let Some(link) = self.link.as_mut() {
            link.present(self.framebuffer.as_bytes())
                .map_err(Error::Link)?;
        }
        self.frames = self.frames.wrapping_add(1);
        self.since_reset = self.since_reset.saturating_add(1);
        Ok(())
    }

    /// Color of the pixel at (x, y)
    pub fn get_pixel(&self, x: i32, y: i32) -> DriverResult<Color, L> {
        Ok(self.framebuffer.get_pixel(x, y)?)
    }

    /// Set the pixel at (x, y)
    ///
    /// # Errors
    ///
    /// Returns `Error::Frame(FrameError::OutOfRange)` unless `0 <= x < width`
    /// and `0 <= y < height`.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: &Color) -> DriverResult<(), L> {
        Ok(self.framebuffer.set_pixel(x, y, color)?)
    }

    /// Set the pixel at (x, y) from raw channels
    pub fn set_pixel_rgb(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8) -> DriverResult<(), L> {
        Ok(self.framebuffer.set_pixel_rgb(x, y, r, g, b)?)
    }

    /// Set the pixel at (x, y) from hue (degrees), saturation and value
    pub fn set_pixel_hsv(&mut self, x: i32, y: i32, h: f32, s: f32, v: f32) -> DriverResult<(), L> {
        Ok(self.framebuffer.set_pixel_hsv(x, y, h, s, v)?)
    }

    /// Set every pixel to one color
    pub fn fill(&mut self, color: &Color) {
        self.framebuffer.fill(color);
    }

    /// Set every pixel to raw channels
    pub fn fill_rgb(&mut self, rgb: Rgb) {
        self.framebuffer.fill_rgb(rgb);
    }

    /// Divide every channel by `speed` (see [`Framebuffer::fade`])
    pub fn fade(&mut self, speed: f64) -> DriverResult<(), L> {
        Ok(self.framebuffer.fade(speed)?)
    }

    /// Set every pixel to black
    pub fn clear(&mut self) {
        self.framebuffer.clear();
    }

    /// Matrix width in pixels
    pub fn width(&self) -> u16 {
        self.config.dimensions.width
    }

    /// Matrix height in pixels
    pub fn height(&self) -> u16 {
        self.config.dimensions.height
    }

    /// Matrix size
    pub fn dimensions(&self) -> Dimensions {
        self.config.dimensions
    }

    /// Configuration the driver was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current lifecycle state
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Frames sent since construction, including the initial black frame
    pub fn frames_presented(&self) -> u32 {
        self.frames
    }

    /// Pixel grid
    pub fn framebuffer(&self) -> &Framebuffer<B> {
        &self.framebuffer
    }

    /// Mutable pixel grid
    pub fn framebuffer_mut(&mut self) -> &mut Framebuffer<B> {
        &mut self.framebuffer
    }

    /// Fade out, release the control line and hand back the link
    ///
    /// Errors along the way are logged, not returned. The link is always
    /// `Some` here; it is an `Option` only because `Drop` can't move fields.
    pub fn close(mut self) -> Option<L> {
        self.shutdown();
        self.link.take()
    }

    fn shutdown(&mut self) {
        match self.state {
            DriverState::Ready => {}
            DriverState::Initializing => {
                self.release_link();
                self.state = DriverState::Closed;
                return;
            }
            DriverState::ShuttingDown | DriverState::Closed => return,
        }

        self.state = DriverState::ShuttingDown;
        debug!("fading out over {} frames", self.config.fade_out_steps);
        for _ in 0..self.config.fade_out_steps {
            if let Err(e) = self.framebuffer.fade(self.config.fade_out_speed) {
                warn!("fade-out stopped: {}", e);
                break;
            }
            if let Err(e) = self.write_frame() {
                warn!("fade-out stopped: {}", e);
                break;
            }
            self.delay.delay_ms(self.config.fade_out_delay_ms);
        }
        self.release_link();
        self.state = DriverState::Closed;
        debug!("matrix closed");
    }

    fn release_link(&mut self) {
        if let Some(link) = self.link.as_mut() {
            if let Err(e) = link.release() {
                warn!("failed to release control line: {:?}", e);
            }
        }
    }
}

impl<L, D, B> Drop for DisplayDriver<L, D, B>
where
    L: DeviceLink,
    D: DelayNs,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    fn drop(&mut self) {
        self.shutdown();
    }
}
