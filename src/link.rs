//! Hardware link to the bridge microcontroller
//!
//! This module provides the [`DeviceLink`] trait and the [`Link`] struct for
//! pushing frames to the bridge over SPI.
//!
//! ## Hardware Requirements
//!
//! The bridge requires:
//! - SPI bus (MOSI + SCK), mode 0, 8-bit words, 450-500 kHz
//! - 1 GPIO pin:
//!   - **RST**: Reset (output, active high). A rising edge makes the bridge
//!     drop any partially received frame and start over at pixel 0.
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::OutputPin;
//! use embedded_hal::spi::{Operation, SpiDevice};
//! use spi_led_matrix::{Builder, DeviceLink, Link};
//! # use core::convert::Infallible;
//! # struct MockSpi;
//! # impl embedded_hal::spi::ErrorType for MockSpi { type Error = Infallible; }
//! # impl SpiDevice for MockSpi {
//! #     fn transaction(
//! #         &mut self,
//! #         _operations: &mut [Operation<'_, u8>],
//! #     ) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let mut delay = MockDelay;
//! let config = match Builder::new().build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//! let mut link = match Link::open(MockSpi, MockPin, &config) {
//!     Ok(link) => link,
//!     Err(_) => return,
//! };
//!
//! let _ = link.reset(&mut delay);
//! let _ = link.present(&[0u8; 768]);
//! ```

use core::fmt::Debug;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use log::{debug, trace};

use crate::config::Config;
use crate::error::ErrorKind;

type LinkResult<T, E> = core::result::Result<T, E>;

/// Trait for the byte channel and control line to the bridge
///
/// This trait abstracts over different hardware implementations,
/// allowing the [`DisplayDriver`](crate::driver::DisplayDriver) to work with any
/// transport, and tests to record traffic.
pub trait DeviceLink {
    /// Error type for link operations
    type Error: Debug;

    /// Pulse the reset line
    ///
    /// The implementation must:
    /// 1. Drive the control line high
    /// 2. Wait at least 1ms
    /// 3. Drive the control line low
    /// 4. Wait at least 20ms
    ///
    /// # Errors
    ///
    /// Returns an error if the control line can't be driven.
    fn reset<D: DelayNs>(&mut self, delay: &mut D) -> LinkResult<(), Self::Error>;

    /// Write one flattened frame (row-major, 3 bytes per pixel)
    ///
    /// # Errors
    ///
    /// Returns an error on a partial or failed write. Implementations must not
    /// retry.
    fn present(&mut self, frame: &[u8]) -> LinkResult<(), Self::Error>;

    /// Park the control line in its idle state
    ///
    /// # Errors
    ///
    /// Returns an error if the control line can't be driven.
    fn release(&mut self) -> LinkResult<(), Self::Error>;

    /// Classify an error of this link
    fn error_kind(_error: &Self::Error) -> ErrorKind {
        ErrorKind::Transport
    }
}

/// Errors that can occur at the link level
///
/// Generic over SPI and GPIO error types.
#[derive(Debug, PartialEq)]
pub enum LinkError<SpiErr, PinErr> {
    /// Control line could not be acquired when opening the link
    Unavailable(PinErr),
    /// SPI communication error
    Spi(SpiErr),
    /// GPIO pin error
    Pin(PinErr),
    /// Frame does not match the configured dimensions
    FrameLength {
        /// Bytes per frame for the configured matrix
        expected: usize,
        /// Bytes handed to `present`
        provided: usize,
    },
}

impl<SpiErr: Debug, PinErr: Debug> core::fmt::Display for LinkError<SpiErr, PinErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unavailable(e) => write!(f, "Device unavailable: {e:?}"),
            Self::Spi(e) => write!(f, "SPI error: {e:?}"),
            Self::Pin(e) => write!(f, "Pin error: {e:?}"),
            Self::FrameLength { expected, provided } => write!(
                f,
                "Frame length mismatch: expected {expected} bytes, provided {provided}"
            ),
        }
    }
}

impl<SpiErr: Debug, PinErr: Debug> core::error::Error for LinkError<SpiErr, PinErr> {}

/// Link implementation over embedded-hal SPI and GPIO
///
/// ## Type Parameters
///
/// * `SPI` - SPI device implementing [`SpiDevice`]
/// * `RST` - Reset pin implementing [`OutputPin`]
pub struct Link<SPI, RST> {
    /// SPI device for frame data
    spi: SPI,
    /// Reset line (active high)
    rst: RST,
    /// Bytes per frame
    frame_len: usize,
    /// Reset pulse width
    pulse_ms: u32,
    /// Wait after the reset line falls
    settle_ms: u32,
}

impl<SPI, RST> Link<SPI, RST>
where
    SPI: SpiDevice,
    RST: OutputPin,
{
    /// Acquire the bus and reset line
    ///
    /// Drives the reset line low so the bridge starts from a known level.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Unavailable`] if the reset line can't be driven.
    pub fn open(
        spi: SPI,
        mut rst: RST,
        config: &Config,
    ) -> LinkResult<Self, LinkError<SPI::Error, RST::Error>> {
        rst.set_low().map_err(LinkError::Unavailable)?;
        debug!(
            "link opened: {}x{}, {} Hz",
            config.dimensions.width, config.dimensions.height, config.spi.frequency_hz
        );
        Ok(Self {
            spi,
            rst,
            frame_len: config.dimensions.frame_len(),
            pulse_ms: config.reset_pulse_ms,
            settle_ms: config.reset_settle_ms,
        })
    }

    /// Bytes expected per frame
    pub fn frame_len(&self) -> usize {
        self.frame_len
    }

    /// Give back the SPI device and reset pin
    pub fn free(self) -> (SPI, RST) {
        (self.spi, self.rst)
    }
}

impl<SPI, RST> DeviceLink for Link<SPI, RST>
where
    SPI: SpiDevice,
    SPI::Error: Debug,
    RST: OutputPin,
    RST::Error: Debug,
{
    type Error = LinkError<SPI::Error, RST::Error>;

    fn reset<D: DelayNs>(&mut self, delay: &mut D) -> LinkResult<(), Self::Error> {
        debug!("link reset");
        self.rst.set_high().map_err(LinkError::Pin)?;
        delay.delay_ms(self.pulse_ms);
        self.rst.set_low().map_err(LinkError::Pin)?;
        delay.delay_ms(self.settle_ms);
        Ok(())
    }

    fn present(&mut self, frame: &[u8]) -> LinkResult<(), Self::Error> {
        if frame.len() != self.frame_len {
            return Err(LinkError::FrameLength {
                expected: self.frame_len,
                provided: frame.len(),
            });
        }
        trace!("link present: {} bytes", frame.len());
        self.spi.write(frame).map_err(LinkError::Spi)
    }

    fn release(&mut self) -> LinkResult<(), Self::Error> {
        self.rst.set_low().map_err(LinkError::Pin)
    }

    fn error_kind(error: &Self::Error) -> ErrorKind {
        match error {
            LinkError::Unavailable(_) => ErrorKind::DeviceUnavailable,
            LinkError::FrameLength { .. } => ErrorKind::Buffer,
            LinkError::Spi(_) | LinkError::Pin(_) => ErrorKind::Transport,
        }
    }
}
