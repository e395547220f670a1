//! SPI LED Matrix Driver
//!
//! A driver for small RGB LED matrices (16x16 by default) fed through a bridge
//! microcontroller. The host keeps a framebuffer of 8-bit RGB pixels and
//! streams it over SPI; the bridge turns the bytes into LED signalling. A
//! rising edge on a reset line makes the bridge start over at pixel 0.
//!
//! ## Features
//!
//! - `no_std` compatible
//! - `embedded-hal` v1.0 support
//! - `embedded-graphics` integration (with `graphics` feature)
//! - RGB and HSV colors with lazy conversion
//! - Rotation support
//! - Fade-out and line release on drop
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::OutputPin;
//! use embedded_hal::spi::{Operation, SpiDevice};
//! use spi_led_matrix::{Builder, Color, DisplayDriver, Link, Rotation};
//!
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
//! # let spi = MockSpi;
//! # let rst = MockPin;
//! # let delay = MockDelay;
//! let config = match Builder::new().rotation(Rotation::Rotate270).build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//! let link = match Link::open(spi, rst, &config) {
//!     Ok(link) => link,
//!     Err(_) => return,
//! };
//! let mut display = match DisplayDriver::new(link, delay, [0u8; 768], config) {
//!     Ok(display) => display,
//!     Err(_) => return,
//! };
//!
//! for x in 0..16 {
//!     let _ = display.set_pixel(x, x, &Color::from_hsv(x as f32 * 22.5, 1.0, 0.5));
//! }
//! let _ = display.present();
//! ```

#![no_std]

#[cfg(any(test, feature = "alloc"))]
extern crate alloc;

/// RGB and HSV colors
pub mod color;
/// Matrix configuration types and builder
pub mod config;
/// Driver lifecycle and frame output
pub mod driver;
/// Error types for the driver
pub mod error;
/// Pixel storage
pub mod framebuffer;
/// Hardware link abstraction
pub mod link;
/// Frame-rate pacing
pub mod pacing;
/// Coordinate rotation utilities
pub mod rotation;

/// Graphics support via embedded-graphics (requires `graphics` feature)
#[cfg(feature = "graphics")]
pub mod graphics;

pub use color::{Color, Hsv, Rgb};
pub use config::{
    Builder, Config, Dimensions, MAX_PIXELS, MAX_SPI_FREQUENCY_HZ, MIN_RESET_PULSE_MS,
    MIN_RESET_SETTLE_MS, MIN_SPI_FREQUENCY_HZ, Rotation, SpiConfig,
};
pub use driver::{DisplayDriver, DriverState};
pub use error::{BuilderError, Error, ErrorKind, FrameError};
pub use framebuffer::Framebuffer;
pub use link::{DeviceLink, Link, LinkError};
pub use pacing::FramePacer;
