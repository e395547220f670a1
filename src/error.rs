//! Error types for the driver
//!
//! This module defines error types for configuration building ([`BuilderError`]),
//! framebuffer access ([`FrameError`]) and driver operations ([`Error`]).
//!
//! ## Error Types
//!
//! - [`BuilderError`] - Errors during configuration construction
//! - [`FrameError`] - Bad coordinates, undersized storage, bad fade speed
//! - [`Error`] - Runtime errors of a [`DisplayDriver`](crate::DisplayDriver)
//! - [`LinkError`](crate::link::LinkError) - Low-level bus and pin errors
//!
//! ## Example
//!
//! ```
//! use spi_led_matrix::{BuilderError, Dimensions};
//!
//! let result = Dimensions::new(0, 16);
//! assert!(matches!(result, Err(BuilderError::InvalidDimensions { .. })));
//! ```

use crate::config::{MAX_PIXELS, MAX_SPI_FREQUENCY_HZ, MIN_SPI_FREQUENCY_HZ};
use crate::link::DeviceLink;

/// Broad category of a failure
///
/// Lets callers decide how to react without matching on the link's error type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Pixel coordinate outside the grid
    OutOfRange,
    /// Bus or control line could not be acquired
    DeviceUnavailable,
    /// Write failure during present or reset
    Transport,
    /// Numeric argument outside its domain
    Domain,
    /// Caller-supplied storage too small
    Buffer,
}

/// Errors from framebuffer access
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameError {
    /// Coordinate outside `0..width` / `0..height`
    OutOfRange {
        /// Requested column
        x: i32,
        /// Requested row
        y: i32,
    },
    /// Storage is smaller than one frame
    BufferTooSmall {
        /// Required buffer size in bytes
        required: usize,
        /// Provided buffer size in bytes
        provided: usize,
    },
    /// Fade speed must be finite and greater than zero
    InvalidSpeed {
        /// Rejected speed
        speed: f64,
    },
    /// Quarter-turn rotation on a rectangular grid
    RotationNeedsSquare {
        /// Grid width
        width: u16,
        /// Grid height
        height: u16,
    },
}

impl FrameError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OutOfRange { .. } => ErrorKind::OutOfRange,
            Self::BufferTooSmall { .. } => ErrorKind::Buffer,
            Self::InvalidSpeed { .. } | Self::RotationNeedsSquare { .. } => ErrorKind::Domain,
        }
    }
}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OutOfRange { x, y } => write!(f, "Pixel ({x}, {y}) is out of range"),
            Self::BufferTooSmall { required, provided } => {
                write!(
                    f,
                    "Buffer too small: required {required} bytes, provided {provided}"
                )
            }
            Self::InvalidSpeed { speed } => write!(f, "Invalid fade speed: {speed}"),
            Self::RotationNeedsSquare { width, height } => write!(
                f,
                "Rotation by 90 or 270 degrees needs a square grid, got {width}x{height}"
            ),
        }
    }
}

impl core::error::Error for FrameError {}

/// Errors that can occur when driving the matrix
///
/// Generic over the link type to preserve the specific bus error.
pub enum Error<L: DeviceLink> {
    /// Framebuffer access failed
    Frame(FrameError),
    /// Link error (SPI/GPIO)
    ///
    /// Wraps the underlying error from the [`DeviceLink`] implementation.
    Link(L::Error),
}

impl<L: DeviceLink> Error<L> {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Frame(e) => e.kind(),
            Self::Link(e) => L::error_kind(e),
        }
    }
}

impl<L: DeviceLink> core::fmt::Debug for Error<L> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Frame(e) => f.debug_tuple("Frame").field(e).finish(),
            Self::Link(e) => f.debug_tuple("Link").field(e).finish(),
        }
    }
}

impl<L: DeviceLink> From<FrameError> for Error<L> {
    fn from(e: FrameError) -> Self {
        Self::Frame(e)
    }
}

impl<L: DeviceLink> core::fmt::Display for Error<L> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Frame(e) => write!(f, "{e}"),
            Self::Link(e) => write!(f, "Link error: {e:?}"),
        }
    }
}

impl<L: DeviceLink> core::error::Error for Error<L> {}

/// Errors that can occur when building configuration
#[derive(Debug, PartialEq, Eq)]
pub enum BuilderError {
    /// Invalid dimensions provided
    ///
    /// See [`Dimensions::new()`](crate::config::Dimensions::new) for constraints.
    InvalidDimensions {
        /// Requested width
        width: u16,
        /// Requested height
        height: u16,
    },
    /// Quarter-turn rotation on a rectangular matrix
    RotationNeedsSquare {
        /// Matrix width
        width: u16,
        /// Matrix height
        height: u16,
    },
    /// Bus parameters the bridge can't sample
    InvalidSpiConfig {
        /// Requested word size
        bits_per_word: u8,
        /// Requested clock
        frequency_hz: u32,
    },
    /// Reset timing below the hardware minimum, or a non-positive fade speed
    InvalidTiming,
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidDimensions { width, height } => write!(
                f,
                "Invalid dimensions {width}x{height} (both non-zero, at most {MAX_PIXELS} pixels)"
            ),
            Self::RotationNeedsSquare { width, height } => write!(
                f,
                "Rotation by 90 or 270 degrees needs a square matrix, got {width}x{height}"
            ),
            Self::InvalidSpiConfig {
                bits_per_word,
                frequency_hz,
            } => write!(
                f,
                "Invalid SPI config: {bits_per_word} bits at {frequency_hz} Hz (need 8 bits at {MIN_SPI_FREQUENCY_HZ}-{MAX_SPI_FREQUENCY_HZ} Hz)"
            ),
            Self::InvalidTiming => write!(f, "Invalid reset or fade-out timing"),
        }
    }
}

impl core::error::Error for BuilderError {}
