//! Coordinate rotation utilities
//!
//! This module maps logical pixel coordinates onto the physical grid the
//! bridge expects. The bridge always receives row-major frames; rotating is
//! done on the host by choosing where each logical pixel lands.
//!
//! ## Rotation Modes
//!
//! - **Rotate0**: Native orientation
//! - **Rotate90**: 90° clockwise, logical column 0 is the rightmost physical column
//! - **Rotate180**: 180° rotation, origin at bottom-right
//! - **Rotate270**: 270° clockwise, handy for panels mounted with the data
//!   input on the left
//!
//! Quarter turns are only valid on square matrices; the builder enforces this.
//!
//! ## Example
//!
//! ```
//! use spi_led_matrix::{rotation::apply_rotation, Rotation};
//!
//! assert_eq!(apply_rotation(0, 0, 16, 16, Rotation::Rotate0), (0, 0));
//! assert_eq!(apply_rotation(0, 0, 16, 16, Rotation::Rotate90), (15, 0));
//! assert_eq!(apply_rotation(3, 0, 16, 16, Rotation::Rotate270), (0, 12));
//! ```

use crate::config::Rotation;

/// Apply rotation to get the physical (column, row) of a logical pixel
///
/// # Arguments
///
/// * `x` - Logical column, 0 to width-1
/// * `y` - Logical row, 0 to height-1
/// * `width` - Physical width in pixels
/// * `height` - Physical height in pixels
/// * `rotation` - Rotation mode
pub fn apply_rotation(x: u32, y: u32, width: u32, height: u32, rotation: Rotation) -> (u32, u32) {
    match rotation {
        Rotation::Rotate0 => (x, y),
        Rotation::Rotate90 => (width - 1 - y, x),
        Rotation::Rotate180 => (width - 1 - x, height - 1 - y),
        Rotation::Rotate270 => (y, height - 1 - x),
    }
}

/// Byte offset of a physical pixel in a row-major RGB frame
pub fn frame_offset(px: u32, py: u32, width: u32) -> usize {
    (py as usize * width as usize + px as usize) * 3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate0() {
        assert_eq!(apply_rotation(0, 0, 16, 16, Rotation::Rotate0), (0, 0));
        assert_eq!(apply_rotation(5, 9, 16, 16, Rotation::Rotate0), (5, 9));
    }

    #[test]
    fn test_rotate180() {
        assert_eq!(apply_rotation(0, 0, 8, 4, Rotation::Rotate180), (7, 3));
        assert_eq!(apply_rotation(7, 3, 8, 4, Rotation::Rotate180), (0, 0));
    }

    #[test]
    fn test_rotate90() {
        // origin goes to the top-right corner
        assert_eq!(apply_rotation(0, 0, 16, 16, Rotation::Rotate90), (15, 0));
        assert_eq!(apply_rotation(15, 15, 16, 16, Rotation::Rotate90), (0, 15));
    }

    #[test]
    fn test_rotate270() {
        // an image pixel (x, y) ends up at (y, 15 - x)
        assert_eq!(apply_rotation(0, 0, 16, 16, Rotation::Rotate270), (0, 15));
        assert_eq!(apply_rotation(4, 2, 16, 16, Rotation::Rotate270), (2, 11));
    }

    #[test]
    fn test_quarter_turns_compose() {
        let (x1, y1) = apply_rotation(3, 7, 16, 16, Rotation::Rotate90);
        let (x2, y2) = apply_rotation(x1, y1, 16, 16, Rotation::Rotate90);
        assert_eq!((x2, y2), apply_rotation(3, 7, 16, 16, Rotation::Rotate180));
    }

    #[test]
    fn test_frame_offset_is_row_major() {
        assert_eq!(frame_offset(0, 0, 16), 0);
        assert_eq!(frame_offset(1, 0, 16), 3);
        assert_eq!(frame_offset(0, 1, 16), 48);
        assert_eq!(frame_offset(15, 15, 16), 765);
    }
}
