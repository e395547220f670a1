//! In-memory pixel grid
//!
//! [`Framebuffer`] keeps one frame exactly as it goes over the wire:
//! row-major, three bytes (R, G, B) per pixel, `(y * width + x) * 3` for the
//! pixel at column `x`, row `y`. Storage is supplied by the caller so the
//! buffer can live in a static, on the stack, or (with the `alloc` feature)
//! on the heap.
//!
//! ## Example
//!
//! ```
//! use spi_led_matrix::{Color, Dimensions, Framebuffer};
//!
//! let dims = match Dimensions::new(16, 16) {
//!     Ok(dims) => dims,
//!     Err(_) => return,
//! };
//! let mut fb = match Framebuffer::new(dims, [0u8; 768]) {
//!     Ok(fb) => fb,
//!     Err(_) => return,
//! };
//!
//! let _ = fb.set_pixel_rgb(0, 0, 255, 0, 0);
//! assert_eq!(&fb.as_bytes()[..3], &[255, 0, 0]);
//!
//! // one past the edge is rejected
//! assert!(fb.set_pixel_rgb(16, 0, 255, 0, 0).is_err());
//! ```

use crate::color::{Color, Hsv, Rgb, hsv_to_rgb, wrap_hue};
use crate::config::{Dimensions, Rotation};
use crate::error::FrameError;
use crate::rotation::{apply_rotation, frame_offset};

type FrameResult<T> = core::result::Result<T, FrameError>;

/// Fixed-size RGB pixel grid
///
/// ## Type Parameters
///
/// * `B` - Storage implementing `AsRef<[u8]> + AsMut<[u8]>`, at least
///   `dimensions.frame_len()` bytes
pub struct Framebuffer<B> {
    buffer: B,
    dimensions: Dimensions,
    rotation: Rotation,
}

impl<B> Framebuffer<B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Wrap caller storage and clear it to black
    ///
    /// # Errors
    ///
    /// Returns `FrameError::BufferTooSmall` if the storage holds less than one
    /// frame.
    pub fn new(dimensions: Dimensions, buffer: B) -> FrameResult<Self> {
        let required = dimensions.frame_len();
        let provided = buffer.as_ref().len();
        if provided < required {
            return Err(FrameError::BufferTooSmall { required, provided });
        }
        let mut fb = Self {
            buffer,
            dimensions,
            rotation: Rotation::Rotate0,
        };
        fb.clear();
        Ok(fb)
    }

    /// Set how logical coordinates map onto the physical grid
    ///
    /// # Errors
    ///
    /// Returns `FrameError::RotationNeedsSquare` for a quarter turn on a
    /// rectangular grid.
    pub fn with_rotation(mut self, rotation: Rotation) -> FrameResult<Self> {
        let quarter_turn = matches!(rotation, Rotation::Rotate90 | Rotation::Rotate270);
        if quarter_turn && !self.dimensions.is_square() {
            return Err(FrameError::RotationNeedsSquare {
                width: self.dimensions.width,
                height: self.dimensions.height,
            });
        }
        self.rotation = rotation;
        Ok(self)
    }

    /// Grid dimensions
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Coordinate rotation
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Set every channel to 0
    pub fn clear(&mut self) {
        self.frame_mut().fill(0);
    }

    /// Color of the pixel at (x, y)
    ///
    /// # Errors
    ///
    /// Returns `FrameError::OutOfRange` unless `0 <= x < width` and
    /// `0 <= y < height`.
    pub fn get_pixel(&self, x: i32, y: i32) -> FrameResult<Color> {
        self.get_rgb(x, y).map(Color::from)
    }

    /// Raw channels of the pixel at (x, y)
    pub fn get_rgb(&self, x: i32, y: i32) -> FrameResult<Rgb> {
        let i = self.offset(x, y)?;
        let px = &self.frame()[i..i + 3];
        Ok(Rgb {
            r: px[0],
            g: px[1],
            b: px[2],
        })
    }

    /// Set the pixel at (x, y)
    pub fn set_pixel(&mut self, x: i32, y: i32, color: &Color) -> FrameResult<()> {
        self.write_rgb(x, y, color.rgb())
    }

    /// Set the pixel at (x, y) from raw channels
    pub fn set_pixel_rgb(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8) -> FrameResult<()> {
        self.write_rgb(x, y, Rgb { r, g, b })
    }

    /// Set the pixel at (x, y) from hue (degrees), saturation and value
    pub fn set_pixel_hsv(&mut self, x: i32, y: i32, h: f32, s: f32, v: f32) -> FrameResult<()> {
        self.write_rgb(x, y, hsv_to_rgb(Hsv::new(wrap_hue(h), s, v)))
    }

    /// Set every pixel to one color
    pub fn fill(&mut self, color: &Color) {
        self.fill_rgb(color.rgb());
    }

    /// Set every pixel to raw channels
    pub fn fill_rgb(&mut self, rgb: Rgb) {
        for px in self.frame_mut().chunks_exact_mut(3) {
            px.copy_from_slice(&[rgb.r, rgb.g, rgb.b]);
        }
    }

    /// Divide every channel by `speed`
    ///
    /// `speed > 1` fades toward black, `speed < 1` brightens (saturating at
    /// 255), `1.0` leaves the frame untouched.
    ///
    /// # Errors
    ///
    /// Returns `FrameError::InvalidSpeed` unless `speed` is finite and positive.
    pub fn fade(&mut self, speed: f64) -> FrameResult<()> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(FrameError::InvalidSpeed { speed });
        }
        if speed == 1.0 {
            return Ok(());
        }
        for c in self.frame_mut() {
            // truncation is floor here; the cast saturates at 255
            *c = (f64::from(*c) / speed) as u8;
        }
        Ok(())
    }

    /// The bytes of one frame, as sent to the bridge
    pub fn as_bytes(&self) -> &[u8] {
        self.frame()
    }

    /// Give back the storage
    pub fn release(self) -> B {
        self.buffer
    }

    fn write_rgb(&mut self, x: i32, y: i32, rgb: Rgb) -> FrameResult<()> {
        let i = self.offset(x, y)?;
        self.frame_mut()[i..i + 3].copy_from_slice(&[rgb.r, rgb.g, rgb.b]);
        Ok(())
    }

    fn offset(&self, x: i32, y: i32) -> FrameResult<usize> {
        let width = u32::from(self.dimensions.width);
        let height = u32::from(self.dimensions.height);
        let (Ok(ux), Ok(uy)) = (u32::try_from(x), u32::try_from(y)) else {
            return Err(FrameError::OutOfRange { x, y });
        };
        if ux >= width || uy >= height {
            return Err(FrameError::OutOfRange { x, y });
        }
        let (px, py) = apply_rotation(ux, uy, width, height, self.rotation);
        Ok(frame_offset(px, py, width))
    }

    fn frame(&self) -> &[u8] {
        &self.buffer.as_ref()[..self.dimensions.frame_len()]
    }

    fn frame_mut(&mut self) -> &mut [u8] {
        let len = self.dimensions.frame_len();
        &mut self.buffer.as_mut()[..len]
    }
}

#[cfg(feature = "alloc")]
impl Framebuffer<alloc::vec::Vec<u8>> {
    /// Allocate a zeroed framebuffer on the heap
    pub fn with_dimensions(dimensions: Dimensions) -> Self {
        Self {
            buffer: alloc::vec![0u8; dimensions.frame_len()],
            dimensions,
            rotation: Rotation::Rotate0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fb16() -> Framebuffer<[u8; 768]> {
        Framebuffer::new(Dimensions::new(16, 16).unwrap(), [0xAA; 768]).unwrap()
    }

    #[test]
    fn test_new_clears_storage() {
        let fb = fb16();
        assert!(fb.as_bytes().iter().all(|&c| c == 0));
    }

    #[test]
    fn test_new_small_buffer_returns_error() {
        let dims = Dimensions::new(16, 16).unwrap();
        let result = Framebuffer::new(dims, [0u8; 767]);
        assert!(matches!(
            result,
            Err(FrameError::BufferTooSmall {
                required: 768,
                provided: 767
            })
        ));
    }

    #[test]
    fn test_oversized_buffer_only_uses_one_frame() {
        let dims = Dimensions::new(2, 2).unwrap();
        let mut fb = Framebuffer::new(dims, [7u8; 20]).unwrap();
        fb.fill_rgb(Rgb { r: 1, g: 2, b: 3 });
        assert_eq!(fb.as_bytes().len(), 12);
        let storage = fb.release();
        assert_eq!(&storage[12..], &[7u8; 8]);
    }

    #[test]
    fn test_bounds_are_exclusive() {
        let mut fb = fb16();
        for (x, y) in [(16, 0), (0, 16), (-1, 0), (0, -1), (16, 16)] {
            assert_eq!(
                fb.set_pixel(x, y, &Color::from_rgb(1, 1, 1)),
                Err(FrameError::OutOfRange { x, y })
            );
            assert!(fb.set_pixel_rgb(x, y, 1, 1, 1).is_err());
            assert!(fb.set_pixel_hsv(x, y, 0.0, 1.0, 1.0).is_err());
            assert!(fb.get_pixel(x, y).is_err());
        }
        assert!(fb.set_pixel_rgb(15, 15, 1, 1, 1).is_ok());
        assert!(fb.as_bytes()[..765].iter().all(|&c| c == 0));
    }

    #[test]
    fn test_set_pixel_layout() {
        let mut fb = fb16();
        fb.set_pixel_rgb(0, 0, 255, 0, 0).unwrap();
        fb.set_pixel_rgb(1, 2, 10, 20, 30).unwrap();

        let bytes = fb.as_bytes();
        assert_eq!(&bytes[..3], &[255, 0, 0]);
        let i = (2 * 16 + 1) * 3;
        assert_eq!(&bytes[i..i + 3], &[10, 20, 30]);
        assert_eq!(bytes.iter().filter(|&&c| c != 0).count(), 4);
    }

    #[test]
    fn test_set_pixel_hsv_matches_color() {
        let mut fb = fb16();
        fb.set_pixel_hsv(3, 3, 200.0, 0.5, 0.8).unwrap();
        assert_eq!(
            fb.get_pixel(3, 3).unwrap(),
            Color::from_hsv(200.0, 0.5, 0.8)
        );
    }

    #[test]
    fn test_fill_read_back() {
        let mut fb = fb16();
        fb.fill(&Color::from_rgb(10, 20, 30));
        for y in 0..16 {
            for x in 0..16 {
                assert_eq!(fb.get_rgb(x, y).unwrap(), Rgb { r: 10, g: 20, b: 30 });
            }
        }
    }

    #[test]
    fn test_fade_halves() {
        let mut fb = fb16();
        fb.fill_rgb(Rgb {
            r: 200,
            g: 200,
            b: 200,
        });
        fb.fade(2.0).unwrap();
        assert!(fb.as_bytes().iter().all(|&c| c == 100));
        fb.fade(2.0).unwrap();
        assert!(fb.as_bytes().iter().all(|&c| c == 50));
    }

    #[test]
    fn test_fade_one_is_identity() {
        let mut fb = fb16();
        for i in 0..16 {
            fb.set_pixel_rgb(i, i, i as u8 * 16, 255, 3).unwrap();
        }
        let mut before = [0u8; 768];
        before.copy_from_slice(fb.as_bytes());
        fb.fade(1.0).unwrap();
        assert_eq!(fb.as_bytes(), &before[..]);
    }

    #[test]
    fn test_fade_below_one_brightens_and_clamps() {
        let mut fb = fb16();
        fb.fill_rgb(Rgb { r: 255, g: 100, b: 0 });
        fb.fade(0.5).unwrap();
        assert_eq!(fb.get_rgb(0, 0).unwrap(), Rgb { r: 255, g: 200, b: 0 });
    }

    #[test]
    fn test_fade_rejects_bad_speed() {
        let mut fb = fb16();
        assert!(matches!(
            fb.fade(0.0),
            Err(FrameError::InvalidSpeed { .. })
        ));
        assert!(fb.fade(-2.0).is_err());
        assert!(fb.fade(f64::INFINITY).is_err());
        assert!(fb.fade(f64::NAN).is_err());
    }

    #[test]
    fn test_fade_truncates() {
        let mut fb = fb16();
        fb.fill_rgb(Rgb { r: 12, g: 1, b: 255 });
        fb.fade(1.25).unwrap();
        assert_eq!(fb.get_rgb(5, 5).unwrap(), Rgb { r: 9, g: 0, b: 204 });
    }

    #[test]
    fn test_rotation_moves_pixels() {
        let dims = Dimensions::new(16, 16).unwrap();
        let mut fb = Framebuffer::new(dims, [0u8; 768])
            .unwrap()
            .with_rotation(Rotation::Rotate270)
            .unwrap();
        fb.set_pixel_rgb(0, 0, 9, 9, 9).unwrap();

        // logical (0, 0) lands on physical (0, 15)
        let i = 15 * 16 * 3;
        assert_eq!(&fb.as_bytes()[i..i + 3], &[9, 9, 9]);
        assert_eq!(fb.get_rgb(0, 0).unwrap(), Rgb { r: 9, g: 9, b: 9 });
    }

    #[test]
    fn test_fade_matches_exact_division() {
        let mut fb = fb16();
        for (i, c) in [18u8, 120, 240, 252].into_iter().enumerate() {
            fb.set_pixel_rgb(i as i32, 0, c, c, c).unwrap();
        }
        fb.fade(1.2).unwrap();
        let faded: [u8; 4] = core::array::from_fn(|i| fb.get_rgb(i as i32, 0).unwrap().r);
        assert_eq!(faded, [15, 100, 200, 210]);
    }

    #[test]
    fn test_fade_every_level_by_default_speed() {
        let mut fb = fb16();
        for c in 0..=255u8 {
            let i = i32::from(c);
            fb.set_pixel_rgb(i % 16, i / 16, c, 0, 0).unwrap();
        }
        fb.fade(1.2).unwrap();
        for c in 0..=255u8 {
            let i = i32::from(c);
            let want = libm::floor(f64::from(c) / 1.2) as u8;
            assert_eq!(fb.get_rgb(i % 16, i / 16).unwrap().r, want, "level {c}");
        }
    }

    #[test]
    fn test_quarter_turn_needs_square_grid() {
        let dims = Dimensions::new(4, 2).unwrap();
        let result = Framebuffer::new(dims, [0u8; 24])
            .unwrap()
            .with_rotation(Rotation::Rotate90);
        assert!(matches!(
            result,
            Err(FrameError::RotationNeedsSquare {
                width: 4,
                height: 2
            })
        ));
        assert!(
            Framebuffer::new(dims, [0u8; 24])
                .unwrap()
                .with_rotation(Rotation::Rotate270)
                .is_err()
        );
    }

    #[test]
    fn test_half_turn_on_rectangular_grid() {
        let dims = Dimensions::new(4, 2).unwrap();
        let mut fb = Framebuffer::new(dims, [0u8; 24])
            .unwrap()
            .with_rotation(Rotation::Rotate180)
            .unwrap();
        fb.set_pixel_rgb(3, 0, 1, 1, 1).unwrap();

        // logical (3, 0) lands on physical (0, 1)
        assert_eq!(&fb.as_bytes()[12..15], &[1, 1, 1]);
        assert!(fb.set_pixel_rgb(4, 0, 1, 1, 1).is_err());
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn test_with_dimensions_allocates_one_black_frame() {
        let dims = Dimensions::new(8, 4).unwrap();
        let mut fb = Framebuffer::with_dimensions(dims);
        assert_eq!(fb.as_bytes().len(), dims.frame_len());
        assert!(fb.as_bytes().iter().all(|&c| c == 0));
        assert_eq!(fb.rotation(), Rotation::Rotate0);

        fb.set_pixel_rgb(7, 3, 4, 5, 6).unwrap();
        let storage = fb.release();
        assert_eq!(storage.len(), 96);
        assert_eq!(&storage[93..], &[4, 5, 6]);
    }

    #[test]
    fn test_clear() {
        let mut fb = fb16();
        fb.fill_rgb(Rgb { r: 1, g: 2, b: 3 });
        fb.clear();
        assert!(fb.as_bytes().iter().all(|&c| c == 0));
    }
}
