//! Graphics support via embedded-graphics
//!
//! Implements [`DrawTarget`] with [`Rgb888`] pixels for both [`Framebuffer`]
//! and [`DisplayDriver`], so lines, shapes, text and images can be drawn
//! straight into the frame. Drawing only touches memory; call
//! [`DisplayDriver::present`] to light the LEDs.
//!
//! Pixels outside the matrix are skipped rather than reported, matching how
//! embedded-graphics clips.
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_graphics::{
//!     pixelcolor::Rgb888,
//!     prelude::*,
//!     primitives::{Circle, PrimitiveStyle},
//! };
//! use spi_led_matrix::{Dimensions, Framebuffer};
//!
//! let mut fb = match Framebuffer::new(Dimensions::default(), [0u8; 768]) {
//!     Ok(fb) => fb,
//!     Err(_) => return,
//! };
//!
//! let _ = Circle::new(Point::new(2, 2), 12)
//!     .into_styled(PrimitiveStyle::with_stroke(Rgb888::CYAN, 1))
//!     .draw(&mut fb);
//! ```

use core::convert::Infallible;
use embedded_graphics_core::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    pixelcolor::{Rgb888, RgbColor},
};
use embedded_hal::delay::DelayNs;

use crate::color::{Color, Rgb};
use crate::driver::DisplayDriver;
use crate::framebuffer::Framebuffer;
use crate::link::DeviceLink;

impl From<Rgb888> for Color {
    fn from(c: Rgb888) -> Self {
        Self::from_rgb(c.r(), c.g(), c.b())
    }
}

impl From<Color> for Rgb888 {
    fn from(c: Color) -> Self {
        let rgb = c.rgb();
        Self::new(rgb.r, rgb.g, rgb.b)
    }
}

impl<B> DrawTarget for Framebuffer<B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<Iter>(&mut self, pixels: Iter) -> Result<(), Self::Error>
    where
        Iter: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(Point { x, y }, color) in pixels {
            // off-matrix pixels are clipped
            let _ = self.set_pixel_rgb(x, y, color.r(), color.g(), color.b());
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_rgb(Rgb {
            r: color.r(),
            g: color.g(),
            b: color.b(),
        });
        Ok(())
    }
}

impl<B> OriginDimensions for Framebuffer<B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    fn size(&self) -> Size {
        let dims = self.dimensions();
        Size::new(u32::from(dims.width), u32::from(dims.height))
    }
}

impl<L, D, B> DrawTarget for DisplayDriver<L, D, B>
where
    L: DeviceLink,
    D: DelayNs,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<Iter>(&mut self, pixels: Iter) -> Result<(), Self::Error>
    where
        Iter: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.framebuffer_mut().draw_iter(pixels)
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        DrawTarget::clear(self.framebuffer_mut(), color)
    }
}

impl<L, D, B> OriginDimensions for DisplayDriver<L, D, B>
where
    L: DeviceLink,
    D: DelayNs,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    fn size(&self) -> Size {
        self.framebuffer().size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Builder, Dimensions, Rotation};
    use crate::link::Link;
    use crate::link::tests::{Log, MockDelay, MockPin, MockSpi};
    use core::cell::Cell;
    use embedded_graphics::{
        prelude::*,
        primitives::{Line, PrimitiveStyle, Rectangle},
    };

    fn framebuffer() -> Framebuffer<[u8; 768]> {
        Framebuffer::new(Dimensions::default(), [0u8; 768]).unwrap()
    }

    #[test]
    fn test_size_matches_matrix() {
        assert_eq!(framebuffer().size(), Size::new(16, 16));

        let dims = Dimensions::new(8, 4).unwrap();
        let fb = Framebuffer::new(dims, [0u8; 96]).unwrap();
        assert_eq!(fb.size(), Size::new(8, 4));
    }

    #[test]
    fn test_filled_rectangle() {
        let mut fb = framebuffer();
        Rectangle::new(Point::new(1, 1), Size::new(2, 3))
            .into_styled(PrimitiveStyle::with_fill(Rgb888::RED))
            .draw(&mut fb)
            .unwrap();

        let red = Color::from_rgb(255, 0, 0);
        for y in 1..4 {
            for x in 1..3 {
                assert_eq!(fb.get_pixel(x, y).unwrap(), red);
            }
        }
        assert_eq!(fb.get_pixel(0, 0).unwrap(), Color::default());
        assert_eq!(fb.get_pixel(3, 1).unwrap(), Color::default());
        assert_eq!(fb.get_pixel(1, 4).unwrap(), Color::default());
    }

    #[test]
    fn test_out_of_bounds_pixels_are_clipped() {
        let mut fb = framebuffer();
        Line::new(Point::new(-4, 0), Point::new(20, 0))
            .into_styled(PrimitiveStyle::with_stroke(Rgb888::GREEN, 1))
            .draw(&mut fb)
            .unwrap();

        for x in 0..16 {
            assert_eq!(fb.get_pixel(x, 0).unwrap(), Color::from_rgb(0, 255, 0));
        }
        assert!(fb.as_bytes()[48..].iter().all(|&c| c == 0));
    }

    #[test]
    fn test_clear_fills_every_pixel() {
        let mut fb = framebuffer();
        DrawTarget::clear(&mut fb, Rgb888::new(1, 2, 3)).unwrap();
        assert!(fb.as_bytes().chunks(3).all(|px| px == [1, 2, 3]));
    }

    #[test]
    fn test_rotation_applies_to_drawing() {
        let dims = Dimensions::default();
        let mut fb = Framebuffer::new(dims, [0u8; 768])
            .unwrap()
            .with_rotation(Rotation::Rotate270)
            .unwrap();
        Pixel(Point::new(0, 0), Rgb888::BLUE).draw(&mut fb).unwrap();

        // (0, 0) lands at physical (0, 15)
        let offset = 15 * 16 * 3;
        assert_eq!(&fb.as_bytes()[offset..offset + 3], &[0, 0, 255]);
    }

    #[test]
    fn test_color_conversions() {
        let c: Color = Rgb888::new(10, 20, 30).into();
        assert_eq!(c, Color::from_rgb(10, 20, 30));
        assert_eq!(Rgb888::from(Color::from_hsv(0.0, 1.0, 1.0)), Rgb888::RED);
    }

    #[test]
    fn test_draw_on_driver_then_present() {
        let log = Log::default();
        let fault = Cell::new(false);
        let config = Builder::new().build().unwrap();
        let link = Link::open(
            MockSpi {
                log: &log,
                fail: &fault,
            },
            MockPin {
                log: &log,
                fail: &fault,
            },
            &config,
        )
        .unwrap();
        let mut driver =
            DisplayDriver::new(link, MockDelay { log: &log }, [0u8; 768], config).unwrap();

        assert_eq!(driver.size(), Size::new(16, 16));
        Pixel(Point::new(1, 0), Rgb888::WHITE)
            .draw(&mut driver)
            .unwrap();
        assert_eq!(
            driver.get_pixel(1, 0).unwrap(),
            Color::from_rgb(255, 255, 255)
        );
        driver.present().unwrap();
        assert_eq!(driver.frames_presented(), 2);
    }
}
