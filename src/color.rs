//! RGB/HSV color values
//!
//! This module defines the [`Color`] type handed to the driver's pixel setters.
//! A color is built from either RGB or HSV; that side stays authoritative and
//! the other is computed on first access and memoized.
//!
//! ## Conversions
//!
//! | From | To  | Rule |
//! |------|-----|------|
//! | HSV  | RGB | six 60° hue sectors, channels truncated to 0-255 |
//! | RGB  | HSV | max/min channel, hue offset 0/120/240° by dominant channel |
//!
//! ## Example
//!
//! ```
//! use spi_led_matrix::Color;
//!
//! let red = Color::from_hsv(0.0, 1.0, 1.0);
//! assert_eq!(red.rgb(), Color::from_rgb(255, 0, 0).rgb());
//!
//! let mut dim = Color::from_rgb(200, 100, 50);
//! dim.multiply(0.5);
//! assert_eq!((dim.rgb().r, dim.rgb().g, dim.rgb().b), (100, 50, 25));
//! ```

use core::cell::Cell;

use libm::{floorf, fmodf};

/// 8-bit RGB triple
pub type Rgb = smart_leds::RGB8;

/// Hue, saturation and value
///
/// `hue` is in degrees, `saturation` and `value` are fractions in 0-1.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Hsv {
    /// Hue in degrees, 0-360
    pub hue: f32,
    /// Saturation, 0-1
    pub saturation: f32,
    /// Value (brightness), 0-1
    pub value: f32,
}

impl Hsv {
    /// Create an HSV triple
    pub const fn new(hue: f32, saturation: f32, value: f32) -> Self {
        Self {
            hue,
            saturation,
            value,
        }
    }
}

#[derive(Clone, Debug)]
enum Repr {
    Rgb { rgb: Rgb, hsv: Cell<Option<Hsv>> },
    Hsv { hsv: Hsv, rgb: Cell<Option<Rgb>> },
}

/// A color in RGB or HSV form
///
/// Colors are values: the driver copies the RGB channels out and never keeps
/// a reference.
#[derive(Clone, Debug)]
pub struct Color {
    repr: Repr,
}

impl Color {
    /// Create a color with RGB authoritative
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            repr: Repr::Rgb {
                rgb: Rgb { r, g, b },
                hsv: Cell::new(None),
            },
        }
    }

    /// Create a color with HSV authoritative
    ///
    /// The hue is wrapped into 0-360, so `from_hsv(400.0, ..)` equals
    /// `from_hsv(40.0, ..)`.
    pub fn from_hsv(h: f32, s: f32, v: f32) -> Self {
        Self {
            repr: Repr::Hsv {
                hsv: Hsv::new(wrap_hue(h), s, v),
                rgb: Cell::new(None),
            },
        }
    }

    /// Create a color from RGB scaled by an alpha channel
    ///
    /// Fully transparent pixels become black, opaque ones keep their channels.
    pub fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        let mut color = Self::from_rgb(r, g, b);
        if a != u8::MAX {
            color.multiply(f32::from(a) / 255.0);
        }
        color
    }

    /// RGB form of the color
    pub fn rgb(&self) -> Rgb {
        match &self.repr {
            Repr::Rgb { rgb, .. } => *rgb,
            Repr::Hsv { hsv, rgb } => {
                if let Some(cached) = rgb.get() {
                    return cached;
                }
                let computed = hsv_to_rgb(*hsv);
                rgb.set(Some(computed));
                computed
            }
        }
    }

    /// HSV form of the color
    pub fn hsv(&self) -> Hsv {
        match &self.repr {
            Repr::Hsv { hsv, .. } => *hsv,
            Repr::Rgb { rgb, hsv } => {
                if let Some(cached) = hsv.get() {
                    return cached;
                }
                let computed = rgb_to_hsv(*rgb);
                hsv.set(Some(computed));
                computed
            }
        }
    }

    /// Whether RGB is the authoritative representation
    pub fn is_rgb(&self) -> bool {
        matches!(self.repr, Repr::Rgb { .. })
    }

    /// Scale each RGB channel by `factor`
    ///
    /// Products are truncated and saturate at 0 and 255, so negative factors
    /// give black. RGB becomes authoritative.
    pub fn multiply(&mut self, factor: f32) {
        let rgb = self.rgb();
        let scale = |c: u8| (f32::from(c) * factor) as u8;
        self.repr = Repr::Rgb {
            rgb: Rgb {
                r: scale(rgb.r),
                g: scale(rgb.g),
                b: scale(rgb.b),
            },
            hsv: Cell::new(None),
        };
    }

    /// Rotate the hue by `distance` degrees
    ///
    /// HSV becomes authoritative.
    pub fn hue_shift(&mut self, distance: f32) {
        let hsv = self.hsv();
        self.repr = Repr::Hsv {
            hsv: Hsv::new(wrap_hue(hsv.hue + distance), hsv.saturation, hsv.value),
            rgb: Cell::new(None),
        };
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::from_rgb(0, 0, 0)
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.rgb() == other.rgb()
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Self::from_rgb(rgb.r, rgb.g, rgb.b)
    }
}

impl From<Color> for Rgb {
    fn from(color: Color) -> Self {
        color.rgb()
    }
}

impl From<Hsv> for Color {
    fn from(hsv: Hsv) -> Self {
        Self::from_hsv(hsv.hue, hsv.saturation, hsv.value)
    }
}

/// Wrap degrees into `[0, 360)`
pub(crate) fn wrap_hue(h: f32) -> f32 {
    let wrapped = fmodf(h, 360.0);
    let wrapped = if wrapped < 0.0 { wrapped + 360.0 } else { wrapped };
    // -1e-6 + 360.0 rounds to 360.0
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

pub(crate) fn hsv_to_rgb(hsv: Hsv) -> Rgb {
    let Hsv {
        hue: h,
        saturation: s,
        value: v,
    } = hsv;
    let h60 = h / 60.0;
    let h60f = floorf(h60);
    let sector = (h60f as i32).rem_euclid(6);
    let f = h60 - h60f;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);

    let (r, g, b) = match sector {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    Rgb {
        r: (r * 255.0) as u8,
        g: (g * 255.0) as u8,
        b: (b * 255.0) as u8,
    }
}

pub(crate) fn rgb_to_hsv(rgb: Rgb) -> Hsv {
    let r = f32::from(rgb.r) / 255.0;
    let g = f32::from(rgb.g) / 255.0;
    let b = f32::from(rgb.b) / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let hue = if rgb.r == rgb.g && rgb.g == rgb.b {
        0.0
    } else if rgb.r >= rgb.g && rgb.r >= rgb.b {
        wrap_hue(60.0 * ((g - b) / delta) + 360.0)
    } else if rgb.g >= rgb.b {
        wrap_hue(60.0 * ((b - r) / delta) + 120.0)
    } else {
        wrap_hue(60.0 * ((r - g) / delta) + 240.0)
    };
    let saturation = if max == 0.0 { 0.0 } else { delta / max };

    Hsv::new(hue, saturation, max)
}
