//! Brand palette and a small RGB color type.

use ratatui::style::Color;

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Construct a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Construct a color from a `0xRRGGBB` literal.
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    /// Linear interpolation towards `other`; `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
        )
    }

    /// Channels as floats in `[0, 1]`.
    pub fn to_unit(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    /// Inverse of [`Rgb::to_unit`]; out of range channels are clamped.
    pub fn from_unit(c: [f32; 3]) -> Rgb {
        let ch = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Rgb::new(ch(c[0]), ch(c[1]), ch(c[2]))
    }
}

impl From<Rgb> for Color {
    fn from(c: Rgb) -> Self {
        Color::Rgb(c.r, c.g, c.b)
    }
}

/// Brand teal, used by the rain, proximity lines and half of the particles.
pub const TEAL: Rgb = Rgb::from_hex(0x00cc99);
/// Brand amber, the second particle color.
pub const AMBER: Rgb = Rgb::from_hex(0xff9900);
/// Olive accent used by the floating shapes.
pub const OLIVE: Rgb = Rgb::from_hex(0x597931);
/// Deep green accent used by the floating shapes.
pub const FOREST: Rgb = Rgb::from_hex(0x003300);
pub const BLACK: Rgb = Rgb::new(0, 0, 0);
pub const WHITE: Rgb = Rgb::new(255, 255, 255);
