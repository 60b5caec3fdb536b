//! Drawing surface abstraction shared by every animation layer.
//!
//! Effects draw in *surface units*. A terminal cell spans [`CELL_PX_W`] by
//! [`CELL_PX_H`] units, so distances keep their meaning no matter how the
//! surface is eventually rasterized.

/// Width of one terminal cell in surface units.
pub const CELL_PX_W: f32 = 8.0;
/// Height of one terminal cell in surface units.
pub const CELL_PX_H: f32 = 16.0;

/// A point or displacement in surface units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Vec2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Size of a surface in surface units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Extent {
    pub width: f32,
    pub height: f32,
}

impl Extent {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero (or negative).
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Size of the terminal viewport in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
}

impl Viewport {
    pub const fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }

    /// The viewport measured in surface units.
    pub fn extent(&self) -> Extent {
        Extent::new(self.cols as f32 * CELL_PX_W, self.rows as f32 * CELL_PX_H)
    }

    pub fn is_empty(&self) -> bool {
        self.cols == 0 || self.rows == 0
    }
}

/// Drop shadow drawn around filled shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub color: crate::Rgb,
    /// Blur radius in surface units.
    pub blur: f32,
}

/// Immediate-mode 2-D drawing target with alpha blending.
///
/// Alpha arguments are clamped to `[0, 1]` by implementations.
pub trait Surface {
    /// Current size in surface units.
    fn extent(&self) -> Extent;

    /// Resize to a new viewport, discarding the current contents.
    fn resize(&mut self, viewport: Viewport);

    /// Clear the whole surface to transparent.
    fn clear(&mut self);

    /// Blend a rectangle of `color` over the surface.
    fn fill_rect(&mut self, origin: Vec2, size: Extent, color: crate::Rgb, alpha: f32);

    /// Blend a filled disc, surrounded by the current glow if one is set.
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: crate::Rgb, alpha: f32);

    /// Blend a one unit wide line segment.
    fn draw_line(&mut self, from: Vec2, to: Vec2, color: crate::Rgb, alpha: f32);

    /// Draw an opaque glyph with its baseline cell at `at`.
    fn draw_glyph(&mut self, at: Vec2, glyph: char, color: crate::Rgb);

    /// Set or clear the glow applied to subsequent `fill_circle` calls.
    fn set_glow(&mut self, glow: Option<Glow>);
}
