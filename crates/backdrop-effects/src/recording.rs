//! Surface that records draw calls instead of rasterizing them.

use backdrop_core::{Extent, Glow, Rgb, Surface, Vec2, Viewport};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Clear,
    FillRect {
        alpha: f32,
    },
    FillCircle {
        center: Vec2,
        radius: f32,
        color: Rgb,
        alpha: f32,
        glow: bool,
    },
    Line {
        from: Vec2,
        to: Vec2,
        alpha: f32,
    },
    Glyph {
        at: Vec2,
        glyph: char,
    },
}

#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub extent: Extent,
    pub calls: Vec<DrawCall>,
    pub resizes: usize,
    glow: Option<Glow>,
}

impl RecordingSurface {
    pub fn new(extent: Extent) -> Self {
        Self {
            extent,
            ..Self::default()
        }
    }

    pub fn lines(&self) -> Vec<&DrawCall> {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Line { .. }))
            .collect()
    }

    pub fn circles(&self) -> Vec<&DrawCall> {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::FillCircle { .. }))
            .collect()
    }

    pub fn glyphs(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Glyph { .. }))
            .count()
    }
}

impl Surface for RecordingSurface {
    fn extent(&self) -> Extent {
        self.extent
    }

    fn resize(&mut self, viewport: Viewport) {
        self.extent = viewport.extent();
        self.resizes += 1;
    }

    fn clear(&mut self) {
        self.calls.push(DrawCall::Clear);
    }

    fn fill_rect(&mut self, _origin: Vec2, _size: Extent, _color: Rgb, alpha: f32) {
        self.calls.push(DrawCall::FillRect { alpha });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32) {
        self.calls.push(DrawCall::FillCircle {
            center,
            radius,
            color,
            alpha,
            glow: self.glow.is_some(),
        });
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2, _color: Rgb, alpha: f32) {
        self.calls.push(DrawCall::Line { from, to, alpha });
    }

    fn draw_glyph(&mut self, at: Vec2, glyph: char, _color: Rgb) {
        self.calls.push(DrawCall::Glyph { at, glyph });
    }

    fn set_glow(&mut self, glow: Option<Glow>) {
        self.glow = glow;
    }
}
