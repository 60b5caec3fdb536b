//! Procedural digital rain (stateful).

use backdrop_core::{
    Extent, Surface, Vec2,
    color::{BLACK, TEAL},
};
use rand::{Rng, rngs::StdRng};

use crate::chars::RAIN_CHARS;
use crate::host::Effect;

/// Side of the square glyph cell, in surface units.
pub const GLYPH_CELL: f32 = 14.0;
/// Per-frame chance that a column whose head is past the bottom restarts.
pub const RESET_CHANCE: f64 = 0.025;
/// Alpha of the black wash painted every frame to fade the trails.
pub const TRAIL_FADE: f32 = 0.05;

/// State for a single rain column.
#[derive(Debug, Clone, PartialEq)]
pub struct RainColumn {
    /// Vertical offset of the drop head, in glyph cells.
    pub head: f32,
    /// Glyph drawn at the head on the next frame.
    pub glyph: char,
}

/// Number of columns that fit across `width` surface units.
pub fn column_count(width: f32) -> usize {
    (width.max(0.0) / GLYPH_CELL).floor() as usize
}

fn random_glyph(rng: &mut impl Rng) -> char {
    RAIN_CHARS[rng.random_range(0..RAIN_CHARS.len())]
}

/// The rain layer. Always mounts; it ignores device capability.
#[derive(Debug)]
pub struct ProceduralRain {
    extent: Extent,
    columns: Vec<RainColumn>,
    rng: StdRng,
}

impl ProceduralRain {
    pub fn new(rng: StdRng) -> Self {
        Self {
            extent: Extent::default(),
            columns: Vec::new(),
            rng,
        }
    }

    pub fn columns(&self) -> &[RainColumn] {
        &self.columns
    }

    /// Discard every column and lay out new ones for `extent`, with heads
    /// scattered over the visible rows.
    pub fn populate(&mut self, extent: Extent) {
        self.extent = extent;
        let rows = extent.height.max(0.0) / GLYPH_CELL;
        let rng = &mut self.rng;
        self.columns = (0..column_count(extent.width))
            .map(|_| RainColumn {
                head: rng.random::<f32>() * rows,
                glyph: random_glyph(rng),
            })
            .collect();
    }

    /// Draw the fade wash and one glyph per column head.
    pub fn render(&self, surface: &mut dyn Surface) {
        surface.fill_rect(Vec2::default(), self.extent, BLACK, TRAIL_FADE);
        for (i, col) in self.columns.iter().enumerate() {
            let at = Vec2::new(i as f32 * GLYPH_CELL, col.head * GLYPH_CELL);
            surface.draw_glyph(at, col.glyph, TEAL);
        }
    }

    /// Move every head down one cell. Heads below the bottom edge restart
    /// independently, so columns drift out of step with each other.
    pub fn advance(&mut self) {
        let height = self.extent.height;
        for col in &mut self.columns {
            if col.head * GLYPH_CELL > height && self.rng.random_bool(RESET_CHANCE) {
                col.head = 0.0;
            }
            col.head += 1.0;
            col.glyph = random_glyph(&mut self.rng);
        }
    }
}

impl Effect for ProceduralRain {
    fn name(&self) -> &'static str {
        "rain"
    }

    fn mount(&mut self, extent: Extent) {
        self.populate(extent);
    }

    fn frame(&mut self, _elapsed_ms: u64, surface: &mut dyn Surface) {
        self.render(surface);
        self.advance();
    }
}
