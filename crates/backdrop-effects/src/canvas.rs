//! Terminal cell raster implementing [`Surface`].
//!
//! Every cell keeps a glyph, an unpremultiplied color and a coverage alpha.
//! Drawing operations composite source-over into the cells they touch, and
//! [`CanvasLayer`] blends the result against the page background when the
//! canvas is put on screen.

use backdrop_core::{CELL_PX_H, CELL_PX_W, Extent, Glow, Rgb, Surface, Vec2, Viewport};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use crate::chars::{DISC_AREA, DISC_LARGE, DISC_MEDIUM, DISC_SMALL, STROKE};
use crate::color::{blend_over, peak};

/// Halo strength relative to the disc it surrounds.
const GLOW_STRENGTH: f32 = 0.35;
/// Cells fainter than this are not drawn.
const MIN_VISIBLE: f32 = 0.02;
/// Cells darker than this have faded into the trail background.
const FADE_FLOOR: f32 = 0.04;

/// One rasterized cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasCell {
    pub glyph: char,
    pub color: [f32; 3],
    pub alpha: f32,
}

impl CanvasCell {
    const EMPTY: CanvasCell = CanvasCell {
        glyph: ' ',
        color: [0.0; 3],
        alpha: 0.0,
    };

    pub fn is_blank(&self) -> bool {
        self.glyph == ' '
    }
}

fn cell_count(viewport: Viewport) -> usize {
    usize::from(viewport.cols) * usize::from(viewport.rows)
}

/// A drawing surface backed by a grid of terminal cells.
#[derive(Debug, Clone)]
pub struct CellCanvas {
    viewport: Viewport,
    cells: Vec<CanvasCell>,
    glow: Option<Glow>,
}

impl CellCanvas {
    /// Acquire a canvas covering `viewport`. Returns `None` for an empty
    /// viewport, in which case the caller should not mount anything.
    pub fn new(viewport: Viewport) -> Option<Self> {
        if viewport.is_empty() {
            return None;
        }
        Some(Self {
            viewport,
            cells: vec![CanvasCell::EMPTY; cell_count(viewport)],
            glow: None,
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn cell(&self, col: u16, row: u16) -> Option<&CanvasCell> {
        self.index(col, row).map(|i| &self.cells[i])
    }

    /// Number of cells currently showing a glyph.
    pub fn drawn_cells(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_blank()).count()
    }

    fn index(&self, col: u16, row: u16) -> Option<usize> {
        if col >= self.viewport.cols || row >= self.viewport.rows {
            return None;
        }
        Some(row as usize * self.viewport.cols as usize + col as usize)
    }

    /// Cell containing `point`, if it is on the canvas.
    fn cell_at(&self, point: Vec2) -> Option<(u16, u16)> {
        if !(point.x >= 0.0 && point.y >= 0.0) {
            return None;
        }
        let col = (point.x / CELL_PX_W).floor();
        let row = (point.y / CELL_PX_H).floor();
        if col >= self.viewport.cols as f32 || row >= self.viewport.rows as f32 {
            return None;
        }
        Some((col as u16, row as u16))
    }

    fn cell_center(col: u16, row: u16) -> Vec2 {
        Vec2::new(
            (col as f32 + 0.5) * CELL_PX_W,
            (row as f32 + 0.5) * CELL_PX_H,
        )
    }

    /// Inclusive cell range covering the box `[min, max]`, clipped to the canvas.
    fn cell_span(&self, min: Vec2, max: Vec2) -> Option<((u16, u16), (u16, u16))> {
        let last_col = self.viewport.cols as f32 - 1.0;
        let last_row = self.viewport.rows as f32 - 1.0;
        let c0 = (min.x / CELL_PX_W).floor().max(0.0);
        let r0 = (min.y / CELL_PX_H).floor().max(0.0);
        let c1 = (max.x / CELL_PX_W).floor().min(last_col);
        let r1 = (max.y / CELL_PX_H).floor().min(last_row);
        if c0 > c1 || r0 > r1 {
            return None;
        }
        Some(((c0 as u16, r0 as u16), (c1 as u16, r1 as u16)))
    }

    fn blend(&mut self, col: u16, row: u16, color: Rgb, alpha: f32, glyph: Option<char>) {
        let Some(i) = self.index(col, row) else {
            return;
        };
        let cell = &mut self.cells[i];
        let (mixed, out_alpha) = blend_over(color.to_unit(), alpha, cell.color, cell.alpha);
        cell.color = mixed;
        cell.alpha = out_alpha;
        if let Some(glyph) = glyph {
            cell.glyph = glyph;
        }
    }

    /// Blend a stroke or halo cell; only claims the glyph of blank cells.
    fn blend_stroke(&mut self, col: u16, row: u16, color: Rgb, alpha: f32) {
        let blank = self.cell(col, row).is_some_and(CanvasCell::is_blank);
        self.blend(col, row, color, alpha, blank.then_some(STROKE));
    }

    fn disc_glyph(radius: f32) -> char {
        if radius >= CELL_PX_W {
            DISC_AREA
        } else if radius >= 2.4 {
            DISC_LARGE
        } else if radius >= 1.7 {
            DISC_MEDIUM
        } else {
            DISC_SMALL
        }
    }
}

impl Surface for CellCanvas {
    fn extent(&self) -> Extent {
        self.viewport.extent()
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.cells = vec![CanvasCell::EMPTY; cell_count(viewport)];
    }

    fn clear(&mut self) {
        self.cells.fill(CanvasCell::EMPTY);
    }

    fn fill_rect(&mut self, origin: Vec2, size: Extent, color: Rgb, alpha: f32) {
        if size.is_empty() {
            return;
        }
        let max = Vec2::new(
            origin.x + size.width - 0.001,
            origin.y + size.height - 0.001,
        );
        let Some(((c0, r0), (c1, r1))) = self.cell_span(origin, max) else {
            return;
        };
        for row in r0..=r1 {
            for col in c0..=c1 {
                self.blend(col, row, color, alpha, None);
            }
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32) {
        let reach = radius + self.glow.map_or(0.0, |g| g.blur);
        let span = self.cell_span(
            Vec2::new(center.x - reach, center.y - reach),
            Vec2::new(center.x + reach, center.y + reach),
        );
        let home = self.cell_at(center);
        let glyph = Self::disc_glyph(radius);

        if let Some(((c0, r0), (c1, r1))) = span {
            for row in r0..=r1 {
                for col in c0..=c1 {
                    if Some((col, row)) == home {
                        continue;
                    }
                    let d = Self::cell_center(col, row).distance(center);
                    if d <= radius {
                        self.blend(col, row, color, alpha, Some(glyph));
                    } else if let Some(glow) = self.glow
                        && d <= radius + glow.blur
                    {
                        self.blend_stroke(col, row, glow.color, alpha * GLOW_STRENGTH);
                    }
                }
            }
        }

        // The cell holding the center always shows the disc, however small.
        if let Some((col, row)) = home {
            self.blend(col, row, color, alpha, Some(glyph));
        }
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2, color: Rgb, alpha: f32) {
        let steps = ((to.x - from.x).abs() / CELL_PX_W)
            .max((to.y - from.y).abs() / CELL_PX_H)
            .ceil()
            .max(1.0) as usize;
        let mut last = None;
        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            let point = Vec2::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t);
            let Some(cell) = self.cell_at(point) else {
                continue;
            };
            if last == Some(cell) {
                continue;
            }
            last = Some(cell);
            self.blend_stroke(cell.0, cell.1, color, alpha);
        }
    }

    fn draw_glyph(&mut self, at: Vec2, glyph: char, color: Rgb) {
        if let Some((col, row)) = self.cell_at(at)
            && let Some(i) = self.index(col, row)
        {
            self.cells[i] = CanvasCell {
                glyph,
                color: color.to_unit(),
                alpha: 1.0,
            };
        }
    }

    fn set_glow(&mut self, glow: Option<Glow>) {
        self.glow = glow;
    }
}

/// Widget that blends a [`CellCanvas`] over the page background.
#[derive(Debug, Clone, Copy)]
pub struct CanvasLayer<'a> {
    canvas: &'a CellCanvas,
    opacity: f32,
    background: Rgb,
}

impl<'a> CanvasLayer<'a> {
    pub fn new(canvas: &'a CellCanvas, opacity: f32, background: Rgb) -> Self {
        Self {
            canvas,
            opacity: opacity.clamp(0.0, 1.0),
            background,
        }
    }
}

impl Widget for CanvasLayer<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let viewport = self.canvas.viewport();
        for row in 0..area.height.min(viewport.rows) {
            for col in 0..area.width.min(viewport.cols) {
                let Some(cell) = self.canvas.cell(col, row) else {
                    continue;
                };
                if cell.is_blank() {
                    continue;
                }
                let strength = cell.alpha.clamp(0.0, 1.0) * self.opacity;
                if strength < MIN_VISIBLE || peak(cell.color) < FADE_FLOOR {
                    continue;
                }
                let fg = self.background.lerp(Rgb::from_unit(cell.color), strength);
                if let Some(target) = buf.cell_mut((area.x + col, area.y + row)) {
                    target.set_char(cell.glyph).set_fg(fg.into());
                }
            }
        }
    }
}
