//! Floating shapes (stateless, computed from time only).
//!
//! Six soft discs bob around fixed anchors and two outline polygons spin
//! slowly. Nothing is simulated: every pose is a pure function of elapsed
//! time, so a reduced motion preference simply freezes the clock.

use std::f32::consts::TAU;

use backdrop_core::{
    CapabilityProbe, Extent, Rgb, Surface, Vec2,
    color::{AMBER, FOREST, OLIVE, TEAL},
};
use tracing::debug;

use crate::host::Effect;

/// Horizontal anchor of a shape, measured from one side of the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Side {
    Left(f32),
    Right(f32),
}

/// A gradient disc that bobs around its anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orb {
    pub side: Side,
    /// Top edge as a fraction of the surface height.
    pub top: f32,
    /// Diameter in surface units.
    pub size: f32,
    pub from: Rgb,
    pub to: Rgb,
    /// Seconds before the orb fades in.
    pub delay: f32,
}

pub const ORBS: [Orb; 6] = [
    Orb {
        side: Side::Left(0.05),
        top: 0.10,
        size: 64.0,
        from: AMBER,
        to: TEAL,
        delay: 0.0,
    },
    Orb {
        side: Side::Right(0.08),
        top: 0.20,
        size: 48.0,
        from: TEAL,
        to: OLIVE,
        delay: 1.0,
    },
    Orb {
        side: Side::Left(0.03),
        top: 0.60,
        size: 80.0,
        from: OLIVE,
        to: FOREST,
        delay: 2.0,
    },
    Orb {
        side: Side::Right(0.05),
        top: 0.70,
        size: 32.0,
        from: FOREST,
        to: AMBER,
        delay: 0.5,
    },
    Orb {
        side: Side::Left(0.90),
        top: 0.40,
        size: 56.0,
        from: AMBER,
        to: OLIVE,
        delay: 1.5,
    },
    Orb {
        side: Side::Left(0.85),
        top: 0.80,
        size: 40.0,
        from: TEAL,
        to: FOREST,
        delay: 2.5,
    },
];

/// Seconds for one full bob cycle.
const BOB_PERIOD: f32 = 8.0;
const BOB_X: f32 = 10.0;
const BOB_Y: f32 = 20.0;
const ORB_OPACITY: f32 = 0.3;
const FADE_IN: f32 = 1.0;

/// An outline polygon spinning around its center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outline {
    pub side: Side,
    pub top: f32,
    pub size: f32,
    /// Vertices as fractions of the bounding box.
    pub vertices: &'static [(f32, f32)],
    pub color: Rgb,
    pub opacity: f32,
    /// Seconds per revolution; negative spins counter-clockwise.
    pub period: f32,
    /// Peak scale reached mid-period.
    pub scale: f32,
    /// Peak drift reached mid-period.
    pub drift: Vec2,
}

const TRIANGLE: &[(f32, f32)] = &[(0.5, 0.0), (0.0, 1.0), (1.0, 1.0)];
const HEXAGON: &[(f32, f32)] = &[
    (0.25, 0.0),
    (0.75, 0.0),
    (1.0, 0.5),
    (0.75, 1.0),
    (0.25, 1.0),
    (0.0, 0.5),
];

pub const OUTLINES: [Outline; 2] = [
    Outline {
        side: Side::Left(0.5),
        top: 0.25,
        size: 96.0,
        vertices: TRIANGLE,
        color: TEAL,
        opacity: 0.2,
        period: 10.0,
        scale: 1.2,
        drift: Vec2::new(0.0, 0.0),
    },
    Outline {
        side: Side::Right(0.25),
        top: 0.75,
        size: 128.0,
        vertices: HEXAGON,
        color: AMBER,
        opacity: 0.15,
        period: -12.0,
        scale: 1.0,
        drift: Vec2::new(50.0, -30.0),
    },
];

/// Smooth 0 → 1 → 0 curve over one period.
fn swell(t: f32, period: f32) -> f32 {
    (1.0 - (t / period * TAU).cos()) / 2.0
}

fn anchor_x(side: Side, size: f32, extent: Extent) -> f32 {
    match side {
        Side::Left(f) => extent.width * f,
        Side::Right(f) => extent.width * (1.0 - f) - size,
    }
}

/// Where an orb sits at `t` seconds: center, radius and alpha.
pub fn orb_pose(orb: &Orb, t: f32, extent: Extent, animate: bool) -> (Vec2, f32, f32) {
    let left = anchor_x(orb.side, orb.size, extent);
    let top = extent.height * orb.top;
    let mut center = Vec2::new(left + orb.size / 2.0, top + orb.size / 2.0);
    if !animate {
        return (center, orb.size / 2.0, ORB_OPACITY);
    }

    let local = (t - orb.delay).max(0.0);
    let appear = (local / FADE_IN).min(1.0);
    let s = swell(t, BOB_PERIOD);
    center.x += -BOB_X + 2.0 * BOB_X * s;
    center.y += -BOB_Y + 2.0 * BOB_Y * s;
    let scale = (1.0 + 0.1 * s) * appear;
    (center, orb.size / 2.0 * scale, ORB_OPACITY * appear)
}

/// Vertices of an outline at `t` seconds.
pub fn outline_vertices(outline: &Outline, t: f32, extent: Extent) -> Vec<Vec2> {
    let left = anchor_x(outline.side, outline.size, extent);
    let top = extent.height * outline.top;
    let s = swell(t, outline.period.abs());
    let scale = 1.0 + (outline.scale - 1.0) * s;
    let center = Vec2::new(
        left + outline.size / 2.0 + outline.drift.x * s,
        top + outline.size / 2.0 + outline.drift.y * s,
    );
    let angle = t / outline.period * TAU;
    let (sin, cos) = angle.sin_cos();

    outline
        .vertices
        .iter()
        .map(|&(fx, fy)| {
            let dx = (fx - 0.5) * outline.size * scale;
            let dy = (fy - 0.5) * outline.size * scale;
            Vec2::new(center.x + dx * cos - dy * sin, center.y + dx * sin + dy * cos)
        })
        .collect()
}

/// The floating shapes layer.
///
/// Keeps its own capability probe so reduced motion changes apply while
/// mounted; the subscription goes away with the effect.
#[derive(Debug)]
pub struct FloatingShapes {
    probe: CapabilityProbe,
    extent: Extent,
    /// Animation time in milliseconds, frozen while motion is reduced.
    clock_ms: u64,
    last_elapsed_ms: Option<u64>,
}

impl FloatingShapes {
    pub fn new(probe: CapabilityProbe) -> Self {
        Self {
            probe,
            extent: Extent::default(),
            clock_ms: 0,
            last_elapsed_ms: None,
        }
    }

    pub fn reduced_motion(&self) -> bool {
        self.probe.snapshot().reduced_motion
    }

    /// Animation time in seconds.
    pub fn clock(&self) -> f32 {
        self.clock_ms as f32 / 1000.0
    }

    /// Pick up reduced motion changes and move the animation clock.
    pub fn advance(&mut self, elapsed_ms: u64) {
        if self.probe.poll() {
            debug!(
                reduced_motion = self.reduced_motion(),
                "shapes motion preference changed"
            );
        }
        let delta = self
            .last_elapsed_ms
            .map_or(0, |last| elapsed_ms.saturating_sub(last));
        self.last_elapsed_ms = Some(elapsed_ms);
        if !self.reduced_motion() {
            self.clock_ms += delta;
        }
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        surface.clear();
        let t = self.clock();
        let animate = !self.reduced_motion();

        for orb in &ORBS {
            let (center, radius, alpha) = orb_pose(orb, t, self.extent, animate);
            if alpha <= 0.0 || radius <= 0.0 {
                continue;
            }
            surface.fill_circle(center, radius, orb.to, alpha);
            let inner = Vec2::new(center.x - radius * 0.25, center.y - radius * 0.25);
            surface.fill_circle(inner, radius * 0.5, orb.from, alpha);
        }

        for outline in &OUTLINES {
            let points = outline_vertices(outline, t, self.extent);
            for (i, &from) in points.iter().enumerate() {
                let to = points[(i + 1) % points.len()];
                surface.draw_line(from, to, outline.color, outline.opacity);
            }
        }
    }
}

impl Effect for FloatingShapes {
    fn name(&self) -> &'static str {
        "shapes"
    }

    fn mount(&mut self, extent: Extent) {
        self.extent = extent;
    }

    fn frame(&mut self, elapsed_ms: u64, surface: &mut dyn Surface) {
        self.advance(elapsed_ms);
        self.render(surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingSurface;
    use backdrop_core::{Broadcast, CapabilitySignals, Hint, StaticCapabilities};

    fn shapes(reduced: bool, motion: &Broadcast<bool>) -> FloatingShapes {
        let source = StaticCapabilities(CapabilitySignals {
            reduced_motion: Hint::Available(reduced),
            ..CapabilitySignals::default()
        });
        let mut s = FloatingShapes::new(CapabilityProbe::evaluate(&source, motion));
        s.mount(Extent::new(1000.0, 800.0));
        s
    }

    #[test]
    fn test_orb_fades_in_after_delay() {
        let extent = Extent::new(1000.0, 800.0);
        let orb = &ORBS[1];
        assert_eq!(orb_pose(orb, 0.5, extent, true).2, 0.0);
        assert!((orb_pose(orb, 1.5, extent, true).2 - 0.15).abs() < 1e-6);
        assert!((orb_pose(orb, 3.0, extent, true).2 - ORB_OPACITY).abs() < 1e-6);
    }

    #[test]
    fn test_orb_bobs_over_period() {
        let extent = Extent::new(1000.0, 800.0);
        let orb = &ORBS[0];
        let (start, ..) = orb_pose(orb, 0.0, extent, true);
        let (mid, ..) = orb_pose(orb, BOB_PERIOD / 2.0, extent, true);
        let (end, ..) = orb_pose(orb, BOB_PERIOD, extent, true);
        assert!((mid.y - start.y - 2.0 * BOB_Y).abs() < 1e-3);
        assert!((mid.x - start.x - 2.0 * BOB_X).abs() < 1e-3);
        assert!(start.distance(end) < 1e-3);
    }

    #[test]
    fn test_right_anchor() {
        let extent = Extent::new(1000.0, 800.0);
        let (center, radius, _) = orb_pose(&ORBS[1], 0.0, extent, false);
        assert!((center.x + radius - 920.0).abs() < 1e-3);
    }

    #[test]
    fn test_outline_returns_to_start_after_period() {
        let extent = Extent::new(1000.0, 800.0);
        let outline = &OUTLINES[0];
        let start = outline_vertices(outline, 0.0, extent);
        let end = outline_vertices(outline, outline.period, extent);
        assert_eq!(start.len(), 3);
        for (a, b) in start.iter().zip(&end) {
            assert!(a.distance(*b) < 1e-2);
        }
        let quarter = outline_vertices(outline, outline.period / 4.0, extent);
        assert!(start[0].distance(quarter[0]) > 1.0);
    }

    #[test]
    fn test_draws_every_shape() {
        let motion = Broadcast::new();
        let mut s = shapes(false, &motion);
        let mut surface = RecordingSurface::new(Extent::new(1000.0, 800.0));
        s.frame(0, &mut surface);
        s.frame(5_000, &mut surface);
        surface.calls.clear();
        s.frame(5_016, &mut surface);
        // two discs per orb, one line per polygon edge
        assert_eq!(surface.circles().len(), ORBS.len() * 2);
        assert_eq!(surface.lines().len(), 3 + 6);
    }

    #[test]
    fn test_reduced_motion_freezes_clock() {
        let motion = Broadcast::new();
        let mut s = shapes(true, &motion);
        s.advance(0);
        s.advance(1_000);
        assert_eq!(s.clock(), 0.0);

        motion.emit(false);
        s.advance(1_500);
        assert_eq!(s.clock_ms, 500);

        motion.emit(true);
        s.advance(3_000);
        assert_eq!(s.clock_ms, 500);
        assert!(s.reduced_motion());
    }

    #[test]
    fn test_frozen_orbs_are_fully_visible() {
        let motion = Broadcast::new();
        let s = shapes(true, &motion);
        let mut surface = RecordingSurface::new(Extent::new(1000.0, 800.0));
        s.render(&mut surface);
        assert_eq!(surface.circles().len(), ORBS.len() * 2);
    }

    #[test]
    fn test_dropping_shapes_releases_subscription() {
        let motion = Broadcast::new();
        let s = shapes(false, &motion);
        assert_eq!(motion.listeners(), 1);
        drop(s);
        assert_eq!(motion.listeners(), 0);
    }
}
