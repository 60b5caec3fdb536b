//! Backdrop layer management.

use backdrop_core::{
    Broadcast, CapabilityProbe, CapabilitySource, FrameScheduler, Theme, Viewport,
};
use rand::{SeedableRng, rngs::StdRng};
use ratatui::{
    Frame,
    style::{Color, Style},
    widgets::Block,
};
use tracing::info;

use crate::animations::{FloatingShapes, ParticleField, ProceduralRain};
use crate::canvas::{CanvasLayer, CellCanvas};
use crate::host::AnimationHost;

/// Which decorative layers are enabled, or mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layers {
    pub rain: bool,
    pub shapes: bool,
    pub particles: bool,
}

impl Default for Layers {
    fn default() -> Self {
        Self {
            rain: true,
            shapes: true,
            particles: true,
        }
    }
}

/// All mounted layers, their scheduler and the resize signal they follow.
#[derive(Debug, Default)]
pub struct BackdropState {
    scheduler: FrameScheduler,
    resizes: Broadcast<Viewport>,
    viewport: Viewport,
    rain: Option<AnimationHost<ProceduralRain, CellCanvas>>,
    shapes: Option<AnimationHost<FloatingShapes, CellCanvas>>,
    particles: Option<AnimationHost<ParticleField, CellCanvas>>,
}

impl BackdropState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount the enabled layers, replacing whatever was mounted before.
    ///
    /// The particle field decides once, from a single sample of `source`.
    /// Shapes keep following `motion_changes` while mounted. A layer that
    /// declines or gets no surface is dropped right away, releasing its
    /// subscriptions.
    pub fn mount(
        &mut self,
        layers: Layers,
        viewport: Viewport,
        source: &dyn CapabilitySource,
        motion_changes: &Broadcast<bool>,
    ) {
        self.unmount();
        self.viewport = viewport;

        if layers.rain {
            self.rain = Some(AnimationHost::mount(
                ProceduralRain::new(StdRng::from_os_rng()),
                &self.scheduler,
                &self.resizes,
                viewport,
                CellCanvas::new,
            ))
            .filter(AnimationHost::is_mounted);
        }
        if layers.shapes {
            let probe = CapabilityProbe::evaluate(source, motion_changes);
            self.shapes = Some(AnimationHost::mount(
                FloatingShapes::new(probe),
                &self.scheduler,
                &self.resizes,
                viewport,
                CellCanvas::new,
            ))
            .filter(AnimationHost::is_mounted);
        }
        if layers.particles {
            let capability = source.sample().snapshot();
            self.particles = Some(AnimationHost::mount(
                ParticleField::new(capability, StdRng::from_os_rng()),
                &self.scheduler,
                &self.resizes,
                viewport,
                CellCanvas::new,
            ))
            .filter(AnimationHost::is_mounted);
        }

        let mounted = self.mounted();
        info!(
            rain = mounted.rain,
            shapes = mounted.shapes,
            particles = mounted.particles,
            "backdrop mounted"
        );
    }

    /// Drop every layer. Frame requests and subscriptions go with them.
    pub fn unmount(&mut self) {
        self.rain = None;
        self.shapes = None;
        self.particles = None;
    }

    /// Announce a new viewport. Layers pick it up on their next tick.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport != self.viewport {
            self.viewport = viewport;
            self.resizes.emit(viewport);
        }
    }

    /// Run one scheduler tick. Returns how many layers drew a frame.
    pub fn tick(&mut self, elapsed_ms: u64) -> usize {
        let fired = self.scheduler.tick();
        let mut ran = 0;
        if let Some(host) = self.rain.as_mut() {
            ran += usize::from(host.on_tick(&fired, elapsed_ms));
        }
        if let Some(host) = self.shapes.as_mut() {
            ran += usize::from(host.on_tick(&fired, elapsed_ms));
        }
        if let Some(host) = self.particles.as_mut() {
            ran += usize::from(host.on_tick(&fired, elapsed_ms));
        }
        ran
    }

    /// Paint the theme background and composite the layers back to front.
    pub fn render(&self, frame: &mut Frame, theme: Theme) {
        let area = frame.area();
        let background = theme.background();
        let fill = Style::default().bg(Color::from(background));
        frame.render_widget(Block::default().style(fill), area);

        let rain = self.rain.as_ref().and_then(|h| h.surface());
        let shapes = self.shapes.as_ref().and_then(|h| h.surface());
        let particles = self.particles.as_ref().and_then(|h| h.surface());
        let layers = [
            (rain, theme.rain_opacity()),
            (shapes, 1.0),
            (particles, 1.0),
        ];
        for (canvas, opacity) in layers {
            if let Some(canvas) = canvas {
                frame.render_widget(CanvasLayer::new(canvas, opacity, background), area);
            }
        }
    }

    /// Layers that currently hold a surface.
    pub fn mounted(&self) -> Layers {
        Layers {
            rain: self.rain.as_ref().is_some_and(|h| h.is_mounted()),
            shapes: self.shapes.as_ref().is_some_and(|h| h.is_mounted()),
            particles: self.particles.as_ref().is_some_and(|h| h.is_mounted()),
        }
    }

    pub fn shapes(&self) -> Option<&FloatingShapes> {
        self.shapes.as_ref().map(|h| h.effect())
    }

    pub fn particles(&self) -> Option<&ParticleField> {
        self.particles.as_ref().map(|h| h.effect())
    }

    pub fn pending_frames(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn resize_listeners(&self) -> usize {
        self.resizes.listeners()
    }
}
