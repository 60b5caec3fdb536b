//! Scoped animation loop shared by every effect.
//!
//! An [`AnimationHost`] owns one effect together with its drawing surface,
//! its pending [`FrameRequest`] and its viewport resize [`Subscription`].
//! Dropping the host releases all three, including on the path where the
//! effect declined to mount and nothing was acquired.

use backdrop_core::{
    Broadcast, Extent, Fired, FrameRequest, FrameScheduler, Subscription, Surface, Viewport,
};
use tracing::{debug, info};

/// A decorative layer driven by the frame scheduler.
pub trait Effect {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether the effect wants a surface at all. Checked before anything
    /// is acquired.
    fn should_mount(&self) -> bool {
        true
    }

    /// Build the population for a surface of the given size. Also called
    /// after every resize, discarding the previous population.
    fn mount(&mut self, extent: Extent);

    /// Update and draw one frame.
    fn frame(&mut self, elapsed_ms: u64, surface: &mut dyn Surface);
}

#[derive(Debug)]
struct Mounted<S> {
    surface: S,
    frame: Option<FrameRequest>,
    resizes: Subscription<Viewport>,
}

/// Lifecycle wrapper binding an [`Effect`] to a surface and the scheduler.
#[derive(Debug)]
pub struct AnimationHost<E, S> {
    name: &'static str,
    effect: E,
    mounted: Option<Mounted<S>>,
}

impl<E: Effect, S: Surface> AnimationHost<E, S> {
    /// Mount `effect`, acquiring a surface through `acquire` only if the
    /// effect wants one.
    pub fn mount(
        mut effect: E,
        scheduler: &FrameScheduler,
        resizes: &Broadcast<Viewport>,
        viewport: Viewport,
        acquire: impl FnOnce(Viewport) -> Option<S>,
    ) -> Self {
        let name = effect.name();
        if !effect.should_mount() {
            debug!(effect = name, "effect declined to mount");
            return Self {
                name,
                effect,
                mounted: None,
            };
        }

        let Some(surface) = acquire(viewport) else {
            debug!(effect = name, ?viewport, "no drawing surface, skipping mount");
            return Self {
                name,
                effect,
                mounted: None,
            };
        };

        effect.mount(surface.extent());
        info!(
            effect = name,
            cols = viewport.cols,
            rows = viewport.rows,
            "effect mounted"
        );

        Self {
            name,
            effect,
            mounted: Some(Mounted {
                surface,
                frame: Some(scheduler.request()),
                resizes: resizes.subscribe(),
            }),
        }
    }

    /// Handle one scheduler tick.
    ///
    /// Pending resizes are applied first. If this host's frame request fired,
    /// the effect updates and draws, and only then is the next frame
    /// requested. Returns true when a frame ran.
    pub fn on_tick(&mut self, fired: &Fired, elapsed_ms: u64) -> bool {
        let Some(mounted) = self.mounted.as_mut() else {
            return false;
        };

        if let Some(viewport) = mounted.resizes.take() {
            mounted.surface.resize(viewport);
            self.effect.mount(mounted.surface.extent());
            debug!(
                effect = self.name,
                cols = viewport.cols,
                rows = viewport.rows,
                "surface resized, population rebuilt"
            );
        }

        let due = mounted
            .frame
            .as_ref()
            .is_some_and(|request| fired.contains(request.id()));
        if !due {
            return false;
        }

        self.effect.frame(elapsed_ms, &mut mounted.surface);
        mounted.frame = mounted.frame.take().and_then(FrameRequest::renew);
        true
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    pub fn effect(&self) -> &E {
        &self.effect
    }

    pub fn surface(&self) -> Option<&S> {
        self.mounted.as_ref().map(|m| &m.surface)
    }
}

impl<E, S> Drop for AnimationHost<E, S> {
    fn drop(&mut self) {
        if self.mounted.take().is_some() {
            debug!(effect = self.name, "effect unmounted");
        }
    }
}
