//! Decorative animation layers for the backdrop terminal app.
//!
//! Three effects share one lifecycle: procedural rain, floating shapes and
//! an interactive particle field. Each is mounted through an
//! [`AnimationHost`] onto its own [`CellCanvas`], and [`BackdropState`]
//! composites the canvases behind the foreground content.

pub mod animations;
mod canvas;
mod chars;
mod color;
mod host;
#[cfg(test)]
mod recording;
mod state;

pub use animations::{FloatingShapes, ParticleField, ProceduralRain};
pub use canvas::{CanvasCell, CanvasLayer, CellCanvas};
pub use host::{AnimationHost, Effect};
pub use state::{BackdropState, Layers};
