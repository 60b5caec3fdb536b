//! Core types shared by the backdrop crates.
//!
//! The drawing [`Surface`] trait, the capability model, change signals, the
//! cooperative [`FrameScheduler`] and the debounce/throttle policies live
//! here so the effect and application crates agree on them.

pub mod capability;
pub mod color;
pub mod schedule;
pub mod signal;
pub mod surface;
pub mod timing;
pub mod view;

pub use capability::{
    CapabilityProbe, CapabilitySignals, CapabilitySnapshot, CapabilitySource, EffectiveType, Hint,
    StaticCapabilities,
};
pub use color::Rgb;
pub use schedule::{Fired, FrameId, FrameRequest, FrameScheduler};
pub use signal::{Broadcast, Subscription};
pub use surface::{CELL_PX_H, CELL_PX_W, Extent, Glow, Surface, Vec2, Viewport};
pub use timing::{Debounce, Throttle};
pub use view::{Nav, Theme, View};
