//! Device capability classification.
//!
//! Every signal is optional: a host that cannot tell us its memory size or
//! network class reports [`Hint::Unavailable`], which never pushes the
//! classification either way.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::signal::{Broadcast, Subscription};

/// Devices with less memory than this (GiB) are classed as low performance.
pub const LOW_MEMORY_GB: f32 = 4.0;
/// Devices with fewer logical cores than this are classed as low performance.
pub const LOW_CORES: u32 = 4;

/// A capability reading that the host may not expose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hint<T> {
    Available(T),
    Unavailable,
}

impl<T> Default for Hint<T> {
    fn default() -> Self {
        Hint::Unavailable
    }
}

impl<T> Hint<T> {
    pub fn available(self) -> Option<T> {
        match self {
            Hint::Available(v) => Some(v),
            Hint::Unavailable => None,
        }
    }

    /// Prefer `over` when it is available.
    pub fn or_override(self, over: Option<T>) -> Hint<T> {
        match over {
            Some(v) => Hint::Available(v),
            None => self,
        }
    }
}

impl<T> From<Option<T>> for Hint<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Hint::Available(v),
            None => Hint::Unavailable,
        }
    }
}

/// Network connection class, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectiveType {
    #[serde(rename = "slow-2g")]
    Slow2g,
    #[serde(rename = "2g")]
    TwoG,
    #[serde(rename = "3g")]
    ThreeG,
    #[serde(rename = "4g")]
    FourG,
}

impl EffectiveType {
    /// `slow-2g` and `2g` connections are too slow for heavy animation.
    pub fn is_slow(self) -> bool {
        matches!(self, EffectiveType::Slow2g | EffectiveType::TwoG)
    }
}

impl fmt::Display for EffectiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EffectiveType::Slow2g => "slow-2g",
            EffectiveType::TwoG => "2g",
            EffectiveType::ThreeG => "3g",
            EffectiveType::FourG => "4g",
        })
    }
}

impl FromStr for EffectiveType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "slow-2g" | "slow2g" | "slow_2g" => Ok(EffectiveType::Slow2g),
            "2g" => Ok(EffectiveType::TwoG),
            "3g" => Ok(EffectiveType::ThreeG),
            "4g" => Ok(EffectiveType::FourG),
            _ => Err(format!(
                "invalid network type: {s} (expected slow-2g, 2g, 3g or 4g)"
            )),
        }
    }
}

/// Raw readings sampled from a [`CapabilitySource`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CapabilitySignals {
    pub reduced_motion: Hint<bool>,
    pub effective_type: Hint<EffectiveType>,
    /// Device memory in GiB.
    pub device_memory_gb: Hint<f32>,
    pub logical_cores: Hint<u32>,
}

impl CapabilitySignals {
    /// Classify the readings. Any single low signal is sufficient.
    ///
    /// A zero memory or core reading is treated like a missing one.
    pub fn is_low_performance(&self) -> bool {
        let slow_network = self
            .effective_type
            .available()
            .is_some_and(EffectiveType::is_slow);
        let low_memory = self
            .device_memory_gb
            .available()
            .is_some_and(|gb| gb > 0.0 && gb < LOW_MEMORY_GB);
        let low_cores = self
            .logical_cores
            .available()
            .is_some_and(|n| n > 0 && n < LOW_CORES);
        slow_network || low_memory || low_cores
    }

    pub fn snapshot(&self) -> CapabilitySnapshot {
        CapabilitySnapshot {
            low_performance: self.is_low_performance(),
            reduced_motion: self.reduced_motion.available().unwrap_or(false),
        }
    }
}

/// Result of one capability evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapabilitySnapshot {
    pub low_performance: bool,
    pub reduced_motion: bool,
}

/// Something that can report device capabilities.
pub trait CapabilitySource {
    fn reduced_motion(&self) -> Hint<bool>;
    fn effective_type(&self) -> Hint<EffectiveType>;
    fn device_memory_gb(&self) -> Hint<f32>;
    fn logical_cores(&self) -> Hint<u32>;

    /// Read every signal once.
    fn sample(&self) -> CapabilitySignals {
        CapabilitySignals {
            reduced_motion: self.reduced_motion(),
            effective_type: self.effective_type(),
            device_memory_gb: self.device_memory_gb(),
            logical_cores: self.logical_cores(),
        }
    }
}

/// Fixed readings, useful for tests and forced configurations.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StaticCapabilities(pub CapabilitySignals);

impl CapabilitySource for StaticCapabilities {
    fn reduced_motion(&self) -> Hint<bool> {
        self.0.reduced_motion
    }

    fn effective_type(&self) -> Hint<EffectiveType> {
        self.0.effective_type
    }

    fn device_memory_gb(&self) -> Hint<f32> {
        self.0.device_memory_gb
    }

    fn logical_cores(&self) -> Hint<u32> {
        self.0.logical_cores
    }
}

/// A capability snapshot kept live for reduced motion changes.
///
/// `low_performance` is decided once at evaluation. The reduced motion flag
/// follows the change signal until the probe is dropped, which releases the
/// subscription.
#[derive(Debug)]
pub struct CapabilityProbe {
    snapshot: CapabilitySnapshot,
    motion_changes: Subscription<bool>,
}

impl CapabilityProbe {
    /// Sample `source` and subscribe to reduced motion changes.
    pub fn evaluate(source: &dyn CapabilitySource, motion_changes: &Broadcast<bool>) -> Self {
        Self {
            snapshot: source.sample().snapshot(),
            motion_changes: motion_changes.subscribe(),
        }
    }

    /// Apply any pending reduced motion change. Returns true if it changed.
    pub fn poll(&mut self) -> bool {
        match self.motion_changes.take() {
            Some(reduced) if reduced != self.snapshot.reduced_motion => {
                self.snapshot.reduced_motion = reduced;
                true
            }
            _ => false,
        }
    }

    pub fn snapshot(&self) -> CapabilitySnapshot {
        self.snapshot
    }
}
