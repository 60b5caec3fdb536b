//! Host capability detection.

use backdrop_config::CapabilityOverrides;
use backdrop_core::{CapabilitySignals, CapabilitySource, EffectiveType, Hint};
use sysinfo::System;
use tracing::{debug, warn};

/// Environment variable naming the network class (`slow-2g`, `2g`, `3g`, `4g`).
pub const NETWORK_ENV: &str = "BACKDROP_NETWORK";
/// Environment variable carrying the reduced motion preference.
pub const REDUCED_MOTION_ENV: &str = "BACKDROP_REDUCED_MOTION";

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;
/// Smallest and largest memory bucket, in GiB.
const MIN_MEMORY_GB: f64 = 0.25;
const MAX_MEMORY_GB: f64 = 8.0;

/// Capabilities read from the running machine, with overrides layered on top.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HostCapabilities {
    signals: CapabilitySignals,
}

impl HostCapabilities {
    /// Read cores and memory through sysinfo and the remaining hints from
    /// the environment.
    pub fn detect() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_all();
        sys.refresh_memory();

        let network = std::env::var(NETWORK_ENV).ok();
        let reduced = std::env::var(REDUCED_MOTION_ENV).ok();
        let signals = read_signals(
            sys.cpus().len(),
            sys.total_memory(),
            network.as_deref(),
            reduced.as_deref(),
        );
        debug!(?signals, "host capabilities detected");
        Self { signals }
    }

    pub fn from_signals(signals: CapabilitySignals) -> Self {
        Self { signals }
    }

    /// Replace readings with any forced values.
    pub fn with_overrides(self, overrides: &CapabilityOverrides) -> Self {
        let s = self.signals;
        Self {
            signals: CapabilitySignals {
                reduced_motion: s.reduced_motion.or_override(overrides.reduced_motion),
                effective_type: s.effective_type.or_override(overrides.network),
                device_memory_gb: s.device_memory_gb.or_override(overrides.memory_gb),
                logical_cores: s.logical_cores.or_override(overrides.cores),
            },
        }
    }
}

impl CapabilitySource for HostCapabilities {
    fn reduced_motion(&self) -> Hint<bool> {
        self.signals.reduced_motion
    }

    fn effective_type(&self) -> Hint<EffectiveType> {
        self.signals.effective_type
    }

    fn device_memory_gb(&self) -> Hint<f32> {
        self.signals.device_memory_gb
    }

    fn logical_cores(&self) -> Hint<u32> {
        self.signals.logical_cores
    }
}

/// Turn raw readings into signals. Zero counts mean the reading failed.
fn read_signals(
    cores: usize,
    memory_bytes: u64,
    network: Option<&str>,
    reduced_motion: Option<&str>,
) -> CapabilitySignals {
    let logical_cores = u32::try_from(cores).ok().filter(|&n| n > 0);
    let device_memory_gb = (memory_bytes > 0).then(|| bucket_memory_gb(memory_bytes));

    let effective_type = network.and_then(|raw| match raw.parse::<EffectiveType>() {
        Ok(kind) => Some(kind),
        Err(e) => {
            warn!(var = NETWORK_ENV, "{e}");
            None
        }
    });

    CapabilitySignals {
        reduced_motion: reduced_motion.and_then(parse_reduced_motion).into(),
        effective_type: effective_type.into(),
        device_memory_gb: device_memory_gb.into(),
        logical_cores: logical_cores.into(),
    }
}

/// Round installed memory to the nearest power of two GiB, within 0.25..=8.
/// A nominal 4 GiB machine reporting 3.8 GiB usable lands in the 4 bucket.
fn bucket_memory_gb(memory_bytes: u64) -> f32 {
    let gib = memory_bytes as f64 / BYTES_PER_GIB;
    let exponent = gib
        .log2()
        .round()
        .clamp(MIN_MEMORY_GB.log2(), MAX_MEMORY_GB.log2());
    exponent.exp2() as f32
}

/// Interpret a reduced motion preference. Unknown values are ignored.
fn parse_reduced_motion(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "reduce" => Some(true),
        "0" | "false" | "no" | "no-preference" => Some(false),
        "" => None,
        other => {
            warn!(
                var = REDUCED_MOTION_ENV,
                value = other,
                "unrecognized reduced motion value"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GIB: u64 = 1024 * 1024 * 1024;

    #[test]
    fn test_read_signals() {
        let s = read_signals(8, 16 * GIB, Some("4g"), Some("reduce"));
        assert_eq!(s.logical_cores, Hint::Available(8));
        assert_eq!(s.device_memory_gb, Hint::Available(8.0));
        assert_eq!(s.effective_type, Hint::Available(EffectiveType::FourG));
        assert_eq!(s.reduced_motion, Hint::Available(true));
        assert!(!s.is_low_performance());
    }

    #[test]
    fn test_zero_readings_are_unavailable() {
        let s = read_signals(0, 0, None, None);
        assert_eq!(s, CapabilitySignals::default());
    }

    #[test]
    fn test_bad_env_values_are_ignored() {
        let s = read_signals(8, 16 * GIB, Some("5g"), Some("sometimes"));
        assert_eq!(s.effective_type, Hint::Unavailable);
        assert_eq!(s.reduced_motion, Hint::Unavailable);
    }

    #[test]
    fn test_nominal_4gb_host_is_not_low_performance() {
        const MIB: u64 = 1024 * 1024;
        let s = read_signals(8, 3_900 * MIB, None, None);
        assert_eq!(s.device_memory_gb, Hint::Available(4.0));
        assert!(!s.is_low_performance());
    }

    #[test]
    fn test_memory_buckets() {
        const MIB: u64 = 1024 * 1024;
        assert_eq!(bucket_memory_gb(1_900 * MIB), 2.0);
        assert_eq!(bucket_memory_gb(7_800 * MIB), 8.0);
        assert_eq!(bucket_memory_gb(64 * GIB), 8.0);
        assert_eq!(bucket_memory_gb(100 * MIB), 0.25);
        assert!(read_signals(8, 1_900 * MIB, None, None).is_low_performance());
    }

    #[test]
    fn test_parse_reduced_motion() {
        assert_eq!(parse_reduced_motion("TRUE"), Some(true));
        assert_eq!(parse_reduced_motion(" 1 "), Some(true));
        assert_eq!(parse_reduced_motion("no-preference"), Some(false));
        assert_eq!(parse_reduced_motion(""), None);
    }

    #[test]
    fn test_overrides_win() {
        let host = HostCapabilities::from_signals(read_signals(16, 32 * GIB, None, None));
        let forced = host.with_overrides(&CapabilityOverrides {
            cores: Some(2),
            network: Some(EffectiveType::Slow2g),
            ..CapabilityOverrides::default()
        });
        assert_eq!(forced.logical_cores(), Hint::Available(2));
        assert_eq!(forced.effective_type(), Hint::Available(EffectiveType::Slow2g));
        assert_eq!(forced.device_memory_gb(), Hint::Available(8.0));
        assert!(forced.sample().is_low_performance());
    }

    #[test]
    fn test_empty_overrides_keep_readings() {
        let host = HostCapabilities::from_signals(read_signals(4, 8 * GIB, Some("3g"), None));
        assert_eq!(host.with_overrides(&CapabilityOverrides::default()), host);
    }
}
