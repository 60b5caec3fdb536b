//! Command line arguments.

use std::path::PathBuf;

use backdrop_config::Config;
use backdrop_core::{EffectiveType, Theme};
use clap::Parser;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "backdrop", version, about)]
pub struct Args {
    #[arg(
        short = 'f',
        long = "fps",
        value_parser = clap::value_parser!(u32).range(1..=120),
        help_heading = "GENERAL",
        help = "Target FPS (min 1 max 120)"
    )]
    pub fps: Option<u32>,

    #[arg(
        short = 't',
        long = "theme",
        value_parser = parse_theme,
        help_heading = "APPEARANCE",
        help = "Color theme (light, dark)"
    )]
    pub theme: Option<Theme>,

    #[arg(long = "no-rain", help_heading = "LAYERS", help = "Disable the rain layer")]
    pub no_rain: bool,

    #[arg(
        long = "no-particles",
        help_heading = "LAYERS",
        help = "Disable the particle field"
    )]
    pub no_particles: bool,

    #[arg(
        long = "no-shapes",
        help_heading = "LAYERS",
        help = "Disable the floating shapes"
    )]
    pub no_shapes: bool,

    #[arg(
        long = "cores",
        help_heading = "CAPABILITIES",
        help = "Pretend the machine has N logical cores"
    )]
    pub cores: Option<u32>,

    #[arg(
        long = "memory-gb",
        help_heading = "CAPABILITIES",
        help = "Pretend the machine has N GiB of memory"
    )]
    pub memory_gb: Option<f32>,

    #[arg(
        long = "network",
        help_heading = "CAPABILITIES",
        help = "Network class (slow-2g, 2g, 3g, 4g)"
    )]
    pub network: Option<EffectiveType>,

    #[arg(
        long = "reduced-motion",
        help_heading = "CAPABILITIES",
        help = "Start with reduced motion enabled"
    )]
    pub reduced_motion: bool,

    #[arg(
        short = 'c',
        long = "config",
        value_name = "PATH",
        help_heading = "GENERAL",
        help = "Read configuration from PATH"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long = "print-config",
        help_heading = "GENERAL",
        help = "Print the effective configuration and exit"
    )]
    pub print_config: bool,

    #[arg(
        long = "save-config",
        help_heading = "GENERAL",
        help = "Write the effective configuration to the config file and exit"
    )]
    pub save_config: bool,
}

fn parse_theme(s: &str) -> Result<Theme, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "light" => Ok(Theme::Light),
        "dark" => Ok(Theme::Dark),
        _ => Err(format!("invalid theme: {s} (expected light or dark)")),
    }
}

impl Args {
    /// Apply command line values over a loaded config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(fps) = self.fps {
            config.fps = fps;
        }
        if let Some(theme) = self.theme {
            config.theme = theme;
        }
        config.rain &= !self.no_rain;
        config.particles &= !self.no_particles;
        config.shapes &= !self.no_shapes;

        let caps = &mut config.capabilities;
        if self.reduced_motion {
            caps.reduced_motion = Some(true);
        }
        caps.network = self.network.or(caps.network);
        caps.memory_gb = self.memory_gb.or(caps.memory_gb);
        caps.cores = self.cores.or(caps.cores);
    }
}
