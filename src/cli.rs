use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

use clap::{Args, Parser, Subcommand, ValueEnum};
use forcefield_rs::source::SyntheticPattern;
use forcefield_rs::NeighborPolicy;

/// Command line interface for the force field transform.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Transform one image file and print a summary of the result.
    Still(StillArgs),
    /// Run the timed frame pipeline against a synthetic or replayed source.
    Live(LiveArgs),
    /// Print the effective configuration as TOML.
    Config(ConfigArgs),
}

#[derive(Args, Debug, Clone)]
pub struct StillArgs {
    /// Image to transform (PNG, JPEG or BMP).
    pub image: PathBuf,
    /// Window radius override.
    #[arg(long)]
    pub radius: Option<usize>,
    /// Neighbor policy override.
    #[arg(long, value_enum)]
    pub neighbors: Option<NeighborPolicy>,
    /// Print the report as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct LiveArgs {
    /// Synthetic pattern, ignored with --replay.
    #[arg(long, value_enum, default_value_t = PatternArg::Checkerboard)]
    pub pattern: PatternArg,
    /// Square size for the checkerboard pattern.
    #[arg(long, default_value_t = 16)]
    pub square: usize,
    /// Replay these images in a loop instead of generating frames.
    #[arg(long, num_args = 1..)]
    pub replay: Vec<PathBuf>,
    /// Window radius override.
    #[arg(long)]
    pub radius: Option<usize>,
    /// Tick interval override in milliseconds.
    #[arg(long)]
    pub interval: Option<u64>,
    /// Mirror frames left-to-right.
    #[arg(long, default_value_t = false)]
    pub invert_h: bool,
    /// Mirror frames top-to-bottom.
    #[arg(long, default_value_t = false)]
    pub invert_v: bool,
    /// How long to run before shutting down.
    #[arg(long, default_value_t = 5.0)]
    pub seconds: f64,
}

impl LiveArgs {
    /// Run time as a Duration; negative values clamp to zero.
    pub fn run_for(&self) -> anyhow::Result<Duration> {
        Duration::try_from_secs_f64(self.seconds.max(0.0))
            .with_context(|| format!("Invalid run time of {} seconds", self.seconds))
    }
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Write the effective configuration to the config path.
    #[arg(long, default_value_t = false)]
    pub write: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternArg {
    Constant,
    Checkerboard,
    MovingBar,
    PointSource,
    Noise,
}

impl PatternArg {
    pub fn to_pattern(self, square: usize) -> SyntheticPattern {
        match self {
            PatternArg::Constant => SyntheticPattern::Constant(128),
            PatternArg::Checkerboard => SyntheticPattern::Checkerboard { square },
            PatternArg::MovingBar => SyntheticPattern::MovingBar { width: 8, speed: 4 },
            PatternArg::PointSource => SyntheticPattern::PointSource { value: 255 },
            PatternArg::Noise => SyntheticPattern::Noise { seed: 0x5EED },
        }
    }
}
