//! forcefield - Main Entry Point
//!
//! Runs the force field transform on still images or drives the timed frame
//! pipeline against a synthetic or replayed frame source.

mod cli;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Command, ConfigArgs, LiveArgs, StillArgs};
use forcefield_rs::{
    config::AppConfig,
    logging,
    pipeline::{spawn_pipeline, FramePipeline, NullSink, PipelineMessage, SystemClock},
    raster::load_still_image,
    source::{FrameSource, ReplaySource, SyntheticSource},
    types::{GridSummary, PipelineState},
    NeighborPolicy,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Result of the still-image command
#[derive(Debug, Serialize)]
struct StillReport {
    image: PathBuf,
    width: usize,
    height: usize,
    layout: String,
    radius: usize,
    neighbors: NeighborPolicy,
    transform_us: u64,
    summary: GridSummary,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let _guard = logging::init(&config.logging)?;

    match cli.command {
        Command::Still(args) => run_still(&config, args),
        Command::Live(args) => run_live(&config, args),
        Command::Config(args) => run_config(&config, cli.config.as_deref(), args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(AppConfig::load_or_default()),
    }
}

fn run_still(config: &AppConfig, args: StillArgs) -> anyhow::Result<()> {
    let frame = load_still_image(&args.image)?;

    let mut pipeline_config = config.pipeline;
    if let Some(radius) = args.radius {
        pipeline_config.radius = radius;
    }
    if let Some(neighbors) = args.neighbors {
        pipeline_config.neighbor_policy = neighbors;
    }

    let source = ReplaySource::new(vec![frame.clone()])?;
    let mut pipeline = FramePipeline::new(source, NullSink, pipeline_config, config.limits)?;
    let output = pipeline.process_still(&frame);

    let report = StillReport {
        image: args.image,
        width: output.width(),
        height: output.height(),
        layout: frame.layout().to_string(),
        radius: pipeline_config.radius,
        neighbors: pipeline_config.neighbor_policy,
        transform_us: pipeline.stats().transform.last_us,
        summary: output.summary(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} ({}x{} {}), radius {} {}",
            report.image.display(),
            report.width,
            report.height,
            report.layout,
            report.radius,
            report.neighbors
        );
        println!(
            "  magnitude min {} max {} mean {:.2}, {} non-zero, {} us",
            report.summary.min,
            report.summary.max,
            report.summary.mean,
            report.summary.nonzero,
            report.transform_us
        );
    }
    Ok(())
}

fn run_live(config: &AppConfig, args: LiveArgs) -> anyhow::Result<()> {
    let mut pipeline_config = config.pipeline;
    if let Some(radius) = args.radius {
        pipeline_config.radius = radius;
    }
    if let Some(interval) = args.interval {
        pipeline_config.tick_interval_ms = interval;
    }
    pipeline_config.invert_horizontal |= args.invert_h;
    pipeline_config.invert_vertical |= args.invert_v;

    let source: Box<dyn FrameSource> = if args.replay.is_empty() {
        Box::new(SyntheticSource::from_capture(
            &config.capture,
            args.pattern.to_pattern(args.square),
        ))
    } else {
        Box::new(ReplaySource::from_paths(&args.replay)?)
    };
    tracing::info!("Using {}", source.describe());

    let pipeline = FramePipeline::new(source, NullSink, pipeline_config, config.limits)?;
    let handle = spawn_pipeline(pipeline, SystemClock::new())?;
    handle.bridge.start();

    let run_for = args.run_for()?;
    let started = Instant::now();
    while started.elapsed() < run_for {
        let Some(msg) = handle.bridge.recv_timeout(Duration::from_millis(100)) else {
            continue;
        };
        match msg {
            PipelineMessage::Fps(sample) => tracing::info!("{}", sample),
            PipelineMessage::SourceError(e) => tracing::error!("Source error: {}", e),
            PipelineMessage::StateChanged(PipelineState::Stopped) => break,
            PipelineMessage::StateChanged(state) => tracing::debug!("Pipeline {}", state),
            PipelineMessage::Shutdown => break,
            other => tracing::debug!("{:?}", other),
        }
    }

    let pipeline = handle.join()?;
    let stats = pipeline.stats();
    println!(
        "{} frame(s) processed, {} tick(s) skipped, {:.1}% success, last {:.1} fps",
        stats.frames_processed,
        stats.ticks_skipped,
        stats.success_rate(),
        stats.last_fps
    );
    println!(
        "  transform avg {:.0} us (min {} max {} jitter {}), acquire avg {:.0} us",
        stats.transform.avg_us(),
        stats.transform.recent_min_us(),
        stats.transform.recent_max_us(),
        stats.transform.jitter_us(),
        stats.acquisition.avg_us()
    );
    Ok(())
}

fn run_config(config: &AppConfig, path: Option<&Path>, args: ConfigArgs) -> anyhow::Result<()> {
    print!("{}", config.to_toml()?);
    if args.write {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => AppConfig::default_path().context("No platform config directory")?,
        };
        config.save(&path)?;
        println!("# written to {}", path.display());
    }
    Ok(())
}
