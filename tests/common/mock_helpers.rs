//! Sink and pipeline construction helpers

use forcefield_rs::pipeline::{DisplaySink, FramePipeline};
use forcefield_rs::source::{SyntheticPattern, SyntheticSource};
use forcefield_rs::{IntensityGrid, ParameterLimits, PipelineConfig};
use std::sync::{Arc, Mutex};

/// Sink that keeps every published grid, shared with the test body
#[derive(Clone, Default)]
pub struct RecordingSink {
    grids: Arc<Mutex<Vec<IntensityGrid>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.grids.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<IntensityGrid> {
        self.grids.lock().unwrap().last().cloned()
    }
}

impl DisplaySink for RecordingSink {
    fn publish(&mut self, grid: IntensityGrid) {
        self.grids.lock().unwrap().push(grid);
    }
}

/// Small synthetic source of constant gray
pub fn constant_source(value: u8) -> SyntheticSource {
    SyntheticSource::new(SyntheticPattern::Constant(value), 32, 24)
}

/// Pipeline over `source` with `config` and default limits
pub fn create_test_pipeline(
    source: SyntheticSource,
    config: PipelineConfig,
) -> (FramePipeline<SyntheticSource, RecordingSink>, RecordingSink) {
    let sink = RecordingSink::new();
    let pipeline = FramePipeline::new(source, sink.clone(), config, ParameterLimits::default())
        .expect("test config must be valid");
    (pipeline, sink)
}
