//! Display sinks receiving transformed grids.
//!
//! Publishing is fire-and-forget: a sink must never block the pipeline.

use crate::raster::IntensityGrid;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

/// Consumer of transformed grids
pub trait DisplaySink: Send {
    fn publish(&mut self, grid: IntensityGrid);
}

/// Discards every grid
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DisplaySink for NullSink {
    fn publish(&mut self, _grid: IntensityGrid) {}
}

impl<F> DisplaySink for F
where
    F: FnMut(IntensityGrid) + Send,
{
    fn publish(&mut self, grid: IntensityGrid) {
        self(grid)
    }
}

/// Forwards grids over a bounded channel.
///
/// When the consumer lags and the channel is full the grid is dropped and
/// counted; a disconnected consumer is counted the same way.
#[derive(Debug)]
pub struct ChannelSink {
    tx: Sender<IntensityGrid>,
    published: u64,
    dropped: u64,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> (Self, Receiver<IntensityGrid>) {
        let (tx, rx) = bounded(capacity);
        (
            Self {
                tx,
                published: 0,
                dropped: 0,
            },
            rx,
        )
    }

    /// Grids handed to the channel
    pub fn published(&self) -> u64 {
        self.published
    }

    /// Grids discarded because the channel was full or closed
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl DisplaySink for ChannelSink {
    fn publish(&mut self, grid: IntensityGrid) {
        match self.tx.try_send(grid) {
            Ok(()) => self.published += 1,
            Err(TrySendError::Full(_)) => {
                self.dropped += 1;
                tracing::trace!("Display channel full, dropped frame ({} total)", self.dropped);
            }
            Err(TrySendError::Disconnected(_)) => {
                self.dropped += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_sink_drops_when_full() {
        let (mut sink, rx) = ChannelSink::new(2);
        for v in 0..5 {
            sink.publish(IntensityGrid::filled(1, 1, v));
        }
        assert_eq!(sink.published(), 2);
        assert_eq!(sink.dropped(), 3);
        assert_eq!(rx.try_recv().unwrap().get(0, 0), 0);
        assert_eq!(rx.try_recv().unwrap().get(0, 0), 1);
    }

    #[test]
    fn test_channel_sink_disconnected() {
        let (mut sink, rx) = ChannelSink::new(2);
        drop(rx);
        sink.publish(IntensityGrid::new(1, 1));
        assert_eq!(sink.dropped(), 1);
    }

    #[test]
    fn test_closure_sink() {
        let mut seen = Vec::new();
        {
            let mut sink = |grid: IntensityGrid| seen.push(grid.width());
            sink.publish(IntensityGrid::new(3, 1));
            sink.publish(IntensityGrid::new(5, 1));
        }
        assert_eq!(seen, vec![3, 5]);
    }
}
