//! Trailing time window of stats samples
//!
//! Samples are appended in arrival order and stamped by the console at
//! receipt. The window keeps a little more history than the chart shows so
//! the left edge of the plot never runs dry between trims.

use std::collections::VecDeque;
use std::time::Duration;

use serde_json::Value;
use tracing::trace;

/// Extra history kept beyond the displayed window
pub const RETENTION_SLACK: f64 = 1.25;

/// One stats snapshot as received from the module
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    /// Console-assigned receipt time (ms, see [`crate::time::now_millis`])
    pub captured_at: f64,
    /// Module-defined counter tree, addressed through counter paths
    pub payload: Value,
}

impl Sample {
    pub fn new(captured_at: f64, payload: Value) -> Self {
        Self {
            captured_at,
            payload,
        }
    }
}

/// Append-only sample buffer with trailing-duration retention
#[derive(Debug)]
pub struct SampleWindow {
    samples: VecDeque<Sample>,
    display_ms: f64,
    retention_ms: f64,
}

impl SampleWindow {
    pub fn new(display_window: Duration) -> Self {
        let display_ms = display_window.as_secs_f64() * 1000.0;
        Self {
            samples: VecDeque::new(),
            display_ms,
            retention_ms: display_ms * RETENTION_SLACK,
        }
    }

    /// Append a sample, then drop the prefix that fell out of retention.
    ///
    /// The sample's own receipt time is "now" for the trim.
    pub fn push(&mut self, sample: Sample) {
        let cutoff = sample.captured_at - self.retention_ms;
        self.samples.push_back(sample);

        let mut dropped = 0usize;
        while let Some(front) = self.samples.front() {
            if front.captured_at < cutoff {
                self.samples.pop_front();
                dropped += 1;
            } else {
                break;
            }
        }

        trace!(len = self.samples.len(), dropped, "Sample appended");
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Sample> + Clone {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    /// Duration of the visible chart window, in ms
    pub fn display_ms(&self) -> f64 {
        self.display_ms
    }

    pub fn retention_ms(&self) -> f64 {
        self.retention_ms
    }
}
