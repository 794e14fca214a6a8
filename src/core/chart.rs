//! Chart model handed to the renderer
//!
//! The x window always ends at render-time "now", not at the last sample,
//! so the axis keeps scrolling between polls.

use super::rate::{rate_series, RatePoint};
use super::variant::SeriesDescriptor;
use super::window::SampleWindow;

/// One labeled, colored rate series
#[derive(Clone, Debug)]
pub struct Dataset {
    pub name: &'static str,
    pub color: [u8; 4],
    pub points: Vec<RatePoint>,
}

impl Dataset {
    /// Most recent plottable rate
    pub fn latest_rate(&self) -> Option<f64> {
        self.points.last().filter(|p| p.is_plottable()).map(|p| p.rate)
    }
}

/// Everything the renderer needs for one frame
#[derive(Clone, Debug)]
pub struct ChartModel {
    /// Render-time "now" (ms)
    pub now: f64,
    /// Left edge of the visible window (ms)
    pub x_min: f64,
    /// Sample timestamps, oldest first
    pub labels: Vec<f64>,
    pub datasets: Vec<Dataset>,
}

impl ChartModel {
    /// Width of the visible window in seconds
    pub fn span_secs(&self) -> f64 {
        (self.now - self.x_min) / 1000.0
    }
}

pub fn build_chart(window: &SampleWindow, series: &[SeriesDescriptor], now: f64) -> ChartModel {
    let datasets = series
        .iter()
        .map(|s| Dataset {
            name: s.name,
            color: s.color,
            points: rate_series(window.iter(), |payload| s.counter.read(payload)),
        })
        .collect();

    ChartModel {
        now,
        x_min: now - window.display_ms(),
        labels: window.iter().map(|s| s.captured_at).collect(),
        datasets,
    }
}

/// Split a rate series into runs of plottable points.
///
/// x is seconds relative to `now` (negative = past). NaN points end a run,
/// so gaps are never bridged by a line.
pub fn finite_runs(points: &[RatePoint], now: f64) -> Vec<Vec<[f64; 2]>> {
    let mut runs = Vec::new();
    let mut current: Vec<[f64; 2]> = Vec::new();

    for p in points {
        if p.is_plottable() {
            current.push([(p.t - now) / 1000.0, p.rate]);
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }

    runs
}
