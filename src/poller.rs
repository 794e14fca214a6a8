//! Telemetry polling with two independent cadences
//!
//! The collect timer issues one stats request per tick and appends each
//! answer to the sample window as it arrives. The redraw timer only asks
//! the view to repaint. Requests are not fenced: a slow answer may land
//! after a faster, later one, and the window keeps arrival order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::core::{Sample, SampleWindow};
use crate::time::now_millis;
use crate::transport::ModuleApi;

/// Called on every redraw tick
pub type RepaintHook = Arc<dyn Fn() + Send + Sync>;

/// Window shared between the collect tasks (append) and the view (read)
pub type SharedWindow = Arc<Mutex<SampleWindow>>;

/// Poller configuration, before the timers start
pub struct TelemetryPoller<A> {
    api: A,
    window: SharedWindow,
    sample_rate: Duration,
    update_rate: Duration,
}

impl<A: ModuleApi> TelemetryPoller<A> {
    pub fn new(api: A, display_window: Duration, sample_rate: Duration, update_rate: Duration) -> Self {
        Self {
            api,
            window: Arc::new(Mutex::new(SampleWindow::new(display_window))),
            sample_rate,
            update_rate,
        }
    }

    /// Start both timers. They run until the returned session is dropped.
    pub fn start(self, runtime: &Handle, on_redraw: RepaintHook) -> TelemetrySession {
        let live = Arc::new(AtomicBool::new(true));

        let collect = runtime.spawn(collect_loop(
            self.api,
            self.window.clone(),
            self.sample_rate,
            live.clone(),
        ));
        let redraw = runtime.spawn(redraw_loop(self.update_rate, on_redraw));

        info!(
            sample_ms = self.sample_rate.as_millis() as u64,
            update_ms = self.update_rate.as_millis() as u64,
            "Telemetry session started"
        );

        TelemetrySession {
            window: self.window,
            live,
            collect,
            redraw,
        }
    }
}

/// Running telemetry: owns both timers and cancels them together on drop
pub struct TelemetrySession {
    window: SharedWindow,
    live: Arc<AtomicBool>,
    collect: JoinHandle<()>,
    redraw: JoinHandle<()>,
}

impl TelemetrySession {
    pub fn window(&self) -> &SharedWindow {
        &self.window
    }

    /// Stop both timers now (same as dropping the session)
    pub fn stop(self) {}
}

impl Drop for TelemetrySession {
    fn drop(&mut self) {
        // In-flight requests keep running but their answers are discarded
        self.live.store(false, Ordering::Release);
        self.collect.abort();
        self.redraw.abort();
        info!("Telemetry session stopped");
    }
}

/// First tick one period after start, like a plain repeating timer
fn repeating(period: Duration) -> tokio::time::Interval {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn collect_loop<A: ModuleApi>(
    api: A,
    window: SharedWindow,
    sample_rate: Duration,
    live: Arc<AtomicBool>,
) {
    let mut ticker = repeating(sample_rate);
    let mut issued = 0u64;
    loop {
        ticker.tick().await;
        issued += 1;
        trace!(request = issued, "Collect tick");

        let api = api.clone();
        let window = window.clone();
        let live = live.clone();
        tokio::spawn(async move {
            let result = api.stats().await;
            if !live.load(Ordering::Acquire) {
                trace!(request = issued, "Stats answer after teardown, dropped");
                return;
            }
            match result {
                Ok(payload) => {
                    let mut window = window.lock();
                    window.push(Sample::new(now_millis(), payload));
                    debug!(request = issued, samples = window.len(), "Stats sample stored");
                }
                // Chart simply stops advancing
                Err(e) => warn!(request = issued, error = %e, "Stats request failed"),
            }
        });
    }
}

async fn redraw_loop(update_rate: Duration, on_redraw: RepaintHook) {
    let mut ticker = repeating(update_rate);
    loop {
        ticker.tick().await;
        on_redraw();
    }
}
