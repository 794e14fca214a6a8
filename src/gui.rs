//! Native egui console
//!
//! Run with: cargo run --features gui --bin modscope

use eframe::egui;
use modscope::app::ConsoleApp;
use modscope::ConsoleSettings;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,modscope=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let settings = ConsoleSettings::from_env();
    let runtime = tokio::runtime::Runtime::new()?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("modscope")
            .with_inner_size([960.0, 560.0]),
        ..Default::default()
    };

    eframe::run_native(
        "modscope",
        options,
        Box::new(move |cc| Ok(Box::new(ConsoleApp::new(cc, settings, runtime)))),
    )?;
    Ok(())
}
