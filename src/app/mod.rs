//! egui console app
//!
//! Header with tabs, then either the rate charts or the config form of the
//! detected module. While detection is pending only the header shows.

mod config;
mod header;
mod stats;

use std::sync::Arc;

use eframe::egui;
use tokio::runtime::Runtime;
use tracing::info;

use crate::console::Console;
use crate::core::ModuleVariant;
use crate::poller::RepaintHook;
use crate::settings::ConsoleSettings;
use crate::theme::{colors, console_visuals};
use crate::transport::ModuleClient;

/// Active tab in the console
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveTab {
    #[default]
    Statistics,
    Configuration,
}

pub struct ConsoleApp {
    /// Declared before the runtime so its timers are cancelled first
    pub(crate) console: Console<ModuleClient>,
    /// Runtime the console's requests and timers run on (kept alive)
    #[allow(dead_code)]
    runtime: Runtime,
    pub(crate) active_tab: ActiveTab,
    pub(crate) base_url: String,
}

impl ConsoleApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: ConsoleSettings, runtime: Runtime) -> Self {
        cc.egui_ctx.set_visuals(console_visuals());

        // Timers and remote completions wake the UI; egui would otherwise
        // only repaint on input
        let ctx = cc.egui_ctx.clone();
        let repaint: RepaintHook = Arc::new(move || ctx.request_repaint());

        let base_url = settings.base_url.clone();
        info!(url = %base_url, "Starting console");
        let client = ModuleClient::new(&base_url);
        let console = Console::start(client, runtime.handle().clone(), settings, repaint);

        Self {
            console,
            runtime,
            active_tab: ActiveTab::default(),
            base_url,
        }
    }

    fn render_detecting(&self, ui: &mut egui::Ui) {
        ui.centered_and_justified(|ui| {
            ui.label(
                egui::RichText::new(format!("Waiting for module at {}", self.base_url))
                    .color(colors::TEXT_MUTED),
            );
        });
    }
}

impl eframe::App for ConsoleApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.console.poll();

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(colors::BG_PRIMARY).inner_margin(8.0))
            .show(ctx, |ui| {
                self.render_header(ui);
                ui.separator();
                ui.add_space(4.0);

                match self.console.variant() {
                    ModuleVariant::Unknown => self.render_detecting(ui),
                    ModuleVariant::Dispatcher | ModuleVariant::Collector => match self.active_tab {
                        ActiveTab::Statistics => self.render_stats_tab(ui),
                        ActiveTab::Configuration => self.render_config_tab(ui),
                    },
                }
            });
    }
}
