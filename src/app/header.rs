//! Header bar with tabs and module status

use eframe::egui;
use crate::core::ModuleVariant;
use crate::theme::colors;
use super::{ActiveTab, ConsoleApp};

impl ConsoleApp {
    pub(crate) fn render_header(&mut self, ui: &mut egui::Ui) {
        let variant = self.console.variant();
        let samples = self.console.sample_count();

        ui.horizontal(|ui| {
            const TABS: &[(ActiveTab, &str)] = &[
                (ActiveTab::Statistics, "Statistics"),
                (ActiveTab::Configuration, "Configuration"),
            ];

            for &(tab, label) in TABS {
                let color = if self.active_tab == tab {
                    colors::TEXT_PRIMARY
                } else {
                    colors::TEXT_MUTED
                };

                if ui
                    .selectable_label(self.active_tab == tab, egui::RichText::new(label).color(color))
                    .clicked()
                {
                    self.active_tab = tab;
                }
            }

            // RIGHT: status (right-to-left order)
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let (status_color, status_text) = match variant {
                    ModuleVariant::Unknown => (colors::STATUS_PENDING, "Detecting..."),
                    ModuleVariant::Dispatcher | ModuleVariant::Collector => {
                        (colors::STATUS_OK, variant.label())
                    }
                };
                ui.colored_label(status_color, status_text);
                ui.label(egui::RichText::new("/").color(colors::TEXT_MUTED));

                if variant != ModuleVariant::Unknown {
                    ui.label(
                        egui::RichText::new(format!("{} samples", samples))
                            .color(colors::TEXT_MUTED),
                    );
                    ui.label(egui::RichText::new("/").color(colors::TEXT_MUTED));
                }

                ui.label(
                    egui::RichText::new(&self.base_url)
                        .color(colors::TEXT_SECONDARY)
                        .monospace(),
                );
            });
        });
    }
}
