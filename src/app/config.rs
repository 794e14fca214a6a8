//! Configuration tab: one control per field, chosen by the value's kind

use eframe::egui;
use tracing::debug;
use crate::core::{FieldEdit, FieldValue, SyncState};
use crate::theme::colors;
use super::ConsoleApp;

/// Render the control for one field; returns the edit if the operator changed it
fn field_control(
    ui: &mut egui::Ui,
    name: &str,
    value: &FieldValue,
    encodings: &[String],
) -> Option<FieldEdit> {
    match value {
        FieldValue::Bool(checked) => {
            let mut checked = *checked;
            ui.checkbox(&mut checked, "")
                .changed()
                .then(|| FieldEdit::Toggle(checked))
        }
        FieldValue::Choice(_) => {
            let current = value.display();
            let mut selected = current.clone();
            egui::ComboBox::from_id_salt(name)
                .selected_text(current.as_str())
                .show_ui(ui, |ui| {
                    for encoding in encodings {
                        ui.selectable_value(&mut selected, encoding.clone(), encoding.as_str());
                    }
                });
            (selected != current).then(|| FieldEdit::Choose(selected))
        }
        // Numbers are edited as text, like everything else
        FieldValue::Text(text) | FieldValue::Number(text) => {
            let mut text = text.clone();
            ui.add(egui::TextEdit::singleline(&mut text).desired_width(320.0))
                .changed()
                .then(|| FieldEdit::Text(text))
        }
        FieldValue::Raw(_) => {
            ui.label(egui::RichText::new(value.display()).color(colors::TEXT_MUTED).monospace());
            None
        }
    }
}

fn state_label(state: SyncState) -> &'static str {
    match state {
        SyncState::Idle => "",
        SyncState::Loading => "Loading...",
        SyncState::Ready => "",
        SyncState::Applying => "Applying...",
        SyncState::Reloading => "Reloading...",
    }
}

impl ConsoleApp {
    pub(crate) fn render_config_tab(&mut self, ui: &mut egui::Ui) {
        let Some(config) = self.console.config() else {
            return;
        };
        let state = config.state();
        let encodings = config.encodings();
        let fields: Vec<(&'static str, FieldValue)> = config
            .visible_fields()
            .into_iter()
            .map(|(name, value)| (name, value.clone()))
            .collect();

        let mut edits = Vec::new();
        egui::Grid::new("config_form")
            .num_columns(2)
            .spacing([16.0, 6.0])
            .show(ui, |ui| {
                for (name, value) in &fields {
                    ui.label(egui::RichText::new(*name).color(colors::TEXT_SECONDARY));
                    if let Some(edit) = field_control(ui, name, value, encodings) {
                        edits.push((*name, edit));
                    }
                    ui.end_row();
                }
            });

        for (name, edit) in edits {
            if let Err(e) = self.console.edit(name, edit) {
                debug!(field = name, error = %e, "Edit rejected");
            }
        }

        ui.add_space(12.0);

        ui.horizontal(|ui| {
            if ui.button("Apply").clicked() {
                self.console.apply();
            }
            ui.add_space(8.0);
            if ui.button("Refresh").clicked() {
                self.console.refresh();
            }
            ui.add_space(8.0);
            if ui.button("Reload").clicked() {
                self.console.reload();
            }
            ui.add_space(12.0);
            ui.label(egui::RichText::new(state_label(state)).color(colors::TEXT_MUTED));
        });
    }
}
