//! Statistics tab: rate charts over the trailing window

use eframe::egui;
use crate::core::finite_runs;
use crate::theme::{colors, series_color};
use crate::time::now_millis;
use super::ConsoleApp;

/// Human-readable rate (1234 → "1.2k", 5000000 → "5.0M")
fn format_rate(r: f64) -> String {
    if r >= 1_000_000.0 {
        format!("{:.1}M", r / 1_000_000.0)
    } else if r >= 10_000.0 {
        format!("{:.1}k", r / 1_000.0)
    } else {
        format!("{:.0}", r)
    }
}

/// Offset from now as "-m:ss"
fn format_offset(secs: f64) -> String {
    let total = (-secs).max(0.0).round() as u64;
    format!("-{}:{:02}", total / 60, total % 60)
}

impl ConsoleApp {
    pub(crate) fn render_stats_tab(&self, ui: &mut egui::Ui) {
        use egui_plot::{HPlacement, Legend, Line, Plot, PlotPoints, Points};

        // Axis ends at render time, so it scrolls between samples too
        let now = now_millis();
        let Some(chart) = self.console.chart(now) else {
            return;
        };
        let span = chart.span_secs();

        ui.horizontal(|ui| {
            for dataset in &chart.datasets {
                let latest = dataset
                    .latest_rate()
                    .map_or_else(|| "-".to_string(), format_rate);
                ui.colored_label(
                    series_color(dataset.color),
                    egui::RichText::new(format!("{}: {}", dataset.name, latest)).monospace(),
                );
                ui.add_space(12.0);
            }
        });

        ui.add_space(4.0);

        Plot::new("rates")
            .legend(Legend::default())
            .show_grid(true)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .set_margin_fraction(egui::vec2(0.0, 0.05))
            .include_x(-span)
            .include_x(0.0)
            .include_y(0.0)
            .y_axis_position(HPlacement::Right)
            .x_axis_formatter(move |mark, _range| {
                // The oldest tick sits on the left edge and collides with it
                if mark.value <= -span + mark.step_size * 0.5 {
                    String::new()
                } else {
                    format_offset(mark.value)
                }
            })
            .label_formatter(|name, value| {
                if name.is_empty() {
                    format_offset(value.x)
                } else {
                    format!("{}\n{} at {}", name, format_rate(value.y), format_offset(value.x))
                }
            })
            .show(ui, |plot_ui| {
                for dataset in &chart.datasets {
                    let color = series_color(dataset.color);
                    for mut run in finite_runs(&dataset.points, chart.now) {
                        // Retention slack keeps a little history left of the axis
                        run.retain(|p| p[0] >= -span);
                        if run.is_empty() {
                            continue;
                        }
                        plot_ui.points(
                            Points::new(PlotPoints::from(run.clone()))
                                .color(color)
                                .radius(1.5)
                                .name(dataset.name),
                        );
                        plot_ui.line(
                            Line::new(PlotPoints::from(run))
                                .color(color)
                                .width(1.5)
                                .name(dataset.name),
                        );
                    }
                }
            });

        if chart.labels.is_empty() {
            ui.label(egui::RichText::new("No samples yet").color(colors::TEXT_MUTED));
        }
    }
}
