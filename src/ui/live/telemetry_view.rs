use egui::{Color32, Layout, RichText};
use egui_plot::{Line, Plot, PlotPoints};
use std::time::Instant;

use super::{LiveGraphApp, PALETTE_ORANGE};

pub(crate) const PLOT_TITLE: &str = "Altitude vs Time";
pub(crate) const X_AXIS_LABEL: &str = "Time (s)";
pub(crate) const Y_AXIS_LABEL: &str = "Altitude (m)";

impl LiveGraphApp {
    pub(crate) fn telemetry_view(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("telemetry").show(ctx, |ui| {
            ui.add_space(4.);
            ui.with_layout(Layout::left_to_right(egui::Align::TOP), |ui| {
                ui.label(RichText::new(self.monitor.summary()).monospace());

                ui.with_layout(Layout::right_to_left(egui::Align::TOP), |ui| {
                    let paused = self.monitor.is_refresh_paused();
                    if ui.button(if paused { "Resume" } else { "Pause" }).clicked() {
                        self.monitor.set_refresh_paused(!paused, Instant::now());
                    }
                });
            });
            if let Some(status) = &self.status {
                ui.colored_label(PALETTE_ORANGE, status);
            }
            ui.add_space(4.);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| ui.heading(PLOT_TITLE));

            let points = PlotPoints::Borrowed(self.plot.points());
            Plot::new("altitude")
                .x_axis_label(X_AXIS_LABEL)
                .y_axis_label(Y_AXIS_LABEL)
                .show_background(false)
                .include_x(0.)
                .include_y(0.)
                .show(ui, |plot_ui| {
                    plot_ui.line(Line::new("Altitude", points).color(Color32::RED));
                });
        });
    }
}
