pub mod config;
mod telemetry_view;

use std::time::Instant;

use chrono::Local;
use egui::{Color32, Visuals, style::Widgets};
use egui_plot::PlotPoint;
use log::{info, warn};

use crate::{
    LiveGraphError,
    telemetry::{CsvFileSource, PlotFrame, RefreshOutcome, TelemetryMonitor},
};

pub const WINDOW_TITLE: &str = "Live Graph";

pub(crate) const PALETTE_BLACK: Color32 = Color32::from_rgb(12, 12, 12);
pub(crate) const PALETTE_GREY: Color32 = Color32::from_rgb(28, 28, 28);
pub(crate) const PALETTE_ORANGE: Color32 = Color32::from_rgb(242, 97, 63);

/// `LiveGraphApp` shows the latest telemetry packet and plots altitude over time.
///
/// # Fields
///
/// * `monitor` - Polls the telemetry file and keeps the series and summary.
/// * `status` - Why the last refresh did not update the display, if it did not.
/// * `plot` - The last rendered frame, converted once for the plot canvas.
///
/// # Methods
///
/// * `new` - Creates a new instance of `LiveGraphApp` and starts polling.
/// * `update` - Runs the due refresh and render ticks, then draws the window.
pub struct LiveGraphApp {
    monitor: TelemetryMonitor<CsvFileSource>,
    status: Option<String>,
    plot: PlotCache,
}

/// Plot points of the last rendered frame, borrowed by the canvas on every repaint.
#[derive(Debug, Default)]
pub(crate) struct PlotCache {
    points: Vec<PlotPoint>,
    generation: u64,
}

impl PlotCache {
    /// Converts `frame` unless it is the frame already held. Returns whether it did.
    pub(crate) fn sync(&mut self, frame: &PlotFrame) -> bool {
        if frame.generation == self.generation {
            return false;
        }
        self.points.clear();
        self.points
            .extend(frame.points.iter().map(|&[x, y]| PlotPoint::new(x, y)));
        self.generation = frame.generation;
        true
    }

    pub(crate) fn points(&self) -> &[PlotPoint] {
        &self.points
    }
}

impl LiveGraphApp {
    pub fn new(
        mut monitor: TelemetryMonitor<CsvFileSource>,
        cc: &eframe::CreationContext<'_>,
    ) -> Self {
        let default_visuals = Visuals {
            dark_mode: true,
            panel_fill: PALETTE_BLACK,
            faint_bg_color: PALETTE_GREY,
            extreme_bg_color: PALETTE_BLACK,
            widgets: Widgets::dark(),
            ..Visuals::dark()
        };
        cc.egui_ctx.set_visuals(default_visuals);

        monitor.start(Instant::now());
        Self {
            monitor,
            status: None,
            plot: PlotCache::default(),
        }
    }

    fn handle_refresh(&mut self, result: Result<RefreshOutcome, LiveGraphError>) {
        let status = match result {
            Ok(RefreshOutcome::Updated) => None,
            Ok(RefreshOutcome::NoData) => Some(format!(
                "Waiting for data in {}",
                self.monitor.source().path().display()
            )),
            Err(e) => Some(format!("Refresh failed: {}", e.chain_message())),
        };

        // only log transitions, a missing file would otherwise warn every second
        if status != self.status {
            match &status {
                Some(message) => warn!("{}", message),
                None if self.status.is_some() => info!("Telemetry updates resumed"),
                None => {}
            }
        }
        self.status = status;
    }
}

impl eframe::App for LiveGraphApp {
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.monitor.stop();
        info!(
            "Closing with {} samples plotted",
            self.monitor.series().len()
        );
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let report = self.monitor.tick(Instant::now(), Local::now());
        if let Some(result) = report.refresh {
            self.handle_refresh(result);
        }

        if report.rendered {
            self.plot.sync(self.monitor.frame());
        }
        self.telemetry_view(ctx);

        // sleep until the next refresh or render is due instead of spinning
        if let Some(wait) = self.monitor.time_until_next_tick(Instant::now()) {
            ctx.request_repaint_after(wait);
        }
    }
}
