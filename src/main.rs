use std::path::PathBuf;

use chrono::Local;
use clap::Parser;
use livegraph::{
    CsvFileSource, LiveGraphError, Retention, TelemetryMonitor, TimeAxis,
    ui::live::{LiveGraphApp, WINDOW_TITLE, config::AppConfig},
};
use log::{error, info};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Telemetry CSV file appended to by the ground station
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Milliseconds between two reads of the telemetry file
    #[arg(long)]
    refresh_ms: Option<u64>,

    /// Milliseconds between two redraws of the plot
    #[arg(long)]
    render_ms: Option<u64>,

    /// What the x axis of the plot measures
    #[arg(long, value_enum)]
    time_axis: Option<TimeAxis>,

    /// Only keep the newest N samples
    #[arg(long, conflicts_with = "max_span_s")]
    max_samples: Option<usize>,

    /// Only keep samples from the last S seconds
    #[arg(long)]
    max_span_s: Option<f64>,

    /// Config file to use instead of the one in the user config directory
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Args {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(file) = &self.file {
            config.telemetry_file = file.clone();
        }
        if let Some(refresh_ms) = self.refresh_ms {
            config.refresh_rate_ms = refresh_ms;
        }
        if let Some(render_ms) = self.render_ms {
            config.render_rate_ms = render_ms;
        }
        if let Some(time_axis) = self.time_axis {
            config.time_axis = time_axis;
        }
        if let Some(max_samples) = self.max_samples {
            config.retention = Retention::Count(max_samples);
        }
        if let Some(max_span_s) = self.max_span_s {
            config.retention = Retention::Span(max_span_s);
        }
    }
}

fn live(args: &Args) -> Result<(), LiveGraphError> {
    let mut app_config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::from_local_file()?.unwrap_or_default(),
    };
    args.apply(&mut app_config);
    app_config.validate()?;
    info!("Starting with {:?}", app_config);

    let monitor = TelemetryMonitor::new(
        CsvFileSource::new(app_config.telemetry_file.clone()),
        app_config.monitor_settings(),
        Local::now(),
    );

    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = native_options
        .viewport
        .with_title(WINDOW_TITLE)
        .with_inner_size(app_config.window_size)
        .with_position(app_config.window_position);

    eframe::run_native(
        WINDOW_TITLE,
        native_options,
        Box::new(|cc| Ok(Box::new(LiveGraphApp::new(monitor, cc)))),
    )
    .map_err(|e| LiveGraphError::WindowError {
        reason: e.to_string(),
    })
}

fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let args = Args::parse();
    ctrlc::set_handler(move || {
        println!("Exiting...");
        std::process::exit(0);
    })
    .expect("Could not set Ctrl-C handler");

    if let Err(e) = live(&args) {
        error!("{}", e.chain_message());
        eprintln!("Error: {}", e.chain_message());
        std::process::exit(1);
    }
}
