// Library interface for livegraph
// This allows integration tests to access internal modules

pub mod errors;
pub mod schedule;
pub mod telemetry;
pub mod ui;

// Re-export commonly used types
pub use errors::LiveGraphError;
pub use schedule::PeriodicTask;
pub use telemetry::{
    CsvFileSource, PlotFrame, RefreshOutcome, Retention, SeriesBuffer, SourceRead,
    TelemetryMonitor, TelemetryRecord, TelemetrySource, TimeAxis,
};
