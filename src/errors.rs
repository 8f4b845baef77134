// Error types for livegraph

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum LiveGraphError {
    // Errors while reading the backing telemetry file
    #[snafu(display("Telemetry file {path} is not available"))]
    SourceUnavailable { path: String, source: io::Error },
    #[snafu(display("Telemetry file {path} is malformed"))]
    MalformedSource { path: String, source: csv::Error },
    #[snafu(display(
        "Row {row} of {path} has {fields} fields, the header has {expected}"
    ))]
    TruncatedRow {
        path: String,
        row: usize,
        fields: usize,
        expected: usize,
    },
    #[snafu(display("Telemetry file is missing required columns: {columns}"))]
    MissingColumns { columns: String },
    #[snafu(display("Field {field} is not a number: '{value}'"))]
    InvalidNumber { field: String, value: String },
    #[snafu(display("Mission time is not a time of day or seconds value: '{value}'"))]
    InvalidMissionTime { value: String },
    #[snafu(display("Telemetry source exhausted"))]
    SourceExhausted,

    // UI errors
    #[snafu(display("Could not open the telemetry window: {reason}"))]
    WindowError { reason: String },

    // Config management errors
    #[snafu(display("Invalid configuration: {reason}"))]
    InvalidConfig { reason: String },
    #[snafu(display("Error reading config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error parsing config file"))]
    ConfigParseError { source: serde_json::Error },
}

impl LiveGraphError {
    /// Error message followed by the messages of every underlying cause.
    pub fn chain_message(&self) -> String {
        let mut message = self.to_string();
        let mut cause = std::error::Error::source(self);
        while let Some(e) = cause {
            message.push_str(": ");
            message.push_str(&e.to_string());
            cause = e.source();
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_message_includes_cause() {
        let error = LiveGraphError::SourceUnavailable {
            path: "telemetry.csv".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(
            error.chain_message(),
            "Telemetry file telemetry.csv is not available: no such file"
        );
    }

    #[test]
    fn test_chain_message_without_cause() {
        let error = LiveGraphError::MissingColumns {
            columns: "TEMP".to_string(),
        };
        assert_eq!(
            error.chain_message(),
            "Telemetry file is missing required columns: TEMP"
        );
    }
}
