pub mod monitor;
pub mod series;
pub mod source;
pub mod summary;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::LiveGraphError;

pub use monitor::{PlotFrame, RefreshOutcome, TelemetryMonitor};
pub use series::{Retention, SeriesBuffer};
pub use source::{CsvFileSource, MockTelemetrySource, SourceRead, TelemetrySource};

pub const TEAM_ID: &str = "TEAM_ID";
pub const MISSION_TIME: &str = "MISSION_TIME";
pub const PACKET_COUNT: &str = "PACKET_COUNT";
pub const PACKET_TYPE: &str = "PACKET_TYPE";
pub const MODE: &str = "MODE";
pub const PAYLOAD_RELEASED: &str = "PAYLOAD_RELEASED";
pub const ALTITUDE: &str = "ALTITUDE";
pub const TEMP: &str = "TEMP";
pub const VOLTAGE: &str = "VOLTAGE";

/// Columns the backing file must carry, in the order the record stores them.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    TEAM_ID,
    MISSION_TIME,
    PACKET_COUNT,
    PACKET_TYPE,
    MODE,
    PAYLOAD_RELEASED,
    ALTITUDE,
    TEMP,
    VOLTAGE,
];

/// A single telemetry packet as it appears in the last row of the backing file.
///
/// Text fields keep the raw cell content so the summary shows exactly what the
/// ground station wrote. Only the three measurements are coerced to numbers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TelemetryRecord {
    pub team_id: String,
    pub mission_time: String,
    pub packet_count: String,
    pub packet_type: String,
    pub mode: String,
    pub payload_released: String,
    /// Meters
    pub altitude: f64,
    /// Degrees Celsius
    pub temperature: f64,
    /// Volts
    pub voltage: f64,
}

impl TelemetryRecord {
    /// Builds a record from the raw cells of the required columns, in
    /// [`REQUIRED_COLUMNS`] order.
    pub fn from_cells(cells: [&str; 9]) -> Result<Self, LiveGraphError> {
        let [
            team_id,
            mission_time,
            packet_count,
            packet_type,
            mode,
            payload_released,
            altitude,
            temperature,
            voltage,
        ] = cells;
        Ok(Self {
            team_id: team_id.to_string(),
            mission_time: mission_time.to_string(),
            packet_count: packet_count.to_string(),
            packet_type: packet_type.to_string(),
            mode: mode.to_string(),
            payload_released: payload_released.to_string(),
            altitude: parse_measurement(ALTITUDE, altitude)?,
            temperature: parse_measurement(TEMP, temperature)?,
            voltage: parse_measurement(VOLTAGE, voltage)?,
        })
    }
}

fn parse_measurement(field: &str, value: &str) -> Result<f64, LiveGraphError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| LiveGraphError::InvalidNumber {
            field: field.to_string(),
            value: value.to_string(),
        })
}

/// What the x coordinate of each plotted sample represents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TimeAxis {
    /// Wall-clock seconds since the first successful refresh
    #[default]
    Elapsed,
    /// Seconds of mission time since the first sample
    MissionTime,
    /// Number of successful refreshes before this one
    Tick,
}

/// Parses a mission time cell into seconds.
///
/// Accepts `hh:mm:ss`, `hh:mm:ss.fff`, `mm:ss` or a plain number of seconds.
pub fn parse_mission_time(value: &str) -> Result<f64, LiveGraphError> {
    let invalid = || LiveGraphError::InvalidMissionTime {
        value: value.to_string(),
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid());
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.len() > 3 {
        return Err(invalid());
    }

    let mut seconds = 0.;
    let last = parts.len() - 1;
    for (i, part) in parts.iter().enumerate() {
        let component = part.parse::<f64>().map_err(|_| invalid())?;
        if !component.is_finite() || component < 0. {
            return Err(invalid());
        }
        // only the trailing component may carry a fraction, and it must stay below a minute
        if i != last && component.fract() != 0. {
            return Err(invalid());
        }
        if i != 0 && component >= 60. {
            return Err(invalid());
        }
        seconds = seconds * 60. + component;
    }
    Ok(seconds)
}
