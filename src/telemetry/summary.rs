use chrono::{DateTime, Local};

use super::TelemetryRecord;

/// Placeholder shown before the first record has been read.
pub const WAITING_FOR_DATA: &str = "Waiting for telemetry...";

/// Formats the text summary of a record.
///
/// The layout is consumed by operators and scripts scraping the window, so the
/// labels and the two-decimal precision of the measurements must not change.
pub fn format_summary(record: &TelemetryRecord, next_update: &DateTime<Local>) -> String {
    format!(
        "Team ID: {}\n\
         Mission Time: {}\n\
         Packet Count: {}\n\
         Packet Type: {}\n\
         Mode: {}\n\
         Payload Released: {}\n\
         Altitude: {:.2} m\n\
         Temperature: {:.2} C\n\
         Voltage: {:.2} V\n\
         Next update: {}",
        record.team_id,
        record.mission_time,
        record.packet_count,
        record.packet_type,
        record.mode,
        record.payload_released,
        record.altitude,
        record.temperature,
        record.voltage,
        next_update.format("%H:%M:%S"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record() -> TelemetryRecord {
        TelemetryRecord {
            team_id: "1001".to_string(),
            mission_time: "13:45:02".to_string(),
            packet_count: "42".to_string(),
            packet_type: "C".to_string(),
            mode: "F".to_string(),
            payload_released: "N".to_string(),
            altitude: 102.,
            temperature: 21.4567,
            voltage: 4.9,
        }
    }

    #[test]
    fn test_summary_layout() {
        let next_update = Local.with_ymd_and_hms(2024, 6, 1, 9, 5, 7).unwrap();
        let summary = format_summary(&record(), &next_update);
        assert_eq!(
            summary,
            "Team ID: 1001\n\
             Mission Time: 13:45:02\n\
             Packet Count: 42\n\
             Packet Type: C\n\
             Mode: F\n\
             Payload Released: N\n\
             Altitude: 102.00 m\n\
             Temperature: 21.46 C\n\
             Voltage: 4.90 V\n\
             Next update: 09:05:07"
        );
    }

    #[test]
    fn test_summary_has_ten_lines() {
        let next_update = Local.with_ymd_and_hms(2024, 6, 1, 23, 59, 59).unwrap();
        let summary = format_summary(&record(), &next_update);
        assert_eq!(summary.lines().count(), 10);
        assert!(summary.ends_with("Next update: 23:59:59"));
    }
}
