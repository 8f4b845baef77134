use std::{
    fs::File,
    path::{Path, PathBuf},
};

use csv::{ReaderBuilder, StringRecord, Trim};
use itertools::Itertools;
use log::debug;

use crate::LiveGraphError;

use super::{REQUIRED_COLUMNS, TelemetryRecord};

/// Result of asking a source for its newest record.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceRead {
    Record(TelemetryRecord),
    /// The source exists but nothing has been written to it yet
    NoData,
}

/// Something that can be polled for the most recent telemetry record.
pub trait TelemetrySource {
    /// Read the newest record available.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read, if its layout lacks any of the
    /// required columns, or if the newest record cannot be coerced into a
    /// [`TelemetryRecord`].
    fn latest(&mut self) -> Result<SourceRead, LiveGraphError>;

    /// Human readable name of the source, used in logs and the window status line.
    fn describe(&self) -> String;
}

/// Reads the newest row of a comma separated file with a header row.
///
/// The whole file is parsed on every call since another process appends to it
/// while we poll. Only the last row is kept in memory.
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn path_string(&self) -> String {
        self.path.display().to_string()
    }

    /// Position of every required column in the header, in [`REQUIRED_COLUMNS`] order.
    fn column_positions(headers: &StringRecord) -> Result<[usize; 9], LiveGraphError> {
        let mut positions = [0usize; 9];
        let mut missing = Vec::new();
        for (slot, column) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
            match headers.iter().position(|h| h == column) {
                Some(position) => *slot = position,
                None => missing.push(column),
            }
        }

        if !missing.is_empty() {
            return Err(LiveGraphError::MissingColumns {
                columns: missing.iter().join(", "),
            });
        }
        Ok(positions)
    }
}

impl TelemetrySource for CsvFileSource {
    fn latest(&mut self) -> Result<SourceRead, LiveGraphError> {
        let file = File::open(&self.path).map_err(|e| LiveGraphError::SourceUnavailable {
            path: self.path_string(),
            source: e,
        })?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(file);

        let headers = reader
            .headers()
            .map_err(|e| LiveGraphError::MalformedSource {
                path: self.path_string(),
                source: e,
            })?
            .clone();
        if headers.is_empty() {
            debug!("{} is empty", self.path_string());
            return Ok(SourceRead::NoData);
        }
        let positions = Self::column_positions(&headers)?;

        // swap buffers so we only ever hold the row just read and the one before it
        let mut current = StringRecord::new();
        let mut latest = StringRecord::new();
        let mut rows = 0usize;
        while reader
            .read_record(&mut current)
            .map_err(|e| LiveGraphError::MalformedSource {
                path: self.path_string(),
                source: e,
            })?
        {
            std::mem::swap(&mut current, &mut latest);
            rows += 1;
        }

        if rows == 0 {
            debug!("{} has a header but no rows yet", self.path_string());
            return Ok(SourceRead::NoData);
        }

        // earlier rows may be ragged, only the one we show has to be complete
        if latest.len() < headers.len() {
            return Err(LiveGraphError::TruncatedRow {
                path: self.path_string(),
                row: rows,
                fields: latest.len(),
                expected: headers.len(),
            });
        }

        let cells = positions.map(|p| latest.get(p).unwrap_or(""));
        debug!("Read row {} from {}", rows, self.path_string());
        Ok(SourceRead::Record(TelemetryRecord::from_cells(cells)?))
    }

    fn describe(&self) -> String {
        self.path_string()
    }
}

/// Replays a fixed list of records, one per call to [`TelemetrySource::latest`].
///
/// Useful to drive the monitor in tests or offline demos without a ground station
/// writing to disk.
pub struct MockTelemetrySource {
    cur_tick: usize,
    records: Vec<TelemetryRecord>,
}

impl MockTelemetrySource {
    pub fn from_records(records: Vec<TelemetryRecord>) -> Self {
        Self {
            cur_tick: 0,
            records,
        }
    }
}

impl TelemetrySource for MockTelemetrySource {
    fn latest(&mut self) -> Result<SourceRead, LiveGraphError> {
        if self.records.is_empty() {
            return Ok(SourceRead::NoData);
        }
        let record = self
            .records
            .get(self.cur_tick)
            .cloned()
            .ok_or(LiveGraphError::SourceExhausted)?;
        self.cur_tick += 1;
        Ok(SourceRead::Record(record))
    }

    fn describe(&self) -> String {
        format!("mock source ({} records)", self.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str =
        "TEAM_ID,MISSION_TIME,PACKET_COUNT,PACKET_TYPE,MODE,PAYLOAD_RELEASED,ALTITUDE,TEMP,VOLTAGE";

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        file.flush().unwrap();
        file
    }

    fn read(file: &NamedTempFile) -> Result<SourceRead, LiveGraphError> {
        CsvFileSource::new(file.path()).latest()
    }

    #[test]
    fn test_latest_row_is_returned() {
        let file = csv_file(&format!(
            "{HEADER}\n1001,00:00:01,1,C,F,N,10.5,20.1,5.0\n1001,00:00:02,2,C,F,Y,12,20.2,4.9\n"
        ));

        let SourceRead::Record(record) = read(&file).unwrap() else {
            panic!("Expected a record");
        };
        assert_eq!(record.mission_time, "00:00:02");
        assert_eq!(record.packet_count, "2");
        assert_eq!(record.payload_released, "Y");
        assert_eq!(record.altitude, 12.);
        assert_eq!(record.voltage, 4.9);
    }

    #[test]
    fn test_columns_located_by_name() {
        let file = csv_file(
            "ALTITUDE,EXTRA,VOLTAGE,TEMP,MODE,TEAM_ID,PACKET_TYPE,PACKET_COUNT,MISSION_TIME,PAYLOAD_RELEASED\n\
             250.75,x,3.3,-4,S,2002,C,77,00:10:00,N\n",
        );

        let SourceRead::Record(record) = read(&file).unwrap() else {
            panic!("Expected a record");
        };
        assert_eq!(record.team_id, "2002");
        assert_eq!(record.packet_count, "77");
        assert_eq!(record.altitude, 250.75);
        assert_eq!(record.temperature, -4.);
    }

    #[test]
    fn test_cells_are_trimmed() {
        let file = csv_file(&format!("{HEADER}\n 1001 , 00:00:01 ,1,C,F,N, 102 ,20,5\n"));

        let SourceRead::Record(record) = read(&file).unwrap() else {
            panic!("Expected a record");
        };
        assert_eq!(record.team_id, "1001");
        assert_eq!(record.altitude, 102.);
    }

    #[test]
    fn test_header_only_is_no_data() {
        let file = csv_file(&format!("{HEADER}\n"));
        assert_eq!(read(&file).unwrap(), SourceRead::NoData);
    }

    #[test]
    fn test_empty_file_is_no_data() {
        let file = csv_file("");
        assert_eq!(read(&file).unwrap(), SourceRead::NoData);
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = CsvFileSource::new(dir.path().join("telemetry.csv"));
        assert!(matches!(
            source.latest(),
            Err(LiveGraphError::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn test_missing_columns_are_reported() {
        let file = csv_file(
            "TEAM_ID,MISSION_TIME,PACKET_COUNT,PACKET_TYPE,MODE,PAYLOAD_RELEASED,ALTITUDE\n\
             1001,00:00:01,1,C,F,N,10\n",
        );
        match read(&file) {
            Err(LiveGraphError::MissingColumns { columns }) => {
                assert_eq!(columns, "TEMP, VOLTAGE");
            }
            other => panic!("Expected MissingColumns error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_columns_fail_even_without_rows() {
        let file = csv_file("TEAM_ID,ALTITUDE\n");
        assert!(matches!(
            read(&file),
            Err(LiveGraphError::MissingColumns { .. })
        ));
    }

    #[test]
    fn test_truncated_last_row_fails() {
        let file = csv_file(&format!(
            "{HEADER}\n1001,00:00:01,1,C,F,N,10.5,20.1,5.0\n1001,00:00:02,2\n"
        ));
        match read(&file) {
            Err(LiveGraphError::TruncatedRow {
                row,
                fields,
                expected,
                ..
            }) => {
                assert_eq!(row, 2);
                assert_eq!(fields, 3);
                assert_eq!(expected, 9);
            }
            other => panic!("Expected TruncatedRow error, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_earlier_row_is_skipped() {
        let file = csv_file(&format!(
            "{HEADER}\n\
             1001,00:00:01,1,C,F,N,10.5,20.1,5.0\n\
             1001,00:00:02,2\n\
             1001,00:00:03,3,C,F,N,30.5,20.3,4.9\n\
             1001,00:00:04,4,C,F,N,40.5,20.4,4.8\n"
        ));

        let SourceRead::Record(record) = read(&file).unwrap() else {
            panic!("Expected a record");
        };
        assert_eq!(record.packet_count, "4");
        assert_eq!(record.altitude, 40.5);
    }

    #[test]
    fn test_extra_fields_in_last_row_are_ignored() {
        let file = csv_file(&format!("{HEADER}\n1001,00:00:01,1,C,F,N,10.5,20.1,5.0,extra\n"));

        let SourceRead::Record(record) = read(&file).unwrap() else {
            panic!("Expected a record");
        };
        assert_eq!(record.voltage, 5.);
    }

    #[test]
    fn test_non_numeric_altitude_fails() {
        let file = csv_file(&format!("{HEADER}\n1001,00:00:01,1,C,F,N,high,20.1,5.0\n"));
        assert!(matches!(
            read(&file),
            Err(LiveGraphError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_mock_source_replays_then_exhausts() {
        let mut source = MockTelemetrySource::from_records(vec![TelemetryRecord {
            altitude: 1.,
            ..Default::default()
        }]);
        assert!(matches!(source.latest(), Ok(SourceRead::Record(_))));
        assert!(matches!(
            source.latest(),
            Err(LiveGraphError::SourceExhausted)
        ));
    }

    #[test]
    fn test_empty_mock_source_has_no_data() {
        let mut source = MockTelemetrySource::from_records(vec![]);
        assert_eq!(source.latest().unwrap(), SourceRead::NoData);
    }
}
