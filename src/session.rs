use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use ndarray::Array2;

use crate::error::{AnalysisError, Result};
use crate::types::{SensorRecord, Session};

/// What to do with a record that lacks `accelerometer`, `gyroscope` or `orientation`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ValidationPolicy {
    /// Drop the record and keep going.
    #[default]
    Lenient,
    /// Fail the whole session on the first incomplete record.
    Strict,
}

/// Load the raw record array from a session file (`.json` or `.json.gz`).
pub fn load_records(path: &Path) -> Result<Vec<SensorRecord>> {
    let file = File::open(path).map_err(|source| AnalysisError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let reader: Box<dyn Read> = if path.extension().map(|e| e == "gz").unwrap_or(false) {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    let records: Vec<SensorRecord> =
        serde_json::from_reader(reader).map_err(|source| AnalysisError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    log::info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

impl Session {
    /// Filter `records` through `policy` and unpack the survivors, in file order.
    pub fn from_records(records: &[SensorRecord], policy: ValidationPolicy) -> Result<Self> {
        let mut timestamps = Vec::with_capacity(records.len());
        let mut accel: Vec<[f64; 3]> = Vec::with_capacity(records.len());
        let mut gyro: Vec<[f64; 3]> = Vec::with_capacity(records.len());
        let mut pitch = Vec::with_capacity(records.len());
        let mut roll = Vec::with_capacity(records.len());
        let mut skipped_records = 0usize;

        for (index, record) in records.iter().enumerate() {
            let (acc, gyr, orient) =
                match (&record.accelerometer, &record.gyroscope, &record.orientation) {
                    (Some(a), Some(g), Some(o)) => (a, g, o),
                    _ => {
                        let field = record.missing_field().unwrap_or("orientation");
                        if policy == ValidationPolicy::Strict {
                            return Err(AnalysisError::InvalidRecord { index, field });
                        }
                        log::debug!("Skipping record {} (no {})", index, field);
                        skipped_records += 1;
                        continue;
                    }
                };

            let timestamp = record.timestamp.ok_or(AnalysisError::InvalidRecord {
                index,
                field: "timestamp",
            })?;

            timestamps.push(timestamp);
            accel.push(acc.to_array());
            gyro.push(gyr.to_array());
            pitch.push(orient.pitch);
            roll.push(orient.roll);
        }

        if skipped_records > 0 {
            log::warn!(
                "Dropped {} of {} records missing sensor data",
                skipped_records,
                records.len()
            );
        }

        Ok(Session {
            timestamps,
            accel: Array2::from(accel),
            gyro: Array2::from(gyro),
            pitch,
            roll,
            total_records: records.len(),
            skipped_records,
        })
    }

    /// Load and filter a session file in one step.
    pub fn load(path: &Path, policy: ValidationPolicy) -> Result<Self> {
        let records = load_records(path)?;
        Self::from_records(&records, policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AxisReading, Orientation};
    use std::io::Write;

    fn full_record(t: f64) -> SensorRecord {
        SensorRecord {
            timestamp: Some(t),
            accelerometer: Some(AxisReading::new(t, 0.0, -1.0)),
            gyroscope: Some(AxisReading::new(0.0, t, 0.0)),
            orientation: Some(Orientation { pitch: t * 0.1, roll: -t * 0.1 }),
        }
    }

    #[test]
    fn test_incomplete_records_are_skipped() {
        let mut no_gyro = full_record(2.0);
        no_gyro.gyroscope = None;
        let mut no_orientation = full_record(3.0);
        no_orientation.orientation = None;
        let records = vec![full_record(1.0), no_gyro, no_orientation, full_record(4.0)];

        let session = Session::from_records(&records, ValidationPolicy::Lenient).unwrap();

        assert_eq!(session.len(), 2);
        assert_eq!(session.skipped_records, 2);
        assert_eq!(session.len() + session.skipped_records, session.total_records);
        assert_eq!(session.timestamps, vec![1.0, 4.0]);
        assert_eq!(session.accel.dim(), (2, 3));
        assert_eq!(session.gyro.dim(), (2, 3));
        assert_eq!(session.pitch.len(), 2);
        assert_eq!(session.roll.len(), 2);
        assert_eq!(session.accel[[1, 0]], 4.0);
    }

    #[test]
    fn test_order_is_preserved_not_sorted() {
        let records = vec![full_record(5.0), full_record(1.0), full_record(3.0)];
        let session = Session::from_records(&records, ValidationPolicy::Lenient).unwrap();
        assert_eq!(session.timestamps, vec![5.0, 1.0, 3.0]);
        assert_eq!(session.gyro.column(1).to_vec(), vec![5.0, 1.0, 3.0]);
    }

    #[test]
    fn test_strict_policy_rejects_incomplete_record() {
        let mut no_accel = full_record(2.0);
        no_accel.accelerometer = None;
        let records = vec![full_record(1.0), no_accel];

        let err = Session::from_records(&records, ValidationPolicy::Strict).unwrap_err();
        match err {
            AnalysisError::InvalidRecord { index, field } => {
                assert_eq!(index, 1);
                assert_eq!(field, "accelerometer");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_valid_record_without_timestamp_fails() {
        let mut record = full_record(1.0);
        record.timestamp = None;
        let err = Session::from_records(&[record], ValidationPolicy::Lenient).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InvalidRecord { index: 0, field: "timestamp" }
        ));
    }

    #[test]
    fn test_load_records_ignores_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(
            &path,
            r#"[
                {"timestamp": 1.0, "accelerometer": {"x": 0.0, "y": 0.0, "z": -1.0},
                 "gyroscope": {"x": 0.1, "y": 0.0, "z": 0.0},
                 "orientation": {"pitch": 0.0, "roll": 0.0, "yaw": 1.5},
                 "magnetometer": {"x": 20.0}},
                {"timestamp": 2.0, "accelerometer": {"x": 0.0, "y": 0.0, "z": -1.0}}
            ]"#,
        )
        .unwrap();

        let session = Session::load(&path, ValidationPolicy::Lenient).unwrap();
        assert_eq!(session.len(), 1);
        assert_eq!(session.total_records, 2);
    }

    #[test]
    fn test_load_gzipped_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json.gz");
        let body = r#"[{"timestamp": 0.5, "accelerometer": {"x": 1.0, "y": 2.0, "z": 3.0},
            "gyroscope": {"x": 0.0, "y": 0.0, "z": 0.0},
            "orientation": {"pitch": 0.2, "roll": 0.3}}]"#;
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(body.as_bytes()).unwrap();
        std::fs::write(&path, encoder.finish().unwrap()).unwrap();

        let session = Session::load(&path, ValidationPolicy::Lenient).unwrap();
        assert_eq!(session.timestamps, vec![0.5]);
        assert_eq!(session.accel.row(0).to_vec(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_null_sub_object_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("null.json");
        std::fs::write(
            &path,
            r#"[{"timestamp": 1.0, "accelerometer": null,
                 "gyroscope": {"x": 0.0, "y": 0.0, "z": 0.0},
                 "orientation": {"pitch": 0.0, "roll": 0.0}},
                {"timestamp": 2.0, "accelerometer": {"x": 0.0, "y": 0.0, "z": -1.0},
                 "gyroscope": {"x": 0.0, "y": 0.0, "z": 0.0},
                 "orientation": {"pitch": 0.0, "roll": 0.0}}]"#,
        )
        .unwrap();

        let err = Session::load(&path, ValidationPolicy::Lenient).unwrap_err();
        assert!(matches!(err, AnalysisError::Parse { .. }));
    }

    #[test]
    fn test_absent_key_still_deserializes_as_none() {
        let record: SensorRecord =
            serde_json::from_str(r#"{"timestamp": 3.0, "orientation": {"pitch": 0.1, "roll": 0.2}}"#)
                .unwrap();
        assert_eq!(record.timestamp, Some(3.0));
        assert!(record.accelerometer.is_none());
        assert!(record.gyroscope.is_none());
        assert_eq!(record.missing_field(), Some("accelerometer"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_records(Path::new("definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, AnalysisError::Io { .. }));
    }

    #[test]
    fn test_non_array_top_level_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("object.json");
        std::fs::write(&path, r#"{"readings": []}"#).unwrap();
        let err = load_records(&path).unwrap_err();
        assert!(matches!(err, AnalysisError::Parse { .. }));
    }

    #[test]
    fn test_malformed_sub_object_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(
            &path,
            r#"[{"timestamp": 1.0, "accelerometer": {"x": 0.0, "y": 0.0},
                 "gyroscope": {"x": 0.0, "y": 0.0, "z": 0.0},
                 "orientation": {"pitch": 0.0, "roll": 0.0}}]"#,
        )
        .unwrap();
        assert!(matches!(
            load_records(&path).unwrap_err(),
            AnalysisError::Parse { .. }
        ));
    }
}
