use ndarray::Array2;
use serde::{Deserialize, Deserializer, Serialize};

/// Three-axis vector reading, as logged for both accelerometer and gyroscope.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisReading {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl AxisReading {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        AxisReading { x, y, z }
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// Orientation estimate produced upstream by the fusion filter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub pitch: f64,
    pub roll: f64,
}

/// One entry of a recorded session file.
///
/// Every key is optional on the wire; whether a record is usable is decided
/// by [`crate::session::ValidationPolicy`], not by deserialization. A key that
/// is present must hold a value: `null` is a parse error, not an absent key.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorRecord {
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub accelerometer: Option<AxisReading>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub gyroscope: Option<AxisReading>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
}

// Only runs for keys that are present, so `null` reaches `T` and is rejected there
fn non_null<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl SensorRecord {
    /// Name of the first required sub-object this record lacks, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.accelerometer.is_none() {
            Some("accelerometer")
        } else if self.gyroscope.is_none() {
            Some("gyroscope")
        } else if self.orientation.is_none() {
            Some("orientation")
        } else {
            None
        }
    }
}

/// Valid records of one input file, unpacked into parallel arrays.
///
/// Rows keep the order of the source file. `accel` and `gyro` are N×3 with
/// columns x, y, z.
#[derive(Clone, Debug)]
pub struct Session {
    pub timestamps: Vec<f64>,
    pub accel: Array2<f64>,
    pub gyro: Array2<f64>,
    pub pitch: Vec<f64>,
    pub roll: Vec<f64>,
    pub total_records: usize,
    pub skipped_records: usize,
}

impl Session {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}
