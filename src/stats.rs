//! Noise and bias statistics for the accelerometer and gyroscope channels.
//!
//! Noise is the population standard deviation of per-sample vector
//! magnitudes. Bias is the per-axis mean; for the accelerometer the mean is
//! taken after removing the 1 g reading on z.

use nalgebra::Vector3;
use ndarray::{Array1, Array2, Axis};
use serde::Serialize;

use crate::error::{AnalysisError, Result};
use crate::types::Session;

/// Added to the accelerometer z axis; the sensor reads -1 g on z at rest.
pub const GRAVITY_OFFSET_G: f64 = 1.0;

/// Noise and bias of one session.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatisticsResult {
    pub accel_noise: f64,
    pub accel_bias: Vector3<f64>,
    pub gyro_noise: f64,
    pub gyro_bias: Vector3<f64>,
}

impl StatisticsResult {
    pub fn accel_bias_length(&self) -> f64 {
        self.accel_bias.norm()
    }

    pub fn gyro_bias_length(&self) -> f64 {
        self.gyro_bias.norm()
    }
}

/// Euclidean norm of a vector given by its components.
pub fn vector_magnitude<'a, I>(components: I) -> f64
where
    I: IntoIterator<Item = &'a f64>,
{
    components.into_iter().map(|c| c * c).sum::<f64>().sqrt()
}

/// Copy of `accel` with [`GRAVITY_OFFSET_G`] added to the z column.
pub fn gravity_adjusted(accel: &Array2<f64>) -> Array2<f64> {
    let mut adjusted = accel.clone();
    adjusted
        .column_mut(2)
        .mapv_inplace(|z| z + GRAVITY_OFFSET_G);
    adjusted
}

/// Magnitude of every row of an N×3 array.
pub fn row_magnitudes(samples: &Array2<f64>) -> Array1<f64> {
    samples.map_axis(Axis(1), |row| vector_magnitude(row))
}

/// Standard deviation with zero degrees of freedom (divides by N).
pub fn population_std(values: &Array1<f64>) -> f64 {
    values.std(0.0)
}

/// Per-column mean of an N×3 array, or `None` when there are no rows.
pub fn column_mean(samples: &Array2<f64>) -> Option<Vector3<f64>> {
    let mean = samples.mean_axis(Axis(0))?;
    Some(Vector3::new(mean[0], mean[1], mean[2]))
}

/// Compute noise and bias for both channels of `session`.
///
/// Magnitudes use the raw accelerometer samples; only the bias is gravity
/// adjusted. An empty session yields [`AnalysisError::EmptyDataset`].
pub fn compute_statistics(session: &Session) -> Result<StatisticsResult> {
    if session.is_empty() {
        return Err(AnalysisError::EmptyDataset);
    }

    let adjusted_accel = gravity_adjusted(&session.accel);
    let accel_lengths = row_magnitudes(&session.accel);
    let accel_noise = population_std(&accel_lengths);
    let accel_bias = column_mean(&adjusted_accel).ok_or(AnalysisError::EmptyDataset)?;

    let gyro_lengths = row_magnitudes(&session.gyro);
    let gyro_noise = population_std(&gyro_lengths);
    let gyro_bias = column_mean(&session.gyro).ok_or(AnalysisError::EmptyDataset)?;

    log::debug!(
        "Statistics over {} samples: accel noise {:.6}, gyro noise {:.6}",
        session.len(),
        accel_noise,
        gyro_noise
    );

    Ok(StatisticsResult {
        accel_noise,
        accel_bias,
        gyro_noise,
        gyro_bias,
    })
}
