use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{AnalysisError, Result};
use crate::stats::StatisticsResult;

/// Console report for one session, six decimals throughout.
pub fn format_report(result: &StatisticsResult) -> String {
    let a = &result.accel_bias;
    let g = &result.gyro_bias;
    format!(
        "\n--- IMU Analysis Results ---\n\
         \nAccelerometer:\n\
         \x20 Noise (std of vector lengths): {:.6}\n\
         \x20 Bias (average of vectors, gravity adjusted): [{:.6}, {:.6}, {:.6}]\n\
         \x20 Bias vector length: {:.6}\n\
         \nGyroscope:\n\
         \x20 Noise (std of vector lengths): {:.6}\n\
         \x20 Bias (average of vectors): [{:.6}, {:.6}, {:.6}]\n\
         \x20 Bias vector length: {:.6}\n",
        result.accel_noise,
        a.x,
        a.y,
        a.z,
        result.accel_bias_length(),
        result.gyro_noise,
        g.x,
        g.y,
        g.z,
        result.gyro_bias_length(),
    )
}

pub fn print_report(result: &StatisticsResult) {
    print!("{}", format_report(result));
}

/// Per-file outcome of a batch run, exported with `--summary-json`.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub input: String,
    pub valid_records: usize,
    pub skipped_records: usize,
    pub chart: PathBuf,
    pub statistics: StatisticsResult,
}

/// Write all summaries to `path` as a pretty-printed JSON array.
pub fn write_summary_json(path: &Path, summaries: &[SessionSummary]) -> Result<()> {
    let file = File::create(path).map_err(|source| AnalysisError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, summaries)?;
    writer.flush().map_err(|source| AnalysisError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Wrote {} session summaries to {}", summaries.len(), path.display());
    Ok(())
}
