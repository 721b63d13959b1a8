//! Noise and bias analysis for recorded IMU sessions, with a pitch/roll chart.

use std::path::{Path, PathBuf};

pub mod error;
pub mod plot;
pub mod report;
pub mod session;
pub mod stats;
pub mod types;

pub use error::{AnalysisError, Result};
pub use report::SessionSummary;
pub use session::ValidationPolicy;
pub use stats::StatisticsResult;
pub use types::{AxisReading, Orientation, SensorRecord, Session};

/// Settings for one analysis run.
#[derive(Clone, Debug)]
pub struct AnalysisConfig {
    pub policy: ValidationPolicy,
    /// Directory the chart is written to.
    pub output_dir: PathBuf,
    /// Open the chart in the platform viewer after saving it.
    pub display: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            policy: ValidationPolicy::default(),
            output_dir: PathBuf::from("."),
            display: false,
        }
    }
}

/// Analyse one session file: print the report, save the chart and return
/// the full per-file summary.
pub fn analyze_session_file(path: &Path, config: &AnalysisConfig) -> Result<SessionSummary> {
    let session = Session::load(path, config.policy)?;
    let statistics = stats::compute_statistics(&session)?;
    report::print_report(&statistics);

    let input = path.to_string_lossy().into_owned();
    let label = plot::derive_label(&input);
    let chart = plot::render(&plot::PitchRollSeries::from_session(&session), &label)?;

    let chart_path = config.output_dir.join(plot::chart_file_name(&label));
    // The label can contain path separators, so create whatever parent it implies
    if let Some(parent) = chart_path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| AnalysisError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    plot::persist(&chart, &chart_path)?;

    if config.display {
        plot::display(&chart_path);
    }

    Ok(SessionSummary {
        input,
        valid_records: session.len(),
        skipped_records: session.skipped_records,
        chart: chart_path,
        statistics,
    })
}

/// Analyse one session file and return only its statistics.
pub fn analyze_imu_data(path: &Path, config: &AnalysisConfig) -> Result<StatisticsResult> {
    analyze_session_file(path, config).map(|summary| summary.statistics)
}
