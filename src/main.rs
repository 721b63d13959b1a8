use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use imu_stats::{report, AnalysisConfig, ValidationPolicy};

#[derive(Parser, Debug)]
#[command(name = "imu_stats")]
#[command(about = "IMU noise/bias statistics and pitch/roll time-series charts", long_about = None)]
struct Args {
    /// Session files (JSON array of records, optionally .gz), analysed in order
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Fail on records missing accelerometer, gyroscope or orientation instead of skipping them
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// Directory for the chart PNGs
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Open each chart in the system image viewer after saving it
    #[arg(long, default_value_t = false)]
    show: bool,

    /// Also write all results to this JSON file
    #[arg(long)]
    summary_json: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = AnalysisConfig {
        policy: if args.strict {
            ValidationPolicy::Strict
        } else {
            ValidationPolicy::Lenient
        },
        output_dir: args.output_dir,
        display: args.show,
    };

    let mut summaries = Vec::with_capacity(args.files.len());
    for file in &args.files {
        let summary = imu_stats::analyze_session_file(file, &config)
            .with_context(|| format!("Analysis of {} failed", file.display()))?;
        summaries.push(summary);
    }

    if let Some(path) = args.summary_json.as_deref() {
        report::write_summary_json(path, &summaries)
            .with_context(|| format!("Could not write summary to {}", path.display()))?;
    }

    Ok(())
}
