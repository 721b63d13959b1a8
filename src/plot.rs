//! Pitch/roll time-series chart.
//!
//! Rendering, persisting and displaying are separate steps so the chart can
//! be produced and saved without a display.

use std::ops::Range;
use std::path::Path;
use std::process::Command;
use std::thread;

use image::{ImageFormat, RgbImage};
use plotters::backend::BitMapBackend;
use plotters::chart::{ChartBuilder, SeriesLabelPosition};
use plotters::coord::Shift;
use plotters::drawing::{DrawingArea, IntoDrawingArea};
use plotters::element::PathElement;
use plotters::series::LineSeries;
use plotters::style::colors::{BLACK, BLUE, RED, WHITE};
use plotters::style::{Color, RGBColor};

use crate::error::{AnalysisError, Result};
use crate::types::Session;

pub const CHART_FILE_PREFIX: &str = "pitch_roll_time_series";
pub const CHART_TITLE: &str = "Pitch and Roll Time Series";

// 12 x 6 inches at 100 dpi
pub const CHART_WIDTH: u32 = 1200;
pub const CHART_HEIGHT: u32 = 600;

const FONT_TUPLE_MAIN_TITLE: (&str, i32) = ("sans-serif", 24);
const FONT_TUPLE_CHART_TITLE: (&str, i32) = ("sans-serif", 18);
const FONT_TUPLE_LEGEND: (&str, i32) = ("sans-serif", 14);
const TIME_AXIS_LABEL: &str = "Time (seconds)";

/// Label used in the chart title and file name: the first three characters
/// of the input path, taken verbatim.
///
/// Paths sharing a three-character prefix map to the same chart file.
pub fn derive_label(input: &str) -> String {
    input.chars().take(3).collect()
}

pub fn chart_file_name(label: &str) -> String {
    format!("{CHART_FILE_PREFIX}{label}.png")
}

/// Shift timestamps so the first sample sits at zero.
pub fn relative_time(timestamps: &[f64]) -> Vec<f64> {
    match timestamps.first() {
        Some(&start) => timestamps.iter().map(|t| t - start).collect(),
        None => Vec::new(),
    }
}

/// Data for both chart panels, sharing one time axis.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PitchRollSeries {
    pub time: Vec<f64>,
    pub pitch: Vec<f64>,
    pub roll: Vec<f64>,
}

impl PitchRollSeries {
    pub fn from_session(session: &Session) -> Self {
        PitchRollSeries {
            time: relative_time(&session.timestamps),
            pitch: session.pitch.clone(),
            roll: session.roll.clone(),
        }
    }
}

struct Panel<'a> {
    title: &'a str,
    legend: &'a str,
    y_label: &'a str,
    color: RGBColor,
}

const PITCH_PANEL: Panel<'static> = Panel {
    title: "Pitch over Time",
    legend: "Pitch",
    y_label: "Pitch (radians)",
    color: BLUE,
};

const ROLL_PANEL: Panel<'static> = Panel {
    title: "Roll over Time",
    legend: "Roll",
    y_label: "Roll (radians)",
    color: RED,
};

fn plot_err<E: std::error::Error>(e: E) -> AnalysisError {
    AnalysisError::Plot(e.to_string())
}

/// Pad a value range by 15%, or by a fixed amount when it is (nearly) flat.
fn calculate_range(min_val: f64, max_val: f64) -> Range<f64> {
    let (min, max) = if min_val <= max_val {
        (min_val, max_val)
    } else {
        (max_val, min_val)
    };
    let range = max - min;
    let padding = if range < 1e-6 { 0.5 } else { range * 0.15 };
    (min - padding)..(max + padding)
}

fn axis_range(values: &[f64]) -> Range<f64> {
    let bounds = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            None => Some((v, v)),
        });
    match bounds {
        Some((lo, hi)) => calculate_range(lo, hi),
        None => 0.0..1.0,
    }
}

fn draw_panel(
    area: &DrawingArea<BitMapBackend, Shift>,
    panel: &Panel,
    time: &[f64],
    values: &[f64],
) -> Result<()> {
    let mut chart = ChartBuilder::on(area)
        .caption(panel.title, FONT_TUPLE_CHART_TITLE)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(axis_range(time), axis_range(values))
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc(TIME_AXIS_LABEL)
        .y_desc(panel.y_label)
        .draw()
        .map_err(plot_err)?;

    let color = panel.color;
    chart
        .draw_series(LineSeries::new(
            time.iter().copied().zip(values.iter().copied()),
            color.stroke_width(2),
        ))
        .map_err(plot_err)?
        .label(panel.legend)
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font(FONT_TUPLE_LEGEND)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    Ok(())
}

/// Draw the two-panel chart into an in-memory image.
pub fn render(series: &PitchRollSeries, label: &str) -> Result<RgbImage> {
    let mut buffer = vec![0u8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (CHART_WIDTH, CHART_HEIGHT))
            .into_drawing_area();
        root.fill(&WHITE).map_err(plot_err)?;

        let title = format!("{CHART_TITLE}{label}");
        let body = root
            .titled(&title, FONT_TUPLE_MAIN_TITLE)
            .map_err(plot_err)?;
        let panels = body.split_evenly((2, 1));

        draw_panel(&panels[0], &PITCH_PANEL, &series.time, &series.pitch)?;
        draw_panel(&panels[1], &ROLL_PANEL, &series.time, &series.roll)?;

        root.present().map_err(plot_err)?;
    }

    RgbImage::from_raw(CHART_WIDTH, CHART_HEIGHT, buffer)
        .ok_or_else(|| AnalysisError::Plot("Chart buffer has the wrong size".to_string()))
}

/// Save a rendered chart as PNG.
pub fn persist(chart: &RgbImage, path: &Path) -> Result<()> {
    chart.save_with_format(path, ImageFormat::Png)?;
    log::info!("Chart saved to {}", path.display());
    Ok(())
}

/// Open a saved chart in the platform image viewer.
///
/// Does not block: the launcher is reaped on a background thread, so a batch
/// run with many charts leaves no zombie processes. Failing to launch it is
/// logged and ignored.
pub fn display(path: &Path) {
    let spawned = if cfg!(target_os = "macos") {
        Command::new("open").arg(path).spawn()
    } else if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", "start", ""]).arg(path).spawn()
    } else {
        Command::new("xdg-open").arg(path).spawn()
    };

    match spawned {
        Ok(mut child) => {
            log::debug!("Opened viewer for {}", path.display());
            let shown = path.to_path_buf();
            thread::spawn(move || match child.wait() {
                Ok(status) if !status.success() => {
                    log::warn!("Viewer for {} exited with {}", shown.display(), status)
                }
                Ok(_) => {}
                Err(e) => log::warn!("Viewer for {} was lost: {}", shown.display(), e),
            });
        }
        Err(e) => log::warn!("Could not open viewer for {}: {}", path.display(), e),
    }
}
