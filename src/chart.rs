//! The two charts: observed temperatures, and the moving-average
//! extrapolation.
//!
//! Series are collected into a [`Chart`] first so they can be inspected
//! without a drawing backend, then drawn with plotters.

use std::{
    ops::Range,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use plotters::{coord::Shift, prelude::*};
use tracing::info;

use crate::{
    config::{ChartSettings, ForecastSettings},
    error::{Error, Result},
    record::{Observations, Record},
};

pub const TEMPERATURE_CHART: &str = "daily-temperature";
pub const FORECAST_CHART: &str = "moving-average-forecast";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ImageFormat {
    #[default]
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Line {
    pub label: String,
    pub color: RGBColor,
    pub points: Vec<(NaiveDate, f64)>,
}

#[derive(Debug, Clone)]
pub struct Chart {
    pub caption: String,
    pub lines: Vec<Line>,
}

fn to_chrono(date: time::Date) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), date.month() as u32, date.day() as u32)
        .ok_or_else(|| Error::Chart(format!("{date} cannot be plotted")))
}

fn dated(dates: &[time::Date], values: Vec<f64>) -> Result<Vec<(NaiveDate, f64)>> {
    dates
        .iter()
        .zip(values)
        .map(|(date, value)| Ok((to_chrono(*date)?, value)))
        .collect()
}

impl Chart {
    /// Minimum, maximum and average temperature per day.
    pub fn temperature(observations: &Observations) -> Result<Self> {
        let dates = observations.dates();
        let line = |label: &str, color: RGBColor, retrieve: fn(&Record) -> f64| -> Result<Line> {
            Ok(Line {
                label: label.to_string(),
                color,
                points: dated(&dates, observations.series(retrieve))?,
            })
        };

        Ok(Self {
            caption: String::from("Daily temperature"),
            lines: vec![
                line("T min (°C)", BLUE, |record| record.t_min)?,
                line("T max (°C)", RED, |record| record.t_max)?,
                line("T avg (°C)", GREEN, |record| record.t_avg)?,
            ],
        })
    }

    /// Observed average temperature, its rolling mean and the forecast
    /// plotted on the days following the last observation.
    pub fn forecast(observations: &Observations, settings: &ForecastSettings) -> Result<Self> {
        let dates = observations.dates();
        let observed = dated(&dates, observations.series(|record| record.t_avg))?;
        let smoothed = dated(&dates, observations.rolling_mean(settings.window)?)?;
        let predicted = observations
            .forecast(settings.window, settings.horizon)?
            .points
            .into_iter()
            .map(|(date, value)| Ok((to_chrono(date)?, value)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            caption: String::from("Moving-average extrapolation"),
            lines: vec![
                Line {
                    label: String::from("T avg (observed)"),
                    color: GREEN,
                    points: observed,
                },
                Line {
                    label: format!("Moving average (n={})", settings.window),
                    color: BLUE,
                    points: smoothed,
                },
                Line {
                    label: format!("Forecast for {} days", settings.horizon),
                    color: RED,
                    points: predicted,
                },
            ],
        })
    }

    fn points(&self) -> impl Iterator<Item = &(NaiveDate, f64)> {
        self.lines.iter().flat_map(|line| line.points.iter())
    }

    /// Always at least one day wide.
    pub fn x_range(&self) -> Range<NaiveDate> {
        let first = self.points().map(|(date, _)| *date).min().unwrap_or_default();
        let last = self.points().map(|(date, _)| *date).max().unwrap_or_default();
        if first < last {
            first..last
        } else {
            first..first.succ_opt().unwrap_or(first)
        }
    }

    /// Padded so the lines do not touch the frame. A flat chart gets one
    /// degree on each side.
    pub fn y_range(&self) -> Range<f64> {
        let (low, high) = self.points().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(low, high), (_, value)| (low.min(*value), high.max(*value)),
        );
        if !low.is_finite() || !high.is_finite() {
            return -1.0..1.0;
        }

        let padding = (high - low) * 0.05;
        if padding > 0.0 {
            (low - padding)..(high + padding)
        } else {
            (low - 1.0)..(high + 1.0)
        }
    }

    pub fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        root.fill(&WHITE).map_err(Error::chart)?;
        let mut chart = ChartBuilder::on(root)
            .caption(&self.caption, ("sans-serif", 40).into_font())
            .margin(10)
            .x_label_area_size(60)
            .y_label_area_size(60)
            .build_cartesian_2d(self.x_range(), self.y_range())
            .map_err(Error::chart)?;

        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc("Temperature, °C")
            .x_label_formatter(&|date: &NaiveDate| date.format("%Y-%m-%d").to_string())
            .draw()
            .map_err(Error::chart)?;

        for line in &self.lines {
            let color = line.color;
            chart
                .draw_series(
                    LineSeries::new(line.points.iter().copied(), color.stroke_width(2))
                        .point_size(3),
                )
                .map_err(Error::chart)?
                .label(line.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(Error::chart)?;

        root.present().map_err(Error::chart)
    }

    pub fn save(&self, path: &Path, format: ImageFormat, size: (u32, u32)) -> Result<()> {
        match format {
            ImageFormat::Png => self.draw(&BitMapBackend::new(path, size).into_drawing_area()),
            ImageFormat::Svg => self.draw(&SVGBackend::new(path, size).into_drawing_area()),
        }
    }
}

/// Writes both charts into the output directory and returns their paths.
pub fn export(
    observations: &Observations,
    forecast: &ForecastSettings,
    settings: &ChartSettings,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(&settings.output).map_err(|e| Error::io(&settings.output, e))?;

    let charts = [
        (TEMPERATURE_CHART, Chart::temperature(observations)?),
        (FORECAST_CHART, Chart::forecast(observations, forecast)?),
    ];

    let mut written = Vec::with_capacity(charts.len());
    for (name, chart) in charts {
        let path = settings
            .output
            .join(format!("{name}.{}", settings.format.extension()));
        chart.save(&path, settings.format, settings.size())?;
        info!(path = %path.display(), "chart written");
        written.push(path);
    }
    Ok(written)
}
