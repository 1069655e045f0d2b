use std::{cmp::Ordering, ops::Range};

use time::Date;
use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    forecast,
};

/// One day of observations for a city.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub date: Date,
    pub city: String,
    pub t_min: f64,
    pub t_max: f64,
    pub t_avg: f64,
    pub description: String,
}

impl Record {
    /// Difference between the highest and lowest temperature of the day.
    pub fn swing(&self) -> f64 {
        self.t_max - self.t_min
    }
}

/// The columns of the observation table, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Column {
    Date,
    City,
    TMin,
    TMax,
    TAvg,
    Description,
    Swing,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::Date,
        Column::City,
        Column::TMin,
        Column::TMax,
        Column::TAvg,
        Column::Description,
        Column::Swing,
    ];

    pub fn heading(self) -> &'static str {
        match self {
            Column::Date => "Date",
            Column::City => "City",
            Column::TMin => "T min °C",
            Column::TMax => "T max °C",
            Column::TAvg => "T avg °C",
            Column::Description => "Description",
            Column::Swing => "Swing °C",
        }
    }

    /// Formats the cell of `record` for this column.
    pub fn cell(self, record: &Record) -> String {
        match self {
            Column::Date => record.date.to_string(),
            Column::City => record.city.clone(),
            Column::TMin => format!("{:.1}", record.t_min),
            Column::TMax => format!("{:.1}", record.t_max),
            Column::TAvg => format!("{:.1}", record.t_avg),
            Column::Description => record.description.clone(),
            Column::Swing => format!("{:.1}", record.swing()),
        }
    }

    fn compare(self, left: &Record, right: &Record) -> Ordering {
        match self {
            Column::Date => left.date.cmp(&right.date),
            Column::City => left.city.cmp(&right.city),
            Column::TMin => left.t_min.total_cmp(&right.t_min),
            Column::TMax => left.t_max.total_cmp(&right.t_max),
            Column::TAvg => left.t_avg.total_cmp(&right.t_avg),
            Column::Description => left.description.cmp(&right.description),
            Column::Swing => left.swing().total_cmp(&right.swing()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Order {
    #[default]
    Ascending,
    Descending,
}

/// Forecast values paired with the days they predict.
#[derive(Debug, Clone, PartialEq)]
pub struct DatedForecast {
    pub window: usize,
    pub points: Vec<(Date, f64)>,
}

impl DatedForecast {
    pub fn horizon(&self) -> usize {
        self.points.len()
    }

    pub fn last_date(&self) -> Option<Date> {
        self.points.last().map(|(date, _)| *date)
    }
}

/// Chronologically sorted records. Never empty.
#[derive(Debug, Clone)]
pub struct Observations {
    records: Vec<Record>,
}

impl Observations {
    pub fn new(mut records: Vec<Record>) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::Empty);
        }

        if records.windows(2).any(|pair| pair[0].date > pair[1].date) {
            warn!("records are not ordered by date, sorting them");
            // stable: records sharing a date keep their input order
            records.sort_by_key(|record| record.date);
        }
        debug!(records = records.len(), "built observations");

        Ok(Self { records })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first_date(&self) -> Date {
        self.records[0].date
    }

    pub fn last_date(&self) -> Date {
        self.records[self.records.len() - 1].date
    }

    pub fn dates(&self) -> Vec<Date> {
        self.records.iter().map(|record| record.date).collect()
    }

    /// The chronological series of one numeric value, e.g. `|r| r.t_avg`.
    pub fn series(&self, retrieve: fn(&Record) -> f64) -> Vec<f64> {
        self.records.iter().map(retrieve).collect()
    }

    pub fn range(&self, retrieve: fn(&Record) -> f64) -> Range<f64> {
        let values = self.records.iter().map(retrieve);
        let low = values.clone().min_by(|l, r| l.total_cmp(r));
        let high = values.max_by(|l, r| l.total_cmp(r));
        low.unwrap_or_default()..high.unwrap_or_default()
    }

    /// From the lowest minimum to the highest maximum.
    pub fn temperature_range(&self) -> Range<f64> {
        self.range(|record| record.t_min).start..self.range(|record| record.t_max).end
    }

    /// The day with the largest swing, the earliest one on ties.
    pub fn strongest_swing(&self) -> &Record {
        self.pick(|candidate, best| candidate.swing() > best.swing())
    }

    /// The day with the smallest swing, the earliest one on ties.
    pub fn weakest_swing(&self) -> &Record {
        self.pick(|candidate, best| candidate.swing() < best.swing())
    }

    fn pick(&self, better: fn(&Record, &Record) -> bool) -> &Record {
        self.records[1..]
            .iter()
            .fold(&self.records[0], |best, candidate| {
                if better(candidate, best) {
                    candidate
                } else {
                    best
                }
            })
    }

    pub fn sorted_by(&self, column: Column, order: Order) -> Vec<&Record> {
        let mut records: Vec<&Record> = self.records.iter().collect();
        match order {
            Order::Ascending => records.sort_by(|l, r| column.compare(l, r)),
            Order::Descending => records.sort_by(|l, r| column.compare(r, l)),
        }
        records
    }

    /// Smoothing curve of the average temperature.
    pub fn rolling_mean(&self, window: usize) -> Result<Vec<f64>> {
        Ok(forecast::rolling_mean(&self.series(|record| record.t_avg), window)?)
    }

    /// Forecasts the average temperature for the `horizon` days following
    /// the last observation.
    pub fn forecast(&self, window: usize, horizon: usize) -> Result<DatedForecast> {
        let values = forecast::forecast(&self.series(|record| record.t_avg), window, horizon)?;

        let mut date = self.last_date();
        let mut points = Vec::with_capacity(values.len());
        for value in values {
            date = date.next_day().ok_or(Error::DateOverflow(date))?;
            points.push((date, value));
        }
        debug!(window, horizon, "forecast computed");

        Ok(DatedForecast { window, points })
    }
}
