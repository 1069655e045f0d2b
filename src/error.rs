use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::forecast::ForecastError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Could not access {}", path.display())]
    #[diagnostic(code(meteo::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed CSV: {0}")]
    #[diagnostic(code(meteo::load::csv))]
    Csv(#[from] csv::Error),
    #[error("Malformed JSON: {0}")]
    #[diagnostic(code(meteo::load::json))]
    Json(#[from] serde_json::Error),
    #[error("Missing column: {0}")]
    #[diagnostic(
        code(meteo::load::missing_column),
        help("the input needs `date`, `t_min`, `t_max` and `t_avg` columns")
    )]
    MissingColumn(&'static str),
    #[error("Invalid date `{0}`")]
    #[diagnostic(
        code(meteo::load::date),
        help("dates are written `YYYY-MM-DD`, optionally followed by a time")
    )]
    InvalidDate(String),
    #[error("Invalid value for `{column}` on row {row}: {value}")]
    #[diagnostic(code(meteo::load::value))]
    InvalidValue {
        column: &'static str,
        row: usize,
        value: String,
    },
    #[error("Unsupported JSON layout: {0}")]
    #[diagnostic(
        code(meteo::load::layout),
        help("expected an array of rows or an object of columns")
    )]
    UnsupportedLayout(&'static str),
    #[error("No observations")]
    #[diagnostic(code(meteo::empty))]
    Empty,
    #[error("Date out of range after {0}")]
    #[diagnostic(code(meteo::date_overflow))]
    DateOverflow(time::Date),
    #[error("Could not draw chart: {0}")]
    #[diagnostic(code(meteo::chart))]
    Chart(String),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Forecast(#[from] ForecastError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn chart(error: impl std::fmt::Display) -> Self {
        Self::Chart(error.to_string())
    }
}
