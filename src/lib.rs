//! Daily weather observations: loading, tabulating, charting and a naive
//! moving-average forecast of the average temperature.

pub mod chart;
pub mod config;
pub mod error;
pub mod forecast;
pub mod load;
pub mod record;
pub mod table;

pub use error::{Error, Result};
pub use forecast::{forecast, rolling_mean, ForecastError};
pub use load::load;
pub use record::{Column, DatedForecast, Observations, Order, Record};
