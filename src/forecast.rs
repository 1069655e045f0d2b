//! Moving-average smoothing and the naive iterative forecast built on it.

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum ForecastError {
    #[error("Invalid input: {0}")]
    #[diagnostic(code(meteo::forecast::invalid_input))]
    InvalidInput(&'static str),
}

/// Predicts `horizon` future values of `series`.
///
/// Every step averages the trailing `window` values of the series extended
/// with the predictions made so far, then appends that average. When fewer
/// than `window` values exist the whole buffer is averaged.
pub fn forecast(series: &[f64], window: usize, horizon: usize) -> Result<Vec<f64>, ForecastError> {
    if window == 0 {
        return Err(ForecastError::InvalidInput("window size must be positive"));
    }
    if horizon == 0 {
        return Err(ForecastError::InvalidInput("horizon must be positive"));
    }
    if series.is_empty() {
        return Err(ForecastError::InvalidInput("cannot forecast an empty series"));
    }

    let mut values = Vec::with_capacity(series.len() + horizon);
    values.extend_from_slice(series);
    let mut predictions = Vec::with_capacity(horizon);

    for _ in 0..horizon {
        let average = mean(&values[values.len().saturating_sub(window)..]);
        predictions.push(average);
        values.push(average);
    }

    Ok(predictions)
}

/// Trailing mean over at most `window` values, one output per input.
///
/// The first points average whatever history exists, so the output is as
/// long as the input and never contains gaps.
pub fn rolling_mean(series: &[f64], window: usize) -> Result<Vec<f64>, ForecastError> {
    if window == 0 {
        return Err(ForecastError::InvalidInput("window size must be positive"));
    }

    Ok((0..series.len())
        .map(|i| mean(&series[(i + 1).saturating_sub(window)..=i]))
        .collect())
}

// callers guarantee a non-empty slice
fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    const SERIES: [f64; 5] = [10.0, 12.0, 14.0, 16.0, 18.0];

    #[test]
    fn short_window_uses_last_values() {
        assert_eq!(forecast(&SERIES, 2, 1).unwrap(), vec![17.0]);
    }

    #[test]
    fn predictions_feed_back_into_the_window() {
        let predicted = forecast(&SERIES, 5, 2).unwrap();
        assert_eq!(predicted.len(), 2);
        assert_relative_eq!(predicted[0], 14.0);
        assert_relative_eq!(predicted[1], 14.8);
    }

    #[test]
    fn window_larger_than_series() {
        assert_eq!(forecast(&[5.0], 3, 2).unwrap(), vec![5.0, 5.0]);

        let first = forecast(&SERIES, 50, 1).unwrap()[0];
        assert_relative_eq!(first, 14.0);
    }

    #[test]
    fn output_length_is_the_horizon() {
        for len in 1..8 {
            let series: Vec<f64> = (0..len).map(|i| i as f64 * 1.5 - 3.0).collect();
            for window in 1..6 {
                for horizon in 1..10 {
                    assert_eq!(forecast(&series, window, horizon).unwrap().len(), horizon);
                }
            }
        }
    }

    #[test]
    fn long_horizon_converges() {
        let predicted = forecast(&SERIES, 5, 400).unwrap();
        let tail = &predicted[predicted.len() - 2..];
        assert!((tail[1] - tail[0]).abs() < 1e-9);
        assert!(tail[1] > SERIES[0] && tail[1] < SERIES[4]);
    }

    #[test]
    fn rejects_invalid_input() {
        assert!(matches!(forecast(&[], 3, 2), Err(ForecastError::InvalidInput(_))));
        assert!(matches!(forecast(&SERIES, 0, 2), Err(ForecastError::InvalidInput(_))));
        assert!(matches!(forecast(&SERIES, 3, 0), Err(ForecastError::InvalidInput(_))));
        assert!(matches!(rolling_mean(&SERIES, 0), Err(ForecastError::InvalidInput(_))));
    }

    #[test]
    fn rolling_mean_keeps_partial_windows() {
        let smoothed = rolling_mean(&SERIES, 3).unwrap();
        assert_eq!(smoothed, vec![10.0, 11.0, 12.0, 14.0, 16.0]);
        assert!(rolling_mean(&[], 3).unwrap().is_empty());
        assert_eq!(rolling_mean(&SERIES, 1).unwrap(), SERIES.to_vec());
    }
}
