//! Accuracy metrics for comparing forecasts with actuals.

use crate::error::{ForecastError, Result};
use crate::utils::stats::nan_mean;
use serde::{Deserialize, Serialize};

/// Aggregate accuracy of a forecast against held-out or later actuals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracyMetrics {
    /// Mean absolute percentage error over days with a non-zero actual.
    /// `None` when every actual is zero.
    pub mape: Option<f64>,
    /// Mean absolute error.
    pub mae: f64,
    /// Root mean squared error.
    pub rmse: f64,
    /// Number of compared days.
    pub sample_size: usize,
}

/// Absolute percentage error of one day, `None` when the actual is zero.
pub fn error_pct(actual: f64, predicted: f64) -> Option<f64> {
    if actual == 0.0 {
        None
    } else {
        Some((actual - predicted).abs() / actual.abs() * 100.0)
    }
}

/// Calculate MAPE, MAE and RMSE between actual and predicted values.
///
/// Days whose actual is zero are skipped for MAPE only.
pub fn calculate_metrics(actual: &[f64], predicted: &[f64]) -> Result<AccuracyMetrics> {
    if actual.is_empty() || predicted.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    if actual.len() != predicted.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: actual.len(),
            got: predicted.len(),
        });
    }

    let n = actual.len() as f64;
    let pairs = || actual.iter().zip(predicted.iter());

    let mae = pairs().map(|(a, p)| (a - p).abs()).sum::<f64>() / n;
    let rmse = (pairs().map(|(a, p)| (a - p).powi(2)).sum::<f64>() / n).sqrt();
    let mape = nan_mean(pairs().map(|(a, p)| error_pct(*a, *p)));

    Ok(AccuracyMetrics {
        mape,
        mae,
        rmse,
        sample_size: actual.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn perfect_forecast_has_zero_error() {
        let actual = [10.0, 20.0, 30.0];
        let m = calculate_metrics(&actual, &actual).unwrap();
        assert_relative_eq!(m.mae, 0.0);
        assert_relative_eq!(m.rmse, 0.0);
        assert_relative_eq!(m.mape.unwrap(), 0.0);
        assert_eq!(m.sample_size, 3);
    }

    #[test]
    fn known_values() {
        let actual = [100.0, 200.0, 0.0, 400.0];
        let predicted = [110.0, 180.0, 5.0, 400.0];
        let m = calculate_metrics(&actual, &predicted).unwrap();

        // |e| = 10, 20, 5, 0
        assert_relative_eq!(m.mae, 35.0 / 4.0, epsilon = 1e-12);
        assert_relative_eq!(m.rmse, (525.0_f64 / 4.0).sqrt(), epsilon = 1e-12);
        // pct = 10, 10, skipped, 0
        assert_relative_eq!(m.mape.unwrap(), 20.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn all_zero_actuals_have_no_mape() {
        let m = calculate_metrics(&[0.0, 0.0], &[1.0, 2.0]).unwrap();
        assert!(m.mape.is_none());
        assert_relative_eq!(m.mae, 1.5);
    }

    #[test]
    fn error_pct_skips_zero_actual() {
        assert_eq!(error_pct(0.0, 3.0), None);
        assert_relative_eq!(error_pct(50.0, 40.0).unwrap(), 20.0);
    }

    #[test]
    fn rejects_bad_shapes() {
        assert_eq!(calculate_metrics(&[], &[]), Err(ForecastError::EmptyData));
        assert_eq!(
            calculate_metrics(&[1.0, 2.0], &[1.0]),
            Err(ForecastError::DimensionMismatch { expected: 2, got: 1 })
        );
    }
}
