//! Forecasts set against actuals observed after training.

use crate::core::{DailySeries, ForecastPoint, ForecastSeries};
use crate::error::Result;
use crate::utils::metrics::{calculate_metrics, AccuracyMetrics};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Accuracy of `forecast` on the dates it shares with `actuals`.
///
/// Returns `Ok(None)` when no date overlaps.
pub fn accuracy_against_actuals(
    forecast: &ForecastSeries,
    actuals: &DailySeries,
) -> Result<Option<AccuracyMetrics>> {
    let (actual, predicted): (Vec<f64>, Vec<f64>) = actuals
        .iter()
        .filter_map(|(date, value)| forecast.get(date).map(|p| (value, p.yhat)))
        .unzip();
    if actual.is_empty() {
        return Ok(None);
    }
    calculate_metrics(&actual, &predicted).map(Some)
}

/// One day of an actuals-then-forecast timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendedPoint {
    pub date: NaiveDate,
    pub yhat: f64,
    /// Absent for actuals.
    pub yhat_lower: Option<f64>,
    pub yhat_upper: Option<f64>,
    pub is_actual: bool,
}

impl From<&ForecastPoint> for BlendedPoint {
    fn from(p: &ForecastPoint) -> Self {
        Self {
            date: p.date,
            yhat: p.yhat,
            yhat_lower: Some(p.yhat_lower),
            yhat_upper: Some(p.yhat_upper),
            is_actual: false,
        }
    }
}

/// Concatenate `actuals` with the forecast points dated after the last actual.
pub fn blend(actuals: &DailySeries, forecast: &ForecastSeries) -> Vec<BlendedPoint> {
    let cutoff = actuals.last_date();
    let observed = actuals.iter().map(|(date, value)| BlendedPoint {
        date,
        yhat: value,
        yhat_lower: None,
        yhat_upper: None,
        is_actual: true,
    });
    let projected = forecast
        .points
        .iter()
        .filter(|p| cutoff.map_or(true, |c| p.date > c))
        .map(BlendedPoint::from);
    observed.chain(projected).collect()
}

/// Every forecast point, flagged as forecast.
pub fn forecast_only(forecast: &ForecastSeries) -> Vec<BlendedPoint> {
    forecast.points.iter().map(BlendedPoint::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ymd(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    fn forecast() -> ForecastSeries {
        let points = (1..=5)
            .map(|d| ForecastPoint::new(ymd(3, d), 100.0, 90.0, 110.0))
            .collect();
        ForecastSeries::new("Calls", points)
    }

    #[test]
    fn metrics_use_overlapping_dates_only() {
        let actuals = DailySeries::consecutive(ymd(2, 27), vec![1.0, 1.0, 110.0, 90.0]);
        let m = accuracy_against_actuals(&forecast(), &actuals).unwrap().unwrap();
        assert_eq!(m.sample_size, 2);
        assert_relative_eq!(m.mae, 10.0);
        assert_relative_eq!(m.mape.unwrap(), (10.0 / 110.0 + 10.0 / 90.0) * 50.0, epsilon = 1e-9);
    }

    #[test]
    fn no_overlap_means_no_metrics() {
        let actuals = DailySeries::consecutive(ymd(1, 1), vec![5.0; 10]);
        assert!(accuracy_against_actuals(&forecast(), &actuals).unwrap().is_none());
    }

    #[test]
    fn blend_switches_to_forecast_after_last_actual() {
        let actuals = DailySeries::consecutive(ymd(3, 1), vec![80.0, 85.0]);
        let blended = blend(&actuals, &forecast());
        assert_eq!(blended.len(), 5);
        assert!(blended[..2].iter().all(|p| p.is_actual && p.yhat_lower.is_none()));
        assert_eq!(blended[2].date, ymd(3, 3));
        assert!(!blended[2].is_actual);
        assert_eq!(blended[2].yhat_upper, Some(110.0));
    }

    #[test]
    fn forecast_only_flags_every_point() {
        let points = forecast_only(&forecast());
        assert_eq!(points.len(), 5);
        assert!(points.iter().all(|p| !p.is_actual && p.yhat_lower == Some(90.0)));
    }
}
