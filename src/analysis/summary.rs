//! Per-channel seasonality insights and headline summary.

use crate::analysis::aggregate::monthly_forecast;
use crate::core::{DailySeries, ForecastSeries, MonthKey};
use crate::seasonality::{weekday_effects, MonthlyFactors, WeekdayEffect, WeeklyDecomposition};
use serde::{Deserialize, Serialize};

/// What a trained channel's history says about its seasonal shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalityInsights {
    pub channel: String,
    pub monthly_factors: MonthlyFactors,
    /// Monday first.
    pub weekday_effects: Vec<WeekdayEffect>,
    pub decomposition: WeeklyDecomposition,
}

impl SeasonalityInsights {
    /// Insights for `series`, the winsorized history the factors came from.
    pub fn new(channel: &str, series: &DailySeries, monthly_factors: MonthlyFactors) -> Self {
        Self {
            channel: channel.to_string(),
            monthly_factors,
            weekday_effects: weekday_effects(series),
            decomposition: WeeklyDecomposition::compute(series),
        }
    }
}

/// Headline numbers comparing a channel's history with its forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub channel: String,
    pub hist_avg_daily: f64,
    pub forecast_avg_daily: f64,
    /// Change of the forecast daily average over the historical one, in
    /// percent; zero without positive history.
    pub change_pct: f64,
    pub forecast_total: f64,
    pub peak_month: Option<MonthKey>,
    pub trough_month: Option<MonthKey>,
    pub has_holidays: bool,
    pub has_targets: bool,
}

impl ChannelSummary {
    pub fn new(
        history: &DailySeries,
        forecast: &ForecastSeries,
        has_holidays: bool,
        has_targets: bool,
    ) -> Self {
        let hist_avg_daily = average(history.values().iter().copied());
        let forecast_avg_daily = average(forecast.points.iter().map(|p| p.yhat));
        let forecast_total: f64 = forecast.points.iter().map(|p| p.yhat).sum();
        let change_pct = if hist_avg_daily > 0.0 {
            (forecast_avg_daily / hist_avg_daily - 1.0) * 100.0
        } else {
            0.0
        };

        // Ties go to the earliest month.
        let months = monthly_forecast(forecast);
        let peak_month = months
            .iter()
            .fold(None::<(MonthKey, f64)>, |best, m| match best {
                Some((_, t)) if t >= m.total => best,
                _ => Some((m.month, m.total)),
            })
            .map(|(k, _)| k);
        let trough_month = months
            .iter()
            .fold(None::<(MonthKey, f64)>, |best, m| match best {
                Some((_, t)) if t <= m.total => best,
                _ => Some((m.month, m.total)),
            })
            .map(|(k, _)| k);

        Self {
            channel: forecast.channel.clone(),
            hist_avg_daily,
            forecast_avg_daily,
            change_pct,
            forecast_total,
            peak_month,
            trough_month,
            has_holidays,
            has_targets,
        }
    }
}

fn average(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ForecastPoint;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate, Weekday};

    fn forecast_from(start: NaiveDate, values: &[f64]) -> ForecastSeries {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &v)| ForecastPoint::new(start + Duration::days(i as i64), v, v, v))
            .collect();
        ForecastSeries::new("Calls", points)
    }

    #[test]
    fn summary_reports_change_and_extreme_months() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 30).unwrap();
        let history = DailySeries::consecutive(start - Duration::days(10), vec![100.0; 10]);
        // Jan 30-31 at 50, Feb at 150, Mar 1-2 at 50.
        let mut values = vec![50.0, 50.0];
        values.extend(vec![150.0; 28]);
        values.extend([50.0, 50.0]);
        let fc = forecast_from(start, &values);

        let s = ChannelSummary::new(&history, &fc, true, false);
        assert_relative_eq!(s.hist_avg_daily, 100.0);
        assert_relative_eq!(s.forecast_total, 4400.0);
        assert_relative_eq!(s.change_pct, (4400.0 / 32.0 / 100.0 - 1.0) * 100.0, epsilon = 1e-9);
        assert_eq!(s.peak_month.unwrap().to_string(), "2026-02");
        assert_eq!(s.trough_month.unwrap().to_string(), "2026-01");
        assert!(s.has_holidays);
        assert!(!s.has_targets);
    }

    #[test]
    fn empty_history_gives_zero_change() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let history = DailySeries::consecutive(start, Vec::new());
        let s = ChannelSummary::new(&history, &forecast_from(start, &[1.0]), false, false);
        assert_eq!(s.change_pct, 0.0);
        assert_eq!(s.hist_avg_daily, 0.0);
    }

    #[test]
    fn insights_cover_weekdays_and_decomposition() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let week = [120.0, 120.0, 120.0, 120.0, 120.0, 50.0, 50.0];
        let series = DailySeries::consecutive(start, (0..56).map(|i| week[i % 7]).collect());
        let factors = MonthlyFactors::compute(&series);
        let insights = SeasonalityInsights::new("Calls", &series, factors);

        assert_eq!(insights.monthly_factors, factors);
        assert_eq!(insights.weekday_effects.len(), 7);
        assert_eq!(insights.weekday_effects[0].weekday, Weekday::Mon);
        assert!(insights.weekday_effects[6].effect_pct < 0.0);
        assert!(insights.decomposition.has_weekly());
    }
}
