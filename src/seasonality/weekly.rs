//! Day-of-week pattern introspection.
//!
//! Two views of the weekly cycle are offered: a per-weekday effect relative
//! to the overall mean, and a classical additive decomposition into a
//! moving-average trend and a repeating 7-day seasonal offset.

use crate::core::DailySeries;
use crate::transform::centered_moving_average;
use crate::utils::stats::mean;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

const PERIOD: usize = 7;

/// Deviation of one weekday from the overall mean, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeekdayEffect {
    pub weekday: Weekday,
    pub effect_pct: f64,
}

/// `(weekday mean / overall mean - 1) * 100` for every weekday, Monday first.
///
/// A weekday without observations, or a series whose mean is not positive,
/// reports an effect of zero.
pub fn weekday_effects(series: &DailySeries) -> Vec<WeekdayEffect> {
    let overall = series.mean();
    let mut sums = [0.0; PERIOD];
    let mut counts = [0usize; PERIOD];
    for (date, value) in series.iter() {
        let idx = date.weekday().num_days_from_monday() as usize;
        sums[idx] += value;
        counts[idx] += 1;
    }

    let mut weekday = Weekday::Mon;
    let mut effects = Vec::with_capacity(PERIOD);
    for (sum, count) in sums.iter().zip(counts) {
        let effect_pct = if overall.is_finite() && overall > 0.0 && count > 0 {
            (sum / count as f64 / overall - 1.0) * 100.0
        } else {
            0.0
        };
        effects.push(WeekdayEffect {
            weekday,
            effect_pct,
        });
        weekday = weekday.succ();
    }
    effects
}

/// Trend and weekly components of a channel's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyDecomposition {
    pub dates: Vec<NaiveDate>,
    /// Trend per date. `None` only at the edges of a trend-only result.
    pub trend: Vec<Option<f64>>,
    /// Seasonal offset per date, absent when the history is shorter than
    /// two full weeks.
    pub seasonal: Option<Vec<f64>>,
}

impl WeeklyDecomposition {
    /// Decompose `series` additively with a 7-day period.
    ///
    /// The trend is a centered 7-day moving average whose undefined ends are
    /// extended linearly from the nearest six trend values. The seasonal
    /// component is the mean detrended value at each position of the cycle,
    /// re-centered to sum to zero. With fewer than 14 observations only the
    /// moving-average trend is returned.
    pub fn compute(series: &DailySeries) -> Self {
        let values = series.values();
        let dates = series.dates().to_vec();
        let raw_trend = centered_moving_average(values, PERIOD);

        if values.len() < 2 * PERIOD {
            return Self {
                dates,
                trend: raw_trend
                    .into_iter()
                    .map(|v| v.is_finite().then_some(v))
                    .collect(),
                seasonal: None,
            };
        }

        let trend = extrapolate_edges(raw_trend, PERIOD - 1);

        let mut phase_sums = [0.0; PERIOD];
        let mut phase_counts = [0usize; PERIOD];
        for (i, (v, t)) in values.iter().zip(&trend).enumerate() {
            phase_sums[i % PERIOD] += v - t;
            phase_counts[i % PERIOD] += 1;
        }
        let mut offsets: Vec<f64> = phase_sums
            .iter()
            .zip(phase_counts)
            .map(|(s, c)| s / c as f64)
            .collect();
        let centre = mean(&offsets);
        offsets.iter_mut().for_each(|o| *o -= centre);

        let seasonal = (0..values.len()).map(|i| offsets[i % PERIOD]).collect();

        Self {
            dates,
            trend: trend.into_iter().map(Some).collect(),
            seasonal: Some(seasonal),
        }
    }

    /// Whether a weekly component was estimated.
    pub fn has_weekly(&self) -> bool {
        self.seasonal.is_some()
    }
}

/// Replace the leading and trailing `NaN`s with least-squares lines fitted
/// through the first and last `points` defined values.
fn extrapolate_edges(mut trend: Vec<f64>, points: usize) -> Vec<f64> {
    let defined: Vec<usize> = (0..trend.len()).filter(|&i| trend[i].is_finite()).collect();
    let (Some(&first), Some(&last)) = (defined.first(), defined.last()) else {
        return trend;
    };

    let head: Vec<usize> = defined.iter().copied().take(points).collect();
    let (slope, intercept) = fit_line(&head, &trend);
    for (i, t) in trend.iter_mut().enumerate().take(first) {
        *t = intercept + slope * i as f64;
    }

    let tail: Vec<usize> = defined.iter().rev().take(points).rev().copied().collect();
    let (slope, intercept) = fit_line(&tail, &trend);
    for (i, t) in trend.iter_mut().enumerate().skip(last + 1) {
        *t = intercept + slope * i as f64;
    }
    trend
}

fn fit_line(idx: &[usize], values: &[f64]) -> (f64, f64) {
    let n = idx.len() as f64;
    let x_mean = idx.iter().map(|&i| i as f64).sum::<f64>() / n;
    let y_mean = idx.iter().map(|&i| values[i]).sum::<f64>() / n;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for &i in idx {
        let dx = i as f64 - x_mean;
        sxy += dx * (values[i] - y_mean);
        sxx += dx * dx;
    }
    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    (slope, y_mean - slope * x_mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn monday() -> NaiveDate {
        // 2025-01-06 is a Monday.
        NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
    }

    fn weekday_weekend(weeks: usize) -> DailySeries {
        let values = (0..weeks * 7)
            .map(|i| if i % 7 < 5 { 1000.0 } else { 400.0 })
            .collect();
        DailySeries::consecutive(monday(), values)
    }

    #[test]
    fn weekday_effects_are_monday_first() {
        let effects = weekday_effects(&weekday_weekend(4));
        let overall = (5.0 * 1000.0 + 2.0 * 400.0) / 7.0;

        assert_eq!(effects.len(), 7);
        assert_eq!(effects[0].weekday, Weekday::Mon);
        assert_eq!(effects[6].weekday, Weekday::Sun);
        assert_relative_eq!(
            effects[0].effect_pct,
            (1000.0 / overall - 1.0) * 100.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(effects[5].effect_pct, (400.0 / overall - 1.0) * 100.0, epsilon = 1e-9);
    }

    #[test]
    fn missing_weekday_has_zero_effect() {
        // Monday to Wednesday only.
        let series = DailySeries::consecutive(monday(), vec![10.0, 20.0, 30.0]);
        let effects = weekday_effects(&series);
        assert_eq!(effects[4].effect_pct, 0.0);
        assert_relative_eq!(effects[2].effect_pct, 50.0, epsilon = 1e-9);
    }

    #[test]
    fn decomposition_recovers_flat_trend_and_offsets() {
        let decomp = WeeklyDecomposition::compute(&weekday_weekend(6));
        let overall = (5.0 * 1000.0 + 2.0 * 400.0) / 7.0;

        assert!(decomp.has_weekly());
        for t in &decomp.trend {
            assert_relative_eq!(t.unwrap(), overall, epsilon = 1e-6);
        }
        let seasonal = decomp.seasonal.unwrap();
        assert_relative_eq!(seasonal[0], 1000.0 - overall, epsilon = 1e-6);
        assert_relative_eq!(seasonal[6], 400.0 - overall, epsilon = 1e-6);
        assert_relative_eq!(seasonal[..7].iter().sum::<f64>(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn linear_trend_is_extended_to_the_edges() {
        let series = DailySeries::consecutive(monday(), (0..21).map(|i| i as f64).collect());
        let decomp = WeeklyDecomposition::compute(&series);
        assert_relative_eq!(decomp.trend[0].unwrap(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(decomp.trend[20].unwrap(), 20.0, epsilon = 1e-9);
    }

    #[test]
    fn short_history_is_trend_only() {
        let series = DailySeries::consecutive(monday(), vec![5.0; 10]);
        let decomp = WeeklyDecomposition::compute(&series);
        assert!(!decomp.has_weekly());
        assert_eq!(decomp.trend[0], None);
        assert_eq!(decomp.trend[3], Some(5.0));
        assert_eq!(decomp.trend[9], None);
    }
}
