//! Multiplicative month-of-year seasonal indices.
//!
//! The weekly model only captures the 7-day cycle, so the slower
//! month-of-year pattern is divided out before fitting and multiplied back
//! onto the forecast afterwards.

use crate::core::{DailySeries, ForecastPoint};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Factor table indexed by calendar month (1-12).
///
/// Months without history keep the neutral factor `1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyFactors {
    factors: [f64; 12],
}

impl Default for MonthlyFactors {
    fn default() -> Self {
        Self { factors: [1.0; 12] }
    }
}

impl MonthlyFactors {
    /// Build from explicit factors, January first.
    pub fn from_array(factors: [f64; 12]) -> Self {
        Self { factors }
    }

    /// `factor[m] = mean(values in month m) / mean(all values)`.
    ///
    /// Months absent from `series` default to `1.0`. An empty series or a
    /// series whose overall mean is not strictly positive yields the neutral
    /// table.
    pub fn compute(series: &DailySeries) -> Self {
        let overall = series.mean();
        if !overall.is_finite() || overall <= 0.0 {
            return Self::default();
        }

        let mut sums = [0.0; 12];
        let mut counts = [0usize; 12];
        for (date, value) in series.iter() {
            let idx = date.month0() as usize;
            sums[idx] += value;
            counts[idx] += 1;
        }

        let mut factors = [1.0; 12];
        for m in 0..12 {
            if counts[m] > 0 {
                factors[m] = sums[m] / counts[m] as f64 / overall;
            }
        }
        Self { factors }
    }

    /// Factor for a calendar month (1-12); out-of-range months are neutral.
    pub fn get(&self, month: u32) -> f64 {
        match month {
            1..=12 => self.factors[(month - 1) as usize],
            _ => 1.0,
        }
    }

    /// Factor for the calendar month of `date`.
    pub fn for_date(&self, date: NaiveDate) -> f64 {
        self.get(date.month())
    }

    /// All twelve factors, January first.
    pub fn as_array(&self) -> &[f64; 12] {
        &self.factors
    }

    /// `(month, factor)` pairs, January first.
    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.factors.iter().enumerate().map(|(i, &f)| (i as u32 + 1, f))
    }

    /// Divide every value by its month's factor. Months with a
    /// non-positive factor are left as they are.
    pub fn apply(&self, series: &DailySeries) -> DailySeries {
        series.map_values(|date, value| {
            let f = self.for_date(date);
            if f > 0.0 {
                value / f
            } else {
                value
            }
        })
    }

    /// Multiply a point and both bounds by the factor of its month.
    pub fn reapply(&self, points: &mut [ForecastPoint]) {
        for p in points {
            p.scale(self.for_date(p.date));
        }
    }
}
