//! Date-indexed daily series used throughout the pipeline.

use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A single channel's daily volumes indexed by calendar date.
///
/// Dates are strictly increasing. Missing days are simply absent; the
/// weekly model assumes calendar-day spacing but does not validate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl DailySeries {
    /// Create a series, validating lengths and date ordering.
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "dates and values must have the same length ({} vs {})",
                dates.len(),
                values.len()
            )));
        }

        if dates.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ForecastError::TimestampError(
                "dates must be strictly increasing".to_string(),
            ));
        }

        Ok(Self { dates, values })
    }

    /// Build a series of consecutive days starting at `start`.
    pub fn consecutive(start: NaiveDate, values: Vec<f64>) -> Self {
        let dates = start.iter_days().take(values.len()).collect();
        Self { dates, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// First observed date.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    /// Last observed date.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Iterate over `(date, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Calendar month (1-12) of every observation.
    pub fn months(&self) -> impl Iterator<Item = u32> + '_ {
        self.dates.iter().map(|d| d.month())
    }

    /// Return a new series with the same dates and transformed values.
    pub fn map_values<F>(&self, f: F) -> Self
    where
        F: Fn(NaiveDate, f64) -> f64,
    {
        let values = self.iter().map(|(d, v)| f(d, v)).collect();
        Self {
            dates: self.dates.clone(),
            values,
        }
    }

    /// Same dates, new values.
    pub fn with_values(&self, values: Vec<f64>) -> Result<Self> {
        if values.len() != self.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.len(),
                got: values.len(),
            });
        }
        Ok(Self {
            dates: self.dates.clone(),
            values,
        })
    }

    /// Split into the first `index` observations and the rest.
    pub fn split_at(&self, index: usize) -> (Self, Self) {
        let index = index.min(self.len());
        let head = Self {
            dates: self.dates[..index].to_vec(),
            values: self.values[..index].to_vec(),
        };
        let tail = Self {
            dates: self.dates[index..].to_vec(),
            values: self.values[index..].to_vec(),
        };
        (head, tail)
    }

    /// Clip every value to be at least `floor`.
    pub fn floor(&self, floor: f64) -> Self {
        self.map_values(|_, v| v.max(floor))
    }

    /// Mean of all values, `NaN` when empty.
    pub fn mean(&self) -> f64 {
        crate::utils::stats::mean(&self.values)
    }
}
