//! IQR-based winsorizing of daily volumes.
//!
//! Extreme days are pulled back to the Tukey fences instead of being
//! dropped, so the series keeps its length and calendar alignment.

use crate::core::DailySeries;
use crate::utils::stats::{quantile_sorted, sorted_finite};
use serde::{Deserialize, Serialize};

/// Fences computed from the first and third quartiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IqrFences {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrFences {
    /// Compute `[Q1 - k·IQR, Q3 + k·IQR]`. `None` for an empty slice.
    pub fn from_values(values: &[f64], multiplier: f64) -> Option<Self> {
        let sorted = sorted_finite(values);
        if sorted.is_empty() {
            return None;
        }
        let q1 = quantile_sorted(&sorted, 0.25);
        let q3 = quantile_sorted(&sorted, 0.75);
        let iqr = q3 - q1;
        Some(Self {
            q1,
            q3,
            lower: q1 - multiplier * iqr,
            upper: q3 + multiplier * iqr,
        })
    }

    pub fn clip(&self, value: f64) -> f64 {
        value.clamp(self.lower, self.upper)
    }

    /// Whether `value` lies outside the fences.
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }
}

/// Clips a series to its IQR fences.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Winsorizer {
    multiplier: f64,
}

impl Default for Winsorizer {
    fn default() -> Self {
        Self { multiplier: 1.5 }
    }
}

impl Winsorizer {
    pub fn new(multiplier: f64) -> Self {
        Self { multiplier }
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Clip a slice of values. Same length as the input.
    pub fn apply_values(&self, values: &[f64]) -> Vec<f64> {
        match IqrFences::from_values(values, self.multiplier) {
            Some(fences) => values.iter().map(|&v| fences.clip(v)).collect(),
            None => values.to_vec(),
        }
    }

    /// Clip a daily series, keeping its dates.
    pub fn apply(&self, series: &DailySeries) -> DailySeries {
        let clipped = self.apply_values(series.values());
        DailySeries::new(series.dates().to_vec(), clipped)
            .unwrap_or_else(|_| series.clone())
    }

    /// Indices of the values that would be clipped.
    pub fn outlier_indices(&self, values: &[f64]) -> Vec<usize> {
        match IqrFences::from_values(values, self.multiplier) {
            Some(fences) => values
                .iter()
                .enumerate()
                .filter(|(_, &v)| fences.is_outlier(v))
                .map(|(i, _)| i)
                .collect(),
            None => Vec::new(),
        }
    }
}
