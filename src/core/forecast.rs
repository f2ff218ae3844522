//! Forecast output: dated point predictions with lower/upper bounds.

use crate::core::MonthKey;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One forecast day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

impl ForecastPoint {
    pub fn new(date: NaiveDate, yhat: f64, yhat_lower: f64, yhat_upper: f64) -> Self {
        Self {
            date,
            yhat,
            yhat_lower,
            yhat_upper,
        }
    }

    /// Multiply the point value and both bounds.
    pub fn scale(&mut self, factor: f64) {
        self.yhat *= factor;
        self.yhat_lower *= factor;
        self.yhat_upper *= factor;
    }

    /// Set the point value and both bounds to zero.
    pub fn zero(&mut self) {
        self.yhat = 0.0;
        self.yhat_lower = 0.0;
        self.yhat_upper = 0.0;
    }

    /// Clip the point value and both bounds to be non-negative.
    pub fn clip_non_negative(&mut self) {
        self.yhat = self.yhat.max(0.0);
        self.yhat_lower = self.yhat_lower.max(0.0);
        self.yhat_upper = self.yhat_upper.max(0.0);
    }

    pub fn month(&self) -> MonthKey {
        MonthKey::from_date(self.date)
    }
}

/// Ordered forecast for one channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub channel: String,
    pub points: Vec<ForecastPoint>,
}

impl ForecastSeries {
    pub fn new(channel: impl Into<String>, points: Vec<ForecastPoint>) -> Self {
        Self {
            channel: channel.into(),
            points,
        }
    }

    /// Number of forecast days.
    pub fn horizon(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Point values in date order.
    pub fn yhat(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.yhat).collect()
    }

    /// Look up the forecast for a date.
    pub fn get(&self, date: NaiveDate) -> Option<&ForecastPoint> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|i| &self.points[i])
    }

    /// Points falling in the given calendar month.
    pub fn month_points_mut(
        &mut self,
        month: MonthKey,
    ) -> impl Iterator<Item = &mut ForecastPoint> {
        self.points.iter_mut().filter(move |p| p.month() == month)
    }

    /// Sum of `yhat` over the given calendar month.
    pub fn month_total(&self, month: MonthKey) -> f64 {
        self.points
            .iter()
            .filter(|p| p.month() == month)
            .map(|p| p.yhat)
            .sum()
    }

    /// Clip every point to be non-negative.
    pub fn clip_non_negative(&mut self) {
        for p in &mut self.points {
            p.clip_non_negative();
        }
    }
}
