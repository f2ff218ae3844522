//! Monthly and ISO-week roll-ups of history and forecasts.

use crate::core::{DailySeries, ForecastSeries, MonthKey};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Historical volume summed over one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyVolume {
    pub month: MonthKey,
    pub total: f64,
}

/// Forecast summed over one calendar month, bounds included.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyForecast {
    pub month: MonthKey,
    pub total: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Volume summed over one ISO week, keyed by the calendar year of its days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WeekKey {
    pub year: i32,
    pub week: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeeklyVolume {
    pub year: i32,
    pub week: u32,
    pub total: f64,
}

pub fn monthly_history(series: &DailySeries) -> Vec<MonthlyVolume> {
    let mut totals: BTreeMap<MonthKey, f64> = BTreeMap::new();
    for (date, value) in series.iter() {
        *totals.entry(MonthKey::from_date(date)).or_default() += value;
    }
    totals
        .into_iter()
        .map(|(month, total)| MonthlyVolume { month, total })
        .collect()
}

pub fn monthly_forecast(forecast: &ForecastSeries) -> Vec<MonthlyForecast> {
    let mut totals: BTreeMap<MonthKey, MonthlyForecast> = BTreeMap::new();
    for p in &forecast.points {
        let month = p.month();
        let entry = totals.entry(month).or_insert(MonthlyForecast {
            month,
            total: 0.0,
            lower: 0.0,
            upper: 0.0,
        });
        entry.total += p.yhat;
        entry.lower += p.yhat_lower;
        entry.upper += p.yhat_upper;
    }
    totals.into_values().collect()
}

/// Sum `series` by (calendar year, ISO week number), optionally restricted to
/// one calendar year.
///
/// Days at a year boundary that belong to the neighbouring ISO year keep their
/// calendar year, so a year can carry both week 1 and week 52/53 rows in
/// January or December.
pub fn weekly_history(series: &DailySeries, year: Option<i32>) -> Vec<WeeklyVolume> {
    let mut totals: BTreeMap<WeekKey, f64> = BTreeMap::new();
    for (date, value) in series.iter() {
        if year.is_some_and(|y| y != date.year()) {
            continue;
        }
        let key = WeekKey {
            year: date.year(),
            week: date.iso_week().week(),
        };
        *totals.entry(key).or_default() += value;
    }
    totals
        .into_iter()
        .map(|(k, total)| WeeklyVolume {
            year: k.year,
            week: k.week,
            total,
        })
        .collect()
}

/// Pick the requested ISO weeks out of each year's weekly totals. Missing
/// (year, week) pairs are omitted.
pub fn compare_weeks(series: &DailySeries, weeks: &[u32], years: &[i32]) -> Vec<WeeklyVolume> {
    let mut rows = Vec::new();
    for &year in years {
        let totals = weekly_history(series, Some(year));
        for &week in weeks {
            if let Some(row) = totals.iter().find(|r| r.week == week) {
                rows.push(*row);
            }
        }
    }
    rows
}
