//! Raw observations and the per-channel partitioning of a dataset.

use crate::core::DailySeries;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// One row of ingested history: a channel's volume on a given day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub channel: String,
    pub date: NaiveDate,
    pub volume: f64,
}

impl Observation {
    pub fn new(channel: impl Into<String>, date: NaiveDate, volume: f64) -> Self {
        Self {
            channel: channel.into(),
            date,
            volume,
        }
    }
}

/// A validated batch of observations, partitioned by channel.
///
/// Holds at most one observation per `(channel, date)`. Each channel's
/// series is kept sorted by date so pipelines can read it without copying
/// the whole batch.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    channels: BTreeMap<String, DailySeries>,
    row_count: usize,
}

impl Dataset {
    /// Validate and partition a batch of observations.
    pub fn from_observations(observations: Vec<Observation>) -> Result<Self> {
        let mut grouped: BTreeMap<String, Vec<(NaiveDate, f64)>> = BTreeMap::new();
        let mut seen: HashSet<(String, NaiveDate)> = HashSet::new();
        let row_count = observations.len();

        for obs in observations {
            if !obs.volume.is_finite() || obs.volume < 0.0 {
                return Err(ForecastError::InvalidParameter(format!(
                    "volume for '{}' on {} must be a non-negative number, got {}",
                    obs.channel, obs.date, obs.volume
                )));
            }
            if !seen.insert((obs.channel.clone(), obs.date)) {
                return Err(ForecastError::DuplicateObservation {
                    channel: obs.channel,
                    date: obs.date,
                });
            }
            grouped
                .entry(obs.channel)
                .or_default()
                .push((obs.date, obs.volume));
        }

        let mut channels = BTreeMap::new();
        for (channel, mut rows) in grouped {
            rows.sort_by_key(|(date, _)| *date);
            let (dates, values): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
            channels.insert(channel, DailySeries::new(dates, values)?);
        }

        Ok(Self {
            channels,
            row_count,
        })
    }

    /// Channel names in sorted order.
    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    /// The daily series of one channel.
    pub fn series(&self, channel: &str) -> Option<&DailySeries> {
        self.channels.get(channel)
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Earliest and latest date across all channels.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.channels.values().filter_map(|s| s.first_date()).min()?;
        let max = self.channels.values().filter_map(|s| s.last_date()).max()?;
        Some((min, max))
    }
}
