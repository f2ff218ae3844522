//! Pipeline settings.

use crate::error::{ForecastError, Result};
use crate::pipeline::ZeroTotalPolicy;
use crate::utils::stats::normal_critical_value;
use serde::{Deserialize, Serialize};

/// Settings shared by training, forecast generation and backtesting.
///
/// Deserialises from any serde format; missing fields take their defaults
/// and unknown fields are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Fewest daily observations a channel needs for training.
    pub min_observations: usize,
    /// Length of the weekly cycle in days.
    pub seasonal_period: usize,
    /// IQR multiplier for the winsorizing fences.
    pub winsor_multiplier: f64,
    /// Floor applied to the de-seasonalised series before fitting.
    pub positive_floor: f64,
    /// Default forecast horizon in months.
    pub horizon_months: usize,
    /// Days counted per forecast month.
    pub days_per_month: usize,
    /// Simulated paths used for the interval.
    pub simulation_repetitions: usize,
    /// Lower interval percentile, 0-100.
    pub lower_percentile: f64,
    /// Upper interval percentile, 0-100.
    pub upper_percentile: f64,
    /// Residual multiplier for the fallback band when simulation fails.
    pub fallback_z: f64,
    /// Seed for the simulation RNG; entropy-seeded when absent.
    pub seed: Option<u64>,
    /// Days held out by the backtest.
    pub holdout_days: usize,
    /// Extra training days required beyond the holdout.
    pub backtest_margin: usize,
    /// Handling of target months whose natural forecast total is zero.
    pub zero_total_policy: ZeroTotalPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_observations: 30,
            seasonal_period: 7,
            winsor_multiplier: 1.5,
            positive_floor: 0.1,
            horizon_months: 15,
            days_per_month: 30,
            simulation_repetitions: 1000,
            lower_percentile: 2.5,
            upper_percentile: 97.5,
            fallback_z: 1.96,
            seed: None,
            holdout_days: 90,
            backtest_margin: 14,
            zero_total_policy: ZeroTotalPolicy::default(),
        }
    }
}

impl PipelineConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_horizon_months(mut self, months: usize) -> Self {
        self.horizon_months = months;
        self
    }

    pub fn with_holdout_days(mut self, days: usize) -> Self {
        self.holdout_days = days;
        self
    }

    pub fn with_simulation_repetitions(mut self, repetitions: usize) -> Self {
        self.simulation_repetitions = repetitions;
        self
    }

    pub fn with_zero_total_policy(mut self, policy: ZeroTotalPolicy) -> Self {
        self.zero_total_policy = policy;
        self
    }

    /// Set a symmetric interval at `level` (e.g. `0.95`), updating both
    /// percentiles and the fallback band width.
    pub fn with_interval_level(mut self, level: f64) -> Self {
        let tail = (1.0 - level) / 2.0 * 100.0;
        self.lower_percentile = tail;
        self.upper_percentile = 100.0 - tail;
        self.fallback_z = normal_critical_value(level);
        self
    }

    /// Horizon in days for `months`, using the fixed month length.
    pub fn horizon_days(&self, months: usize) -> usize {
        months * self.days_per_month
    }

    /// Check that the settings are usable.
    pub fn validate(&self) -> Result<()> {
        if self.seasonal_period < 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "seasonal_period must be at least 2, got {}",
                self.seasonal_period
            )));
        }
        if self.min_observations < 2 * self.seasonal_period {
            return Err(ForecastError::InvalidParameter(format!(
                "min_observations ({}) must cover two seasonal periods",
                self.min_observations
            )));
        }
        if !(self.winsor_multiplier.is_finite() && self.winsor_multiplier >= 0.0) {
            return Err(ForecastError::InvalidParameter(
                "winsor_multiplier must be a non-negative number".to_string(),
            ));
        }
        if !(self.positive_floor.is_finite() && self.positive_floor > 0.0) {
            return Err(ForecastError::InvalidParameter(
                "positive_floor must be strictly positive".to_string(),
            ));
        }
        if self.days_per_month == 0 {
            return Err(ForecastError::InvalidParameter(
                "days_per_month must be positive".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&self.lower_percentile)
            || !(0.0..=100.0).contains(&self.upper_percentile)
            || self.lower_percentile > self.upper_percentile
        {
            return Err(ForecastError::InvalidParameter(format!(
                "interval percentiles must satisfy 0 <= lower <= upper <= 100, got {} and {}",
                self.lower_percentile, self.upper_percentile
            )));
        }
        if !(self.fallback_z.is_finite() && self.fallback_z >= 0.0) {
            return Err(ForecastError::InvalidParameter(
                "fallback_z must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn defaults_match_documented_values() {
        let config = PipelineConfig::default();
        assert_eq!(config.min_observations, 30);
        assert_eq!(config.horizon_days(config.horizon_months), 450);
        assert_eq!(config.simulation_repetitions, 1000);
        assert_eq!(config.holdout_days, 90);
        assert_eq!(config.zero_total_policy, ZeroTotalPolicy::SpreadEvenly);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn interval_level_sets_percentiles_and_z() {
        let config = PipelineConfig::default().with_interval_level(0.8);
        assert_relative_eq!(config.lower_percentile, 10.0, epsilon = 1e-9);
        assert_relative_eq!(config.upper_percentile, 90.0, epsilon = 1e-9);
        assert_relative_eq!(config.fallback_z, 1.2816, epsilon = 1e-4);
    }

    #[test]
    fn validation_rejects_bad_settings() {
        let mut config = PipelineConfig::default();
        config.positive_floor = 0.0;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.lower_percentile = 99.0;
        config.upper_percentile = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn deserialises_partial_json() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"holdout_days": 60, "seed": 42}"#).unwrap();
        assert_eq!(config.holdout_days, 60);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.seasonal_period, 7);

        let policy: PipelineConfig =
            serde_json::from_str(r#"{"zero_total_policy": "leave_zero"}"#).unwrap();
        assert_eq!(policy.zero_total_policy, ZeroTotalPolicy::LeaveZero);

        assert!(serde_json::from_str::<PipelineConfig>(r#"{"bogus": 1}"#).is_err());
    }
}
