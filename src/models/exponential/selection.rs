//! AIC-based choice among the weekly configurations.
//!
//! Every configuration is attempted, each attempt is recorded as a
//! [`FitAttempt`], and [`select_best`] reduces the attempts to the lowest
//! AIC. When nothing fits, the trend-only [`ModelConfig::FALLBACK`] is tried.

use crate::error::{ForecastError, Result};
use crate::models::exponential::ModelConfig;
use crate::models::traits::{WeeklyFitter, WeeklyModel};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Outcome of fitting one configuration.
#[derive(Debug, Clone)]
pub enum FitAttempt<M> {
    Fitted { config: ModelConfig, model: M, aic: f64 },
    Failed { config: ModelConfig, reason: String },
}

impl<M> FitAttempt<M> {
    pub fn config(&self) -> ModelConfig {
        match self {
            FitAttempt::Fitted { config, .. } | FitAttempt::Failed { config, .. } => *config,
        }
    }

    /// Plain-data view of the attempt.
    pub fn summary(&self) -> AttemptSummary {
        match self {
            FitAttempt::Fitted { config, aic, .. } => AttemptSummary {
                config: *config,
                aic: Some(*aic),
                error: None,
            },
            FitAttempt::Failed { config, reason } => AttemptSummary {
                config: *config,
                aic: None,
                error: Some(reason.clone()),
            },
        }
    }
}

/// Record of one configuration attempt, kept with the trained model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptSummary {
    pub config: ModelConfig,
    pub aic: Option<f64>,
    pub error: Option<String>,
}

/// Pick the fitted attempt with the strictly lowest AIC.
///
/// Failed attempts are ignored. On an exact tie the earlier attempt wins.
pub fn select_best<M>(attempts: Vec<FitAttempt<M>>) -> Option<(ModelConfig, M, f64)> {
    let mut best: Option<(ModelConfig, M, f64)> = None;
    for attempt in attempts {
        if let FitAttempt::Fitted { config, model, aic } = attempt {
            let better = match &best {
                Some((_, _, best_aic)) => aic < *best_aic,
                None => aic.is_finite(),
            };
            if better {
                best = Some((config, model, aic));
            }
        }
    }
    best
}

/// Selected model together with how it was chosen.
#[derive(Debug, Clone)]
pub struct Selection<M> {
    pub config: ModelConfig,
    pub model: M,
    pub aic: f64,
    /// True when no seasonal configuration fitted.
    pub used_fallback: bool,
    pub attempts: Vec<AttemptSummary>,
}

/// Tries a fixed list of configurations with a [`WeeklyFitter`].
#[derive(Debug, Clone)]
pub struct WeeklyModelSelector<F> {
    fitter: F,
    configs: Vec<ModelConfig>,
}

impl<F: WeeklyFitter> WeeklyModelSelector<F> {
    /// Selector over the standard eight-configuration grid.
    pub fn new(fitter: F) -> Self {
        Self {
            fitter,
            configs: ModelConfig::grid().to_vec(),
        }
    }

    /// Replace the configurations to try.
    pub fn with_configs(mut self, configs: Vec<ModelConfig>) -> Self {
        self.configs = configs;
        self
    }

    pub fn fitter(&self) -> &F {
        &self.fitter
    }

    pub fn configs(&self) -> &[ModelConfig] {
        &self.configs
    }

    /// Fit one configuration, turning errors and non-finite AICs into
    /// [`FitAttempt::Failed`].
    pub fn attempt(&self, values: &[f64], config: ModelConfig) -> FitAttempt<F::Model> {
        match self.fitter.fit(values, config) {
            Ok(model) => {
                let aic = model.aic();
                if aic.is_finite() {
                    FitAttempt::Fitted { config, model, aic }
                } else {
                    FitAttempt::Failed {
                        config,
                        reason: format!("non-finite AIC {aic}"),
                    }
                }
            }
            Err(e) => FitAttempt::Failed {
                config,
                reason: e.to_string(),
            },
        }
    }

    /// Select the best configuration for `values`, falling back to the
    /// trend-only model when every configuration fails.
    pub fn select(&self, channel: &str, values: &[f64]) -> Result<Selection<F::Model>> {
        let attempts: Vec<FitAttempt<F::Model>> = self
            .configs
            .iter()
            .map(|&config| {
                let attempt = self.attempt(values, config);
                match &attempt {
                    FitAttempt::Fitted { aic, .. } => {
                        debug!(channel, %config, aic, "configuration fitted")
                    }
                    FitAttempt::Failed { reason, .. } => {
                        debug!(channel, %config, reason = %reason, "configuration skipped")
                    }
                }
                attempt
            })
            .collect();
        let mut summaries: Vec<AttemptSummary> = attempts.iter().map(FitAttempt::summary).collect();

        if let Some((config, model, aic)) = select_best(attempts) {
            info!(channel, %config, aic, "selected weekly model");
            return Ok(Selection {
                config,
                model,
                aic,
                used_fallback: false,
                attempts: summaries,
            });
        }

        warn!(channel, "no seasonal configuration fitted, trying trend-only fallback");
        let fallback = self.attempt(values, ModelConfig::FALLBACK);
        summaries.push(fallback.summary());
        match fallback {
            FitAttempt::Fitted { config, model, aic } => {
                info!(channel, %config, aic, "selected trend-only fallback");
                Ok(Selection {
                    config,
                    model,
                    aic,
                    used_fallback: true,
                    attempts: summaries,
                })
            }
            FitAttempt::Failed { reason, .. } => Err(ForecastError::TrainingFailed {
                channel: channel.to_string(),
                reason: format!("all configurations failed, fallback: {reason}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use std::collections::HashMap;

    /// Model stub carrying a predetermined AIC.
    #[derive(Debug, Clone, PartialEq)]
    struct Stub {
        config: ModelConfig,
        aic: f64,
    }

    impl WeeklyModel for Stub {
        fn config(&self) -> ModelConfig {
            self.config
        }

        fn aic(&self) -> f64 {
            self.aic
        }

        fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
            Ok(vec![0.0; horizon])
        }

        fn simulate<R: Rng + ?Sized>(
            &self,
            horizon: usize,
            repetitions: usize,
            _rng: &mut R,
        ) -> Result<Vec<Vec<f64>>> {
            Ok(vec![vec![0.0; repetitions]; horizon])
        }

        fn residuals(&self) -> &[f64] {
            &[]
        }
    }

    /// Fitter answering from a table; missing configurations fail.
    struct TableFitter(HashMap<ModelConfig, f64>);

    impl WeeklyFitter for TableFitter {
        type Model = Stub;

        fn fit(&self, _values: &[f64], config: ModelConfig) -> Result<Stub> {
            self.0
                .get(&config)
                .map(|&aic| Stub { config, aic })
                .ok_or_else(|| ForecastError::ComputationError("forced failure".to_string()))
        }
    }

    fn selector(aics: &[(ModelConfig, f64)]) -> WeeklyModelSelector<TableFitter> {
        WeeklyModelSelector::new(TableFitter(aics.iter().copied().collect()))
    }

    #[test]
    fn picks_strictly_lowest_aic() {
        let grid = ModelConfig::grid();
        let aics: Vec<_> = grid
            .iter()
            .zip([50.0, 40.0, 30.0, 35.0, 10.0, 20.0, 60.0, 70.0])
            .map(|(c, a)| (*c, a))
            .collect();
        let selection = selector(&aics).select("Calls", &[]).unwrap();
        assert_eq!(selection.config, grid[4]);
        assert_eq!(selection.aic, 10.0);
        assert!(!selection.used_fallback);
        assert_eq!(selection.attempts.len(), 8);
    }

    #[test]
    fn exact_tie_keeps_first_in_grid_order() {
        let grid = ModelConfig::grid();
        let aics: Vec<_> = grid
            .iter()
            .zip([50.0, 12.0, 30.0, 12.0, 40.0, 12.0, 60.0, 70.0])
            .map(|(c, a)| (*c, a))
            .collect();
        let selection = selector(&aics).select("Calls", &[]).unwrap();
        assert_eq!(selection.config, grid[1]);
    }

    #[test]
    fn failed_configurations_are_skipped() {
        let grid = ModelConfig::grid();
        let selection = selector(&[(grid[6], 99.0), (grid[2], 120.0)])
            .select("Emails", &[])
            .unwrap();
        assert_eq!(selection.config, grid[6]);
        let failed = selection.attempts.iter().filter(|a| a.error.is_some()).count();
        assert_eq!(failed, 6);
    }

    #[test]
    fn all_failures_trigger_trend_only_fallback() {
        let selection = selector(&[(ModelConfig::FALLBACK, 5.0)])
            .select("Chat", &[])
            .unwrap();
        assert_eq!(selection.config, ModelConfig::FALLBACK);
        assert!(selection.used_fallback);
        assert_eq!(selection.attempts.len(), 9);
    }

    #[test]
    fn fallback_failure_is_a_training_failure() {
        let err = selector(&[]).select("Chat", &[]).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::TrainingFailed { ref channel, .. } if channel == "Chat"
        ));
    }

    #[test]
    fn non_finite_aic_counts_as_failure() {
        let grid = ModelConfig::grid();
        let selection = selector(&[(grid[0], f64::NAN), (grid[3], 8.0)])
            .select("Calls", &[])
            .unwrap();
        assert_eq!(selection.config, grid[3]);
    }

    #[test]
    fn select_best_is_pure() {
        let grid = ModelConfig::grid();
        let attempts = vec![
            FitAttempt::Failed {
                config: grid[0],
                reason: "x".into(),
            },
            FitAttempt::Fitted {
                config: grid[1],
                model: (),
                aic: 3.0,
            },
            FitAttempt::Fitted {
                config: grid[2],
                model: (),
                aic: 3.0,
            },
        ];
        let (config, _, aic) = select_best(attempts).unwrap();
        assert_eq!(config, grid[1]);
        assert_eq!(aic, 3.0);
        assert!(select_best::<()>(Vec::new()).is_none());
    }

    #[test]
    fn real_fitter_selects_seasonal_model() {
        use crate::models::exponential::HoltWintersFitter;
        let week = [100.0, 110.0, 105.0, 108.0, 102.0, 40.0, 35.0];
        let data: Vec<f64> = (0..84)
            .map(|i| week[i % 7] + ((i * 13) % 5) as f64)
            .collect();
        let selection = WeeklyModelSelector::new(HoltWintersFitter::default())
            .select("Calls", &data)
            .unwrap();
        assert!(selection.config.is_seasonal());
        assert!(selection.aic.is_finite());
    }
}
