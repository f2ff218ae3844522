//! Holdout backtest of a channel's selected configuration.

use crate::config::PipelineConfig;
use crate::error::{ForecastError, Result};
use crate::models::exponential::ModelConfig;
use crate::models::traits::{WeeklyFitter, WeeklyModel};
use crate::pipeline::train::deseasonalize;
use crate::pipeline::TrainedModel;
use crate::seasonality::MonthlyFactors;
use crate::utils::metrics::{calculate_metrics, error_pct, AccuracyMetrics};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One held-out day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacktestPoint {
    pub date: NaiveDate,
    pub actual: f64,
    pub predicted: f64,
    /// Absolute percentage error, absent when the actual is zero.
    pub error_pct: Option<f64>,
}

/// Comparison of a refit on the training partition against the holdout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub channel: String,
    pub config: ModelConfig,
    pub holdout_days: usize,
    pub points: Vec<BacktestPoint>,
    pub metrics: AccuracyMetrics,
    /// Monthly factors computed from the training partition.
    pub train_factors: MonthlyFactors,
}

impl BacktestReport {
    pub fn mape(&self) -> Option<f64> {
        self.metrics.mape
    }
}

/// Backtest the configuration chosen for `trained` over the last
/// `holdout_days` of its winsorized history.
///
/// Returns `Ok(None)` when the history is not longer than
/// `holdout_days + config.backtest_margin`. Monthly factors and the refit
/// use only the training partition; the configuration is reused as is.
pub fn backtest<M, F>(
    trained: &TrainedModel<M>,
    fitter: &F,
    holdout_days: usize,
    config: &PipelineConfig,
) -> Result<Option<BacktestReport>>
where
    F: WeeklyFitter,
{
    if holdout_days == 0 {
        return Err(ForecastError::InvalidParameter(
            "holdout must be at least one day".to_string(),
        ));
    }
    let channel = trained.channel.as_str();
    let series = &trained.series;
    if series.len() <= holdout_days + config.backtest_margin {
        debug!(
            channel,
            observations = series.len(),
            holdout_days,
            "history too short for backtest"
        );
        return Ok(None);
    }

    let (train, test) = series.split_at(series.len() - holdout_days);
    let (train_factors, adjusted) = deseasonalize(&train, config.positive_floor);
    let model = fitter.fit(adjusted.values(), trained.config)?;
    let predicted_adjusted = model.forecast(holdout_days)?;

    let points: Vec<BacktestPoint> = test
        .iter()
        .zip(predicted_adjusted)
        .map(|((date, actual), adj)| {
            let predicted = adj * train_factors.for_date(date);
            BacktestPoint {
                date,
                actual,
                predicted,
                error_pct: error_pct(actual, predicted),
            }
        })
        .collect();

    let actual: Vec<f64> = points.iter().map(|p| p.actual).collect();
    let predicted: Vec<f64> = points.iter().map(|p| p.predicted).collect();
    let metrics = calculate_metrics(&actual, &predicted)?;
    info!(
        channel,
        holdout_days,
        mape = metrics.mape,
        mae = metrics.mae,
        rmse = metrics.rmse,
        "backtest complete"
    );

    Ok(Some(BacktestReport {
        channel: channel.to_string(),
        config: trained.config,
        holdout_days,
        points,
        metrics,
        train_factors,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DailySeries;
    use crate::models::exponential::HoltWintersFitter;
    use rand::Rng;
    use std::sync::Mutex;

    /// Records the series it is asked to fit and predicts its last value.
    #[derive(Default)]
    struct Recording {
        seen: Mutex<Vec<Vec<f64>>>,
    }

    struct Last {
        value: f64,
    }

    impl WeeklyModel for Last {
        fn config(&self) -> ModelConfig {
            ModelConfig::FALLBACK
        }

        fn aic(&self) -> f64 {
            0.0
        }

        fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
            Ok(vec![self.value; horizon])
        }

        fn simulate<R: Rng + ?Sized>(
            &self,
            h: usize,
            r: usize,
            _: &mut R,
        ) -> Result<Vec<Vec<f64>>> {
            Ok(vec![vec![self.value; r]; h])
        }

        fn residuals(&self) -> &[f64] {
            &[]
        }
    }

    impl WeeklyFitter for Recording {
        type Model = Last;

        fn fit(&self, values: &[f64], _config: ModelConfig) -> Result<Last> {
            self.seen.lock().unwrap().push(values.to_vec());
            Ok(Last {
                value: *values.last().unwrap(),
            })
        }
    }

    fn trained_on(values: Vec<f64>) -> TrainedModel<Last> {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let series = DailySeries::consecutive(start, values);
        TrainedModel {
            channel: "Calls".to_string(),
            model: Last { value: 0.0 },
            config: ModelConfig::grid()[3],
            aic: 0.0,
            used_fallback: false,
            attempts: Vec::new(),
            last_date: series.last_date().unwrap(),
            raw: series.clone(),
            series: series.clone(),
            adjusted: series,
            monthly_factors: MonthlyFactors::default(),
            country_code: None,
        }
    }

    #[test]
    fn too_short_history_is_unavailable() {
        let t = trained_on(vec![10.0; 104]);
        let report = backtest(&t, &Recording::default(), 90, &PipelineConfig::default()).unwrap();
        assert!(report.is_none());

        let t = trained_on(vec![10.0; 105]);
        let report = backtest(&t, &Recording::default(), 90, &PipelineConfig::default()).unwrap();
        assert!(report.is_some());
    }

    #[test]
    fn compares_holdout_with_refit() {
        let mut values = vec![100.0; 50];
        values.extend([110.0, 90.0, 0.0, 100.0]);
        let t = trained_on(values);
        let config = PipelineConfig::default();
        let report = backtest(&t, &Recording::default(), 4, &config)
            .unwrap()
            .unwrap();

        assert_eq!(report.points.len(), 4);
        assert_eq!(report.config, ModelConfig::grid()[3]);
        // Training is flat in January and February alike.
        for p in &report.points {
            assert!((p.predicted - 100.0).abs() < 1e-9);
        }
        assert_eq!(report.points[2].error_pct, None);
        assert!((report.mape().unwrap() - 20.0 / 3.0).abs() < 1e-9);
        assert!((report.metrics.mae - 30.0).abs() < 1e-9);
    }

    #[test]
    fn holdout_values_do_not_leak_into_training() {
        let base: Vec<f64> = (0..120).map(|i| 50.0 + (i % 7) as f64 * 5.0).collect();
        let mut perturbed = base.clone();
        for v in perturbed.iter_mut().skip(90) {
            *v *= 3.0;
        }

        let config = PipelineConfig::default();
        let first = Recording::default();
        let second = Recording::default();
        let a = backtest(&trained_on(base), &first, 30, &config)
            .unwrap()
            .unwrap();
        let b = backtest(&trained_on(perturbed), &second, 30, &config)
            .unwrap()
            .unwrap();

        assert_eq!(a.train_factors, b.train_factors);
        assert_eq!(*first.seen.lock().unwrap(), *second.seen.lock().unwrap());
        assert_eq!(first.seen.lock().unwrap()[0].len(), 90);
        assert_ne!(a.points[0].actual, b.points[0].actual);
    }

    #[test]
    fn real_model_backtest_reports_metrics() {
        let week = [1000.0, 1020.0, 980.0, 1010.0, 990.0, 400.0, 380.0];
        let values: Vec<f64> = (0..200)
            .map(|i| week[i % 7] + ((i * 31) % 17) as f64)
            .collect();
        let t = trained_on(values);
        let damped = TrainedModel {
            model: (),
            channel: t.channel,
            config: ModelConfig::grid()[0],
            aic: t.aic,
            used_fallback: false,
            attempts: Vec::new(),
            last_date: t.last_date,
            raw: t.raw,
            series: t.series,
            adjusted: t.adjusted,
            monthly_factors: t.monthly_factors,
            country_code: None,
        };
        let fitter = HoltWintersFitter::default();
        let report = backtest(&damped, &fitter, 60, &PipelineConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(report.points.len(), 60);
        assert!(report.mape().unwrap() < 10.0);
        assert!(report.metrics.rmse >= report.metrics.mae);
    }
}
