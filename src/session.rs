//! Stateful front end holding a dataset and every channel's trained model,
//! forecast and backtest.

use crate::analysis::{
    accuracy_against_actuals, blend, compare_weeks, forecast_only, monthly_forecast,
    monthly_history, weekly_history, BlendedPoint, ChannelSummary, MonthlyForecast,
    MonthlyVolume, SeasonalityInsights, WeeklyVolume,
};
use crate::calendar::{HolidayCalendar, RuleCalendar};
use crate::config::PipelineConfig;
use crate::core::{DailySeries, Dataset, MonthlyTarget};
use crate::error::{ForecastError, Result};
use crate::models::exponential::{HoltWintersFitter, ModelConfig, WeeklyModelSelector};
use crate::models::traits::WeeklyFitter;
use crate::pipeline::{
    backtest, generate_forecast, train_channel, BacktestReport, ForecastOutput, ForecastRequest,
    TrainedModel,
};
use crate::utils::metrics::AccuracyMetrics;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{info, warn};

/// Years compared by [`ForecastSession::compare_weeks`] when none are given.
pub const DEFAULT_COMPARE_YEARS: [i32; 3] = [2024, 2025, 2026];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelStatus {
    Completed,
    Failed,
}

/// Result of one channel in a [`RunReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelOutcome {
    pub channel: String,
    pub status: ChannelStatus,
    pub config: Option<ModelConfig>,
    pub aic: Option<f64>,
    pub backtest_mape: Option<f64>,
    /// Failure reason.
    pub message: Option<String>,
    /// Backtest error of a channel that otherwise completed.
    pub warning: Option<String>,
}

/// Per-channel outcomes of [`ForecastSession::run`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub channels: Vec<ChannelOutcome>,
    /// `Completed` only when every channel completed.
    pub status: ChannelStatus,
    /// Fraction of channels finished, in `[0, 1]`.
    pub progress: f64,
}

impl RunReport {
    pub fn failed(&self) -> impl Iterator<Item = &ChannelOutcome> {
        self.channels
            .iter()
            .filter(|c| c.status == ChannelStatus::Failed)
    }

    pub fn outcome(&self, channel: &str) -> Option<&ChannelOutcome> {
        self.channels.iter().find(|c| c.channel == channel)
    }
}

/// Historical and forecast monthly totals of one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyView {
    pub channel: String,
    pub historical: Vec<MonthlyVolume>,
    pub forecast: Vec<MonthlyForecast>,
}

/// Everything one channel's train, forecast and backtest produce.
struct ChannelRun<M> {
    trained: TrainedModel<M>,
    output: ForecastOutput,
    backtest: Option<BacktestReport>,
    backtest_error: Option<String>,
}

/// A forecasting session over one dataset.
///
/// Holiday countries and monthly targets are configured per channel; trained
/// models, forecasts and backtests are kept per channel and replaced on
/// retraining.
pub struct ForecastSession<F: WeeklyFitter = HoltWintersFitter> {
    dataset: Dataset,
    config: PipelineConfig,
    selector: WeeklyModelSelector<F>,
    calendar: Box<dyn HolidayCalendar>,
    holidays: HashMap<String, String>,
    targets: HashMap<String, Vec<MonthlyTarget>>,
    models: BTreeMap<String, TrainedModel<F::Model>>,
    forecasts: BTreeMap<String, ForecastOutput>,
    backtests: BTreeMap<String, BacktestReport>,
}

impl ForecastSession<HoltWintersFitter> {
    /// Session using the Holt-Winters weekly models and the built-in holiday
    /// rules.
    pub fn new(dataset: Dataset, config: PipelineConfig) -> Result<Self> {
        let fitter = HoltWintersFitter::new(config.seasonal_period);
        Self::with_fitter(dataset, config, fitter)
    }
}

impl<F: WeeklyFitter> ForecastSession<F> {
    pub fn with_fitter(dataset: Dataset, config: PipelineConfig, fitter: F) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            dataset,
            config,
            selector: WeeklyModelSelector::new(fitter),
            calendar: Box::new(RuleCalendar),
            holidays: HashMap::new(),
            targets: HashMap::new(),
            models: BTreeMap::new(),
            forecasts: BTreeMap::new(),
            backtests: BTreeMap::new(),
        })
    }

    /// Replace the holiday source.
    pub fn with_calendar(mut self, calendar: Box<dyn HolidayCalendar>) -> Self {
        self.calendar = calendar;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn channels(&self) -> Vec<String> {
        self.dataset.channels().map(str::to_string).collect()
    }

    /// Set (or with `None`, clear) the bank-holiday country of `channel`.
    ///
    /// An already trained model picks up the new country for its next
    /// forecast; stored forecasts are not regenerated.
    pub fn configure_bank_holidays(&mut self, channel: &str, country: Option<&str>) {
        let country = country.map(str::to_string);
        match &country {
            Some(code) => {
                self.holidays.insert(channel.to_string(), code.clone());
            }
            None => {
                self.holidays.remove(channel);
            }
        }
        if let Some(model) = self.models.get_mut(channel) {
            model.country_code = country;
        }
    }

    pub fn bank_holiday_country(&self, channel: &str) -> Option<&str> {
        self.holidays.get(channel).map(String::as_str)
    }

    /// Replace the monthly targets of `channel`; an empty list clears them.
    pub fn set_monthly_targets(&mut self, channel: &str, targets: Vec<MonthlyTarget>) {
        if targets.is_empty() {
            self.targets.remove(channel);
        } else {
            self.targets.insert(channel.to_string(), targets);
        }
    }

    pub fn monthly_targets(&self, channel: &str) -> &[MonthlyTarget] {
        self.targets.get(channel).map_or(&[], Vec::as_slice)
    }

    fn history(&self, channel: &str) -> Result<&DailySeries> {
        self.dataset
            .series(channel)
            .ok_or_else(|| ForecastError::UnknownChannel(channel.to_string()))
    }

    /// Trained model of `channel`.
    pub fn model(&self, channel: &str) -> Result<&TrainedModel<F::Model>> {
        self.models
            .get(channel)
            .ok_or_else(|| ForecastError::ChannelNotTrained(channel.to_string()))
    }

    /// Latest stored forecast of `channel`.
    pub fn forecast(&self, channel: &str) -> Option<&ForecastOutput> {
        self.forecasts.get(channel)
    }

    /// Latest stored backtest of `channel`.
    pub fn backtest_report(&self, channel: &str) -> Option<&BacktestReport> {
        self.backtests.get(channel)
    }

    fn train_pure(&self, channel: &str) -> Result<TrainedModel<F::Model>> {
        let raw = self.history(channel)?;
        train_channel(
            channel,
            raw,
            &self.selector,
            &self.config,
            self.holidays.get(channel).cloned(),
        )
    }

    fn forecast_pure(
        &self,
        trained: &TrainedModel<F::Model>,
        request: &ForecastRequest,
    ) -> Result<ForecastOutput> {
        generate_forecast(
            trained,
            request,
            self.monthly_targets(&trained.channel),
            self.calendar.as_ref(),
            &self.config,
        )
    }

    fn backtest_pure(
        &self,
        trained: &TrainedModel<F::Model>,
        holdout_days: usize,
    ) -> Result<Option<BacktestReport>> {
        backtest(trained, self.selector.fitter(), holdout_days, &self.config)
    }

    /// Train `channel`, replacing any previous model. On failure the
    /// previous model, if any, is kept.
    pub fn train(&mut self, channel: &str) -> Result<&TrainedModel<F::Model>> {
        let trained = self.train_pure(channel)?;
        self.models.insert(channel.to_string(), trained);
        self.model(channel)
    }

    /// Generate and store a forecast for a trained channel.
    pub fn generate_forecast(
        &mut self,
        channel: &str,
        request: &ForecastRequest,
    ) -> Result<&ForecastOutput> {
        let output = self.forecast_pure(self.model(channel)?, request)?;
        self.forecasts.insert(channel.to_string(), output);
        self.forecasts
            .get(channel)
            .ok_or_else(|| ForecastError::ChannelNotTrained(channel.to_string()))
    }

    /// Backtest the channel's selected configuration over `holdout_days`
    /// (the configured default when `None`). A report is stored when one
    /// can be computed.
    pub fn backtest(
        &mut self,
        channel: &str,
        holdout_days: Option<usize>,
    ) -> Result<Option<&BacktestReport>> {
        let holdout = holdout_days.unwrap_or(self.config.holdout_days);
        let report = self.backtest_pure(self.model(channel)?, holdout)?;
        match report {
            Some(report) => {
                self.backtests.insert(channel.to_string(), report);
                Ok(self.backtests.get(channel))
            }
            None => {
                self.backtests.remove(channel);
                Ok(None)
            }
        }
    }

    pub fn seasonality_insights(&self, channel: &str) -> Result<SeasonalityInsights> {
        let trained = self.model(channel)?;
        Ok(SeasonalityInsights::new(
            channel,
            &trained.series,
            trained.monthly_factors,
        ))
    }

    /// Monthly totals of the raw history and of the stored forecast.
    pub fn monthly_view(&self, channel: &str) -> Result<MonthlyView> {
        let trained = self.model(channel)?;
        Ok(MonthlyView {
            channel: channel.to_string(),
            historical: monthly_history(&trained.raw),
            forecast: self
                .forecast(channel)
                .map(|o| monthly_forecast(&o.forecast))
                .unwrap_or_default(),
        })
    }

    pub fn weekly_aggregates(&self, channel: &str, year: Option<i32>) -> Result<Vec<WeeklyVolume>> {
        Ok(weekly_history(self.history(channel)?, year))
    }

    /// ISO `weeks` of each year in `years` ([`DEFAULT_COMPARE_YEARS`] when
    /// `None`).
    pub fn compare_weeks(
        &self,
        channel: &str,
        weeks: &[u32],
        years: Option<&[i32]>,
    ) -> Result<Vec<WeeklyVolume>> {
        let years = years.unwrap_or(&DEFAULT_COMPARE_YEARS);
        Ok(compare_weeks(self.history(channel)?, weeks, years))
    }

    /// Accuracy of the stored forecast against later actuals; `None` when
    /// no forecast is stored or no date overlaps.
    pub fn accuracy(
        &self,
        channel: &str,
        actuals: &DailySeries,
    ) -> Result<Option<AccuracyMetrics>> {
        match self.forecast(channel) {
            Some(output) => accuracy_against_actuals(&output.forecast, actuals),
            None => Ok(None),
        }
    }

    /// Actuals followed by a forecast regenerated from the last actual date.
    ///
    /// Without actuals the stored forecast is returned, every point flagged
    /// as forecast; `None` when there is nothing stored either.
    pub fn blend_actuals(
        &self,
        channel: &str,
        actuals: Option<&DailySeries>,
    ) -> Result<Option<Vec<BlendedPoint>>> {
        match actuals.and_then(|a| a.last_date().map(|last| (a, last))) {
            Some((actuals, last)) => {
                let request = ForecastRequest::default().starting_after(last);
                let output = self.forecast_pure(self.model(channel)?, &request)?;
                Ok(Some(blend(actuals, &output.forecast)))
            }
            None => Ok(self.forecast(channel).map(|o| forecast_only(&o.forecast))),
        }
    }

    /// Summary rows for every channel with a stored forecast, by channel name.
    pub fn summaries(&self) -> Vec<ChannelSummary> {
        self.forecasts
            .iter()
            .filter_map(|(channel, output)| {
                let trained = self.models.get(channel)?;
                Some(ChannelSummary::new(
                    &trained.raw,
                    &output.forecast,
                    self.holidays.contains_key(channel),
                    self.targets.contains_key(channel),
                ))
            })
            .collect()
    }
}

impl<F> ForecastSession<F>
where
    F: WeeklyFitter + Sync,
    F::Model: Send + Sync,
{
    fn run_channel(
        &self,
        channel: &str,
        request: &ForecastRequest,
    ) -> Result<ChannelRun<F::Model>> {
        let trained = self.train_pure(channel)?;
        let output = self.forecast_pure(&trained, request)?;
        // The backtest only reports accuracy; its failure leaves the channel usable.
        let (backtest, backtest_error) =
            match self.backtest_pure(&trained, self.config.holdout_days) {
                Ok(report) => (report, None),
                Err(e) => {
                    warn!(channel = %channel, error = %e, "backtest failed");
                    (None, Some(e.to_string()))
                }
            };
        Ok(ChannelRun {
            trained,
            output,
            backtest,
            backtest_error,
        })
    }

    /// Train, forecast and backtest `channels` in parallel.
    ///
    /// Channels are independent: a failure is recorded in the report and
    /// leaves that channel's previously stored results untouched, while the
    /// other channels' results are stored. A failed backtest does not fail
    /// its channel; the error is reported as the outcome's warning.
    pub fn run(&mut self, channels: &[String], request: &ForecastRequest) -> RunReport {
        let session = &*self;
        let results: Vec<(String, Result<ChannelRun<F::Model>>)> = channels
            .par_iter()
            .map(|channel| (channel.clone(), session.run_channel(channel, request)))
            .collect();

        let mut outcomes = Vec::with_capacity(results.len());
        for (channel, result) in results {
            match result {
                Ok(run) => {
                    let outcome = ChannelOutcome {
                        channel: channel.clone(),
                        status: ChannelStatus::Completed,
                        config: Some(run.trained.config),
                        aic: Some(run.trained.aic),
                        backtest_mape: run.backtest.as_ref().and_then(BacktestReport::mape),
                        message: None,
                        warning: run.backtest_error,
                    };
                    self.models.insert(channel.clone(), run.trained);
                    self.forecasts.insert(channel.clone(), run.output);
                    match run.backtest {
                        Some(report) => {
                            self.backtests.insert(channel, report);
                        }
                        None => {
                            self.backtests.remove(&channel);
                        }
                    }
                    outcomes.push(outcome);
                }
                Err(e) => {
                    warn!(channel = %channel, error = %e, "channel failed");
                    outcomes.push(ChannelOutcome {
                        channel,
                        status: ChannelStatus::Failed,
                        config: None,
                        aic: None,
                        backtest_mape: None,
                        message: Some(e.to_string()),
                        warning: None,
                    });
                }
            }
        }

        let total = outcomes.len();
        let completed = outcomes
            .iter()
            .filter(|o| o.status == ChannelStatus::Completed)
            .count();
        let status = if completed == total {
            ChannelStatus::Completed
        } else {
            ChannelStatus::Failed
        };
        info!(total, completed, failed = total - completed, "run finished");

        RunReport {
            channels: outcomes,
            status,
            progress: if total > 0 { 1.0 } else { 0.0 },
        }
    }

    /// [`run`](Self::run) over every channel of the dataset.
    pub fn run_all(&mut self, request: &ForecastRequest) -> RunReport {
        let channels = self.channels();
        self.run(&channels, request)
    }
}
