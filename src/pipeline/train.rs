//! Training: winsorize, de-seasonalise, select the weekly model.

use crate::config::PipelineConfig;
use crate::core::DailySeries;
use crate::error::{ForecastError, Result};
use crate::models::exponential::{AttemptSummary, HoltWinters, ModelConfig, WeeklyModelSelector};
use crate::models::traits::WeeklyFitter;
use crate::seasonality::MonthlyFactors;
use crate::transform::Winsorizer;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Everything later stages need about a channel's latest training.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel<M = HoltWinters> {
    pub channel: String,
    /// Fitted weekly model on the de-seasonalised scale.
    pub model: M,
    pub config: ModelConfig,
    pub aic: f64,
    /// True when the trend-only fallback was used.
    pub used_fallback: bool,
    /// Every configuration tried, in order.
    pub attempts: Vec<AttemptSummary>,
    pub last_date: NaiveDate,
    /// History as ingested.
    pub raw: DailySeries,
    /// Winsorized history on the natural scale.
    pub series: DailySeries,
    /// Winsorized, de-seasonalised and floored history the model was fitted on.
    pub adjusted: DailySeries,
    pub monthly_factors: MonthlyFactors,
    /// Bank holiday country applied when forecasting.
    pub country_code: Option<String>,
}

/// Compute monthly factors from `series` and return them with the
/// de-seasonalised series floored at `floor`.
pub fn deseasonalize(series: &DailySeries, floor: f64) -> (MonthlyFactors, DailySeries) {
    let factors = MonthlyFactors::compute(series);
    let adjusted = factors.apply(series).floor(floor);
    (factors, adjusted)
}

/// Train one channel.
///
/// Fails with `InsufficientData` below `config.min_observations` and with
/// `TrainingFailed` when neither a seasonal configuration nor the trend-only
/// fallback fits.
pub fn train_channel<F: WeeklyFitter>(
    channel: &str,
    raw: &DailySeries,
    selector: &WeeklyModelSelector<F>,
    config: &PipelineConfig,
    country_code: Option<String>,
) -> Result<TrainedModel<F::Model>> {
    if raw.len() < config.min_observations {
        return Err(ForecastError::InsufficientData {
            needed: config.min_observations,
            got: raw.len(),
        });
    }
    let last_date = raw.last_date().ok_or(ForecastError::EmptyData)?;

    let series = Winsorizer::new(config.winsor_multiplier).apply(raw);
    let (monthly_factors, adjusted) = deseasonalize(&series, config.positive_floor);

    let selection = selector.select(channel, adjusted.values())?;
    info!(
        channel,
        config = %selection.config,
        aic = selection.aic,
        fallback = selection.used_fallback,
        observations = raw.len(),
        "channel trained"
    );

    Ok(TrainedModel {
        channel: channel.to_string(),
        model: selection.model,
        config: selection.config,
        aic: selection.aic,
        used_fallback: selection.used_fallback,
        attempts: selection.attempts,
        last_date,
        raw: raw.clone(),
        series,
        adjusted,
        monthly_factors,
        country_code,
    })
}
