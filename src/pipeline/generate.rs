//! Forecast generation: projection, interval, and business overlays.

use crate::calendar::{resolve_bank_holidays, HolidayCalendar, HolidayResolution};
use crate::config::PipelineConfig;
use crate::core::{ForecastPoint, ForecastSeries, MonthKey, MonthlyTarget};
use crate::error::{ForecastError, Result};
use crate::models::traits::WeeklyModel;
use crate::pipeline::targets::redistribute_targets;
use crate::pipeline::TrainedModel;
use crate::utils::stats::percentile;
use chrono::{Datelike, Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Horizon and anchor of a forecast.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRequest {
    /// Months ahead; the configured default when absent.
    pub horizon_months: Option<usize>,
    /// Forecast dates start the day after this date; the last training
    /// date when absent. Only the labels move, the model state does not.
    pub start_date: Option<NaiveDate>,
}

impl ForecastRequest {
    pub fn with_horizon_months(mut self, months: usize) -> Self {
        self.horizon_months = Some(months);
        self
    }

    pub fn starting_after(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }
}

/// Non-fatal degradations encountered while generating a forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ForecastWarning {
    /// Simulation failed, bounds come from the residual band.
    SimulationFallback { reason: String },
    /// The holiday calendar had no answer for the country, only January 1
    /// and December 25 were zeroed.
    HolidayFallback { country: String },
    /// A target month had a zero natural total.
    ZeroTotalMonth { month: MonthKey, spread: bool },
}

impl fmt::Display for ForecastWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForecastWarning::SimulationFallback { reason } => {
                write!(f, "simulation failed ({reason}), using residual band")
            }
            ForecastWarning::HolidayFallback { country } => write!(
                f,
                "no holiday calendar for '{country}', only Jan 1 and Dec 25 applied"
            ),
            ForecastWarning::ZeroTotalMonth { month, spread: true } => write!(
                f,
                "forecast for {month} was zero, target spread over working days"
            ),
            ForecastWarning::ZeroTotalMonth {
                month,
                spread: false,
            } => write!(f, "forecast for {month} was zero, target not applied"),
        }
    }
}

/// How the interval was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalMethod {
    Simulated,
    ResidualBand,
}

/// A generated forecast with its diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastOutput {
    pub forecast: ForecastSeries,
    pub interval: IntervalMethod,
    /// Holiday dates zeroed in the forecast.
    pub holidays: Vec<NaiveDate>,
    pub warnings: Vec<ForecastWarning>,
}

/// Generate a forecast for a trained channel.
///
/// Steps: point projection, simulated interval (residual band on failure),
/// monthly factors, holiday zeroing, target redistribution, non-negative
/// clip. Projection errors abort the whole forecast.
pub fn generate_forecast<M: WeeklyModel>(
    trained: &TrainedModel<M>,
    request: &ForecastRequest,
    targets: &[MonthlyTarget],
    calendar: &dyn HolidayCalendar,
    config: &PipelineConfig,
) -> Result<ForecastOutput> {
    let months = request.horizon_months.unwrap_or(config.horizon_months);
    let horizon = config.horizon_days(months);
    if horizon == 0 {
        return Err(ForecastError::InvalidParameter(
            "forecast horizon must be at least one day".to_string(),
        ));
    }
    let start = request.start_date.unwrap_or(trained.last_date);
    let channel = trained.channel.as_str();
    let mut warnings = Vec::new();

    let yhat = trained.model.forecast(horizon)?;
    let (lower, upper, interval) = match simulated_bounds(&trained.model, horizon, config) {
        Ok((lower, upper)) => (lower, upper, IntervalMethod::Simulated),
        Err(e) => {
            warn!(channel, error = %e, "simulation failed, using residual band");
            let sd = trained.model.residual_std();
            if !sd.is_finite() {
                return Err(ForecastError::ComputationError(format!(
                    "residual standard deviation is not finite for '{channel}'"
                )));
            }
            warnings.push(ForecastWarning::SimulationFallback {
                reason: e.to_string(),
            });
            let half = config.fallback_z * sd;
            let lower = yhat.iter().map(|y| y - half).collect();
            let upper = yhat.iter().map(|y| y + half).collect();
            (lower, upper, IntervalMethod::ResidualBand)
        }
    };

    let mut points: Vec<ForecastPoint> = yhat
        .iter()
        .zip(lower)
        .zip(upper)
        .enumerate()
        .map(|(i, ((&y, lo), hi))| {
            ForecastPoint::new(start + Duration::days(i as i64 + 1), y, lo, hi)
        })
        .collect();
    trained.monthly_factors.reapply(&mut points);
    let mut forecast = ForecastSeries::new(channel, points);

    let holidays = match &trained.country_code {
        Some(country) => {
            let (first, last) = match (forecast.first_date(), forecast.last_date()) {
                (Some(first), Some(last)) => (first, last),
                _ => return Err(ForecastError::EmptyData),
            };
            let resolution = resolve_bank_holidays(calendar, country, first.year(), last.year());
            if let HolidayResolution::Unsupported { country, .. } = &resolution {
                warnings.push(ForecastWarning::HolidayFallback {
                    country: country.clone(),
                });
            }
            let dates = resolution.dates().to_vec();
            let mut zeroed = 0;
            for point in &mut forecast.points {
                if dates.binary_search(&point.date).is_ok() {
                    point.zero();
                    zeroed += 1;
                }
            }
            debug!(channel, country = %country, zeroed, "holidays applied");
            dates
        }
        None => Vec::new(),
    };

    if !targets.is_empty() {
        warnings.extend(redistribute_targets(
            &mut forecast,
            targets,
            &holidays,
            config.zero_total_policy,
        ));
    }

    forecast.clip_non_negative();

    Ok(ForecastOutput {
        forecast,
        interval,
        holidays,
        warnings,
    })
}

/// Percentile bounds across simulated paths, per step.
fn simulated_bounds<M: WeeklyModel>(
    model: &M,
    horizon: usize,
    config: &PipelineConfig,
) -> Result<(Vec<f64>, Vec<f64>)> {
    if config.simulation_repetitions == 0 {
        return Err(ForecastError::InvalidParameter(
            "simulation needs at least one repetition".to_string(),
        ));
    }
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let paths = model.simulate(horizon, config.simulation_repetitions, &mut rng)?;
    if paths.len() != horizon {
        return Err(ForecastError::DimensionMismatch {
            expected: horizon,
            got: paths.len(),
        });
    }

    let lower: Vec<f64> = paths
        .iter()
        .map(|step| percentile(step, config.lower_percentile))
        .collect();
    let upper: Vec<f64> = paths
        .iter()
        .map(|step| percentile(step, config.upper_percentile))
        .collect();
    if lower.iter().chain(&upper).any(|v| !v.is_finite()) {
        return Err(ForecastError::ComputationError(
            "non-finite simulated percentile".to_string(),
        ));
    }
    Ok((lower, upper))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::RuleCalendar;
    use crate::core::DailySeries;
    use crate::models::exponential::{ModelConfig, SeasonalType, TrendType};
    use crate::seasonality::MonthlyFactors;
    use approx::assert_relative_eq;
    use rand::Rng;

    /// Flat model with configurable simulation behaviour.
    #[derive(Debug, Clone)]
    struct Flat {
        level: f64,
        simulate_ok: bool,
        residuals: Vec<f64>,
    }

    impl WeeklyModel for Flat {
        fn config(&self) -> ModelConfig {
            ModelConfig::new(TrendType::Additive, Some(SeasonalType::Additive), false)
        }

        fn aic(&self) -> f64 {
            0.0
        }

        fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
            Ok(vec![self.level; horizon])
        }

        fn simulate<R: Rng + ?Sized>(
            &self,
            horizon: usize,
            repetitions: usize,
            rng: &mut R,
        ) -> Result<Vec<Vec<f64>>> {
            if !self.simulate_ok {
                return Err(ForecastError::ComputationError("boom".into()));
            }
            Ok((0..horizon)
                .map(|_| {
                    (0..repetitions)
                        .map(|_| self.level + rng.gen_range(-1.0..1.0))
                        .collect()
                })
                .collect())
        }

        fn residuals(&self) -> &[f64] {
            &self.residuals
        }
    }

    fn trained(model: Flat, last: NaiveDate, country: Option<&str>) -> TrainedModel<Flat> {
        let series = DailySeries::consecutive(last - Duration::days(29), vec![model.level; 30]);
        TrainedModel {
            channel: "Calls".to_string(),
            model,
            config: ModelConfig::FALLBACK,
            aic: 0.0,
            used_fallback: false,
            attempts: Vec::new(),
            last_date: last,
            raw: series.clone(),
            series: series.clone(),
            adjusted: series,
            monthly_factors: MonthlyFactors::default(),
            country_code: country.map(str::to_string),
        }
    }

    fn flat(level: f64, simulate_ok: bool) -> Flat {
        Flat {
            level,
            simulate_ok,
            residuals: vec![-2.0, 2.0, -2.0, 2.0],
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn config() -> PipelineConfig {
        PipelineConfig::default().with_seed(11).with_simulation_repetitions(200)
    }

    #[test]
    fn dates_follow_start_and_horizon() {
        let t = trained(flat(100.0, true), day(2025, 12, 31), None);
        let out = generate_forecast(
            &t,
            &ForecastRequest::default().with_horizon_months(2),
            &[],
            &RuleCalendar,
            &config(),
        )
        .unwrap();

        assert_eq!(out.forecast.horizon(), 60);
        assert_eq!(out.forecast.first_date(), Some(day(2026, 1, 1)));
        assert_eq!(out.forecast.last_date(), Some(day(2026, 3, 1)));
        assert_eq!(out.interval, IntervalMethod::Simulated);
        for p in &out.forecast.points {
            assert!(p.yhat_lower <= p.yhat && p.yhat <= p.yhat_upper);
        }
    }

    #[test]
    fn explicit_start_only_relabels() {
        let t = trained(flat(100.0, true), day(2025, 12, 31), None);
        let request = ForecastRequest::default()
            .with_horizon_months(1)
            .starting_after(day(2026, 3, 10));
        let out = generate_forecast(&t, &request, &[], &RuleCalendar, &config()).unwrap();
        assert_eq!(out.forecast.first_date(), Some(day(2026, 3, 11)));
        assert_relative_eq!(out.forecast.points[0].yhat, 100.0);
    }

    #[test]
    fn simulation_failure_uses_residual_band() {
        let t = trained(flat(100.0, false), day(2025, 12, 31), None);
        let out = generate_forecast(
            &t,
            &ForecastRequest::default().with_horizon_months(1),
            &[],
            &RuleCalendar,
            &config(),
        )
        .unwrap();

        assert_eq!(out.interval, IntervalMethod::ResidualBand);
        assert!(matches!(out.warnings[0], ForecastWarning::SimulationFallback { .. }));
        let p = out.forecast.points[0];
        assert_relative_eq!(p.yhat_lower, 100.0 - 1.96 * 2.0, epsilon = 1e-9);
        assert_relative_eq!(p.yhat_upper, 100.0 + 1.96 * 2.0, epsilon = 1e-9);
    }

    #[test]
    fn monthly_factors_are_reapplied() {
        let mut t = trained(flat(100.0, false), day(2025, 12, 31), None);
        let mut table = [1.0; 12];
        table[0] = 1.5;
        t.monthly_factors = MonthlyFactors::from_array(table);
        let out = generate_forecast(
            &t,
            &ForecastRequest::default().with_horizon_months(2),
            &[],
            &RuleCalendar,
            &config(),
        )
        .unwrap();
        assert_relative_eq!(out.forecast.get(day(2026, 1, 15)).unwrap().yhat, 150.0);
        assert_relative_eq!(out.forecast.get(day(2026, 2, 15)).unwrap().yhat, 100.0);
    }

    #[test]
    fn holidays_are_zeroed() {
        let t = trained(flat(100.0, true), day(2025, 12, 20), Some("US"));
        let out = generate_forecast(
            &t,
            &ForecastRequest::default().with_horizon_months(1),
            &[],
            &RuleCalendar,
            &config(),
        )
        .unwrap();

        for date in [day(2025, 12, 25), day(2026, 1, 1)] {
            let p = out.forecast.get(date).unwrap();
            assert_eq!((p.yhat, p.yhat_lower, p.yhat_upper), (0.0, 0.0, 0.0));
            assert!(out.holidays.contains(&date));
        }
        assert!(out.forecast.get(day(2025, 12, 26)).unwrap().yhat > 0.0);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn unsupported_country_warns_and_zeroes_fallback_dates() {
        let t = trained(flat(100.0, true), day(2025, 12, 20), Some("SA"));
        let out = generate_forecast(
            &t,
            &ForecastRequest::default().with_horizon_months(1),
            &[],
            &RuleCalendar,
            &config(),
        )
        .unwrap();
        assert_eq!(
            out.warnings,
            vec![ForecastWarning::HolidayFallback {
                country: "SA".to_string()
            }]
        );
        assert_eq!(out.forecast.get(day(2026, 1, 1)).unwrap().yhat, 0.0);
    }

    #[test]
    fn targets_rescale_months_after_holidays() {
        let t = trained(flat(100.0, true), day(2026, 5, 31), Some("US"));
        let targets = [MonthlyTarget::parse("2026-06", 50_000.0).unwrap()];
        let out = generate_forecast(
            &t,
            &ForecastRequest::default().with_horizon_months(1),
            &targets,
            &RuleCalendar,
            &config(),
        )
        .unwrap();

        let june = targets[0].month;
        assert_relative_eq!(out.forecast.month_total(june), 50_000.0, epsilon = 1e-6);
        // Juneteenth stays closed.
        assert_eq!(out.forecast.get(day(2026, 6, 19)).unwrap().yhat, 0.0);
    }

    #[test]
    fn output_is_never_negative() {
        let t = trained(flat(-5.0, false), day(2025, 12, 31), None);
        let out = generate_forecast(
            &t,
            &ForecastRequest::default().with_horizon_months(1),
            &[],
            &RuleCalendar,
            &config(),
        )
        .unwrap();
        assert!(out
            .forecast
            .points
            .iter()
            .all(|p| p.yhat >= 0.0 && p.yhat_lower >= 0.0 && p.yhat_upper >= 0.0));
    }

    #[test]
    fn zero_horizon_is_rejected() {
        let t = trained(flat(1.0, true), day(2025, 12, 31), None);
        let err = generate_forecast(
            &t,
            &ForecastRequest::default().with_horizon_months(0),
            &[],
            &RuleCalendar,
            &config(),
        )
        .unwrap_err();
        assert!(matches!(err, ForecastError::InvalidParameter(_)));
    }
}
