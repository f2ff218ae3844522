//! Property-based tests for the pipeline stages.
//!
//! These tests verify invariants that should hold for all valid inputs,
//! using randomly generated daily series.

use chrono::{Duration, NaiveDate};
use contact_forecast::pipeline::{generate_forecast, redistribute_targets, TrainedModel};
use contact_forecast::prelude::*;
use contact_forecast::seasonality::MonthlyFactors;
use contact_forecast::transform::{IqrFences, Winsorizer};
use proptest::prelude::*;
use rand::Rng;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

/// Strategy for non-negative daily volumes.
fn volumes_strategy(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0..5000.0_f64, min_len..max_len)
}

/// A model that projects a constant level with uniform noise around it.
struct Level {
    level: f64,
    spread: f64,
    residuals: Vec<f64>,
}

impl WeeklyModel for Level {
    fn config(&self) -> ModelConfig {
        ModelConfig::FALLBACK
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
        Ok((0..horizon)
            .map(|_| {
                (0..repetitions)
                    .map(|_| self.level + rng.gen_range(-1.0..=1.0) * self.spread)
                    .collect()
            })
            .collect())
    }

    fn residuals(&self) -> &[f64] {
        &self.residuals
    }
}

fn trained(level: f64, spread: f64, factors: [f64; 12]) -> TrainedModel<Level> {
    let series = DailySeries::consecutive(start(), vec![level.max(0.0); 60]);
    TrainedModel {
        channel: "Calls".to_string(),
        model: Level {
            level,
            spread,
            residuals: vec![-spread, spread],
        },
        config: ModelConfig::FALLBACK,
        aic: 0.0,
        used_fallback: true,
        attempts: Vec::new(),
        last_date: series.last_date().unwrap(),
        raw: series.clone(),
        series: series.clone(),
        adjusted: series,
        monthly_factors: MonthlyFactors::from_array(factors),
        country_code: Some("DE".to_string()),
    }
}

// =============================================================================
// Property: winsorizing only touches values outside the fences
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn winsorized_values_stay_within_fences(values in volumes_strategy(4, 200)) {
        let winsorizer = Winsorizer::default();
        let clipped = winsorizer.apply_values(&values);
        let fences = IqrFences::from_values(&values, 1.5).unwrap();

        prop_assert_eq!(clipped.len(), values.len());
        for (&before, &after) in values.iter().zip(&clipped) {
            prop_assert!(after >= fences.lower && after <= fences.upper);
            if before >= fences.lower && before <= fences.upper {
                prop_assert_eq!(before, after);
            }
        }
    }

    #[test]
    fn winsorizing_is_idempotent_at_exact_quartiles(
        values in (1usize..50).prop_flat_map(|m| prop::collection::vec(0.0..5000.0_f64, 4 * m + 1))
    ) {
        // With 4m+1 values both quartiles sit on observations, which clipping
        // leaves in place.
        let winsorizer = Winsorizer::default();
        let once = winsorizer.apply_values(&values);
        let twice = winsorizer.apply_values(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn winsorizing_preserves_order(values in volumes_strategy(4, 200)) {
        let clipped = Winsorizer::default().apply_values(&values);
        for i in 0..values.len() {
            for j in 0..values.len() {
                if values[i] <= values[j] {
                    prop_assert!(clipped[i] <= clipped[j]);
                }
            }
        }
    }
}

// =============================================================================
// Property: removing then re-applying monthly factors is lossless
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn monthly_factors_round_trip(values in prop::collection::vec(1.0..5000.0_f64, 60..400)) {
        let series = DailySeries::consecutive(start(), values);
        let factors = MonthlyFactors::compute(&series);
        let adjusted = factors.apply(&series);

        for ((date, original), (_, adj)) in series.iter().zip(adjusted.iter()) {
            let restored = adj * factors.for_date(date);
            prop_assert!((restored - original).abs() <= 1e-9 * original.max(1.0));
        }
    }
}

// =============================================================================
// Property: forecasts are non-negative
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    #[test]
    fn forecasts_are_non_negative(
        level in -500.0..2000.0_f64,
        spread in 0.0..800.0_f64,
        factors in prop::array::uniform12(0.5..1.5_f64),
        seed in any::<u64>(),
    ) {
        let config = PipelineConfig::default()
            .with_seed(seed)
            .with_simulation_repetitions(50);
        let request = ForecastRequest::default().with_horizon_months(3);
        let output = generate_forecast(
            &trained(level, spread, factors),
            &request,
            &[],
            &RuleCalendar,
            &config,
        ).unwrap();

        prop_assert_eq!(output.forecast.horizon(), 90);
        for p in &output.forecast.points {
            prop_assert!(p.yhat >= 0.0 && p.yhat_lower >= 0.0 && p.yhat_upper >= 0.0);
        }
    }
}

// =============================================================================
// Property: redistributed months sum to their targets
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn redistributed_month_matches_target(
        values in prop::collection::vec(0.1..3000.0_f64, 31),
        volume in 0.0..1_000_000.0_f64,
    ) {
        let march = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                ForecastPoint::new(march + Duration::days(i as i64), v, v * 0.9, v * 1.1)
            })
            .collect();
        let mut forecast = ForecastSeries::new("Calls", points);
        let target = MonthlyTarget::parse("2026-03", volume).unwrap();

        let warnings =
            redistribute_targets(&mut forecast, &[target], &[], ZeroTotalPolicy::SpreadEvenly);

        prop_assert!(warnings.is_empty());
        let total = forecast.month_total(target.month);
        prop_assert!((total - volume).abs() <= 1e-9 * volume.max(1.0));
    }
}
