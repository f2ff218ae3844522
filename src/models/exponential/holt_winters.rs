//! Holt-Winters exponential smoothing.
//!
//! Covers the whole family used for weekly modelling: additive or
//! multiplicative trend, optional damping, and additive, multiplicative or
//! no seasonality.
//!
//! With `φ = 1` for an undamped trend and `d_h = φ + φ² + … + φ^h`:
//! - Additive trend base: `l_t + d_h·b_t`
//! - Multiplicative trend base: `l_t · b_t^{d_h}`
//! - Additive seasonal forecast: `base + s_{t+h-m}`
//! - Multiplicative seasonal forecast: `base · s_{t+h-m}`
//!
//! Updates, with `â` the one-step base and `s` the matching seasonal index:
//! - Level: `l_t = α·a_t + (1-α)·â`, where `a_t` is `y_t - s`, `y_t / s` or `y_t`
//! - Additive trend: `b_t = β(l_t - l_{t-1}) + (1-β)φ·b_{t-1}`
//! - Multiplicative trend: `b_t = β(l_t / l_{t-1}) + (1-β)b_{t-1}^φ`
//! - Additive seasonal: `s_t = γ(y_t - l_t) + (1-γ)s`
//! - Multiplicative seasonal: `s_t = γ(y_t / l_t) + (1-γ)s`

use crate::error::{ForecastError, Result};
use crate::models::traits::{WeeklyFitter, WeeklyModel};
use crate::utils::optimization::{nelder_mead, Bound, NelderMeadConfig};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::fmt;

const SMOOTHING_BOUNDS: Bound = (0.0001, 0.9999);
const PHI_BOUNDS: Bound = (0.8, 0.98);

/// Type of trend component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendType {
    Additive,
    Multiplicative,
}

/// Type of seasonal component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeasonalType {
    Additive,
    Multiplicative,
}

impl TrendType {
    fn short(self) -> &'static str {
        match self {
            TrendType::Additive => "add",
            TrendType::Multiplicative => "mul",
        }
    }
}

impl SeasonalType {
    fn short(self) -> &'static str {
        match self {
            SeasonalType::Additive => "add",
            SeasonalType::Multiplicative => "mul",
        }
    }
}

/// One weekly model configuration: trend type, seasonal type, damping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelConfig {
    pub trend: TrendType,
    pub seasonal: Option<SeasonalType>,
    pub damped: bool,
}

impl ModelConfig {
    /// Trend-only model used when no seasonal configuration fits.
    pub const FALLBACK: ModelConfig = ModelConfig::new(TrendType::Additive, None, true);

    pub const fn new(trend: TrendType, seasonal: Option<SeasonalType>, damped: bool) -> Self {
        Self {
            trend,
            seasonal,
            damped,
        }
    }

    /// The eight seasonal configurations in evaluation order.
    ///
    /// Earlier entries win exact AIC ties.
    pub fn grid() -> [ModelConfig; 8] {
        use SeasonalType as S;
        use TrendType as T;
        [
            Self::new(T::Additive, Some(S::Additive), true),
            Self::new(T::Additive, Some(S::Additive), false),
            Self::new(T::Additive, Some(S::Multiplicative), true),
            Self::new(T::Additive, Some(S::Multiplicative), false),
            Self::new(T::Multiplicative, Some(S::Additive), true),
            Self::new(T::Multiplicative, Some(S::Additive), false),
            Self::new(T::Multiplicative, Some(S::Multiplicative), true),
            Self::new(T::Multiplicative, Some(S::Multiplicative), false),
        ]
    }

    pub fn is_seasonal(&self) -> bool {
        self.seasonal.is_some()
    }

    /// Whether any component requires strictly positive data.
    pub fn is_multiplicative(&self) -> bool {
        self.trend == TrendType::Multiplicative
            || self.seasonal == Some(SeasonalType::Multiplicative)
    }

    /// Number of smoothing parameters estimated for this configuration.
    pub fn n_smoothing_params(&self) -> usize {
        2 + usize::from(self.is_seasonal()) + usize::from(self.damped)
    }
}

impl fmt::Display for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seasonal = self.seasonal.map_or("none", SeasonalType::short);
        write!(
            f,
            "({}, {}, damped={})",
            self.trend.short(),
            seasonal,
            self.damped
        )
    }
}

/// Fitted smoothing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothingParams {
    pub alpha: f64,
    pub beta: f64,
    /// Seasonal smoothing, present for seasonal configurations.
    pub gamma: Option<f64>,
    /// Damping factor, present for damped configurations.
    pub phi: Option<f64>,
}

impl SmoothingParams {
    fn from_vector(v: &[f64], config: ModelConfig) -> Self {
        let mut it = v.iter().copied();
        let alpha = it.next().unwrap_or(0.3);
        let beta = it.next().unwrap_or(0.1);
        let gamma = if config.is_seasonal() { it.next() } else { None };
        let phi = if config.damped { it.next() } else { None };
        Self {
            alpha,
            beta,
            gamma,
            phi,
        }
    }

    fn damping(&self) -> f64 {
        self.phi.unwrap_or(1.0)
    }
}

/// Starting point and box constraints for the parameter search.
fn search_space(config: ModelConfig) -> (Vec<f64>, Vec<Bound>) {
    let mut start = vec![0.3, 0.1];
    let mut bounds = vec![SMOOTHING_BOUNDS, SMOOTHING_BOUNDS];
    if config.is_seasonal() {
        start.push(0.1);
        bounds.push(SMOOTHING_BOUNDS);
    }
    if config.damped {
        start.push(0.9);
        bounds.push(PHI_BOUNDS);
    }
    (start, bounds)
}

/// `φ + φ² + … + φ^h`, or `h` when undamped.
fn damped_steps(phi: f64, h: usize) -> f64 {
    if (phi - 1.0).abs() < 1e-10 {
        h as f64
    } else {
        phi * (1.0 - phi.powi(h as i32)) / (1.0 - phi)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct State {
    level: f64,
    trend: f64,
    seasonals: Vec<f64>,
}

/// Recursion for one configuration and parameter set.
struct Recursion<'a> {
    config: ModelConfig,
    params: &'a SmoothingParams,
    period: usize,
}

impl Recursion<'_> {
    fn base(&self, state: &State, steps: f64) -> f64 {
        match self.config.trend {
            TrendType::Additive => state.level + steps * state.trend,
            TrendType::Multiplicative => state.level * state.trend.powf(steps),
        }
    }

    fn season(&self, state: &State, t: usize) -> f64 {
        match self.config.seasonal {
            Some(_) => state.seasonals[t % self.period],
            None => 0.0,
        }
    }

    fn combine(&self, base: f64, season: f64) -> f64 {
        match self.config.seasonal {
            None => base,
            Some(SeasonalType::Additive) => base + season,
            Some(SeasonalType::Multiplicative) => base * season,
        }
    }

    /// Prediction for time index `t` from the state after `t - 1`.
    fn one_step(&self, state: &State, t: usize) -> f64 {
        let base = self.base(state, self.params.damping());
        self.combine(base, self.season(state, t))
    }

    fn update(&self, state: &mut State, y: f64, t: usize) {
        let SmoothingParams {
            alpha, beta, gamma, ..
        } = *self.params;
        let phi = self.params.damping();
        let base = self.base(state, phi);
        let season = self.season(state, t);

        let target = match self.config.seasonal {
            None => y,
            Some(SeasonalType::Additive) => y - season,
            Some(SeasonalType::Multiplicative) => y / season,
        };

        let level_prev = state.level;
        state.level = alpha * target + (1.0 - alpha) * base;
        state.trend = match self.config.trend {
            TrendType::Additive => {
                beta * (state.level - level_prev) + (1.0 - beta) * phi * state.trend
            }
            TrendType::Multiplicative => {
                beta * (state.level / level_prev) + (1.0 - beta) * state.trend.powf(phi)
            }
        };

        if let (Some(kind), Some(gamma)) = (self.config.seasonal, gamma) {
            let idx = t % self.period;
            state.seasonals[idx] = match kind {
                SeasonalType::Additive => gamma * (y - state.level) + (1.0 - gamma) * season,
                SeasonalType::Multiplicative => gamma * (y / state.level) + (1.0 - gamma) * season,
            };
        }
    }

    fn is_valid(&self, state: &State) -> bool {
        if !state.level.is_finite()
            || !state.trend.is_finite()
            || state.seasonals.iter().any(|s| !s.is_finite())
        {
            return false;
        }
        if self.config.trend == TrendType::Multiplicative
            && (state.level <= 0.0 || state.trend <= 0.0)
        {
            return false;
        }
        if self.config.seasonal == Some(SeasonalType::Multiplicative)
            && (state.level <= 0.0 || state.seasonals.iter().any(|&s| s <= 0.0))
        {
            return false;
        }
        true
    }

    /// Run the filter over `values[start..]`, returning the final state and
    /// one-step residuals, or `None` on numerical breakdown.
    fn filter(&self, values: &[f64], start: usize, init: &State) -> Option<(State, Vec<f64>)> {
        let mut state = init.clone();
        let mut residuals = Vec::with_capacity(values.len().saturating_sub(start));
        for (t, &y) in values.iter().enumerate().skip(start) {
            let forecast = self.one_step(&state, t);
            if !forecast.is_finite() {
                return None;
            }
            residuals.push(y - forecast);
            self.update(&mut state, y, t);
            if !self.is_valid(&state) {
                return None;
            }
        }
        Some((state, residuals))
    }
}

/// Observations consumed by initialisation before the first one-step error.
fn warmup(config: ModelConfig, period: usize) -> usize {
    if config.is_seasonal() {
        period
    } else {
        1
    }
}

fn minimum_length(config: ModelConfig, period: usize) -> usize {
    if config.is_seasonal() {
        2 * period
    } else {
        3
    }
}

/// Heuristic initial states.
///
/// Seasonal models take the level from the first cycle and the trend from
/// the difference (or ratio) between the first two cycles. Trend-only models
/// start from the first two observations.
fn initial_state(values: &[f64], config: ModelConfig, period: usize) -> Option<State> {
    let state = match config.seasonal {
        Some(kind) => {
            let first = &values[..period];
            let second = &values[period..2 * period];
            let level = first.iter().sum::<f64>() / period as f64;
            let trend = match config.trend {
                TrendType::Additive => {
                    first
                        .iter()
                        .zip(second)
                        .map(|(a, b)| (b - a) / period as f64)
                        .sum::<f64>()
                        / period as f64
                }
                TrendType::Multiplicative => {
                    let second_level = second.iter().sum::<f64>() / period as f64;
                    (second_level / level).powf(1.0 / period as f64)
                }
            };
            let mut seasonals: Vec<f64> = match kind {
                SeasonalType::Additive => first.iter().map(|y| y - level).collect(),
                SeasonalType::Multiplicative => first.iter().map(|y| y / level).collect(),
            };
            normalize_seasonals(&mut seasonals, kind);
            State {
                level,
                trend,
                seasonals,
            }
        }
        None => State {
            level: values[0],
            trend: match config.trend {
                TrendType::Additive => values[1] - values[0],
                TrendType::Multiplicative => values[1] / values[0],
            },
            seasonals: Vec::new(),
        },
    };

    let check = SmoothingParams {
        alpha: 0.5,
        beta: 0.5,
        gamma: None,
        phi: None,
    };
    let recursion = Recursion {
        config,
        params: &check,
        period,
    };
    recursion.is_valid(&state).then_some(state)
}

/// Additive seasonals sum to 0, multiplicative seasonals average to 1.
fn normalize_seasonals(seasonals: &mut [f64], kind: SeasonalType) {
    let period = seasonals.len() as f64;
    match kind {
        SeasonalType::Additive => {
            let adjustment = seasonals.iter().sum::<f64>() / period;
            seasonals.iter_mut().for_each(|s| *s -= adjustment);
        }
        SeasonalType::Multiplicative => {
            let mean = seasonals.iter().sum::<f64>() / period;
            if mean.abs() > 1e-10 {
                seasonals.iter_mut().for_each(|s| *s /= mean);
            }
        }
    }
}

/// A fitted Holt-Winters model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoltWinters {
    config: ModelConfig,
    period: usize,
    params: SmoothingParams,
    state: State,
    residuals: Vec<f64>,
    n_obs: usize,
    sse: f64,
    aic: f64,
}

impl HoltWinters {
    /// Fit `config` to `values` with seasonal period `period`.
    ///
    /// Smoothing parameters minimise the in-sample sum of squared one-step
    /// errors. Fails with `InsufficientData` when the series is too short and
    /// `ComputationError` when no parameter set yields a finite fit.
    pub fn fit(values: &[f64], config: ModelConfig, period: usize) -> Result<Self> {
        if config.is_seasonal() && period < 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "seasonal period must be at least 2, got {period}"
            )));
        }
        let needed = minimum_length(config, period);
        if values.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: values.len(),
            });
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ComputationError(
                "series contains non-finite values".to_string(),
            ));
        }
        if config.is_multiplicative() && values.iter().any(|&v| v <= 0.0) {
            return Err(ForecastError::ComputationError(
                "multiplicative components require strictly positive data".to_string(),
            ));
        }

        let start = warmup(config, period);
        let init = initial_state(values, config, period).ok_or_else(|| {
            ForecastError::ComputationError(format!("invalid initial state for {config}"))
        })?;

        let objective = |v: &[f64]| {
            let params = SmoothingParams::from_vector(v, config);
            let recursion = Recursion {
                config,
                params: &params,
                period,
            };
            match recursion.filter(values, start, &init) {
                Some((_, residuals)) => residuals.iter().map(|r| r * r).sum(),
                None => f64::INFINITY,
            }
        };

        let (x0, bounds) = search_space(config);
        let result = nelder_mead(objective, &x0, &bounds, &NelderMeadConfig::default());
        if !result.optimal_value.is_finite() {
            return Err(ForecastError::ComputationError(format!(
                "no finite fit found for {config}"
            )));
        }

        let params = SmoothingParams::from_vector(&result.optimal_point, config);
        let recursion = Recursion {
            config,
            params: &params,
            period,
        };
        let (state, residuals) = recursion.filter(values, start, &init).ok_or_else(|| {
            ForecastError::ComputationError(format!("filter diverged for {config}"))
        })?;

        let sse: f64 = residuals.iter().map(|r| r * r).sum();
        let n = residuals.len() as f64;
        let k = config.n_smoothing_params() + 2 + if config.is_seasonal() { period } else { 0 };
        let mse = (sse / n).max(f64::MIN_POSITIVE);
        let aic = n * mse.ln() + 2.0 * k as f64;

        Ok(Self {
            config,
            period,
            params,
            state,
            residuals,
            n_obs: values.len(),
            sse,
            aic,
        })
    }

    pub fn params(&self) -> &SmoothingParams {
        &self.params
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Sum of squared one-step errors.
    pub fn sse(&self) -> f64 {
        self.sse
    }

    /// Number of observations the model was fitted on.
    pub fn n_obs(&self) -> usize {
        self.n_obs
    }

    pub fn level(&self) -> f64 {
        self.state.level
    }

    pub fn trend(&self) -> f64 {
        self.state.trend
    }

    pub fn seasonals(&self) -> &[f64] {
        &self.state.seasonals
    }

    fn recursion(&self) -> Recursion<'_> {
        Recursion {
            config: self.config,
            params: &self.params,
            period: self.period,
        }
    }
}

impl WeeklyModel for HoltWinters {
    fn config(&self) -> ModelConfig {
        self.config
    }

    fn aic(&self) -> f64 {
        self.aic
    }

    fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        let recursion = self.recursion();
        let phi = self.params.damping();
        let forecast: Vec<f64> = (1..=horizon)
            .map(|h| {
                let base = recursion.base(&self.state, damped_steps(phi, h));
                recursion.combine(base, recursion.season(&self.state, self.n_obs + h - 1))
            })
            .collect();

        if forecast.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ComputationError(
                "non-finite point forecast".to_string(),
            ));
        }
        Ok(forecast)
    }

    fn simulate<R: Rng + ?Sized>(
        &self,
        horizon: usize,
        repetitions: usize,
        rng: &mut R,
    ) -> Result<Vec<Vec<f64>>> {
        let sigma = self.residual_std();
        let noise = Normal::new(0.0, sigma).map_err(|e| {
            ForecastError::ComputationError(format!("invalid innovation scale {sigma}: {e}"))
        })?;
        let recursion = self.recursion();

        let mut paths = vec![Vec::with_capacity(repetitions); horizon];
        for _ in 0..repetitions {
            let mut state = self.state.clone();
            for (step, column) in paths.iter_mut().enumerate() {
                let t = self.n_obs + step;
                let y = recursion.one_step(&state, t) + noise.sample(rng);
                if !y.is_finite() {
                    return Err(ForecastError::ComputationError(
                        "simulated path diverged".to_string(),
                    ));
                }
                column.push(y);
                recursion.update(&mut state, y, t);
                if !recursion.is_valid(&state) {
                    return Err(ForecastError::ComputationError(
                        "simulated state left the valid region".to_string(),
                    ));
                }
            }
        }
        Ok(paths)
    }

    fn residuals(&self) -> &[f64] {
        &self.residuals
    }
}

/// Fits [`HoltWinters`] models with a fixed seasonal period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoltWintersFitter {
    period: usize,
}

impl HoltWintersFitter {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Default for HoltWintersFitter {
    fn default() -> Self {
        Self::new(7)
    }
}

impl WeeklyFitter for HoltWintersFitter {
    type Model = HoltWinters;

    fn fit(&self, values: &[f64], config: ModelConfig) -> Result<HoltWinters> {
        HoltWinters::fit(values, config, self.period)
    }
}
