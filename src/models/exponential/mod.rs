//! Exponential smoothing models for the weekly cycle.
//!
//! - [`HoltWinters`]: additive/multiplicative trend, optional damping,
//!   additive/multiplicative/no seasonality
//! - [`WeeklyModelSelector`]: AIC choice over the configuration grid with a
//!   trend-only fallback

mod holt_winters;
mod selection;

pub use holt_winters::{
    HoltWinters, HoltWintersFitter, ModelConfig, SeasonalType, SmoothingParams, TrendType,
};
pub use selection::{select_best, AttemptSummary, FitAttempt, Selection, WeeklyModelSelector};
