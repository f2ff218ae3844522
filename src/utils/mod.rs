//! Numerical helpers shared by the pipeline stages.

pub mod metrics;
pub mod optimization;
pub mod stats;

pub use metrics::{calculate_metrics, error_pct, AccuracyMetrics};
pub use optimization::{nelder_mead, NelderMeadConfig, NelderMeadResult};
pub use stats::{mean, normal_critical_value, percentile, quantile};
