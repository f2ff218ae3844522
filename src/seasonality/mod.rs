//! Seasonal patterns of daily contact volume.
//!
//! - [`MonthlyFactors`]: multiplicative month-of-year indices removed before
//!   weekly modelling and re-applied to forecasts
//! - [`weekday_effects`] and [`WeeklyDecomposition`]: introspection of the
//!   7-day cycle

mod monthly;
mod weekly;

pub use monthly::MonthlyFactors;
pub use weekly::{weekday_effects, WeekdayEffect, WeeklyDecomposition};
