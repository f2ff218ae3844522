//! Read-only views over trained channels: roll-ups, comparisons with
//! actuals, seasonality insights and summaries.

pub mod aggregate;
pub mod comparison;
pub mod summary;

pub use aggregate::{
    compare_weeks, monthly_forecast, monthly_history, weekly_history, MonthlyForecast,
    MonthlyVolume, WeeklyVolume,
};
pub use comparison::{accuracy_against_actuals, blend, forecast_only, BlendedPoint};
pub use summary::{ChannelSummary, SeasonalityInsights};
