//! Core data structures for daily volume forecasting.

mod forecast;
mod month;
mod observation;
mod time_series;

pub use forecast::{ForecastPoint, ForecastSeries};
pub use month::{MonthKey, MonthlyTarget};
pub use observation::{Dataset, Observation};
pub use time_series::DailySeries;
