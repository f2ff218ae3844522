//! Weekly forecasting models.

pub mod exponential;
pub mod traits;

pub use exponential::{HoltWinters, HoltWintersFitter, ModelConfig, WeeklyModelSelector};
pub use traits::{WeeklyFitter, WeeklyModel};
