//! # contact-forecast
//!
//! Daily contact-center volume forecasting.
//!
//! For each channel the pipeline winsorizes the history, removes monthly
//! seasonality, selects a weekly Holt-Winters model by AIC and projects it
//! forward with simulated intervals. Monthly factors are then re-applied,
//! bank holidays are zeroed and optional monthly targets are honoured.
//! Channels are independent and can be processed in parallel through
//! [`session::ForecastSession`].
//!
//! ```no_run
//! use contact_forecast::prelude::*;
//! use chrono::{Duration, NaiveDate};
//!
//! let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
//! let rows = (0..400)
//!     .map(|i| Observation::new("Calls", start + Duration::days(i), 1000.0))
//!     .collect();
//! let dataset = Dataset::from_observations(rows)?;
//!
//! let mut session = ForecastSession::new(dataset, PipelineConfig::default())?;
//! session.configure_bank_holidays("Calls", Some("US"));
//! let report = session.run_all(&ForecastRequest::default());
//! assert_eq!(report.failed().count(), 0);
//! # Ok::<(), contact_forecast::ForecastError>(())
//! ```

#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

pub mod analysis;
pub mod calendar;
pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod seasonality;
pub mod session;
pub mod transform;
pub mod utils;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::calendar::{HolidayCalendar, HolidayResolution, RuleCalendar};
    pub use crate::config::PipelineConfig;
    pub use crate::core::{
        DailySeries, Dataset, ForecastPoint, ForecastSeries, MonthKey, MonthlyTarget, Observation,
    };
    pub use crate::error::{ForecastError, Result};
    pub use crate::models::{ModelConfig, WeeklyFitter, WeeklyModel};
    pub use crate::pipeline::{
        ForecastOutput, ForecastRequest, ForecastWarning, TrainedModel, ZeroTotalPolicy,
    };
    pub use crate::session::{ChannelStatus, ForecastSession, RunReport};
    pub use crate::utils::{calculate_metrics, AccuracyMetrics};
}
