//! Per-channel pipeline stages: training, forecast generation, target
//! redistribution and backtesting.
//!
//! Each stage is a pure function of its inputs, so channels can be
//! processed independently and in parallel.

mod backtest;
mod generate;
mod targets;
mod train;

pub use backtest::{backtest, BacktestPoint, BacktestReport};
pub use generate::{
    generate_forecast, ForecastOutput, ForecastRequest, ForecastWarning, IntervalMethod,
};
pub use targets::{redistribute_targets, ZeroTotalPolicy};
pub use train::{deseasonalize, train_channel, TrainedModel};
