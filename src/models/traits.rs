//! Interfaces between weekly models, their fitting, and the pipeline.

use crate::error::Result;
use crate::models::exponential::ModelConfig;
use crate::utils::stats::std_dev_population;
use rand::Rng;

/// A fitted weekly model on the de-seasonalised scale.
pub trait WeeklyModel {
    /// Configuration this model was fitted with.
    fn config(&self) -> ModelConfig;

    /// Akaike Information Criterion of the fit; lower is better.
    fn aic(&self) -> f64;

    /// Point forecast for steps `1..=horizon` after the last observation.
    fn forecast(&self, horizon: usize) -> Result<Vec<f64>>;

    /// Simulate `repetitions` future paths with additive Gaussian
    /// innovations, indexed `[step][repetition]`.
    fn simulate<R: Rng + ?Sized>(
        &self,
        horizon: usize,
        repetitions: usize,
        rng: &mut R,
    ) -> Result<Vec<Vec<f64>>>;

    /// In-sample one-step residuals.
    fn residuals(&self) -> &[f64];

    /// Population standard deviation of the residuals.
    fn residual_std(&self) -> f64 {
        std_dev_population(self.residuals())
    }
}

/// Fits one configuration to a de-seasonalised series.
///
/// Selection only sees this trait, so it can be driven by stubbed fits.
pub trait WeeklyFitter {
    type Model: WeeklyModel;

    fn fit(&self, values: &[f64], config: ModelConfig) -> Result<Self::Model>;
}
