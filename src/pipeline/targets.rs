//! Rescaling forecast months to client-supplied totals.

use crate::core::{ForecastSeries, MonthKey, MonthlyTarget};
use crate::pipeline::ForecastWarning;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// What to do with a target month whose natural forecast total is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroTotalPolicy {
    /// Keep the month at zero.
    LeaveZero,
    /// Spread the target evenly over the month's non-holiday days, with both
    /// bounds equal to the spread value.
    #[default]
    SpreadEvenly,
}

/// Rescale each targeted month so its `yhat` sums to the target volume.
///
/// Months with a positive total are scaled proportionally, bounds included,
/// so the daily shape and any zeroed holidays are kept. Months outside the
/// forecast are skipped. Zero-total months follow `policy`; `holidays` must
/// be sorted.
pub fn redistribute_targets(
    forecast: &mut ForecastSeries,
    targets: &[MonthlyTarget],
    holidays: &[NaiveDate],
    policy: ZeroTotalPolicy,
) -> Vec<ForecastWarning> {
    let mut warnings = Vec::new();

    for target in targets {
        let month = target.month;
        let days = forecast.month_points_mut(month).count();
        if days == 0 {
            debug!(channel = %forecast.channel, %month, "target month outside forecast, skipped");
            continue;
        }

        let current = forecast.month_total(month);
        if current > 0.0 {
            let factor = target.volume / current;
            forecast
                .month_points_mut(month)
                .for_each(|p| p.scale(factor));
            continue;
        }

        match policy {
            ZeroTotalPolicy::LeaveZero => {
                warn!(
                    channel = %forecast.channel,
                    %month,
                    "target month has zero forecast, left at zero"
                );
                warnings.push(ForecastWarning::ZeroTotalMonth {
                    month,
                    spread: false,
                });
            }
            ZeroTotalPolicy::SpreadEvenly => {
                let spread = spread_evenly(forecast, month, target.volume, holidays);
                if !spread {
                    warn!(
                        channel = %forecast.channel,
                        %month,
                        "target month has no working days, left at zero"
                    );
                }
                warnings.push(ForecastWarning::ZeroTotalMonth { month, spread });
            }
        }
    }

    warnings
}

/// Assign `volume / n` to each of the month's `n` non-holiday days.
/// Returns false when every day of the month is a holiday.
fn spread_evenly(
    forecast: &mut ForecastSeries,
    month: MonthKey,
    volume: f64,
    holidays: &[NaiveDate],
) -> bool {
    let is_working = |d: &NaiveDate| holidays.binary_search(d).is_err();
    let working = forecast
        .month_points_mut(month)
        .filter(|p| is_working(&p.date))
        .count();
    if working == 0 {
        return false;
    }

    let share = volume / working as f64;
    for p in forecast.month_points_mut(month) {
        if is_working(&p.date) {
            p.yhat = share;
            p.yhat_lower = share;
            p.yhat_upper = share;
        }
    }
    true
}
