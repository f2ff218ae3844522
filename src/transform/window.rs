//! Moving-window statistics.

/// Centered moving average over full windows only.
///
/// Positions whose window would run past either end of the series are
/// `NaN`, matching a centered rolling mean with `min_periods = window`.
/// Even windows are centered one step to the right.
pub fn centered_moving_average(series: &[f64], window: usize) -> Vec<f64> {
    let n = series.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 || window > n {
        return result;
    }

    let half = window / 2;
    let mut sum: f64 = series[..window].iter().sum();
    result[half] = sum / window as f64;
    for start in 1..=(n - window) {
        sum += series[start + window - 1] - series[start - 1];
        result[start + half] = sum / window as f64;
    }
    result
}
