//! Lap-time trend estimation.
//!
//! Fits an ordinary-least-squares line to lap time against lap index and
//! reports the slope: seconds of pace lost per lap when positive, gained
//! when negative.

/// Minimum number of lap times for a meaningful trend.
const MIN_SAMPLES: usize = 3;

/// Least-squares slope of lap time against lap index.
///
/// Returns 0.0 for fewer than three samples; a trend over one or two laps is
/// noise, not degradation. Indices run 0..n-1 regardless of lap numbering, so
/// gaps in the lap numbers do not distort the fit. The denominator cannot be
/// zero for distinct indices, but the guard keeps a degenerate input from
/// turning into a division fault.
#[must_use]
#[expect(
    clippy::cast_precision_loss,
    reason = "lap counts are far below 2^52"
)]
pub fn degradation_rate(times: &[f64]) -> f64 {
    if times.len() < MIN_SAMPLES {
        return 0.0;
    }

    let n = times.len() as f64;
    let mut x_sum = 0.0;
    let mut y_sum = 0.0;
    let mut xy_sum = 0.0;
    let mut x2_sum = 0.0;
    for (index, time) in times.iter().enumerate() {
        let x = index as f64;
        x_sum += x;
        y_sum += time;
        xy_sum += x * time;
        x2_sum += x * x;
    }

    let denominator = n * x2_sum - x_sum * x_sum;
    if denominator.abs() < f64::EPSILON {
        return 0.0;
    }
    (n * xy_sum - x_sum * y_sum) / denominator
}
