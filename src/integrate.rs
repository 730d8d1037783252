use anyhow::{Error, ensure};
use log::warn;

/// Integrates `values` sampled at `time` with the cumulative trapezoidal rule.
///
/// The integral starts at zero on the first sample, every further entry adds
/// the area of the trapezoid spanned by the current and the previous sample:
///
/// `d[i] = d[i-1] + (t[i] - t[i-1]) * (v[i] + v[i-1]) / 2`
///
/// # Errors
///
/// Fails if `time` and `values` do not have the same length.
pub fn cumulative_trapezoid(time: &[f64], values: &[f64]) -> Result<Vec<f64>, Error> {
    ensure!(
        time.len() == values.len(),
        "Cannot integrate {} values over {} timestamps",
        values.len(),
        time.len()
    );

    if time.windows(2).any(|t| t[1] <= t[0]) {
        warn!("Timestamps are not strictly increasing, integral may be meaningless");
    }

    let mut integral = Vec::with_capacity(values.len());
    if values.is_empty() {
        return Ok(integral);
    }

    let mut running = 0.0;
    integral.push(running);
    for (t, v) in time.windows(2).zip(values.windows(2)) {
        running += (t[1] - t[0]) * (v[1] + v[0]) / 2.0;
        integral.push(running);
    }

    Ok(integral)
}
