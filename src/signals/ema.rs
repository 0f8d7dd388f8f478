//! EMA (Exponential Moving Average) over close series

/// EMA of `values` for `period`, seeded with the SMA of the first `period` values
pub fn ema(values: &[f64], period: usize) -> Option<f64> {
    ema_series(values, period).last().copied().flatten()
}

/// EMA at every index; `None` until `period` values are available
pub fn ema_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut series = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return series;
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut current = values[..period].iter().sum::<f64>() / period as f64;
    series[period - 1] = Some(current);

    for (i, value) in values.iter().enumerate().skip(period) {
        current = (value - current) * multiplier + current;
        series[i] = Some(current);
    }
    series
}

/// Check for EMA cross (e.g., EMA 12 above/below EMA 26)
///
/// `1` bullish, `-1` bearish, `0` flat.
pub fn check_ema_cross(closes: &[f64], fast_period: usize, slow_period: usize) -> Option<i32> {
    let fast = ema(closes, fast_period)?;
    let slow = ema(closes, slow_period)?;

    if fast > slow {
        Some(1)
    } else if fast < slow {
        Some(-1)
    } else {
        Some(0)
    }
}
