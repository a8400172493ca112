//! 1D signal conditioning and cross-correlation.

/// Standard deviation below which a signal is treated as constant
pub const DEGENERATE_STD: f64 = 1e-6;

/// Standardized signal
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub values: Vec<f64>,
    /// Standard deviation was below [`DEGENERATE_STD`]; values are only mean-centred
    pub degenerate: bool,
}

/// Subtract the mean and divide by the population standard deviation
///
/// A near-constant signal is divided by 1 instead.
pub fn normalize(signal: &[f64]) -> Normalized {
    if signal.is_empty() {
        return Normalized {
            values: Vec::new(),
            degenerate: true,
        };
    }

    let n = signal.len() as f64;
    let mean = signal.iter().sum::<f64>() / n;
    let variance = signal.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();

    let degenerate = std.is_nan() || std < DEGENERATE_STD;
    let scale = if degenerate { 1.0 } else { std };

    Normalized {
        values: signal.iter().map(|v| (v - mean) / scale).collect(),
        degenerate,
    }
}

/// Centred moving average
///
/// The window shrinks at the edges instead of padding. A signal shorter than
/// the window, or a window of 0 or 1, is returned unchanged.
pub fn smooth(signal: &[f64], window: usize) -> Vec<f64> {
    let n = signal.len();
    if window <= 1 || n < window {
        return signal.to_vec();
    }

    let mut prefix = vec![0.0; n + 1];
    for (i, v) in signal.iter().enumerate() {
        prefix[i + 1] = prefix[i] + v;
    }

    let before = (window - 1) / 2;
    let after = window / 2;
    (0..n)
        .map(|i| {
            let left = i.saturating_sub(before);
            let right = (i + after + 1).min(n);
            (prefix[right] - prefix[left]) / (right - left) as f64
        })
        .collect()
}

/// Peak of the full cross-correlation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationPeak {
    /// Telemetry index minus video index at the peak
    pub lag: i64,
    pub value: f64,
}

/// Full cross-correlation of `video` against `telemetry`
///
/// `correlation(lag) = sum_n video[n] * telemetry[n + lag]` for lags from
/// `-(video.len() - 1)` to `telemetry.len() - 1`, optionally restricted to
/// `|lag| <= max_lag`. Ties resolve to the smallest lag. `None` when either
/// signal is empty or no lag is admissible.
pub fn cross_correlate(
    video: &[f64],
    telemetry: &[f64],
    max_lag: Option<usize>,
) -> Option<CorrelationPeak> {
    if video.is_empty() || telemetry.is_empty() {
        return None;
    }

    let lv = video.len() as i64;
    let lt = telemetry.len() as i64;
    let (mut lo, mut hi) = (-(lv - 1), lt - 1);
    if let Some(max_lag) = max_lag {
        let max_lag = max_lag as i64;
        lo = lo.max(-max_lag);
        hi = hi.min(max_lag);
    }

    let mut best: Option<CorrelationPeak> = None;
    for lag in lo..=hi {
        // n in [max(0, -lag), min(lv, lt - lag))
        let start = (-lag).max(0);
        let end = lv.min(lt - lag);
        let value: f64 = (start..end)
            .map(|n| video[n as usize] * telemetry[(n + lag) as usize])
            .sum();

        match best {
            Some(b) if value <= b.value => {}
            _ => best = Some(CorrelationPeak { lag, value }),
        }
    }
    best
}
