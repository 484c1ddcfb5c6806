//! Relative Strength Index (RSI).
//!
//! Fixed 14-period Wilder smoothing (alpha = 1/14, i.e. center of mass 13)
//! of gains and of loss magnitudes, each an EMA seeded with the first change.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Edge cases: avg_loss == 0 with gains → 100; no movement at all → NaN.
//! The first `RSI_BLANKED` positions are always NaN, even where the recursion
//! already has a value, because the early readings are dominated by the seed.
//! Lookback: RSI_BLANKED.

use super::ema::ewm;
use super::Indicator;
use crate::domain::Bar;

/// Wilder smoothing period.
pub const RSI_PERIOD: usize = 14;

/// Number of leading positions forced to NaN.
pub const RSI_BLANKED: usize = 12;

#[derive(Debug, Clone, Default)]
pub struct Rsi;

impl Rsi {
    pub fn new() -> Self {
        Self
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        "rsi_14"
    }

    fn lookback(&self) -> usize {
        RSI_BLANKED
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        rsi(&closes)
    }
}

/// Compute the 14-period RSI of `closes`.
pub fn rsi(closes: &[f64]) -> Vec<f64> {
    let n = closes.len();

    // Change at index 0 is undefined; ewm skips it and seeds from index 1.
    let mut gains = vec![f64::NAN; n];
    let mut losses = vec![f64::NAN; n];
    for i in 1..n {
        let change = closes[i] - closes[i - 1];
        if change.is_nan() {
            continue;
        }
        gains[i] = change.max(0.0);
        losses[i] = (-change).max(0.0);
    }

    let alpha = 1.0 / RSI_PERIOD as f64;
    let avg_gain = ewm(&gains, alpha);
    let avg_loss = ewm(&losses, alpha);

    let mut result: Vec<f64> = avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&g, &l)| compute_rsi(g, l))
        .collect();

    for val in result.iter_mut().take(RSI_BLANKED) {
        *val = f64::NAN;
    }

    result
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain.is_nan() || avg_loss.is_nan() {
        f64::NAN
    } else if avg_loss == 0.0 && avg_gain == 0.0 {
        f64::NAN // no movement
    } else if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
