//! Stochastic oscillator (%K / %D).
//!
//! raw %K[t] = 100 * (close[t] - lowest low) / (highest high - lowest low),
//! over the `period` bars ending at t.
//! %K = SMA(raw %K, k_smoothing); %D = SMA(%K, d_smoothing).
//!
//! A window whose high-low range is zero has no defined position inside it,
//! so raw %K is NaN there rather than an infinity or 0/0.
//! Lookback (%K): period + k_smoothing - 2; (%D): one more d_smoothing - 1 on top.

use super::sma::moving_average;
use super::Indicator;
use crate::domain::Bar;
use serde::Serialize;

/// Which line of the stochastic oscillator to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StochasticLine {
    K,
    D,
}

/// Raw %K, smoothed %K and %D, index-aligned to the input bars.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StochasticLines {
    pub raw_k: Vec<f64>,
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

/// Compute the stochastic oscillator lines.
pub fn stochastic(
    bars: &[Bar],
    period: usize,
    k_smoothing: usize,
    d_smoothing: usize,
) -> StochasticLines {
    let raw_k = raw_k(bars, period);
    let k = moving_average(&raw_k, k_smoothing);
    let d = moving_average(&k, d_smoothing);
    StochasticLines { raw_k, k, d }
}

fn raw_k(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &bars[i + 1 - period..=i];
        let mut lowest = f64::INFINITY;
        let mut highest = f64::NEG_INFINITY;
        let mut has_nan = false;
        for bar in window {
            if bar.low.is_nan() || bar.high.is_nan() {
                has_nan = true;
                break;
            }
            lowest = lowest.min(bar.low);
            highest = highest.max(bar.high);
        }

        let close = bars[i].close;
        let range = highest - lowest;
        if has_nan || close.is_nan() || range <= 0.0 {
            continue;
        }

        result[i] = 100.0 * (close - lowest) / range;
    }

    result
}

#[derive(Debug, Clone)]
pub struct Stochastic {
    period: usize,
    k_smoothing: usize,
    d_smoothing: usize,
    line: StochasticLine,
    name: String,
}

impl Stochastic {
    fn with_line(
        period: usize,
        k_smoothing: usize,
        d_smoothing: usize,
        line: StochasticLine,
    ) -> Self {
        assert!(
            period >= 1 && k_smoothing >= 1 && d_smoothing >= 1,
            "stochastic periods must be >= 1"
        );
        let prefix = match line {
            StochasticLine::K => "stoch_k",
            StochasticLine::D => "stoch_d",
        };
        Self {
            period,
            k_smoothing,
            d_smoothing,
            line,
            name: format!("{prefix}_{period}_{k_smoothing}_{d_smoothing}"),
        }
    }

    pub fn k(period: usize, k_smoothing: usize, d_smoothing: usize) -> Self {
        Self::with_line(period, k_smoothing, d_smoothing, StochasticLine::K)
    }

    pub fn d(period: usize, k_smoothing: usize, d_smoothing: usize) -> Self {
        Self::with_line(period, k_smoothing, d_smoothing, StochasticLine::D)
    }
}

impl Indicator for Stochastic {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        let k = self.period + self.k_smoothing - 2;
        match self.line {
            StochasticLine::K => k,
            StochasticLine::D => k + self.d_smoothing - 1,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let lines = stochastic(bars, self.period, self.k_smoothing, self.d_smoothing);
        match self.line {
            StochasticLine::K => lines.k,
            StochasticLine::D => lines.d,
        }
    }
}
