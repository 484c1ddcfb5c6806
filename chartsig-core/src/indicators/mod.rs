//! Indicator engine: moving average, MACD, stochastic oscillator, RSI.
//!
//! Every indicator is a pure function from a bar (or close) series to one or
//! more numeric series of the same length. Positions without enough history
//! hold `f64::NAN`; a series shorter than an indicator's lookback comes back
//! entirely NaN rather than as an error.
//!
//! Multi-line indicators (MACD, stochastic) expose a free function returning
//! all lines at once, plus one `Indicator` instance per line.

pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stochastic;

pub use ema::{ema, ewm, Ema};
pub use macd::{macd, Macd, MacdLine, MacdLines};
pub use rsi::{rsi, Rsi, RSI_BLANKED, RSI_PERIOD};
pub use sma::{moving_average, Sma};
pub use stochastic::{stochastic, Stochastic, StochasticLine, StochasticLines};

use crate::domain::Bar;

/// Trait for indicators.
///
/// Indicators take a full bar series and produce a numeric output series of
/// the same length. The first `lookback()` values are `f64::NAN` (warmup).
///
/// No value at bar t may depend on bars after t.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_10", "macd_hist_8_17_9").
    fn name(&self) -> &str;

    /// Index of the first bar that can hold a defined value.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Index of the first defined (non-NaN) value, if any.
pub fn first_defined(series: &[f64]) -> Option<usize> {
    series.iter().position(|v| !v.is_nan())
}

/// Number of defined (non-NaN) values.
pub fn defined_count(series: &[f64]) -> usize {
    series.iter().filter(|v| !v.is_nan()).count()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
