//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = EMA[t-1] + alpha * (value[t] - EMA[t-1]), alpha = 2 / (period + 1).
//! This form leaves a constant input exactly unchanged.
//! Seed: EMA at the first finite value equals that value (no SMA seed), so the
//! series is defined from the first bar onward.
//! Lookback: 0.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            name: format!("ema_{period}"),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        ema(&closes, self.period)
    }
}

/// EMA of an arbitrary series with span `period`. `period == 0` yields all NaN.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![f64::NAN; values.len()];
    }
    ewm(values, 2.0 / (period as f64 + 1.0))
}

/// Exponentially weighted mean with smoothing factor `alpha`, seeded with the
/// first finite value.
///
/// Leading NaNs stay NaN and do not seed. A NaN after the seed is reported as
/// NaN at that position while the running average carries over unchanged to
/// the next finite value.
pub fn ewm(values: &[f64], alpha: f64) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    let mut prev: Option<f64> = None;

    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        let next = match prev {
            None => v,
            Some(p) => p + alpha * (v - p),
        };
        result[i] = next;
        prev = Some(next);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::make_bars;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn ema_period_1_equals_input() {
        let result = ema(&[100.0, 200.0, 300.0], 1);
        assert_eq!(result, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn ema_3_known_values() {
        // alpha = 2/(3+1) = 0.5, seeded with the first close.
        // EMA[0] = 10
        // EMA[1] = 0.5*11 + 0.5*10 = 10.5
        // EMA[2] = 0.5*12 + 0.5*10.5 = 11.25
        // EMA[3] = 0.5*13 + 0.5*11.25 = 12.125
        let result = ema(&[10.0, 11.0, 12.0, 13.0], 3);
        assert_approx(result[0], 10.0, DEFAULT_EPSILON);
        assert_approx(result[1], 10.5, DEFAULT_EPSILON);
        assert_approx(result[2], 11.25, DEFAULT_EPSILON);
        assert_approx(result[3], 12.125, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_defined_from_first_bar() {
        let result = ema(&[42.0], 26);
        assert_eq!(result, vec![42.0]);
    }

    #[test]
    fn ewm_skips_leading_nan() {
        let result = ewm(&[f64::NAN, 4.0, 8.0], 0.5);
        assert!(result[0].is_nan());
        assert_approx(result[1], 4.0, DEFAULT_EPSILON);
        assert_approx(result[2], 6.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ewm_interior_nan_carries_state() {
        let result = ewm(&[4.0, f64::NAN, 8.0], 0.5);
        assert_approx(result[0], 4.0, DEFAULT_EPSILON);
        assert!(result[1].is_nan());
        assert_approx(result[2], 6.0, DEFAULT_EPSILON);
    }

    #[test]
    fn constant_input_stays_exact() {
        for value in [42.0, 0.1, 1234.567, 99.99] {
            for period in [3, 8, 12, 17, 26] {
                assert!(ema(&[value; 60], period).iter().all(|&v| v == value));
            }
        }
    }

    #[test]
    fn ema_zero_period_is_undefined() {
        assert!(ema(&[1.0, 2.0], 0).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn ema_indicator_matches_free_function() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let indicator = Ema::new(3);
        assert_eq!(indicator.name(), "ema_3");
        assert_eq!(indicator.compute(&bars), ema(&closes, 3));
    }
}
