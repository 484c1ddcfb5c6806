//! Simple Moving Average (SMA).
//!
//! Rolling unweighted mean over a fixed window, maintained with a running sum
//! so each step costs O(1). A NaN anywhere in the window makes that position
//! undefined.
//! Lookback: window - 1 (first valid value at index window-1).

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Sma {
    window: usize,
    name: String,
}

impl Sma {
    pub fn new(window: usize) -> Self {
        assert!(window >= 1, "SMA window must be >= 1");
        Self {
            window,
            name: format!("sma_{window}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        moving_average(&closes, self.window)
    }
}

/// Rolling mean of `values` over `window` entries.
///
/// Returns a series of the same length; positions before `window - 1`, and
/// any position whose window contains a NaN, are NaN. `window == 0` yields an
/// all-NaN series.
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if window == 0 || n < window {
        return result;
    }

    // Sum of the finite values in the window, and how many NaNs it holds.
    let mut sum = 0.0;
    let mut nan_in_window = 0usize;

    for (i, &entering) in values.iter().enumerate() {
        if entering.is_nan() {
            nan_in_window += 1;
        } else {
            sum += entering;
        }

        if i >= window {
            let leaving = values[i - window];
            if leaving.is_nan() {
                nan_in_window -= 1;
            } else {
                sum -= leaving;
            }
        }

        if i + 1 >= window && nan_in_window == 0 {
            result[i] = sum / window as f64;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::make_bars;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn sma_5_basic() {
        let result = moving_average(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0], 5);

        assert_eq!(result.len(), 7);
        for (i, v) in result.iter().enumerate().take(4) {
            assert!(v.is_nan(), "expected NaN at index {i}");
        }
        // SMA[4] = mean(10,11,12,13,14) = 12.0
        assert_approx(result[4], 12.0, DEFAULT_EPSILON);
        assert_approx(result[5], 13.0, DEFAULT_EPSILON);
        assert_approx(result[6], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_1_is_identity() {
        let result = moving_average(&[100.0, 200.0, 300.0], 1);
        assert_eq!(result, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn sma_matches_full_recompute() {
        let values: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let window = 7;
        let rolled = moving_average(&values, window);
        for i in (window - 1)..values.len() {
            let direct: f64 =
                values[i + 1 - window..=i].iter().sum::<f64>() / window as f64;
            assert_approx(rolled[i], direct, 1e-9);
        }
    }

    #[test]
    fn sma_nan_propagation() {
        let values = [10.0, 11.0, f64::NAN, 13.0, 14.0, 15.0];
        let result = moving_average(&values, 3);
        // Windows [10,11,NaN], [11,NaN,13], [NaN,13,14] → NaN
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
        assert!(result[4].is_nan());
        // [13,14,15] → 14.0
        assert_approx(result[5], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_too_few_values() {
        let result = moving_average(&[10.0, 11.0], 5);
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn sma_zero_window_is_undefined() {
        let result = moving_average(&[10.0, 11.0], 0);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn sma_indicator_reads_closes() {
        let bars = make_bars(&[1.0, 2.0, 3.0, 4.0]);
        let sma = Sma::new(2);
        assert_eq!(sma.name(), "sma_2");
        assert_eq!(sma.lookback(), 1);
        let result = sma.compute(&bars);
        assert!(result[0].is_nan());
        assert_approx(result[1], 1.5, DEFAULT_EPSILON);
        assert_approx(result[3], 3.5, DEFAULT_EPSILON);
    }
}
