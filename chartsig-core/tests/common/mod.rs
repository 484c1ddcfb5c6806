//! Shared fixtures for integration tests.

#![allow(dead_code)]

use chartsig_core::domain::{Bar, PriceSeries};

/// Daily bars from closes. open = previous close, high/low bracket open and
/// close by 1.0.
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar::from_epoch(
                1_704_205_800 + i as i64 * 86_400,
                open,
                open.max(close) + 1.0,
                open.min(close) - 1.0,
                close,
                1_000.0,
            )
            .unwrap()
        })
        .collect()
}

pub fn series_from_closes(closes: &[f64]) -> PriceSeries {
    PriceSeries::new("TEST", bars_from_closes(closes)).unwrap()
}

/// Deterministic pseudo-random walk, floored at 10.
pub fn random_walk(n: usize) -> Vec<f64> {
    let mut price = 100.0;
    (0..n)
        .map(|i| {
            let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1);
            let change = ((seed >> 33) % 200) as f64 * 0.05 - 5.0;
            price = f64::max(price + change, 10.0);
            price
        })
        .collect()
}
