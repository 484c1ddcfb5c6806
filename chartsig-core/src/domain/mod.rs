//! Domain types: bars, validated price series, signals and confirmed events.

pub mod bar;
pub mod series;
pub mod signal;

pub use bar::Bar;
pub use series::{PriceSeries, SeriesError};
pub use signal::{ConfirmedEvent, ExtremeTag, SignalKind, SignalPoint, SignalSeries, Zone};

/// Create synthetic daily bars from close prices for testing.
///
/// open = prev_close (or close for the first bar), high = max(open, close) + 1,
/// low = min(open, close) - 1, volume = 1000. Timestamps start 2024-01-02 14:30 UTC.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base = chrono::DateTime::from_timestamp(1_704_205_800, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
                adj_close: Some(close),
            }
        })
        .collect()
}

/// Wrap `make_bars` output in a validated series.
#[cfg(test)]
pub fn make_series(closes: &[f64]) -> PriceSeries {
    PriceSeries::new("TEST", make_bars(closes)).unwrap()
}
