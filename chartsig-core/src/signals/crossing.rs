//! Edge-crossing detection over indicator streams.
//!
//! All three detectors share one rule: a Buy fires when a lead line moves
//! from at-or-below a reference line to strictly above it, a Sell on the
//! mirror move. Only the previous sample is remembered.

use crate::domain::{PriceSeries, SeriesError, SignalKind, SignalPoint, SignalSeries};
use tracing::debug;

/// Direction of a lead/reference crossing between two consecutive samples.
///
/// Buy: prev_lead <= prev_ref and lead > reference.
/// Sell: prev_lead >= prev_ref and lead < reference.
/// Any NaN among the four inputs compares false, so nothing fires.
pub fn cross_direction(
    prev_lead: f64,
    prev_ref: f64,
    lead: f64,
    reference: f64,
) -> Option<SignalKind> {
    if prev_lead <= prev_ref && lead > reference {
        Some(SignalKind::Buy)
    } else if prev_lead >= prev_ref && lead < reference {
        Some(SignalKind::Sell)
    } else {
        None
    }
}

/// Walk `samples` pairwise and record a `SignalPoint` wherever `classify`
/// reports a crossing.
///
/// `classify(prev, current)` returns the direction and the indicator value to
/// attach to the point. Index 0 never fires. `samples` must be aligned to
/// `series`.
pub fn detect_crossings<T, C>(
    series: &PriceSeries,
    what: &'static str,
    samples: &[T],
    classify: C,
) -> Result<SignalSeries, SeriesError>
where
    T: Copy,
    C: Fn(T, T) -> Option<(SignalKind, f64)>,
{
    series.ensure_aligned(what, samples.len())?;

    let mut out: SignalSeries = vec![None; samples.len()];
    let mut previous: Option<T> = None;

    for (i, &current) in samples.iter().enumerate() {
        if let Some(prev) = previous {
            if let Some((kind, value)) = classify(prev, current) {
                out[i] = Some(SignalPoint {
                    index: i,
                    timestamp: series.bars()[i].timestamp,
                    kind,
                    value,
                });
            }
        }
        previous = Some(current);
    }

    debug!(
        stream = what,
        crossings = out.iter().flatten().count(),
        "detected crossings"
    );
    Ok(out)
}

/// MACD histogram sign flips: Buy on <= 0 → > 0, Sell on >= 0 → < 0.
pub fn macd_crossings(
    series: &PriceSeries,
    histogram: &[f64],
) -> Result<SignalSeries, SeriesError> {
    detect_crossings(series, "macd histogram", histogram, |prev, cur| {
        cross_direction(prev, 0.0, cur, 0.0).map(|kind| (kind, cur))
    })
}

/// Close price crossing its moving average.
pub fn price_ma_crossings(
    series: &PriceSeries,
    ma: &[f64],
) -> Result<SignalSeries, SeriesError> {
    series.ensure_aligned("moving average", ma.len())?;
    let pairs: Vec<(f64, f64)> = series
        .bars()
        .iter()
        .map(|b| b.close)
        .zip(ma.iter().copied())
        .collect();
    detect_crossings(
        series,
        "moving average",
        &pairs,
        |(prev_close, prev_ma), (close, ma)| {
            cross_direction(prev_close, prev_ma, close, ma).map(|kind| (kind, ma))
        },
    )
}

/// Stochastic %K crossing %D.
pub fn stochastic_crossings(
    series: &PriceSeries,
    k: &[f64],
    d: &[f64],
) -> Result<SignalSeries, SeriesError> {
    series.ensure_aligned("stochastic %K", k.len())?;
    series.ensure_aligned("stochastic %D", d.len())?;
    let pairs: Vec<(f64, f64)> = k.iter().copied().zip(d.iter().copied()).collect();
    detect_crossings(series, "stochastic", &pairs, |(prev_k, prev_d), (k, d)| {
        cross_direction(prev_k, prev_d, k, d).map(|kind| (kind, k))
    })
}
