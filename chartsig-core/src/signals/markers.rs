//! Dense marker series for an external plotting layer.
//!
//! Plotters want one NaN-padded series per marker shape. Buy markers sit just
//! below the indicator reading and sell markers just above it, so they do not
//! cover the line they annotate.

use crate::domain::{SignalKind, SignalSeries};
use serde::Serialize;

/// How far a marker is drawn from the indicator reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkerOffset {
    /// Multiply the reading (price-scaled panels).
    Scale { buy: f64, sell: f64 },
    /// Add to the reading (0–100 oscillator panels).
    Shift { buy: f64, sell: f64 },
}

impl MarkerOffset {
    /// Price and MACD panels: 1% below for buys, 1% above for sells.
    pub const PERCENT: Self = MarkerOffset::Scale {
        buy: 0.99,
        sell: 1.01,
    };

    /// Stochastic panel: 5 points below for buys, 5 above for sells.
    pub const OSCILLATOR: Self = MarkerOffset::Shift {
        buy: -5.0,
        sell: 5.0,
    };

    fn apply(self, kind: SignalKind, value: f64) -> f64 {
        match (self, kind) {
            (MarkerOffset::Scale { buy, .. }, SignalKind::Buy) => value * buy,
            (MarkerOffset::Scale { sell, .. }, SignalKind::Sell) => value * sell,
            (MarkerOffset::Shift { buy, .. }, SignalKind::Buy) => value + buy,
            (MarkerOffset::Shift { sell, .. }, SignalKind::Sell) => value + sell,
        }
    }
}

/// Buy and sell marker positions, index-aligned to the price series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerSeries {
    pub buy: Vec<f64>,
    pub sell: Vec<f64>,
}

/// Expand a sparse signal stream into plot-ready marker series.
///
/// Markers are placed by their slot in `signals`; a point's own `index`
/// field is not trusted for placement.
pub fn markers(signals: &SignalSeries, offset: MarkerOffset) -> MarkerSeries {
    let mut buy = vec![f64::NAN; signals.len()];
    let mut sell = vec![f64::NAN; signals.len()];

    for (i, slot) in signals.iter().enumerate() {
        let Some(point) = slot else {
            continue;
        };
        let y = offset.apply(point.kind, point.value);
        match point.kind {
            SignalKind::Buy => buy[i] = y,
            SignalKind::Sell => sell[i] = y,
        }
    }

    MarkerSeries { buy, sell }
}
