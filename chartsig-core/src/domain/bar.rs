//! Bar, the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single symbol at a single instant.
///
/// `adj_close` is carried through from the chart-history response for
/// reference only; every indicator reads the unadjusted OHLC columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(default)]
    pub adj_close: Option<f64>,
}

impl Bar {
    /// Build a bar from an epoch-seconds timestamp, as delivered by chart APIs.
    ///
    /// Returns `None` when the timestamp is outside chrono's representable range.
    pub fn from_epoch(
        epoch_secs: i64,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Option<Self> {
        let timestamp = DateTime::from_timestamp(epoch_secs, 0)?;
        Some(Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            adj_close: None,
        })
    }

    /// Returns true if any OHLC field is NaN (a gap in the upstream data).
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Basic OHLC sanity check: high >= low and both bracket open and close.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.volume >= 0.0
    }
}
