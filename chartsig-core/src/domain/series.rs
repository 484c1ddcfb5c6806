//! PriceSeries: a validated, time-ordered run of bars for one symbol.
//!
//! Every derived series (indicators, signals, markers) is index-aligned to a
//! `PriceSeries`, so ordering is checked once at construction and never again.

use super::bar::Bar;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Malformed input: the series or a set of derived series cannot be aligned.
#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("price series for {symbol} has no bars")]
    Empty { symbol: String },

    #[error("timestamps not strictly increasing at index {index}: {previous} then {current}")]
    NonMonotonic {
        index: usize,
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },

    #[error("{what} has length {actual}, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Ordered bars for a single symbol. Immutable once constructed.
#[derive(Debug, Clone, Serialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Validate ordering and take ownership of the bars.
    ///
    /// Duplicate or decreasing timestamps are rejected: downstream indices
    /// would otherwise silently misalign.
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, SeriesError> {
        let symbol = symbol.into();
        if bars.is_empty() {
            return Err(SeriesError::Empty { symbol });
        }
        for (i, pair) in bars.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(SeriesError::NonMonotonic {
                    index: i + 1,
                    previous: pair[0].timestamp,
                    current: pair[1].timestamp,
                });
            }
        }
        Ok(Self { symbol, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false for a constructed series.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    pub fn timestamp(&self, index: usize) -> Option<DateTime<Utc>> {
        self.bars.get(index).map(|b| b.timestamp)
    }

    /// Position of the bar stamped exactly `ts`, if any.
    pub fn position_of(&self, ts: DateTime<Utc>) -> Option<usize> {
        self.bars.binary_search_by_key(&ts, |b| b.timestamp).ok()
    }

    /// Bar stamped exactly `ts`, if any.
    pub fn at(&self, ts: DateTime<Utc>) -> Option<&Bar> {
        self.position_of(ts).map(|i| &self.bars[i])
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    /// blake3 digest of every bar's timestamp and close.
    ///
    /// Two downloads of the same length with any differing bar hash apart,
    /// so a cached report can be tied to the exact history it came from.
    pub fn history_digest(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for bar in &self.bars {
            hasher.update(&bar.timestamp.timestamp().to_le_bytes());
            hasher.update(&bar.close.to_bits().to_le_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }

    /// Check that a derived series lines up with this one.
    pub fn ensure_aligned(&self, what: &'static str, actual: usize) -> Result<(), SeriesError> {
        if actual != self.bars.len() {
            return Err(SeriesError::LengthMismatch {
                what,
                expected: self.bars.len(),
                actual,
            });
        }
        Ok(())
    }
}
