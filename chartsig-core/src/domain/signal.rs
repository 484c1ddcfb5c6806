//! Signal and event types shared by the detector, reducer and formatter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a crossover or a confirmed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
    Buy,
    Sell,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::Buy => f.write_str("Buy"),
            SignalKind::Sell => f.write_str("Sell"),
        }
    }
}

/// A single crossover detected on one indicator stream.
///
/// `value` is the indicator reading at the crossing bar (histogram value,
/// moving average, or %K depending on the stream).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalPoint {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub kind: SignalKind,
    pub value: f64,
}

/// Sparse crossover stream, index-aligned to its price series.
pub type SignalSeries = Vec<Option<SignalPoint>>;

/// Which side of the range an extreme reading sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Zone {
    Overbought,
    Oversold,
}

/// Overbought/oversold annotation on a confirmed event, naming which
/// oscillators contributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtremeTag {
    pub zone: Zone,
    pub rsi: bool,
    pub stochastic: bool,
}

impl fmt::Display for ExtremeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sources = String::new();
        if self.rsi {
            sources.push_str("*rsi*");
        }
        if self.stochastic {
            if sources.is_empty() {
                sources.push_str("*stoch*");
            } else {
                sources.push_str(" *+ stoch*");
            }
        }
        let zone = match self.zone {
            Zone::Overbought => "*overbought*",
            Zone::Oversold => "*oversold*",
        };
        write!(f, "{sources} {zone}")
    }
}

/// A buy/sell event confirmed by all three signal streams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmedEvent {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub direction: SignalKind,
    /// Moving-average value at the bar where the confirmation fired.
    pub price: f64,
    pub tag: Option<ExtremeTag>,
}
