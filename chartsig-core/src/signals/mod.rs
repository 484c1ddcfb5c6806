//! Signal detection: per-indicator crossover streams and their plot markers.
//!
//! Detectors are pure functions over full indicator series. They never see
//! the composite state; combining streams is the reducer's job.

pub mod crossing;
pub mod markers;

pub use crossing::{
    cross_direction, detect_crossings, macd_crossings, price_ma_crossings, stochastic_crossings,
};
pub use markers::{markers, MarkerOffset, MarkerSeries};

use crate::domain::SignalSeries;
use serde::Serialize;

/// The three raw crossover streams the reducer combines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalStreams {
    pub macd: SignalSeries,
    pub moving_average: SignalSeries,
    pub stochastic: SignalSeries,
}
