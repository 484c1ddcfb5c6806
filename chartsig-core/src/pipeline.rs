//! End-to-end analysis of one price series: indicators, crossover streams,
//! plot markers, confirmed events and the text report.
//!
//! `analyze` is stateless. Concurrent calls on different series share
//! nothing.

use crate::composite::reduce;
use crate::config::{AnalysisConfig, ConfigError, Thresholds};
use crate::domain::{ConfirmedEvent, PriceSeries, SeriesError};
use crate::indicators::{
    defined_count, macd, moving_average, rsi, stochastic, MacdLines, StochasticLines,
};
use crate::report::format_report;
use crate::signals::{
    macd_crossings, markers, price_ma_crossings, stochastic_crossings, MarkerOffset,
    MarkerSeries, SignalStreams,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("malformed input: {0}")]
    Series(#[from] SeriesError),
}

/// Every line an external plotter draws, index-aligned to the series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlays {
    pub moving_average: Vec<f64>,
    pub macd: MacdLines,
    pub stochastic: StochasticLines,
    pub rsi: Vec<f64>,
    /// Horizontal guide levels for the RSI and stochastic panels.
    pub guides: Thresholds,
}

/// Marker series per chart panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelMarkers {
    pub macd: MarkerSeries,
    pub moving_average: MarkerSeries,
    pub stochastic: MarkerSeries,
}

/// Full result of analyzing one series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartAnalysis {
    pub symbol: String,
    pub bar_count: usize,
    pub overlays: Overlays,
    pub markers: PanelMarkers,
    pub streams: SignalStreams,
    pub events: Vec<ConfirmedEvent>,
    pub report: String,
}

/// Run the whole pipeline on one series.
///
/// Short series never fail: indicators without enough history are all NaN,
/// no crossovers fire and the report is empty. Only an invalid config or
/// misaligned intermediate series is an error.
pub fn analyze(
    series: &PriceSeries,
    config: &AnalysisConfig,
) -> Result<ChartAnalysis, AnalysisError> {
    config.validate()?;

    let closes = series.closes();
    let ma = moving_average(&closes, config.moving_average.window);
    let m = &config.macd;
    let macd_lines = macd(&closes, m.fast, m.slow, m.signal);
    let s = &config.stochastic;
    let stoch = stochastic(series.bars(), s.period, s.k_smoothing, s.d_smoothing);
    let rsi_values = rsi(&closes);

    for (name, values) in [
        ("moving average", &ma),
        ("stochastic %K", &stoch.k),
        ("stochastic %D", &stoch.d),
        ("rsi", &rsi_values),
    ] {
        if defined_count(values) == 0 {
            debug!(
                symbol = series.symbol(),
                indicator = name,
                bars = series.len(),
                "insufficient data, all undefined"
            );
        }
    }
    let full_windows = series.len().saturating_sub(s.period.saturating_sub(1));
    let flat_windows = full_windows.saturating_sub(defined_count(&stoch.raw_k));
    if flat_windows > 0 {
        debug!(
            symbol = series.symbol(),
            flat_windows,
            "stochastic undefined on flat or gapped windows"
        );
    }

    let streams = SignalStreams {
        macd: macd_crossings(series, &macd_lines.histogram)?,
        moving_average: price_ma_crossings(series, &ma)?,
        stochastic: stochastic_crossings(series, &stoch.k, &stoch.d)?,
    };

    let panel_markers = PanelMarkers {
        macd: markers(&streams.macd, MarkerOffset::PERCENT),
        moving_average: markers(&streams.moving_average, MarkerOffset::PERCENT),
        stochastic: markers(&streams.stochastic, MarkerOffset::OSCILLATOR),
    };

    let events = reduce(series, &streams, &ma, &rsi_values, &stoch.k, &config.thresholds)?;
    let report = format_report(&events, &config.report);

    info!(
        symbol = series.symbol(),
        bars = series.len(),
        events = events.len(),
        "analysis complete"
    );

    Ok(ChartAnalysis {
        symbol: series.symbol().to_string(),
        bar_count: series.len(),
        overlays: Overlays {
            moving_average: ma,
            macd: macd_lines,
            stochastic: stoch,
            rsi: rsi_values,
            guides: config.thresholds,
        },
        markers: panel_markers,
        streams,
        events,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{make_series, SignalKind};

    #[test]
    fn single_bar_gives_empty_report() {
        let series = make_series(&[100.0]);
        let a = analyze(&series, &AnalysisConfig::default()).unwrap();
        assert_eq!(a.bar_count, 1);
        assert!(a.overlays.moving_average[0].is_nan());
        // EMAs are seeded with the first close, so MACD is defined at once.
        assert_eq!(a.overlays.macd.histogram[0], 0.0);
        assert!(a.overlays.stochastic.k[0].is_nan());
        assert!(a.overlays.rsi[0].is_nan());
        assert!(a.events.is_empty());
        assert_eq!(a.report, "");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let series = make_series(&[1.0, 2.0, 3.0]);
        let mut config = AnalysisConfig::default();
        config.macd.fast = 30;
        let err = analyze(&series, &config).unwrap_err();
        assert!(matches!(err, AnalysisError::Config(_)));
    }

    #[test]
    fn outputs_are_aligned() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.4).sin() * 5.0).collect();
        let series = make_series(&closes);
        let a = analyze(&series, &AnalysisConfig::default()).unwrap();
        let n = series.len();
        assert_eq!(a.overlays.moving_average.len(), n);
        assert_eq!(a.overlays.macd.signal.len(), n);
        assert_eq!(a.overlays.stochastic.d.len(), n);
        assert_eq!(a.overlays.rsi.len(), n);
        assert_eq!(a.markers.stochastic.buy.len(), n);
        assert_eq!(a.streams.macd.len(), n);
        assert_eq!(a.overlays.guides, Thresholds::default());
    }

    #[test]
    fn events_alternate_and_match_report() {
        let closes: Vec<f64> = (0..200)
            .map(|i| 100.0 + (i as f64 * 0.15).sin() * 10.0 + (i as f64 * 0.05).cos() * 3.0)
            .collect();
        let series = make_series(&closes);
        let a = analyze(&series, &AnalysisConfig::default()).unwrap();
        for pair in a.events.windows(2) {
            assert_ne!(pair[0].direction, pair[1].direction);
            assert!(pair[0].index < pair[1].index);
        }
        assert_eq!(a.report.lines().count(), a.events.len());
        for (line, event) in a.report.lines().zip(&a.events) {
            let marker = match event.direction {
                SignalKind::Buy => "Buy",
                SignalKind::Sell => "Sell",
            };
            assert!(line.contains(marker));
            assert_eq!(event.price, a.overlays.moving_average[event.index]);
            assert!(event.price.is_finite());
        }
    }
}
