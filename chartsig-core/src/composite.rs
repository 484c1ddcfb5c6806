//! Composite signal reducer: confirms a buy or sell only when the MACD,
//! moving-average and stochastic streams agree.
//!
//! Each stream owns one direction slot holding its most recent crossover.
//! Slots persist across bars with no crossover. When all three slots agree
//! on a direction different from the last confirmed event, an event fires
//! and every slot is cleared, so one agreement confirms exactly once.

use crate::config::Thresholds;
use crate::domain::{
    ConfirmedEvent, ExtremeTag, PriceSeries, SeriesError, SignalKind, SignalSeries, Zone,
};
use crate::signals::SignalStreams;
use tracing::debug;

#[derive(Debug, Default)]
struct DirectionSlots {
    macd: Option<SignalKind>,
    moving_average: Option<SignalKind>,
    stochastic: Option<SignalKind>,
}

impl DirectionSlots {
    fn observe(&mut self, streams: &SignalStreams, index: usize) {
        update(&mut self.macd, &streams.macd, index);
        update(&mut self.moving_average, &streams.moving_average, index);
        update(&mut self.stochastic, &streams.stochastic, index);
    }

    /// The shared direction, if all three slots hold the same one.
    fn agreement(&self) -> Option<SignalKind> {
        match (self.macd, self.moving_average, self.stochastic) {
            (Some(a), Some(b), Some(c)) if a == b && b == c => Some(a),
            _ => None,
        }
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

fn update(slot: &mut Option<SignalKind>, stream: &SignalSeries, index: usize) {
    if let Some(point) = stream[index] {
        *slot = Some(point.kind);
    }
}

/// Walk the three streams bar by bar and emit confirmed events.
///
/// An event is priced at the moving average of its confirming bar. `rsi`
/// and `stochastic_k` are only read to tag events. All inputs must be the
/// same length as `series`; a mismatch is malformed input, never a silent
/// truncation.
pub fn reduce(
    series: &PriceSeries,
    streams: &SignalStreams,
    moving_average: &[f64],
    rsi: &[f64],
    stochastic_k: &[f64],
    thresholds: &Thresholds,
) -> Result<Vec<ConfirmedEvent>, SeriesError> {
    series.ensure_aligned("macd signals", streams.macd.len())?;
    series.ensure_aligned("moving average signals", streams.moving_average.len())?;
    series.ensure_aligned("stochastic signals", streams.stochastic.len())?;
    series.ensure_aligned("moving average", moving_average.len())?;
    series.ensure_aligned("rsi", rsi.len())?;
    series.ensure_aligned("stochastic %K", stochastic_k.len())?;

    let mut slots = DirectionSlots::default();
    let mut last: Option<SignalKind> = None;
    let mut events = Vec::new();

    for (index, bar) in series.bars().iter().enumerate() {
        slots.observe(streams, index);

        let Some(direction) = slots.agreement() else {
            continue;
        };
        if last == Some(direction) {
            continue;
        }

        let event = ConfirmedEvent {
            index,
            timestamp: bar.timestamp,
            direction,
            price: moving_average[index],
            tag: extreme_tag(rsi[index], stochastic_k[index], thresholds),
        };
        debug!(index, %direction, price = event.price, "confirmed event");
        events.push(event);
        last = Some(direction);
        slots.clear();
    }

    Ok(events)
}

/// Overbought/oversold label for an RSI and %K reading.
///
/// Overbought wins when both zones would match. NaN readings never count.
pub fn extreme_tag(rsi: f64, stochastic_k: f64, thresholds: &Thresholds) -> Option<ExtremeTag> {
    let rsi_high = rsi >= thresholds.rsi_overbought;
    let stoch_high = stochastic_k >= thresholds.stochastic_overbought;
    if rsi_high || stoch_high {
        return Some(ExtremeTag {
            zone: Zone::Overbought,
            rsi: rsi_high,
            stochastic: stoch_high,
        });
    }

    let rsi_low = rsi <= thresholds.rsi_oversold;
    let stoch_low = stochastic_k <= thresholds.stochastic_oversold;
    if rsi_low || stoch_low {
        return Some(ExtremeTag {
            zone: Zone::Oversold,
            rsi: rsi_low,
            stochastic: stoch_low,
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{make_series, SignalPoint};

    fn stream(series: &PriceSeries, marks: &[(usize, SignalKind)]) -> SignalSeries {
        let mut out: SignalSeries = vec![None; series.len()];
        for &(index, kind) in marks {
            out[index] = Some(SignalPoint {
                index,
                timestamp: series.bars()[index].timestamp,
                kind,
                value: 0.0,
            });
        }
        out
    }

    fn ma(series: &PriceSeries) -> Vec<f64> {
        series.closes().iter().map(|c| c - 0.5).collect()
    }

    fn neutral(n: usize) -> Vec<f64> {
        vec![50.0; n]
    }

    fn reduce_neutral(series: &PriceSeries, streams: &SignalStreams) -> Vec<ConfirmedEvent> {
        let n = series.len();
        reduce(series, streams, &ma(series), &neutral(n), &neutral(n), &Thresholds::default())
            .unwrap()
    }

    #[test]
    fn confirms_when_all_three_agree() {
        let series = make_series(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let streams = SignalStreams {
            macd: stream(&series, &[(1, SignalKind::Buy)]),
            moving_average: stream(&series, &[(2, SignalKind::Buy)]),
            stochastic: stream(&series, &[(3, SignalKind::Buy)]),
        };
        let events = reduce_neutral(&series, &streams);
        assert_eq!(events.len(), 1);
        let e = &events[0];
        assert_eq!(e.index, 3);
        assert_eq!(e.direction, SignalKind::Buy);
        assert_eq!(e.price, 12.5);
        assert_eq!(e.timestamp, series.bars()[3].timestamp);
        assert_eq!(e.tag, None);
    }

    #[test]
    fn later_crossover_overwrites_slot() {
        let series = make_series(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let streams = SignalStreams {
            macd: stream(&series, &[(1, SignalKind::Buy), (2, SignalKind::Sell)]),
            moving_average: stream(&series, &[(1, SignalKind::Buy)]),
            stochastic: stream(&series, &[(3, SignalKind::Buy)]),
        };
        let events = reduce_neutral(&series, &streams);
        assert!(events.is_empty());
    }

    #[test]
    fn same_direction_never_repeats() {
        let series = make_series(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let all = [(1, SignalKind::Buy), (3, SignalKind::Buy)];
        let streams = SignalStreams {
            macd: stream(&series, &all),
            moving_average: stream(&series, &all),
            stochastic: stream(&series, &all),
        };
        let events = reduce_neutral(&series, &streams);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].index, 1);
    }

    #[test]
    fn slots_clear_after_emission() {
        // Buy confirms at 2. The sells arrive one stream at a time and only
        // confirm once the last of them lands.
        let series = make_series(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let streams = SignalStreams {
            macd: stream(&series, &[(2, SignalKind::Buy), (3, SignalKind::Sell)]),
            moving_average: stream(&series, &[(2, SignalKind::Buy), (4, SignalKind::Sell)]),
            stochastic: stream(&series, &[(2, SignalKind::Buy), (5, SignalKind::Sell)]),
        };
        let events = reduce_neutral(&series, &streams);
        let got: Vec<(usize, SignalKind)> = events.iter().map(|e| (e.index, e.direction)).collect();
        assert_eq!(got, vec![(2, SignalKind::Buy), (5, SignalKind::Sell)]);
    }

    #[test]
    fn first_event_may_be_a_sell() {
        let series = make_series(&[5.0, 4.0, 3.0]);
        let sell = [(1, SignalKind::Sell)];
        let streams = SignalStreams {
            macd: stream(&series, &sell),
            moving_average: stream(&series, &sell),
            stochastic: stream(&series, &sell),
        };
        let events = reduce_neutral(&series, &streams);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].direction, SignalKind::Sell);
    }

    #[test]
    fn events_are_tagged() {
        let series = make_series(&[1.0, 2.0, 3.0]);
        let buy = [(1, SignalKind::Buy)];
        let streams = SignalStreams {
            macd: stream(&series, &buy),
            moving_average: stream(&series, &buy),
            stochastic: stream(&series, &buy),
        };
        let rsi = [f64::NAN, 75.0, 50.0];
        let k = [f64::NAN, 85.0, 50.0];
        let t = Thresholds::default();
        let events = reduce(&series, &streams, &ma(&series), &rsi, &k, &t).unwrap();
        assert_eq!(
            events[0].tag,
            Some(ExtremeTag {
                zone: Zone::Overbought,
                rsi: true,
                stochastic: true
            })
        );
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let series = make_series(&[1.0, 2.0, 3.0]);
        let streams = SignalStreams {
            macd: vec![None; 3],
            moving_average: vec![None; 2],
            stochastic: vec![None; 3],
        };
        let t = Thresholds::default();
        let err = reduce(&series, &streams, &ma(&series), &neutral(3), &neutral(3), &t).unwrap_err();
        assert!(matches!(err, SeriesError::LengthMismatch { actual: 2, .. }));

        let streams = SignalStreams {
            macd: vec![None; 3],
            moving_average: vec![None; 3],
            stochastic: vec![None; 3],
        };
        let long_rsi = neutral(4);
        assert!(reduce(&series, &streams, &ma(&series), &long_rsi, &neutral(3), &t).is_err());

        let err = reduce(&series, &streams, &[1.0, 2.0], &neutral(3), &neutral(3), &t).unwrap_err();
        assert!(matches!(
            err,
            SeriesError::LengthMismatch {
                what: "moving average",
                ..
            }
        ));
    }

    #[test]
    fn tag_rules() {
        let t = Thresholds::default();
        assert_eq!(extreme_tag(50.0, 50.0, &t), None);
        assert_eq!(extreme_tag(f64::NAN, f64::NAN, &t), None);
        assert_eq!(
            extreme_tag(70.0, 50.0, &t),
            Some(ExtremeTag {
                zone: Zone::Overbought,
                rsi: true,
                stochastic: false
            })
        );
        assert_eq!(
            extreme_tag(f64::NAN, 20.0, &t),
            Some(ExtremeTag {
                zone: Zone::Oversold,
                rsi: false,
                stochastic: true
            })
        );
        // Overbought RSI beats oversold %K.
        assert_eq!(
            extreme_tag(80.0, 10.0, &t).map(|tag| tag.zone),
            Some(Zone::Overbought)
        );
    }
}
