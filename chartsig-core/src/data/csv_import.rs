//! CSV import, the offline fallback when the chart API is unavailable.
//!
//! Expected header: `timestamp,open,high,low,close,volume[,adj_close]`, with
//! `timestamp` in epoch seconds. Empty cells are read as missing values.

use super::error::DataError;
use crate::domain::{Bar, PriceSeries};
use serde::Deserialize;
use std::io::Read;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: i64,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<f64>,
    #[serde(default)]
    adj_close: Option<f64>,
}

/// Read a CSV price history into a validated series.
///
/// Missing OHLC cells become NaN and a missing volume becomes 0, matching
/// how partially null chart rows are treated.
pub fn read_csv<R: Read>(symbol: &str, reader: R) -> Result<PriceSeries, DataError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut bars = Vec::new();
    for (line, row) in rdr.deserialize::<CsvRow>().enumerate() {
        let row = row?;
        let mut bar = Bar::from_epoch(
            row.timestamp,
            row.open.unwrap_or(f64::NAN),
            row.high.unwrap_or(f64::NAN),
            row.low.unwrap_or(f64::NAN),
            row.close.unwrap_or(f64::NAN),
            row.volume.unwrap_or(0.0),
        )
        .ok_or_else(|| {
            DataError::ResponseFormat(format!(
                "row {}: timestamp {} out of range",
                line + 1,
                row.timestamp
            ))
        })?;
        bar.adj_close = row.adj_close;
        bars.push(bar);
    }

    debug!(symbol, bars = bars.len(), "imported CSV");
    Ok(PriceSeries::new(symbol, bars)?)
}
