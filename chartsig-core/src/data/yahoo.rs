//! Yahoo Finance v8 chart response parsing.
//!
//! The bot fetches `/v8/finance/chart/{symbol}` and hands the raw body here.
//! Yahoo has no official API and changes its format without notice, so every
//! structural surprise is reported as `ResponseFormat` rather than a panic.

use super::error::DataError;
use crate::domain::{Bar, PriceSeries};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: Option<RawMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMeta {
    symbol: Option<String>,
    currency: Option<String>,
    regular_market_price: Option<f64>,
    regular_market_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

/// Headline quote fields from the response, used for chart titles.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartMeta {
    pub symbol: Option<String>,
    pub currency: Option<String>,
    pub regular_market_price: Option<f64>,
    pub regular_market_time: Option<DateTime<Utc>>,
}

impl From<RawMeta> for ChartMeta {
    fn from(raw: RawMeta) -> Self {
        Self {
            symbol: raw.symbol,
            currency: raw.currency,
            regular_market_price: raw.regular_market_price,
            regular_market_time: raw
                .regular_market_time
                .and_then(|t| DateTime::from_timestamp(t, 0)),
        }
    }
}

/// Parse a chart response body into a validated series plus its headline meta.
///
/// Rows where open, high, low, close and volume are all null are skipped
/// (holidays and halted sessions). Partially null rows are kept with NaN in
/// the missing fields.
pub fn parse_chart_json(symbol: &str, body: &[u8]) -> Result<(PriceSeries, ChartMeta), DataError> {
    let resp: ChartResponse = serde_json::from_slice(body)?;

    let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
        Some(err) if err.code == "Not Found" => DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        },
        Some(err) => DataError::ResponseFormat(format!("{}: {}", err.code, err.description)),
        None => DataError::ResponseFormat("empty result with no error".into()),
    })?;

    let data = result
        .into_iter()
        .next()
        .ok_or_else(|| DataError::ResponseFormat("result array is empty".into()))?;

    let meta = data.meta.map(ChartMeta::from).unwrap_or_default();

    let timestamps = data
        .timestamp
        .ok_or_else(|| DataError::ResponseFormat("no timestamps".into()))?;

    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| DataError::ResponseFormat("no quote data".into()))?;

    let n = timestamps.len();
    for (name, len) in [
        ("open", quote.open.len()),
        ("high", quote.high.len()),
        ("low", quote.low.len()),
        ("close", quote.close.len()),
        ("volume", quote.volume.len()),
    ] {
        if len < n {
            return Err(DataError::ResponseFormat(format!(
                "quote.{name} has {len} entries for {n} timestamps"
            )));
        }
    }

    let adj_closes = data
        .indicators
        .adjclose
        .and_then(|v| v.into_iter().next())
        .map(|a| a.adjclose);

    let mut bars = Vec::with_capacity(n);
    let mut skipped = 0usize;

    for (i, &ts) in timestamps.iter().enumerate() {
        let (open, high, low, close, volume) = (
            quote.open[i],
            quote.high[i],
            quote.low[i],
            quote.close[i],
            quote.volume[i],
        );

        if open.is_none()
            && high.is_none()
            && low.is_none()
            && close.is_none()
            && volume.is_none()
        {
            skipped += 1;
            continue;
        }

        let mut bar = Bar::from_epoch(
            ts,
            open.unwrap_or(f64::NAN),
            high.unwrap_or(f64::NAN),
            low.unwrap_or(f64::NAN),
            close.unwrap_or(f64::NAN),
            volume.unwrap_or(0.0),
        )
        .ok_or_else(|| DataError::ResponseFormat(format!("invalid timestamp: {ts}")))?;
        bar.adj_close = adj_closes
            .as_ref()
            .and_then(|v| v.get(i).copied().flatten());
        bars.push(bar);
    }

    if bars.is_empty() {
        return Err(DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        });
    }

    debug!(symbol, bars = bars.len(), skipped, "parsed chart response");
    let series = PriceSeries::new(symbol, bars)?;
    Ok((series, meta))
}
