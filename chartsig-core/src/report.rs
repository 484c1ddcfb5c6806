//! Plain-text report of confirmed events, one line per event.

use crate::config::ReportStyle;
use crate::domain::{ConfirmedEvent, SignalKind};
use std::fmt::Write;

/// Render events as `{marker} on {MM-DD} @ ${price} {tag}` lines.
///
/// Price has two decimals. The tag and its leading space are left out when
/// the event is untagged. No events gives an empty string.
pub fn format_report(events: &[ConfirmedEvent], style: &ReportStyle) -> String {
    let mut out = String::new();
    for event in events {
        let marker = match event.direction {
            SignalKind::Buy => &style.buy_marker,
            SignalKind::Sell => &style.sell_marker,
        };
        // Writing into a String cannot fail.
        let _ = write!(
            out,
            "{marker} on {} @ ${:.2}",
            event.timestamp.format("%m-%d"),
            event.price
        );
        if let Some(tag) = &event.tag {
            let _ = write!(out, " {tag}");
        }
        out.push('\n');
    }
    out
}
