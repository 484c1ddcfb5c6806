//! Price history ingestion and report caching

pub mod csv_import;
pub mod error;
pub mod report_cache;
pub mod yahoo;

pub use csv_import::read_csv;
pub use error::DataError;
pub use report_cache::{ReportCache, ReportMeta};
pub use yahoo::{parse_chart_json, ChartMeta};
