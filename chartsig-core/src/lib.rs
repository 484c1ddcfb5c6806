//! chartsig core: technical indicators, crossover signals and the composite
//! buy/sell reducer behind the stock chart bot.
//!
//! - Domain types (bars, validated price series, signals, confirmed events)
//! - Indicators: moving average, MACD, stochastic %K/%D, Wilder RSI
//! - Edge-crossing detection and plot markers
//! - Composite reducer that confirms events when all three streams agree
//! - Chart-history ingestion (Yahoo JSON, CSV) and the on-disk report cache

pub mod composite;
pub mod config;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod pipeline;
pub mod report;
pub mod signals;

pub use config::AnalysisConfig;
pub use pipeline::{analyze, AnalysisError, ChartAnalysis};
