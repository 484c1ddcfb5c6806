//! Analysis configuration: indicator periods, overbought/oversold
//! thresholds and report markers.
//!
//! Stored as TOML; every field has a default, so an empty file (or no file)
//! gives the stock chart settings: 10-bar moving average, MACD 8/17/9,
//! stochastic 14/3/3, RSI 70/30 and stochastic 80/20 thresholds.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors loading or validating an `AnalysisConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovingAverageParams {
    pub window: usize,
}

impl Default for MovingAverageParams {
    fn default() -> Self {
        Self { window: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast: 8,
            slow: 17,
            signal: 9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StochasticParams {
    pub period: usize,
    pub k_smoothing: usize,
    pub d_smoothing: usize,
}

impl Default for StochasticParams {
    fn default() -> Self {
        Self {
            period: 14,
            k_smoothing: 3,
            d_smoothing: 3,
        }
    }
}

/// Overbought/oversold levels used to tag confirmed events.
///
/// A reading at or beyond a level counts (>= overbought, <= oversold).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    pub stochastic_overbought: f64,
    pub stochastic_oversold: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            stochastic_overbought: 80.0,
            stochastic_oversold: 20.0,
        }
    }
}

/// Line markers used by the report formatter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportStyle {
    pub buy_marker: String,
    pub sell_marker: String,
}

impl Default for ReportStyle {
    fn default() -> Self {
        Self {
            buy_marker: ":green_circle::chart_with_upwards_trend:Buy".into(),
            sell_marker: ":red_circle::chart_with_downwards_trend:Sell".into(),
        }
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub moving_average: MovingAverageParams,
    pub macd: MacdParams,
    pub stochastic: StochasticParams,
    pub thresholds: Thresholds,
    pub report: ReportStyle,
}

impl AnalysisConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject periods that would make an indicator meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.moving_average.window == 0 {
            return Err(ConfigError::Invalid("moving_average.window must be >= 1".into()));
        }
        let m = &self.macd;
        if m.fast == 0 || m.slow == 0 || m.signal == 0 {
            return Err(ConfigError::Invalid("macd periods must be >= 1".into()));
        }
        if m.fast >= m.slow {
            return Err(ConfigError::Invalid(format!(
                "macd.fast ({}) must be < macd.slow ({})",
                m.fast, m.slow
            )));
        }
        let s = &self.stochastic;
        if s.period == 0 || s.k_smoothing == 0 || s.d_smoothing == 0 {
            return Err(ConfigError::Invalid("stochastic periods must be >= 1".into()));
        }
        let t = &self.thresholds;
        if t.rsi_oversold >= t.rsi_overbought {
            return Err(ConfigError::Invalid(format!(
                "thresholds.rsi_oversold ({}) must be below rsi_overbought ({})",
                t.rsi_oversold, t.rsi_overbought
            )));
        }
        if t.stochastic_oversold >= t.stochastic_overbought {
            return Err(ConfigError::Invalid(format!(
                "thresholds.stochastic_oversold ({}) must be below stochastic_overbought ({})",
                t.stochastic_oversold, t.stochastic_overbought
            )));
        }
        Ok(())
    }

    /// Hash of the canonical JSON form; changes whenever any setting changes.
    ///
    /// Cached reports are only reused when this matches.
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_vec(self).expect("AnalysisConfig must serialize");
        blake3::hash(&json).to_hex().to_string()
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = AnalysisConfig::from_toml("").unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.moving_average.window, 10);
        assert_eq!(config.macd.fast, 8);
        assert_eq!(config.macd.slow, 17);
        assert_eq!(config.macd.signal, 9);
        assert_eq!(config.stochastic.period, 14);
        assert_eq!(config.thresholds.rsi_overbought, 70.0);
        assert_eq!(config.thresholds.stochastic_oversold, 20.0);
    }

    #[test]
    fn partial_toml_overrides_only_given_fields() {
        let config = AnalysisConfig::from_toml(
            r#"
            [macd]
            fast = 12
            slow = 26

            [thresholds]
            rsi_overbought = 80.0
            "#,
        )
        .unwrap();
        assert_eq!(config.macd.fast, 12);
        assert_eq!(config.macd.slow, 26);
        assert_eq!(config.macd.signal, 9);
        assert_eq!(config.thresholds.rsi_overbought, 80.0);
        assert_eq!(config.thresholds.rsi_oversold, 30.0);
    }

    #[test]
    fn rejects_inverted_macd() {
        let err = AnalysisConfig::from_toml("[macd]\nfast = 20\nslow = 10\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_window() {
        let err = AnalysisConfig::from_toml("[moving_average]\nwindow = 0\n").unwrap_err();
        assert!(err.to_string().contains("window"));
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let err =
            AnalysisConfig::from_toml("[thresholds]\nstochastic_oversold = 90.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = AnalysisConfig::from_toml("[macd\nfast = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn fingerprint_tracks_settings() {
        let a = AnalysisConfig::default();
        let mut b = AnalysisConfig::default();
        assert_eq!(a.fingerprint(), b.fingerprint());
        b.thresholds.rsi_overbought = 75.0;
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn toml_roundtrip() {
        let config = AnalysisConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(AnalysisConfig::from_toml(&text).unwrap(), config);
    }
}
