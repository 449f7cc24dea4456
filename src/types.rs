//! Shared types for the edgewise scoring pipeline.
//!
//! These are the input records handed over by the ingestion collaborators
//! (quotes, forecasts, strike context) plus the side/error enums used by
//! every strategy module. Output records live next to the component that
//! produces them.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// Outcome side of a binary UP/DOWN market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Up,
    Down,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Up => write!(f, "UP"),
            Side::Down => write!(f, "DOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Implied prices quoted by the market for each side.
///
/// Prices are probability-like values in [0, 1] but are not guaranteed to
/// sum to 1 (overround, stale books); they are normalized downstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketQuote {
    pub up: Option<f64>,
    pub down: Option<f64>,
}

impl MarketQuote {
    pub fn new(up: f64, down: f64) -> Self {
        Self {
            up: Some(up),
            down: Some(down),
        }
    }
}

impl fmt::Display for MarketQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cents = |p: Option<f64>| match p {
            Some(v) => format!("{:.0}¢", v * 100.0),
            None => "-".to_string(),
        };
        write!(f, "UP: {} | DOWN: {}", cents(self.up), cents(self.down))
    }
}

/// Model-derived probability forecast for each side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelForecast {
    pub model_up: Option<f64>,
    pub model_down: Option<f64>,
}

impl ModelForecast {
    pub fn new(model_up: f64, model_down: f64) -> Self {
        Self {
            model_up: Some(model_up),
            model_down: Some(model_down),
        }
    }

    /// Forecast probability for one side.
    pub fn for_side(&self, side: Side) -> Option<f64> {
        match side {
            Side::Up => self.model_up,
            Side::Down => self.model_down,
        }
    }
}

/// Where the underlying trades relative to the market's strike, and how long
/// until the market resolves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrikeContext {
    /// Current underlying price.
    pub price: Option<f64>,
    /// Strike the underlying has to beat for UP to resolve true.
    pub price_to_beat: Option<f64>,
    pub time_left_minutes: Option<f64>,
}

impl StrikeContext {
    pub fn new(price: f64, price_to_beat: f64, time_left_minutes: f64) -> Self {
        Self {
            price: Some(price),
            price_to_beat: Some(price_to_beat),
            time_left_minutes: Some(time_left_minutes),
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised outside the scoring core (configuration and tick intake).
/// The scoring functions themselves are total and never fail.
#[derive(Debug, thiserror::Error)]
pub enum EdgewiseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed tick on line {line}: {message}")]
    MalformedTick { line: usize, message: String },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_display() {
        assert_eq!(format!("{}", Side::Up), "UP");
        assert_eq!(format!("{}", Side::Down), "DOWN");
    }

    #[test]
    fn test_side_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&Side::Up).unwrap(), "\"UP\"");
        let down: Side = serde_json::from_str("\"DOWN\"").unwrap();
        assert_eq!(down, Side::Down);
    }

    #[test]
    fn test_quote_accepts_nulls() {
        let quote: MarketQuote = serde_json::from_str(r#"{"up": 0.42, "down": null}"#).unwrap();
        assert_eq!(quote.up, Some(0.42));
        assert_eq!(quote.down, None);
    }

    #[test]
    fn test_quote_display() {
        assert_eq!(format!("{}", MarketQuote::new(0.42, 0.6)), "UP: 42¢ | DOWN: 60¢");
        assert_eq!(format!("{}", MarketQuote::default()), "UP: - | DOWN: -");
    }

    #[test]
    fn test_forecast_camel_case_fields() {
        let forecast: ModelForecast =
            serde_json::from_str(r#"{"modelUp": 0.61, "modelDown": 0.39}"#).unwrap();
        assert_eq!(forecast.for_side(Side::Up), Some(0.61));
        assert_eq!(forecast.for_side(Side::Down), Some(0.39));
    }

    #[test]
    fn test_strike_context_missing_fields_default_to_none() {
        let strike: StrikeContext = serde_json::from_str(r#"{"price": 97000.0}"#).unwrap();
        assert_eq!(strike.price, Some(97000.0));
        assert!(strike.price_to_beat.is_none());
        assert!(strike.time_left_minutes.is_none());
    }

    #[test]
    fn test_error_display() {
        let err = EdgewiseError::MalformedTick {
            line: 3,
            message: "expected value".into(),
        };
        assert_eq!(err.to_string(), "Malformed tick on line 3: expected value");
        assert_eq!(
            EdgewiseError::Config("bad".into()).to_string(),
            "Configuration error: bad"
        );
    }
}
