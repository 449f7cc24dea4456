//! Structured state snapshot handed to the presentation/transport layer.
//!
//! One snapshot per tick: the inputs the dashboard displays (prices, strike,
//! forecast) next to all four result records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::strategy::edge::{DecisionResult, EdgeResult};
use crate::strategy::quality::EdgeQualityResult;
use crate::strategy::robust::RobustEdgeResult;
use crate::strategy::{Evaluation, Tick};

/// Market identity as provided by the ingestion side; passed through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarketInfo {
    pub slug: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSummary {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub time_left_sec: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceSummary {
    pub up: Option<f64>,
    pub down: Option<f64>,
    pub spread: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrikeSummary {
    pub price_to_beat: Option<f64>,
    pub current_price: Option<f64>,
    /// `current_price - price_to_beat`
    pub diff: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictSummary {
    pub long_pct: Option<f64>,
    pub short_pct: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub market: MarketSummary,
    pub prices: PriceSummary,
    pub strike: StrikeSummary,
    pub predict: PredictSummary,
    pub realized_vol: Option<f64>,
    pub edge: EdgeResult,
    pub recommendation: DecisionResult,
    pub edge_quality: EdgeQualityResult,
    pub robust_edge: RobustEdgeResult,
}

/// Whole seconds left, never negative. `None` for unknown or non-finite time.
pub fn time_left_secs(minutes: Option<f64>) -> Option<u64> {
    minutes
        .filter(|m| m.is_finite())
        .map(|m| (m * 60.0).floor().max(0.0) as u64)
}

impl Snapshot {
    pub fn build(market: Option<&MarketInfo>, tick: &Tick, evaluation: Evaluation) -> Self {
        let market = market.cloned().unwrap_or_default();
        let strike = &tick.strike;
        let diff = match (strike.price, strike.price_to_beat) {
            (Some(price), Some(ptb)) if price.is_finite() && ptb.is_finite() => Some(price - ptb),
            _ => None,
        };

        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            market: MarketSummary {
                slug: market.slug,
                title: market.title,
                time_left_sec: time_left_secs(strike.time_left_minutes),
            },
            prices: PriceSummary {
                up: tick.quote.up,
                down: tick.quote.down,
                spread: tick.spread,
            },
            strike: StrikeSummary {
                price_to_beat: strike.price_to_beat,
                current_price: strike.price,
                diff,
            },
            predict: PredictSummary {
                long_pct: tick.forecast.model_up,
                short_pct: tick.forecast.model_down,
            },
            realized_vol: evaluation.realized_vol,
            edge: evaluation.edge,
            recommendation: evaluation.decision,
            edge_quality: evaluation.edge_quality,
            robust_edge: evaluation.robust_edge,
        }
    }
}
