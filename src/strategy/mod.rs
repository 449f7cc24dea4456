//! Strategy engine: edge, time feasibility and robust scoring.
//!
//! Two independent decision strategies are computed on every tick:
//! the phase-threshold classifier ([`edge::EdgeCalculator::decide`]) and the
//! uncertainty/cost-adjusted scorer ([`robust::RobustEdgeScorer`]). Both
//! results are returned side by side; neither gates the other.

pub mod edge;
pub mod history;
pub mod kelly;
pub mod quality;
pub mod robust;

use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::indicators::volatility::VolatilityEstimator;
use crate::types::{MarketQuote, ModelForecast, StrikeContext};
use edge::{Action, DecisionResult, EdgeCalculator, EdgeResult};
use history::ForecastHistory;
use quality::{EdgeQualityAdjuster, EdgeQualityResult, QualityConfig};
use robust::{RobustConfig, RobustDecision, RobustEdgeResult, RobustEdgeScorer, RobustInput};

// ---------------------------------------------------------------------------
// Inputs / outputs
// ---------------------------------------------------------------------------

/// Everything the collaborators hand over for one evaluation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tick {
    pub quote: MarketQuote,
    pub forecast: ModelForecast,
    /// 1-minute closes, oldest first.
    pub closes: Vec<f64>,
    pub strike: StrikeContext,
    pub spread: Option<f64>,
}

/// The four result records of one evaluation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub realized_vol: Option<f64>,
    pub edge: EdgeResult,
    pub decision: DecisionResult,
    pub edge_quality: EdgeQualityResult,
    pub robust_edge: RobustEdgeResult,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Runs volatility → edge → quality → robust scoring for each tick.
///
/// The scorer's forecast history is the only state carried between ticks;
/// it sits behind a mutex so `evaluate` can be shared across tasks.
pub struct EdgePipeline {
    volatility: VolatilityEstimator,
    quality: EdgeQualityAdjuster,
    scorer: Mutex<RobustEdgeScorer>,
    robust: RobustConfig,
}

impl EdgePipeline {
    pub fn new(
        volatility: VolatilityEstimator,
        quality: EdgeQualityAdjuster,
        scorer: RobustEdgeScorer,
        robust: RobustConfig,
    ) -> Self {
        Self {
            volatility,
            quality,
            scorer: Mutex::new(scorer),
            robust,
        }
    }

    /// Build a pipeline with an empty forecast history.
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(
            VolatilityEstimator::new(cfg.engine.lookback_minutes),
            EdgeQualityAdjuster::new(QualityConfig {
                base_interval_minutes: cfg.engine.base_interval_minutes,
            }),
            RobustEdgeScorer::new(ForecastHistory::default()),
            cfg.robust,
        )
    }

    /// Configured robust defaults.
    pub fn robust_config(&self) -> &RobustConfig {
        &self.robust
    }

    /// Current (UP, DOWN) history lengths.
    pub fn history_len(&self) -> (usize, usize) {
        let scorer = self.scorer.lock().unwrap_or_else(PoisonError::into_inner);
        (scorer.history().up.len(), scorer.history().down.len())
    }

    /// Evaluate with the configured robust defaults.
    pub fn evaluate(&self, tick: &Tick) -> Evaluation {
        self.evaluate_with(tick, &self.robust)
    }

    /// Evaluate with an explicit robust config for this call only.
    pub fn evaluate_with(&self, tick: &Tick, robust: &RobustConfig) -> Evaluation {
        let realized_vol = self.volatility.estimate(&tick.closes);
        let edge = EdgeCalculator::compute_edge(tick.forecast, tick.quote);

        // Unknown time left is treated as no time left (strictest phase).
        let remaining = tick
            .strike
            .time_left_minutes
            .filter(|m| m.is_finite())
            .unwrap_or(0.0);
        let decision = EdgeCalculator::decide(
            remaining,
            edge.edge_up,
            edge.edge_down,
            tick.forecast.model_up,
            tick.forecast.model_down,
        );

        let edge_quality = self
            .quality
            .adjust(&tick.strike, realized_vol, edge.edge_up, edge.edge_down);

        let input = RobustInput {
            forecast: tick.forecast,
            market_up: edge.market_up,
            market_down: edge.market_down,
            time_multiplier: edge_quality.time_multiplier,
            spread: tick.spread,
        };
        let robust_edge = {
            let mut scorer = self.scorer.lock().unwrap_or_else(PoisonError::into_inner);
            scorer.score(&input, robust)
        };

        if decision.action == Action::Enter || robust_edge.decision == RobustDecision::Buy {
            info!(
                quote = %tick.quote,
                simple = ?decision.action,
                simple_side = ?decision.side,
                robust = ?robust_edge.decision,
                robust_side = ?robust_edge.side,
                time_mult = edge_quality.time_multiplier,
                "Opportunity flagged"
            );
        } else {
            debug!(
                simple_reason = %decision.reason,
                robust_reason = %robust_edge.reason,
                "No opportunity"
            );
        }

        Evaluation {
            realized_vol,
            edge,
            decision,
            edge_quality,
            robust_edge,
        }
    }
}

impl Default for EdgePipeline {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
