//! Robust edge: model uncertainty, time feasibility and execution cost.
//!
//! Only recommends a trade when the edge survives conservative adjustments:
//!
//! ```text
//! q           = normalized market probability
//! p           = model forecast
//! σ           = rolling std of p (floored)
//! p_low       = p - 1.28·σ              (one-sided ~90% lower bound)
//! edge_low    = p_low - q
//! robust_edge = edge_low · time_mult - exec_cost
//! robust_roi  = robust_edge / q
//! kelly       = edge_low / (1 - q)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use super::history::ForecastHistory;
use super::kelly::kelly_fraction;
use crate::indicators::{clamp, clamp_probability};
use crate::types::{EdgewiseError, ModelForecast, Side};

/// z-value for a one-sided 90% lower confidence bound.
pub const Z_90: f64 = 1.28;
/// Minimum model uncertainty, also used until two forecasts are on record.
pub const SIGMA_FLOOR: f64 = 0.02;
/// ROI is undefined below this market probability.
const MIN_ROI_PRICE: f64 = 0.001;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Cost model and decision thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobustConfig {
    /// Exchange fee as a probability-point cost.
    pub fee_pct: f64,
    pub slippage_pct: f64,
    /// Share of the quoted spread charged as cost.
    pub spread_penalty_factor: f64,
    /// Spread cost assumed when no spread is quoted.
    pub default_spread_penalty: f64,
    pub min_robust_roi: f64,
    pub min_time_mult: f64,
    /// Minimum Kelly fraction of bankroll worth acting on.
    pub min_kelly_pct_bankroll: f64,
}

impl Default for RobustConfig {
    fn default() -> Self {
        Self {
            fee_pct: 0.02,
            slippage_pct: 0.005,
            spread_penalty_factor: 0.5,
            default_spread_penalty: 0.01,
            min_robust_roi: 0.1,
            min_time_mult: 0.35,
            min_kelly_pct_bankroll: 0.0025,
        }
    }
}

/// Per-call overrides; unset fields keep the configured value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobustOverrides {
    pub fee_pct: Option<f64>,
    pub slippage_pct: Option<f64>,
    pub spread_penalty_factor: Option<f64>,
    pub default_spread_penalty: Option<f64>,
    pub min_robust_roi: Option<f64>,
    pub min_time_mult: Option<f64>,
    pub min_kelly_pct_bankroll: Option<f64>,
}

impl RobustConfig {
    /// A copy of this config with the overrides applied.
    pub fn with_overrides(&self, overrides: &RobustOverrides) -> RobustConfig {
        RobustConfig {
            fee_pct: overrides.fee_pct.unwrap_or(self.fee_pct),
            slippage_pct: overrides.slippage_pct.unwrap_or(self.slippage_pct),
            spread_penalty_factor: overrides
                .spread_penalty_factor
                .unwrap_or(self.spread_penalty_factor),
            default_spread_penalty: overrides
                .default_spread_penalty
                .unwrap_or(self.default_spread_penalty),
            min_robust_roi: overrides.min_robust_roi.unwrap_or(self.min_robust_roi),
            min_time_mult: overrides.min_time_mult.unwrap_or(self.min_time_mult),
            min_kelly_pct_bankroll: overrides
                .min_kelly_pct_bankroll
                .unwrap_or(self.min_kelly_pct_bankroll),
        }
    }

    /// Costs must be finite and non-negative; thresholds must be finite.
    pub fn validate(&self) -> Result<(), EdgewiseError> {
        let costs = [
            ("fee_pct", self.fee_pct),
            ("slippage_pct", self.slippage_pct),
            ("spread_penalty_factor", self.spread_penalty_factor),
            ("default_spread_penalty", self.default_spread_penalty),
        ];
        for (name, value) in costs {
            if !value.is_finite() || value < 0.0 {
                return Err(EdgewiseError::Config(format!(
                    "robust.{name} must be a non-negative number, got {value}"
                )));
            }
        }
        let thresholds = [
            ("min_robust_roi", self.min_robust_roi),
            ("min_time_mult", self.min_time_mult),
            ("min_kelly_pct_bankroll", self.min_kelly_pct_bankroll),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() {
                return Err(EdgewiseError::Config(format!(
                    "robust.{name} must be finite, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Fee + slippage + spread penalty. A negative or non-finite spread is
    /// treated as not quoted.
    pub fn execution_cost(&self, spread: Option<f64>) -> f64 {
        let spread_cost = spread
            .filter(|s| s.is_finite() && *s >= 0.0)
            .map(|s| s * self.spread_penalty_factor)
            .unwrap_or(self.default_spread_penalty);
        self.fee_pct + self.slippage_pct + spread_cost
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RobustDecision {
    Buy,
    Pass,
}

/// Why the robust strategy passed (or bought). Gates are listed in the
/// order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RobustReason {
    MissingMarketData,
    RobustEdgeNotPositive,
    RobustRoiBelowThreshold,
    TimeMultBelowThreshold,
    KellyBelowMinimum,
    RobustCriteriaMet,
}

impl fmt::Display for RobustReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RobustReason::MissingMarketData => "missing_market_data",
            RobustReason::RobustEdgeNotPositive => "robust_edge_not_positive",
            RobustReason::RobustRoiBelowThreshold => "robust_roi_below_threshold",
            RobustReason::TimeMultBelowThreshold => "time_mult_below_threshold",
            RobustReason::KellyBelowMinimum => "kelly_below_minimum",
            RobustReason::RobustCriteriaMet => "robust_criteria_met",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RobustEdgeResult {
    /// Winning side; only set on BUY.
    pub side: Option<Side>,
    pub decision: RobustDecision,
    pub reason: RobustReason,
    pub raw_edge_up: Option<f64>,
    pub raw_edge_down: Option<f64>,
    /// `forecast - p_low`
    pub uncertainty_discount_up: Option<f64>,
    pub uncertainty_discount_down: Option<f64>,
    pub p_low_up: Option<f64>,
    pub p_low_down: Option<f64>,
    pub edge_low_up: Option<f64>,
    pub edge_low_down: Option<f64>,
    pub time_mult: f64,
    pub exec_cost_up: Option<f64>,
    pub exec_cost_down: Option<f64>,
    pub robust_edge_up: Option<f64>,
    pub robust_edge_down: Option<f64>,
    pub robust_roi_up: Option<f64>,
    pub robust_roi_down: Option<f64>,
    pub kelly_up: Option<f64>,
    pub kelly_down: Option<f64>,
    pub sigma_up: Option<f64>,
    pub sigma_down: Option<f64>,
    pub interpretation: String,
}

impl RobustEdgeResult {
    fn missing_market_data(time_mult: f64) -> Self {
        Self {
            side: None,
            decision: RobustDecision::Pass,
            reason: RobustReason::MissingMarketData,
            raw_edge_up: None,
            raw_edge_down: None,
            uncertainty_discount_up: None,
            uncertainty_discount_down: None,
            p_low_up: None,
            p_low_down: None,
            edge_low_up: None,
            edge_low_down: None,
            time_mult,
            exec_cost_up: None,
            exec_cost_down: None,
            robust_edge_up: None,
            robust_edge_down: None,
            robust_roi_up: None,
            robust_roi_down: None,
            kelly_up: None,
            kelly_down: None,
            sigma_up: None,
            sigma_down: None,
            interpretation: "Market data missing.".to_string(),
        }
    }
}

/// Everything the scorer needs for one evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct RobustInput {
    pub forecast: ModelForecast,
    /// Normalized market probability for UP.
    pub market_up: Option<f64>,
    pub market_down: Option<f64>,
    pub time_multiplier: f64,
    pub spread: Option<f64>,
}

/// Per-side intermediate values.
#[derive(Debug, Clone, Copy, Default)]
struct SideScore {
    raw_edge: Option<f64>,
    uncertainty_discount: Option<f64>,
    p_low: Option<f64>,
    edge_low: Option<f64>,
    robust_edge: Option<f64>,
    robust_roi: Option<f64>,
    kelly: Option<f64>,
}

fn score_side(forecast: Option<f64>, q: f64, sigma: f64, time_mult: f64, exec_cost: f64) -> SideScore {
    let Some(p) = forecast.filter(|p| p.is_finite()) else {
        return SideScore::default();
    };

    let p_low = clamp_probability(p - Z_90 * sigma);
    let edge_low = p_low - q;
    let robust_edge = clamp(edge_low * time_mult - exec_cost, -1.0, 1.0);

    SideScore {
        raw_edge: Some(p - q),
        uncertainty_discount: Some(p - p_low),
        p_low: Some(p_low),
        edge_low: Some(edge_low),
        robust_edge: Some(robust_edge),
        robust_roi: (q > MIN_ROI_PRICE).then(|| robust_edge / q),
        kelly: kelly_fraction(edge_low, q),
    }
}

// ---------------------------------------------------------------------------
// Scorer
// ---------------------------------------------------------------------------

/// Stateful robust-edge strategy. Each instance owns its forecast history.
#[derive(Debug, Clone, Default)]
pub struct RobustEdgeScorer {
    history: ForecastHistory,
}

impl RobustEdgeScorer {
    pub fn new(history: ForecastHistory) -> Self {
        Self { history }
    }

    pub fn history(&self) -> &ForecastHistory {
        &self.history
    }

    /// Record the forecast, then score both sides and run the gate chain.
    pub fn score(&mut self, input: &RobustInput, config: &RobustConfig) -> RobustEdgeResult {
        self.history.record(&input.forecast);

        let time_mult = input.time_multiplier;
        let (Some(q_up), Some(q_down)) = (
            input.market_up.filter(|q| q.is_finite()),
            input.market_down.filter(|q| q.is_finite()),
        ) else {
            debug!("Robust edge skipped: market data missing");
            return RobustEdgeResult::missing_market_data(time_mult);
        };

        let sigma_up = self.history.up.std_dev(SIGMA_FLOOR);
        let sigma_down = self.history.down.std_dev(SIGMA_FLOOR);
        let exec_cost = config.execution_cost(input.spread);

        let up = score_side(input.forecast.model_up, q_up, sigma_up, time_mult, exec_cost);
        let down = score_side(input.forecast.model_down, q_down, sigma_down, time_mult, exec_cost);

        debug!(
            sigma_up,
            sigma_down,
            robust_edge_up = ?up.robust_edge,
            robust_edge_down = ?down.robust_edge,
            exec_cost,
            time_mult,
            "Robust edge scored"
        );

        let (side, best) = if up.robust_edge.unwrap_or(-1.0) >= down.robust_edge.unwrap_or(-1.0) {
            (Side::Up, up)
        } else {
            (Side::Down, down)
        };

        let reason = gate(&best, time_mult, config);
        let decision = if reason == RobustReason::RobustCriteriaMet {
            RobustDecision::Buy
        } else {
            RobustDecision::Pass
        };

        let interpretation = match decision {
            RobustDecision::Buy => {
                let edge = best.robust_edge.unwrap_or(0.0);
                info!(
                    side = %side,
                    robust_edge = format!("{:.1}%", edge * 100.0),
                    kelly = format!("{:.2}%", best.kelly.unwrap_or(0.0) * 100.0),
                    "Robust edge BUY"
                );
                format!("Robust edge on {side}: +{:.1}% after adjustments.", edge * 100.0)
            }
            RobustDecision::Pass => {
                debug!(side = %side, reason = %reason, "Robust edge PASS");
                format!("PASS: {}.", reason.to_string().replace('_', " "))
            }
        };

        RobustEdgeResult {
            side: (decision == RobustDecision::Buy).then_some(side),
            decision,
            reason,
            raw_edge_up: up.raw_edge,
            raw_edge_down: down.raw_edge,
            uncertainty_discount_up: up.uncertainty_discount,
            uncertainty_discount_down: down.uncertainty_discount,
            p_low_up: up.p_low,
            p_low_down: down.p_low,
            edge_low_up: up.edge_low,
            edge_low_down: down.edge_low,
            time_mult,
            exec_cost_up: Some(exec_cost),
            exec_cost_down: Some(exec_cost),
            robust_edge_up: up.robust_edge,
            robust_edge_down: down.robust_edge,
            robust_roi_up: up.robust_roi,
            robust_roi_down: down.robust_roi,
            kelly_up: up.kelly,
            kelly_down: down.kelly,
            sigma_up: Some(sigma_up),
            sigma_down: Some(sigma_down),
            interpretation,
        }
    }
}

/// First failing gate, in order; `RobustCriteriaMet` when all pass.
fn gate(best: &SideScore, time_mult: f64, config: &RobustConfig) -> RobustReason {
    match best.robust_edge {
        Some(edge) if edge > 0.0 => {}
        _ => return RobustReason::RobustEdgeNotPositive,
    }
    if best.robust_roi.unwrap_or(0.0) < config.min_robust_roi {
        return RobustReason::RobustRoiBelowThreshold;
    }
    if time_mult < config.min_time_mult {
        return RobustReason::TimeMultBelowThreshold;
    }
    if best.kelly.unwrap_or(0.0) < config.min_kelly_pct_bankroll {
        return RobustReason::KellyBelowMinimum;
    }
    RobustReason::RobustCriteriaMet
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
