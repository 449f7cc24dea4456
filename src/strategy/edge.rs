//! Naive edge detection and the phase-threshold decision strategy.
//!
//! Normalizes the market's quoted prices into probabilities, compares them to
//! the model forecast, and classifies the best side into ENTER / NO_TRADE
//! using thresholds that tighten as the market approaches resolution.

use serde::{Serialize, Serializer};
use std::fmt;
use tracing::debug;

use crate::indicators::clamp_probability;
use crate::types::{MarketQuote, ModelForecast, Side};

// ---------------------------------------------------------------------------
// Edge
// ---------------------------------------------------------------------------

/// Normalized market probabilities and raw model-vs-market edge per side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeResult {
    pub market_up: Option<f64>,
    pub market_down: Option<f64>,
    pub edge_up: Option<f64>,
    pub edge_down: Option<f64>,
}

impl EdgeResult {
    pub fn market_for(&self, side: Side) -> Option<f64> {
        match side {
            Side::Up => self.market_up,
            Side::Down => self.market_down,
        }
    }

    pub fn edge_for(&self, side: Side) -> Option<f64> {
        match side {
            Side::Up => self.edge_up,
            Side::Down => self.edge_down,
        }
    }
}

// ---------------------------------------------------------------------------
// Phase / strength tables
// ---------------------------------------------------------------------------

/// Coarse bucket of remaining time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Early,
    Mid,
    Late,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Early => write!(f, "EARLY"),
            Phase::Mid => write!(f, "MID"),
            Phase::Late => write!(f, "LATE"),
        }
    }
}

/// Thresholds that apply while more than `above_minutes` remain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseRule {
    pub phase: Phase,
    pub above_minutes: f64,
    /// Minimum edge on the best side.
    pub edge_threshold: f64,
    /// Minimum model probability on the best side.
    pub min_prob: f64,
}

/// Ordered from earliest to latest; the first rule whose bound is exceeded wins.
pub const PHASE_TABLE: [PhaseRule; 3] = [
    PhaseRule {
        phase: Phase::Early,
        above_minutes: 10.0,
        edge_threshold: 0.05,
        min_prob: 0.55,
    },
    PhaseRule {
        phase: Phase::Mid,
        above_minutes: 5.0,
        edge_threshold: 0.10,
        min_prob: 0.60,
    },
    PhaseRule {
        phase: Phase::Late,
        above_minutes: f64::NEG_INFINITY,
        edge_threshold: 0.20,
        min_prob: 0.65,
    },
];

impl PhaseRule {
    /// Rule for the given number of minutes left. NaN falls through to LATE.
    pub fn for_remaining(remaining_minutes: f64) -> &'static PhaseRule {
        PHASE_TABLE
            .iter()
            .find(|rule| remaining_minutes > rule.above_minutes)
            .unwrap_or(&PHASE_TABLE[PHASE_TABLE.len() - 1])
    }
}

/// Conviction tier of an ENTER decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strength {
    Strong,
    Good,
    Optional,
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strength::Strong => write!(f, "STRONG"),
            Strength::Good => write!(f, "GOOD"),
            Strength::Optional => write!(f, "OPTIONAL"),
        }
    }
}

/// Minimum edge per strength tier, strongest first.
pub const STRENGTH_TABLE: [(f64, Strength); 2] = [(0.20, Strength::Strong), (0.10, Strength::Good)];

impl Strength {
    pub fn for_edge(edge: f64) -> Self {
        STRENGTH_TABLE
            .iter()
            .find(|(min_edge, _)| edge >= *min_edge)
            .map(|(_, strength)| *strength)
            .unwrap_or(Strength::Optional)
    }
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Enter,
    NoTrade,
}

/// Machine-readable reason attached to every simple decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecisionReason {
    MissingMarketData,
    EdgeBelow(f64),
    ProbBelow(f64),
    EdgeAboveThreshold,
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionReason::MissingMarketData => write!(f, "missing_market_data"),
            DecisionReason::EdgeBelow(threshold) => write!(f, "edge_below_{threshold}"),
            DecisionReason::ProbBelow(min_prob) => write!(f, "prob_below_{min_prob}"),
            DecisionReason::EdgeAboveThreshold => write!(f, "edge_above_threshold"),
        }
    }
}

impl Serialize for DecisionReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of the phase-threshold strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionResult {
    pub action: Action,
    pub side: Option<Side>,
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<Strength>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge: Option<f64>,
    pub reason: DecisionReason,
    pub interpretation: String,
}

impl DecisionResult {
    fn no_trade(phase: Phase, reason: DecisionReason, interpretation: String) -> Self {
        Self {
            action: Action::NoTrade,
            side: None,
            phase,
            strength: None,
            edge: None,
            reason,
            interpretation,
        }
    }
}

/// Format a probability as a one-decimal percentage, `-` when absent.
pub fn pct(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.1}%", v * 100.0),
        _ => "-".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

/// Stateless edge calculator and phase-threshold classifier.
pub struct EdgeCalculator;

impl EdgeCalculator {
    /// Normalize quotes and compute the raw edge for each side.
    pub fn compute_edge(forecast: ModelForecast, quote: MarketQuote) -> EdgeResult {
        let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
        let (Some(up), Some(down)) = (finite(quote.up), finite(quote.down)) else {
            return EdgeResult::default();
        };

        let sum = up + down;
        if !sum.is_finite() || sum <= 0.0 {
            return EdgeResult::default();
        }

        let market_up = clamp_probability(up / sum);
        let market_down = clamp_probability(down / sum);
        let edge = |model: Option<f64>, market: f64| {
            model.filter(|m| m.is_finite()).map(|m| m - market)
        };

        EdgeResult {
            market_up: Some(market_up),
            market_down: Some(market_down),
            edge_up: edge(forecast.model_up, market_up),
            edge_down: edge(forecast.model_down, market_down),
        }
    }

    /// Classify the best side against the phase thresholds.
    pub fn decide(
        remaining_minutes: f64,
        edge_up: Option<f64>,
        edge_down: Option<f64>,
        model_up: Option<f64>,
        model_down: Option<f64>,
    ) -> DecisionResult {
        let rule = PhaseRule::for_remaining(remaining_minutes);
        let phase = rule.phase;

        let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
        let (Some(edge_up), Some(edge_down)) = (finite(edge_up), finite(edge_down)) else {
            return DecisionResult::no_trade(
                phase,
                DecisionReason::MissingMarketData,
                "No bet: market data missing (UP/DOWN prices).".to_string(),
            );
        };

        let (side, best_edge, best_model) = if edge_up >= edge_down {
            (Side::Up, edge_up, model_up)
        } else {
            (Side::Down, edge_down, model_down)
        };

        if best_edge < rule.edge_threshold {
            debug!(
                side = %side,
                edge = format!("{:.1}%", best_edge * 100.0),
                threshold = rule.edge_threshold,
                phase = %phase,
                "Edge below phase threshold"
            );
            return DecisionResult::no_trade(
                phase,
                DecisionReason::EdgeBelow(rule.edge_threshold),
                format!(
                    "No bet: best edge {} below required {} ({phase}). Model {} not enough advantage vs market.",
                    pct(Some(best_edge)),
                    pct(Some(rule.edge_threshold)),
                    pct(best_model),
                ),
            );
        }

        if let Some(prob) = best_model {
            if prob < rule.min_prob {
                debug!(
                    side = %side,
                    model = format!("{:.1}%", prob * 100.0),
                    min_prob = rule.min_prob,
                    phase = %phase,
                    "Model probability below phase minimum"
                );
                return DecisionResult::no_trade(
                    phase,
                    DecisionReason::ProbBelow(rule.min_prob),
                    format!(
                        "No bet: model prob {} below minimum {} for {phase}. Edge {} OK but conviction too low.",
                        pct(Some(prob)),
                        pct(Some(rule.min_prob)),
                        pct(Some(best_edge)),
                    ),
                );
            }
        }

        let strength = Strength::for_edge(best_edge);
        debug!(
            side = %side,
            edge = format!("{:.1}%", best_edge * 100.0),
            strength = %strength,
            phase = %phase,
            "Entry suggested"
        );

        DecisionResult {
            action: Action::Enter,
            side: Some(side),
            phase,
            strength: Some(strength),
            edge: Some(best_edge),
            reason: DecisionReason::EdgeAboveThreshold,
            interpretation: format!(
                "BET SUGGESTED: {side} - Model {} vs market; edge +{} ({strength}). Phase: {phase}.",
                pct(best_model),
                pct(Some(best_edge)),
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
