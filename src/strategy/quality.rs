//! Time feasibility and real edge.
//!
//! A raw edge is only worth something if the underlying can plausibly cross
//! the strike before resolution. Distance to strike is measured in units of
//! the expected move (volatility scaled by the square root of time left) and
//! mapped to a multiplier that discounts the raw edge.

use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::types::StrikeContext;

/// Default market window in minutes.
pub const DEFAULT_BASE_INTERVAL_MINUTES: f64 = 15.0;

/// Upper z-score bound (exclusive) → time multiplier. Beyond the last bound
/// the multiplier is [`FAR_TIME_MULTIPLIER`].
pub const TIME_MULTIPLIER_TABLE: [(f64, f64); 3] = [(0.5, 1.0), (1.0, 0.7), (2.0, 0.35)];
pub const FAR_TIME_MULTIPLIER: f64 = 0.1;

const NOTE_MAX_MINUTES: f64 = 5.0;
const NOTE_MIN_EDGE: f64 = 0.02;
const NOTE_MAX_MULTIPLIER: f64 = 0.5;
const THEORETICAL_EDGE_NOTE: &str = "Edge is theoretical due to limited time remaining.";

/// Qualitative likelihood that the required move happens in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MoveProbability {
    High,
    Moderate,
    Low,
}

impl fmt::Display for MoveProbability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveProbability::High => write!(f, "High"),
            MoveProbability::Moderate => write!(f, "Moderate"),
            MoveProbability::Low => write!(f, "Low"),
        }
    }
}

pub const MOVE_PROBABILITY_TABLE: [(f64, MoveProbability); 2] =
    [(0.5, MoveProbability::High), (1.0, MoveProbability::Moderate)];

impl MoveProbability {
    pub fn for_z_score(z: f64) -> Self {
        MOVE_PROBABILITY_TABLE
            .iter()
            .find(|(bound, _)| z < *bound)
            .map(|(_, label)| *label)
            .unwrap_or(MoveProbability::Low)
    }
}

/// Step-function time multiplier for a z-score.
pub fn time_multiplier_for(z: f64) -> f64 {
    TIME_MULTIPLIER_TABLE
        .iter()
        .find(|(bound, _)| z < *bound)
        .map(|(_, mult)| *mult)
        .unwrap_or(FAR_TIME_MULTIPLIER)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeQualityResult {
    pub raw_edge_up: Option<f64>,
    pub raw_edge_down: Option<f64>,
    pub real_edge_up: Option<f64>,
    pub real_edge_down: Option<f64>,
    pub time_multiplier: f64,
    pub expected_move: Option<f64>,
    pub distance_to_strike: Option<f64>,
    pub z_score: Option<f64>,
    pub move_probability: Option<MoveProbability>,
    pub note: Option<String>,
}

impl EdgeQualityResult {
    fn pass_through(raw_edge_up: Option<f64>, raw_edge_down: Option<f64>) -> Self {
        Self {
            raw_edge_up,
            raw_edge_down,
            real_edge_up: raw_edge_up,
            real_edge_down: raw_edge_down,
            time_multiplier: 1.0,
            expected_move: None,
            distance_to_strike: None,
            z_score: None,
            move_probability: None,
            note: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QualityConfig {
    /// Full market window the volatility is scaled against.
    pub base_interval_minutes: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            base_interval_minutes: DEFAULT_BASE_INTERVAL_MINUTES,
        }
    }
}

pub struct EdgeQualityAdjuster {
    config: QualityConfig,
}

impl EdgeQualityAdjuster {
    pub fn new(config: QualityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    /// Discount raw edges by how reachable the strike is in the time left.
    pub fn adjust(
        &self,
        strike: &StrikeContext,
        realized_vol: Option<f64>,
        raw_edge_up: Option<f64>,
        raw_edge_down: Option<f64>,
    ) -> EdgeQualityResult {
        let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
        let (Some(price), Some(price_to_beat), Some(minutes)) = (
            finite(strike.price),
            finite(strike.price_to_beat),
            finite(strike.time_left_minutes),
        ) else {
            return EdgeQualityResult::pass_through(raw_edge_up, raw_edge_down);
        };
        if minutes <= 0.0 || price <= 0.0 {
            return EdgeQualityResult::pass_through(raw_edge_up, raw_edge_down);
        }

        let distance_to_strike = (price_to_beat - price).abs();

        let expected_move = realized_vol
            .filter(|v| v.is_finite() && *v > 0.0)
            .map(|vol| price * vol * (minutes / self.config.base_interval_minutes).sqrt());
        let z_score = expected_move
            .filter(|m| *m > 0.0)
            .map(|m| distance_to_strike / m)
            .filter(|z| z.is_finite());

        let time_multiplier = z_score.map(time_multiplier_for).unwrap_or(1.0);
        let move_probability = z_score.map(MoveProbability::for_z_score);

        let discount = |edge: Option<f64>| match edge {
            Some(e) if e.is_finite() => Some(e * time_multiplier),
            other => other,
        };

        let best_raw_edge = raw_edge_up.unwrap_or(0.0).max(raw_edge_down.unwrap_or(0.0));
        let note = (minutes < NOTE_MAX_MINUTES
            && best_raw_edge > NOTE_MIN_EDGE
            && time_multiplier < NOTE_MAX_MULTIPLIER)
            .then(|| THEORETICAL_EDGE_NOTE.to_string());

        debug!(
            distance = distance_to_strike,
            expected_move = ?expected_move,
            z_score = ?z_score,
            time_multiplier,
            minutes,
            "Edge quality"
        );

        EdgeQualityResult {
            raw_edge_up,
            raw_edge_down,
            real_edge_up: discount(raw_edge_up),
            real_edge_down: discount(raw_edge_down),
            time_multiplier,
            expected_move,
            distance_to_strike: Some(distance_to_strike),
            z_score,
            move_probability,
            note,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
