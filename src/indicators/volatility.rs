//! Short-term realized volatility from 1-minute candle closes.

use tracing::debug;

use super::sample_std_dev;

/// Default number of 1-minute returns in the lookback window.
pub const DEFAULT_LOOKBACK: usize = 20;

/// Realized volatility estimator over a fixed lookback window.
#[derive(Debug, Clone, Copy)]
pub struct VolatilityEstimator {
    lookback: usize,
}

impl Default for VolatilityEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKBACK)
    }
}

impl VolatilityEstimator {
    pub fn new(lookback: usize) -> Self {
        Self { lookback }
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }

    /// Estimate volatility for a close series (oldest first).
    pub fn estimate(&self, closes: &[f64]) -> Option<f64> {
        let vol = realized_volatility(closes, self.lookback);
        debug!(
            closes = closes.len(),
            lookback = self.lookback,
            vol = ?vol,
            "Realized volatility"
        );
        vol
    }
}

/// Standard deviation of the last `lookback` one-step log returns.
///
/// Needs at least `lookback + 1` closes. Non-finite returns (zero or negative
/// prices, gaps) are dropped; fewer than two surviving returns yields `None`.
pub fn realized_volatility(closes: &[f64], lookback: usize) -> Option<f64> {
    let needed = lookback.checked_add(1)?;
    if closes.len() < needed {
        return None;
    }

    let window = &closes[closes.len() - needed..];
    let returns: Vec<f64> = window
        .windows(2)
        .map(|pair| (pair[1] / pair[0]).ln())
        .filter(|r| r.is_finite())
        .collect();

    sample_std_dev(&returns)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
