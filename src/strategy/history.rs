//! Rolling forecast history used to estimate model uncertainty.

use std::collections::VecDeque;

use crate::indicators::{clamp_probability, sample_std_dev};
use crate::types::{ModelForecast, Side};

/// Number of recent forecasts kept per side.
pub const HISTORY_CAPACITY: usize = 30;

/// Bounded FIFO of recent forecast probabilities for one side.
///
/// Values are clamped into [0, 1] on push and the length never exceeds the
/// capacity; the oldest value is evicted first.
#[derive(Debug, Clone)]
pub struct ProbabilityHistory {
    values: VecDeque<f64>,
    capacity: usize,
}

impl Default for ProbabilityHistory {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}

impl ProbabilityHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Record a forecast. Non-finite values are ignored.
    pub fn push(&mut self, probability: f64) {
        if !probability.is_finite() {
            return;
        }
        self.values.push_back(clamp_probability(probability));
        while self.values.len() > self.capacity {
            self.values.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest value still held.
    pub fn oldest(&self) -> Option<f64> {
        self.values.front().copied()
    }

    /// Bessel-corrected standard deviation, never below `floor`.
    pub fn std_dev(&self, floor: f64) -> f64 {
        let samples: Vec<f64> = self.values.iter().copied().collect();
        sample_std_dev(&samples)
            .map(|std| std.max(floor))
            .unwrap_or(floor)
    }
}

/// Forecast histories for both sides of a market.
#[derive(Debug, Clone, Default)]
pub struct ForecastHistory {
    pub up: ProbabilityHistory,
    pub down: ProbabilityHistory,
}

impl ForecastHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            up: ProbabilityHistory::with_capacity(capacity),
            down: ProbabilityHistory::with_capacity(capacity),
        }
    }

    /// Record whichever sides of the forecast are present.
    pub fn record(&mut self, forecast: &ModelForecast) {
        if let Some(p) = forecast.model_up {
            self.up.push(p);
        }
        if let Some(p) = forecast.model_down {
            self.down.push(p);
        }
    }

    pub fn side(&self, side: Side) -> &ProbabilityHistory {
        match side {
            Side::Up => &self.up,
            Side::Down => &self.down,
        }
    }
}
