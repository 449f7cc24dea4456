//! Kelly criterion for binary contracts.
//!
//! Buying one side at price `q` pays `1 - q` on a win and loses `q`
//! otherwise, so the net odds are `b = (1 - q) / q`. With win probability `p`
//! the Kelly fraction `f* = (b·p - (1 - p)) / b` simplifies to
//! `(p - q) / (1 - q)`: the edge over the price, scaled by what is left to win.

/// Market prices at or above this leave nothing to win; Kelly is undefined.
pub const MAX_KELLY_PRICE: f64 = 0.999;

/// Full-Kelly bankroll fraction for an `edge = p - q` bought at price `q`.
///
/// Used as a conviction gate rather than actual position sizing. Returns
/// `None` when the price is too close to 1 (or not finite).
pub fn kelly_fraction(edge: f64, market_price: f64) -> Option<f64> {
    if !market_price.is_finite() || market_price >= MAX_KELLY_PRICE {
        return None;
    }
    Some(edge / (1.0 - market_price))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_kelly() {
        // p = 0.6 at q = 0.5 → (0.6 - 0.5) / 0.5 = 0.2
        let k = kelly_fraction(0.1, 0.5).unwrap();
        assert!((k - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_matches_odds_form() {
        let (p, q) = (0.62, 0.48);
        let b = (1.0 - q) / q;
        let classic = (b * p - (1.0 - p)) / b;
        assert!((kelly_fraction(p - q, q).unwrap() - classic).abs() < 1e-12);
    }

    #[test]
    fn test_negative_edge_negative_kelly() {
        assert!(kelly_fraction(-0.05, 0.4).unwrap() < 0.0);
    }

    #[test]
    fn test_price_near_one_undefined() {
        assert!(kelly_fraction(0.0005, 0.999).is_none());
        assert!(kelly_fraction(0.1, f64::NAN).is_none());
        assert!(kelly_fraction(0.1, 0.998).is_some());
    }
}
