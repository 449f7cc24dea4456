//! End-to-end pipeline scenarios over realistic tick sequences.

use edgewise::strategy::edge::{Action, DecisionReason, EdgeCalculator, Phase, Strength};
use edgewise::strategy::history::HISTORY_CAPACITY;
use edgewise::strategy::quality::MoveProbability;
use edgewise::strategy::robust::{RobustDecision, RobustReason, SIGMA_FLOOR};
use edgewise::strategy::{EdgePipeline, Tick};
use edgewise::types::{MarketQuote, ModelForecast, Side, StrikeContext};

/// 30 closes alternating between 100k and 100.1k: roughly 0.1% per-minute vol.
fn make_closes() -> Vec<f64> {
    (0..30)
        .map(|i| if i % 2 == 0 { 100_000.0 } else { 100_100.0 })
        .collect()
}

fn make_tick(model_up: f64, market_up: f64, price_to_beat: f64, minutes: f64) -> Tick {
    Tick {
        quote: MarketQuote::new(market_up, 1.0 - market_up),
        forecast: ModelForecast::new(model_up, 1.0 - model_up),
        closes: make_closes(),
        strike: StrikeContext::new(100_000.0, price_to_beat, minutes),
        spread: Some(0.01),
    }
}

#[test]
fn test_decide_documented_cases() {
    let early = EdgeCalculator::decide(12.0, Some(0.08), Some(0.01), Some(0.62), None);
    assert_eq!(early.phase, Phase::Early);
    assert_eq!(early.action, Action::Enter);
    assert_eq!(early.side, Some(Side::Up));
    assert_eq!(early.strength, Some(Strength::Optional));

    let late = EdgeCalculator::decide(3.0, Some(0.18), Some(0.05), Some(0.7), None);
    assert_eq!(late.phase, Phase::Late);
    assert_eq!(late.action, Action::NoTrade);
    assert_eq!(late.reason, DecisionReason::EdgeBelow(0.2));
    assert_eq!(late.reason.to_string(), "edge_below_0.2");
}

#[test]
fn test_near_strike_early_both_strategies_agree() {
    let pipeline = EdgePipeline::default();
    let eval = pipeline.evaluate(&make_tick(0.75, 0.45, 100_010.0, 14.0));

    let vol = eval.realized_vol.unwrap();
    assert!(vol > 0.0009 && vol < 0.0011, "vol = {vol}");
    assert_eq!(eval.edge_quality.move_probability, Some(MoveProbability::High));
    assert_eq!(eval.edge_quality.time_multiplier, 1.0);

    assert_eq!(eval.decision.action, Action::Enter);
    assert_eq!(eval.decision.side, Some(Side::Up));
    assert_eq!(eval.robust_edge.decision, RobustDecision::Buy);
    assert_eq!(eval.robust_edge.side, Some(Side::Up));
}

#[test]
fn test_far_strike_late_strategies_diverge() {
    // Large model edge, but the strike is many expected moves away with two
    // minutes left: the phase classifier still enters, the robust scorer
    // passes on time feasibility.
    let pipeline = EdgePipeline::default();
    let eval = pipeline.evaluate(&make_tick(0.95, 0.10, 100_500.0, 2.0));

    assert!(eval.edge_quality.z_score.unwrap() > 2.0);
    assert_eq!(eval.edge_quality.time_multiplier, 0.1);
    assert_eq!(eval.edge_quality.move_probability, Some(MoveProbability::Low));
    assert!(eval.edge_quality.note.is_some());

    assert_eq!(eval.decision.phase, Phase::Late);
    assert_eq!(eval.decision.action, Action::Enter);
    assert_eq!(eval.decision.strength, Some(Strength::Strong));

    assert_eq!(eval.robust_edge.decision, RobustDecision::Pass);
    assert_eq!(eval.robust_edge.reason, RobustReason::TimeMultBelowThreshold);
    assert!(eval.robust_edge.side.is_none());
}

#[test]
fn test_countdown_multiplier_never_increases() {
    let pipeline = EdgePipeline::default();
    let mut last = f64::INFINITY;
    for minutes in [14.0, 10.0, 6.0, 3.0, 1.0, 0.5] {
        let eval = pipeline.evaluate(&make_tick(0.7, 0.5, 100_150.0, minutes));
        let mult = eval.edge_quality.time_multiplier;
        assert!(mult <= last, "multiplier rose to {mult} at {minutes} min");
        last = mult;
    }
}

#[test]
fn test_history_bounded_and_sigma_returns_to_floor() {
    let pipeline = EdgePipeline::default();

    for i in 0..40 {
        let p = if i % 2 == 0 { 0.4 } else { 0.8 };
        pipeline.evaluate(&make_tick(p, 0.5, 100_010.0, 12.0));
    }
    assert_eq!(pipeline.history_len(), (HISTORY_CAPACITY, HISTORY_CAPACITY));

    let mut last_sigma = f64::INFINITY;
    let mut sigma = 0.0;
    for _ in 0..HISTORY_CAPACITY {
        let eval = pipeline.evaluate(&make_tick(0.6, 0.5, 100_010.0, 12.0));
        sigma = eval.robust_edge.sigma_up.unwrap();
        assert!(sigma <= last_sigma + 1e-12);
        last_sigma = sigma;
    }
    assert_eq!(sigma, SIGMA_FLOOR);
    assert_eq!(pipeline.history_len(), (HISTORY_CAPACITY, HISTORY_CAPACITY));
}

#[test]
fn test_independent_pipelines_do_not_share_history() {
    let a = EdgePipeline::default();
    let b = EdgePipeline::default();
    for _ in 0..5 {
        a.evaluate(&make_tick(0.6, 0.5, 100_010.0, 12.0));
    }
    assert_eq!(a.history_len(), (5, 5));
    assert_eq!(b.history_len(), (0, 0));
}

#[test]
fn test_pure_stages_are_repeatable() {
    let tick = make_tick(0.66, 0.48, 100_040.0, 7.0);
    let first = EdgePipeline::default().evaluate(&tick);
    let second = EdgePipeline::default().evaluate(&tick);
    assert_eq!(first.edge, second.edge);
    assert_eq!(first.decision, second.decision);
    assert_eq!(first.edge_quality, second.edge_quality);
    assert_eq!(first.robust_edge, second.robust_edge);
}
