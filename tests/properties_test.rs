//! Property tests for the algebraic contracts of the engine.

mod common;

use common::*;
use proptest::prelude::*;
use quantjournal::domain::metrics::MetricsSnapshot;
use quantjournal::domain::risk;
use quantjournal::domain::trade::CandidateTrade;

proptest! {
    // to_r is linear in net up to the 2dp presentation rounding.
    #[test]
    fn to_r_scales_linearly(net in -10_000.0..10_000.0f64, k in 1u32..10) {
        let account_size = 60_000.0;
        let risk_pct = 0.0025;
        let single = risk::to_r(net, account_size, risk_pct);
        let scaled = risk::to_r(net * k as f64, account_size, risk_pct);
        // Each rounding step contributes at most half a cent of R.
        prop_assert!((scaled - single * k as f64).abs() <= 0.005 * (k as f64 + 1.0));
    }

    #[test]
    fn to_r_zero_risk_returns_zero(net in -1e9..1e9f64) {
        prop_assert_eq!(risk::to_r(net, 0.0, 0.0), 0.0);
    }

    #[test]
    fn win_rate_bounded(outcomes in proptest::collection::vec(0usize..3, 0..40)) {
        let ledger: Vec<_> = outcomes
            .iter()
            .enumerate()
            .map(|(i, &o)| {
                let outcome = ["Win", "Loss", "BE"][o];
                let net = match o { 0 => 100.0, 1 => -100.0, _ => 0.0 };
                trade(
                    "2024-01-02",
                    &format!("{:02}:{:02}:00", 1 + i / 60, i % 60),
                    outcome,
                    net,
                )
            })
            .collect();
        let snapshot = MetricsSnapshot::compute(&ledger, &account());
        prop_assert!(snapshot.win_rate >= 0.0);
        prop_assert!(snapshot.win_rate <= 100.0);
        if ledger.is_empty() {
            prop_assert_eq!(snapshot.win_rate, 0.0);
        }
    }

    #[test]
    fn aggregator_idempotent(nets in proptest::collection::vec(-500.0..500.0f64, 0..25)) {
        let ledger: Vec<_> = nets
            .iter()
            .enumerate()
            .map(|(i, &net)| {
                let outcome = if net > 0.0 { "Win" } else { "Loss" };
                trade(
                    "2024-01-02",
                    &format!("{:02}:{:02}:00", 1 + i / 60, i % 60),
                    outcome,
                    net,
                )
            })
            .collect();
        let first = MetricsSnapshot::compute(&ledger, &account());
        let second = MetricsSnapshot::compute(&ledger, &account());
        prop_assert_eq!(first, second);
    }

    // Whatever gross is submitted, a BreakEven trade nets minus commission.
    #[test]
    fn breakeven_invariant(gross in -10_000.0..10_000.0f64, size in 0.0..50.0f64) {
        let record = CandidateTrade::parse(
            "2024-01-05",
            "10:30:00",
            "EURUSD",
            "Long",
            size,
            gross,
            "BE",
        )
        .unwrap()
        .finalize(&account());
        prop_assert_eq!(record.gross_pnl, 0.0);
        prop_assert!((record.net_pnl + record.commission).abs() < 1e-12);
    }

    // Profit factor is always a non-negative, finite number.
    #[test]
    fn profit_factor_defined(nets in proptest::collection::vec(-500.0..500.0f64, 0..25)) {
        let ledger: Vec<_> = nets
            .iter()
            .enumerate()
            .map(|(i, &net)| {
                let outcome = if net > 0.0 { "Win" } else { "Loss" };
                trade(
                    "2024-01-02",
                    &format!("{:02}:{:02}:00", 1 + i / 60, i % 60),
                    outcome,
                    net,
                )
            })
            .collect();
        let snapshot = MetricsSnapshot::compute(&ledger, &account());
        prop_assert!(snapshot.profit_factor.is_finite());
        prop_assert!(snapshot.profit_factor >= 0.0);
        prop_assert!(snapshot.payoff_ratio.is_finite());
        prop_assert!(snapshot.expectancy.is_finite());
    }
}
