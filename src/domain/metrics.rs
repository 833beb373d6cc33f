//! Performance metrics over the full ledger.
//!
//! Everything here is a pure function of the snapshot it is handed: the
//! aggregator holds no state between runs, so recomputing after every
//! mutation is the contract, not an optimization target.

use chrono::NaiveDateTime;

use super::account::AccountConfig;
use super::risk::round2;
use super::trade::{Outcome, TradeRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub at: NaiveDateTime,
    pub equity: f64,
}

/// Trades needed to close an R distance at a given reward:risk ratio.
#[derive(Debug, Clone, PartialEq)]
pub struct TradesNeeded {
    pub reward_ratio: f64,
    pub trades: u32,
}

/// Remaining distance to one configured phase target.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseProgress {
    pub multiplier: f64,
    pub target_equity: f64,
    pub r_to_target: f64,
    pub trades_needed: Vec<TradesNeeded>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub break_evens: usize,
    /// Percentage in [0, 100]; 0 when the ledger holds no trades.
    pub win_rate: f64,
    pub gross_profit: f64,
    /// Sum of negative net P&L, kept signed (<= 0).
    pub gross_loss: f64,
    /// Includes Adjustment rows.
    pub net_profit: f64,
    pub profit_factor: f64,
    pub payoff_ratio: f64,
    pub expectancy: f64,
    pub best_trade: f64,
    pub worst_trade: f64,
    pub equity_curve: Vec<EquityPoint>,
    pub current_equity: f64,
    pub max_drawdown: f64,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
    pub total_r: f64,
    pub phase_progress: Vec<PhaseProgress>,
    /// Losing trades of exactly 1R that would reach the drawdown floor.
    pub trades_to_floor: u32,
}

impl MetricsSnapshot {
    /// Aggregate the full ledger. Adjustment rows count toward equity,
    /// net profit and total R but never toward win/loss statistics.
    pub fn compute(ledger: &[TradeRecord], config: &AccountConfig) -> Self {
        let mut rows: Vec<&TradeRecord> = ledger.iter().collect();
        rows.sort_by_key(|r| r.executed_at);

        let mut equity_curve = Vec::with_capacity(rows.len());
        let mut equity = config.account_size;
        for row in &rows {
            equity += row.net_pnl;
            equity_curve.push(EquityPoint {
                at: row.executed_at,
                equity,
            });
        }
        let current_equity = equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(config.account_size);
        let net_profit: f64 = rows.iter().map(|r| r.net_pnl).sum();

        let trades: Vec<&TradeRecord> = rows
            .iter()
            .copied()
            .filter(|r| r.outcome.is_trade())
            .collect();

        let mut wins = 0usize;
        let mut losses = 0usize;
        let mut break_evens = 0usize;
        let mut gross_profit = 0.0_f64;
        let mut gross_loss = 0.0_f64;
        // True extremes over net P&L, not clamped at zero: an all-loss
        // ledger's best trade is its smallest loss. Zero only when empty.
        let mut best_trade = f64::NEG_INFINITY;
        let mut worst_trade = f64::INFINITY;
        for trade in &trades {
            match trade.outcome {
                Outcome::Win => wins += 1,
                Outcome::Loss => losses += 1,
                Outcome::BreakEven => break_evens += 1,
                Outcome::Adjustment => {}
            }
            if trade.net_pnl > 0.0 {
                gross_profit += trade.net_pnl;
            } else if trade.net_pnl < 0.0 {
                gross_loss += trade.net_pnl;
            }
            if trade.net_pnl > best_trade {
                best_trade = trade.net_pnl;
            }
            if trade.net_pnl < worst_trade {
                worst_trade = trade.net_pnl;
            }
        }
        if trades.is_empty() {
            best_trade = 0.0;
            worst_trade = 0.0;
        }

        let total_trades = trades.len();
        let win_rate = if total_trades > 0 {
            round2(wins as f64 / total_trades as f64 * 100.0)
        } else {
            0.0
        };

        let profit_factor = if gross_loss != 0.0 {
            round2((gross_profit / gross_loss).abs())
        } else {
            0.0
        };

        let winners = trades.iter().filter(|t| t.net_pnl > 0.0).count();
        let losers = trades.iter().filter(|t| t.net_pnl < 0.0).count();
        let payoff_ratio = if winners > 0 && losers > 0 {
            let avg_win = gross_profit / winners as f64;
            let avg_loss = gross_loss / losers as f64;
            round2((avg_win / avg_loss).abs())
        } else {
            0.0
        };

        let expectancy = if total_trades > 0 {
            round2(trades.iter().map(|t| t.net_pnl).sum::<f64>() / total_trades as f64)
        } else {
            0.0
        };

        let max_drawdown = compute_drawdown(&equity_curve);
        let (max_consecutive_wins, max_consecutive_losses) = compute_streaks(&trades);

        let risk = config.risk_amount();
        let total_r = if risk > 0.0 {
            round2(net_profit / risk)
        } else {
            0.0
        };

        let phase_progress = config
            .phase_targets
            .iter()
            .map(|&multiplier| {
                phase_progress(multiplier, current_equity, risk, config)
            })
            .collect();

        let trades_to_floor = if risk > 0.0 {
            let distance = (current_equity - config.floor_equity()).max(0.0);
            (distance / risk).ceil() as u32
        } else {
            0
        };

        MetricsSnapshot {
            total_trades,
            wins,
            losses,
            break_evens,
            win_rate,
            gross_profit,
            gross_loss,
            net_profit,
            profit_factor,
            payoff_ratio,
            expectancy,
            best_trade,
            worst_trade,
            equity_curve,
            current_equity,
            max_drawdown,
            max_consecutive_wins,
            max_consecutive_losses,
            total_r,
            phase_progress,
            trades_to_floor,
        }
    }
}

fn phase_progress(
    multiplier: f64,
    current_equity: f64,
    risk: f64,
    config: &AccountConfig,
) -> PhaseProgress {
    let target_equity = config.account_size * multiplier;
    let r_to_target = if risk > 0.0 {
        (target_equity - current_equity).max(0.0) / risk
    } else {
        0.0
    };
    let trades_needed = config
        .reward_ratios
        .iter()
        .map(|&reward_ratio| TradesNeeded {
            reward_ratio,
            trades: (r_to_target / reward_ratio).ceil() as u32,
        })
        .collect();
    PhaseProgress {
        multiplier,
        target_equity,
        r_to_target: round2(r_to_target),
        trades_needed,
    }
}

/// Maximum running-peak-minus-equity distance, in account currency.
fn compute_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let mut peak = f64::MIN;
    let mut max_dd = 0.0_f64;
    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        }
        let dd = peak - point.equity;
        if dd > max_dd {
            max_dd = dd;
        }
    }
    max_dd
}

/// Longest win run and longest loss run. BreakEven resets both counters,
/// matching the run semantics of the weekly loss rule.
fn compute_streaks(trades: &[&TradeRecord]) -> (usize, usize) {
    let mut win_run = 0usize;
    let mut loss_run = 0usize;
    let mut max_wins = 0usize;
    let mut max_losses = 0usize;
    for trade in trades {
        match trade.outcome {
            Outcome::Win => {
                win_run += 1;
                loss_run = 0;
                max_wins = max_wins.max(win_run);
            }
            Outcome::Loss => {
                loss_run += 1;
                win_run = 0;
                max_losses = max_losses.max(loss_run);
            }
            _ => {
                win_run = 0;
                loss_run = 0;
            }
        }
    }
    (max_wins, max_losses)
}
