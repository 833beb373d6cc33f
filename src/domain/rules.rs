//! Discretionary trading rules evaluated against the current ledger.
//!
//! Evaluation is advisory: a candidate is never blocked, the caller decides
//! what to do with the violations. Every check is pure over the snapshot it
//! is handed; nothing is cached between evaluations.

use chrono::{Datelike, Duration, NaiveDateTime};
use std::fmt;

use super::trade::{CandidateTrade, Outcome, TradeRecord};

/// Minimum wait after a losing trade before the next entry.
pub const LOSS_COOLDOWN_MINUTES: i64 = 10;
/// Losses allowed per calendar day before the journal tells you to stop.
pub const DAILY_LOSS_CAP: usize = 2;
/// Consecutive losses within one ISO week that end the trading week.
pub const WEEKLY_CONSECUTIVE_LOSS_CAP: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleViolation {
    CooldownAfterLoss {
        last_loss_at: NaiveDateTime,
        candidate_at: NaiveDateTime,
    },
    DailyLossCap {
        losses_today: usize,
    },
    WeeklyConsecutiveLosses {
        run: usize,
    },
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleViolation::CooldownAfterLoss {
                last_loss_at,
                candidate_at,
            } => write!(
                f,
                "less than {LOSS_COOLDOWN_MINUTES} minutes since the last loss \
                 ({last_loss_at} -> {candidate_at})"
            ),
            RuleViolation::DailyLossCap { losses_today } => write!(
                f,
                "already {losses_today} losses today, the daily cap is {DAILY_LOSS_CAP}"
            ),
            RuleViolation::WeeklyConsecutiveLosses { run } => write!(
                f,
                "{run} consecutive losses this week, stop until next Monday \
                 (cap is {WEEKLY_CONSECUTIVE_LOSS_CAP})"
            ),
        }
    }
}

/// Evaluate the candidate against the ledger snapshot. Adjustment rows are
/// synthetic and invisible to every rule.
pub fn evaluate(ledger: &[TradeRecord], candidate: &CandidateTrade) -> Vec<RuleViolation> {
    let mut violations = Vec::new();
    let trades: Vec<&TradeRecord> = ledger.iter().filter(|r| r.outcome.is_trade()).collect();

    if let Some(v) = check_cooldown(&trades, candidate) {
        violations.push(v);
    }
    if let Some(v) = check_daily_cap(&trades, candidate) {
        violations.push(v);
    }
    if let Some(v) = check_weekly_streak(&trades, candidate) {
        violations.push(v);
    }
    violations
}

fn check_cooldown(trades: &[&TradeRecord], candidate: &CandidateTrade) -> Option<RuleViolation> {
    if candidate.outcome != Outcome::Loss {
        return None;
    }
    let last_loss_at = trades
        .iter()
        .filter(|r| r.outcome == Outcome::Loss)
        .map(|r| r.executed_at)
        .max()?;

    let candidate_at = candidate.executed_at();
    if candidate_at - last_loss_at < Duration::minutes(LOSS_COOLDOWN_MINUTES) {
        return Some(RuleViolation::CooldownAfterLoss {
            last_loss_at,
            candidate_at,
        });
    }
    None
}

fn check_daily_cap(trades: &[&TradeRecord], candidate: &CandidateTrade) -> Option<RuleViolation> {
    if candidate.outcome != Outcome::Loss {
        return None;
    }
    let losses_today = trades
        .iter()
        .filter(|r| r.outcome == Outcome::Loss && r.date() == candidate.date)
        .count();
    if losses_today >= DAILY_LOSS_CAP {
        return Some(RuleViolation::DailyLossCap { losses_today });
    }
    None
}

fn check_weekly_streak(
    trades: &[&TradeRecord],
    candidate: &CandidateTrade,
) -> Option<RuleViolation> {
    let week = candidate.executed_at().iso_week();

    let mut this_week: Vec<&&TradeRecord> = trades
        .iter()
        .filter(|r| {
            let w = r.executed_at.iso_week();
            w.year() == week.year() && w.week() == week.week()
        })
        .collect();
    this_week.sort_by_key(|r| r.executed_at);

    // Longest loss run over the week, with the candidate hypothetically
    // appended at the end. Recomputed from scratch per evaluation.
    let mut run = 0usize;
    let mut max_run = 0usize;
    for record in &this_week {
        if record.outcome == Outcome::Loss {
            run += 1;
            max_run = max_run.max(run);
        } else {
            run = 0;
        }
    }
    if candidate.outcome == Outcome::Loss {
        run += 1;
        max_run = max_run.max(run);
    }

    if max_run >= WEEKLY_CONSECUTIVE_LOSS_CAP {
        return Some(RuleViolation::WeeklyConsecutiveLosses { run: max_run });
    }
    None
}
