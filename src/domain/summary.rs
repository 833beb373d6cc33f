//! Periodic and categorical breakdowns of the ledger.
//!
//! Buckets are keyed by tag strings that sort chronologically
//! (`2024-W05`, `2024-01`, `2024-01-05`), so a `BTreeMap` gives the
//! display order for free. Adjustment rows are not trades and stay out.

use chrono::{Datelike, Timelike};
use std::collections::BTreeMap;

use super::account::AccountConfig;
use super::risk::round2;
use super::trade::{Outcome, TradeRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct PeriodSummary {
    pub tag: String,
    pub trades: usize,
    pub net_pnl: f64,
    pub volume: f64,
}

pub fn week_tag(record: &TradeRecord) -> String {
    let week = record.executed_at.iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}

pub fn month_tag(record: &TradeRecord) -> String {
    record.executed_at.format("%Y-%m").to_string()
}

pub fn day_tag(record: &TradeRecord) -> String {
    record.executed_at.format("%Y-%m-%d").to_string()
}

pub fn weekly_summary(ledger: &[TradeRecord]) -> Vec<PeriodSummary> {
    group_by_tag(ledger, week_tag)
}

pub fn monthly_summary(ledger: &[TradeRecord]) -> Vec<PeriodSummary> {
    group_by_tag(ledger, month_tag)
}

pub fn daily_summary(ledger: &[TradeRecord]) -> Vec<PeriodSummary> {
    group_by_tag(ledger, day_tag)
}

fn group_by_tag(
    ledger: &[TradeRecord],
    tag: impl Fn(&TradeRecord) -> String,
) -> Vec<PeriodSummary> {
    let mut buckets: BTreeMap<String, PeriodSummary> = BTreeMap::new();
    for record in ledger.iter().filter(|r| r.outcome.is_trade()) {
        let entry = buckets
            .entry(tag(record))
            .or_insert_with_key(|key| PeriodSummary {
                tag: key.clone(),
                trades: 0,
                net_pnl: 0.0,
                volume: 0.0,
            });
        entry.trades += 1;
        entry.net_pnl += record.net_pnl;
        entry.volume += record.size;
    }
    buckets.into_values().collect()
}

/// Net P&L per instrument symbol, alphabetical.
pub fn net_by_symbol(ledger: &[TradeRecord]) -> Vec<(String, f64)> {
    let mut buckets: BTreeMap<String, f64> = BTreeMap::new();
    for record in ledger.iter().filter(|r| r.outcome.is_trade()) {
        *buckets.entry(record.symbol.clone()).or_insert(0.0) += record.net_pnl;
    }
    buckets.into_iter().collect()
}

/// Net P&L per hour of day (0-23).
pub fn net_by_hour(ledger: &[TradeRecord]) -> Vec<(u32, f64)> {
    let mut buckets: BTreeMap<u32, f64> = BTreeMap::new();
    for record in ledger.iter().filter(|r| r.outcome.is_trade()) {
        *buckets.entry(record.executed_at.hour()).or_insert(0.0) += record.net_pnl;
    }
    buckets.into_iter().collect()
}

/// Total loss per error category, Loss rows only. Uncategorized losses
/// land under the empty string.
pub fn losses_by_category(ledger: &[TradeRecord]) -> Vec<(String, f64)> {
    let mut buckets: BTreeMap<String, f64> = BTreeMap::new();
    for record in ledger
        .iter()
        .filter(|r| r.outcome == Outcome::Loss && r.net_pnl < 0.0)
    {
        *buckets.entry(record.error_category.clone()).or_insert(0.0) += record.net_pnl;
    }
    buckets.into_iter().collect()
}

/// Daily net returns as a fraction of account size, in date order.
pub fn daily_returns(ledger: &[TradeRecord], config: &AccountConfig) -> Vec<f64> {
    if config.account_size == 0.0 {
        return Vec::new();
    }
    daily_summary(ledger)
        .iter()
        .map(|day| day.net_pnl / config.account_size)
        .collect()
}

/// Sharpe ratio over daily returns with sample standard deviation (n-1).
/// Returns 0 when the deviation is 0 or fewer than two observations exist.
pub fn sharpe_ratio(returns: &[f64], risk_free: f64) -> f64 {
    let std = sample_stddev(returns);
    if std == 0.0 {
        return 0.0;
    }
    round2((mean(returns) - risk_free) / std)
}

/// Sortino ratio: like Sharpe but deviation is taken over negative daily
/// returns only.
pub fn sortino_ratio(returns: &[f64], risk_free: f64) -> f64 {
    let downside: Vec<f64> = returns.iter().copied().filter(|&r| r < 0.0).collect();
    let std = sample_stddev(&downside);
    if std == 0.0 {
        return 0.0;
    }
    round2((mean(returns) - risk_free) / std)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
