//! Conversion between account-currency P&L and risk units (R multiples).
//!
//! 1R is the fixed amount risked per trade: `account_size * risk_pct`.
//! Results are rounded to two decimals at this boundary only; aggregate
//! sums work on unrounded values and apply their own final rounding.

/// Round to two decimal places for presentation.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// The fixed amount risked per trade, in account currency.
pub fn risk_amount(account_size: f64, risk_pct: f64) -> f64 {
    account_size * risk_pct
}

/// Express a net P&L as a multiple of the per-trade risk amount.
///
/// Returns 0.0 when the risk amount is zero so callers never see a
/// division by zero.
pub fn to_r(net_pnl: f64, account_size: f64, risk_pct: f64) -> f64 {
    let risk = risk_amount(account_size, risk_pct);
    if risk == 0.0 {
        return 0.0;
    }
    round2(net_pnl / risk)
}
