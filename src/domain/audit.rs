//! Ledger integrity audit.
//!
//! The audit only reports; it never mutates what it reads. Repair is a
//! separate, explicitly invoked operation.

use std::fmt;

use super::account::AccountConfig;
use super::trade::{self, Outcome, TradeRecord};

/// Monetary comparisons tolerate half a cent of float noise.
pub const TOLERANCE: f64 = 0.005;

#[derive(Debug, Clone, PartialEq)]
pub enum AuditReason {
    CommissionMismatch { expected: f64, actual: f64 },
    NetMismatch { expected: f64, actual: f64 },
    BreakEvenInvariant { gross: f64, net: f64 },
}

impl fmt::Display for AuditReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditReason::CommissionMismatch { expected, actual } => {
                write!(f, "commission {actual} != size * rate ({expected})")
            }
            AuditReason::NetMismatch { expected, actual } => {
                write!(f, "net {actual} != gross - commission ({expected})")
            }
            AuditReason::BreakEvenInvariant { gross, net } => {
                write!(
                    f,
                    "break-even row must have gross 0 and net = -commission, \
                     got gross {gross}, net {net}"
                )
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuditFinding {
    /// 0-based offset in the ledger as read.
    pub position: usize,
    pub reason: AuditReason,
}

/// Check every non-Adjustment row's derived fields against its inputs.
pub fn audit(ledger: &[TradeRecord], config: &AccountConfig) -> Vec<AuditFinding> {
    let mut findings = Vec::new();
    for (position, record) in ledger.iter().enumerate() {
        if record.outcome == Outcome::Adjustment {
            continue;
        }

        let expected_commission = record.size * config.commission_per_lot;
        if (record.commission - expected_commission).abs() > TOLERANCE {
            findings.push(AuditFinding {
                position,
                reason: AuditReason::CommissionMismatch {
                    expected: expected_commission,
                    actual: record.commission,
                },
            });
        }

        let expected_net = record.gross_pnl - record.commission;
        if (record.net_pnl - expected_net).abs() > TOLERANCE {
            findings.push(AuditFinding {
                position,
                reason: AuditReason::NetMismatch {
                    expected: expected_net,
                    actual: record.net_pnl,
                },
            });
        }

        if record.outcome == Outcome::BreakEven
            && (record.gross_pnl.abs() > TOLERANCE
                || (record.net_pnl + record.commission).abs() > TOLERANCE)
        {
            findings.push(AuditFinding {
                position,
                reason: AuditReason::BreakEvenInvariant {
                    gross: record.gross_pnl,
                    net: record.net_pnl,
                },
            });
        }
    }
    findings
}

/// Re-derive commission, net and R from size, gross and outcome. The
/// explicit counterpart to [`audit`]: reading never corrects, this does.
pub fn repair(record: &TradeRecord, config: &AccountConfig) -> TradeRecord {
    let mut repaired = record.clone();
    trade::rederive(&mut repaired, config);
    repaired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trade::CandidateTrade;

    fn config() -> AccountConfig {
        AccountConfig::default()
    }

    fn clean_trade(outcome: &str, gross: f64) -> TradeRecord {
        CandidateTrade::parse("2024-01-05", "10:00:00", "EURUSD", "Long", 1.0, gross, outcome)
            .unwrap()
            .finalize(&config())
    }

    #[test]
    fn clean_ledger_has_no_findings() {
        let ledger = vec![
            clean_trade("Win", 154.0),
            clean_trade("Loss", -146.0),
            clean_trade("BE", 42.0),
        ];
        assert!(audit(&ledger, &config()).is_empty());
    }

    #[test]
    fn detects_net_mismatch() {
        let mut record = clean_trade("Win", 154.0);
        record.net_pnl += 10.0;
        let findings = audit(&[record], &config());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].position, 0);
        assert!(matches!(
            findings[0].reason,
            AuditReason::NetMismatch { .. }
        ));
    }

    #[test]
    fn detects_commission_mismatch() {
        let mut record = clean_trade("Win", 154.0);
        record.commission = 0.0;
        let findings = audit(&[record], &config());
        assert!(findings
            .iter()
            .any(|f| matches!(f.reason, AuditReason::CommissionMismatch { .. })));
    }

    #[test]
    fn detects_breakeven_violation() {
        let mut record = clean_trade("BE", 0.0);
        record.gross_pnl = 25.0;
        record.net_pnl = record.gross_pnl - record.commission;
        let findings = audit(&[record], &config());
        assert!(findings
            .iter()
            .any(|f| matches!(f.reason, AuditReason::BreakEvenInvariant { .. })));
    }

    #[test]
    fn reports_position_of_offending_row() {
        let mut bad = clean_trade("Loss", -146.0);
        bad.net_pnl = 999.0;
        let ledger = vec![clean_trade("Win", 154.0), bad];
        let findings = audit(&ledger, &config());
        assert_eq!(findings[0].position, 1);
    }

    #[test]
    fn skips_adjustment_rows() {
        let at = chrono::NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(22, 0, 0)
            .unwrap();
        let row = TradeRecord::adjustment(at, -100.0, "", &config());
        assert!(audit(&[row], &config()).is_empty());
    }

    #[test]
    fn audit_does_not_mutate() {
        let mut record = clean_trade("Win", 154.0);
        record.net_pnl = 0.0;
        let before = record.clone();
        let _ = audit(std::slice::from_ref(&record), &config());
        assert_eq!(record, before);
    }

    #[test]
    fn repair_rederives_fields() {
        let mut record = clean_trade("Win", 154.0);
        record.net_pnl = 0.0;
        record.commission = 99.0;
        let fixed = repair(&record, &config());
        assert!((fixed.commission - 4.0).abs() < f64::EPSILON);
        assert!((fixed.net_pnl - 150.0).abs() < f64::EPSILON);
        assert!((fixed.r_multiple - 1.0).abs() < f64::EPSILON);
        assert!(audit(&[fixed], &config()).is_empty());
    }

    #[test]
    fn repair_enforces_breakeven_forcing() {
        let mut record = clean_trade("BE", 0.0);
        record.gross_pnl = 80.0;
        record.net_pnl = 76.0;
        let fixed = repair(&record, &config());
        assert!((fixed.gross_pnl - 0.0).abs() < f64::EPSILON);
        assert!((fixed.net_pnl - (-4.0)).abs() < f64::EPSILON);
    }
}
