//! Ledger trade model: outcomes, candidate submissions and derived fields.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::account::AccountConfig;
use super::error::JournalError;
use super::risk;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "Long",
            Direction::Short => "Short",
        }
    }

    pub fn parse(value: &str) -> Option<Direction> {
        match value {
            "Long" => Some(Direction::Long),
            "Short" => Some(Direction::Short),
            _ => None,
        }
    }
}

/// Classification of a ledger row. `Adjustment` marks a synthetic row that
/// reconciles computed equity against an external balance; it carries only a
/// net P&L delta and never enters win/loss statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    BreakEven,
    Adjustment,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Win => "Win",
            Outcome::Loss => "Loss",
            Outcome::BreakEven => "BE",
            Outcome::Adjustment => "Adjustment",
        }
    }

    pub fn parse(value: &str) -> Option<Outcome> {
        match value {
            "Win" => Some(Outcome::Win),
            "Loss" => Some(Outcome::Loss),
            "BE" => Some(Outcome::BreakEven),
            "Adjustment" => Some(Outcome::Adjustment),
            _ => None,
        }
    }

    /// True for rows that represent an actual trade.
    pub fn is_trade(&self) -> bool {
        !matches!(self, Outcome::Adjustment)
    }
}

/// Discretionary "would the same setup have been worth a second entry" tag.
/// Meaningful only for Loss rows; everything else stays `NotApplicable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecondChance {
    Yes,
    No,
    #[default]
    NotApplicable,
}

impl SecondChance {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecondChance::Yes => "Yes",
            SecondChance::No => "No",
            SecondChance::NotApplicable => "",
        }
    }

    pub fn parse(value: &str) -> Option<SecondChance> {
        match value {
            "Yes" => Some(SecondChance::Yes),
            "No" => Some(SecondChance::No),
            "" => Some(SecondChance::NotApplicable),
            _ => None,
        }
    }
}

/// One row of the ledger. Identity fields (timestamp, symbol, direction) are
/// set at submission and never change; derived fields (commission, net, R)
/// are re-computed by [`rederive`] whenever size, gross P&L or outcome move.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub executed_at: NaiveDateTime,
    pub symbol: String,
    pub direction: Direction,
    pub size: f64,
    pub outcome: Outcome,
    pub gross_pnl: f64,
    pub commission: f64,
    pub net_pnl: f64,
    pub r_multiple: f64,
    pub notes: String,
    pub error_category: String,
    pub resolved: bool,
    pub second_chance: SecondChance,
    pub review_urls: Vec<String>,
}

impl TradeRecord {
    pub fn date(&self) -> NaiveDate {
        self.executed_at.date()
    }

    /// Synthetic row reconciling ledger equity against an external statement.
    /// Carries only the net delta: zero size, zero commission.
    pub fn adjustment(
        executed_at: NaiveDateTime,
        delta: f64,
        notes: &str,
        config: &AccountConfig,
    ) -> TradeRecord {
        TradeRecord {
            executed_at,
            symbol: String::new(),
            direction: Direction::Long,
            size: 0.0,
            outcome: Outcome::Adjustment,
            gross_pnl: delta,
            commission: 0.0,
            net_pnl: delta,
            r_multiple: risk::to_r(delta, config.account_size, config.risk_pct),
            notes: notes.to_string(),
            error_category: String::new(),
            resolved: false,
            second_chance: SecondChance::NotApplicable,
            review_urls: Vec::new(),
        }
    }
}

/// A trade as submitted, before derived fields exist. Construction goes
/// through [`CandidateTrade::parse`] so the engine never sees malformed
/// input.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateTrade {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub symbol: String,
    pub direction: Direction,
    pub size: f64,
    pub gross_pnl: f64,
    pub outcome: Outcome,
}

impl CandidateTrade {
    /// Validate raw submission fields. Rejects unparseable date/time,
    /// negative size, unknown direction/outcome and synthetic outcomes.
    pub fn parse(
        date: &str,
        time: &str,
        symbol: &str,
        direction: &str,
        size: f64,
        gross_pnl: f64,
        outcome: &str,
    ) -> Result<CandidateTrade, JournalError> {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
            JournalError::InvalidCandidate {
                reason: format!("invalid date {date:?}, expected YYYY-MM-DD"),
            }
        })?;
        let time = NaiveTime::parse_from_str(time, "%H:%M:%S").map_err(|_| {
            JournalError::InvalidCandidate {
                reason: format!("invalid time {time:?}, expected HH:MM:SS"),
            }
        })?;
        if symbol.trim().is_empty() {
            return Err(JournalError::InvalidCandidate {
                reason: "symbol must not be empty".to_string(),
            });
        }
        let direction =
            Direction::parse(direction).ok_or_else(|| JournalError::InvalidCandidate {
                reason: format!("invalid direction {direction:?}, expected Long or Short"),
            })?;
        if !size.is_finite() || size < 0.0 {
            return Err(JournalError::InvalidCandidate {
                reason: format!("size must be a non-negative number, got {size}"),
            });
        }
        if !gross_pnl.is_finite() {
            return Err(JournalError::InvalidCandidate {
                reason: format!("gross P&L must be finite, got {gross_pnl}"),
            });
        }
        let outcome = Outcome::parse(outcome)
            .filter(|o| o.is_trade())
            .ok_or_else(|| JournalError::InvalidCandidate {
                reason: format!("invalid outcome {outcome:?}, expected Win, Loss or BE"),
            })?;

        Ok(CandidateTrade {
            date,
            time,
            symbol: symbol.trim().to_string(),
            direction,
            size,
            gross_pnl,
            outcome,
        })
    }

    pub fn executed_at(&self) -> NaiveDateTime {
        NaiveDateTime::new(self.date, self.time)
    }

    /// Produce the committed ledger row: derive commission, net P&L and R.
    ///
    /// BreakEven forces gross to zero so the trade nets exactly minus the
    /// commission. That is a rule of the journal, not a data error.
    pub fn finalize(&self, config: &AccountConfig) -> TradeRecord {
        let mut record = TradeRecord {
            executed_at: self.executed_at(),
            symbol: self.symbol.clone(),
            direction: self.direction,
            size: self.size,
            outcome: self.outcome,
            gross_pnl: self.gross_pnl,
            commission: 0.0,
            net_pnl: 0.0,
            r_multiple: 0.0,
            notes: String::new(),
            error_category: String::new(),
            resolved: false,
            second_chance: SecondChance::NotApplicable,
            review_urls: Vec::new(),
        };
        rederive(&mut record, config);
        record
    }
}

/// Recompute commission, net P&L and R from size, gross P&L and outcome.
/// Adjustment rows keep their delta untouched apart from R.
pub fn rederive(record: &mut TradeRecord, config: &AccountConfig) {
    if record.outcome == Outcome::Adjustment {
        record.size = 0.0;
        record.commission = 0.0;
        record.net_pnl = record.gross_pnl;
    } else {
        record.commission = record.size * config.commission_per_lot;
        if record.outcome == Outcome::BreakEven {
            record.gross_pnl = 0.0;
        }
        record.net_pnl = record.gross_pnl - record.commission;
    }
    record.r_multiple = risk::to_r(record.net_pnl, config.account_size, config.risk_pct);
}
