#![allow(dead_code)]

use std::cell::RefCell;

use quantjournal::domain::account::AccountConfig;
use quantjournal::domain::error::JournalError;
use quantjournal::domain::trade::{CandidateTrade, TradeRecord};
use quantjournal::ports::ledger_port::LedgerPort;

/// In-memory ledger store for exercising the core without touching disk.
pub struct MockLedgerPort {
    pub rows: RefCell<Vec<TradeRecord>>,
    pub fail_reads: RefCell<bool>,
}

impl MockLedgerPort {
    pub fn new() -> Self {
        Self {
            rows: RefCell::new(Vec::new()),
            fail_reads: RefCell::new(false),
        }
    }

    pub fn with_rows(rows: Vec<TradeRecord>) -> Self {
        Self {
            rows: RefCell::new(rows),
            fail_reads: RefCell::new(false),
        }
    }
}

impl LedgerPort for MockLedgerPort {
    fn read_all(&self) -> Result<Vec<TradeRecord>, JournalError> {
        if *self.fail_reads.borrow() {
            return Err(JournalError::Store {
                reason: "simulated outage".to_string(),
            });
        }
        Ok(self.rows.borrow().clone())
    }

    fn append(&self, record: &TradeRecord) -> Result<(), JournalError> {
        self.rows.borrow_mut().push(record.clone());
        Ok(())
    }

    fn update_at(&self, position: usize, record: &TradeRecord) -> Result<(), JournalError> {
        let mut rows = self.rows.borrow_mut();
        let len = rows.len();
        let slot = rows
            .get_mut(position)
            .ok_or(JournalError::RowOutOfRange { position, len })?;
        *slot = record.clone();
        Ok(())
    }

    fn delete_at(&self, position: usize) -> Result<(), JournalError> {
        let mut rows = self.rows.borrow_mut();
        if position >= rows.len() {
            return Err(JournalError::RowOutOfRange {
                position,
                len: rows.len(),
            });
        }
        rows.remove(position);
        Ok(())
    }
}

pub fn account() -> AccountConfig {
    AccountConfig::default()
}

pub fn candidate(date: &str, time: &str, outcome: &str, gross: f64) -> CandidateTrade {
    CandidateTrade::parse(date, time, "EURUSD", "Long", 1.0, gross, outcome).unwrap()
}

/// A finalized 1-lot trade whose net P&L equals `net` exactly
/// (gross is padded by the 4.0/lot commission; BE nets -4.0 regardless).
pub fn trade(date: &str, time: &str, outcome: &str, net: f64) -> TradeRecord {
    let gross = if outcome == "BE" { 0.0 } else { net + 4.0 };
    candidate(date, time, outcome, gross).finalize(&account())
}
