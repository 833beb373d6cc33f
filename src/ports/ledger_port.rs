//! Ledger store port trait.
//!
//! `position` is always the record's 0-based offset in `read_all`'s result;
//! the adapter owns the mapping to whatever the storage rows are. The core
//! treats every operation as atomic at the row level and re-reads the full
//! ledger after each mutation.

use crate::domain::error::JournalError;
use crate::domain::trade::TradeRecord;

pub trait LedgerPort {
    /// All parseable records in storage order. Rows whose timestamp cannot
    /// be derived are excluded rather than failing the whole read.
    fn read_all(&self) -> Result<Vec<TradeRecord>, JournalError>;

    fn append(&self, record: &TradeRecord) -> Result<(), JournalError>;

    fn update_at(&self, position: usize, record: &TradeRecord) -> Result<(), JournalError>;

    /// Remove the record and rewrite the store. No tombstones.
    fn delete_at(&self, position: usize) -> Result<(), JournalError>;
}
