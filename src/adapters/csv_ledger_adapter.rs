//! CSV file ledger adapter.
//!
//! One file per journal. The column order is the wire contract; rows that
//! fail to parse stay in storage but are excluded from `read_all`, so the
//! adapter keeps its own parsed-position to storage-row mapping for updates
//! and deletes. Every store operation runs under a small bounded retry with
//! exponential backoff before surfacing a failure.

use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use crate::domain::error::JournalError;
use crate::domain::trade::{Direction, Outcome, SecondChance, TradeRecord};
use crate::ports::ledger_port::LedgerPort;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

pub const HEADER: [&str; 15] = [
    "date",
    "time",
    "symbol",
    "direction",
    "size",
    "outcome",
    "gross_pnl",
    "commission",
    "net_pnl",
    "r_multiple",
    "notes",
    "error_category",
    "resolved",
    "second_chance",
    "review_urls",
];

const MAX_ATTEMPTS: u32 = 3;
const RETRY_BASE_MS: u64 = 50;

pub struct CsvLedgerAdapter {
    path: PathBuf,
}

impl CsvLedgerAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn with_retry<T>(
        &self,
        mut op: impl FnMut() -> Result<T, JournalError>,
    ) -> Result<T, JournalError> {
        let mut delay = Duration::from_millis(RETRY_BASE_MS);
        let mut last = JournalError::Store {
            reason: "no attempt made".to_string(),
        };
        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                thread::sleep(delay);
                delay *= 2;
            }
            match op() {
                Ok(value) => return Ok(value),
                Err(e) => last = e,
            }
        }
        Err(last)
    }

    /// Raw storage rows, header excluded. Missing file reads as empty.
    fn read_raw(&self) -> Result<Vec<csv::StringRecord>, JournalError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| JournalError::Store {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());
        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| JournalError::Store {
                reason: format!("CSV parse error: {}", e),
            })?;
            rows.push(record);
        }
        Ok(rows)
    }

    fn write_raw(&self, rows: &[csv::StringRecord]) -> Result<(), JournalError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(HEADER)
            .map_err(|e| JournalError::Store {
                reason: format!("CSV write error: {}", e),
            })?;
        for row in rows {
            writer.write_record(row).map_err(|e| JournalError::Store {
                reason: format!("CSV write error: {}", e),
            })?;
        }
        let buffer = writer.into_inner().map_err(|e| JournalError::Store {
            reason: format!("CSV flush error: {}", e),
        })?;
        fs::write(&self.path, buffer).map_err(|e| JournalError::Store {
            reason: format!("failed to write {}: {}", self.path.display(), e),
        })?;
        Ok(())
    }

    /// Map the parsed position back to its storage row index.
    fn storage_row(
        rows: &[csv::StringRecord],
        position: usize,
    ) -> Result<usize, JournalError> {
        let mut parsed = 0usize;
        for (index, row) in rows.iter().enumerate() {
            if parse_row(row).is_some() {
                if parsed == position {
                    return Ok(index);
                }
                parsed += 1;
            }
        }
        Err(JournalError::RowOutOfRange {
            position,
            len: parsed,
        })
    }
}

fn parse_row(row: &csv::StringRecord) -> Option<TradeRecord> {
    let date = NaiveDate::parse_from_str(row.get(0)?, "%Y-%m-%d").ok()?;
    let time = NaiveTime::parse_from_str(row.get(1)?, "%H:%M:%S").ok()?;
    Some(TradeRecord {
        executed_at: NaiveDateTime::new(date, time),
        symbol: row.get(2)?.to_string(),
        direction: Direction::parse(row.get(3)?)?,
        size: row.get(4)?.parse().ok()?,
        outcome: Outcome::parse(row.get(5)?)?,
        gross_pnl: row.get(6)?.parse().ok()?,
        commission: row.get(7)?.parse().ok()?,
        net_pnl: row.get(8)?.parse().ok()?,
        r_multiple: row.get(9)?.parse().ok()?,
        notes: row.get(10)?.to_string(),
        error_category: row.get(11)?.to_string(),
        resolved: row.get(12)? == "Yes",
        second_chance: SecondChance::parse(row.get(13)?)?,
        review_urls: split_urls(row.get(14)?),
    })
}

fn split_urls(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn to_row(record: &TradeRecord) -> csv::StringRecord {
    csv::StringRecord::from(vec![
        record.executed_at.format("%Y-%m-%d").to_string(),
        record.executed_at.format("%H:%M:%S").to_string(),
        record.symbol.clone(),
        record.direction.as_str().to_string(),
        record.size.to_string(),
        record.outcome.as_str().to_string(),
        record.gross_pnl.to_string(),
        record.commission.to_string(),
        record.net_pnl.to_string(),
        record.r_multiple.to_string(),
        record.notes.clone(),
        record.error_category.clone(),
        if record.resolved { "Yes" } else { "No" }.to_string(),
        record.second_chance.as_str().to_string(),
        record.review_urls.join(","),
    ])
}

impl LedgerPort for CsvLedgerAdapter {
    fn read_all(&self) -> Result<Vec<TradeRecord>, JournalError> {
        let rows = self.with_retry(|| self.read_raw())?;
        Ok(rows.iter().filter_map(parse_row).collect())
    }

    fn append(&self, record: &TradeRecord) -> Result<(), JournalError> {
        self.with_retry(|| {
            let mut rows = self.read_raw()?;
            rows.push(to_row(record));
            self.write_raw(&rows)
        })
    }

    fn update_at(&self, position: usize, record: &TradeRecord) -> Result<(), JournalError> {
        let mut rows = self.with_retry(|| self.read_raw())?;
        let index = Self::storage_row(&rows, position)?;
        rows[index] = to_row(record);
        self.with_retry(|| self.write_raw(&rows))
    }

    fn delete_at(&self, position: usize) -> Result<(), JournalError> {
        let mut rows = self.with_retry(|| self.read_raw())?;
        let index = Self::storage_row(&rows, position)?;
        rows.remove(index);
        self.with_retry(|| self.write_raw(&rows))
    }
}
