//! CLI definition and dispatch.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_ledger_adapter::CsvLedgerAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::account::{load_account_config, AccountConfig};
use crate::domain::audit;
use crate::domain::error::JournalError;
use crate::domain::metrics::MetricsSnapshot;
use crate::domain::rules;
use crate::domain::summary;
use crate::domain::trade::{self, CandidateTrade, Outcome, SecondChance, TradeRecord};
use crate::ports::ledger_port::LedgerPort;

#[derive(Parser, Debug)]
#[command(name = "quantjournal", about = "Discretionary trading journal")]
pub struct Cli {
    /// Ledger CSV file
    #[arg(short, long, global = true, default_value = "journal.csv")]
    pub ledger: PathBuf,

    /// INI config file with an [account] section
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record a trade (rule check is advisory, never blocks)
    Add {
        #[arg(long)]
        date: String,
        #[arg(long)]
        time: String,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        direction: String,
        #[arg(long)]
        size: f64,
        /// Gross P&L before commission
        #[arg(long)]
        gross: f64,
        /// Win, Loss or BE
        #[arg(long)]
        outcome: String,
        #[arg(long, default_value = "")]
        notes: String,
        #[arg(long, default_value = "")]
        error_category: String,
        #[arg(long)]
        resolved: bool,
        /// Yes or No; only meaningful for losses
        #[arg(long)]
        second_chance: Option<String>,
        #[arg(long = "review-url")]
        review_urls: Vec<String>,
    },
    /// Evaluate the trading rules for a candidate without committing it
    Check {
        #[arg(long)]
        date: String,
        #[arg(long)]
        time: String,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        direction: String,
        #[arg(long)]
        size: f64,
        #[arg(long)]
        gross: f64,
        #[arg(long)]
        outcome: String,
    },
    /// Print the performance snapshot
    Metrics,
    /// Print grouped breakdowns of the ledger
    Summary {
        #[arg(long, value_enum, default_value_t = Grouping::Weekly)]
        by: Grouping,
    },
    /// Check ledger integrity; exits non-zero when findings exist
    Audit,
    /// Re-derive commission/net/R for every row flagged by the audit
    Repair,
    /// Edit a row by its 0-based position, re-deriving dependent fields
    Edit {
        position: usize,
        #[arg(long)]
        size: Option<f64>,
        #[arg(long)]
        gross: Option<f64>,
        #[arg(long)]
        outcome: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        error_category: Option<String>,
        #[arg(long)]
        resolved: Option<bool>,
        #[arg(long)]
        second_chance: Option<String>,
    },
    /// Delete a row by its 0-based position (full rewrite, no tombstones)
    Delete { position: usize },
    /// Append a balance adjustment reconciling equity to a broker statement
    Adjust {
        #[arg(long)]
        date: String,
        #[arg(long)]
        time: String,
        /// Net P&L delta in account currency
        #[arg(long)]
        delta: f64,
        #[arg(long, default_value = "")]
        notes: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Grouping {
    Daily,
    Weekly,
    Monthly,
    Symbol,
    Hour,
    Category,
}

pub fn run(cli: Cli) -> ExitCode {
    let account = match load_account(cli.config.as_ref()) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let store = CsvLedgerAdapter::new(cli.ledger);

    match cli.command {
        Command::Add {
            date,
            time,
            symbol,
            direction,
            size,
            gross,
            outcome,
            notes,
            error_category,
            resolved,
            second_chance,
            review_urls,
        } => run_add(
            &store,
            &account,
            &date,
            &time,
            &symbol,
            &direction,
            size,
            gross,
            &outcome,
            notes,
            error_category,
            resolved,
            second_chance.as_deref(),
            review_urls,
        ),
        Command::Check {
            date,
            time,
            symbol,
            direction,
            size,
            gross,
            outcome,
        } => run_check(
            &store, &date, &time, &symbol, &direction, size, gross, &outcome,
        ),
        Command::Metrics => run_metrics(&store, &account),
        Command::Summary { by } => run_summary(&store, &account, by),
        Command::Audit => run_audit(&store, &account),
        Command::Repair => run_repair(&store, &account),
        Command::Edit {
            position,
            size,
            gross,
            outcome,
            notes,
            error_category,
            resolved,
            second_chance,
        } => run_edit(
            &store,
            &account,
            position,
            size,
            gross,
            outcome.as_deref(),
            notes,
            error_category,
            resolved,
            second_chance.as_deref(),
        ),
        Command::Delete { position } => run_delete(&store, position),
        Command::Adjust {
            date,
            time,
            delta,
            notes,
        } => run_adjust(&store, &account, &date, &time, delta, &notes),
    }
}

fn load_account(path: Option<&PathBuf>) -> Result<AccountConfig, ExitCode> {
    let Some(path) = path else {
        return Ok(AccountConfig::default());
    };
    let adapter = FileConfigAdapter::from_file(path).map_err(|e| {
        fail(&JournalError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        })
    })?;
    load_account_config(&adapter).map_err(|e| fail(&e))
}

fn fail(err: &JournalError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(err)
}

#[allow(clippy::too_many_arguments)]
fn run_add(
    store: &dyn LedgerPort,
    account: &AccountConfig,
    date: &str,
    time: &str,
    symbol: &str,
    direction: &str,
    size: f64,
    gross: f64,
    outcome: &str,
    notes: String,
    error_category: String,
    resolved: bool,
    second_chance: Option<&str>,
    review_urls: Vec<String>,
) -> ExitCode {
    let candidate =
        match CandidateTrade::parse(date, time, symbol, direction, size, gross, outcome) {
            Ok(c) => c,
            Err(e) => return fail(&e),
        };
    let second_chance = match parse_second_chance(second_chance) {
        Ok(tag) => tag,
        Err(e) => return fail(&e),
    };

    let ledger = match store.read_all() {
        Ok(l) => l,
        Err(e) => return fail(&e),
    };

    let violations = rules::evaluate(&ledger, &candidate);
    for violation in &violations {
        eprintln!("rule violation: {violation}");
    }

    let mut record = candidate.finalize(account);
    record.notes = notes;
    record.error_category = error_category;
    record.resolved = resolved;
    record.second_chance = second_chance;
    record.review_urls = review_urls;

    if let Err(e) = store.append(&record) {
        return fail(&e);
    }
    eprintln!(
        "recorded {} {} {} for {:+.2} net ({:+.2}R)",
        record.executed_at, record.symbol, record.outcome.as_str(), record.net_pnl, record.r_multiple
    );

    match store.read_all() {
        Ok(ledger) => {
            print_metrics(&MetricsSnapshot::compute(&ledger, account), account);
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_check(
    store: &dyn LedgerPort,
    date: &str,
    time: &str,
    symbol: &str,
    direction: &str,
    size: f64,
    gross: f64,
    outcome: &str,
) -> ExitCode {
    let candidate =
        match CandidateTrade::parse(date, time, symbol, direction, size, gross, outcome) {
            Ok(c) => c,
            Err(e) => return fail(&e),
        };
    let ledger = match store.read_all() {
        Ok(l) => l,
        Err(e) => return fail(&e),
    };
    let violations = rules::evaluate(&ledger, &candidate);
    if violations.is_empty() {
        println!("no rule violations");
    } else {
        for violation in &violations {
            println!("rule violation: {violation}");
        }
    }
    ExitCode::SUCCESS
}

fn run_metrics(store: &dyn LedgerPort, account: &AccountConfig) -> ExitCode {
    match store.read_all() {
        Ok(ledger) => {
            print_metrics(&MetricsSnapshot::compute(&ledger, account), account);
            let returns = summary::daily_returns(&ledger, account);
            println!("sharpe (daily):      {:.2}", summary::sharpe_ratio(&returns, 0.0));
            println!("sortino (daily):     {:.2}", summary::sortino_ratio(&returns, 0.0));
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn print_metrics(snapshot: &MetricsSnapshot, account: &AccountConfig) {
    println!("trades:              {} ({} W / {} L / {} BE)",
        snapshot.total_trades, snapshot.wins, snapshot.losses, snapshot.break_evens);
    println!("win rate:            {:.2}%", snapshot.win_rate);
    println!("net profit:          {:+.2}", snapshot.net_profit);
    println!("gross profit/loss:   {:+.2} / {:+.2}", snapshot.gross_profit, snapshot.gross_loss);
    println!("profit factor:       {:.2}", snapshot.profit_factor);
    println!("payoff ratio:        {:.2}", snapshot.payoff_ratio);
    println!("expectancy:          {:+.2}", snapshot.expectancy);
    println!("best / worst:        {:+.2} / {:+.2}", snapshot.best_trade, snapshot.worst_trade);
    println!("equity:              {:.2}", snapshot.current_equity);
    println!("max drawdown:        {:.2}", snapshot.max_drawdown);
    println!("streaks:             {} wins / {} losses",
        snapshot.max_consecutive_wins, snapshot.max_consecutive_losses);
    println!("total R:             {:+.2}", snapshot.total_r);
    for phase in &snapshot.phase_progress {
        let ratios: Vec<String> = phase
            .trades_needed
            .iter()
            .map(|t| format!("1:{} -> {}", t.reward_ratio, t.trades))
            .collect();
        println!(
            "target x{:.2} ({:.0}): {:.2}R away, trades {}",
            phase.multiplier,
            phase.target_equity,
            phase.r_to_target,
            ratios.join(", ")
        );
    }
    println!(
        "to drawdown floor:   {} full-R losses (floor {:.0})",
        snapshot.trades_to_floor,
        account.floor_equity()
    );
}

fn run_summary(store: &dyn LedgerPort, account: &AccountConfig, by: Grouping) -> ExitCode {
    let ledger = match store.read_all() {
        Ok(l) => l,
        Err(e) => return fail(&e),
    };
    match by {
        Grouping::Daily | Grouping::Weekly | Grouping::Monthly => {
            let buckets = match by {
                Grouping::Daily => summary::daily_summary(&ledger),
                Grouping::Weekly => summary::weekly_summary(&ledger),
                _ => summary::monthly_summary(&ledger),
            };
            println!("{:<12} {:>7} {:>12} {:>8}", "period", "trades", "net", "volume");
            for bucket in buckets {
                println!(
                    "{:<12} {:>7} {:>12.2} {:>8.2}",
                    bucket.tag, bucket.trades, bucket.net_pnl, bucket.volume
                );
            }
        }
        Grouping::Symbol => {
            for (symbol, net) in summary::net_by_symbol(&ledger) {
                println!("{symbol:<12} {net:>12.2}");
            }
        }
        Grouping::Hour => {
            for (hour, net) in summary::net_by_hour(&ledger) {
                println!("{hour:>2}:00 {net:>12.2}");
            }
        }
        Grouping::Category => {
            for (category, loss) in summary::losses_by_category(&ledger) {
                let label = if category.is_empty() {
                    "(uncategorized)"
                } else {
                    category.as_str()
                };
                println!("{label:<20} {loss:>12.2}");
            }
        }
    }
    let returns = summary::daily_returns(&ledger, account);
    println!("sharpe {:.2} / sortino {:.2}",
        summary::sharpe_ratio(&returns, 0.0),
        summary::sortino_ratio(&returns, 0.0));
    ExitCode::SUCCESS
}

fn run_audit(store: &dyn LedgerPort, account: &AccountConfig) -> ExitCode {
    let ledger = match store.read_all() {
        Ok(l) => l,
        Err(e) => return fail(&e),
    };
    let findings = audit::audit(&ledger, account);
    if findings.is_empty() {
        println!("ledger clean: {} rows audited", ledger.len());
        return ExitCode::SUCCESS;
    }
    for finding in &findings {
        println!("row {}: {}", finding.position, finding.reason);
    }
    eprintln!("{} integrity finding(s)", findings.len());
    ExitCode::from(6)
}

fn run_repair(store: &dyn LedgerPort, account: &AccountConfig) -> ExitCode {
    let ledger = match store.read_all() {
        Ok(l) => l,
        Err(e) => return fail(&e),
    };
    let findings = audit::audit(&ledger, account);
    // A row can carry several findings; repair it once.
    let mut positions: Vec<usize> = findings.iter().map(|f| f.position).collect();
    positions.dedup();
    let mut repaired = 0usize;
    for position in positions {
        let fixed = audit::repair(&ledger[position], account);
        if fixed != ledger[position] {
            if let Err(e) = store.update_at(position, &fixed) {
                return fail(&e);
            }
            repaired += 1;
        }
    }
    eprintln!("repaired {repaired} row(s)");
    ExitCode::SUCCESS
}

#[allow(clippy::too_many_arguments)]
fn run_edit(
    store: &dyn LedgerPort,
    account: &AccountConfig,
    position: usize,
    size: Option<f64>,
    gross: Option<f64>,
    outcome: Option<&str>,
    notes: Option<String>,
    error_category: Option<String>,
    resolved: Option<bool>,
    second_chance: Option<&str>,
) -> ExitCode {
    let ledger = match store.read_all() {
        Ok(l) => l,
        Err(e) => return fail(&e),
    };
    let Some(record) = ledger.get(position) else {
        return fail(&JournalError::RowOutOfRange {
            position,
            len: ledger.len(),
        });
    };
    let mut record = record.clone();

    if let Some(size) = size {
        if !size.is_finite() || size < 0.0 {
            return fail(&JournalError::InvalidCandidate {
                reason: format!("size must be a non-negative number, got {size}"),
            });
        }
        record.size = size;
    }
    if let Some(gross) = gross {
        record.gross_pnl = gross;
    }
    if let Some(raw) = outcome {
        match Outcome::parse(raw).filter(|o| o.is_trade()) {
            Some(outcome) => record.outcome = outcome,
            None => {
                return fail(&JournalError::InvalidCandidate {
                    reason: format!("invalid outcome {raw:?}, expected Win, Loss or BE"),
                })
            }
        }
    }
    if let Some(notes) = notes {
        record.notes = notes;
    }
    if let Some(category) = error_category {
        record.error_category = category;
    }
    if let Some(resolved) = resolved {
        record.resolved = resolved;
    }
    if second_chance.is_some() {
        match parse_second_chance(second_chance) {
            Ok(tag) => record.second_chance = tag,
            Err(e) => return fail(&e),
        }
    }

    trade::rederive(&mut record, account);
    match store.update_at(position, &record) {
        Ok(()) => {
            eprintln!("row {position} updated");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_delete(store: &dyn LedgerPort, position: usize) -> ExitCode {
    match store.delete_at(position) {
        Ok(()) => {
            eprintln!("row {position} deleted");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_adjust(
    store: &dyn LedgerPort,
    account: &AccountConfig,
    date: &str,
    time: &str,
    delta: f64,
    notes: &str,
) -> ExitCode {
    let date = match chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => d,
        Err(_) => {
            return fail(&JournalError::InvalidCandidate {
                reason: format!("invalid date {date:?}, expected YYYY-MM-DD"),
            })
        }
    };
    let time = match chrono::NaiveTime::parse_from_str(time, "%H:%M:%S") {
        Ok(t) => t,
        Err(_) => {
            return fail(&JournalError::InvalidCandidate {
                reason: format!("invalid time {time:?}, expected HH:MM:SS"),
            })
        }
    };
    if !delta.is_finite() {
        return fail(&JournalError::InvalidCandidate {
            reason: format!("delta must be finite, got {delta}"),
        });
    }
    let row = TradeRecord::adjustment(
        chrono::NaiveDateTime::new(date, time),
        delta,
        notes,
        account,
    );
    match store.append(&row) {
        Ok(()) => {
            eprintln!("adjustment of {delta:+.2} recorded");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn parse_second_chance(raw: Option<&str>) -> Result<SecondChance, JournalError> {
    match raw {
        None => Ok(SecondChance::NotApplicable),
        Some(raw) => {
            SecondChance::parse(raw).ok_or_else(|| JournalError::InvalidCandidate {
                reason: format!("invalid second-chance tag {raw:?}, expected Yes or No"),
            })
        }
    }
}
