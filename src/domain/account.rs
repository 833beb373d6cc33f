//! Account configuration: risk parameters, phase targets, drawdown floor.
//!
//! All fields are validated up front so the engine never has to guard
//! against a malformed configuration at computation time.

use crate::domain::error::JournalError;
use crate::ports::config_port::ConfigPort;

/// Fixed per-journal account parameters. `risk_pct` is a fraction (0.0025
/// risks 0.25% of the account per trade and defines 1R). Phase targets and
/// the drawdown floor are account-size multipliers.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountConfig {
    pub account_size: f64,
    pub risk_pct: f64,
    pub commission_per_lot: f64,
    pub phase_targets: Vec<f64>,
    pub drawdown_floor: f64,
    pub reward_ratios: Vec<f64>,
}

impl AccountConfig {
    pub fn risk_amount(&self) -> f64 {
        super::risk::risk_amount(self.account_size, self.risk_pct)
    }

    /// Equity level below which the account is considered busted.
    pub fn floor_equity(&self) -> f64 {
        self.account_size * self.drawdown_floor
    }
}

impl Default for AccountConfig {
    fn default() -> Self {
        AccountConfig {
            account_size: 60_000.0,
            risk_pct: 0.0025,
            commission_per_lot: 4.0,
            phase_targets: vec![1.08, 1.14],
            drawdown_floor: 0.9,
            reward_ratios: vec![3.0, 4.0, 5.0],
        }
    }
}

/// Build an [`AccountConfig`] from the `[account]` section, falling back to
/// the defaults for absent keys and rejecting invalid values.
pub fn load_account_config(config: &dyn ConfigPort) -> Result<AccountConfig, JournalError> {
    let defaults = AccountConfig::default();

    let account = AccountConfig {
        account_size: config.get_double("account", "account_size", defaults.account_size),
        risk_pct: config.get_double("account", "risk_pct", defaults.risk_pct),
        commission_per_lot: config.get_double(
            "account",
            "commission_per_lot",
            defaults.commission_per_lot,
        ),
        phase_targets: parse_multiplier_list(config, "phase_targets", &defaults.phase_targets)?,
        drawdown_floor: config.get_double("account", "drawdown_floor", defaults.drawdown_floor),
        reward_ratios: parse_multiplier_list(config, "reward_ratios", &defaults.reward_ratios)?,
    };

    validate_account_config(&account)?;
    Ok(account)
}

fn parse_multiplier_list(
    config: &dyn ConfigPort,
    key: &str,
    default: &[f64],
) -> Result<Vec<f64>, JournalError> {
    match config.get_string("account", key) {
        None => Ok(default.to_vec()),
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<f64>().map_err(|_| JournalError::ConfigInvalid {
                    section: "account".to_string(),
                    key: key.to_string(),
                    reason: format!("{s:?} is not a number"),
                })
            })
            .collect(),
    }
}

pub fn validate_account_config(account: &AccountConfig) -> Result<(), JournalError> {
    if account.account_size <= 0.0 {
        return Err(invalid("account_size", "must be positive"));
    }
    if account.risk_pct <= 0.0 || account.risk_pct >= 1.0 {
        return Err(invalid("risk_pct", "must be a fraction between 0 and 1"));
    }
    if account.commission_per_lot < 0.0 {
        return Err(invalid("commission_per_lot", "must be non-negative"));
    }
    if account.phase_targets.iter().any(|&t| t <= 1.0) {
        return Err(invalid(
            "phase_targets",
            "each target multiplier must exceed 1.0",
        ));
    }
    if account
        .phase_targets
        .windows(2)
        .any(|pair| pair[1] <= pair[0])
    {
        return Err(invalid("phase_targets", "targets must be ascending"));
    }
    if account.drawdown_floor <= 0.0 || account.drawdown_floor >= 1.0 {
        return Err(invalid("drawdown_floor", "must be between 0 and 1"));
    }
    if account.reward_ratios.is_empty() || account.reward_ratios.iter().any(|&r| r <= 0.0) {
        return Err(invalid(
            "reward_ratios",
            "at least one positive ratio is required",
        ));
    }
    Ok(())
}

fn invalid(key: &str, reason: &str) -> JournalError {
    JournalError::ConfigInvalid {
        section: "account".to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    #[test]
    fn default_account_defines_one_r_of_150() {
        let account = AccountConfig::default();
        assert!((account.risk_amount() - 150.0).abs() < f64::EPSILON);
        assert!((account.floor_equity() - 54_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn load_from_full_section() {
        let adapter = FileConfigAdapter::from_string(
            "[account]\n\
             account_size = 100000\n\
             risk_pct = 0.005\n\
             commission_per_lot = 3.5\n\
             phase_targets = 1.05, 1.10\n\
             drawdown_floor = 0.92\n\
             reward_ratios = 2, 3\n",
        )
        .unwrap();
        let account = load_account_config(&adapter).unwrap();
        assert!((account.account_size - 100_000.0).abs() < f64::EPSILON);
        assert!((account.risk_amount() - 500.0).abs() < f64::EPSILON);
        assert_eq!(account.phase_targets, vec![1.05, 1.10]);
        assert_eq!(account.reward_ratios, vec![2.0, 3.0]);
    }

    #[test]
    fn load_uses_defaults_for_missing_keys() {
        let adapter = FileConfigAdapter::from_string("[account]\naccount_size = 25000\n").unwrap();
        let account = load_account_config(&adapter).unwrap();
        assert!((account.account_size - 25_000.0).abs() < f64::EPSILON);
        assert!((account.risk_pct - 0.0025).abs() < f64::EPSILON);
        assert_eq!(account.phase_targets, vec![1.08, 1.14]);
    }

    #[test]
    fn load_rejects_unparseable_target_list() {
        let adapter =
            FileConfigAdapter::from_string("[account]\nphase_targets = 1.08, eight\n").unwrap();
        assert!(matches!(
            load_account_config(&adapter),
            Err(JournalError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn validate_rejects_non_positive_account_size() {
        let account = AccountConfig {
            account_size: 0.0,
            ..AccountConfig::default()
        };
        assert!(validate_account_config(&account).is_err());
    }

    #[test]
    fn validate_rejects_risk_pct_out_of_range() {
        for risk_pct in [0.0, 1.0, 1.5, -0.1] {
            let account = AccountConfig {
                risk_pct,
                ..AccountConfig::default()
            };
            assert!(validate_account_config(&account).is_err());
        }
    }

    #[test]
    fn validate_rejects_descending_phase_targets() {
        let account = AccountConfig {
            phase_targets: vec![1.14, 1.08],
            ..AccountConfig::default()
        };
        assert!(validate_account_config(&account).is_err());
    }

    #[test]
    fn validate_rejects_target_below_account_size() {
        let account = AccountConfig {
            phase_targets: vec![0.95],
            ..AccountConfig::default()
        };
        assert!(validate_account_config(&account).is_err());
    }

    #[test]
    fn validate_rejects_empty_reward_ratios() {
        let account = AccountConfig {
            reward_ratios: vec![],
            ..AccountConfig::default()
        };
        assert!(validate_account_config(&account).is_err());
    }
}
