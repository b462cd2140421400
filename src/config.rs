//! Runtime configuration.
//!
//! Everything has a default matching a freshly installed terminal, and every
//! default can be overridden through `ATM_*` environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::{AccountError, Error, Money};

pub const DEFAULT_MAX_PIN_ATTEMPTS: u32 = 3;
pub const DEFAULT_LOCKOUT_SECS: u64 = 30;
pub const DEFAULT_PIN: &str = "1234";
pub const DEFAULT_ACCOUNT_NUMBER: &str = "000123456";

/// Rules a new PIN must satisfy on change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PinPolicy {
    /// Any string is accepted.
    #[default]
    Permissive,
    /// ASCII digits only, at least `min_len` of them.
    Digits { min_len: usize },
}

impl PinPolicy {
    pub fn check(&self, candidate: &str) -> Result<(), AccountError> {
        match *self {
            PinPolicy::Permissive => Ok(()),
            PinPolicy::Digits { min_len } => {
                if !candidate.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(AccountError::InvalidPin(
                        "PIN must contain digits only".to_string(),
                    ));
                }
                if candidate.len() < min_len {
                    return Err(AccountError::InvalidPin(format!(
                        "PIN must be at least {} digits long",
                        min_len
                    )));
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Consecutive failures that trigger a lockout.
    pub max_pin_attempts: u32,
    pub lockout_cooldown: Duration,
    pub pin_policy: PinPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_pin_attempts: DEFAULT_MAX_PIN_ATTEMPTS,
            lockout_cooldown: Duration::from_secs(DEFAULT_LOCKOUT_SECS),
            pin_policy: PinPolicy::Permissive,
        }
    }
}

/// Everything the binary needs to open the account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub initial_balance: Money,
    pub pin: String,
    pub account_number: String,
    pub engine: EngineConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            initial_balance: Money::zero(),
            pin: DEFAULT_PIN.to_string(),
            account_number: DEFAULT_ACCOUNT_NUMBER.to_string(),
            engine: EngineConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reads `ATM_INITIAL_BALANCE`, `ATM_PIN`, `ATM_ACCOUNT_NUMBER`,
    /// `ATM_MAX_PIN_ATTEMPTS`, `ATM_LOCKOUT_SECS` and `ATM_PIN_MIN_LENGTH`.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] but with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        let initial_balance = match lookup("ATM_INITIAL_BALANCE") {
            Some(raw) => {
                let balance = Money::from_decimal_str(&raw)
                    .ok_or_else(|| invalid("ATM_INITIAL_BALANCE", &raw))?;
                if balance < Money::zero() {
                    return Err(Error::Config(
                        "ATM_INITIAL_BALANCE must not be negative".to_string(),
                    ));
                }
                balance
            }
            None => defaults.initial_balance,
        };

        // commands arrive trimmed, so a padded PIN could never match
        let pin = lookup("ATM_PIN")
            .map(|raw| raw.trim().to_string())
            .unwrap_or(defaults.pin);
        let account_number = lookup("ATM_ACCOUNT_NUMBER")
            .map(|raw| raw.trim().to_string())
            .unwrap_or(defaults.account_number);

        let max_pin_attempts: u32 =
            parsed(&lookup, "ATM_MAX_PIN_ATTEMPTS")?.unwrap_or(defaults.engine.max_pin_attempts);
        if max_pin_attempts == 0 {
            return Err(Error::Config(
                "ATM_MAX_PIN_ATTEMPTS must be at least 1".to_string(),
            ));
        }

        let lockout_cooldown = parsed(&lookup, "ATM_LOCKOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.engine.lockout_cooldown);

        let pin_policy = parsed(&lookup, "ATM_PIN_MIN_LENGTH")?
            .map(|min_len| PinPolicy::Digits { min_len })
            .unwrap_or(defaults.engine.pin_policy);

        Ok(Self {
            initial_balance,
            pin,
            account_number,
            engine: EngineConfig {
                max_pin_attempts,
                lockout_cooldown,
                pin_policy,
            },
        })
    }
}

fn parsed<F, T>(lookup: &F, key: &str) -> Result<Option<T>, Error>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid(key, &raw)),
        None => Ok(None),
    }
}

fn invalid(key: &str, raw: &str) -> Error {
    Error::Config(format!("Invalid value for {}: {:?}", key, raw))
}
