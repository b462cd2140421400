use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::domain::{Account, AccountError, ErrorKind, Money, Outcome};

/// Full transaction history, or the marker for an account that has none yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum History {
    Entries(Vec<String>),
    NoTransactions,
}

impl History {
    pub fn outcome(&self) -> Outcome {
        match self {
            History::Entries(entries) => {
                Outcome::ok(entries.join("\n"), "Here is your transaction history.")
            }
            History::NoTransactions => Outcome::ok("No transactions yet!", "No transactions yet!"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountDetails {
    pub account_number: String,
    pub balance: Money,
}

impl core::fmt::Display for AccountDetails {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Account Number: {}\nCurrent Balance: ${}",
            self.account_number, self.balance
        )
    }
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Deposit,
    Withdrawal,
    Transfer,
}

impl Operation {
    fn as_str(&self) -> &'static str {
        match self {
            Operation::Deposit => "Deposit",
            Operation::Withdrawal => "Withdrawal",
            Operation::Transfer => "Transfer",
        }
    }
}

/// Account Transaction Engine.
///
/// A cheap, clonable handle: every clone talks to the same account, and every
/// operation runs as one critical section under a single lock. Lockouts are
/// lifted by a background task, so no caller ever waits out a cooldown.
///
/// Transfers are debit-only. The destination account number is checked for
/// shape, but nothing is credited anywhere and its existence is not verified.
#[derive(Debug, Clone)]
pub struct AccountEngine {
    state: Arc<Mutex<Account>>,
    config: EngineConfig,
}

impl AccountEngine {
    pub fn new(
        initial_balance: Money,
        pin: impl Into<String>,
        account_number: impl Into<String>,
    ) -> Self {
        Self::with_config(
            initial_balance,
            pin,
            account_number,
            EngineConfig::default(),
        )
    }

    pub fn with_config(
        initial_balance: Money,
        pin: impl Into<String>,
        account_number: impl Into<String>,
        config: EngineConfig,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(Account::new(
                initial_balance,
                pin,
                account_number,
            ))),
            config,
        }
    }

    pub async fn authenticate(&self, candidate_pin: &str) -> Outcome {
        let mut account = self.state.lock().await;
        match account.authenticate(candidate_pin, self.config.max_pin_attempts) {
            Ok(()) => {
                info!("PIN accepted");
                Outcome::ok("Login successful!", "Login successful!")
            }
            Err(e) => self.authentication_failed(e),
        }
    }

    pub async fn deposit(&self, amount: Money) -> Outcome {
        let mut account = self.state.lock().await;
        match account.deposit(amount) {
            Ok(balance) => {
                info!(%amount, %balance, "Deposit completed");
                Outcome::ok(
                    format!(
                        "You have deposited: ${}. Your current balance is: ${}.",
                        amount, balance
                    ),
                    format!("You have deposited {} dollars.", amount),
                )
            }
            Err(e) => refused(Operation::Deposit, e),
        }
    }

    pub async fn withdraw(&self, amount: Money) -> Outcome {
        let mut account = self.state.lock().await;
        match account.withdraw(amount) {
            Ok(balance) => {
                info!(%amount, %balance, "Withdrawal completed");
                Outcome::ok(
                    format!(
                        "You have withdrawn: ${}. Your current balance is: ${}.",
                        amount, balance
                    ),
                    format!("You have withdrawn {} dollars.", amount),
                )
            }
            Err(e) => refused(Operation::Withdrawal, e),
        }
    }

    /// Debits `amount` on behalf of `destination`. The destination is never
    /// credited; see the type-level docs.
    pub async fn transfer(&self, amount: Money, destination: &str) -> Outcome {
        let mut account = self.state.lock().await;
        match account.transfer(amount, destination) {
            Ok(balance) => {
                info!(%amount, %balance, destination, "Transfer debited");
                Outcome::ok(
                    format!(
                        "You have transferred: ${} to account {}. Your remaining balance is: ${}.",
                        amount, destination, balance
                    ),
                    format!("You have transferred {} dollars.", amount),
                )
            }
            Err(e) => refused(Operation::Transfer, e),
        }
    }

    pub async fn view_history(&self) -> History {
        let account = self.state.lock().await;
        if account.history().is_empty() {
            History::NoTransactions
        } else {
            History::Entries(account.history().to_vec())
        }
    }

    pub async fn view_account_details(&self) -> AccountDetails {
        let account = self.state.lock().await;
        AccountDetails {
            account_number: account.account_number().to_string(),
            balance: account.balance(),
        }
    }

    /// Replaces the PIN after re-authenticating with `old_pin`.
    ///
    /// The new PIN is checked against the configured policy before the old one
    /// is compared, so a policy violation never counts as a failed attempt.
    pub async fn change_pin(&self, old_pin: &str, new_pin: &str) -> Outcome {
        if let Err(e) = self.config.pin_policy.check(new_pin) {
            warn!(error = %e, "PIN change refused by policy");
            return Outcome::failed(e.kind(), e.to_string());
        }

        let mut account = self.state.lock().await;
        match account.authenticate(old_pin, self.config.max_pin_attempts) {
            Ok(()) => {
                account.set_pin(new_pin);
                info!("PIN changed");
                Outcome::ok(
                    "Your PIN has been changed successfully.",
                    "Your PIN has been changed successfully.",
                )
            }
            Err(AccountError::Rejected { attempts }) => {
                warn!(attempts, "PIN change refused, incorrect current PIN");
                Outcome::failed(
                    ErrorKind::Rejected,
                    "Incorrect current PIN. Please try again.",
                )
            }
            Err(e) => {
                // keep the lock message, report the kind as Rejected
                let Outcome {
                    message, narration, ..
                } = self.authentication_failed(e);
                Outcome {
                    kind: Some(ErrorKind::Rejected),
                    message,
                    narration,
                }
            }
        }
    }

    pub async fn is_locked(&self) -> bool {
        self.state.lock().await.locked()
    }

    pub async fn failed_pin_attempts(&self) -> u32 {
        self.state.lock().await.failed_pin_attempts()
    }

    fn authentication_failed(&self, error: AccountError) -> Outcome {
        match error {
            AccountError::Locked => {
                debug!("Authentication refused while locked");
                Outcome::failed(
                    ErrorKind::Locked,
                    "Your account is locked due to multiple failed attempts. Please try again later.",
                )
            }
            AccountError::LockedJustNow { attempts } => {
                let cooldown = self.config.lockout_cooldown;
                warn!(attempts, cooldown_secs = cooldown.as_secs(), "Account locked");
                self.schedule_unlock();
                Outcome::failed(
                    ErrorKind::LockedJustNow,
                    format!(
                        "Too many incorrect attempts! Your account is now locked. Please try again after {} seconds.",
                        cooldown.as_secs()
                    ),
                )
            }
            AccountError::Rejected { attempts } => {
                warn!(attempts, "Incorrect PIN");
                Outcome::failed(ErrorKind::Rejected, "Invalid PIN! Please try again.")
            }
            other => Outcome::failed(other.kind(), other.to_string()),
        }
    }

    fn schedule_unlock(&self) {
        let state = Arc::clone(&self.state);
        let cooldown = self.config.lockout_cooldown;
        tokio::spawn(async move {
            tokio::time::sleep(cooldown).await;
            state.lock().await.unlock();
            info!("Lockout cooldown elapsed, account unlocked");
        });
    }
}

fn refused(operation: Operation, error: AccountError) -> Outcome {
    warn!(operation = operation.as_str(), error = %error, "Operation refused");
    let message = match (&error, operation) {
        (AccountError::NonPositiveAmount, op) => {
            format!("{} amount must be positive!", op.as_str())
        }
        (AccountError::BalanceOverflow, op) => format!("{} amount is too large!", op.as_str()),
        (AccountError::InsufficientFunds { .. }, Operation::Transfer) => {
            "Insufficient funds for transfer!".to_string()
        }
        (AccountError::InsufficientFunds { .. }, _) => "Insufficient funds!".to_string(),
        (AccountError::InvalidAccountNumber, _) => {
            "Account number must be exactly 10 digits.".to_string()
        }
        _ => error.to_string(),
    };
    Outcome::failed(error.kind(), message)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::PinPolicy;

    fn engine(balance: i64) -> AccountEngine {
        AccountEngine::new(Money::from_major(balance).unwrap(), "1234", "000123456")
    }

    #[tokio::test]
    async fn deposit_then_overdraft_leaves_state_alone() {
        let engine = engine(100);

        let outcome = engine.deposit(Money::from_major(50).unwrap()).await;
        assert!(outcome.success());
        assert_eq!(
            outcome.message,
            "You have deposited: $50. Your current balance is: $150."
        );
        assert_eq!(
            outcome.narration.as_deref(),
            Some("You have deposited 50 dollars.")
        );
        assert_eq!(
            engine.view_history().await,
            History::Entries(vec!["Deposited: 50".to_string()])
        );

        let outcome = engine.withdraw(Money::from_major(200).unwrap()).await;
        assert_eq!(outcome.kind, Some(ErrorKind::InsufficientFunds));
        assert_eq!(outcome.message, "Insufficient funds!");
        assert_eq!(
            engine.view_account_details().await.balance,
            Money::from_major(150).unwrap()
        );
        assert_eq!(
            engine.view_history().await,
            History::Entries(vec!["Deposited: 50".to_string()])
        );
    }

    #[tokio::test]
    async fn non_positive_amounts_are_invalid() {
        let engine = engine(100);
        for amount in [Money::zero(), Money(-1), Money::from_major(-20).unwrap()] {
            let outcomes = [
                engine.deposit(amount).await,
                engine.withdraw(amount).await,
                engine.transfer(amount, "1234567890").await,
            ];
            for outcome in outcomes {
                assert_eq!(outcome.kind, Some(ErrorKind::InvalidAmount));
            }
        }
        assert_eq!(
            engine.deposit(Money::zero()).await.message,
            "Deposit amount must be positive!"
        );
        assert_eq!(
            engine.withdraw(Money::zero()).await.message,
            "Withdrawal amount must be positive!"
        );
        assert_eq!(
            engine.view_account_details().await.balance,
            Money::from_major(100).unwrap()
        );
        assert_eq!(engine.view_history().await, History::NoTransactions);
    }

    #[tokio::test]
    async fn deposit_withdraw_round_trip() {
        let engine = engine(100);
        let amount = Money(1_999);
        assert!(engine.deposit(amount).await.success());
        assert!(engine.withdraw(amount).await.success());
        assert_eq!(
            engine.view_account_details().await.balance,
            Money::from_major(100).unwrap()
        );
    }

    #[tokio::test]
    async fn transfer_validates_destination_and_debits_only() {
        let engine = engine(100);

        let outcome = engine.transfer(Money::from_major(50).unwrap(), "12345").await;
        assert_eq!(outcome.kind, Some(ErrorKind::InvalidAccountNumber));
        assert_eq!(outcome.message, "Account number must be exactly 10 digits.");

        let outcome = engine.transfer(Money::from_major(500).unwrap(), "1234567890").await;
        assert_eq!(outcome.kind, Some(ErrorKind::InsufficientFunds));
        assert_eq!(outcome.message, "Insufficient funds for transfer!");

        let outcome = engine.transfer(Money::from_major(50).unwrap(), "1234567890").await;
        assert!(outcome.success());
        assert_eq!(
            outcome.message,
            "You have transferred: $50 to account 1234567890. Your remaining balance is: $50."
        );
        assert_eq!(
            engine.view_account_details().await.balance,
            Money::from_major(50).unwrap()
        );
        match engine.view_history().await {
            History::Entries(entries) => {
                assert_eq!(entries.len(), 1);
                assert!(entries[0].contains("1234567890"));
            }
            History::NoTransactions => panic!("expected one entry"),
        }
    }

    #[tokio::test]
    async fn fresh_account_has_no_transactions() {
        let history = engine(0).view_history().await;
        assert_eq!(history, History::NoTransactions);
        assert_eq!(history.outcome().message, "No transactions yet!");
    }

    #[tokio::test]
    async fn account_details_are_silent() {
        let engine = engine(42);
        let details = engine.view_account_details().await;
        assert_eq!(details.account_number, "000123456");
        assert_eq!(
            details.to_string(),
            "Account Number: 000123456\nCurrent Balance: $42"
        );
        assert_eq!(engine.view_history().await, History::NoTransactions);
    }

    #[tokio::test(start_paused = true)]
    async fn lockout_clears_after_cooldown() {
        let engine = engine(0);

        for _ in 0..2 {
            assert_eq!(
                engine.authenticate("0000").await.kind,
                Some(ErrorKind::Rejected)
            );
        }
        let outcome = engine.authenticate("0000").await;
        assert_eq!(outcome.kind, Some(ErrorKind::LockedJustNow));
        assert!(outcome.message.contains("30 seconds"));

        // correct PIN is refused while locked, without touching the counter
        assert_eq!(
            engine.authenticate("1234").await.kind,
            Some(ErrorKind::Locked)
        );
        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(
            engine.authenticate("1234").await.kind,
            Some(ErrorKind::Locked)
        );
        assert_eq!(engine.failed_pin_attempts().await, 3);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!engine.is_locked().await);
        assert_eq!(engine.failed_pin_attempts().await, 3);

        assert!(engine.authenticate("1234").await.success());
        assert_eq!(engine.failed_pin_attempts().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_after_cooldown_relocks_immediately() {
        let engine = engine(0);
        for _ in 0..3 {
            engine.authenticate("0000").await;
        }
        tokio::time::sleep(Duration::from_secs(31)).await;

        // counter was retained at 3, so one more failure is enough
        assert_eq!(
            engine.authenticate("0000").await.kind,
            Some(ErrorKind::LockedJustNow)
        );
        assert!(engine.is_locked().await);
    }

    #[tokio::test]
    async fn change_pin_requires_current_pin() {
        let engine = engine(0);

        let outcome = engine.change_pin("9999", "4321").await;
        assert_eq!(outcome.kind, Some(ErrorKind::Rejected));
        assert_eq!(outcome.message, "Incorrect current PIN. Please try again.");
        assert!(engine.authenticate("1234").await.success());

        let outcome = engine.change_pin("1234", "4321").await;
        assert!(outcome.success());
        assert_eq!(
            engine.authenticate("1234").await.kind,
            Some(ErrorKind::Rejected)
        );
        assert!(engine.authenticate("4321").await.success());
    }

    #[tokio::test]
    async fn change_pin_while_locked_is_rejected() {
        let engine = engine(0);
        for _ in 0..3 {
            engine.authenticate("0000").await;
        }
        let outcome = engine.change_pin("1234", "4321").await;
        assert_eq!(outcome.kind, Some(ErrorKind::Rejected));
        assert!(outcome.message.contains("locked"));
    }

    #[tokio::test(start_paused = true)]
    async fn lockout_from_change_pin_clears_after_cooldown() {
        let engine = engine(0);

        for _ in 0..3 {
            assert_eq!(
                engine.change_pin("0000", "9999").await.kind,
                Some(ErrorKind::Rejected)
            );
        }
        assert!(engine.is_locked().await);
        assert_eq!(engine.failed_pin_attempts().await, 3);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(!engine.is_locked().await);
        assert_eq!(engine.failed_pin_attempts().await, 3);
        assert!(engine.authenticate("1234").await.success());
    }

    #[tokio::test]
    async fn pin_policy_is_checked_before_authentication() {
        let config = EngineConfig {
            pin_policy: PinPolicy::Digits { min_len: 4 },
            ..EngineConfig::default()
        };
        let engine = AccountEngine::with_config(Money::zero(), "1234", "000123456", config);

        let outcome = engine.change_pin("0000", "12").await;
        assert_eq!(outcome.kind, Some(ErrorKind::InvalidPin));
        assert_eq!(engine.failed_pin_attempts().await, 0);

        assert!(engine.change_pin("1234", "98765").await.success());
        assert!(engine.authenticate("98765").await.success());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_withdrawals_cannot_overdraw() {
        let engine = engine(100);
        let mut handles = Vec::new();
        for _ in 0..10 {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move {
                engine.withdraw(Money::from_major(30).unwrap()).await
            }));
        }

        let mut succeeded = 0;
        for handle in handles {
            if handle.await.unwrap().success() {
                succeeded += 1;
            }
        }

        assert_eq!(succeeded, 3);
        assert_eq!(
            engine.view_account_details().await.balance,
            Money::from_major(10).unwrap()
        );
    }
}
