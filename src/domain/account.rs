use thiserror::Error;

use crate::domain::{ErrorKind, Money};

/// Destination account numbers are exactly this many ASCII digits.
pub const ACCOUNT_NUMBER_LEN: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountError {
    #[error("Amount must be positive")]
    NonPositiveAmount,
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: Money, available: Money },
    #[error("Balance would overflow")]
    BalanceOverflow,
    #[error("Account number must be exactly 10 digits")]
    InvalidAccountNumber,
    #[error("Incorrect PIN ({attempts} failed attempts)")]
    Rejected { attempts: u32 },
    #[error("Account is locked")]
    Locked,
    #[error("Account locked after {attempts} failed attempts")]
    LockedJustNow { attempts: u32 },
    #[error("New PIN rejected: {0}")]
    InvalidPin(String),
}

impl AccountError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AccountError::NonPositiveAmount | AccountError::BalanceOverflow => {
                ErrorKind::InvalidAmount
            }
            AccountError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            AccountError::InvalidAccountNumber => ErrorKind::InvalidAccountNumber,
            AccountError::Rejected { .. } => ErrorKind::Rejected,
            AccountError::Locked => ErrorKind::Locked,
            AccountError::LockedJustNow { .. } => ErrorKind::LockedJustNow,
            AccountError::InvalidPin(_) => ErrorKind::InvalidPin,
        }
    }
}

pub fn is_valid_account_number(candidate: &str) -> bool {
    candidate.len() == ACCOUNT_NUMBER_LEN && candidate.bytes().all(|b| b.is_ascii_digit())
}

/// The single account behind the terminal.
///
/// All mutation goes through methods that check their preconditions first, so
/// a returned error always means nothing changed.
#[derive(Debug)]
pub struct Account {
    balance: Money, // never negative
    pin: String,
    account_number: String,
    history: Vec<String>, // append-only
    failed_pin_attempts: u32,
    locked: bool,
}

impl Account {
    /// A negative `initial_balance` is treated as zero.
    pub fn new(
        initial_balance: Money,
        pin: impl Into<String>,
        account_number: impl Into<String>,
    ) -> Self {
        Self {
            balance: initial_balance.max(Money::zero()),
            pin: pin.into(),
            account_number: account_number.into(),
            history: Vec::new(),
            failed_pin_attempts: 0,
            locked: false,
        }
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn account_number(&self) -> &str {
        &self.account_number
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn failed_pin_attempts(&self) -> u32 {
        self.failed_pin_attempts
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    /// Compares `candidate` with the stored PIN.
    ///
    /// While locked the candidate is not even looked at. The lock engages once
    /// `failed_pin_attempts` reaches `max_attempts`; clearing it is the
    /// caller's job (see [`Account::unlock`]).
    pub fn authenticate(
        &mut self,
        candidate: &str,
        max_attempts: u32,
    ) -> Result<(), AccountError> {
        if self.locked {
            return Err(AccountError::Locked);
        }

        if candidate == self.pin {
            self.failed_pin_attempts = 0;
            return Ok(());
        }

        self.failed_pin_attempts = self.failed_pin_attempts.saturating_add(1);
        if self.failed_pin_attempts >= max_attempts {
            self.locked = true;
            return Err(AccountError::LockedJustNow {
                attempts: self.failed_pin_attempts,
            });
        }

        Err(AccountError::Rejected {
            attempts: self.failed_pin_attempts,
        })
    }

    /// Ends a lockout. The failure counter is left as is.
    pub fn unlock(&mut self) {
        self.locked = false;
    }

    pub fn set_pin(&mut self, new_pin: impl Into<String>) {
        self.pin = new_pin.into();
    }

    pub fn deposit(&mut self, amount: Money) -> Result<Money, AccountError> {
        if !amount.is_positive() {
            return Err(AccountError::NonPositiveAmount);
        }
        let balance = self
            .balance
            .checked_add(amount)
            .ok_or(AccountError::BalanceOverflow)?;

        self.balance = balance;
        self.history.push(format!("Deposited: {}", amount));
        Ok(self.balance)
    }

    pub fn withdraw(&mut self, amount: Money) -> Result<Money, AccountError> {
        let balance = self.debit(amount)?;

        self.balance = balance;
        self.history.push(format!("Withdrawn: {}", amount));
        Ok(self.balance)
    }

    /// Debits this account only; `destination` is validated for shape but
    /// never credited.
    pub fn transfer(&mut self, amount: Money, destination: &str) -> Result<Money, AccountError> {
        if !amount.is_positive() {
            return Err(AccountError::NonPositiveAmount);
        }
        if !is_valid_account_number(destination) {
            return Err(AccountError::InvalidAccountNumber);
        }
        let balance = self.debit(amount)?;

        self.balance = balance;
        self.history
            .push(format!("Transferred: {} to account {}", amount, destination));
        Ok(self.balance)
    }

    fn debit(&self, amount: Money) -> Result<Money, AccountError> {
        if !amount.is_positive() {
            return Err(AccountError::NonPositiveAmount);
        }
        if amount > self.balance {
            return Err(AccountError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            });
        }
        self.balance
            .checked_sub(amount)
            .ok_or(AccountError::BalanceOverflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(balance: i64) -> Account {
        Account::new(Money::from_major(balance).unwrap(), "1234", "000123456")
    }

    #[test]
    fn deposit_then_withdraw_round_trips() {
        let mut acc = account(100);
        assert_eq!(acc.deposit(Money(1_234)), Ok(Money(11_234)));
        assert_eq!(acc.withdraw(Money(1_234)), Ok(Money::from_major(100).unwrap()));
        assert_eq!(acc.history(), ["Deposited: 12.34", "Withdrawn: 12.34"]);
    }

    #[test]
    fn non_positive_amounts_change_nothing() {
        let mut acc = account(100);
        for amount in [Money(0), Money(-1), Money::from_major(-50).unwrap()] {
            assert_eq!(acc.deposit(amount), Err(AccountError::NonPositiveAmount));
            assert_eq!(acc.withdraw(amount), Err(AccountError::NonPositiveAmount));
            assert_eq!(
                acc.transfer(amount, "1234567890"),
                Err(AccountError::NonPositiveAmount)
            );
        }
        assert_eq!(acc.balance(), Money::from_major(100).unwrap());
        assert!(acc.history().is_empty());
    }

    #[test]
    fn overdraft_is_refused() {
        let mut acc = account(100);
        let err = acc.withdraw(Money::from_major(101).unwrap()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
        let err = acc
            .transfer(Money::from_major(101).unwrap(), "1234567890")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
        assert_eq!(acc.balance(), Money::from_major(100).unwrap());

        // the whole balance is fine
        assert_eq!(acc.withdraw(Money::from_major(100).unwrap()), Ok(Money::zero()));
    }

    #[test]
    fn deposit_overflow_is_invalid_amount() {
        let mut acc = Account::new(Money(i64::MAX - 1), "1234", "1");
        let err = acc.deposit(Money(2)).unwrap_err();
        assert_eq!(err, AccountError::BalanceOverflow);
        assert_eq!(err.kind(), ErrorKind::InvalidAmount);
        assert!(acc.history().is_empty());
    }

    #[test]
    fn transfer_checks_destination_shape() {
        let mut acc = account(100);
        for bad in ["12345", "12345678901", "12345abcde", "", "١٢٣٤٥٦٧٨٩٠"] {
            assert_eq!(
                acc.transfer(Money::from_major(50).unwrap(), bad),
                Err(AccountError::InvalidAccountNumber)
            );
        }
        assert_eq!(
            acc.transfer(Money::from_major(50).unwrap(), "1234567890"),
            Ok(Money::from_major(50).unwrap())
        );
        assert_eq!(acc.history(), ["Transferred: 50 to account 1234567890"]);
    }

    #[test]
    fn lock_after_three_failures() {
        let mut acc = account(0);
        assert_eq!(
            acc.authenticate("0000", 3),
            Err(AccountError::Rejected { attempts: 1 })
        );
        assert_eq!(
            acc.authenticate("0000", 3),
            Err(AccountError::Rejected { attempts: 2 })
        );
        assert_eq!(
            acc.authenticate("0000", 3),
            Err(AccountError::LockedJustNow { attempts: 3 })
        );
        assert!(acc.locked());

        // correct PIN is not even compared while locked
        assert_eq!(acc.authenticate("1234", 3), Err(AccountError::Locked));
        assert_eq!(acc.authenticate("9999", 3), Err(AccountError::Locked));
        assert_eq!(acc.failed_pin_attempts(), 3);

        acc.unlock();
        assert_eq!(acc.failed_pin_attempts(), 3);
        assert_eq!(acc.authenticate("1234", 3), Ok(()));
        assert_eq!(acc.failed_pin_attempts(), 0);
    }

    #[test]
    fn success_resets_counter() {
        let mut acc = account(0);
        acc.authenticate("1", 3).unwrap_err();
        acc.authenticate("2", 3).unwrap_err();
        acc.authenticate("1234", 3).unwrap();
        assert_eq!(
            acc.authenticate("3", 3),
            Err(AccountError::Rejected { attempts: 1 })
        );
    }

    #[test]
    fn negative_opening_balance_is_clamped() {
        assert_eq!(Account::new(Money(-500), "1", "1").balance(), Money::zero());
    }
}
