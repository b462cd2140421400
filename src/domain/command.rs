use crate::domain::Money;

/// One request from the terminal user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Login { pin: String },
    Balance,
    Deposit { amount: Money },
    Withdraw { amount: Money },
    Transfer { amount: Money, to: String },
    History,
    Details,
    ChangePin { old_pin: String, new_pin: String },
    Exit,
}

impl SessionCommand {
    /// Commands that may run before a successful login.
    pub fn is_public(&self) -> bool {
        matches!(self, SessionCommand::Login { .. } | SessionCommand::Exit)
    }
}

// PINs are masked so commands can be logged.
impl core::fmt::Display for SessionCommand {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SessionCommand::Login { .. } => write!(f, "login,****"),
            SessionCommand::Balance => write!(f, "balance"),
            SessionCommand::Deposit { amount } => write!(f, "deposit,{}", amount),
            SessionCommand::Withdraw { amount } => write!(f, "withdraw,{}", amount),
            SessionCommand::Transfer { amount, to } => write!(f, "transfer,{},{}", amount, to),
            SessionCommand::History => write!(f, "history"),
            SessionCommand::Details => write!(f, "details"),
            SessionCommand::ChangePin { .. } => write!(f, "change_pin,****,****"),
            SessionCommand::Exit => write!(f, "exit"),
        }
    }
}
