/// Why an operation did not succeed. Callers branch on this instead of the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidAmount,
    InsufficientFunds,
    InvalidAccountNumber,
    /// Wrong PIN.
    Rejected,
    /// Authentication refused while a lockout is in effect.
    Locked,
    /// This attempt exhausted the allowed failures and started a lockout.
    LockedJustNow,
    /// New PIN violates the configured policy.
    InvalidPin,
    /// Terminal operation attempted before a successful login.
    LoginRequired,
}

/// Structured result of an engine or terminal operation.
///
/// `message` is meant for display, `narration` is the short summary handed
/// to the audio layer. Read-only operations carry no narration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub kind: Option<ErrorKind>,
    pub message: String,
    pub narration: Option<String>,
}

impl Outcome {
    pub fn ok(message: impl Into<String>, narration: impl Into<String>) -> Self {
        Self {
            kind: None,
            message: message.into(),
            narration: Some(narration.into()),
        }
    }

    pub fn silent(message: impl Into<String>) -> Self {
        Self {
            kind: None,
            message: message.into(),
            narration: None,
        }
    }

    pub fn failed(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: Some(kind),
            narration: Some(message.clone()),
            message,
        }
    }

    pub fn success(&self) -> bool {
        self.kind.is_none()
    }
}
