pub mod account;
pub mod command;
pub mod error;
pub mod money;
pub mod outcome;
pub mod traits;

pub use account::{Account, AccountError};
pub use command::SessionCommand;
pub use error::Error;
pub use money::Money;
pub use outcome::{ErrorKind, Outcome};
pub use traits::{CommandStream, Narrator, Screen};
