use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::domain::{
    Error, ErrorKind, Outcome, SessionCommand,
    traits::{CommandStream, Narrator, Screen},
};
use crate::engine::AccountEngine;

pub const WELCOME: &str = "Welcome to the ATM! Please enter your PIN.";

/// Drives one user session: pulls commands, runs them against the engine,
/// shows the result and narrates the short summary.
///
/// Only `login` and `exit` are accepted until a login succeeds.
#[derive(Debug)]
pub struct Terminal<I, S, N>
where
    I: CommandStream,
    S: Screen,
    N: Narrator,
{
    commands: I,
    screen: S,
    narrator: N,
    engine: AccountEngine,
    authenticated: bool,
}

impl<I, S, N> Terminal<I, S, N>
where
    I: CommandStream,
    S: Screen,
    N: Narrator,
{
    pub fn new(commands: I, screen: S, narrator: N, engine: AccountEngine) -> Self {
        Self {
            commands,
            screen,
            narrator,
            engine,
            authenticated: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn into_parts(self) -> (S, N) {
        (self.screen, self.narrator)
    }

    pub async fn process(&mut self) -> Result<(), Error> {
        self.present(&Outcome::ok(WELCOME, WELCOME))?;

        let mut commands = self.commands.stream();
        while let Some(command) = commands.next().await {
            match command {
                Ok(command) => {
                    let exit = command == SessionCommand::Exit;
                    let outcome = self.execute(command).await;
                    self.present(&outcome)?;
                    if exit {
                        info!("Session ended by user");
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable command");
                    self.screen.show(&format!("Invalid input: {}", e))?;
                }
            }
        }

        Ok(())
    }

    pub async fn execute(&mut self, command: SessionCommand) -> Outcome {
        debug!(%command, "Executing command");

        if !self.authenticated && !command.is_public() {
            return Outcome::failed(
                ErrorKind::LoginRequired,
                "Please log in with your PIN first.",
            );
        }

        match command {
            SessionCommand::Login { pin } => {
                let outcome = self.engine.authenticate(&pin).await;
                if outcome.success() {
                    self.authenticated = true;
                }
                outcome
            }
            SessionCommand::Balance => {
                let details = self.engine.view_account_details().await;
                Outcome::silent(format!("Balance: ${}", details.balance))
            }
            SessionCommand::Deposit { amount } => self.engine.deposit(amount).await,
            SessionCommand::Withdraw { amount } => self.engine.withdraw(amount).await,
            SessionCommand::Transfer { amount, to } => self.engine.transfer(amount, &to).await,
            SessionCommand::History => self.engine.view_history().await.outcome(),
            SessionCommand::Details => {
                Outcome::silent(self.engine.view_account_details().await.to_string())
            }
            SessionCommand::ChangePin { old_pin, new_pin } => {
                self.engine.change_pin(&old_pin, &new_pin).await
            }
            SessionCommand::Exit => Outcome::ok("Goodbye!", "Goodbye!"),
        }
    }

    fn present(&mut self, outcome: &Outcome) -> Result<(), Error> {
        self.screen.show(&outcome.message)?;
        if let Some(text) = &outcome.narration {
            self.narrator.announce(text);
        }
        Ok(())
    }
}
