use std::{env, fs::File, io::Read, path::Path};

use atm_terminal::{
    AccountEngine, AppConfig, domain::Error, ingestion::CsvCommandReader,
    narration::StdErrNarrator, screen::WriterScreen, terminal::Terminal,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main] // using Tokio runtime for the lockout timer
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so stdout only carries what the terminal shows
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::from_env()?;
    info!(
        account_number = %config.account_number,
        max_pin_attempts = config.engine.max_pin_attempts,
        lockout_secs = config.engine.lockout_cooldown.as_secs(),
        "Configuration loaded"
    );

    let engine = AccountEngine::with_config(
        config.initial_balance,
        config.pin,
        config.account_number,
        config.engine,
    );

    // Commands come from the script given as first argument, or from stdin
    let input: Box<dyn Read + Send> = match env::args().nth(1) {
        Some(path) => Box::new(File::open(Path::new(&path)).map_err(Error::from)?),
        None => Box::new(std::io::stdin()),
    };

    let mut terminal = Terminal::new(
        CsvCommandReader::new(input),
        WriterScreen::stdout(),
        StdErrNarrator::default(),
        engine,
    );
    terminal.process().await?;

    Ok(())
}
