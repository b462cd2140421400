use std::io::Read;
use std::pin::Pin;

use futures::stream::{self, Stream};
use serde::Deserialize;

use crate::domain::traits::CommandStream;
use crate::domain::{Error, Money, SessionCommand};

/// Reads terminal commands, one per line: `deposit,50`, `login,1234`,
/// `transfer,50,1234567890`. No header; lines starting with `#` are skipped.
pub struct CsvCommandReader<R: Read> {
    reader: Option<csv::Reader<R>>,
}

impl<R: Read> CsvCommandReader<R> {
    pub fn new(reader: R) -> Self {
        let rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .flexible(true)
            .comment(Some(b'#'))
            .from_reader(reader);

        Self { reader: Some(rdr) }
    }
}

/// Internal shape used only for CSV deserialization.
#[derive(Debug, Deserialize)]
struct CsvRow {
    command: String,
    #[serde(default)]
    first: Option<String>,
    #[serde(default)]
    second: Option<String>,
}

fn required(value: Option<String>, command: &str, what: &str) -> Result<String, Error> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::Ingestion(format!("{} requires {}", command, what)))
}

fn amount(value: Option<String>, command: &str) -> Result<Money, Error> {
    let raw = required(value, command, "an amount")?;
    raw.parse::<Money>().map_err(Error::Ingestion)
}

impl TryFrom<CsvRow> for SessionCommand {
    type Error = Error;

    fn try_from(row: CsvRow) -> Result<Self, Self::Error> {
        let name = row.command.trim().to_ascii_lowercase();
        let command = match name.as_str() {
            // an empty PIN is still an attempt; the engine judges it
            "login" => SessionCommand::Login {
                pin: row.first.unwrap_or_default(),
            },
            "balance" => SessionCommand::Balance,
            "deposit" => SessionCommand::Deposit {
                amount: amount(row.first, &name)?,
            },
            "withdraw" | "withdrawal" => SessionCommand::Withdraw {
                amount: amount(row.first, &name)?,
            },
            "transfer" => SessionCommand::Transfer {
                amount: amount(row.first, &name)?,
                to: required(row.second, &name, "a destination account")?,
            },
            "history" => SessionCommand::History,
            "details" => SessionCommand::Details,
            "change_pin" => SessionCommand::ChangePin {
                old_pin: row.first.unwrap_or_default(),
                new_pin: row.second.unwrap_or_default(),
            },
            "exit" | "quit" => SessionCommand::Exit,
            other => {
                return Err(Error::Ingestion(format!("Unknown command: {}", other)));
            }
        };

        Ok(command)
    }
}

impl<R: Read + Send + 'static> CommandStream for CsvCommandReader<R> {
    type CmdStream = Pin<Box<dyn Stream<Item = Result<SessionCommand, Error>> + Send>>;

    fn stream(&mut self) -> Self::CmdStream {
        // the stream owns the reader, so a second call gets nothing
        let reader = match self.reader.take() {
            Some(r) => r,
            None => {
                return Box::pin(stream::iter(Vec::<Result<SessionCommand, Error>>::new()));
            }
        };

        let iter = reader
            .into_deserialize::<CsvRow>()
            .map(|row_res| match row_res {
                Ok(row) => SessionCommand::try_from(row),
                Err(e) => Err(Error::Ingestion(format!(
                    "CSV deserialization error: {}",
                    e
                ))),
            });

        Box::pin(stream::iter(iter))
    }
}
