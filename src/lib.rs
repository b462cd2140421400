pub mod config;
pub mod domain;
pub mod engine;
pub mod ingestion;
pub mod narration;
pub mod screen;
pub mod terminal;

pub use config::{AppConfig, EngineConfig, PinPolicy};
pub use domain::{ErrorKind, Money, Outcome};
pub use engine::{AccountDetails, AccountEngine, History};
