use std::sync::Mutex;

use tracing::debug;

use crate::domain::Narrator;

/// Stand-in for a speech engine: prints what would be spoken to stderr.
#[derive(Default, Debug)]
pub struct StdErrNarrator {}

impl Narrator for StdErrNarrator {
    fn announce(&self, text: &str) {
        debug!(text, "Narrating");
        eprintln!("[voice] {}", text);
    }
}

/// Keeps every announcement in memory, in order.
#[derive(Default, Debug)]
pub struct RecordingNarrator {
    spoken: Mutex<Vec<String>>,
}

impl RecordingNarrator {
    pub fn spoken(&self) -> Vec<String> {
        match self.spoken.lock() {
            Ok(spoken) => spoken.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Narrator for RecordingNarrator {
    fn announce(&self, text: &str) {
        match self.spoken.lock() {
            Ok(mut spoken) => spoken.push(text.to_string()),
            Err(poisoned) => poisoned.into_inner().push(text.to_string()),
        }
    }
}
