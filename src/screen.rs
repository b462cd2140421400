use std::io::Write;

use crate::domain::{Error, Screen};

/// Writes each message followed by a blank separator line.
#[derive(Debug)]
pub struct WriterScreen<W: Write> {
    out: W,
}

impl<W: Write> WriterScreen<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl WriterScreen<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> Screen for WriterScreen<W> {
    fn show(&mut self, message: &str) -> Result<(), Error> {
        writeln!(self.out, "{}", message)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_separated() {
        let mut screen = WriterScreen::new(Vec::new());
        screen.show("Login successful!").unwrap();
        screen.show("Account Number: 1\nCurrent Balance: $0").unwrap();
        let out = String::from_utf8(screen.into_inner()).unwrap();
        assert_eq!(
            out,
            "Login successful!\n\nAccount Number: 1\nCurrent Balance: $0\n\n"
        );
    }
}
