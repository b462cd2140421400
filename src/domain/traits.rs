use futures::Stream;

use crate::domain::{Error, SessionCommand};

pub trait CommandStream {
    type CmdStream: Stream<Item = Result<SessionCommand, Error>> + Send + Unpin + 'static;
    fn stream(&mut self) -> Self::CmdStream;
}

/// Where display messages go.
pub trait Screen {
    fn show(&mut self, message: &str) -> Result<(), Error>;
}

/// The audio layer; receives only the short spoken summaries.
pub trait Narrator {
    fn announce(&self, text: &str);
}
