use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Get the value stored under the primary `key`. A missing key answers nil.
#[derive(Debug, PartialEq)]
pub struct Get {
    pub key: String,
}

impl Get {
    const USAGE: &'static str = "exactly one argument: GET <key>";
}

impl Executable for Get {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let value = store.lock().get(&self.key);

        match value {
            Some(value) => Ok(Frame::Simple(value)),
            None => Ok(Frame::Nil),
        }
    }
}

impl TryFrom<&mut CommandParser> for Get {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let [key] = parser.exact(Self::USAGE)?;
        Ok(Self { key })
    }
}
