use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Removes the entry stored under `key` along with every secondary key pointing at it.
/// Deleting a missing key is not an error.
#[derive(Debug, PartialEq)]
pub struct Del {
    pub key: String,
}

impl Del {
    const USAGE: &'static str = "exactly one argument: DEL <key>";
}

impl Executable for Del {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        store.lock().remove(&self.key);
        Ok(Frame::ok())
    }
}

impl TryFrom<&mut CommandParser> for Del {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let [key] = parser.exact(Self::USAGE)?;
        Ok(Self { key })
    }
}
