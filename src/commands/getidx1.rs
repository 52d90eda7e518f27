use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Looks a value up through the secondary index 1. A key that was never registered there
/// answers nil, even if it exists as a primary key.
#[derive(Debug, PartialEq)]
pub struct GetIdx1 {
    pub key: String,
}

impl GetIdx1 {
    const USAGE: &'static str = "exactly one argument: GETIDX1 <key1>";
}

impl Executable for GetIdx1 {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let value = store.lock().get_by_index_one(&self.key);

        match value {
            Some(value) => Ok(Frame::Simple(value)),
            None => Ok(Frame::Nil),
        }
    }
}

impl TryFrom<&mut CommandParser> for GetIdx1 {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let [key] = parser.exact(Self::USAGE)?;
        Ok(Self { key })
    }
}
