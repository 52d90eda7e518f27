use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Looks a value up through the secondary index 2. A key that was never registered there
/// answers nil, even if it exists as a primary key.
#[derive(Debug, PartialEq)]
pub struct GetIdx2 {
    pub key: String,
}

impl GetIdx2 {
    const USAGE: &'static str = "exactly one argument: GETIDX2 <key2>";
}

impl Executable for GetIdx2 {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let value = store.lock().get_by_index_two(&self.key);

        match value {
            Some(value) => Ok(Frame::Simple(value)),
            None => Ok(Frame::Nil),
        }
    }
}

impl TryFrom<&mut CommandParser> for GetIdx2 {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let [key] = parser.exact(Self::USAGE)?;
        Ok(Self { key })
    }
}
