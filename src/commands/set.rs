use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Stores `value` under `key`, optionally reachable through one key in each secondary index:
///
/// ```text
/// SET <key> <value> [IDX1 <key1>] [IDX2 <key2>]
/// ```
#[derive(Debug, PartialEq)]
pub struct Set {
    pub key: String,
    pub value: String,
    pub index_one: Option<String>,
    pub index_two: Option<String>,
}

impl Set {
    pub const SUB_ARGUMENTS: &'static [&'static str] = &["IDX1", "IDX2"];

    const USAGE: &'static str = "a key and a value: SET <key> <value> [IDX1 <key1>] [IDX2 <key2>]";
}

impl Executable for Set {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        store
            .lock()
            .put(self.key, self.value, &[self.index_one, self.index_two])?;

        Ok(Frame::ok())
    }
}

impl TryFrom<&mut CommandParser> for Set {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let [key, value] = parser.exact(Self::USAGE)?;
        let index_one = parser.sub_argument_value("IDX1")?;
        let index_two = parser.sub_argument_value("IDX2")?;

        Ok(Self {
            key,
            value,
            index_one,
            index_two,
        })
    }
}
