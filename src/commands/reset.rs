use tracing::info;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Drops every entry and both secondary indexes. Requires the literal `CONFIRM` token.
#[derive(Debug, PartialEq)]
pub struct Reset;

impl Reset {
    const CONFIRMATION: &'static str = "CONFIRM";
    const USAGE: &'static str = "a confirmation: RESET CONFIRM";
}

impl Executable for Reset {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        store.lock().clear();
        info!("cache reset");

        Ok(Frame::Simple(String::from("OK: Cache has been reset.")))
    }
}

impl TryFrom<&mut CommandParser> for Reset {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let [confirmation] = parser.exact(Self::USAGE)?;

        if !confirmation.eq_ignore_ascii_case(Self::CONFIRMATION) {
            return Err(CommandParserError::InvalidCommandArgument {
                command: parser.command_name(),
                argument: confirmation,
            }
            .into());
        }

        Ok(Self)
    }
}
