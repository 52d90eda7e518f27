use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Liveness check. Always answers `PONG` and never touches the store.
#[derive(Debug, PartialEq)]
pub struct Ping;

impl Ping {
    const USAGE: &'static str = "no arguments: PING";
}

impl Executable for Ping {
    fn exec(self, _store: Store) -> Result<Frame, Error> {
        Ok(Frame::Simple(String::from("PONG")))
    }
}

impl TryFrom<&mut CommandParser> for Ping {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let [] = parser.exact(Self::USAGE)?;
        Ok(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Command, CommandParserError};
    use crate::store::EvictionPolicy;

    #[test]
    fn pong() {
        let cmd = Command::try_from("PING").unwrap();
        assert_eq!(cmd, Command::Ping(Ping));

        let store = Store::new(EvictionPolicy::None, 1).unwrap();
        let result = cmd.exec(store.clone()).unwrap();

        assert_eq!(result, Frame::Simple(String::from("PONG")));
        assert!(store.lock().is_empty());
    }

    #[test]
    fn lowercase() {
        assert_eq!(Command::try_from("ping").unwrap(), Command::Ping(Ping));
    }

    #[test]
    fn with_arguments() {
        let err = Command::try_from("PING hello").err().unwrap();
        let err = err.downcast_ref::<CommandParserError>().unwrap();

        assert_eq!(
            *err,
            CommandParserError::WrongNumberOfArguments {
                command: String::from("PING"),
                usage: Ping::USAGE,
            }
        );
    }
}
