pub mod del;
pub mod executable;
pub mod get;
pub mod getidx1;
pub mod getidx2;
pub mod ping;
pub mod purge;
pub mod reset;
pub mod set;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use thiserror::Error as ThisError;
use tracing::{debug, error, warn};

use crate::argument::{self, Arguments};
use crate::commands::executable::Executable;
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

use del::Del;
use get::Get;
use getidx1::GetIdx1;
use getidx2::GetIdx2;
use ping::Ping;
use purge::Purge;
use reset::Reset;
use set::Set;

#[derive(Debug, PartialEq)]
pub enum Command {
    Del(Del),
    Get(Get),
    GetIdx1(GetIdx1),
    GetIdx2(GetIdx2),
    Purge(Purge),
    Reset(Reset),
    Set(Set),

    Ping(Ping),
}

impl Executable for Command {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        match self {
            Command::Del(cmd) => cmd.exec(store),
            Command::Get(cmd) => cmd.exec(store),
            Command::GetIdx1(cmd) => cmd.exec(store),
            Command::GetIdx2(cmd) => cmd.exec(store),
            Command::Ping(cmd) => cmd.exec(store),
            Command::Purge(cmd) => cmd.exec(store),
            Command::Reset(cmd) => cmd.exec(store),
            Command::Set(cmd) => cmd.exec(store),
        }
    }
}

impl TryFrom<&str> for Command {
    type Error = Error;

    fn try_from(line: &str) -> Result<Self, Self::Error> {
        let tokens = argument::tokenize(line)?;

        let command_name = match tokens.first() {
            Some(name) => name.to_lowercase(),
            None => {
                return Err(CommandParserError::UnknownCommand {
                    command: String::new(),
                }
                .into())
            }
        };

        // Only SET registers sub-arguments, every other command sees plain positionals.
        let sub_arguments = match &command_name[..] {
            "set" => Set::SUB_ARGUMENTS,
            _ => &[],
        };

        let parser = &mut CommandParser {
            arguments: Arguments::from_tokens(tokens, sub_arguments)?,
        };

        match &command_name[..] {
            "del" => Del::try_from(parser).map(Command::Del),
            "get" => Get::try_from(parser).map(Command::Get),
            "getidx1" => GetIdx1::try_from(parser).map(Command::GetIdx1),
            "getidx2" => GetIdx2::try_from(parser).map(Command::GetIdx2),
            "ping" => Ping::try_from(parser).map(Command::Ping),
            "purge" => Purge::try_from(parser).map(Command::Purge),
            "reset" => Reset::try_from(parser).map(Command::Reset),
            "set" => Set::try_from(parser).map(Command::Set),
            _ => Err(CommandParserError::UnknownCommand {
                command: command_name,
            }
            .into()),
        }
    }
}

/// Parses and runs one request line against `store`. Failures never escape: every error,
/// whether from parsing or execution, becomes an error frame for the client.
pub fn execute(line: &str, store: &Store) -> Frame {
    let command = match Command::try_from(line) {
        Ok(command) => command,
        Err(err) => {
            debug!(error = %err, "rejected request");
            return Frame::Error(err.to_string());
        }
    };

    debug!(?command, "executing command");

    guarded(|| command.exec(store.clone()))
}

/// Runs a command, turning both its error and a panic into an error frame so one bad request
/// cannot take the connection down.
fn guarded(exec: impl FnOnce() -> Result<Frame, Error>) -> Frame {
    match panic::catch_unwind(AssertUnwindSafe(exec)) {
        Ok(Ok(frame)) => frame,
        Ok(Err(err)) => {
            warn!(error = %err, "command failed");
            Frame::Error(format!("Command failed: {}", err))
        }
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            error!(reason, "command panicked");
            Frame::Error(format!("Command failed: {}", reason))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "internal error"
    }
}

struct CommandParser {
    arguments: Arguments,
}

impl CommandParser {
    /// Command name as typed by the client, upper-cased for messages.
    fn command_name(&self) -> String {
        self.arguments.primary().name.to_uppercase()
    }

    /// Takes exactly `N` positional values. Any other count is reported with `usage`.
    fn exact<const N: usize>(&self, usage: &'static str) -> Result<[String; N], CommandParserError> {
        self.arguments
            .primary()
            .args
            .clone()
            .try_into()
            .map_err(|_| CommandParserError::WrongNumberOfArguments {
                command: self.command_name(),
                usage,
            })
    }

    /// Value carried by the sub-argument `name`, if the clause is present. A clause must carry
    /// exactly one value.
    fn sub_argument_value(&self, name: &str) -> Result<Option<String>, CommandParserError> {
        let Some(argument) = self.arguments.sub_argument(name) else {
            return Ok(None);
        };

        match &argument.args[..] {
            [value] => Ok(Some(value.clone())),
            _ => Err(CommandParserError::InvalidCommandArgument {
                command: self.command_name(),
                argument: format!("{} expects exactly one value", name),
            }),
        }
    }
}

#[derive(Debug, Clone, ThisError, PartialEq)]
pub(crate) enum CommandParserError {
    #[error("Unknown command")]
    UnknownCommand { command: String },
    #[error("{command} expects {usage}")]
    WrongNumberOfArguments {
        command: String,
        usage: &'static str,
    },
    #[error("invalid argument for {command}: {argument}")]
    InvalidCommandArgument { command: String, argument: String },
}
