pub mod del;
pub mod echo;
pub mod executable;
pub mod get;
pub mod ping;
pub mod set;

use bytes::Bytes;
use std::vec;
use thiserror::Error as ThisError;

use crate::commands::executable::Executable;
use crate::frame::Frame;
use crate::store::Storage;

use del::Del;
use echo::Echo;
use get::Get;
use ping::Ping;
use set::Set;

#[derive(Debug, PartialEq)]
pub enum Command {
    Del(Del),
    Echo(Echo),
    Get(Get),
    Ping(Ping),
    Set(Set),
}

impl Command {
    /// Interprets a decoded frame as a command.
    ///
    /// Only a non-null array with at least one element is a command, anything else yields `None`
    /// and must be ignored by the caller without replying.
    pub fn from_frame(frame: Frame) -> Option<Result<Command, CommandError>> {
        match frame {
            Frame::Array(parts) if !parts.is_empty() => Some(Command::try_from(parts)),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Del(_) => "DEL",
            Command::Echo(_) => "ECHO",
            Command::Get(_) => "GET",
            Command::Ping(_) => "PING",
            Command::Set(_) => "SET",
        }
    }
}

impl Executable for Command {
    fn exec(self, store: &dyn Storage) -> Frame {
        match self {
            Command::Del(cmd) => cmd.exec(store),
            Command::Echo(cmd) => cmd.exec(store),
            Command::Get(cmd) => cmd.exec(store),
            Command::Ping(cmd) => cmd.exec(store),
            Command::Set(cmd) => cmd.exec(store),
        }
    }
}

impl TryFrom<Vec<Frame>> for Command {
    type Error = CommandError;

    fn try_from(frames: Vec<Frame>) -> Result<Self, Self::Error> {
        let parser = &mut CommandParser {
            parts: frames.into_iter(),
        };

        let command = parser.parse_command_name();

        let parsed = match &command[..] {
            "DEL" => Del::try_from(parser).map(Command::Del),
            "ECHO" => Echo::try_from(parser).map(Command::Echo),
            "GET" => Get::try_from(parser).map(Command::Get),
            "PING" => Ping::try_from(parser).map(Command::Ping),
            "SET" => Set::try_from(parser).map(Command::Set),
            _ => {
                return Err(CommandError::UnknownCommand {
                    command: command.clone(),
                })
            }
        };

        // Arguments are taken verbatim, so the only way parsing can fail is a wrong count.
        parsed.map_err(|_| CommandError::WrongNumberOfArguments { command })
    }
}

/// Walks the arguments of a command, front to back.
pub struct CommandParser {
    parts: vec::IntoIter<Frame>,
}

impl CommandParser {
    /// Uppercased text of the first element, or an empty name if there is none.
    fn parse_command_name(&mut self) -> String {
        self.parts
            .next()
            .map(|frame| String::from_utf8_lossy(&text_content(frame)).to_uppercase())
            .unwrap_or_default()
    }

    fn next_bytes(&mut self) -> Result<Bytes, CommandParserError> {
        self.parts
            .next()
            .map(text_content)
            .ok_or(CommandParserError::EndOfStream)
    }

    /// Fails if any argument is left unconsumed.
    fn finish(&mut self) -> Result<(), CommandParserError> {
        match self.parts.len() {
            0 => Ok(()),
            count => Err(CommandParserError::TrailingArguments { count }),
        }
    }
}

/// The text an argument contributes to a command. Strings are used verbatim, integers by their
/// decimal representation; nulls and nested arrays carry no text.
fn text_content(frame: Frame) -> Bytes {
    match frame {
        Frame::Simple(bytes) | Frame::Error(bytes) | Frame::Bulk(bytes) => bytes,
        Frame::Integer(i) => Bytes::from(i.to_string()),
        Frame::NullBulk | Frame::Array(_) | Frame::NullArray => Bytes::new(),
    }
}

/// Errors reported back to the client as an error reply. The connection keeps serving after
/// sending one. The message text is what clients see on the wire.
#[derive(Debug, ThisError, PartialEq)]
pub enum CommandError {
    #[error("ERR wrong number of arguments for '{command}' command")]
    WrongNumberOfArguments { command: String },
    #[error("ERR unknown command '{command}'")]
    UnknownCommand { command: String },
}

impl From<CommandError> for Frame {
    fn from(err: CommandError) -> Self {
        Frame::Error(Bytes::from(err.to_string()))
    }
}

#[derive(Debug, ThisError, PartialEq)]
pub enum CommandParserError {
    #[error("attempting to extract a value failed due to the frame being fully consumed")]
    EndOfStream,
    #[error("{count} unexpected trailing arguments")]
    TrailingArguments { count: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_command_name_is_case_insensitive() {
        let frames = vec![
            Frame::Bulk(Bytes::from("gEt")),
            Frame::Bulk(Bytes::from("foo")),
        ];

        let cmd = Command::try_from(frames).unwrap();

        assert_eq!(
            cmd,
            Command::Get(Get {
                key: Bytes::from("foo")
            })
        );
    }

    #[test]
    fn parse_command_with_simple_strings() {
        let frames = vec![
            Frame::Simple(Bytes::from("SET")),
            Frame::Simple(Bytes::from("foo")),
            Frame::Bulk(Bytes::from("baz")),
        ];

        let cmd = Command::try_from(frames).unwrap();

        assert_eq!(
            cmd,
            Command::Set(Set {
                key: Bytes::from("foo"),
                value: Bytes::from("baz")
            })
        );
    }

    #[test]
    fn simple_string_arguments_are_taken_verbatim() {
        let frames = vec![
            Frame::Simple(Bytes::from("GET")),
            Frame::Simple(Bytes::from_static(b"\xff\x00")),
        ];

        let cmd = Command::try_from(frames).unwrap();

        assert_eq!(
            cmd,
            Command::Get(Get {
                key: Bytes::from_static(b"\xff\x00")
            })
        );
    }

    #[test]
    fn integer_argument_uses_its_decimal_text() {
        let frames = vec![Frame::Bulk(Bytes::from("ECHO")), Frame::Integer(-42)];

        let cmd = Command::try_from(frames).unwrap();

        assert_eq!(
            cmd,
            Command::Echo(Echo {
                message: Bytes::from("-42")
            })
        );
    }

    #[test]
    fn unknown_command() {
        let frames = vec![Frame::Bulk(Bytes::from("unknown"))];

        let err = Command::try_from(frames).unwrap_err();

        assert_eq!(
            err,
            CommandError::UnknownCommand {
                command: "UNKNOWN".to_string()
            }
        );
        assert_eq!(
            Frame::from(err),
            Frame::Error(Bytes::from("ERR unknown command 'UNKNOWN'"))
        );
    }

    #[test]
    fn wrong_number_of_arguments_message() {
        let err = CommandError::WrongNumberOfArguments {
            command: "GET".to_string(),
        };

        assert_eq!(
            err.to_string(),
            "ERR wrong number of arguments for 'GET' command"
        );
    }

    #[test]
    fn only_non_empty_arrays_are_commands() {
        assert!(Command::from_frame(Frame::Array(vec![])).is_none());
        assert!(Command::from_frame(Frame::NullArray).is_none());
        assert!(Command::from_frame(Frame::Bulk(Bytes::from("PING"))).is_none());
        assert!(Command::from_frame(Frame::Simple(Bytes::from("PING"))).is_none());

        let cmd = Command::from_frame(Frame::Array(vec![Frame::Bulk(Bytes::from("PING"))]));

        assert_eq!(cmd, Some(Ok(Command::Ping(Ping { payload: None }))));
    }

    #[test]
    fn null_command_name_is_unknown() {
        let err = Command::try_from(vec![Frame::NullBulk]).unwrap_err();

        assert_eq!(
            Frame::from(err),
            Frame::Error(Bytes::from("ERR unknown command ''"))
        );
    }
}
