use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Storage;

const INVALID_PAYLOAD: &[u8] = b"ERR PING argument must not contain CR or LF";

/// Returns PONG if no argument is provided, otherwise a copy of the argument as a simple string.
/// More than one argument is a wrong number of arguments. A simple string cannot carry CR or LF,
/// so an argument containing either is answered with an error instead.
///
/// Ref: <https://redis.io/docs/latest/commands/ping>
#[derive(Debug, PartialEq)]
pub struct Ping {
    pub payload: Option<Bytes>,
}

impl Executable for Ping {
    fn exec(self, _store: &dyn Storage) -> Frame {
        match self.payload {
            None => Frame::Simple(Bytes::from_static(b"PONG")),
            Some(payload) if payload.iter().any(|&b| b == b'\r' || b == b'\n') => {
                Frame::Error(Bytes::from_static(INVALID_PAYLOAD))
            }
            Some(payload) => Frame::Simple(payload),
        }
    }
}

impl TryFrom<&mut CommandParser> for Ping {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let payload = match parser.next_bytes() {
            Ok(payload) => Some(payload),
            Err(CommandParserError::EndOfStream) => None,
            Err(e) => return Err(e),
        };
        parser.finish()?;

        Ok(Self { payload })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Command, CommandError};
    use crate::store::Store;

    #[test]
    fn without_payload() {
        let cmd = Command::try_from(vec![Frame::Bulk(Bytes::from("PING"))]).unwrap();

        assert_eq!(cmd, Command::Ping(Ping { payload: None }));
        assert_eq!(cmd.exec(&Store::new()), Frame::Simple(Bytes::from("PONG")));
    }

    #[test]
    fn with_payload() {
        let cmd = Command::try_from(vec![
            Frame::Bulk(Bytes::from("ping")),
            Frame::Bulk(Bytes::from("hello world")),
        ])
        .unwrap();

        assert_eq!(
            cmd,
            Command::Ping(Ping {
                payload: Some(Bytes::from("hello world"))
            })
        );
        assert_eq!(
            cmd.exec(&Store::new()),
            Frame::Simple(Bytes::from("hello world"))
        );
    }

    #[test]
    fn payload_is_echoed_byte_for_byte() {
        let cmd = Command::try_from(vec![
            Frame::Bulk(Bytes::from("PING")),
            Frame::Bulk(Bytes::from_static(b"\xff\x00")),
        ])
        .unwrap();

        assert_eq!(
            cmd.exec(&Store::new()),
            Frame::Simple(Bytes::from_static(b"\xff\x00"))
        );
    }

    #[test]
    fn payload_with_line_break_is_rejected() {
        for payload in [&b"a\r\nb"[..], &b"a\rb"[..], &b"a\nb"[..]] {
            let cmd = Command::try_from(vec![
                Frame::Bulk(Bytes::from("PING")),
                Frame::Bulk(Bytes::copy_from_slice(payload)),
            ])
            .unwrap();

            assert_eq!(
                cmd.exec(&Store::new()),
                Frame::Error(Bytes::from("ERR PING argument must not contain CR or LF"))
            );
        }
    }

    #[test]
    fn too_many_arguments() {
        let err = Command::try_from(vec![
            Frame::Bulk(Bytes::from("PING")),
            Frame::Bulk(Bytes::from("a")),
            Frame::Bulk(Bytes::from("b")),
        ])
        .unwrap_err();

        assert_eq!(
            err,
            CommandError::WrongNumberOfArguments {
                command: "PING".to_string()
            }
        );
    }
}
