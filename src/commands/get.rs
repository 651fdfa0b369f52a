use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Storage;

/// Get the value of `key`. If the key does not exist the special value `nil` is returned.
///
/// Ref: <https://redis.io/docs/latest/commands/get/>
#[derive(Debug, PartialEq)]
pub struct Get {
    pub key: Bytes,
}

impl Executable for Get {
    fn exec(self, store: &dyn Storage) -> Frame {
        match store.get(&self.key) {
            Some(value) => Frame::Bulk(value),
            None => Frame::NullBulk,
        }
    }
}

impl TryFrom<&mut CommandParser> for Get {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        parser.finish()?;

        Ok(Self { key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Command, CommandError};
    use crate::store::Store;

    #[test]
    fn existing_key() {
        let frames = vec![
            Frame::Bulk(Bytes::from("GET")),
            Frame::Bulk(Bytes::from("key1")),
        ];
        let cmd = Command::try_from(frames).unwrap();

        assert_eq!(
            cmd,
            Command::Get(Get {
                key: Bytes::from("key1")
            })
        );

        let store = Store::new();
        store.set(Bytes::from("key1"), Bytes::from("1"));

        let result = cmd.exec(&store);

        assert_eq!(result, Frame::Bulk(Bytes::from("1")));
    }

    #[test]
    fn missing_key() {
        let frames = vec![
            Frame::Bulk(Bytes::from("GET")),
            Frame::Bulk(Bytes::from("key1")),
        ];
        let cmd = Command::try_from(frames).unwrap();

        let result = cmd.exec(&Store::new());

        assert_eq!(result, Frame::NullBulk);
    }

    #[test]
    fn empty_value_is_not_null() {
        let store = Store::new();
        store.set(Bytes::from("key1"), Bytes::new());

        let result = Get {
            key: Bytes::from("key1"),
        }
        .exec(&store);

        assert_eq!(result, Frame::Bulk(Bytes::new()));
    }

    #[test]
    fn wrong_number_of_arguments() {
        let expected = CommandError::WrongNumberOfArguments {
            command: "GET".to_string(),
        };

        let err = Command::try_from(vec![Frame::Bulk(Bytes::from("GET"))]).unwrap_err();
        assert_eq!(err, expected);

        let err = Command::try_from(vec![
            Frame::Bulk(Bytes::from("GET")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from("key2")),
        ])
        .unwrap_err();
        assert_eq!(err, expected);
    }
}
