// https://redis.io/docs/reference/protocol-spec

use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io::Cursor;
use thiserror::Error as ThisError;

static CRLF: &[u8; 2] = b"\r\n";

/// Arrays nested deeper than this are rejected instead of recursing further.
pub const MAX_DEPTH: usize = 512;

#[derive(Debug, ThisError, PartialEq)]
pub enum Error {
    #[error("not enough data is available to parse an entire frame")]
    Incomplete,
    #[error("invalid frame data type: {0:#04x}")]
    InvalidDataType(u8),
    #[error("malformed line terminator")]
    InvalidLineTerminator,
    #[error("bulk string payload is not followed by CRLF")]
    InvalidBulkTerminator,
    #[error("invalid length: {0:?}")]
    InvalidLength(String),
    #[error("invalid integer: {0:?}")]
    InvalidInteger(String),
    #[error("arrays nested deeper than {} levels", MAX_DEPTH)]
    TooDeep,
    #[error("frame exceeds {0} bytes")]
    TooLarge(usize),
}

/// A single RESP2 value.
///
/// Null bulk strings and null arrays are their own variants, so they can never be confused with
/// an empty payload. Simple and error lines are kept as raw bytes, exactly as they were read.
#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    Simple(Bytes),
    Error(Bytes),
    Integer(i64),
    Bulk(Bytes),
    NullBulk,
    Array(Vec<Frame>),
    NullArray,
}

impl Frame {
    /// Checks that an entire frame is buffered at the cursor, advancing it past the frame.
    ///
    /// Nothing is allocated and bulk payloads are skipped by their declared length, so calling
    /// this again after every partial read stays cheap.
    pub fn check(src: &mut Cursor<&[u8]>) -> Result<(), Error> {
        Self::check_nested(src, 0)
    }

    fn check_nested(src: &mut Cursor<&[u8]>, depth: usize) -> Result<(), Error> {
        match DataType::try_from(get_byte(src)?)? {
            DataType::SimpleString | DataType::SimpleError | DataType::Integer => {
                get_line(src)?;
            }
            DataType::BulkString => {
                if let Some(length) = get_length(src)? {
                    get_bulk(src, length)?;
                }
            }
            DataType::Array => {
                if let Some(length) = get_length(src)? {
                    if depth >= MAX_DEPTH {
                        return Err(Error::TooDeep);
                    }
                    for _ in 0..length {
                        Self::check_nested(src, depth + 1)?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Parses one frame from the cursor, advancing it past the frame. Returns
    /// [`Error::Incomplete`] when the buffer ends before the frame does; the caller is expected to
    /// retry with the same starting position once more data has arrived.
    pub fn parse(src: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        Self::parse_nested(src, 0)
    }

    fn parse_nested(src: &mut Cursor<&[u8]>, depth: usize) -> Result<Self, Error> {
        // The first byte in an RESP-serialized payload always identifies its type.
        let first_byte = get_byte(src)?;
        let data_type = DataType::try_from(first_byte)?;

        match data_type {
            DataType::SimpleString => Ok(Frame::Simple(Bytes::copy_from_slice(get_line(src)?))),
            DataType::SimpleError => Ok(Frame::Error(Bytes::copy_from_slice(get_line(src)?))),
            DataType::Integer => {
                let line = get_line(src)?;
                let integer = std::str::from_utf8(line)
                    .ok()
                    .and_then(|text| text.parse::<i64>().ok())
                    .ok_or_else(|| {
                        Error::InvalidInteger(String::from_utf8_lossy(line).into_owned())
                    })?;

                Ok(Frame::Integer(integer))
            }
            // $<length>\r\n<data>\r\n
            DataType::BulkString => match get_length(src)? {
                Some(length) => Ok(Frame::Bulk(Bytes::copy_from_slice(get_bulk(src, length)?))),
                None => Ok(Frame::NullBulk),
            },
            // *<number-of-elements>\r\n<element-1>...<element-n>
            DataType::Array => {
                let length = match get_length(src)? {
                    Some(length) => length,
                    None => return Ok(Frame::NullArray),
                };

                if depth >= MAX_DEPTH {
                    return Err(Error::TooDeep);
                }

                // Every element takes at least three bytes, do not trust the declared length.
                let mut frames = Vec::with_capacity(length.min(src.remaining() / 3));
                for _ in 0..length {
                    frames.push(Self::parse_nested(src, depth + 1)?);
                }

                Ok(Frame::Array(frames))
            }
        }
    }

    /// Appends the wire representation of this frame to `dst`.
    pub fn write_to(&self, dst: &mut BytesMut) {
        match self {
            Frame::Simple(s) => {
                dst.put_u8(u8::from(DataType::SimpleString));
                dst.extend_from_slice(s);
                dst.extend_from_slice(CRLF);
            }
            Frame::Error(s) => {
                dst.put_u8(u8::from(DataType::SimpleError));
                dst.extend_from_slice(s);
                dst.extend_from_slice(CRLF);
            }
            Frame::Integer(i) => {
                dst.put_u8(u8::from(DataType::Integer));
                dst.extend_from_slice(i.to_string().as_bytes());
                dst.extend_from_slice(CRLF);
            }
            Frame::Bulk(bytes) => {
                let length_str = bytes.len().to_string();
                dst.reserve(1 + length_str.len() + CRLF.len() + bytes.len() + CRLF.len());
                dst.put_u8(u8::from(DataType::BulkString));
                dst.extend_from_slice(length_str.as_bytes());
                dst.extend_from_slice(CRLF);
                dst.extend_from_slice(bytes);
                dst.extend_from_slice(CRLF);
            }
            Frame::NullBulk => dst.extend_from_slice(b"$-1\r\n"),
            Frame::Array(arr) => {
                dst.put_u8(u8::from(DataType::Array));
                dst.extend_from_slice(arr.len().to_string().as_bytes());
                dst.extend_from_slice(CRLF);
                for frame in arr {
                    frame.write_to(dst);
                }
            }
            Frame::NullArray => dst.extend_from_slice(b"*-1\r\n"),
        }
    }

    #[cfg(test)]
    pub(crate) fn serialize(&self) -> Vec<u8> {
        let mut bytes = BytesMut::new();
        self.write_to(&mut bytes);
        bytes.to_vec()
    }
}

// Compact single-line rendering, used when logging requests and replies.
impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Simple(s) => write!(f, "+{}", String::from_utf8_lossy(s)),
            Frame::Error(s) => write!(f, "-{}", String::from_utf8_lossy(s)),
            Frame::Integer(i) => write!(f, ":{}", i),
            Frame::Bulk(bytes) => write!(f, "${}", String::from_utf8_lossy(bytes)),
            Frame::NullBulk => write!(f, "$-1"),
            Frame::Array(arr) => {
                write!(f, "[")?;
                for (i, frame) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", frame)?;
                }
                write!(f, "]")
            }
            Frame::NullArray => write!(f, "*-1"),
        }
    }
}

/// Returns the line starting at the cursor without its CRLF and moves the cursor past it.
fn get_line<'a>(src: &mut Cursor<&'a [u8]>) -> Result<&'a [u8], Error> {
    let start = src.position() as usize;
    let buf: &'a [u8] = *src.get_ref();

    let lf = buf[start..]
        .iter()
        .position(|&b| b == b'\n')
        .map(|index| start + index)
        .ok_or(Error::Incomplete)?;

    if lf == start || buf[lf - 1] != b'\r' {
        return Err(Error::InvalidLineTerminator);
    }

    src.set_position((lf + 1) as u64);

    Ok(&buf[start..lf - 1])
}

/// Returns a bulk payload of `length` bytes and moves the cursor past it and its CRLF. The
/// payload is length-prefixed, so it may itself contain CR and LF.
fn get_bulk<'a>(src: &mut Cursor<&'a [u8]>, length: usize) -> Result<&'a [u8], Error> {
    if src.remaining() < length + CRLF.len() {
        return Err(Error::Incomplete);
    }

    let start = src.position() as usize;
    let buf: &'a [u8] = *src.get_ref();
    if &buf[start + length..start + length + CRLF.len()] != CRLF {
        return Err(Error::InvalidBulkTerminator);
    }
    src.advance(length + CRLF.len());

    Ok(&buf[start..start + length])
}

/// Parses a length line. `None` is the `-1` null marker.
fn get_length(src: &mut Cursor<&[u8]>) -> Result<Option<usize>, Error> {
    let line = get_line(src)?;
    let text = String::from_utf8_lossy(line);

    match text.parse::<i64>() {
        Ok(-1) => Ok(None),
        Ok(length) => usize::try_from(length)
            .map(Some)
            .map_err(|_| Error::InvalidLength(text.into_owned())),
        Err(_) => Err(Error::InvalidLength(text.into_owned())),
    }
}

fn get_byte(src: &mut Cursor<&[u8]>) -> Result<u8, Error> {
    if !src.has_remaining() {
        return Err(Error::Incomplete);
    }
    Ok(src.get_u8())
}

#[derive(Debug)]
enum DataType {
    SimpleString, // '+'
    SimpleError,  // '-'
    Integer,      // ':'
    BulkString,   // '$'
    Array,        // '*'
}

impl TryFrom<u8> for DataType {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            b'+' => Ok(Self::SimpleString),
            b'-' => Ok(Self::SimpleError),
            b':' => Ok(Self::Integer),
            b'$' => Ok(Self::BulkString),
            b'*' => Ok(Self::Array),
            _ => Err(Error::InvalidDataType(byte)),
        }
    }
}

impl From<DataType> for u8 {
    fn from(value: DataType) -> Self {
        match value {
            DataType::SimpleString => b'+',
            DataType::SimpleError => b'-',
            DataType::Integer => b':',
            DataType::BulkString => b'$',
            DataType::Array => b'*',
        }
    }
}
