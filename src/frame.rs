// Response protocol. Every unit starts with a one byte sigil and ends with CRLF:
//
//   +OK\r\n                   string
//   -Unknown command\r\n      error
//   !42\r\n                   integer
//   [2\r\n#a\r\n#b\r\n]\r\n   array of two strings

use std::fmt;

use bytes::Buf;
use itertools::Itertools;
use std::io::Cursor;
use std::string::FromUtf8Error;
use thiserror::Error as ThisError;

static CRLF: &[u8; 2] = b"\r\n";

/// What a missing key looks like on the wire.
pub const NIL: &str = "(nil)";

#[derive(Debug, ThisError, PartialEq)]
pub enum Error {
    #[error("not enough data is available to parse an entire frame")]
    Incomplete,
    #[error("invalid frame data type: {0}")]
    InvalidDataType(u8),
    #[error("protocol error; invalid frame format")]
    InvalidFormat,
    #[error("protocol error; invalid integer")]
    InvalidInteger,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    Simple(String),
    Error(String),
    Integer(i64),
    Array(Vec<String>),
    Nil,
}

impl Frame {
    pub fn ok() -> Frame {
        Frame::Simple("OK".to_string())
    }

    pub fn parse(src: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        let first_byte = get_byte(src)?;
        let data_type = DataType::try_from(first_byte)?;

        match data_type {
            DataType::SimpleString => {
                let string = get_line(src)?;
                if string == NIL {
                    return Ok(Frame::Nil);
                }
                Ok(Frame::Simple(string))
            }
            DataType::SimpleError => Ok(Frame::Error(get_line(src)?)),
            DataType::Integer => {
                let integer = get_line(src)?
                    .parse::<i64>()
                    .map_err(|_| Error::InvalidInteger)?;

                Ok(Frame::Integer(integer))
            }
            // [<count>\r\n#<element-1>\r\n...#<element-n>\r\n]\r\n
            DataType::ArrayStart => {
                let count = get_line(src)?
                    .parse::<usize>()
                    .map_err(|_| Error::InvalidInteger)?;

                let mut elements = Vec::with_capacity(count);
                for _ in 0..count {
                    match DataType::try_from(get_byte(src)?)? {
                        DataType::ArrayElement => elements.push(get_line(src)?),
                        _ => return Err(Error::InvalidFormat),
                    }
                }

                match DataType::try_from(get_byte(src)?)? {
                    DataType::ArrayEnd => {
                        get_line(src)?;
                        Ok(Frame::Array(elements))
                    }
                    _ => Err(Error::InvalidFormat),
                }
            }
            DataType::ArrayElement | DataType::ArrayEnd => Err(Error::InvalidFormat),
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        match self {
            Frame::Simple(s) => line(DataType::SimpleString, s.as_bytes()),
            Frame::Error(s) => line(DataType::SimpleError, s.as_bytes()),
            Frame::Integer(i) => line(DataType::Integer, i.to_string().as_bytes()),
            Frame::Nil => line(DataType::SimpleString, NIL.as_bytes()),
            Frame::Array(elements) => {
                let mut bytes = line(DataType::ArrayStart, elements.len().to_string().as_bytes());
                for element in elements {
                    bytes.extend(line(DataType::ArrayElement, element.as_bytes()));
                }
                bytes.extend(line(DataType::ArrayEnd, b""));
                bytes
            }
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Simple(s) => write!(f, "+{}", s),
            Frame::Error(s) => write!(f, "-{}", s),
            Frame::Integer(i) => write!(f, "!{}", i),
            Frame::Nil => write!(f, "+{}", NIL),
            Frame::Array(elements) => write!(f, "[{}]", elements.iter().join(", ")),
        }
    }
}

fn line(data_type: DataType, content: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(1 + content.len() + CRLF.len());
    bytes.push(u8::from(data_type));
    bytes.extend_from_slice(content);
    bytes.extend_from_slice(CRLF);
    bytes
}

fn get_line(src: &mut Cursor<&[u8]>) -> Result<String, Error> {
    let start = src.position() as usize;
    let end = src.get_ref().len();

    let line_end = src.get_ref()[start..end]
        .windows(2)
        .position(|window| window == CRLF)
        .map(|index| start + index)
        .ok_or(Error::Incomplete)?;

    src.set_position((line_end + CRLF.len()) as u64);

    Ok(String::from_utf8(src.get_ref()[start..line_end].to_vec())?)
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
    Integer,      // '!'
    ArrayStart,   // '['
    ArrayElement, // '#'
    ArrayEnd,     // ']'
}

impl TryFrom<u8> for DataType {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            b'+' => Ok(Self::SimpleString),
            b'-' => Ok(Self::SimpleError),
            b'!' => Ok(Self::Integer),
            b'[' => Ok(Self::ArrayStart),
            b'#' => Ok(Self::ArrayElement),
            b']' => Ok(Self::ArrayEnd),
            _ => Err(Error::InvalidDataType(byte)),
        }
    }
}

impl From<DataType> for u8 {
    fn from(value: DataType) -> Self {
        match value {
            DataType::SimpleString => b'+',
            DataType::SimpleError => b'-',
            DataType::Integer => b'!',
            DataType::ArrayStart => b'[',
            DataType::ArrayElement => b'#',
            DataType::ArrayEnd => b']',
        }
    }
}

impl From<FromUtf8Error> for Error {
    fn from(_src: FromUtf8Error) -> Error {
        Error::InvalidFormat
    }
}
