// Wire layout of a single message:
//
//   +----------------+-------------+-------------------+
//   | length: i32 BE | version: u8 | payload: [u8; len] |
//   +----------------+-------------+-------------------+
//
// `length` counts payload bytes only.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error as ThisError;
use tokio_util::codec::{Decoder, Encoder};

/// Protocol version this server speaks. Frames carrying any other version are rejected.
pub const PROTOCOL_VERSION: u8 = 0x01;

/// Largest payload accepted or produced, 10 MiB.
pub const MAX_MESSAGE_SIZE: usize = 10 * 1024 * 1024;

const LENGTH_SIZE: usize = 4;
const HEADER_SIZE: usize = LENGTH_SIZE + 1;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("unsupported protocol version {actual:#04x}, expected {expected:#04x}")]
    UnsupportedVersion { expected: u8, actual: u8 },
    #[error("invalid message length: {0}")]
    InvalidLength(i32),
    #[error("message too large: {0} bytes")]
    MessageTooLarge(usize),
    #[error("connection closed in the middle of a message")]
    Truncated,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Splits a byte stream into length-delimited payloads and back.
#[derive(Debug, Clone, Copy)]
pub struct MessageCodec {
    version: u8,
}

impl MessageCodec {
    pub fn new() -> MessageCodec {
        MessageCodec {
            version: PROTOCOL_VERSION,
        }
    }

    /// A codec that stamps and expects a different version byte. Mostly useful to exercise
    /// the server's version check.
    pub fn with_version(version: u8) -> MessageCodec {
        MessageCodec { version }
    }
}

impl Default for MessageCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for MessageCodec {
    type Item = Bytes;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < HEADER_SIZE {
            return Ok(None);
        }

        // Peek at the header first, nothing is consumed until the whole message is buffered.
        let mut header = &src[..HEADER_SIZE];
        let length = header.get_i32();
        let version = header.get_u8();

        if version != self.version {
            return Err(Error::UnsupportedVersion {
                expected: self.version,
                actual: version,
            });
        }

        if length <= 0 {
            return Err(Error::InvalidLength(length));
        }

        let length = length as usize;
        if length > MAX_MESSAGE_SIZE {
            return Err(Error::MessageTooLarge(length));
        }

        if src.len() < HEADER_SIZE + length {
            src.reserve(HEADER_SIZE + length - src.len());
            return Ok(None);
        }

        src.advance(HEADER_SIZE);
        Ok(Some(src.split_to(length).freeze()))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(message) => Ok(Some(message)),
            // A partial header at end of stream is a clean close.
            None if src.len() < HEADER_SIZE => {
                src.clear();
                Ok(None)
            }
            None => Err(Error::Truncated),
        }
    }
}

impl<T: AsRef<[u8]>> Encoder<T> for MessageCodec {
    type Error = Error;

    fn encode(&mut self, payload: T, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let payload = payload.as_ref();

        if payload.len() > MAX_MESSAGE_SIZE {
            return Err(Error::MessageTooLarge(payload.len()));
        }

        dst.reserve(HEADER_SIZE + payload.len());
        dst.put_i32(payload.len() as i32);
        dst.put_u8(self.version);
        dst.extend_from_slice(payload);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn framed(payload: &[u8]) -> BytesMut {
        let mut buf = BytesMut::new();
        MessageCodec::new().encode(payload, &mut buf).unwrap();
        buf
    }

    #[test]
    fn encode_layout() {
        let buf = framed(b"PING");

        assert_eq!(&buf[..], &[0, 0, 0, 4, PROTOCOL_VERSION, b'P', b'I', b'N', b'G']);
    }

    #[test]
    fn decode_single_message() {
        let mut buf = framed(b"GET key");

        let message = MessageCodec::new().decode(&mut buf).unwrap();

        assert_eq!(message, Some(Bytes::from("GET key")));
        assert!(buf.is_empty());
    }

    #[test]
    fn decode_back_to_back_messages() {
        let mut buf = framed(b"SET a 1");
        buf.extend_from_slice(&framed(b"GET a"));
        let mut codec = MessageCodec::new();

        assert_eq!(codec.decode(&mut buf).unwrap(), Some(Bytes::from("SET a 1")));
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(Bytes::from("GET a")));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn decode_partial_payload_waits_for_more() {
        let full = framed(b"hello world");
        let mut buf = BytesMut::from(&full[..8]);
        let mut codec = MessageCodec::new();

        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        assert_eq!(buf.len(), 8);

        buf.extend_from_slice(&full[8..]);
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(Bytes::from("hello world"))
        );
    }

    #[test]
    fn decode_partial_header_at_eof_is_clean_close() {
        let mut buf = BytesMut::from(&[0u8, 0, 0][..]);

        let message = MessageCodec::new().decode_eof(&mut buf).unwrap();

        assert_eq!(message, None);
    }

    #[test]
    fn decode_partial_payload_at_eof_is_an_error() {
        let full = framed(b"hello");
        let mut buf = BytesMut::from(&full[..7]);

        let err = MessageCodec::new().decode_eof(&mut buf).unwrap_err();

        assert!(matches!(err, Error::Truncated));
    }

    #[test]
    fn reject_wrong_version_before_payload_arrives() {
        // Header only, the payload has not been received yet.
        let mut buf = BytesMut::from(&[0u8, 0, 0, 10, 0x02][..]);

        let err = MessageCodec::new().decode(&mut buf).unwrap_err();

        assert!(matches!(
            err,
            Error::UnsupportedVersion {
                expected: PROTOCOL_VERSION,
                actual: 0x02
            }
        ));
    }

    #[test]
    fn reject_non_positive_length() {
        let mut buf = BytesMut::new();
        buf.put_i32(0);
        buf.put_u8(PROTOCOL_VERSION);

        let err = MessageCodec::new().decode(&mut buf).unwrap_err();
        assert!(matches!(err, Error::InvalidLength(0)));

        let mut buf = BytesMut::new();
        buf.put_i32(-5);
        buf.put_u8(PROTOCOL_VERSION);

        let err = MessageCodec::new().decode(&mut buf).unwrap_err();
        assert!(matches!(err, Error::InvalidLength(-5)));
    }

    #[test]
    fn reject_oversized_length() {
        let mut buf = BytesMut::new();
        buf.put_i32(MAX_MESSAGE_SIZE as i32 + 1);
        buf.put_u8(PROTOCOL_VERSION);

        let err = MessageCodec::new().decode(&mut buf).unwrap_err();

        assert!(matches!(err, Error::MessageTooLarge(n) if n == MAX_MESSAGE_SIZE + 1));
    }

    #[test]
    fn encode_rejects_oversized_payload() {
        let payload = vec![b'x'; MAX_MESSAGE_SIZE + 1];
        let mut buf = BytesMut::new();

        let err = MessageCodec::new().encode(&payload, &mut buf).unwrap_err();

        assert!(matches!(err, Error::MessageTooLarge(_)));
        assert!(buf.is_empty());
    }

    #[test]
    fn max_size_payload_round_trips() {
        let payload = vec![b'x'; MAX_MESSAGE_SIZE];
        let mut buf = framed(&payload);

        let message = MessageCodec::new().decode(&mut buf).unwrap().unwrap();

        assert_eq!(message.len(), MAX_MESSAGE_SIZE);
    }
}
