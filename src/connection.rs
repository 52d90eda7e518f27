use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use uuid::Uuid;

use crate::codec::{self, MessageCodec};
use crate::frame::Frame;

/// One TCP peer speaking the length-prefixed message protocol. Used by the server for each
/// accepted client and by anything that wants to talk to the server.
pub struct Connection {
    pub id: Uuid,
    pub client_address: Option<SocketAddr>,
    framed: Framed<TcpStream, MessageCodec>,
}

impl Connection {
    pub fn new(stream: TcpStream) -> Connection {
        let client_address = stream.peer_addr().ok();

        Connection {
            id: Uuid::new_v4(),
            client_address,
            framed: Framed::new(stream, MessageCodec::new()),
        }
    }

    /// Reads the next message payload. `Ok(None)` means the peer closed the connection
    /// between messages.
    pub async fn read_message(&mut self) -> Result<Option<Bytes>, codec::Error> {
        self.framed.next().await.transpose()
    }

    pub async fn write_message(&mut self, payload: &[u8]) -> Result<(), codec::Error> {
        self.framed.send(payload).await
    }

    pub async fn write_frame(&mut self, frame: &Frame) -> Result<(), codec::Error> {
        self.write_message(&frame.serialize()).await
    }
}
