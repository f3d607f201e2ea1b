//! WebSocket relay link.
//!
//! Internal module for the raw connection to the broadcast relay.
//!
//! # Frame Handling Invariants
//!
//! - Strict 1:1 mapping: one WS binary message = one protocol frame
//! - No buffering, no message combining or splitting
//! - Each `send_frame()` = exactly one `ws.send(Binary(...))`
//! - Each `recv_frame()` = exactly one binary message off the stream

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async, tungstenite::protocol::Message as WsMessage, MaybeTlsStream, WebSocketStream,
};

use crate::error::TransportError;

/// Internal WebSocket link to the relay.
///
/// Does not implement `Clone` to prevent socket duplication.
pub(crate) struct RelayLink {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl RelayLink {
    /// Connect to the relay server.
    pub async fn connect(url: &str) -> Result<Self, TransportError> {
        let (ws, _response) = connect_async(url)
            .await
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
        Ok(Self { ws })
    }

    /// Send one frame as one binary message.
    pub async fn send_frame(&mut self, frame: Vec<u8>) -> Result<(), TransportError> {
        self.ws
            .send(WsMessage::Binary(frame))
            .await
            .map_err(|e| TransportError::WebSocket(e.to_string()))
    }

    /// Receive the next binary message.
    ///
    /// Text, ping and pong frames carry no protocol meaning and are skipped.
    pub async fn recv_frame(&mut self) -> Result<Vec<u8>, TransportError> {
        loop {
            match self.ws.next().await {
                Some(Ok(WsMessage::Binary(data))) => return Ok(data),
                Some(Ok(WsMessage::Close(_))) => return Err(TransportError::PeerDisconnected),
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(TransportError::WebSocket(e.to_string())),
                None => return Err(TransportError::PeerDisconnected),
            }
        }
    }

    /// Close the connection. Best effort.
    pub async fn close(&mut self) {
        let _ = self.ws.close(None).await;
    }
}
