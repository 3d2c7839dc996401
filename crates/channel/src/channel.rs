//! WebSocket-backed message channel.
//!
//! [`Channel::open`] establishes the connection and spawns a pump task
//! that owns the socket. The handle reads inbound frames through a
//! bounded buffer and forwards outbound text frames to the pump.

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

/// Inbound frames the pump buffers while the connection is open. Sized
/// so a burst of status messages racing a close request is not dropped.
const INBOUND_BUFFER: usize = 64;

/// Outbound frames queued towards the pump.
const OUTBOUND_BUFFER: usize = 16;

/// An inbound frame delivered by the channel.
///
/// Binary frames (e.g. preview images on the image protocol) are passed
/// through untouched; the consumer decides whether to skip them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelMessage {
    Text(String),
    Binary(Vec<u8>),
}

/// Errors from the transport channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// Failed to establish the initial WebSocket connection.
    #[error("Connection error: {0}")]
    Connect(String),

    /// The channel is closed and can no longer carry outbound messages.
    #[error("Channel closed")]
    Closed,
}

/// One persistent full-duplex connection to a backend.
///
/// Exactly one underlying WebSocket connection exists per [`open`]
/// call. The handle is single-consumer: whoever holds it reads the
/// inbound sequence and is the only party allowed to close it.
///
/// [`open`]: Channel::open
pub struct Channel {
    inbound: mpsc::Receiver<ChannelMessage>,
    outbound: mpsc::Sender<String>,
    shutdown: CancellationToken,
    closed: bool,
}

impl Channel {
    /// Connect to a WebSocket endpoint.
    ///
    /// Spawns a pump task that owns the socket for the lifetime of the
    /// connection.
    pub async fn open(endpoint: &str) -> Result<Self, ChannelError> {
        let (ws_stream, _response) = connect_async(endpoint).await.map_err(|e| {
            ChannelError::Connect(format!("Failed to connect to {endpoint}: {e}"))
        })?;

        tracing::info!(endpoint, "Channel connected");

        let (inbound_tx, inbound) = mpsc::channel(INBOUND_BUFFER);
        let (outbound, outbound_rx) = mpsc::channel(OUTBOUND_BUFFER);
        let shutdown = CancellationToken::new();

        tokio::spawn(pump(ws_stream, inbound_tx, outbound_rx, shutdown.clone()));

        Ok(Self {
            inbound,
            outbound,
            shutdown,
            closed: false,
        })
    }

    /// Queue an outbound text message.
    pub async fn send(&self, text: impl Into<String>) -> Result<(), ChannelError> {
        self.outbound
            .send(text.into())
            .await
            .map_err(|_| ChannelError::Closed)
    }

    /// Receive the next inbound message.
    ///
    /// Returns `None` once the connection has ended and every buffered
    /// message has been drained. Messages buffered before a close
    /// request are still delivered.
    pub async fn recv(&mut self) -> Option<ChannelMessage> {
        self.inbound.recv().await
    }

    /// Request the channel to close.
    ///
    /// Idempotent and safe from any code path. The pump sends a Close
    /// frame and tears the connection down; already-buffered inbound
    /// messages remain readable via [`recv`](Self::recv).
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        tracing::debug!("Channel close requested");
        self.shutdown.cancel();
    }

    /// Assemble a channel from raw parts (in-memory pairs, tests).
    #[cfg(any(test, feature = "test-util"))]
    pub(crate) fn from_parts(
        inbound: mpsc::Receiver<ChannelMessage>,
        outbound: mpsc::Sender<String>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            inbound,
            outbound,
            shutdown,
            closed: false,
        }
    }
}

impl Drop for Channel {
    fn drop(&mut self) {
        self.close();
    }
}

/// Socket pump: forwards inbound frames into the buffer and outbound
/// text onto the wire until the peer closes, an error occurs, or a
/// close is requested.
async fn pump(
    mut ws_stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    inbound: mpsc::Sender<ChannelMessage>,
    mut outbound: mpsc::Receiver<String>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                let _ = ws_stream.send(Message::Close(None)).await;
                tracing::debug!("Channel closed by local request");
                break;
            }
            out = outbound.recv() => {
                // None means the handle is gone; nothing left to write.
                let Some(text) = out else { break };
                if let Err(e) = ws_stream.send(Message::Text(text)).await {
                    tracing::error!(error = %e, "WebSocket send error");
                    break;
                }
            }
            frame = ws_stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if inbound.send(ChannelMessage::Text(text)).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Binary(data))) => {
                    if inbound.send(ChannelMessage::Binary(data)).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                    // Handled automatically by tungstenite.
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!(?frame, "WebSocket closed by peer");
                    break;
                }
                Some(Ok(Message::Frame(_))) => {}
                Some(Err(e)) => {
                    tracing::error!(error = %e, "WebSocket receive error");
                    break;
                }
                None => break,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory;

    #[tokio::test]
    async fn recv_delivers_text_and_binary_frames() {
        let (mut channel, remote) = memory::pair();

        remote.send_text(r#"{"type":"status"}"#).await;
        remote.send_binary(vec![0xde, 0xad]).await;

        assert_eq!(
            channel.recv().await,
            Some(ChannelMessage::Text(r#"{"type":"status"}"#.into()))
        );
        assert_eq!(
            channel.recv().await,
            Some(ChannelMessage::Binary(vec![0xde, 0xad]))
        );
    }

    #[tokio::test]
    async fn buffered_messages_survive_a_close_request() {
        let (mut channel, remote) = memory::pair();

        remote.send_text("first").await;
        remote.send_text("second").await;
        channel.close();

        // Deliver-then-stop: both buffered frames drain after close.
        assert_eq!(channel.recv().await, Some(ChannelMessage::Text("first".into())));
        assert_eq!(channel.recv().await, Some(ChannelMessage::Text("second".into())));
    }

    #[tokio::test]
    async fn recv_ends_after_peer_close() {
        let (mut channel, mut remote) = memory::pair();

        remote.send_text("only").await;
        remote.finish();

        assert_eq!(channel.recv().await, Some(ChannelMessage::Text("only".into())));
        assert_eq!(channel.recv().await, None);
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let (mut channel, remote) = memory::pair();

        channel.close();
        channel.close();
        channel.close();

        remote.wait_closed().await;
        assert_eq!(remote.close_count(), 1);
    }

    #[tokio::test]
    async fn drop_closes_the_channel() {
        let (channel, remote) = memory::pair();

        drop(channel);

        remote.wait_closed().await;
        assert_eq!(remote.close_count(), 1);
    }

    #[tokio::test]
    async fn send_reaches_the_remote_end() {
        let (channel, mut remote) = memory::pair();

        channel.send("hello").await.expect("send should succeed");
        assert_eq!(remote.recv_outbound().await.as_deref(), Some("hello"));
    }
}
