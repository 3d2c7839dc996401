//! In-memory channel pair for tests.
//!
//! [`pair`] returns a [`Channel`] wired to a [`MemoryRemote`] instead of
//! a socket. The remote plays the backend: it injects inbound frames,
//! observes outbound frames, and records whether (and how often) the
//! channel side executed its close path.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::channel::{Channel, ChannelMessage};

/// Buffer sizes mirror the socket-backed channel closely enough for
/// drain-after-close tests.
const BUFFER: usize = 64;

/// The backend half of an in-memory channel pair.
pub struct MemoryRemote {
    inbound: Option<mpsc::Sender<ChannelMessage>>,
    outbound: mpsc::Receiver<String>,
    shutdown: CancellationToken,
}

/// Create a connected in-memory channel pair.
pub fn pair() -> (Channel, MemoryRemote) {
    let (inbound_tx, inbound_rx) = mpsc::channel(BUFFER);
    let (outbound_tx, outbound_rx) = mpsc::channel(BUFFER);
    let shutdown = CancellationToken::new();

    let channel = Channel::from_parts(inbound_rx, outbound_tx, shutdown.clone());
    let remote = MemoryRemote {
        inbound: Some(inbound_tx),
        outbound: outbound_rx,
        shutdown,
    };

    (channel, remote)
}

impl MemoryRemote {
    /// Inject an inbound text frame. Frames sent after the channel side
    /// stopped reading are silently dropped, like on a real socket.
    pub async fn send_text(&self, text: impl Into<String>) {
        if let Some(inbound) = &self.inbound {
            let _ = inbound.send(ChannelMessage::Text(text.into())).await;
        }
    }

    /// Inject an inbound binary frame (a preview, on the image protocol).
    pub async fn send_binary(&self, data: Vec<u8>) {
        if let Some(inbound) = &self.inbound {
            let _ = inbound.send(ChannelMessage::Binary(data)).await;
        }
    }

    /// End the inbound sequence, simulating an abnormal peer close.
    /// Already-buffered frames stay readable.
    pub fn finish(&mut self) {
        self.inbound = None;
    }

    /// Receive the next outbound text frame from the channel side.
    pub async fn recv_outbound(&mut self) -> Option<String> {
        self.outbound.recv().await
    }

    /// Whether the channel side has requested a close.
    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Wait until the channel side requests a close.
    pub async fn wait_closed(&self) {
        self.shutdown.cancelled().await;
    }

    /// How many times the channel side executed its close path.
    ///
    /// The channel's close guard collapses repeated requests into one
    /// execution, so this reads 1 once closed; a leaked channel reads 0.
    pub fn close_count(&self) -> usize {
        usize::from(self.shutdown.is_cancelled())
    }
}
