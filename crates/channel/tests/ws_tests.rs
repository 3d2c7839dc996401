//! Socket-level tests for the WebSocket channel.
//!
//! Exercises [`Channel`] against a real listener: connect failure,
//! bidirectional frames, and sequence termination on peer close.

use fireside_channel::{Channel, ChannelMessage};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

// ---------------------------------------------------------------------------
// Test: connect failure
// ---------------------------------------------------------------------------

/// Opening a channel to a refused endpoint reports a connect error
/// instead of hanging or panicking.
#[tokio::test]
async fn open_fails_on_unreachable_endpoint() {
    let result = Channel::open("ws://127.0.0.1:1/ws").await;
    assert!(result.is_err());
}

// ---------------------------------------------------------------------------
// Test: round trip
// ---------------------------------------------------------------------------

/// A full exchange against a local server: the channel's outbound frame
/// reaches the server, inbound frames arrive in order, and the sequence
/// ends when the server closes.
#[tokio::test]
async fn round_trip_against_a_local_server() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let mut ws = tokio_tungstenite::accept_async(stream)
            .await
            .expect("handshake");

        // Echo the client's first frame, then send one of our own.
        let frame = ws.next().await.expect("client frame").expect("client frame");
        ws.send(frame).await.expect("echo");
        ws.send(Message::Text(r#"{"status":"complete"}"#.to_string()))
            .await
            .expect("server frame");
        ws.close(None).await.ok();
    });

    let mut channel = Channel::open(&format!("ws://{addr}"))
        .await
        .expect("open should succeed");
    channel
        .send(r#"{"hello":true}"#)
        .await
        .expect("send should succeed");

    assert_eq!(
        channel.recv().await,
        Some(ChannelMessage::Text(r#"{"hello":true}"#.into()))
    );
    assert_eq!(
        channel.recv().await,
        Some(ChannelMessage::Text(r#"{"status":"complete"}"#.into()))
    );
    assert_eq!(channel.recv().await, None);

    server.await.expect("server task");
}
