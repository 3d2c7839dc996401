//! Channel opening seam.

use async_trait::async_trait;
use fireside_channel::{Channel, ChannelError};

/// Opens the event channel for a submission.
///
/// Production code uses [`WsConnector`]; the engine's tests substitute
/// an in-memory implementation.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, endpoint: &str) -> Result<Channel, ChannelError>;
}

/// Opens one WebSocket connection per job.
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, endpoint: &str) -> Result<Channel, ChannelError> {
        Channel::open(endpoint).await
    }
}
