//! The backend seam.
//!
//! Each generation protocol implements [`JobBackend`]: how to start
//! work, how to recognize its own events on the channel, and how to
//! turn a terminal event into concrete artifacts. The orchestrator is
//! generic over this trait and owns everything else.

use async_trait::async_trait;
use fireside_core::error::{FetchError, SubmitError};
use fireside_core::types::JobId;

use crate::artifact::ArtifactMap;
use crate::event::Event;

/// An accepted submission: the backend's correlation id plus the
/// channel endpoint that will deliver this job's events.
#[derive(Debug, Clone)]
pub struct Submission {
    pub job_id: JobId,
    /// WebSocket endpoint to subscribe to for this job.
    pub channel_endpoint: String,
}

/// One generation protocol.
#[async_trait]
pub trait JobBackend: Send + Sync {
    /// Request payload that starts a job on this backend.
    type Payload: Send + Sync;

    /// Backend name for logs.
    fn name(&self) -> &'static str;

    /// Start backend work via a single request/response call,
    /// independent of the event channel.
    async fn submit(&self, payload: &Self::Payload) -> Result<Submission, SubmitError>;

    /// Classify one decoded channel message with respect to `job_id`.
    ///
    /// Messages that carry a different correlation id, or none where
    /// one is required, classify as [`Event::Unrelated`].
    fn classify(&self, message: &serde_json::Value, job_id: &str) -> Event;

    /// Materialize the artifacts named by a terminal-success payload.
    ///
    /// Backends whose terminal event embeds the result implement this
    /// as a pure decode with no I/O; others issue the follow-up
    /// requests here.
    async fn fetch(
        &self,
        job_id: &str,
        terminal: &serde_json::Value,
    ) -> Result<ArtifactMap, FetchError>;
}
