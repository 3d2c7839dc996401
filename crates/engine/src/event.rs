//! Classified channel events.
//!
//! Backends receive raw JSON messages and classify each one with
//! respect to the job being awaited. The engine only ever reacts to the
//! four kinds below; everything backend-specific stays in the opaque
//! payload.

use fireside_core::types::JobId;

/// One inbound message, classified for a specific job.
#[derive(Debug, Clone)]
pub enum Event {
    /// Non-terminal progress for the awaited job.
    Progress {
        job_id: JobId,
        /// Backend-specific progress fields (chapter index, percentage,
        /// current node, ...).
        payload: serde_json::Value,
    },

    /// The job finished; the payload names the result artifacts or
    /// carries them inline.
    TerminalSuccess {
        job_id: JobId,
        payload: serde_json::Value,
    },

    /// The backend explicitly reported failure.
    TerminalError {
        job_id: JobId,
        /// Human-readable failure description.
        message: String,
    },

    /// A message for some other job, or an ignorable broadcast.
    Unrelated,
}

impl Event {
    /// Whether this event ends the job (success or error).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Event::TerminalSuccess { .. } | Event::TerminalError { .. }
        )
    }
}
