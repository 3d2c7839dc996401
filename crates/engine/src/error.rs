//! Job-level error taxonomy.

use fireside_channel::ChannelError;
use fireside_core::error::{FetchError, SubmitError};

/// The single error value a caller receives when a job fails.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// The event channel could not be opened.
    #[error(transparent)]
    Connect(#[from] ChannelError),

    /// Job creation was rejected, or the submit call itself failed.
    #[error(transparent)]
    Submit(#[from] SubmitError),

    /// The channel closed or erred before a terminal event arrived.
    /// Distinct from an explicit backend failure report.
    #[error("Connection lost before a terminal event")]
    ConnectionLost,

    /// The backend explicitly reported failure.
    #[error("Generation failed: {0}")]
    Terminal(String),

    /// An artifact named by the terminal event could not be retrieved.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The caller cancelled the job before a terminal event.
    #[error("Job cancelled")]
    Cancelled,
}
