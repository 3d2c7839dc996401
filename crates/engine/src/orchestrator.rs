//! Job orchestration.
//!
//! [`JobOrchestrator`] composes submit, channel open, event
//! correlation, and artifact fetching into one call. The lifecycle is
//! an explicit state machine
//! (`Idle → Submitting → AwaitingEvents → Fetching → Done → Closed`)
//! driven by a single consumer task, with the progress callback and the
//! terminal resolution as two distinct, ordered side effects of state
//! transitions. The channel is closed exactly once on every exit path.

use fireside_channel::Channel;
use fireside_core::job::{Job, JobStatus};
use fireside_core::types::JobId;
use tokio_util::sync::CancellationToken;

use crate::artifact::ArtifactMap;
use crate::backend::JobBackend;
use crate::connector::{Connector, WsConnector};
use crate::correlator::EventCorrelator;
use crate::error::JobError;
use crate::event::Event;

/// Progress record handed to the caller's callback.
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub job_id: JobId,
    /// Backend-specific progress fields, as delivered by the event.
    pub payload: serde_json::Value,
}

type ProgressCallback = Box<dyn FnMut(ProgressUpdate) + Send>;

/// Orchestrator lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Submitting,
    AwaitingEvents,
    Fetching,
    Done,
    Closed,
}

/// Runs one job against one backend.
///
/// Single-use: [`run`](Self::run) consumes the orchestrator, so
/// re-running requires a new instance. Many orchestrators may run
/// concurrently; each owns its own channel and job id, so they never
/// contend.
pub struct JobOrchestrator<B, C = WsConnector> {
    backend: B,
    connector: C,
    cancel: CancellationToken,
    on_progress: Option<ProgressCallback>,
}

impl<B: JobBackend> JobOrchestrator<B, WsConnector> {
    /// Orchestrator opening one WebSocket connection per job.
    pub fn new(backend: B) -> Self {
        Self::with_connector(backend, WsConnector)
    }
}

impl<B: JobBackend, C: Connector> JobOrchestrator<B, C> {
    /// Orchestrator with an explicit channel opener.
    pub fn with_connector(backend: B, connector: C) -> Self {
        Self {
            backend,
            connector,
            cancel: CancellationToken::new(),
            on_progress: None,
        }
    }

    /// Register a progress callback, invoked synchronously for every
    /// progress event observed before the terminal event. Progress
    /// already delivered is never retracted.
    pub fn on_progress(
        mut self,
        callback: impl FnMut(ProgressUpdate) + Send + 'static,
    ) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    /// Handle for cancelling this job.
    ///
    /// Cancelling resolves the job as [`JobError::Cancelled`] and
    /// closes its channel through the normal close path. An in-flight
    /// submission or fetch completes or fails, but its result is
    /// discarded.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Submit the payload, await its events, fetch its artifacts.
    ///
    /// Resolves with the job's artifact mapping or a single error. No
    /// timeout is enforced here; a backend that never sends a terminal
    /// event leaves the job pending until the caller cancels.
    pub async fn run(self, payload: &B::Payload) -> Result<ArtifactMap, JobError> {
        let Self {
            backend,
            connector,
            cancel,
            mut on_progress,
        } = self;

        let mut state = RunState::Submitting;
        tracing::debug!(backend = backend.name(), state = ?state, "Job run starting");

        let submission = match backend.submit(payload).await {
            Ok(submission) => submission,
            Err(e) => {
                // Failed before the channel was ever opened.
                tracing::warn!(backend = backend.name(), error = %e, "Submission failed");
                return Err(e.into());
            }
        };

        let mut job = Job::new(submission.job_id.clone());
        tracing::info!(
            backend = backend.name(),
            job_id = %job.job_id,
            "Job submitted",
        );

        if cancel.is_cancelled() {
            job.advance(JobStatus::Cancelled);
            return Err(JobError::Cancelled);
        }

        let mut channel = match connector.connect(&submission.channel_endpoint).await {
            Ok(channel) => channel,
            Err(e) => {
                tracing::warn!(
                    job_id = %job.job_id,
                    endpoint = %submission.channel_endpoint,
                    error = %e,
                    "Channel open failed",
                );
                job.advance(JobStatus::Failed);
                return Err(e.into());
            }
        };

        state = RunState::AwaitingEvents;
        tracing::debug!(job_id = %job.job_id, state = ?state, "Awaiting events");

        let result = drive(
            &backend,
            &mut channel,
            &mut job,
            &cancel,
            &mut on_progress,
            &mut state,
        )
        .await;

        state = RunState::Done;
        match &result {
            Ok(artifacts) => tracing::info!(
                job_id = %job.job_id,
                state = ?state,
                outputs = artifacts.len(),
                "Job succeeded",
            ),
            Err(e) => tracing::warn!(
                job_id = %job.job_id,
                state = ?state,
                error = %e,
                "Job failed",
            ),
        }

        // The single close site: every path through `drive` funnels
        // here, so the channel is released exactly once even when a
        // cancel races a terminal event.
        channel.close();
        state = RunState::Closed;
        tracing::debug!(job_id = %job.job_id, state = ?state, "Channel released");

        result
    }
}

/// Await events until terminal, then fetch artifacts.
///
/// Never closes the channel; the caller owns that.
async fn drive<B: JobBackend>(
    backend: &B,
    channel: &mut Channel,
    job: &mut Job,
    cancel: &CancellationToken,
    on_progress: &mut Option<ProgressCallback>,
    state: &mut RunState,
) -> Result<ArtifactMap, JobError> {
    let job_id = job.job_id.clone();
    let mut correlator =
        EventCorrelator::new(channel, &job_id, |message, id| backend.classify(message, id));

    let terminal_payload = loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                job.advance(JobStatus::Cancelled);
                tracing::info!(job_id = %job_id, "Job cancelled by caller");
                return Err(JobError::Cancelled);
            }
            event = correlator.next_event() => match event {
                Some(Event::Progress { payload, .. }) => {
                    job.advance(JobStatus::Running);
                    if let Some(callback) = on_progress.as_mut() {
                        callback(ProgressUpdate {
                            job_id: job_id.clone(),
                            payload,
                        });
                    }
                }
                Some(Event::TerminalSuccess { payload, .. }) => break payload,
                Some(Event::TerminalError { message, .. }) => {
                    job.advance(JobStatus::Failed);
                    return Err(JobError::Terminal(message));
                }
                Some(Event::Unrelated) => {}
                None => {
                    job.advance(JobStatus::Failed);
                    if correlator.decode_errors() > 0 {
                        tracing::warn!(
                            job_id = %job_id,
                            decode_errors = correlator.decode_errors(),
                            "Channel closed; some messages were unparsable",
                        );
                    }
                    return Err(JobError::ConnectionLost);
                }
            }
        }
    };

    *state = RunState::Fetching;
    tracing::debug!(job_id = %job_id, state = ?state, "Fetching artifacts");

    let artifacts = match backend.fetch(&job_id, &terminal_payload).await {
        Ok(artifacts) => artifacts,
        Err(e) => {
            job.advance(JobStatus::Failed);
            return Err(e.into());
        }
    };

    // A fetch racing cancellation completes, but its result is discarded.
    if cancel.is_cancelled() {
        job.advance(JobStatus::Cancelled);
        return Err(JobError::Cancelled);
    }

    job.advance(JobStatus::Succeeded);
    Ok(artifacts)
}
