//! Job identity and status lifecycle.
//!
//! A [`Job`] is created when a backend accepts a submission and returns
//! its correlation id. Status moves only forward: once a terminal status
//! is reached, further transitions are rejected so that late or
//! duplicate terminal events cannot flip an outcome.

use serde::Serialize;

use crate::types::{JobId, Timestamp};

/// Lifecycle status of a submitted job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Accepted by the backend, no event observed yet.
    Pending,
    /// At least one progress event has been observed.
    Running,
    /// Terminal: all artifacts resolved.
    Succeeded,
    /// Terminal: the backend reported an error, the channel was lost,
    /// or an artifact fetch failed.
    Failed,
    /// Terminal: the caller cancelled before a terminal event.
    Cancelled,
}

impl JobStatus {
    /// Whether this status is terminal (no further transitions).
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Succeeded | JobStatus::Failed | JobStatus::Cancelled
        )
    }
}

/// A single submitted generation job.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    /// Backend-assigned correlation id.
    pub job_id: JobId,
    /// When the submission was accepted (UTC).
    pub submitted_at: Timestamp,
    /// Current lifecycle status.
    pub status: JobStatus,
}

impl Job {
    /// Create a freshly submitted job in [`JobStatus::Pending`].
    pub fn new(job_id: impl Into<JobId>) -> Self {
        Self {
            job_id: job_id.into(),
            submitted_at: chrono::Utc::now(),
            status: JobStatus::Pending,
        }
    }

    /// Advance the job's status.
    ///
    /// Returns `false` without changing anything when the job is already
    /// terminal. Late or duplicate terminal events are expected on a
    /// shared channel and must not be treated as errors.
    pub fn advance(&mut self, next: JobStatus) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_job_is_pending() {
        let job = Job::new("abc");
        assert_eq!(job.job_id, "abc");
        assert_eq!(job.status, JobStatus::Pending);
    }

    #[test]
    fn pending_advances_to_running_and_succeeded() {
        let mut job = Job::new("abc");
        assert!(job.advance(JobStatus::Running));
        assert!(job.advance(JobStatus::Succeeded));
        assert_eq!(job.status, JobStatus::Succeeded);
    }

    #[test]
    fn terminal_status_is_sticky() {
        let mut job = Job::new("abc");
        assert!(job.advance(JobStatus::Failed));
        // A late success must not flip the outcome.
        assert!(!job.advance(JobStatus::Succeeded));
        assert_eq!(job.status, JobStatus::Failed);
    }

    #[test]
    fn cancelled_is_terminal() {
        let mut job = Job::new("abc");
        assert!(job.advance(JobStatus::Cancelled));
        assert!(!job.advance(JobStatus::Running));
        assert_eq!(job.status, JobStatus::Cancelled);
    }

    #[test]
    fn terminal_statuses_report_terminal() {
        assert!(JobStatus::Succeeded.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
    }
}
