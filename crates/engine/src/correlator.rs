//! Event correlation.
//!
//! Consumes a channel's inbound sequence and yields only the events
//! that belong to one job, classified by the backend. Binary frames
//! (previews) are skipped, unparsable frames are counted and skipped,
//! unrelated messages are discarded. The sequence is finite: it ends at
//! the first terminal event, or at channel closure if none arrives.

use fireside_channel::{Channel, ChannelMessage};

use crate::event::Event;

/// Correlates one channel's messages with one job.
///
/// The correlator only reads from the channel; closing it stays with
/// whoever opened it.
pub struct EventCorrelator<'a, C> {
    channel: &'a mut Channel,
    job_id: &'a str,
    classify: C,
    decode_errors: u64,
    done: bool,
}

impl<'a, C> EventCorrelator<'a, C>
where
    C: Fn(&serde_json::Value, &str) -> Event,
{
    pub fn new(channel: &'a mut Channel, job_id: &'a str, classify: C) -> Self {
        Self {
            channel,
            job_id,
            classify,
            decode_errors: 0,
            done: false,
        }
    }

    /// Next event belonging to the awaited job.
    ///
    /// Returns `None` when the channel closes before a terminal event,
    /// and forever after the first terminal event has been yielded —
    /// late or duplicate terminal messages for the same job are never
    /// surfaced twice.
    pub async fn next_event(&mut self) -> Option<Event> {
        if self.done {
            return None;
        }

        while let Some(message) = self.channel.recv().await {
            let text = match message {
                ChannelMessage::Text(text) => text,
                ChannelMessage::Binary(data) => {
                    // Previews are binary data; status messages are not.
                    tracing::trace!(
                        job_id = self.job_id,
                        len = data.len(),
                        "Skipping binary frame",
                    );
                    continue;
                }
            };

            let value: serde_json::Value = match serde_json::from_str(&text) {
                Ok(value) => value,
                Err(e) => {
                    self.decode_errors += 1;
                    tracing::warn!(
                        job_id = self.job_id,
                        error = %e,
                        "Failed to parse channel message",
                    );
                    continue;
                }
            };

            match (self.classify)(&value, self.job_id) {
                Event::Unrelated => continue,
                event => {
                    if event.is_terminal() {
                        self.done = true;
                    }
                    return Some(event);
                }
            }
        }

        self.done = true;
        None
    }

    /// How many inbound frames failed to parse. Non-fatal by contract,
    /// but callers may want to log the total.
    pub fn decode_errors(&self) -> u64 {
        self.decode_errors
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use fireside_channel::memory;
    use serde_json::json;

    use super::*;

    /// Test classifier for a story-like protocol: `status` drives the
    /// kind, `id` is the correlation field.
    fn classify(message: &serde_json::Value, job_id: &str) -> Event {
        if message["id"].as_str() != Some(job_id) {
            return Event::Unrelated;
        }
        match message["status"].as_str() {
            Some("complete") => Event::TerminalSuccess {
                job_id: job_id.to_string(),
                payload: message.clone(),
            },
            Some("error") => Event::TerminalError {
                job_id: job_id.to_string(),
                message: message["message"].as_str().unwrap_or("unknown").to_string(),
            },
            _ => Event::Progress {
                job_id: job_id.to_string(),
                payload: message.clone(),
            },
        }
    }

    #[tokio::test]
    async fn yields_progress_then_terminal_and_stops() {
        let (mut channel, remote) = memory::pair();
        remote
            .send_text(json!({"id": "j1", "status": "working"}).to_string())
            .await;
        remote
            .send_text(json!({"id": "j1", "status": "complete"}).to_string())
            .await;
        remote
            .send_text(json!({"id": "j1", "status": "complete"}).to_string())
            .await;

        let mut correlator = EventCorrelator::new(&mut channel, "j1", classify);

        assert_matches!(correlator.next_event().await, Some(Event::Progress { .. }));
        assert_matches!(
            correlator.next_event().await,
            Some(Event::TerminalSuccess { .. })
        );
        // Terminal is sticky: the duplicate terminal is never surfaced.
        assert!(correlator.next_event().await.is_none());
    }

    #[tokio::test]
    async fn discards_unrelated_and_unparsable_messages() {
        let (mut channel, remote) = memory::pair();
        remote
            .send_text(json!({"id": "other", "status": "complete"}).to_string())
            .await;
        remote.send_text("not json at all").await;
        remote.send_binary(vec![1, 2, 3]).await;
        remote
            .send_text(json!({"id": "j1", "status": "complete"}).to_string())
            .await;

        let mut correlator = EventCorrelator::new(&mut channel, "j1", classify);

        assert_matches!(
            correlator.next_event().await,
            Some(Event::TerminalSuccess { .. })
        );
        assert_eq!(correlator.decode_errors(), 1);
    }

    #[tokio::test]
    async fn channel_closure_ends_the_sequence() {
        let (mut channel, mut remote) = memory::pair();
        remote
            .send_text(json!({"id": "j1", "status": "working"}).to_string())
            .await;
        remote.finish();

        let mut correlator = EventCorrelator::new(&mut channel, "j1", classify);

        assert_matches!(correlator.next_event().await, Some(Event::Progress { .. }));
        assert!(correlator.next_event().await.is_none());
        // The sequence is not restartable.
        assert!(correlator.next_event().await.is_none());
    }

    #[tokio::test]
    async fn terminal_error_carries_the_message() {
        let (mut channel, remote) = memory::pair();
        remote
            .send_text(json!({"id": "j1", "status": "error", "message": "OOM"}).to_string())
            .await;

        let mut correlator = EventCorrelator::new(&mut channel, "j1", classify);

        assert_matches!(
            correlator.next_event().await,
            Some(Event::TerminalError { message, .. }) if message == "OOM"
        );
    }
}
