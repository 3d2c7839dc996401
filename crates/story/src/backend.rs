//! Story job backend.
//!
//! The progress channel is opened per story id, so every snapshot on it
//! belongs to the awaited job unless it explicitly names another one.
//! Terminal snapshots embed the result, making `fetch` a pure decode.

use async_trait::async_trait;
use fireside_core::error::{FetchError, SubmitError};
use fireside_engine::{Artifact, ArtifactMap, Event, JobBackend, Submission};

use crate::api::{StoryApi, StoryApiError};
use crate::messages::parse_snapshot;

/// Parameters for one story generation.
#[derive(Debug, Clone)]
pub struct StoryRequest {
    pub model: String,
    pub subject: String,
    pub chapter_count: u32,
}

/// Story-generation backend for one bridge instance.
pub struct StoryBackend {
    api: StoryApi,
    ws_url: String,
}

impl StoryBackend {
    /// Backend for a bridge instance.
    ///
    /// * `base_url` - HTTP base URL, e.g. `http://host:5175`.
    /// * `ws_url`   - WebSocket base URL, e.g. `ws://host:5175`.
    pub fn new(base_url: impl Into<String>, ws_url: impl Into<String>) -> Self {
        Self {
            api: StoryApi::new(base_url.into()),
            ws_url: ws_url.into(),
        }
    }

    /// The underlying REST client (chat, model listing).
    pub fn api(&self) -> &StoryApi {
        &self.api
    }
}

fn submit_error(e: StoryApiError) -> SubmitError {
    match e {
        StoryApiError::Request(e) => SubmitError::Request(e.to_string()),
        StoryApiError::Api { status, body } => SubmitError::Rejected { status, body },
    }
}

#[async_trait]
impl JobBackend for StoryBackend {
    type Payload = StoryRequest;

    fn name(&self) -> &'static str {
        "story"
    }

    async fn submit(&self, request: &StoryRequest) -> Result<Submission, SubmitError> {
        let response = self
            .api
            .submit_story(&request.model, &request.subject, request.chapter_count)
            .await
            .map_err(submit_error)?;

        tracing::info!(
            story_id = %response.story_id,
            chapter_count = request.chapter_count,
            "Story generation started",
        );

        Ok(Submission {
            channel_endpoint: format!("{}/ollama/ws/story/{}", self.ws_url, response.story_id),
            job_id: response.story_id,
        })
    }

    fn classify(&self, message: &serde_json::Value, job_id: &str) -> Event {
        // Snapshots normally carry no story id; a message that names a
        // different one is someone else's traffic.
        if let Some(id) = message.get("story_id").and_then(|v| v.as_str()) {
            if id != job_id {
                return Event::Unrelated;
            }
        }

        let Ok(snapshot) = parse_snapshot(message) else {
            return Event::Unrelated;
        };

        match snapshot.status.as_str() {
            "complete" => Event::TerminalSuccess {
                job_id: job_id.to_string(),
                payload: message.clone(),
            },
            "error" => Event::TerminalError {
                job_id: job_id.to_string(),
                message: snapshot.failure_message(),
            },
            _ => Event::Progress {
                job_id: job_id.to_string(),
                payload: message.clone(),
            },
        }
    }

    async fn fetch(
        &self,
        job_id: &str,
        terminal: &serde_json::Value,
    ) -> Result<ArtifactMap, FetchError> {
        let snapshot = parse_snapshot(terminal)
            .map_err(|e| FetchError::Payload(format!("unreadable terminal snapshot: {e}")))?;

        if snapshot.chapters.is_empty() {
            return Err(FetchError::Payload(
                "terminal snapshot carries no chapters".to_string(),
            ));
        }

        let mut artifacts = ArtifactMap::new();
        if let Some(title) = snapshot.title {
            artifacts.insert("title".to_string(), vec![Artifact::text(title)]);
        }
        for (chapter, text) in snapshot.chapters {
            artifacts.insert(chapter, vec![Artifact::text(text)]);
        }

        tracing::debug!(
            story_id = %job_id,
            chapters = artifacts.len(),
            "Story resolved inline",
        );

        Ok(artifacts)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn backend() -> StoryBackend {
        StoryBackend::new("http://127.0.0.1:5175", "ws://127.0.0.1:5175")
    }

    #[test]
    fn generating_snapshot_is_progress() {
        let event = backend().classify(
            &json!({"status": "generating_chapters", "current_chapter": 1}),
            "xyz",
        );
        assert_matches!(event, Event::Progress { payload, .. } => {
            assert_eq!(payload["current_chapter"], 1);
        });
    }

    #[test]
    fn complete_snapshot_is_terminal_success() {
        let event = backend().classify(
            &json!({"status": "complete", "title": "T", "chapters": {"1": "a", "2": "b"}}),
            "xyz",
        );
        assert_matches!(event, Event::TerminalSuccess { .. });
    }

    #[test]
    fn error_snapshot_is_terminal_error() {
        let event = backend().classify(&json!({"status": "error", "error": "OOM"}), "xyz");
        assert_matches!(event, Event::TerminalError { message, .. } if message == "OOM");
    }

    #[test]
    fn snapshot_for_another_story_is_unrelated() {
        let event = backend().classify(
            &json!({"story_id": "other", "status": "complete"}),
            "xyz",
        );
        assert_matches!(event, Event::Unrelated);
    }

    #[test]
    fn statusless_message_is_unrelated() {
        let event = backend().classify(&json!({"noise": true}), "xyz");
        assert_matches!(event, Event::Unrelated);
    }

    #[tokio::test]
    async fn fetch_decodes_the_inline_result() {
        let terminal = json!({
            "status": "complete",
            "title": "T",
            "chapters": {"1": "first", "2": "second"}
        });

        let artifacts = backend().fetch("xyz", &terminal).await.unwrap();

        assert_eq!(artifacts["title"][0].as_text(), Some("T"));
        assert_eq!(artifacts["1"][0].as_text(), Some("first"));
        assert_eq!(artifacts["2"][0].as_text(), Some("second"));
    }

    #[tokio::test]
    async fn fetch_rejects_a_snapshot_without_chapters() {
        let result = backend().fetch("xyz", &json!({"status": "complete"})).await;
        assert_matches!(result, Err(FetchError::Payload(_)));
    }
}
