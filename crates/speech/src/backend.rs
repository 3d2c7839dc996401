//! Audio-translation job backend.
//!
//! The stream is opened per job id; the terminal message embeds the
//! translated audio as base64, so `fetch` is a local decode with no
//! network round trip.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use fireside_core::error::{FetchError, SubmitError};
use fireside_engine::{Artifact, ArtifactMap, Event, JobBackend, Submission};

use crate::api::{SpeechApi, SpeechApiError};
use crate::messages::parse_message;

/// Parameters for one streaming audio translation.
#[derive(Debug, Clone)]
pub struct AudioTranslationRequest {
    /// Raw audio bytes to translate.
    pub audio: Vec<u8>,
    /// Filename reported with the upload (its extension conveys the
    /// container type).
    pub filename: String,
    pub from_code: String,
    pub to_code: String,
}

/// Streaming audio-translation backend for one speech service.
pub struct AudioTranslationBackend {
    api: SpeechApi,
    ws_url: String,
}

impl AudioTranslationBackend {
    /// Backend for a speech service.
    ///
    /// * `base_url` - HTTP base URL, e.g. `http://host:8186`.
    /// * `ws_url`   - WebSocket base URL, e.g. `ws://host:8186`.
    pub fn new(base_url: impl Into<String>, ws_url: impl Into<String>) -> Self {
        Self {
            api: SpeechApi::new(base_url.into()),
            ws_url: ws_url.into(),
        }
    }

    /// The underlying REST client (translate, tts, stt).
    pub fn api(&self) -> &SpeechApi {
        &self.api
    }
}

fn submit_error(e: SpeechApiError) -> SubmitError {
    match e {
        SpeechApiError::Request(e) => SubmitError::Request(e.to_string()),
        SpeechApiError::Api { status, body } => SubmitError::Rejected { status, body },
    }
}

#[async_trait]
impl JobBackend for AudioTranslationBackend {
    type Payload = AudioTranslationRequest;

    fn name(&self) -> &'static str {
        "audio-translation"
    }

    async fn submit(&self, request: &AudioTranslationRequest) -> Result<Submission, SubmitError> {
        let response = self
            .api
            .submit_audio_translation(
                request.audio.clone(),
                &request.filename,
                &request.from_code,
                &request.to_code,
            )
            .await
            .map_err(submit_error)?;

        tracing::info!(
            job_id = %response.job_id,
            from = %request.from_code,
            to = %request.to_code,
            "Audio translation started",
        );

        Ok(Submission {
            channel_endpoint: format!("{}/translate_audio/ws/{}", self.ws_url, response.job_id),
            job_id: response.job_id,
        })
    }

    fn classify(&self, message: &serde_json::Value, job_id: &str) -> Event {
        let Ok(parsed) = parse_message(message) else {
            return Event::Unrelated;
        };

        // The stream is job-scoped; only an explicit mismatch marks a
        // message as someone else's.
        if let Some(id) = &parsed.job_id {
            if id != job_id {
                return Event::Unrelated;
            }
        }

        match parsed.kind.as_str() {
            "complete" => Event::TerminalSuccess {
                job_id: job_id.to_string(),
                payload: message.clone(),
            },
            "error" => Event::TerminalError {
                job_id: job_id.to_string(),
                message: parsed
                    .message
                    .unwrap_or_else(|| "audio translation failed".to_string()),
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
        let parsed = parse_message(terminal)
            .map_err(|e| FetchError::Payload(format!("unreadable terminal message: {e}")))?;
        let data = parsed.data.ok_or_else(|| {
            FetchError::Payload("terminal message carries no audio payload".to_string())
        })?;

        let audio = BASE64_STANDARD
            .decode(data.as_bytes())
            .map_err(|e| FetchError::Artifact {
                name: "audio".to_string(),
                reason: format!("invalid base64 payload: {e}"),
            })?;

        let extension = parsed.format.unwrap_or_else(|| "mp3".to_string());
        tracing::debug!(job_id = %job_id, bytes = audio.len(), "Audio decoded inline");

        let mut artifacts = ArtifactMap::new();
        artifacts.insert(
            "audio".to_string(),
            vec![Artifact::named(format!("translated.{extension}"), audio)],
        );
        Ok(artifacts)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn backend() -> AudioTranslationBackend {
        AudioTranslationBackend::new("http://127.0.0.1:8186", "ws://127.0.0.1:8186")
    }

    #[test]
    fn progress_stage_is_progress() {
        let event = backend().classify(
            &json!({"type": "progress", "stage": "transcribing"}),
            "j1",
        );
        assert_matches!(event, Event::Progress { .. });
    }

    #[test]
    fn complete_is_terminal_success() {
        let event = backend().classify(&json!({"type": "complete", "data": "aGk="}), "j1");
        assert_matches!(event, Event::TerminalSuccess { .. });
    }

    #[test]
    fn error_carries_the_message() {
        let event = backend().classify(
            &json!({"type": "error", "message": "no speech detected"}),
            "j1",
        );
        assert_matches!(
            event,
            Event::TerminalError { message, .. } if message == "no speech detected"
        );
    }

    #[test]
    fn mismatched_job_id_is_unrelated() {
        let event = backend().classify(
            &json!({"type": "complete", "job_id": "other", "data": "aGk="}),
            "j1",
        );
        assert_matches!(event, Event::Unrelated);
    }

    #[test]
    fn typeless_message_is_unrelated() {
        let event = backend().classify(&json!({"noise": 1}), "j1");
        assert_matches!(event, Event::Unrelated);
    }

    #[tokio::test]
    async fn fetch_decodes_the_base64_payload() {
        let terminal = json!({"type": "complete", "data": "aGVsbG8=", "format": "mp3"});

        let artifacts = backend().fetch("j1", &terminal).await.unwrap();
        let audio = &artifacts["audio"][0];

        assert_eq!(audio.data, b"hello");
        assert_eq!(audio.filename.as_deref(), Some("translated.mp3"));
    }

    #[tokio::test]
    async fn fetch_rejects_invalid_base64() {
        let terminal = json!({"type": "complete", "data": "not base64!!!"});
        let result = backend().fetch("j1", &terminal).await;
        assert_matches!(result, Err(FetchError::Artifact { name, .. }) if name == "audio");
    }

    #[tokio::test]
    async fn fetch_rejects_a_payloadless_terminal() {
        let result = backend().fetch("j1", &json!({"type": "complete"})).await;
        assert_matches!(result, Err(FetchError::Payload(_)));
    }
}
