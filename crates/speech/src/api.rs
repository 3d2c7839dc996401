//! HTTP client for the speech and translation endpoints.

use serde::Deserialize;

/// HTTP client for one speech/translation service.
pub struct SpeechApi {
    client: reqwest::Client,
    base_url: String,
}

/// Response returned by `/translate_audio/stream` after accepting an
/// upload.
#[derive(Debug, Deserialize)]
pub struct StreamSubmitResponse {
    /// Server-assigned identifier used to subscribe to progress.
    pub job_id: String,
}

#[derive(Debug, Deserialize)]
struct TextResult {
    result: String,
}

/// Errors from the speech REST layer.
#[derive(Debug, thiserror::Error)]
pub enum SpeechApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("Speech API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl SpeechApi {
    /// Create a new API client.
    ///
    /// * `base_url` - Base HTTP URL, e.g. `http://host:8186`.
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Submit an audio file for streaming translation.
    ///
    /// Sends a multipart `POST /translate_audio/stream` with the
    /// source/target language pair as query parameters. Returns the
    /// id to subscribe with.
    pub async fn submit_audio_translation(
        &self,
        audio: Vec<u8>,
        filename: &str,
        from_code: &str,
        to_code: &str,
    ) -> Result<StreamSubmitResponse, SpeechApiError> {
        let form = reqwest::multipart::Form::new().part(
            "file",
            reqwest::multipart::Part::bytes(audio).file_name(filename.to_string()),
        );

        let response = self
            .client
            .post(format!("{}/translate_audio/stream", self.base_url))
            .query(&[("from_code", from_code), ("to_code", to_code)])
            .multipart(form)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// One-shot text translation.
    ///
    /// Sends `POST /translate` with the sentence and language pair as
    /// query parameters and returns the translated text.
    pub async fn translate_text(
        &self,
        sentence: &str,
        from_code: &str,
        to_code: &str,
    ) -> Result<String, SpeechApiError> {
        let response = self
            .client
            .post(format!("{}/translate", self.base_url))
            .query(&[
                ("sentence", sentence),
                ("from_code", from_code),
                ("to_code", to_code),
            ])
            .send()
            .await?;

        let translated: TextResult = Self::parse_response(response).await?;
        Ok(translated.result)
    }

    /// Synthesize speech for a sentence, returning raw audio bytes.
    pub async fn text_to_speech(
        &self,
        sentence: &str,
        language: Option<&str>,
    ) -> Result<Vec<u8>, SpeechApiError> {
        let mut body = serde_json::json!({ "sentence": sentence });
        if let Some(language) = language {
            body["language"] = serde_json::Value::String(language.to_string());
        }

        let response = self
            .client
            .post(format!("{}/tts", self.base_url))
            .json(&body)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Transcribe an audio recording.
    ///
    /// Sends a multipart `POST /stt` with the file and its container
    /// type and returns the decoded text.
    pub async fn speech_to_text(
        &self,
        audio: Vec<u8>,
        filename: &str,
        audio_type: &str,
        language: Option<&str>,
    ) -> Result<String, SpeechApiError> {
        let mut form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio).file_name(filename.to_string()),
            )
            .text("type", audio_type.to_string());
        if let Some(language) = language {
            form = form.text("language", language.to_string());
        }

        let response = self
            .client
            .post(format!("{}/stt", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let decoded: TextResult = Self::parse_response(response).await?;
        Ok(decoded.result)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, surfacing the
    /// status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, SpeechApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SpeechApiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, SpeechApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
