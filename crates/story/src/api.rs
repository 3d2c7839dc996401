//! HTTP client for the Ollama bridge endpoints.

use serde::{Deserialize, Serialize};

/// HTTP client for one bridge instance.
pub struct StoryApi {
    client: reqwest::Client,
    base_url: String,
}

/// Response returned by `/ollama/story` after accepting a generation.
#[derive(Debug, Deserialize)]
pub struct StorySubmitResponse {
    /// Server-assigned identifier used to subscribe to progress.
    pub story_id: String,
}

/// Request body for one-shot chat generation.
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub prompt: String,
    pub format: String,
    pub stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    response: String,
}

/// One entry of the `/ollama/models` listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    /// Identifier to pass back in generation requests.
    pub value: String,
    pub description: String,
    /// `"local"` or `"api"`.
    #[serde(rename = "type")]
    pub kind: String,
}

/// Errors from the bridge REST layer.
#[derive(Debug, thiserror::Error)]
pub enum StoryApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("Bridge API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl StoryApi {
    /// Create a new API client.
    ///
    /// * `base_url` - Base HTTP URL, e.g. `http://host:5175`.
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Start a story generation.
    ///
    /// Sends `POST /ollama/story`; the server begins generating in the
    /// background and returns the id to subscribe with.
    pub async fn submit_story(
        &self,
        model: &str,
        subject: &str,
        chapter_count: u32,
    ) -> Result<StorySubmitResponse, StoryApiError> {
        let body = serde_json::json!({
            "model": model,
            "subject": subject,
            "chapter_count": chapter_count,
        });

        let response = self
            .client
            .post(format!("{}/ollama/story", self.base_url))
            .json(&body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// One-shot text generation with no progress channel.
    ///
    /// Sends `POST /ollama/chat` and returns the generated text.
    pub async fn generate_text(&self, request: &ChatRequest) -> Result<String, StoryApiError> {
        let response = self
            .client
            .post(format!("{}/ollama/chat", self.base_url))
            .json(request)
            .send()
            .await?;

        let chat: ChatResponse = Self::parse_response(response).await?;
        Ok(chat.response)
    }

    /// List the models the bridge currently serves.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, StoryApiError> {
        let response = self
            .client
            .get(format!("{}/ollama/models", self.base_url))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Parse a successful JSON response body into the expected type,
    /// or surface the status and body text on failure.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, StoryApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(StoryApiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_listing_maps_the_type_field() {
        let json = serde_json::json!([
            {
                "name": "Mistral Large",
                "value": "mistral-large-latest",
                "description": "Hosted model.",
                "type": "api"
            }
        ]);
        let models: Vec<ModelInfo> = serde_json::from_value(json).unwrap();
        assert_eq!(models[0].kind, "api");
        assert_eq!(models[0].value, "mistral-large-latest");
    }
}
