//! Audio-translation stream message types.
//!
//! Messages are JSON objects discriminated by `type`: progress stages
//! while the pipeline transcribes/translates/synthesizes, then one
//! `complete` message embedding the result as base64, or `error`.

use serde::Deserialize;

/// One message on the audio-translation stream.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamMessage {
    /// Message discriminant: `progress`, `complete`, or `error`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Correlation id; some servers omit it on job-scoped streams.
    #[serde(default)]
    pub job_id: Option<String>,
    /// Pipeline stage currently running (progress messages).
    #[serde(default)]
    pub stage: Option<String>,
    /// Base64-encoded audio payload (complete messages).
    #[serde(default)]
    pub data: Option<String>,
    /// Container format of the payload, e.g. `mp3` (complete messages).
    #[serde(default)]
    pub format: Option<String>,
    /// Failure description (error messages).
    #[serde(default)]
    pub message: Option<String>,
}

/// Parse a decoded stream message.
pub fn parse_message(value: &serde_json::Value) -> Result<StreamMessage, serde_json::Error> {
    serde_json::from_value(value.clone())
}
