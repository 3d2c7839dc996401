//! Speech and translation backend.
//!
//! Audio translation streams: the submit call returns a `job_id`,
//! progress arrives on a per-job WebSocket typed by `type`, and the
//! terminal message embeds the translated audio as base64 — resolved
//! locally with no further network round trip. One-shot text
//! translation, text-to-speech, and speech-to-text ride along on the
//! same HTTP API.

pub mod api;
pub mod backend;
pub mod messages;

pub use api::{SpeechApi, SpeechApiError};
pub use backend::{AudioTranslationBackend, AudioTranslationRequest};
