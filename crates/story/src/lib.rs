//! Story-generation backend for the Ollama bridge service.
//!
//! Story submission returns a `story_id`; progress then streams over a
//! per-story WebSocket as whole state snapshots. The terminal snapshot
//! embeds the full result inline (title plus chapters), so artifact
//! fetching is a pure decode with no further I/O. One-shot chat
//! generation and model listing ride along on the same HTTP API.

pub mod api;
pub mod backend;
pub mod messages;

pub use api::{StoryApi, StoryApiError};
pub use backend::{StoryBackend, StoryRequest};
