use std::path::PathBuf;

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for services running locally.
/// Override via environment variables (a `.env` file is honored).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// ComfyUI HTTP base URL.
    pub comfy_api_url: String,
    /// ComfyUI WebSocket base URL.
    pub comfy_ws_url: String,
    /// Fixed client id for ComfyUI; a fresh one is generated per run
    /// when unset.
    pub comfy_client_id: Option<String>,
    /// Ollama bridge HTTP base URL.
    pub story_api_url: String,
    /// Ollama bridge WebSocket base URL.
    pub story_ws_url: String,
    /// Speech/translation service HTTP base URL.
    pub speech_api_url: String,
    /// Speech/translation service WebSocket base URL.
    pub speech_ws_url: String,
    /// Directory artifacts are written to.
    pub output_dir: PathBuf,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var           | Default                 |
    /// |-------------------|-------------------------|
    /// | `COMFY_API_URL`   | `http://127.0.0.1:8188` |
    /// | `COMFY_WS_URL`    | `ws://127.0.0.1:8188`   |
    /// | `COMFY_CLIENT_ID` | (generated per run)     |
    /// | `STORY_API_URL`   | `http://127.0.0.1:5175` |
    /// | `STORY_WS_URL`    | `ws://127.0.0.1:5175`   |
    /// | `SPEECH_API_URL`  | `http://127.0.0.1:8186` |
    /// | `SPEECH_WS_URL`   | `ws://127.0.0.1:8186`   |
    /// | `OUTPUT_DIR`      | `outputs`               |
    pub fn from_env() -> Self {
        let var = |name: &str, default: &str| {
            std::env::var(name).unwrap_or_else(|_| default.to_string())
        };

        Self {
            comfy_api_url: var("COMFY_API_URL", "http://127.0.0.1:8188"),
            comfy_ws_url: var("COMFY_WS_URL", "ws://127.0.0.1:8188"),
            comfy_client_id: std::env::var("COMFY_CLIENT_ID").ok(),
            story_api_url: var("STORY_API_URL", "http://127.0.0.1:5175"),
            story_ws_url: var("STORY_WS_URL", "ws://127.0.0.1:5175"),
            speech_api_url: var("SPEECH_API_URL", "http://127.0.0.1:8186"),
            speech_ws_url: var("SPEECH_WS_URL", "ws://127.0.0.1:8186"),
            output_dir: PathBuf::from(var("OUTPUT_DIR", "outputs")),
        }
    }
}
