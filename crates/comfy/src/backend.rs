//! ComfyUI job backend.
//!
//! Submission and the WebSocket subscription share one client id so
//! the server routes status messages to this subscriber. Completion is
//! the `executing` message with a null node for the awaited prompt;
//! artifacts then require the history/view second round trip.

use async_trait::async_trait;
use fireside_core::error::{FetchError, SubmitError};
use fireside_engine::{Artifact, ArtifactMap, Event, JobBackend, Submission};
use futures::future::try_join_all;

use crate::api::{ComfyApi, ComfyApiError};
use crate::messages::{parse_message, ComfyMessage};

/// Image-generation backend for one ComfyUI instance.
pub struct ComfyBackend {
    api: ComfyApi,
    ws_url: String,
    client_id: String,
}

impl ComfyBackend {
    /// Backend with a freshly generated client id.
    ///
    /// * `api_url` - HTTP base URL, e.g. `http://host:8188`.
    /// * `ws_url`  - WebSocket base URL, e.g. `ws://host:8188`.
    pub fn new(api_url: impl Into<String>, ws_url: impl Into<String>) -> Self {
        Self::with_client_id(api_url, ws_url, uuid::Uuid::new_v4().to_string())
    }

    /// Backend with a caller-supplied client identifier.
    pub fn with_client_id(
        api_url: impl Into<String>,
        ws_url: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            api: ComfyApi::new(api_url.into()),
            ws_url: ws_url.into(),
            client_id: client_id.into(),
        }
    }

    /// Client id shared by submission and the WebSocket handshake.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// The underlying REST client (cancellation, interruption).
    pub fn api(&self) -> &ComfyApi {
        &self.api
    }
}

fn submit_error(e: ComfyApiError) -> SubmitError {
    match e {
        ComfyApiError::Request(e) => SubmitError::Request(e.to_string()),
        ComfyApiError::Api { status, body } => SubmitError::Rejected { status, body },
    }
}

#[async_trait]
impl JobBackend for ComfyBackend {
    type Payload = serde_json::Value;

    fn name(&self) -> &'static str {
        "comfyui"
    }

    async fn submit(&self, workflow: &serde_json::Value) -> Result<Submission, SubmitError> {
        let response = self
            .api
            .submit_workflow(workflow, &self.client_id)
            .await
            .map_err(submit_error)?;

        tracing::info!(
            prompt_id = %response.prompt_id,
            queue_position = response.number,
            "Workflow queued",
        );

        Ok(Submission {
            job_id: response.prompt_id,
            channel_endpoint: format!("{}/ws?clientId={}", self.ws_url, self.client_id),
        })
    }

    fn classify(&self, message: &serde_json::Value, job_id: &str) -> Event {
        // Unknown message kinds are expected broadcast noise.
        let Ok(parsed) = parse_message(message) else {
            return Event::Unrelated;
        };

        match parsed {
            ComfyMessage::Executing(data) => match (data.prompt_id.as_deref(), data.node) {
                // node == null means the prompt is done. Declared
                // behavior of this backend; not a general rule.
                (Some(id), None) if id == job_id => Event::TerminalSuccess {
                    job_id: job_id.to_string(),
                    payload: message.clone(),
                },
                (Some(id), Some(node)) if id == job_id => Event::Progress {
                    job_id: job_id.to_string(),
                    payload: serde_json::json!({ "current_node": node }),
                },
                _ => Event::Unrelated,
            },

            ComfyMessage::ExecutionError(data) if data.prompt_id == job_id => {
                Event::TerminalError {
                    job_id: job_id.to_string(),
                    message: data.exception_message,
                }
            }

            // Step progress carries no prompt id; the channel is
            // client-scoped, so it belongs to the awaited job.
            ComfyMessage::Progress(data) => Event::Progress {
                job_id: job_id.to_string(),
                payload: serde_json::json!({
                    "value": data.value,
                    "max": data.max,
                    "percent": data.percent(),
                }),
            },

            ComfyMessage::ExecutionStart(data) if data.prompt_id == job_id => Event::Progress {
                job_id: job_id.to_string(),
                payload: serde_json::json!({ "started": true }),
            },

            ComfyMessage::ExecutionCached(data) if data.prompt_id == job_id => Event::Progress {
                job_id: job_id.to_string(),
                payload: serde_json::json!({ "cached_nodes": data.nodes }),
            },

            ComfyMessage::Executed(data) if data.prompt_id == job_id => Event::Progress {
                job_id: job_id.to_string(),
                payload: serde_json::json!({ "node": data.node, "output": data.output }),
            },

            _ => Event::Unrelated,
        }
    }

    async fn fetch(
        &self,
        job_id: &str,
        _terminal: &serde_json::Value,
    ) -> Result<ArtifactMap, FetchError> {
        let history = self
            .api
            .get_history(job_id)
            .await
            .map_err(|e| FetchError::Lookup(e.to_string()))?;
        let entry = history
            .get(job_id)
            .ok_or_else(|| FetchError::Lookup(format!("no history entry for prompt {job_id}")))?;

        // One view request per image; all must resolve or the first
        // failure surfaces.
        let fetches = entry.outputs.iter().flat_map(|(node_id, output)| {
            output.images.iter().flatten().map(move |image| async move {
                let bytes = self
                    .api
                    .get_image(&image.filename, &image.subfolder, &image.folder_type)
                    .await
                    .map_err(|e| FetchError::Artifact {
                        name: image.filename.clone(),
                        reason: e.to_string(),
                    })?;
                Ok::<_, FetchError>((node_id.clone(), Artifact::named(image.filename.clone(), bytes)))
            })
        });

        let mut artifacts = ArtifactMap::new();
        for (node_id, artifact) in try_join_all(fetches).await? {
            artifacts.entry(node_id).or_default().push(artifact);
        }

        tracing::debug!(
            prompt_id = %job_id,
            nodes = artifacts.len(),
            "Artifacts resolved",
        );

        Ok(artifacts)
    }
}
