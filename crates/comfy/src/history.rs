//! Typed views of the `/history/{prompt_id}` response.
//!
//! The history endpoint returns a map keyed by prompt id; each entry
//! names, per node, the image files that execution produced. Only the
//! `outputs` portion matters for artifact retrieval; timing and status
//! metadata are ignored.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Full history response: prompt id → execution record.
pub type HistoryResponse = BTreeMap<String, HistoryEntry>;

/// One prompt's execution record.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryEntry {
    /// Node id → outputs that node produced.
    #[serde(default)]
    pub outputs: BTreeMap<String, NodeOutput>,
}

/// Outputs of a single node. Nodes that do not save images (samplers,
/// encoders) appear with no `images` field.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeOutput {
    #[serde(default)]
    pub images: Option<Vec<ImageRef>>,
}

/// Reference to one generated image, resolvable via `/view`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ImageRef {
    pub filename: String,
    pub subfolder: String,
    /// Folder class the file was saved under (`output`, `temp`, ...).
    #[serde(rename = "type")]
    pub folder_type: String,
}
