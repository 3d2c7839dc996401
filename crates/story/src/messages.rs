//! Story WebSocket message types.
//!
//! The bridge re-sends the whole story state as a JSON snapshot
//! whenever the status or the current chapter changes. `status` drives
//! classification; `"complete"` snapshots carry the finished story
//! inline.

use std::collections::BTreeMap;

use serde::Deserialize;

/// One story-state snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct StorySnapshot {
    pub status: String,
    /// Chapters requested.
    #[serde(default)]
    pub chapter_count: Option<u32>,
    /// Last chapter the generator finished polishing.
    #[serde(default)]
    pub current_chapter: Option<u32>,
    /// Present once the outline pass has produced a title.
    #[serde(default)]
    pub title: Option<String>,
    /// Chapter key → polished text; complete on terminal snapshots.
    #[serde(default)]
    pub chapters: BTreeMap<String, String>,
    /// Failure description on `status == "error"` snapshots.
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl StorySnapshot {
    /// The failure text of an error snapshot, whichever field the
    /// server used to report it.
    pub fn failure_message(&self) -> String {
        self.message
            .clone()
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "story generation failed".to_string())
    }
}

/// Parse a decoded snapshot message.
pub fn parse_snapshot(value: &serde_json::Value) -> Result<StorySnapshot, serde_json::Error> {
    serde_json::from_value(value.clone())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parse_generating_snapshot() {
        let value = json!({
            "status": "generating_chapters",
            "chapter_count": 3,
            "current_chapter": 1,
            "title": "The Fox",
            "chapters": {"chapter 0": "Once upon a time..."}
        });
        let snapshot = parse_snapshot(&value).unwrap();
        assert_eq!(snapshot.status, "generating_chapters");
        assert_eq!(snapshot.current_chapter, Some(1));
        assert_eq!(snapshot.chapters.len(), 1);
    }

    #[test]
    fn parse_minimal_snapshot() {
        let snapshot = parse_snapshot(&json!({"status": "initializing"})).unwrap();
        assert_eq!(snapshot.status, "initializing");
        assert!(snapshot.chapters.is_empty());
        assert!(snapshot.title.is_none());
    }

    #[test]
    fn failure_message_prefers_message_over_error() {
        let snapshot =
            parse_snapshot(&json!({"status": "error", "message": "Story not found"})).unwrap();
        assert_eq!(snapshot.failure_message(), "Story not found");

        let snapshot = parse_snapshot(&json!({"status": "error", "error": "OOM"})).unwrap();
        assert_eq!(snapshot.failure_message(), "OOM");

        let snapshot = parse_snapshot(&json!({"status": "error"})).unwrap();
        assert_eq!(snapshot.failure_message(), "story generation failed");
    }

    #[test]
    fn snapshot_without_status_fails_to_parse() {
        assert!(parse_snapshot(&json!({"chapters": {}})).is_err());
    }
}
