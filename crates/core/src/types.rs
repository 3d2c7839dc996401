/// Backend job identifiers are opaque strings (`prompt_id`, `story_id`,
/// ...). Their shape is owned by the backend that issued them.
pub type JobId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
