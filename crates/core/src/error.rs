/// Job submission failures.
///
/// Submission is a single request/response call, independent of the
/// event channel. A failure here means the job never started.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The submit request itself failed (network, DNS, TLS, ...).
    #[error("Submit request failed: {0}")]
    Request(String),

    /// The backend rejected the submission with a non-success response.
    #[error("Submission rejected ({status}): {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// Artifact retrieval failures.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// A named artifact could not be retrieved or decoded.
    #[error("Failed to fetch artifact {name}: {reason}")]
    Artifact { name: String, reason: String },

    /// A follow-up lookup needed to locate the artifacts failed.
    #[error("Artifact lookup failed: {0}")]
    Lookup(String),

    /// The terminal event payload did not have the expected shape.
    #[error("Malformed terminal payload: {0}")]
    Payload(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_display_includes_status_and_body() {
        let err = SubmitError::Rejected {
            status: 422,
            body: "bad workflow".into(),
        };
        assert_eq!(err.to_string(), "Submission rejected (422): bad workflow");
    }

    #[test]
    fn fetch_artifact_display_names_the_artifact() {
        let err = FetchError::Artifact {
            name: "out.png".into(),
            reason: "404".into(),
        };
        assert!(err.to_string().contains("out.png"));
    }
}
