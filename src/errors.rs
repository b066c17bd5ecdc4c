use thiserror::Error;

/// Why the normalizer refused to produce a record from a raw event.
///
/// None of these are fatal: a best-effort push channel is expected to
/// deliver the occasional partial payload, so ingestion logs the reason
/// and drops the event rather than surfacing an error to the UI.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The payload lacks the identity fields its kind requires (e.g. a
    /// mention with no content id, message id, or notification id).
    #[error("{event}: missing required field '{field}'")]
    MissingIdentity {
        event: &'static str,
        field: &'static str,
    },

    /// The push transport delivered an event name we don't recognize.
    #[error("unrecognized push event '{0}'")]
    UnknownEvent(String),

    /// The payload exists but doesn't decode into the expected shape.
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
}
