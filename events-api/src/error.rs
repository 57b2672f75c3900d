//! Failure taxonomy of the events feed.

use serde_json::{json, Value};
use thiserror::Error;

/// Which secondary lookup a degraded failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    SavedEvents,
    Fallas,
    /// Fallas resolved from the returned events' foreign keys
    FallasFallback,
}

impl std::fmt::Display for Lookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lookup::SavedEvents => write!(f, "user events"),
            Lookup::Fallas | Lookup::FallasFallback => write!(f, "fallas"),
        }
    }
}

#[derive(Error, Debug)]
pub enum FeedError {
    /// Body was not a JSON object of the expected shape
    #[error("Invalid JSON body")]
    InvalidBody(#[source] serde_json::Error),

    /// A non-essential lookup failed; the feed continues with an empty substitute
    #[error("Error fetching {lookup}: {source}")]
    DegradedLookup {
        lookup: Lookup,
        #[source]
        source: shared::Error,
    },

    /// The main event query failed after every retry
    #[error("Error fetching events")]
    FatalFetch(#[source] shared::Error),

    #[error("{0}")]
    Unhandled(String),
}

impl FeedError {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            FeedError::InvalidBody(_) => 400,
            _ => 500,
        }
    }

    /// Error payload sent back to the caller.
    pub fn to_body(&self) -> Value {
        json!({
            "error": self.to_string(),
            "status": self.status_code(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_body_payload() {
        let parse_err = serde_json::from_str::<Value>("{not json").unwrap_err();
        let err = FeedError::InvalidBody(parse_err);
        assert_eq!(err.to_body(), json!({"error": "Invalid JSON body", "status": 400}));
    }

    #[test]
    fn test_fatal_fetch_hides_store_detail() {
        let err = FeedError::FatalFetch(shared::Error::Store {
            status: 503,
            message: "unavailable".to_string(),
        });
        assert_eq!(err.to_body(), json!({"error": "Error fetching events", "status": 500}));
    }

    #[test]
    fn test_degraded_lookup_message() {
        let err = FeedError::DegradedLookup {
            lookup: Lookup::SavedEvents,
            source: shared::Error::Decode("missing field `idEvent`".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Error fetching user events: Decode error: missing field `idEvent`"
        );
    }
}
