//! Request body parsing.

use serde::Deserialize;

use crate::error::FeedError;

/// Body as sent by clients. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFeedRequest {
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    fallas_ids: Option<Vec<String>>,
    #[serde(default)]
    ids_events: Option<Vec<String>>,
    #[serde(default)]
    only_saved_events: Option<bool>,
    #[serde(default)]
    page: Option<u32>,
}

/// A feed request with "not provided" made explicit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedRequest {
    /// Requesting user; `None` for anonymous or empty ids
    pub user_id: Option<String>,
    pub falla_ids: Vec<String>,
    pub event_ids: Vec<String>,
    pub only_saved_events: bool,
    /// 1-based page; `None` when absent or zero
    pub page: Option<u32>,
}

impl FeedRequest {
    /// True when the saved-events membership filter applies.
    pub fn wants_only_saved(&self) -> bool {
        self.only_saved_events && self.user_id.is_some()
    }
}

impl From<RawFeedRequest> for FeedRequest {
    fn from(raw: RawFeedRequest) -> Self {
        Self {
            user_id: raw.user_id.filter(|id| !id.is_empty()),
            falla_ids: raw.fallas_ids.unwrap_or_default(),
            event_ids: raw.ids_events.unwrap_or_default(),
            only_saved_events: raw.only_saved_events.unwrap_or(false),
            page: raw.page.filter(|p| *p > 0),
        }
    }
}

/// Parse a raw request body.
pub fn parse_request(body: &[u8]) -> Result<FeedRequest, FeedError> {
    let raw: RawFeedRequest = serde_json::from_slice(body).map_err(FeedError::InvalidBody)?;
    Ok(raw.into())
}
