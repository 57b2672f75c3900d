//! Predicate assembly for the main event query.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use shared::{FeedSettings, Query};

use crate::request::FeedRequest;

pub const DATE_INIT: &str = "dateInit";
pub const ID_FALLA: &str = "idFalla";
pub const DOCUMENT_ID: &str = "$id";

/// Limit and offset for a 1-based page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: u32,
    pub offset: u32,
}

impl PageWindow {
    pub fn for_page(page: u32, page_size: u32) -> Self {
        Self {
            limit: page_size,
            offset: page.saturating_sub(1).saturating_mul(page_size),
        }
    }
}

/// Oldest start date still listed, as an ISO-8601 UTC timestamp with milliseconds.
pub fn recency_floor(now: DateTime<Utc>, recency_days: i64) -> String {
    (now - Duration::days(recency_days)).to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Build the ordered predicate list for the event query.
///
/// Order: sort, recency floor, falla filter, event id filter, saved filter, then paging.
/// `saved_ids` is only consulted when the request asks for saved events of a known user;
/// an empty set still produces the filter so that nothing is returned.
pub fn build_event_queries(
    request: &FeedRequest,
    saved_ids: &[String],
    settings: &FeedSettings,
    now: DateTime<Utc>,
) -> Vec<Query> {
    let mut queries = vec![
        Query::order_asc(DATE_INIT),
        Query::greater_than(DATE_INIT, recency_floor(now, settings.recency_days)),
    ];

    if !request.falla_ids.is_empty() {
        queries.push(Query::equal(ID_FALLA, request.falla_ids.iter().cloned()));
    }

    if !request.event_ids.is_empty() {
        queries.push(Query::equal(DOCUMENT_ID, request.event_ids.iter().cloned()));
    }

    if request.wants_only_saved() {
        queries.push(Query::equal(DOCUMENT_ID, saved_ids.iter().cloned()));
    }

    match request.page {
        Some(page) if settings.pagination => {
            let window = PageWindow::for_page(page, settings.page_size);
            queries.push(Query::limit(window.limit));
            queries.push(Query::offset(window.offset));
        }
        _ => queries.push(Query::limit(settings.list_limit)),
    }

    queries
}
