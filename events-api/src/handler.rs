//! The events feed: parse, look up, query, enrich, respond.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use shared::{Collections, DocumentStore, FeedSettings, Query, RetryPolicy};

use crate::compose::enrich_events;
use crate::error::{FeedError, Lookup};
use crate::fetch::{referenced_falla_ids, Fetcher};
use crate::invocation::Invocation;
use crate::predicates::build_event_queries;
use crate::request::parse_request;

/// Everything a feed invocation needs, built once per process.
pub struct EventsFeed<S> {
    store: S,
    collections: Collections,
    settings: FeedSettings,
}

impl<S: DocumentStore> EventsFeed<S> {
    pub fn new(store: S, collections: Collections, settings: FeedSettings) -> Self {
        Self {
            store,
            collections,
            settings,
        }
    }

    /// Handle one invocation. Exactly one response is emitted through `invocation`.
    pub async fn handle<I: Invocation>(&self, body: &[u8], invocation: &I, now: DateTime<Utc>) {
        match self.list_events(body, invocation, now).await {
            Ok(events) => invocation.respond(200, json!({ "events": events })),
            Err(err) => {
                if let FeedError::Unhandled(message) = &err {
                    invocation.error(&format!("Error fetching events: {}", message));
                }
                invocation.respond(err.status_code(), err.to_body());
            }
        }
    }

    async fn list_events<I: Invocation>(
        &self,
        body: &[u8],
        invocation: &I,
        now: DateTime<Utc>,
    ) -> Result<Vec<Value>, FeedError> {
        let request = parse_request(body)?;
        invocation.log(&format!("Request Body: {}", String::from_utf8_lossy(body)));

        let fetcher = Fetcher::new(
            &self.store,
            &self.collections,
            RetryPolicy::from(&self.settings),
            invocation,
        );

        let saved_ids = match &request.user_id {
            Some(user_id) => {
                invocation.log(&format!("User ID: {}", user_id));
                fetcher
                    .saved_event_ids(user_id, self.settings.list_limit)
                    .await
            }
            None => Vec::new(),
        };

        // Stays `None` when the pre-fetch failed, so the fallback below runs
        let mut fallas = None;
        if !request.falla_ids.is_empty() {
            invocation.log(&format!("Fallas IDs: {}", request.falla_ids.join(",")));
            fallas = fetcher.fallas(&request.falla_ids, Lookup::Fallas).await;
        }

        if !request.event_ids.is_empty() {
            invocation.log(&format!("IDs Events: {}", request.event_ids.join(",")));
        }
        if request.wants_only_saved() {
            invocation.log("Only saved events");
        }
        if let Some(page) = request.page {
            invocation.log(&format!("Page: {}", page));
        }

        let queries = build_event_queries(&request, &saved_ids, &self.settings, now);
        invocation.log(&format!("Query Events Collection: {}", describe(&queries)));

        let events = fetcher.events(&queries).await?;

        if fallas.is_none() {
            let ids = referenced_falla_ids(&events);
            fallas = fetcher.fallas(&ids, Lookup::FallasFallback).await;
        }
        let fallas = fallas.unwrap_or_default();
        invocation.log(&format!("Fallas Collection: {} fallas", fallas.len()));

        Ok(enrich_events(events, &fallas, &saved_ids)
            .into_iter()
            .map(|e| e.into_json(self.settings.embedding))
            .collect())
    }
}

fn describe(queries: &[Query]) -> String {
    let parts: Vec<String> = queries.iter().map(Query::to_string).collect();
    format!("[{}]", parts.join(", "))
}
