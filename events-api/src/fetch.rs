//! Remote lookups against the document store, each wrapped in the retry policy.

use shared::{Collections, DocumentList, DocumentStore, Event, Falla, Query, RetryPolicy, UserSavedEvent};

use crate::error::{FeedError, Lookup};
use crate::invocation::Invocation;
use crate::predicates::DOCUMENT_ID;

pub const ID_USER: &str = "idUser";

/// Issues the feed's store calls for one invocation.
pub struct Fetcher<'a, S, I> {
    store: &'a S,
    collections: &'a Collections,
    retry: RetryPolicy,
    invocation: &'a I,
}

impl<'a, S, I> Fetcher<'a, S, I>
where
    S: DocumentStore,
    I: Invocation,
{
    pub fn new(store: &'a S, collections: &'a Collections, retry: RetryPolicy, invocation: &'a I) -> Self {
        Self {
            store,
            collections,
            retry,
            invocation,
        }
    }

    async fn list_with_retry(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> shared::Result<DocumentList> {
        let store = self.store;
        let invocation = self.invocation;

        self.retry
            .run(
                move || store.list_documents(database_id, collection_id, queries),
                |e, retries_left| {
                    invocation.log(&format!(
                        "Error: {}. Retrying... ({} retries left)",
                        e, retries_left
                    ))
                },
            )
            .await
    }

    fn degrade(&self, lookup: Lookup, source: shared::Error) {
        self.invocation
            .log(&FeedError::DegradedLookup { lookup, source }.to_string());
    }

    /// Ids of the events a user saved, in store order. Empty when the lookup fails.
    pub async fn saved_event_ids(&self, user_id: &str, limit: u32) -> Vec<String> {
        let queries = [Query::equal(ID_USER, [user_id]), Query::limit(limit)];

        let result = self
            .list_with_retry(
                &self.collections.events_database,
                &self.collections.user_events,
                &queries,
            )
            .await
            .and_then(DocumentList::decode::<UserSavedEvent>);

        match result {
            Ok(saved) => saved.into_iter().map(|s| s.id_event).collect(),
            Err(e) => {
                self.degrade(Lookup::SavedEvents, e);
                Vec::new()
            }
        }
    }

    /// Fallas with the given ids. `None` when the lookup failed after every retry.
    pub async fn fallas(&self, ids: &[String], lookup: Lookup) -> Option<Vec<Falla>> {
        let queries = [Query::equal(DOCUMENT_ID, ids.iter().cloned())];

        let result = self
            .list_with_retry(
                &self.collections.users_database,
                &self.collections.fallas,
                &queries,
            )
            .await
            .and_then(DocumentList::decode::<Falla>);

        match result {
            Ok(fallas) => Some(fallas),
            Err(e) => {
                self.degrade(lookup, e);
                None
            }
        }
    }

    /// The main event query. Failing here fails the whole request.
    pub async fn events(&self, queries: &[Query]) -> Result<Vec<Event>, FeedError> {
        let list = self
            .list_with_retry(
                &self.collections.events_database,
                &self.collections.events,
                queries,
            )
            .await
            .map_err(|e| {
                self.invocation.log(&format!("Error fetching events: {}", e));
                FeedError::FatalFetch(e)
            })?;

        list.decode::<Event>()
            .map_err(|e| FeedError::Unhandled(e.to_string()))
    }
}

/// Distinct falla keys of the events, in first-seen order.
pub fn referenced_falla_ids(events: &[Event]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for id in events.iter().filter_map(|e| e.id_falla.as_ref()) {
        if !ids.contains(id) {
            ids.push(id.clone());
        }
    }
    ids
}
