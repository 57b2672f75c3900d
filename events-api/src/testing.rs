//! In-memory fakes for the store and the invocation.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use shared::{Collections, DocumentList, DocumentStore, Event, Query};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::invocation::Invocation;

pub const EVENTS_DB: &str = "db-events";
pub const USERS_DB: &str = "db-users";

pub fn collections() -> Collections {
    Collections {
        events_database: EVENTS_DB.to_string(),
        users_database: USERS_DB.to_string(),
        events: "events".to_string(),
        user_events: "user-events".to_string(),
        fallas: "fallas".to_string(),
    }
}

pub fn event(id: &str, date_init: &str, id_falla: &str) -> Event {
    let mut attributes = Map::new();
    attributes.insert("title".to_string(), json!(format!("Event {}", id)));
    Event {
        id: id.to_string(),
        date_init: Some(date_init.to_string()),
        id_falla: Some(id_falla.to_string()),
        attributes,
    }
}

enum Failure {
    Next(u32),
    Always,
}

/// Store that evaluates queries over documents held in memory and records every call.
#[derive(Default)]
pub struct InMemoryStore {
    documents: HashMap<(String, String), Vec<Value>>,
    calls: Mutex<Vec<(String, Vec<Query>)>>,
    failures: Mutex<HashMap<String, Failure>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(mut self, database: &str, collection: &str, doc: Value) -> Self {
        self.documents
            .entry((database.to_string(), collection.to_string()))
            .or_default()
            .push(doc);
        self
    }

    pub fn with_event(self, event: Event) -> Self {
        let doc = serde_json::to_value(event).unwrap();
        self.insert(EVENTS_DB, "events", doc)
    }

    pub fn with_raw_event(self, doc: Value) -> Self {
        self.insert(EVENTS_DB, "events", doc)
    }

    pub fn with_saved(self, user_id: &str, event_id: &str) -> Self {
        let doc = json!({"$id": format!("{}-{}", user_id, event_id), "idUser": user_id, "idEvent": event_id});
        self.insert(EVENTS_DB, "user-events", doc)
    }

    pub fn with_falla(self, id: &str, name: &str, image_url: &str) -> Self {
        let doc = json!({"$id": id, "name": name, "imageUrl": image_url});
        self.insert(USERS_DB, "fallas", doc)
    }

    pub fn fail_next(&self, collection: &str, times: u32) {
        self.failures
            .lock()
            .unwrap()
            .insert(collection.to_string(), Failure::Next(times));
    }

    pub fn fail_always(&self, collection: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(collection.to_string(), Failure::Always);
    }

    pub fn calls(&self) -> Vec<(String, Vec<Query>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, collection: &str) -> usize {
        self.calls().iter().filter(|(c, _)| c == collection).count()
    }

    fn should_fail(&self, collection: &str) -> bool {
        let mut failures = self.failures.lock().unwrap();
        match failures.get_mut(collection) {
            Some(Failure::Always) => true,
            Some(Failure::Next(n)) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        }
    }
}

fn as_str<'v>(doc: &'v Value, attribute: &str) -> Option<&'v str> {
    doc.get(attribute).and_then(Value::as_str)
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> shared::Result<DocumentList> {
        self.calls
            .lock()
            .unwrap()
            .push((collection_id.to_string(), queries.to_vec()));

        if self.should_fail(collection_id) {
            return Err(shared::Error::Store {
                status: 503,
                message: "Service unavailable".to_string(),
            });
        }

        let mut docs = self
            .documents
            .get(&(database_id.to_string(), collection_id.to_string()))
            .cloned()
            .unwrap_or_default();
        let mut offset = 0usize;
        let mut limit = usize::MAX;

        for query in queries {
            match query {
                Query::Equal(attribute, values) => {
                    docs.retain(|d| d.get(attribute).is_some_and(|v| values.contains(v)))
                }
                Query::GreaterThan(attribute, value) => docs.retain(|d| {
                    matches!((as_str(d, attribute), value.as_str()), (Some(a), Some(b)) if a > b)
                }),
                Query::OrderAsc(attribute) => {
                    docs.sort_by(|a, b| as_str(a, attribute).cmp(&as_str(b, attribute)))
                }
                Query::Limit(n) => limit = *n as usize,
                Query::Offset(n) => offset = *n as usize,
            }
        }

        let documents: Vec<Value> = docs.into_iter().skip(offset).take(limit).collect();
        Ok(DocumentList {
            total: documents.len() as u64,
            documents,
        })
    }
}

/// Invocation that keeps everything it is given.
#[derive(Default)]
pub struct RecordingInvocation {
    responses: Mutex<Vec<(u16, Value)>>,
    logs: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl RecordingInvocation {
    pub fn response(&self) -> (u16, Value) {
        self.responses
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no response emitted")
    }

    pub fn response_count(&self) -> usize {
        self.responses.lock().unwrap().len()
    }

    pub fn logs(&self) -> Vec<String> {
        self.logs.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn retry_notices(&self) -> usize {
        self.logs()
            .iter()
            .filter(|l| l.starts_with("Error: ") && l.contains("Retrying..."))
            .count()
    }
}

impl Invocation for RecordingInvocation {
    fn respond(&self, status: u16, body: Value) {
        self.responses.lock().unwrap().push((status, body));
    }

    fn log(&self, message: &str) {
        self.logs.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}
