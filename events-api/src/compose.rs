//! Joining events with saved flags and falla metadata.

use serde_json::{Map, Value};
use shared::{Event, Falla, FallaEmbedding};
use std::collections::{HashMap, HashSet};

/// An event together with what the feed knows about it.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedEvent {
    pub event: Event,
    pub is_saved: bool,
    /// `None` when the event has no falla key or the falla was not found
    pub falla: Option<Falla>,
}

impl EnrichedEvent {
    /// JSON form of the event. Derived fields overwrite same-named event attributes.
    pub fn into_json(self, embedding: FallaEmbedding) -> Value {
        let mut object = match serde_json::to_value(&self.event) {
            Ok(Value::Object(object)) => object,
            _ => Map::new(),
        };

        object.insert("isSaved".to_string(), Value::Bool(self.is_saved));

        match embedding {
            FallaEmbedding::Flattened => {
                let (name, image_url) = match self.falla {
                    Some(falla) => (falla.name, falla.image_url),
                    None => (None, None),
                };
                object.insert("urlImageFalla".to_string(), image_url.map_or(Value::Null, Value::String));
                object.insert("nameFalla".to_string(), name.map_or(Value::Null, Value::String));
            }
            FallaEmbedding::Nested => {
                let falla = self
                    .falla
                    .and_then(|f| serde_json::to_value(f).ok())
                    .unwrap_or(Value::Null);
                object.insert("falla".to_string(), falla);
            }
        }

        Value::Object(object)
    }
}

/// Attach saved status and falla to each event, keeping the query's order.
pub fn enrich_events(events: Vec<Event>, fallas: &[Falla], saved_ids: &[String]) -> Vec<EnrichedEvent> {
    let saved: HashSet<&str> = saved_ids.iter().map(String::as_str).collect();
    let by_id: HashMap<&str, &Falla> = fallas.iter().map(|f| (f.id.as_str(), f)).collect();

    events
        .into_iter()
        .map(|event| {
            let falla = event
                .id_falla
                .as_deref()
                .and_then(|id| by_id.get(id))
                .map(|f| (*f).clone());
            EnrichedEvent {
                is_saved: saved.contains(event.id.as_str()),
                falla,
                event,
            }
        })
        .collect()
}
