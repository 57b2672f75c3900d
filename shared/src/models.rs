//! Shared data models.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// A page of raw documents as returned by the store.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DocumentList {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub documents: Vec<Value>,
}

impl DocumentList {
    /// Decode every document into `T`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<Vec<T>> {
        self.documents
            .into_iter()
            .map(|doc| {
                serde_json::from_value(doc).map_err(|e| Error::Decode(e.to_string()))
            })
            .collect()
    }
}

/// An event from the catalog.
///
/// Attributes other than the id, start date and falla key are carried through untouched.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Event {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "dateInit", default, skip_serializing_if = "Option::is_none")]
    pub date_init: Option<String>,
    #[serde(rename = "idFalla", default, skip_serializing_if = "Option::is_none")]
    pub id_falla: Option<String>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Join record: a user bookmarked an event.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UserSavedEvent {
    #[serde(rename = "idUser")]
    pub id_user: String,
    #[serde(rename = "idEvent")]
    pub id_event: String,
}

/// A falla, the entity events belong to.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Falla {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
}
