//! Document store access: query predicates and the REST client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::models::DocumentList;
use crate::{Error, Result};

/// One directive of a list query. Filters AND-compose; ordering and paging apply to the whole list.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    OrderAsc(String),
    GreaterThan(String, Value),
    /// Attribute equals any of the values. An empty set matches nothing.
    Equal(String, Vec<Value>),
    Limit(u32),
    Offset(u32),
}

impl Query {
    pub fn order_asc(attribute: impl Into<String>) -> Self {
        Query::OrderAsc(attribute.into())
    }

    pub fn greater_than(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Query::GreaterThan(attribute.into(), value.into())
    }

    pub fn equal<I, V>(attribute: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Query::Equal(attribute.into(), values.into_iter().map(Into::into).collect())
    }

    pub fn limit(limit: u32) -> Self {
        Query::Limit(limit)
    }

    pub fn offset(offset: u32) -> Self {
        Query::Offset(offset)
    }

    /// True for a membership filter over an empty set.
    pub fn matches_nothing(&self) -> bool {
        matches!(self, Query::Equal(_, values) if values.is_empty())
    }

    /// JSON form understood by the store's `queries[]` parameter.
    pub fn to_json(&self) -> Value {
        match self {
            Query::OrderAsc(attribute) => json!({"method": "orderAsc", "attribute": attribute}),
            Query::GreaterThan(attribute, value) => {
                json!({"method": "greaterThan", "attribute": attribute, "values": [value]})
            }
            Query::Equal(attribute, values) => {
                json!({"method": "equal", "attribute": attribute, "values": values})
            }
            Query::Limit(limit) => json!({"method": "limit", "values": [limit]}),
            Query::Offset(offset) => json!({"method": "offset", "values": [offset]}),
        }
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

/// Read-only list access to the document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// List the documents of a collection that satisfy every query.
    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<DocumentList>;
}

#[derive(Debug, Deserialize, Serialize)]
struct StoreErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// REST client for an Appwrite-compatible document store.
#[derive(Debug, Clone)]
pub struct AppwriteClient {
    http_client: reqwest::Client,
    endpoint: String,
    project_id: String,
    api_key: String,
}

impl AppwriteClient {
    pub fn new(
        http_client: reqwest::Client,
        endpoint: impl Into<String>,
        project_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            api_key: api_key.into(),
        }
    }

    fn documents_url(&self, database_id: &str, collection_id: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.endpoint,
            urlencoding::encode(database_id),
            urlencoding::encode(collection_id)
        )
    }
}

#[async_trait]
impl DocumentStore for AppwriteClient {
    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<DocumentList> {
        if queries.iter().any(Query::matches_nothing) {
            debug!("Empty membership filter on {}, skipping request", collection_id);
            return Ok(DocumentList::default());
        }

        let params: Vec<(&str, String)> = queries
            .iter()
            .map(|q| ("queries[]", q.to_json().to_string()))
            .collect();

        let response = self
            .http_client
            .get(self.documents_url(database_id, collection_id))
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-Key", &self.api_key)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<StoreErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or(body);
            return Err(Error::Store {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<DocumentList>().await?)
    }
}
