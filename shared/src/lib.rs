//! Shared library for the events feed Lambda functions.
//!
//! Configuration, error types, data models, the retry policy and the document store client.

pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod retry;
pub mod secrets;
pub mod store;

pub use config::{ApiKeySource, Collections, Config, FallaEmbedding, FeedSettings};
pub use error::{Error, Result};
pub use models::{DocumentList, Event, Falla, UserSavedEvent};
pub use retry::RetryPolicy;
pub use secrets::{get_secret, resolve_api_key};
pub use store::{AppwriteClient, DocumentStore, Query};
