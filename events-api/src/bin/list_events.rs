//! List Events Lambda - upcoming events with saved status and falla details.

use chrono::Utc;
use events_api::{EventsFeed, LambdaInvocation};
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use shared::{AppwriteClient, Config};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application state
struct AppState {
    feed: EventsFeed<AppwriteClient>,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = Config::from_env()?;
        let api_key = shared::resolve_api_key(&config.api_key).await?;

        let store = AppwriteClient::new(
            reqwest::Client::new(),
            config.endpoint.as_str(),
            config.project_id.as_str(),
            api_key,
        );

        info!(
            "Events feed ready (retries: {}, pagination: {})",
            config.feed.max_retries, config.feed.pagination
        );

        Ok(Self {
            feed: EventsFeed::new(store, config.collections, config.feed),
        })
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let invocation = LambdaInvocation::new();
    state
        .feed
        .handle(shared::http::body_bytes(event.body()), &invocation, Utc::now())
        .await;

    invocation.into_response()
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
