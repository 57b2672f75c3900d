//! The narrow surface a handler needs from its invocation: respond and log.

use lambda_http::{Body, Response};
use serde_json::Value;
use std::sync::Mutex;
use tracing::{error, info};

/// Capabilities the feed uses to talk back to whoever invoked it.
pub trait Invocation: Send + Sync {
    /// Emit the JSON response.
    fn respond(&self, status: u16, body: Value);
    fn log(&self, message: &str);
    fn error(&self, message: &str);
}

/// Lambda invocation: logs go to `tracing`, the response is captured for the runtime.
#[derive(Debug, Default)]
pub struct LambdaInvocation {
    response: Mutex<Option<(u16, Value)>>,
}

impl LambdaInvocation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn the captured response into an HTTP response.
    pub fn into_response(self) -> Result<Response<Body>, lambda_http::Error> {
        let captured = self
            .response
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        match captured {
            Some((status, body)) => shared::http::json_response(status, &body),
            None => Err(shared::Error::Internal("Handler finished without a response".to_string()).into()),
        }
    }
}

impl Invocation for LambdaInvocation {
    fn respond(&self, status: u16, body: Value) {
        let mut response = self
            .response
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *response = Some((status, body));
    }

    fn log(&self, message: &str) {
        info!("{}", message);
    }

    fn error(&self, message: &str) {
        error!("{}", message);
    }
}
