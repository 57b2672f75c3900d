//! Events feed: lists upcoming events with saved flags and falla metadata.

pub mod compose;
pub mod error;
pub mod fetch;
pub mod handler;
pub mod invocation;
pub mod predicates;
pub mod request;

#[cfg(test)]
mod testing;

pub use compose::EnrichedEvent;
pub use error::{FeedError, Lookup};
pub use handler::EventsFeed;
pub use invocation::{Invocation, LambdaInvocation};
pub use request::FeedRequest;
