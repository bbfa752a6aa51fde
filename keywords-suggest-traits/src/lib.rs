#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! The data model and traits that [Keywords](../keywords/index.html)
//! providers are built on.

mod domain;
mod upstream;

use thiserror::Error;

pub use crate::domain::{AggregatedResult, Hashtag, InvalidKeyword, Keyword, ProviderId, Suggestion};
pub use crate::upstream::{FetchError, Fetcher, ProviderOutcome, UpstreamRequest};

/// Knows how to ask one upstream provider for suggestions, and how to make
/// sense of its answer.
pub trait ProviderAdapter: Send + Sync {
    /// Which provider this adapter talks to.
    fn id(&self) -> ProviderId;

    /// Build the request for `keyword`. Deterministic: the same keyword always
    /// produces the same request.
    fn build_request(&self, keyword: &Keyword) -> UpstreamRequest;

    /// Normalize an outcome into suggestions.
    ///
    /// This is a total function. Transport failures, bodies that are not the
    /// expected shape, and bodies that are not JSON at all all produce an
    /// empty list.
    fn parse(&self, outcome: &ProviderOutcome) -> Vec<Suggestion>;
}

/// Errors that may occur while setting up a provider.
#[derive(Debug, Error)]
#[allow(missing_docs, clippy::missing_docs_in_private_items)]
pub enum SetupError {
    #[error("This provider cannot be used with the current Keywords configuration")]
    InvalidConfiguration(#[source] anyhow::Error),

    #[error("There was a network error while setting up this provider")]
    Network(#[source] anyhow::Error),
}
