//! Requests to upstream providers, and what came back from them.

use async_trait::async_trait;
use http::{HeaderMap, StatusCode};
use serde_json::Value;
use thiserror::Error;

/// A fully built request for one upstream provider.
#[derive(Clone, Debug, PartialEq)]
pub struct UpstreamRequest {
    /// The URL to `GET`, with the keyword already encoded into it.
    pub url: String,
    /// Extra headers to send along with the request.
    pub headers: HeaderMap,
}

impl UpstreamRequest {
    /// A request with no extra headers.
    pub fn new(url: String) -> Self {
        Self {
            url,
            headers: HeaderMap::new(),
        }
    }
}

/// Errors that keep an upstream call from producing a response.
#[derive(Debug, Error)]
#[allow(missing_docs, clippy::missing_docs_in_private_items)]
pub enum FetchError {
    #[error("There was a network error while contacting the provider: {0}")]
    Network(#[source] anyhow::Error),

    #[error("The provider did not respond in time")]
    Timeout,

    #[error("The provider's response body could not be read: {0}")]
    Body(#[source] anyhow::Error),
}

/// The settled result of one upstream call. Either a response of any status,
/// or the reason there was no response.
#[derive(Debug)]
pub enum ProviderOutcome {
    /// The provider answered. The status is kept, but not judged.
    Response {
        /// The HTTP status of the response.
        status: StatusCode,
        /// The response body, decoded as text.
        body: String,
    },
    /// The call failed before a full response was received.
    Failure(FetchError),
}

impl ProviderOutcome {
    /// A response with status 200 and the given body.
    pub fn ok<S: Into<String>>(body: S) -> Self {
        Self::Response {
            status: StatusCode::OK,
            body: body.into(),
        }
    }

    /// The body of the response, if there was one.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Response { body, .. } => Some(body),
            Self::Failure(_) => None,
        }
    }

    /// The body of the response parsed as JSON, if there was a response and it
    /// was valid JSON.
    pub fn json(&self) -> Option<Value> {
        self.body().and_then(|body| serde_json::from_str(body).ok())
    }

    /// Whether the call failed before a response arrived.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

/// Something that can perform upstream calls.
///
/// Implementations must settle every call into a [`ProviderOutcome`]; a fetch
/// never fails, it only reports failure.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Perform `request` and report how it went.
    async fn fetch(&self, request: UpstreamRequest) -> ProviderOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_of_a_failure_is_none() {
        let outcome = ProviderOutcome::Failure(FetchError::Timeout);
        assert!(outcome.is_failure());
        assert_eq!(outcome.json(), None);
    }

    #[test]
    fn json_of_non_json_body_is_none() {
        let outcome = ProviderOutcome::ok("<html>rate limited</html>");
        assert!(!outcome.is_failure());
        assert_eq!(outcome.json(), None);
    }

    #[test]
    fn json_ignores_status() {
        let outcome = ProviderOutcome::Response {
            status: StatusCode::TOO_MANY_REQUESTS,
            body: r#"["q",[]]"#.to_string(),
        };
        assert_eq!(outcome.json(), Some(serde_json::json!(["q", []])));
    }
}
