//! Suggestions from the web search engine's autocomplete endpoint.
//!
//! The endpoint answers with a JSON array shaped like
//! `["cats", ["cat food", "cat toys"], ...]`.

use keywords_settings::EndpointConfig;
use keywords_suggest_traits::{
    Keyword, ProviderAdapter, ProviderId, ProviderOutcome, SetupError, Suggestion, UpstreamRequest,
};
use serde_json::Value;

use super::{normalize, Endpoint};

/// An adapter for the web search suggestion endpoint.
pub struct GoogleSuggester {
    /// Where to send requests.
    endpoint: Endpoint,
}

impl GoogleSuggester {
    /// Create a boxed `GoogleSuggester` from its endpoint configuration.
    pub fn new_boxed(config: &EndpointConfig) -> Result<Box<Self>, SetupError> {
        Ok(Box::new(Self {
            endpoint: Endpoint::new(config)?,
        }))
    }
}

impl ProviderAdapter for GoogleSuggester {
    fn id(&self) -> ProviderId {
        ProviderId::Google
    }

    fn build_request(&self, keyword: &Keyword) -> UpstreamRequest {
        self.endpoint.request_for(keyword)
    }

    fn parse(&self, outcome: &ProviderOutcome) -> Vec<Suggestion> {
        normalize(self.id(), outcome, |body| {
            let data: Value = serde_json::from_str(body).ok()?;
            let terms = data.get(1)?.as_array()?;
            Some(
                terms
                    .iter()
                    .filter_map(Value::as_str)
                    .map(Suggestion::from)
                    .collect(),
            )
        })
    }
}
