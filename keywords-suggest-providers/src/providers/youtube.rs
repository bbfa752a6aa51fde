//! Suggestions from the video platform.
//!
//! The endpoint answers with JSONP, for example
//! `window.google.ac.h(["cats",[["cats",0,[]],["cat videos",0,[]]],{...}])`.

use keywords_settings::EndpointConfig;
use keywords_suggest_traits::{
    Keyword, ProviderAdapter, ProviderId, ProviderOutcome, SetupError, Suggestion, UpstreamRequest,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use super::{normalize, Endpoint};

lazy_static! {
    /// Captures the outermost array passed to the JSONP callback.
    static ref JSONP_PAYLOAD: Regex =
        Regex::new(r"(?s)\((\[.*\])\)").expect("JSONP pattern is valid");
}

/// An adapter for the video platform's suggestion endpoint.
pub struct YoutubeSuggester {
    /// Where to send requests.
    endpoint: Endpoint,
}

impl YoutubeSuggester {
    /// Create a boxed `YoutubeSuggester` from its endpoint configuration.
    pub fn new_boxed(config: &EndpointConfig) -> Result<Box<Self>, SetupError> {
        Ok(Box::new(Self {
            endpoint: Endpoint::new(config)?,
        }))
    }
}

impl ProviderAdapter for YoutubeSuggester {
    fn id(&self) -> ProviderId {
        ProviderId::Youtube
    }

    fn build_request(&self, keyword: &Keyword) -> UpstreamRequest {
        self.endpoint.request_for(keyword)
    }

    fn parse(&self, outcome: &ProviderOutcome) -> Vec<Suggestion> {
        normalize(self.id(), outcome, |body| {
            let payload = JSONP_PAYLOAD.captures(body)?.get(1)?.as_str();
            let data: Value = serde_json::from_str(payload).ok()?;
            let items = data.get(1)?.as_array()?;
            Some(
                items
                    .iter()
                    // Each item is usually `[text, type, details]`, but a bare
                    // string is accepted too.
                    .filter_map(|item| match item {
                        Value::Array(parts) => parts.first(),
                        other => Some(other),
                    })
                    .filter_map(Value::as_str)
                    .filter(|text| !text.is_empty())
                    .map(Suggestion::from)
                    .collect(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::YoutubeSuggester;
    use keywords_settings::EndpointConfig;
    use keywords_suggest_traits::{Keyword, ProviderAdapter, ProviderOutcome, Suggestion};
    use pretty_assertions::assert_eq;

    fn suggester() -> Box<YoutubeSuggester> {
        YoutubeSuggester::new_boxed(&EndpointConfig::new(
            "https://suggestqueries.google.com/complete/search?client=youtube&q={keyword}",
        ))
        .expect("valid config")
    }

    #[test]
    fn request_uses_template() {
        let keyword = Keyword::parse(Some("lo-fi")).unwrap();
        assert_eq!(
            suggester().build_request(&keyword).url,
            "https://suggestqueries.google.com/complete/search?client=youtube&q=lo-fi"
        );
    }

    #[test]
    fn jsonp_is_unwrapped() {
        let outcome =
            ProviderOutcome::ok(r#"window.google.ac.h(["x",[["a",0,[]],["b",0,[]]],{}])"#);
        assert_eq!(
            suggester().parse(&outcome),
            vec![Suggestion::from("a"), Suggestion::from("b")]
        );
    }

    #[test]
    fn bare_strings_and_empty_items() {
        let outcome = ProviderOutcome::ok(
            "window.google.ac.h([\"x\",\n[\"plain\",[\"\",0],[],[7],[\"nested\",0,[]]],{\"k\":1}])",
        );
        assert_eq!(
            suggester().parse(&outcome),
            vec![Suggestion::from("plain"), Suggestion::from("nested")]
        );
    }

    #[test]
    fn text_without_parentheses_yields_nothing() {
        let outcome = ProviderOutcome::ok(r#"["x",[["a",0,[]]]]"#);
        assert_eq!(suggester().parse(&outcome), vec![]);
    }

    #[test]
    fn malformed_payload_yields_nothing() {
        let outcome = ProviderOutcome::ok(r#"callback(["x",[["a",0,[]]}])"#);
        assert_eq!(suggester().parse(&outcome), vec![]);
    }

    #[test]
    fn non_array_suggestions_yield_nothing() {
        let outcome = ProviderOutcome::ok(r#"cb(["x",{"a":1}])"#);
        assert_eq!(suggester().parse(&outcome), vec![]);
    }
}
