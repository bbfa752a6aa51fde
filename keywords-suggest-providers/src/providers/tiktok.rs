//! Suggestions from the short-video platform.
//!
//! The endpoint rejects requests that do not look like they come from a
//! browser, so it is sent a mobile user agent and a referer. It answers with
//! `{"sug_list": [{"word": "..."}, ...], "status_code": 0}`.

use http::header::{REFERER, USER_AGENT};
use keywords_settings::EndpointConfig;
use keywords_suggest_traits::{
    Keyword, ProviderAdapter, ProviderId, ProviderOutcome, SetupError, Suggestion, UpstreamRequest,
};
use serde_json::Value;

use super::{normalize, required, Endpoint};

/// An adapter for the short-video platform's suggestion endpoint.
pub struct TiktokSuggester {
    /// Where to send requests, with the browser-like headers.
    endpoint: Endpoint,
}

impl TiktokSuggester {
    /// Create a boxed `TiktokSuggester`. `config` must include a referer.
    pub fn new_boxed(config: &EndpointConfig, user_agent: &str) -> Result<Box<Self>, SetupError> {
        let referer = required(&config.referer, "referer", ProviderId::Tiktok)?;
        let endpoint = Endpoint::new(config)?
            .with_header(USER_AGENT, user_agent)?
            .with_header(REFERER, referer)?;
        Ok(Box::new(Self { endpoint }))
    }
}

impl ProviderAdapter for TiktokSuggester {
    fn id(&self) -> ProviderId {
        ProviderId::Tiktok
    }

    fn build_request(&self, keyword: &Keyword) -> UpstreamRequest {
        self.endpoint.request_for(keyword)
    }

    fn parse(&self, outcome: &ProviderOutcome) -> Vec<Suggestion> {
        normalize(self.id(), outcome, |body| {
            let data: Value = serde_json::from_str(body).ok()?;
            let items = data.get("sug_list")?.as_array()?;
            Some(
                items
                    .iter()
                    .filter_map(|item| item.get("word")?.as_str())
                    .filter(|word| !word.is_empty())
                    .map(Suggestion::from)
                    .collect(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::TiktokSuggester;
    use http::header::{REFERER, USER_AGENT};
    use keywords_settings::EndpointConfig;
    use keywords_suggest_traits::{Keyword, ProviderAdapter, ProviderOutcome, Suggestion};
    use pretty_assertions::assert_eq;

    fn config() -> EndpointConfig {
        EndpointConfig {
            referer: Some("https://www.tiktok.com/".to_string()),
            ..EndpointConfig::new(
                "https://www.tiktok.com/api/search/general/sug/?keyword={keyword}&count=10",
            )
        }
    }

    fn suggester() -> Box<TiktokSuggester> {
        TiktokSuggester::new_boxed(&config(), "Mozilla/5.0 (iPhone)").expect("valid config")
    }

    #[test]
    fn request_carries_browser_headers() {
        let keyword = Keyword::parse(Some("dance")).unwrap();
        let request = suggester().build_request(&keyword);
        assert_eq!(
            request.url,
            "https://www.tiktok.com/api/search/general/sug/?keyword=dance&count=10"
        );
        assert_eq!(request.headers[USER_AGENT], "Mozilla/5.0 (iPhone)");
        assert_eq!(request.headers[REFERER], "https://www.tiktok.com/");
    }

    #[test]
    fn referer_is_required() {
        let config = EndpointConfig {
            referer: None,
            ..config()
        };
        assert!(TiktokSuggester::new_boxed(&config, "ua").is_err());
    }

    #[test]
    fn falsy_words_are_dropped() {
        let outcome = ProviderOutcome::ok(
            r#"{"sug_list":[{"word":"a"},{"word":""}],"status_code":0}"#,
        );
        assert_eq!(suggester().parse(&outcome), vec![Suggestion::from("a")]);
    }

    #[test]
    fn items_without_words_are_dropped() {
        let outcome = ProviderOutcome::ok(
            r#"{"sug_list":[{"content":"a"},{"word":null},{"word":3},{"word":"b"}]}"#,
        );
        assert_eq!(suggester().parse(&outcome), vec![Suggestion::from("b")]);
    }

    #[test]
    fn missing_list_yields_nothing() {
        for body in [r#"{"status_code":10201}"#, r#"{"sug_list":null}"#, "[]"] {
            assert_eq!(suggester().parse(&ProviderOutcome::ok(body)), vec![], "{}", body);
        }
    }
}
