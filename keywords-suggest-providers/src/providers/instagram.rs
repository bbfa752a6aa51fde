//! Hashtag suggestions from the photo platform.
//!
//! Besides the mobile user agent and referer, the endpoint wants the web
//! application's identifier in `X-IG-App-ID`. It answers with
//! `{"hashtags": [{"position": 0, "hashtag": {"name": "cats", "media_count": 1}}]}`.

use http::header::{HeaderName, REFERER, USER_AGENT};
use keywords_settings::EndpointConfig;
use keywords_suggest_traits::{
    Hashtag, Keyword, ProviderAdapter, ProviderId, ProviderOutcome, SetupError, Suggestion,
    UpstreamRequest,
};
use serde_json::Value;

use super::{normalize, required, Endpoint};

/// The most hashtags taken from one response.
pub const MAX_HASHTAGS: usize = 10;

/// The header carrying the application identifier.
const APP_ID_HEADER: &str = "x-ig-app-id";

/// An adapter for the photo platform's hashtag search endpoint.
pub struct InstagramSuggester {
    /// Where to send requests, with the client headers.
    endpoint: Endpoint,
}

impl InstagramSuggester {
    /// Create a boxed `InstagramSuggester`. `config` must include a referer
    /// and an application identifier.
    pub fn new_boxed(config: &EndpointConfig, user_agent: &str) -> Result<Box<Self>, SetupError> {
        let referer = required(&config.referer, "referer", ProviderId::Instagram)?;
        let app_id = required(&config.app_id, "app_id", ProviderId::Instagram)?;
        let endpoint = Endpoint::new(config)?
            .with_header(USER_AGENT, user_agent)?
            .with_header(REFERER, referer)?
            .with_header(HeaderName::from_static(APP_ID_HEADER), app_id)?;
        Ok(Box::new(Self { endpoint }))
    }
}

impl ProviderAdapter for InstagramSuggester {
    fn id(&self) -> ProviderId {
        ProviderId::Instagram
    }

    fn build_request(&self, keyword: &Keyword) -> UpstreamRequest {
        self.endpoint.request_for(keyword)
    }

    fn parse(&self, outcome: &ProviderOutcome) -> Vec<Suggestion> {
        normalize(self.id(), outcome, |body| {
            let data: Value = serde_json::from_str(body).ok()?;
            let entries = data.get("hashtags")?.as_array()?;
            Some(
                entries
                    .iter()
                    .take(MAX_HASHTAGS)
                    .filter_map(|entry| {
                        let hashtag = entry.get("hashtag")?;
                        let name = hashtag.get("name")?.as_str()?;
                        if name.is_empty() {
                            return None;
                        }
                        Some(Suggestion::Hashtag(Hashtag {
                            name: name.to_string(),
                            count: hashtag.get("media_count").and_then(Value::as_u64),
                        }))
                    })
                    .collect(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{InstagramSuggester, MAX_HASHTAGS};
    use http::header::{REFERER, USER_AGENT};
    use keywords_settings::EndpointConfig;
    use keywords_suggest_traits::{
        Hashtag, Keyword, ProviderAdapter, ProviderOutcome, Suggestion,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn config() -> EndpointConfig {
        EndpointConfig {
            url_template:
                "https://www.instagram.com/web/search/topsearch/?context=hashtag&query={keyword}"
                    .to_string(),
            referer: Some("https://www.instagram.com/".to_string()),
            app_id: Some("936619743392459".to_string()),
        }
    }

    fn suggester() -> Box<InstagramSuggester> {
        InstagramSuggester::new_boxed(&config(), "Mozilla/5.0 (iPhone)").expect("valid config")
    }

    fn hashtag(name: &str, count: Option<u64>) -> Suggestion {
        Suggestion::Hashtag(Hashtag {
            name: name.to_string(),
            count,
        })
    }

    #[test]
    fn request_carries_app_id() {
        let keyword = Keyword::parse(Some("#cats")).unwrap();
        let request = suggester().build_request(&keyword);
        assert_eq!(
            request.url,
            "https://www.instagram.com/web/search/topsearch/?context=hashtag&query=%23cats"
        );
        assert_eq!(request.headers["x-ig-app-id"], "936619743392459");
        assert_eq!(request.headers[USER_AGENT], "Mozilla/5.0 (iPhone)");
        assert_eq!(request.headers[REFERER], "https://www.instagram.com/");
    }

    #[test]
    fn app_id_is_required() {
        let config = EndpointConfig {
            app_id: None,
            ..config()
        };
        assert!(InstagramSuggester::new_boxed(&config, "ua").is_err());
    }

    #[test]
    fn hashtags_are_truncated() {
        let entries: Vec<_> = (0..12)
            .map(|i| json!({"position": i, "hashtag": {"name": format!("tag{}", i), "media_count": i}}))
            .collect();
        let outcome = ProviderOutcome::ok(json!({ "hashtags": entries }).to_string());

        let suggestions = suggester().parse(&outcome);
        assert_eq!(suggestions.len(), MAX_HASHTAGS);
        assert_eq!(suggestions[0], hashtag("tag0", Some(0)));
        assert_eq!(suggestions[9], hashtag("tag9", Some(9)));
    }

    #[test]
    fn nameless_entries_are_dropped_and_counts_default_to_null() {
        let outcome = ProviderOutcome::ok(
            json!({
                "hashtags": [
                    {"hashtag": {"name": "cats", "media_count": 1200}},
                    {"hashtag": {"media_count": 5}},
                    {"hashtag": {"name": "", "media_count": 5}},
                    {"position": 3},
                    {"hashtag": {"name": "catsofinstagram"}},
                ],
                "status": "ok",
            })
            .to_string(),
        );

        assert_eq!(
            suggester().parse(&outcome),
            vec![hashtag("cats", Some(1200)), hashtag("catsofinstagram", None)]
        );
    }

    #[test]
    fn truncation_happens_before_dropping() {
        let mut entries = vec![json!({"hashtag": {}}); 10];
        entries.push(json!({"hashtag": {"name": "late"}}));
        let outcome = ProviderOutcome::ok(json!({ "hashtags": entries }).to_string());
        assert_eq!(suggester().parse(&outcome), vec![]);
    }

    #[test]
    fn missing_hashtags_yield_nothing() {
        let outcome = ProviderOutcome::ok(r#"{"users":[],"places":[]}"#);
        assert_eq!(suggester().parse(&outcome), vec![]);
    }

    #[test]
    fn hashtags_serialize_with_null_count() {
        assert_eq!(
            serde_json::to_value(hashtag("cats", None)).unwrap(),
            json!({"name": "cats", "count": null})
        );
    }
}
