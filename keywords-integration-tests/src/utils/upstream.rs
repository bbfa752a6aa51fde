//! Canned upstream responses for the mock provider server.

use http::Uri;
use httpmock::{Method::GET, Mock, MockServer, When};
use keywords_settings::{providers::KEYWORD_PLACEHOLDER, EndpointConfig};
use serde_json::{json, Value};
use std::time::Duration;

/// The upstream platforms, as seen by the mock server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    /// The search engine's suggestion endpoint.
    Google,
    /// The video platform's JSONP endpoint.
    Youtube,
    /// The short-video platform's endpoint.
    Tiktok,
    /// The photo platform's hashtag search.
    Instagram,
}

impl Upstream {
    /// Every upstream, in response order.
    pub const ALL: [Self; 4] = [Self::Google, Self::Youtube, Self::Tiktok, Self::Instagram];

    /// Narrow `when` to the requests this upstream's provider sends.
    fn matching(self, when: When) -> When {
        let when = when.method(GET);
        match self {
            Self::Google => when
                .path("/complete/search")
                .query_param("client", "firefox"),
            Self::Youtube => when
                .path("/complete/search")
                .query_param("client", "youtube"),
            Self::Tiktok => when
                .path("/api/search/general/sug/")
                .header_exists("user-agent")
                .header("referer", "https://www.tiktok.com/"),
            Self::Instagram => when
                .path("/web/search/topsearch/")
                .query_param("context", "hashtag")
                .header("x-ig-app-id", "936619743392459"),
        }
    }

    /// A realistic response body for the keyword `cats`.
    pub fn sample_body(self) -> &'static str {
        match self {
            Self::Google => r#"["cats",["cats and dogs","cats movie"]]"#,
            Self::Youtube => {
                r#"window.google.ac.h(["cats",[["cats song",0,[]],["cats compilation",0,[]]],{"k":1,"q":"abc"}])"#
            }
            Self::Tiktok => {
                r#"{"sug_list":[{"word":"cats dancing"},{"word":"cats funny"}],"status_code":0}"#
            }
            Self::Instagram => {
                r#"{"hashtags":[{"position":0,"hashtag":{"name":"cats","media_count":12500000}},{"position":1,"hashtag":{"name":"catsofinstagram"}}],"status":"ok"}"#
            }
        }
    }
}

/// The body the service should answer with when every upstream sends its
/// [`sample_body`](Upstream::sample_body).
pub fn sample_result() -> Value {
    json!({
        "keyword": "cats",
        "google": ["cats and dogs", "cats movie"],
        "youtube": ["cats song", "cats compilation"],
        "tiktok": ["cats dancing", "cats funny"],
        "instagram": [
            {"name": "cats", "count": 12_500_000},
            {"name": "catsofinstagram", "count": null},
        ],
    })
}

/// Point `endpoint` at `base_url`, keeping the path and query of its template
/// and every header setting.
///
/// # Panics
/// If the template is not an absolute URL once the keyword is filled in.
pub fn rebase_endpoint(endpoint: &EndpointConfig, base_url: &str) -> EndpointConfig {
    // Stands in for the placeholder, which is not a legal URI character.
    const MARKER: &str = "__keyword__";

    let uri: Uri = endpoint
        .url_template
        .replace(KEYWORD_PLACEHOLDER, MARKER)
        .parse()
        .expect("URL template should be a valid URL");
    let path_and_query = match uri.query() {
        Some(query) => format!("{}?{}", uri.path(), query),
        None => uri.path().to_string(),
    };

    EndpointConfig {
        url_template: format!(
            "{}{}",
            base_url.trim_end_matches('/'),
            path_and_query.replace(MARKER, KEYWORD_PLACEHOLDER)
        ),
        ..endpoint.clone()
    }
}

/// Answer `upstream`'s requests with `status` and `body`.
pub async fn mock_upstream<'a>(
    server: &'a MockServer,
    upstream: Upstream,
    status: u16,
    body: &str,
) -> Mock<'a> {
    mock_upstream_delayed(server, upstream, status, body, Duration::ZERO).await
}

/// Like [`mock_upstream`], but wait `delay` before answering.
pub async fn mock_upstream_delayed<'a>(
    server: &'a MockServer,
    upstream: Upstream,
    status: u16,
    body: &str,
    delay: Duration,
) -> Mock<'a> {
    server
        .mock_async(|when, then| {
            upstream.matching(when);
            then.status(status).body(body).delay(delay);
        })
        .await
}

/// Answer every upstream with its sample body.
pub async fn mock_all_upstreams(server: &MockServer) -> Vec<Mock<'_>> {
    let mut mocks = Vec::new();
    for upstream in Upstream::ALL {
        mocks.push(mock_upstream(server, upstream, 200, upstream.sample_body()).await);
    }
    mocks
}

#[cfg(test)]
mod tests {
    use super::rebase_endpoint;
    use keywords_settings::{EndpointConfig, Settings};

    #[test]
    fn rebasing_keeps_path_query_and_headers() {
        let endpoint = EndpointConfig {
            referer: Some("https://www.tiktok.com/".to_string()),
            ..EndpointConfig::new("https://www.tiktok.com/api/sug/?keyword={keyword}&count=10")
        };
        let rebased = rebase_endpoint(&endpoint, "http://127.0.0.1:5000/");
        assert_eq!(
            rebased.url_template,
            "http://127.0.0.1:5000/api/sug/?keyword={keyword}&count=10"
        );
        assert_eq!(rebased.referer, endpoint.referer);
    }

    #[test]
    fn rebasing_a_bare_host_gives_the_root_path() {
        let endpoint = EndpointConfig::new("https://example.com");
        assert_eq!(
            rebase_endpoint(&endpoint, "http://localhost:1").url_template,
            "http://localhost:1/"
        );
    }

    #[test]
    fn rebasing_ignores_slashes_inside_the_query() {
        let endpoint = EndpointConfig::new("https://example.com?next=/a/b&q={keyword}");
        assert_eq!(
            rebase_endpoint(&endpoint, "http://localhost:1").url_template,
            "http://localhost:1/?next=/a/b&q={keyword}"
        );
    }

    #[test]
    fn every_configured_provider_can_be_rebased() {
        let providers = Settings::load_for_tests().providers;
        for endpoint in [
            &providers.google,
            &providers.youtube,
            &providers.tiktok,
            &providers.instagram,
        ] {
            let rebased = rebase_endpoint(endpoint, "http://localhost:1");
            assert!(
                rebased.url_template.starts_with("http://localhost:1/"),
                "{}",
                rebased.url_template
            );
            assert!(rebased.url_template.contains("{keyword}"));
        }
    }
}
