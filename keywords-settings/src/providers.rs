//! Settings for the upstream autocomplete providers.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use std::time::Duration;

/// The placeholder in a URL template that is replaced by the encoded keyword.
pub const KEYWORD_PLACEHOLDER: &str = "{keyword}";

/// Settings for the HTTP client used to reach every upstream provider.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamSettings {
    /// The time to wait for a TCP connection to an upstream to be established.
    #[serde_as(as = "DurationMilliSeconds")]
    #[serde(rename = "connect_timeout_ms")]
    pub connect_timeout: Duration,

    /// The total time an upstream request may take, including reading the
    /// body. A request that takes longer counts as a transport failure for
    /// that provider only.
    #[serde_as(as = "DurationMilliSeconds")]
    #[serde(rename = "request_timeout_ms")]
    pub request_timeout: Duration,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(3),
            request_timeout: Duration::from_secs(5),
        }
    }
}

/// Endpoints and client headers for each provider.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// The mobile browser user agent sent to providers that reject requests
    /// without browser-like signals.
    pub user_agent: String,

    /// The general web search suggestion endpoint.
    pub google: EndpointConfig,

    /// The video platform suggestion endpoint, which answers with JSONP.
    pub youtube: EndpointConfig,

    /// The short-video platform suggestion endpoint.
    pub tiktok: EndpointConfig,

    /// The photo platform hashtag search endpoint.
    pub instagram: EndpointConfig,
}

/// How to reach one provider.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EndpointConfig {
    /// The URL to request, containing [`KEYWORD_PLACEHOLDER`] exactly where the
    /// percent-encoded keyword belongs, for example
    /// `https://example.com/complete?q={keyword}`.
    pub url_template: String,

    /// The `Referer` header to send, for providers that need one.
    #[serde(default)]
    pub referer: Option<String>,

    /// The application identifier header to send, for providers that need one.
    #[serde(default)]
    pub app_id: Option<String>,
}

impl EndpointConfig {
    /// An endpoint that needs no extra headers.
    pub fn new<S: Into<String>>(url_template: S) -> Self {
        Self {
            url_template: url_template.into(),
            referer: None,
            app_id: None,
        }
    }
}

