//! One adapter per upstream provider, and the pieces they share.

pub(crate) mod google;
pub(crate) mod instagram;
pub(crate) mod tiktok;
pub(crate) mod youtube;

use anyhow::{anyhow, Context};
use http::{
    header::{HeaderName, HeaderValue},
    HeaderMap, Uri,
};
use keywords_settings::{providers::KEYWORD_PLACEHOLDER, EndpointConfig};
use keywords_suggest_traits::{
    Keyword, ProviderId, ProviderOutcome, SetupError, Suggestion, UpstreamRequest,
};

/// A validated URL template plus the fixed headers sent with every request to it.
#[derive(Debug)]
pub(crate) struct Endpoint {
    /// The URL, containing the keyword placeholder.
    url_template: String,
    /// Headers sent on every request.
    headers: HeaderMap,
}

impl Endpoint {
    /// Check that `config` describes a usable endpoint.
    pub(crate) fn new(config: &EndpointConfig) -> Result<Self, SetupError> {
        if !config.url_template.contains(KEYWORD_PLACEHOLDER) {
            return Err(SetupError::InvalidConfiguration(anyhow!(
                "URL template {:?} does not contain {}",
                config.url_template,
                KEYWORD_PLACEHOLDER
            )));
        }
        config
            .url_template
            .replace(KEYWORD_PLACEHOLDER, "keyword")
            .parse::<Uri>()
            .with_context(|| format!("parsing URL template {:?}", config.url_template))
            .map_err(SetupError::InvalidConfiguration)?;

        Ok(Self {
            url_template: config.url_template.clone(),
            headers: HeaderMap::new(),
        })
    }

    /// Add a header that is sent on every request.
    pub(crate) fn with_header(mut self, name: HeaderName, value: &str) -> Result<Self, SetupError> {
        let value = HeaderValue::from_str(value)
            .with_context(|| format!("invalid value for the {} header", name))
            .map_err(SetupError::InvalidConfiguration)?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Build the request for `keyword`.
    pub(crate) fn request_for(&self, keyword: &Keyword) -> UpstreamRequest {
        UpstreamRequest {
            url: self
                .url_template
                .replace(KEYWORD_PLACEHOLDER, &keyword.percent_encoded()),
            headers: self.headers.clone(),
        }
    }
}

/// Fetch a setting that `provider` cannot work without.
pub(crate) fn required<'a>(
    value: &'a Option<String>,
    setting: &str,
    provider: ProviderId,
) -> Result<&'a str, SetupError> {
    value.as_deref().ok_or_else(|| {
        SetupError::InvalidConfiguration(anyhow!("{} requires `{}` to be set", provider, setting))
    })
}

/// Run `extract` against the body of `outcome`, treating a missing body or a
/// body of the wrong shape as no suggestions.
///
/// `extract` returns `None` when the body is not in the shape it expects.
pub(crate) fn normalize<F>(provider: ProviderId, outcome: &ProviderOutcome, extract: F) -> Vec<Suggestion>
where
    F: FnOnce(&str) -> Option<Vec<Suggestion>>,
{
    let (status, body) = match outcome {
        ProviderOutcome::Response { status, body } => (status, body),
        // Transport failures are reported by the fan-out.
        ProviderOutcome::Failure(_) => return Vec::new(),
    };

    extract(body).unwrap_or_else(|| {
        tracing::debug!(
            r#type = "provider.parse-empty",
            %provider,
            status = status.as_u16(),
            "Provider response was not in the expected shape"
        );
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::{required, Endpoint};
    use http::header::REFERER;
    use keywords_settings::EndpointConfig;
    use keywords_suggest_traits::{Keyword, ProviderId, SetupError};

    #[test]
    fn endpoint_requires_placeholder() {
        let result = Endpoint::new(&EndpointConfig::new("https://example.com/complete?q=cats"));
        assert!(matches!(result, Err(SetupError::InvalidConfiguration(_))));
    }

    #[test]
    fn endpoint_rejects_unparsable_templates() {
        let result = Endpoint::new(&EndpointConfig::new("not a url {keyword}"));
        assert!(matches!(result, Err(SetupError::InvalidConfiguration(_))));
    }

    #[test]
    fn endpoint_rejects_bad_header_values() {
        let result = Endpoint::new(&EndpointConfig::new("https://example.com/?q={keyword}"))
            .and_then(|endpoint| endpoint.with_header(REFERER, "line\nbreak"));
        assert!(matches!(result, Err(SetupError::InvalidConfiguration(_))));
    }

    #[test]
    fn request_encodes_keyword() {
        let endpoint = Endpoint::new(&EndpointConfig::new("https://example.com/?q={keyword}&n=1"))
            .expect("valid endpoint");
        let keyword = Keyword::parse(Some("red cats")).unwrap();
        assert_eq!(
            endpoint.request_for(&keyword).url,
            "https://example.com/?q=red%20cats&n=1"
        );
    }

    #[test]
    fn required_settings_must_be_present() {
        assert!(required(&None, "referer", ProviderId::Tiktok).is_err());
        assert_eq!(
            required(&Some("x".to_string()), "referer", ProviderId::Tiktok).unwrap(),
            "x"
        );
    }
}
