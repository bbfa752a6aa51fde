//! Performs upstream calls with a shared Reqwest client.

use anyhow::Context;
use async_trait::async_trait;
use keywords_settings::UpstreamSettings;
use keywords_suggest_traits::{FetchError, Fetcher, ProviderOutcome, SetupError, UpstreamRequest};

/// A [`Fetcher`] backed by a connection-pooling Reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    /// The client that will be used to make HTTP requests.
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Create a fetcher whose requests respect the configured timeouts.
    ///
    /// # Errors
    /// If the underlying HTTP client cannot be created.
    pub fn new_boxed(settings: &UpstreamSettings) -> Result<Box<Self>, SetupError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .context("Unable to create the Reqwest client")
            .map_err(SetupError::Network)?;
        Ok(Box::new(Self { client }))
    }
}

/// Sort a Reqwest error into the kinds of failure a fetch can report.
fn fetch_error(error: reqwest::Error, body: bool) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else if body {
        FetchError::Body(error.into())
    } else {
        FetchError::Network(error.into())
    }
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, request: UpstreamRequest) -> ProviderOutcome {
        let response = match self
            .client
            .get(&request.url)
            .headers(request.headers)
            .send()
            .await
        {
            Ok(response) => response,
            Err(error) => return ProviderOutcome::Failure(fetch_error(error, false)),
        };

        // Statuses are kept but not judged; parsers decide by shape.
        let status = response.status();
        match response.text().await {
            Ok(body) => ProviderOutcome::Response { status, body },
            Err(error) => ProviderOutcome::Failure(fetch_error(error, true)),
        }
    }
}
