#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! # Keywords Settings
//!
//! Configuration is specified in several ways, with later methods overriding earlier ones.
//!
//! 1. A base configuration checked into the repository, in `config/base.yaml`.
//!    This provides the default values for most settings.
//! 2. Per-environment configuration files in the `config` directory. The
//!    environment is selected using the environment variable `KEYWORDS_ENV`. The
//!    settings for that environment are then loaded from `config/${env}.yaml`, if
//!    it exists. The default environment is "development". A "production"
//!    environment is also provided.
//! 3. A local configuration file not checked into the repository, at
//!    `config/local.yaml`. This file is in `.gitignore` and is safe to use for
//!    local configuration if desired.
//! 4. Environment variables that begin with `KEYWORDS_` and have a separator for
//!    `__`. For example, `Settings::http::workers` can be controlled from the
//!    environment variable `KEYWORDS_HTTP__WORKERS`.
//!
//! Tests should use `Settings::load_for_tests` which only reads from
//! `config/base.yaml`, `config/test.yaml`, and `config/local_test.yaml` (if it
//! exists). It does not read from environment variables.
//!
//! Configuration files are canonically YAML files. However, any format supported
//! by the [config] crate can be used, including JSON and TOML. To choose another
//! format, simply use a different extension for your file, like
//! `config/local.toml`.

mod logging;
pub mod providers;

pub use logging::{LogFormat, LoggingSettings};
pub use providers::{EndpointConfig, ProviderSettings, UpstreamSettings};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use http::Uri;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use std::net::SocketAddr;

/// Top level settings object for Keywords.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    /// The environment Keywords is running in. Should only be set with the
    /// `KEYWORDS_ENV` environment variable.
    pub env: String,

    /// Enable additional features to debug the application. This should not be
    /// set to true in production environments.
    pub debug: bool,

    /// A URL to redirect visitors of `/` to. If `None`, a short description of
    /// the service is shown instead.
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub public_documentation: Option<Uri>,

    /// Whether the keyword of each request is written to the logs. Keywords
    /// are user input, so this is off outside of development.
    pub log_full_request: bool,

    /// Settings for the HTTP server.
    pub http: HttpSettings,

    /// Settings for the HTTP client shared by all upstream providers.
    pub upstream: UpstreamSettings,

    /// Endpoints and client headers of the upstream providers.
    pub providers: ProviderSettings,

    /// Logging settings.
    pub logging: LoggingSettings,

    /// Metrics settings.
    pub metrics: MetricsSettings,
}

/// Settings for the HTTP server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpSettings {
    /// The host and port to listen on, such as "127.0.0.1:8080" or "0.0.0.0:80".
    pub listen: SocketAddr,

    /// The number of workers to use. Optional. If no value is provided, the
    /// number of logical cores will be used.
    pub workers: Option<usize>,
}

/// Settings for the statsd metrics sink.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetricsSettings {
    /// The host to send metrics to, such as "127.0.0.1" or "metrics.example.com".
    pub sink_host: String,

    /// The port to send metrics to.
    pub sink_port: u16,

    /// The maximum size of the in-memory queue of metrics waiting to be sent,
    /// in kilobytes. If the queue fills, new metrics are dropped.
    pub max_queue_size_kb: usize,
}

impl Settings {
    /// Load settings from configuration files and environment variables.
    ///
    /// # Errors
    /// If any of the configured values are invalid, or if any of the required
    /// configuration files are missing.
    pub fn load() -> Result<Self> {
        let keywords_env =
            std::env::var("KEYWORDS_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start off with the base config.
            .add_source(File::with_name("./config/base"))
            // Merge in an environment specific config.
            .add_source(File::with_name(&format!("config/{}", keywords_env)).required(false))
            // Add a local configuration file that is `.gitignore`ed.
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables that start with "KEYWORDS_" and have "__" to
            // separate levels. For example, `KEYWORDS_HTTP__LISTEN` maps to
            // `Settings::http::listen`.
            .add_source(
                Environment::with_prefix("KEYWORDS")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override("env", keywords_env.as_str())
            .context("setting the environment name")?
            .build()
            .context("loading settings")?;

        serde_path_to_error::deserialize(config).context("deserializing settings")
    }

    /// Load settings from configuration files for tests.
    ///
    /// # Panics
    /// If the test configuration files are missing or invalid.
    pub fn load_for_tests() -> Self {
        let config = Config::builder()
            // Start off with the base config.
            .add_source(File::with_name("../config/base"))
            // Merge in test specific config.
            .add_source(File::with_name("../config/test"))
            // Add a local configuration file that is `.gitignore`ed.
            .add_source(File::with_name("../config/local_test").required(false))
            .set_override("env", "test")
            .expect("Could not set env for tests")
            .build()
            .expect("Could not load settings for tests");

        config.try_deserialize().expect("Could not convert settings")
    }
}

#[cfg(test)]
mod tests {
    use super::Settings;

    #[test]
    fn test_settings_load() {
        let settings = Settings::load_for_tests();
        assert_eq!(settings.env, "test");
        assert!(settings.providers.google.url_template.contains("{keyword}"));
        assert!(settings.providers.instagram.app_id.is_some());
    }

    #[test]
    fn test_default_provider_templates() {
        let providers = Settings::load_for_tests().providers;
        assert_eq!(
            providers.google.url_template,
            "https://suggestqueries.google.com/complete/search?client=firefox&q={keyword}"
        );
        assert_eq!(
            providers.youtube.url_template,
            "https://suggestqueries.google.com/complete/search?client=youtube&q={keyword}"
        );
    }

    #[test]
    fn test_settings_are_serializable() {
        let settings = Settings::load_for_tests();
        let value = serde_json::to_value(&settings).expect("settings should serialize");
        assert_eq!(value["upstream"]["request_timeout_ms"], 2000);
    }
}
