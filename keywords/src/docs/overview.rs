//! # High level overview
//!
//! This project is structured as a [Cargo Workspace][] that contains one crate
//! for each broad area of behavior. The crates can be built and tested either
//! individually or as a group.
//!
//! [Cargo Workspace]: https://doc.rust-lang.org/book/ch14-03-cargo-workspaces.html
//!
//! This is a brief overview of the crates found in the repository. For more
//! details, see the specific crate docs.
//!
//! ## [`keywords`](../)
//!
//! The *binary* crate. It loads the settings, sets up logging and metrics, and
//! runs the web server.
//!
//! ## [`keywords-settings`](../../keywords_settings/index.html)
//!
//! Defines and documents the settings of the application, loaded from layered
//! configuration files and environment variables.
//!
//! ## [`keywords-web`](../../keywords_web/index.html)
//!
//! The HTTP API: the keywords endpoint, its CORS handling, request logging,
//! and the operational Dockerflow endpoints.
//!
//! ## [`keywords-suggest-traits`](../../keywords_suggest_traits/index.html)
//!
//! The *domain* crate. It defines keywords, suggestions, the aggregated result,
//! and the traits that providers and the HTTP layer implement.
//!
//! ## [`keywords-suggest-providers`](../../keywords_suggest_providers/index.html)
//!
//! One adapter per upstream platform, the shared HTTP client, and the fan-out
//! that asks every provider at once and combines their answers.
//!
//! ## [`keywords-integration-tests`](../../keywords_integration_tests/index.html)
//!
//! Starts the whole service against a mock upstream server and exercises it
//! over HTTP.
