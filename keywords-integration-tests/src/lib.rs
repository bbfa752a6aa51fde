#![warn(missing_docs, clippy::missing_docs_in_private_items)]
// None of the tests are seen by the linter, so none of the utilities are marked
// as used. But docs don't generate for the below if they are `#[cfg(test)]`.
// This is a compromise.
#![allow(dead_code)]

//! Tests for the keywords service that work by reading from the external API only.
//!
//! Since the URL endpoints the service exposes to the world are its public API,
//! and web pages depend on them, the paths used in tests here are important
//! details, and used to keep compatibility.
//!
//! This is structured as a separate crate so that it produces a single test
//! binary instead of one test per file like would happen if this were
//! `keywords/tests/...`. This improves compilation and test times.
//!
//! The primary tool used by tests is [`keywords_test`], which starts a mock
//! upstream server, sets up the application for testing, and provides helpers
//! to inspect the state of the app. It then calls the test function that is
//! passed to it, providing the above tools as an argument.
//!
//! ```ignore
//! use keywords_integration_tests::{TestingTools, keywords_test_macro};
//! use reqwest::StatusCode;
//!
//! #[keywords_test_macro(|settings| settings.debug = true)]
//! async fn lbheartbeat_works(TestingTools { test_client, .. }: TestingTools) {
//!    let response = test_client
//!        .get("/__lbheartbeat__")
//!        .send()
//!        .await
//!        .expect("failed to execute request");
//!
//!    assert_eq!(response.status(), StatusCode::OK);
//!    assert_eq!(response.content_length(), Some(0));
//! }
//! ```

mod dockerflow;
mod general;
mod keywords;
mod logging;
mod utils;

pub use crate::utils::{
    logging::{LogWatcher, TracingJsonEvent},
    metrics::MetricsWatcher,
    test_tools::{keywords_test, TestReqwestClient, TestingTools},
    upstream::{
        mock_all_upstreams, mock_upstream, mock_upstream_delayed, rebase_endpoint,
        sample_result, Upstream,
    },
};

pub use keywords_integration_tests_macro::keywords_test as keywords_test_macro;
