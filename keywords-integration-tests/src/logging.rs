//! Tests that the service's logs behave as expected.
//!
//! This module should be used for general logging behavior. Logging behavior for
//! specific parts of the service should be placed in more specific test modules.
#![cfg(test)]

use crate::{keywords_test_macro, TestingTools};

#[keywords_test_macro]
async fn startup_logs_the_providers(TestingTools { mut log_watcher, .. }: TestingTools) {
    assert!(log_watcher.has(|event| {
        event.field_contains("message", "Providers ready")
            && event.field_contains("providers", "FanOut(google, youtube, tiktok, instagram)")
    }));
}

#[keywords_test_macro]
async fn startup_logs_are_structured(TestingTools { mut log_watcher, .. }: TestingTools) {
    assert!(log_watcher.has(|event| {
        event.level == tracing::Level::INFO
            && event.field_contains("type", "providers.configuring")
    }));
}
