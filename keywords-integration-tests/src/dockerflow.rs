//! Tests that the service conforms to [Dockerflow](https://github.com/mozilla-services/dockerflow).
#![cfg(test)]

use crate::{keywords_test_macro, TestingTools};
use anyhow::Result;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};

#[keywords_test_macro]
async fn lbheartbeat_works(TestingTools { test_client, .. }: TestingTools) {
    let response = test_client
        .get("/__lbheartbeat__")
        .send()
        .await
        .expect("failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.content_length(), Some(0));
}

#[keywords_test_macro]
async fn heartbeat_works(TestingTools { test_client, .. }: TestingTools) -> Result<()> {
    let response = test_client.get("/__heartbeat__").send().await?;

    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get_all("content-type")
            .iter()
            .collect::<Vec<_>>(),
        vec!["application/json"]
    );
    let body: Value = response.json().await?;
    assert!(body["version"].is_string());
    Ok(())
}

#[keywords_test_macro]
async fn version_works(TestingTools { test_client, .. }: TestingTools) -> Result<()> {
    let response = test_client.get("/__version__").send().await?;

    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get_all("content-type")
            .iter()
            .collect::<Vec<_>>(),
        vec!["application/json"]
    );

    #[derive(Deserialize, Debug)]
    #[allow(dead_code)]
    struct VersionInfo {
        source: String,
        version: String,
        commit: String,
        build: String,
    }
    let body: Result<VersionInfo, _> = response.json().await;
    assert!(body.is_ok());

    Ok(())
}

#[keywords_test_macro]
async fn error_works(
    TestingTools {
        test_client,
        mut metrics_watcher,
        ..
    }: TestingTools,
) -> Result<()> {
    let response = test_client.get("/__error__").send().await?;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await?;
    assert_eq!(body, json!({"error": "Internal error"}));
    assert!(metrics_watcher.has_named("request.duration"));

    Ok(())
}
