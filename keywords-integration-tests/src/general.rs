//! Tests for the service's general behavior, outside of any one endpoint.
#![cfg(test)]

use crate::{keywords_test, TestingTools};
use anyhow::Result;
use reqwest::{header::HeaderValue, StatusCode};

#[actix_rt::test]
async fn root_of_services_provides_public_docs() -> Result<()> {
    keywords_test(
        |settings| settings.public_documentation = Some("https://example.com/".parse().unwrap()),
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/").send().await?;

            assert_eq!(response.status(), StatusCode::FOUND);
            assert_eq!(
                response.headers().get("location"),
                Some(&HeaderValue::from_static("https://example.com/"))
            );

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn root_of_services_has_a_fallback_message() -> Result<()> {
    keywords_test(
        |settings| settings.public_documentation = None,
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/").send().await?;

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response.text().await?,
                "keywords gathers autocomplete suggestions for a keyword from several search platforms."
            );

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn unknown_paths_are_not_found() -> Result<()> {
    keywords_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/api/v1/suggest?q=cats").send().await?;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            Ok(())
        },
    )
    .await
}
