//! Tests the keywords endpoint against mocked providers.
#![cfg(test)]

use crate::{
    keywords_test_macro, mock_all_upstreams, mock_upstream, mock_upstream_delayed, sample_result,
    TestingTools, Upstream,
};
use anyhow::Result;
use parameterized::parameterized;
use reqwest::{Method, Response, StatusCode};
use serde_json::{json, Value};
use std::time::{Duration, Instant};

// `pretty_assertions::assert_eq` is called by path. A glob import would clash
// with the prelude macro inside the modules `parameterized` generates.

fn assert_cors(response: &Response) {
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-methods"], "GET, OPTIONS");
    assert_eq!(headers["access-control-allow-headers"], "Content-Type");
}

#[keywords_test_macro]
#[parameterized(path = { "/api/v1/keywords", "/.netlify/functions/keywords" })]
async fn keywords_are_gathered_from_every_provider(
    TestingTools {
        test_client,
        upstream_mock,
        ..
    }: TestingTools,
    path: &str,
) {
    let mocks = mock_all_upstreams(&upstream_mock).await;

    let response = test_client
        .get(&format!("{}?q=cats", path))
        .send()
        .await
        .expect("failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);
    assert_eq!(response.headers()["content-type"], "application/json");
    let body: Value = response.json().await.expect("body is JSON");
    pretty_assertions::assert_eq!(body, sample_result());
    for mock in mocks {
        mock.assert_hits_async(1).await;
    }
}

#[keywords_test_macro]
async fn fields_are_in_a_fixed_order(
    TestingTools {
        test_client,
        upstream_mock,
        ..
    }: TestingTools,
) -> Result<()> {
    mock_all_upstreams(&upstream_mock).await;

    let body = test_client.get("/api/v1/keywords?q=cats").send().await?.text().await?;
    let keys: Vec<_> = ["\"keyword\"", "\"google\"", "\"youtube\"", "\"tiktok\"", "\"instagram\""]
        .iter()
        .map(|key| body.find(key).expect("key is present"))
        .collect();
    let mut sorted = keys.clone();
    sorted.sort_unstable();
    assert_eq!(keys, sorted);
    Ok(())
}

#[keywords_test_macro]
async fn keyword_is_trimmed_and_encoded_for_providers(
    TestingTools {
        test_client,
        upstream_mock,
        ..
    }: TestingTools,
) -> Result<()> {
    let google = upstream_mock
        .mock_async(|when, then| {
            when.path("/complete/search")
                .query_param("client", "firefox")
                .query_param("q", "hot dog & fries");
            then.status(200).body(r#"["hot dog & fries",["hot dog & fries near me"]]"#);
        })
        .await;

    let response = test_client
        .get("/api/v1/keywords?q=%20%20hot%20dog%20%26%20fries%20")
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["keyword"], "hot dog & fries");
    assert_eq!(body["google"], json!(["hot dog & fries near me"]));
    google.assert_hits_async(1).await;
    Ok(())
}

#[keywords_test_macro]
#[parameterized(query = { "", "?q=", "?q=%20%20%20", "?keyword=cats" })]
async fn missing_keywords_are_rejected(
    TestingTools {
        test_client,
        upstream_mock,
        mut metrics_watcher,
        ..
    }: TestingTools,
    query: &str,
) {
    let any_upstream = upstream_mock
        .mock_async(|_when, then| {
            then.status(200).body("[]");
        })
        .await;

    let response = test_client
        .get(&format!("/api/v1/keywords{}", query))
        .send()
        .await
        .expect("failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_cors(&response);
    let body: Value = response.json().await.expect("body is JSON");
    pretty_assertions::assert_eq!(body, json!({"error": "Missing query parameter: q"}));
    any_upstream.assert_hits_async(0).await;
    assert!(metrics_watcher.has_named("keywords.invalid"));
    assert!(!metrics_watcher.has_named("keywords.request"));
}

#[keywords_test_macro]
#[parameterized(query = { "?q=cats&q=dogs", "?q=&q=cats", "?q=cats&q=", "?q=%20&keyword=dogs&q=cats" })]
async fn repeated_keywords_use_the_first_non_blank_value(
    TestingTools {
        test_client,
        upstream_mock,
        mut metrics_watcher,
        ..
    }: TestingTools,
    query: &str,
) {
    let mocks = mock_all_upstreams(&upstream_mock).await;

    let response = test_client
        .get(&format!("/api/v1/keywords{}", query))
        .send()
        .await
        .expect("failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);
    let body: Value = response.json().await.expect("body is JSON");
    pretty_assertions::assert_eq!(body, sample_result());
    for mock in mocks {
        mock.assert_hits_async(1).await;
    }
    assert!(!metrics_watcher.has_named("keywords.invalid"));
}

#[keywords_test_macro]
#[parameterized(path = { "/api/v1/keywords", "/.netlify/functions/keywords" })]
async fn preflight_requests_are_answered(
    TestingTools {
        test_client,
        upstream_mock,
        ..
    }: TestingTools,
    path: &str,
) {
    let any_upstream = upstream_mock
        .mock_async(|_when, then| {
            then.status(200).body("[]");
        })
        .await;

    let response = test_client
        .request(Method::OPTIONS, path)
        .send()
        .await
        .expect("failed to execute request");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_cors(&response);
    any_upstream.assert_hits_async(0).await;
}

#[keywords_test_macro(|settings| settings.upstream.request_timeout = Duration::from_millis(300))]
async fn failing_providers_only_empty_their_own_field(
    TestingTools {
        test_client,
        upstream_mock,
        mut metrics_watcher,
        ..
    }: TestingTools,
) -> Result<()> {
    let google = mock_upstream(&upstream_mock, Upstream::Google, 500, "<html>oops</html>").await;
    let youtube =
        mock_upstream(&upstream_mock, Upstream::Youtube, 200, r#"{"unexpected":true}"#).await;
    let tiktok = mock_upstream_delayed(
        &upstream_mock,
        Upstream::Tiktok,
        200,
        Upstream::Tiktok.sample_body(),
        Duration::from_secs(2),
    )
    .await;
    let instagram = mock_upstream(
        &upstream_mock,
        Upstream::Instagram,
        200,
        Upstream::Instagram.sample_body(),
    )
    .await;

    let response = test_client.get("/api/v1/keywords?q=cats").send().await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    pretty_assertions::assert_eq!(
        body,
        json!({
            "keyword": "cats",
            "google": [],
            "youtube": [],
            "tiktok": [],
            "instagram": sample_result()["instagram"],
        })
    );
    for mock in [google, youtube, tiktok, instagram] {
        mock.assert_hits_async(1).await;
    }
    assert!(metrics_watcher.has_named("provider.tiktok.transport-error"));
    assert!(!metrics_watcher.has_named("provider.google.transport-error"));
    Ok(())
}

#[keywords_test_macro]
async fn all_providers_failing_still_succeeds(
    TestingTools {
        test_client,
        upstream_mock,
        ..
    }: TestingTools,
) -> Result<()> {
    let any_upstream = upstream_mock
        .mock_async(|_when, then| {
            then.status(503).body("Service Unavailable");
        })
        .await;

    let response = test_client.get("/api/v1/keywords?q=cats").send().await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);
    let body: Value = response.json().await?;
    pretty_assertions::assert_eq!(
        body,
        json!({"keyword": "cats", "google": [], "youtube": [], "tiktok": [], "instagram": []})
    );
    any_upstream.assert_hits_async(4).await;
    Ok(())
}

#[keywords_test_macro(|settings| settings.upstream.request_timeout = Duration::from_secs(5))]
async fn providers_are_asked_concurrently(
    TestingTools {
        test_client,
        upstream_mock,
        ..
    }: TestingTools,
) -> Result<()> {
    for upstream in Upstream::ALL {
        mock_upstream_delayed(
            &upstream_mock,
            upstream,
            200,
            upstream.sample_body(),
            Duration::from_millis(500),
        )
        .await;
    }

    let start = Instant::now();
    let response = test_client.get("/api/v1/keywords?q=cats").send().await?;
    let elapsed = start.elapsed();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    pretty_assertions::assert_eq!(body, sample_result());
    // One at a time would take at least two seconds.
    assert!(elapsed < Duration::from_millis(1500), "took {:?}", elapsed);
    Ok(())
}

#[keywords_test_macro]
async fn identical_requests_get_identical_bodies(
    TestingTools {
        test_client,
        upstream_mock,
        ..
    }: TestingTools,
) -> Result<()> {
    mock_all_upstreams(&upstream_mock).await;

    let first = test_client.get("/api/v1/keywords?q=cats").send().await?.bytes().await?;
    let second = test_client.get("/api/v1/keywords?q=cats").send().await?.bytes().await?;
    assert_eq!(first, second);
    Ok(())
}

#[keywords_test_macro]
async fn requests_are_counted_and_timed(
    TestingTools {
        test_client,
        upstream_mock,
        mut metrics_watcher,
        ..
    }: TestingTools,
) -> Result<()> {
    mock_all_upstreams(&upstream_mock).await;

    let response = test_client.get("/api/v1/keywords?q=cats").send().await?;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(metrics_watcher.count_named("keywords.request"), 1);
    assert!(metrics_watcher.has_named("request.duration"));
    assert!(metrics_watcher.has_histogram("provider.google.suggestions", 2.0));
    assert!(metrics_watcher.has_histogram("provider.instagram.suggestions", 2.0));
    Ok(())
}
