//! # Testing strategies
//!
//! There are two major testing strategies used in this repository: unit tests,
//! and integration tests.
//!
//! Unit tests should appear close to the code they are testing, using standard
//! Rust unit tests. This is suitable for testing complex behavior at a small
//! scale, with fine grained control over the inputs. Provider parsers are tested
//! this way against recorded response shapes, and the fan-out is tested with
//! fake fetchers that need no network.
//!
//! Behaviors that span the whole service, like the URLs it exposes and the
//! headers it sends, are tested in [`keywords-integration-tests`][test-crate].
//! It starts an instance of the server with every provider pointed at an
//! [`httpmock`][] server. HTTP requests can then be made to that server in
//! order to test its behavior.
//!
//! [test-crate]: ../../../keywords_integration_tests/
//! [`httpmock`]: https://docs.rs/httpmock
//!
//! ```ignore
//! #[actix_rt::test]
//! async fn lbheartbeat_works() {
//!     keywords_test(
//!         |_| (),
//!         |TestingTools { test_client, .. }| async move {
//!             let response = test_client
//!                 .get("/__lbheartbeat__")
//!                 .send()
//!                 .await
//!                 .expect("failed to execute request");
//!
//!             assert_eq!(response.status(), StatusCode::OK);
//!         },
//!     )
//!     .await
//! }
//! ```
//!
//! Tests that change settings can do so through the first argument, before the
//! server starts. Logs written during the test can be inspected with
//! `TestingTools::log_watcher`, and metrics with `TestingTools::metrics_watcher`.
//!
//! ## Running tests
//!
//! ```shell
//! $ cargo test
//! ```
//!
//! Tests read `config/test.yaml` on top of `config/base.yaml`. Settings for
//! your machine only can go in `config/local_test.yaml`.
