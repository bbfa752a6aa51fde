//! Tools for running tests

use crate::utils::{logging::LogWatcher, metrics::MetricsWatcher, upstream::rebase_endpoint};
use httpmock::MockServer;
use keywords_settings::Settings;
use reqwest::{redirect, Client, ClientBuilder, Method, RequestBuilder};
use std::{future::Future, net::TcpListener};
use tracing::{instrument::WithSubscriber, Instrument};
use tracing_subscriber::{fmt::MakeWriter, layer::SubscriberExt};

/// Run a test with a fully configured keywords server.
///
/// The server will listen on a port assigned arbitrarily by the OS.
///
/// Every provider is pointed at one [`MockServer`] before the server starts, so
/// no test reaches the real platforms. The mock server starts with no mocks;
/// requests that match nothing get a 404 with an empty body.
///
/// A suite of tools will be passed to the test function in the form of an
/// instance of [`TestingTools`]. It includes an HTTP client configured to use
/// the test server, the upstream mock server, and watchers for logs and
/// metrics.
///
/// `settings_changer` runs after the providers are pointed at the mock server,
/// so it can still override any setting.
///
/// # Example
///
/// ```
/// # use keywords_integration_tests::{keywords_test, TestingTools};
/// #[actix_rt::test]
/// async fn a_test() {
///     keywords_test(
///         |settings| settings.debug = false,
///         |TestingTools { test_client, .. }| async move {
///             assert!(true) // Test goes here
///         }
///     ).await
/// }
/// ```
///
/// # Panics
/// May panic if tests could not be set up correctly.
pub async fn keywords_test<FSettings, FTest, Fut>(
    settings_changer: FSettings,
    test: FTest,
) -> Fut::Output
where
    FSettings: FnOnce(&mut Settings),
    FTest: Fn(TestingTools) -> Fut,
    Fut: Future,
{
    let test_span = tracing::info_span!("keywords_test");

    // Load settings
    let mut settings = Settings::load_for_tests();

    // Set up logging
    let log_watcher = LogWatcher::default();
    let log_watcher_writer = log_watcher.make_writer();

    let env_filter: tracing_subscriber::EnvFilter = (&settings.logging.levels).into();
    let tracing_subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(move || log_watcher_writer.clone()),
        )
        .with(tracing_subscriber::fmt::layer().pretty().with_test_writer());

    let _tracing_subscriber_guard = tracing::subscriber::set_default(tracing_subscriber);

    // Point every provider at one mock server
    let upstream_mock = MockServer::start_async().await;
    let base_url = upstream_mock.base_url();
    let providers = &mut settings.providers;
    providers.google = rebase_endpoint(&providers.google, &base_url);
    providers.youtube = rebase_endpoint(&providers.youtube, &base_url);
    providers.tiktok = rebase_endpoint(&providers.tiktok, &base_url);
    providers.instagram = rebase_endpoint(&providers.instagram, &base_url);

    settings_changer(&mut settings);

    // Setup metrics
    assert_eq!(
        settings.metrics.sink_host, "0.0.0.0",
        "Tests cannot change the metrics sink host, since it is ignored"
    );
    assert_eq!(
        settings.metrics.sink_port, 8125,
        "Tests cannot change the metrics sink address, since it is ignored"
    );
    let (metrics_watcher, metrics_client) = MetricsWatcher::new_with_client();

    // Run server in the background
    let listener = TcpListener::bind(settings.http.listen).expect("Failed to bind to a port");
    let address = listener
        .local_addr()
        .expect("Listener has no local address")
        .to_string();
    let server =
        keywords_web::run(listener, metrics_client, settings).expect("Failed to start server");
    let server_handle = tokio::spawn(server.with_current_subscriber());
    let test_client = TestReqwestClient::new(address);

    // Assemble the tools
    let tools = TestingTools {
        test_client,
        upstream_mock,
        log_watcher,
        metrics_watcher,
    };
    // Run the test
    let rv = test(tools).instrument(test_span).await;
    server_handle.abort();
    rv
}

/// A set of tools for tests, including mock servers and logging helpers.
///
/// The fields of this struct are marked as non-exhaustive, meaning that any
/// destructuring of this struct will require a `..` "and the rest" entry, even
/// if all present items are named. This makes adding tools in the future easier,
/// since old tests won't need to be rewritten to account for the added tools.
#[non_exhaustive]
pub struct TestingTools {
    /// A wrapper around a `reqwest::client` that automatically uses the
    /// keywords server under test.
    pub test_client: TestReqwestClient,

    /// The [`httpmock::MockServer`] that every provider has been configured to
    /// call. Does not contain mock responses, any needed must be added, for
    /// example with [`mock_upstream`](crate::mock_upstream).
    pub upstream_mock: MockServer,

    /// To make assertions about logs.
    ///
    /// Only events emitted on the test's own thread are seen. The server's
    /// workers run on threads of their own.
    pub log_watcher: LogWatcher,

    /// To make assertions about metrics.
    pub metrics_watcher: MetricsWatcher,
}

/// A wrapper around a `[reqwest::client]` that automatically sends requests to
/// the test server.
///
/// The client is configured to not follow any redirects.
pub struct TestReqwestClient {
    /// The wrapped client.
    client: Client,

    /// The server address to implicitly use for all requests.
    address: String,
}

impl TestReqwestClient {
    /// Construct a new test client that uses `address` for every request given.
    pub fn new(address: String) -> Self {
        let client = ClientBuilder::new()
            .redirect(redirect::Policy::none())
            .build()
            .expect("Could not build test client");
        Self { client, address }
    }

    /// Start building a GET request to the test server with the path specified.
    ///
    /// The path should start with `/`, such as `/__heartbeat__`.
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.request(Method::GET, path)
    }

    /// Start building a request with any method to the test server.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        assert!(path.starts_with('/'));
        let url = format!("http://{}{}", &self.address, path);
        self.client.request(method, url)
    }
}
