// Only overview documentation that is not relevant to one of the more specific
// crates should go here.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! A web API that gathers autocomplete suggestions for a keyword from several
//! search platforms at once.
//!
//! The service is split into several subcrates that work in collaboration.
//!
//! - [keywords-integration-tests](../keywords_integration_tests/index.html)
//! - [keywords-settings](../keywords_settings/index.html)
//! - [keywords-suggest-providers](../keywords_suggest_providers/index.html)
//! - [keywords-suggest-traits](../keywords_suggest_traits/index.html)
//! - [keywords-web](../keywords_web/index.html)

mod docs;

use anyhow::{Context, Result};
use cadence::{BufferedUdpMetricSink, QueuingMetricSink, StatsdClient};
use keywords_settings::{LogFormat, Settings};
use std::net::{TcpListener, UdpSocket};
use tracing_log::LogTracer;
use tracing_subscriber::EnvFilter;

/// Primary entry point
#[actix_rt::main]
async fn main() -> Result<()> {
    let settings = Settings::load().context("Loading settings")?;
    init_logging(&settings).context("Initializing logging")?;
    let metrics_client = init_metrics(&settings).context("Initializing metrics")?;
    let listener = TcpListener::bind(settings.http.listen).context("Binding port")?;

    tracing::info!(
        r#type = "app.starting",
        env = %settings.env,
        listen = %settings.http.listen,
        "Starting keywords"
    );

    keywords_web::run(listener, metrics_client, settings)
        .context("Starting keywords-web server")?
        .await
        .context("Running keywords-web server")?;

    Ok(())
}

/// Set up logging, based on settings and the `RUST_LOG` environment variable.
fn init_logging(settings: &Settings) -> Result<()> {
    LogTracer::init()?;
    let env_filter: EnvFilter = (&settings.logging.levels).into();
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);

    match settings.logging.format {
        LogFormat::Pretty => tracing::subscriber::set_global_default(builder.pretty().finish())?,
        LogFormat::Json => tracing::subscriber::set_global_default(
            builder
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .finish(),
        )?,
        LogFormat::Compact => {
            tracing::subscriber::set_global_default(builder.compact().finish())?
        }
    }

    Ok(())
}

/// Build the statsd client shared by the server and the providers.
fn init_metrics(settings: &Settings) -> Result<StatsdClient> {
    let socket = UdpSocket::bind("0.0.0.0:0").context("Binding metrics socket")?;
    socket.set_nonblocking(true)?;

    let host = (settings.metrics.sink_host.as_str(), settings.metrics.sink_port);
    let udp_sink = BufferedUdpMetricSink::from(host, socket)?;
    // The queue is bounded in metrics, not bytes; assume about 64 bytes each.
    let capacity = settings.metrics.max_queue_size_kb * 1024 / 64;
    let queuing_sink = QueuingMetricSink::with_capacity(udp_sink, capacity);

    Ok(StatsdClient::builder("keywords", queuing_sink)
        .with_error_handler(|error| {
            tracing::warn!(r#type = "app.metrics-error", %error, "Could not send metrics")
        })
        .build())
}
