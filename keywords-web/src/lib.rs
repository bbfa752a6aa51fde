#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! Web server for the [keywords](../keywords/index.html) autocomplete API.

mod cors;
mod dockerflow;
mod errors;
mod keywords;
mod logging;
mod middleware;

use actix_web::{
    dev::Server,
    get,
    web::{self, Data, ServiceConfig},
    App, HttpResponse, HttpServer,
};
use anyhow::Context;
use cadence::StatsdClient;
use keywords_settings::Settings;
use keywords_suggest_providers::make_fan_out;
use std::{net::TcpListener, sync::Arc};
use tracing_actix_web::TracingLogger;

pub use crate::errors::{HandlerError, HandlerErrorKind};
use crate::logging::KeywordsRootSpanBuilder;

/// Run the web server
///
/// The returned server is a `Future` that must either be `.await`ed, or run it
/// as a background task using `tokio::spawn`.
///
/// Most of the details from `settings` will be respected, except for those that
/// go into building the listener (the host and port). If you want to respect the
/// settings specified in that object, you must include them in the construction
/// of `listener`.
///
/// The providers and their HTTP client are built once, here, and shared by
/// every worker.
///
/// # Errors
///
/// Returns an error if the providers cannot be set up from `settings`, or if
/// the server cannot be started on the provided listener.
///
/// # Examples
///
/// Run the server in the foreground. This will only return if there is an error
/// that causes the server to shut down.
///
/// ```no_run
/// # tokio_test::block_on(async {
/// let listener = std::net::TcpListener::bind("127.0.0.1:8080")
///     .expect("Failed to bind port");
/// let settings = keywords_settings::Settings::load()
///     .expect("Failed to load settings");
/// let metrics_client = cadence::StatsdClient::from_sink("keywords", cadence::NopMetricSink);
/// keywords_web::run(listener, metrics_client, settings)
///     .expect("Failed to start server")
///     .await
///     .expect("Fatal error while running server");
/// # })
/// ```
pub fn run(
    listener: TcpListener,
    metrics_client: StatsdClient,
    settings: Settings,
) -> anyhow::Result<Server> {
    let num_workers = settings.http.workers;

    // One client, shared by the fan-out and every handler.
    let metrics_client = Arc::new(metrics_client);
    let fan_out = make_fan_out(&settings, Arc::clone(&metrics_client))
        .context("Setting up suggestion providers")?;
    tracing::info!(
        r#type = "web.configuring-providers",
        providers = %fan_out.name(),
        "Providers ready"
    );
    let fan_out = Data::new(fan_out);
    let metrics_client = Data::from(metrics_client);
    let settings = Data::new(settings);

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(fan_out.clone())
            .app_data(metrics_client.clone())
            .app_data(settings.clone())
            .wrap(middleware::Metrics)
            .wrap(TracingLogger::<KeywordsRootSpanBuilder>::new())
            .configure(configure_app)
    })
    .listen(listener)
    .context("Listening for connections")?;

    if let Some(n) = num_workers {
        server = server.workers(n);
    }

    Ok(server.run())
}

/// Register every route the service answers.
fn configure_app(config: &mut ServiceConfig) {
    config
        // The core functionality: the same handler under both public paths.
        .service(web::scope("api/v1/keywords").configure(keywords::configure))
        .service(web::scope(".netlify/functions/keywords").configure(keywords::configure))
        .service(root_info)
        // Add the behavior necessary to satisfy Dockerflow.
        .service(web::scope("").configure(dockerflow::configure));
}

/// The root view, to provide information about what this service is.
///
/// This is intended to be seen by people trying to investigate what this service
/// is. It should redirect to documentation, if it is available, or provide a
/// short message otherwise.
#[get("/")]
async fn root_info(settings: Data<Settings>) -> HttpResponse {
    match &settings.public_documentation {
        Some(redirect_url) => HttpResponse::Found()
            .insert_header(("location", redirect_url.to_string()))
            .finish(),
        None => HttpResponse::Ok().content_type("text/plain").body(
            "keywords gathers autocomplete suggestions for a keyword from several search platforms.",
        ),
    }
}
