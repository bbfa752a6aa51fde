//! Web handlers for the keywords API.

use crate::{cors::with_cors, errors::HandlerError};
use actix_web::{
    http::Method,
    web::{self, Data, ServiceConfig},
    HttpRequest, HttpResponse,
};
use cadence::{CountedExt, StatsdClient};
use keywords_settings::Settings;
use keywords_suggest_providers::FanOut;
use keywords_suggest_traits::{InvalidKeyword, Keyword};

/// Configure a route to use the keywords service.
pub fn configure(config: &mut ServiceConfig) {
    config.service(
        web::resource("")
            .route(web::get().to(keywords))
            .route(web::method(Method::OPTIONS).to(preflight)),
    );
}

/// Find the keyword in a raw query string.
///
/// `q` may be repeated; the first value that is not blank wins. A query string
/// that cannot be read counts as one without `q`.
fn keyword_from_query(query_string: &str) -> Result<Keyword, InvalidKeyword> {
    let pairs = web::Query::<Vec<(String, String)>>::from_query(query_string)
        .map(web::Query::into_inner)
        .unwrap_or_default();

    pairs
        .iter()
        .filter(|(name, _)| name == "q")
        .find_map(|(_, value)| Keyword::parse(Some(value.as_str())).ok())
        .ok_or(InvalidKeyword)
}

/// Gather autocomplete suggestions for the queried keyword from every provider.
#[tracing::instrument(skip_all)]
async fn keywords(
    request: HttpRequest,
    fan_out: Data<FanOut>,
    metrics_client: Data<StatsdClient>,
    settings: Data<Settings>,
) -> Result<HttpResponse, HandlerError> {
    let keyword = keyword_from_query(request.query_string()).map_err(|error| {
        metrics_client.incr("keywords.invalid").ok();
        HandlerError::from(error)
    })?;

    safe_log_request(settings.log_full_request, &keyword);
    metrics_client.incr("keywords.request").ok();

    let result = fan_out.suggest(keyword).await;
    tracing::debug!(
        r#type = "web.keywords.provided-count",
        google = result.google.len(),
        youtube = result.youtube.len(),
        tiktok = result.tiktok.len(),
        instagram = result.instagram.len(),
        "Providing keywords"
    );

    Ok(with_cors(&mut HttpResponse::Ok()).json(&result))
}

/// Answer a CORS preflight request.
async fn preflight() -> HttpResponse {
    with_cors(&mut HttpResponse::NoContent()).finish()
}

/// Log the request, leaving out the keyword unless full request logging is on.
fn safe_log_request(log_keyword: bool, keyword: &Keyword) {
    let logged_keyword = if log_keyword { keyword.as_str() } else { "" };
    tracing::info!(
        r#type = "web.keywords.request",
        sensitive = true,
        keyword = logged_keyword,
        keyword_length = keyword.as_str().chars().count(),
        "Handling keywords request"
    );
}
