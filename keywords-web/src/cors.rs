//! The fixed cross-origin headers sent with every keywords response.

use actix_web::HttpResponseBuilder;

/// Origins allowed to read responses.
pub const ALLOW_ORIGIN: &str = "*";

/// Methods the keywords endpoint answers.
pub const ALLOW_METHODS: &str = "GET, OPTIONS";

/// Request headers browsers may send.
pub const ALLOW_HEADERS: &str = "Content-Type";

/// Add the cross-origin headers to a response under construction.
pub fn with_cors(builder: &mut HttpResponseBuilder) -> &mut HttpResponseBuilder {
    builder
        .insert_header(("Access-Control-Allow-Origin", ALLOW_ORIGIN))
        .insert_header(("Access-Control-Allow-Methods", ALLOW_METHODS))
        .insert_header(("Access-Control-Allow-Headers", ALLOW_HEADERS))
}
