//! Any errors that keywords-web might generate, and supporting implementations.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

use actix_web::{http::StatusCode, HttpResponse, HttpResponseBuilder, ResponseError};
use backtrace::Backtrace;
use keywords_suggest_traits::InvalidKeyword;
use serde_json::Value;
use thiserror::Error;

use crate::cors::with_cors;

/// The standard error for the web handlers.
pub struct HandlerError {
    /// The wrapped error value.
    kind: HandlerErrorKind,
    /// The backtrace related to the wrapped error.
    pub(crate) backtrace: Backtrace,
}

/// An error that happened in a web handler.
#[derive(Error, Debug)]
pub enum HandlerErrorKind {
    /// A generic error, when there is nothing more specific to say.
    #[error("Internal error")]
    Internal,

    /// The request did not name a usable keyword.
    #[error(transparent)]
    InvalidKeyword(#[from] InvalidKeyword),
}

impl HandlerErrorKind {
    /// Convert the error to an HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidKeyword(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Build an HTTP response reporting the error, as `{"error": "..."}`.
    pub fn error_response(&self) -> HttpResponse {
        let mut response = HashMap::new();
        response.insert("error".to_owned(), Value::String(format!("{}", self)));
        with_cors(&mut HttpResponseBuilder::new(self.status_code())).json(response)
    }
}

impl From<HandlerErrorKind> for actix_web::Error {
    fn from(kind: HandlerErrorKind) -> Self {
        let error: HandlerError = kind.into();
        error.into()
    }
}

impl HandlerError {
    /// Access the wrapped error.
    pub fn kind(&self) -> &HandlerErrorKind {
        &self.kind
    }

    /// Get an `HandlerError` representing an `Internal` error.
    pub fn internal() -> Self {
        HandlerErrorKind::Internal.into()
    }
}

impl Error for HandlerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.kind.source()
    }
}

impl<T> From<T> for HandlerError
where
    HandlerErrorKind: From<T>,
{
    fn from(item: T) -> Self {
        HandlerError {
            kind: HandlerErrorKind::from(item),
            backtrace: Backtrace::new(),
        }
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl fmt::Debug for HandlerError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        // Name the kind in the struct name so log lines for different errors
        // read differently at a glance.
        fmt.debug_struct(&format!("HandlerError/{:?}", &self.kind))
            .field("kind", &self.kind)
            .field("backtrace", &self.backtrace)
            .finish()
    }
}

impl ResponseError for HandlerError {
    fn status_code(&self) -> StatusCode {
        self.kind().status_code()
    }

    fn error_response(&self) -> HttpResponse {
        self.kind().error_response()
    }
}
