//! Maps domain errors onto HTTP responses.
//!
//! Status codes follow [`ErrorCode`]. Internal failures keep their message in
//! the log only; clients receive a fixed text without details.

use std::borrow::Cow;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::{error, warn};

use crate::domain::{Error, ErrorCode};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

const REDACTED_MESSAGE: &str = "Internal server error";

const fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// The error as the client may see it.
fn client_view(error: &Error) -> Cow<'_, Error> {
    match error.code() {
        ErrorCode::InternalError => Cow::Owned(Error::internal(REDACTED_MESSAGE)),
        _ => Cow::Borrowed(error),
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        match self.code() {
            ErrorCode::InternalError => {
                error!(message = %self.message(), "internal error hidden from client");
            }
            ErrorCode::ServiceUnavailable => {
                warn!(message = %self.message(), "request failed: store unavailable");
            }
            _ => {}
        }
        let body = client_view(self);
        HttpResponse::build(self.status_code()).json(&*body)
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "framework error converted to internal error");
        Self::internal(REDACTED_MESSAGE)
    }
}
