//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into consistent JSON responses and
//! status codes.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::error;

use crate::domain::{Error, ErrorCode};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        // Validation failures surface as 422, matching the API contract
        // rather than a generic 400.
        ErrorCode::InvalidRequest => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        Error::internal(error.message())
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    #[case(Error::invalid_request("bad"), StatusCode::UNPROCESSABLE_ENTITY)]
    #[case(Error::unauthorized("login required"), StatusCode::UNAUTHORIZED)]
    #[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
    #[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn codes_map_to_expected_statuses(#[case] error: Error, #[case] expected: StatusCode) {
        assert_eq!(error.status_code(), expected);
    }

    #[actix_web::test]
    async fn error_response_carries_code_and_message() {
        let response = Error::not_found("Could not find a recipe for the provided id.")
            .error_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = actix_web::body::to_bytes(response.into_body())
            .await
            .expect("body bytes");
        let value: Value = serde_json::from_slice(&body).expect("error payload");
        assert_eq!(value["code"], json!("not_found"));
        assert_eq!(
            value["message"],
            json!("Could not find a recipe for the provided id.")
        );
    }

    #[actix_web::test]
    async fn internal_errors_drop_details_from_the_response() {
        let response = Error::internal("Creating recipe failed, please try again.")
            .with_details(json!({ "table": "recipes" }))
            .error_response();
        let body = actix_web::body::to_bytes(response.into_body())
            .await
            .expect("body bytes");
        let value: Value = serde_json::from_slice(&body).expect("error payload");
        assert!(value.get("details").is_none());
    }
}
