//! Users API handlers.
//!
//! ```text
//! POST /api/v1/login {"username":"admin","password":"password"}
//! ```
//!
//! Login is the only user-facing identity operation this service exposes;
//! everything else consumes the session-stored id through
//! [`SessionContext`](crate::inbound::http::session::SessionContext).

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{Error, LoginCredentials, LoginValidationError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/v1/login`.
///
/// Example JSON:
/// `{"username":"admin","password":"password"}`
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
pub struct LoginRequest {
    /// Account username.
    pub username: String,
    /// Account password.
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyUsername => Error::invalid_request("username must not be empty")
            .with_details(json!({ "field": "username", "code": "empty_username" })),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// Authenticate a user and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 422, description = "Invalid request", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let user_id = state.login.authenticate(&credentials).await?;
    session.persist_user(&user_id)?;
    Ok(HttpResponse::Ok().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use serde_json::Value;

    use crate::test_support::{seeded_state, test_session_middleware};

    fn test_app(
        state: HttpState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
                actix_web::dev::ServiceRequest,
                Config = (),
                Response = actix_web::dev::ServiceResponse,
                Error = actix_web::Error,
                InitError = (),
            >,
    > {
        App::new()
            .app_data(web::Data::new(state))
            .wrap(test_session_middleware())
            .service(web::scope("/api/v1").service(login))
    }

    #[actix_web::test]
    async fn blank_username_is_a_422_with_field_details() {
        let (state, _, _) = seeded_state(&[]);
        let app = actix_test::init_service(test_app(state)).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/login")
                .set_json(LoginRequest {
                    username: "   ".into(),
                    password: "password".into(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let value: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("error payload");
        assert_eq!(value["code"], serde_json::json!("invalid_request"));
        assert_eq!(value["details"]["field"], serde_json::json!("username"));
    }

    #[actix_web::test]
    async fn wrong_credentials_are_unauthorized() {
        let (state, _, _) = seeded_state(&[]);
        let app = actix_test::init_service(test_app(state)).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/login")
                .set_json(LoginRequest {
                    username: "not-a-user-id".into(),
                    password: "wrong".into(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let value: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("error payload");
        assert_eq!(value["code"], serde_json::json!("unauthorized"));
    }

    #[actix_web::test]
    async fn successful_login_sets_a_session_cookie() {
        let (state, _, _) = seeded_state(&[]);
        let app = actix_test::init_service(test_app(state)).await;

        let user = crate::domain::UserId::random();
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/login")
                .set_json(LoginRequest {
                    username: user.to_string(),
                    password: "password".into(),
                })
                .to_request(),
        )
        .await;
        assert!(response.status().is_success());
        assert!(
            response
                .response()
                .cookies()
                .any(|cookie| cookie.name() == "session")
        );
    }
}
