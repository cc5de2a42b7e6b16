//! Driving port for login/authentication use-cases.
//!
//! Inbound adapters call this port to authenticate credentials without
//! knowing the backing infrastructure. The recipe store itself never derives
//! identity: it trusts the requester id the session layer hands it.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, UserId};

/// Domain use-case port for authentication.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user id.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;
}

/// In-memory authenticator preserving the development login contract:
/// `admin` / `password` authenticates successfully and produces a fixed
/// user id.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

/// User id produced by [`FixtureLoginService`].
pub(crate) const FIXTURE_USER_ID: &str = "123e4567-e89b-12d3-a456-426614174000";

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        if credentials.username() == "admin" && credentials.password() == "password" {
            UserId::new(FIXTURE_USER_ID)
                .map_err(|err| Error::internal(format!("invalid fixture user id: {err}")))
        } else {
            Err(Error::unauthorized("invalid credentials"))
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case("admin", "password", true)]
    #[case("admin", "wrong", false)]
    #[case("other", "password", false)]
    #[tokio::test]
    async fn fixture_login_service_accepts_only_fixture_credentials(
        #[case] username: &str,
        #[case] password: &str,
        #[case] should_succeed: bool,
    ) {
        let service = FixtureLoginService;
        let creds =
            LoginCredentials::try_from_parts(username, password).expect("credentials shape");
        let result = service.authenticate(&creds).await;
        match (should_succeed, result) {
            (true, Ok(id)) => assert_eq!(id.to_string(), FIXTURE_USER_ID),
            (false, Err(err)) => assert_eq!(err.code(), ErrorCode::Unauthorized),
            (true, Err(err)) => panic!("expected success, got error: {err:?}"),
            (false, Ok(id)) => panic!("expected failure, got success: {id}"),
        }
    }
}
