//! Diesel-backed [`LoginService`] adapter built on [`DieselUserRepository`].
//!
//! This adapter preserves the development login contract (`admin` /
//! `password`) while ensuring the authenticated user's row exists, so the
//! recipe store's creator checks hold for sessions it issued.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{LoginService, UserPersistenceError, UserRepository};
use crate::domain::{DisplayName, Error, LoginCredentials, User, UserId};

use super::diesel_user_repository::DieselUserRepository;

const FIXTURE_USERNAME: &str = "admin";
const FIXTURE_PASSWORD: &str = "password";
const FIXTURE_USER_ID: &str = "123e4567-e89b-12d3-a456-426614174000";
const FIXTURE_DISPLAY_NAME: &str = "Ada Lovelace";

/// Diesel-backed login service that preserves fixture-authentication
/// semantics.
#[derive(Clone)]
pub struct DieselLoginService {
    user_repository: Arc<dyn UserRepository>,
}

impl DieselLoginService {
    /// Create a new service backed by a Diesel user repository.
    pub fn new(user_repository: DieselUserRepository) -> Self {
        Self {
            user_repository: Arc::new(user_repository),
        }
    }

    #[cfg(test)]
    fn from_repository(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }

    async fn ensure_fixture_user_exists(&self, user_id: &UserId) -> Result<(), Error> {
        let existing = self
            .user_repository
            .find_by_id(user_id)
            .await
            .map_err(map_user_persistence_error)?;

        if existing.is_some() {
            return Ok(());
        }

        let display_name = DisplayName::new(FIXTURE_DISPLAY_NAME)
            .map_err(|err| Error::internal(format!("invalid fixture display name: {err}")))?;
        let user = User::new(*user_id, display_name);

        self.user_repository
            .upsert(&user)
            .await
            .map_err(map_user_persistence_error)
    }
}

fn map_user_persistence_error(error: UserPersistenceError) -> Error {
    debug!(%error, "user persistence operation failed during login");
    Error::internal("Logging in failed, please try again later.")
}

fn fixture_user_id() -> Result<UserId, Error> {
    UserId::new(FIXTURE_USER_ID)
        .map_err(|err| Error::internal(format!("invalid fixture user id: {err}")))
}

#[async_trait]
impl LoginService for DieselLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        if credentials.username() != FIXTURE_USERNAME || credentials.password() != FIXTURE_PASSWORD
        {
            return Err(Error::unauthorized("invalid credentials"));
        }

        let user_id = fixture_user_id()?;
        self.ensure_fixture_user_exists(&user_id).await?;
        Ok(user_id)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for login fixture parity and persistence mapping.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockUserRepository;
    use rstest::rstest;

    fn fixture_user() -> User {
        User::try_from_strings(FIXTURE_USER_ID, FIXTURE_DISPLAY_NAME).expect("fixture user")
    }

    #[rstest]
    #[tokio::test]
    async fn wrong_credentials_are_rejected_without_touching_persistence() {
        let service = DieselLoginService::from_repository(Arc::new(MockUserRepository::new()));
        let creds = LoginCredentials::try_from_parts("admin", "wrong").expect("credentials shape");

        let err = service.authenticate(&creds).await.expect_err("bad password");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn existing_fixture_user_is_not_rewritten() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_find_by_id()
            .returning(|_| Ok(Some(fixture_user())));
        // No upsert expectation: the mock panics if a write is attempted.
        let service = DieselLoginService::from_repository(Arc::new(repository));
        let creds =
            LoginCredentials::try_from_parts("admin", "password").expect("credentials shape");

        let id = service.authenticate(&creds).await.expect("login succeeds");
        assert_eq!(id.to_string(), FIXTURE_USER_ID);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_fixture_user_is_created() {
        let mut repository = MockUserRepository::new();
        repository.expect_find_by_id().returning(|_| Ok(None));
        repository
            .expect_upsert()
            .times(1)
            .returning(|user| {
                assert_eq!(user.id().to_string(), FIXTURE_USER_ID);
                Ok(())
            });
        let service = DieselLoginService::from_repository(Arc::new(repository));
        let creds =
            LoginCredentials::try_from_parts("admin", "password").expect("credentials shape");

        service.authenticate(&creds).await.expect("login succeeds");
    }

    #[rstest]
    #[tokio::test]
    async fn persistence_failures_surface_as_internal_errors() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_find_by_id()
            .returning(|_| Err(UserPersistenceError::connection("refused")));
        let service = DieselLoginService::from_repository(Arc::new(repository));
        let creds =
            LoginCredentials::try_from_parts("admin", "password").expect("credentials shape");

        let err = service.authenticate(&creds).await.expect_err("no database");
        assert_eq!(err.code(), ErrorCode::InternalError);
        assert_eq!(err.message(), "Logging in failed, please try again later.");
    }
}
