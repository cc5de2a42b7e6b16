//! User data model.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors returned by [`User::try_from_strings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// The id string was empty.
    EmptyId,
    /// The id string was not a valid UUID.
    InvalidId,
    /// The display name was empty once trimmed.
    EmptyDisplayName,
    /// The display name exceeded the maximum length.
    DisplayNameTooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The display name contained characters outside the allowed set.
    DisplayNameInvalidCharacters,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyDisplayName => write!(f, "display name must not be empty"),
            Self::DisplayNameTooLong { max } => {
                write!(f, "display name must be at most {max} characters")
            }
            Self::DisplayNameInvalidCharacters => write!(
                f,
                "display name may only contain letters, numbers, spaces, or underscores",
            ),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from string input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        let parsed = Uuid::parse_str(raw).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(parsed))
    }

    /// Wrap an already-parsed UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Human readable display name for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

/// Maximum allowed length for a display name.
pub const DISPLAY_NAME_MAX: usize = 64;

fn display_name_char_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == ' ' || c == '_'
}

impl DisplayName {
    /// Validate and construct a [`DisplayName`] from owned input.
    pub fn new(display_name: impl Into<String>) -> Result<Self, UserValidationError> {
        let display_name = display_name.into();
        if display_name.trim().is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        if display_name.chars().count() > DISPLAY_NAME_MAX {
            return Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        if !display_name.chars().all(display_name_char_allowed) {
            return Err(UserValidationError::DisplayNameInvalidCharacters);
        }
        Ok(Self(display_name))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Application user.
///
/// The user's authored recipes are tracked as a reference list on the stored
/// user record; the domain type carries identity and display data only.
///
/// ## Invariants
/// - `id` must be a valid UUID.
/// - `display_name` must be non-empty once trimmed of whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: UserId,
    #[schema(value_type = String, example = "Ada Lovelace")]
    display_name: DisplayName,
}

impl User {
    /// Build a new [`User`] from validated components.
    pub fn new(id: UserId, display_name: DisplayName) -> Self {
        Self { id, display_name }
    }

    /// Fallible constructor enforcing identifier and display name invariants.
    ///
    /// Prefer [`User::new`] when components are already validated.
    pub fn try_from_strings(
        id: impl AsRef<str>,
        display_name: impl Into<String>,
    ) -> Result<Self, UserValidationError> {
        let id = UserId::new(id)?;
        let display_name = DisplayName::new(display_name)?;
        Ok(Self::new(id, display_name))
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Display name shown to other users.
    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }
}
