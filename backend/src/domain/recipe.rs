//! Recipe data model and validated mutation inputs.
//!
//! `Recipe` is the stored aggregate; `RecipeDraft` carries the validated
//! input for creation and `RecipeRevision` the validated input for the
//! title/description update. Validation mirrors the API contract: title and
//! address must not be blank and the description needs at least
//! [`DESCRIPTION_MIN`] characters.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::UserId;

/// Minimum allowed length for a recipe description, in characters.
pub const DESCRIPTION_MIN: usize = 5;

/// Validation errors returned by the recipe constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeValidationError {
    /// Title was empty once trimmed.
    EmptyTitle,
    /// Description was shorter than the minimum.
    DescriptionTooShort {
        /// Minimum required length.
        min: usize,
    },
    /// Address was empty once trimmed.
    EmptyAddress,
    /// Image path was empty.
    EmptyImage,
}

impl fmt::Display for RecipeValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::DescriptionTooShort { min } => {
                write!(f, "description must be at least {min} characters")
            }
            Self::EmptyAddress => write!(f, "address must not be empty"),
            Self::EmptyImage => write!(f, "image path must not be empty"),
        }
    }
}

impl std::error::Error for RecipeValidationError {}

fn validate_title(title: String) -> Result<String, RecipeValidationError> {
    if title.trim().is_empty() {
        return Err(RecipeValidationError::EmptyTitle);
    }
    Ok(title)
}

fn validate_description(description: String) -> Result<String, RecipeValidationError> {
    if description.chars().count() < DESCRIPTION_MIN {
        return Err(RecipeValidationError::DescriptionTooShort {
            min: DESCRIPTION_MIN,
        });
    }
    Ok(description)
}

fn validate_address(address: String) -> Result<String, RecipeValidationError> {
    if address.trim().is_empty() {
        return Err(RecipeValidationError::EmptyAddress);
    }
    Ok(address)
}

/// A stored recipe.
///
/// ## Invariants
/// - `title` and `address` are non-blank; `description` has at least
///   [`DESCRIPTION_MIN`] characters.
/// - `creator` references the owning user; only that user may mutate or
///   delete the recipe. The stored user record's reference list and this
///   field are kept consistent by the store's transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Stable recipe identifier.
    #[schema(value_type = String, example = "7c9e6679-7425-40de-944b-e07fc1f90ae7")]
    id: Uuid,
    #[schema(example = "Soup")]
    title: String,
    #[schema(example = "Hot soup")]
    description: String,
    #[schema(example = "1 Main St")]
    address: String,
    /// Filesystem path of the uploaded image.
    #[schema(example = "uploads/a.png")]
    image: String,
    /// Identifier of the owning user.
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    creator: UserId,
}

impl Recipe {
    /// Reassemble a recipe from stored parts.
    ///
    /// Intended for persistence adapters loading rows that were validated on
    /// the way in; no validation is repeated here.
    pub fn from_parts(
        id: Uuid,
        title: String,
        description: String,
        address: String,
        image: String,
        creator: UserId,
    ) -> Self {
        Self {
            id,
            title,
            description,
            address,
            image,
            creator,
        }
    }

    /// Stable recipe identifier.
    pub fn id(&self) -> &Uuid {
        &self.id
    }

    /// Recipe title.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Recipe description.
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Address associated with the recipe.
    pub fn address(&self) -> &str {
        self.address.as_str()
    }

    /// Filesystem path of the stored image.
    pub fn image(&self) -> &str {
        self.image.as_str()
    }

    /// Identifier of the owning user.
    pub fn creator(&self) -> &UserId {
        &self.creator
    }

    /// Whether `user` is the recipe's creator.
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.creator == user
    }
}

/// Validated input for creating a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    title: String,
    description: String,
    address: String,
    image: String,
    creator: UserId,
}

impl RecipeDraft {
    /// Validate raw field values into a draft.
    pub fn try_new(
        title: impl Into<String>,
        description: impl Into<String>,
        address: impl Into<String>,
        image: impl Into<String>,
        creator: UserId,
    ) -> Result<Self, RecipeValidationError> {
        let image = image.into();
        if image.is_empty() {
            return Err(RecipeValidationError::EmptyImage);
        }
        Ok(Self {
            title: validate_title(title.into())?,
            description: validate_description(description.into())?,
            address: validate_address(address.into())?,
            image,
            creator,
        })
    }

    /// Draft title.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Draft description.
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Draft address.
    pub fn address(&self) -> &str {
        self.address.as_str()
    }

    /// Path of the already-persisted image file.
    pub fn image(&self) -> &str {
        self.image.as_str()
    }

    /// Identifier of the creating user.
    pub fn creator(&self) -> &UserId {
        &self.creator
    }
}

/// Validated title/description replacement for an update.
///
/// `address`, `image`, and `creator` are immutable through updates; this
/// type cannot express changes to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeRevision {
    title: String,
    description: String,
}

impl RecipeRevision {
    /// Validate raw title/description values into a revision.
    pub fn try_new(
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, RecipeValidationError> {
        Ok(Self {
            title: validate_title(title.into())?,
            description: validate_description(description.into())?,
        })
    }

    /// Replacement title.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Replacement description.
    pub fn description(&self) -> &str {
        self.description.as_str()
    }
}
