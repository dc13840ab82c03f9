use thiserror::Error;

use crate::contract::model::{RecipeId, RelationKind, UserId};
use crate::domain::repo::RepoError;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Recipe {recipe_id} is not in {kind}")]
    RelationNotFound {
        kind: RelationKind,
        recipe_id: RecipeId,
    },

    #[error("Recipe {recipe_id} is already in {kind}")]
    RelationExists {
        kind: RelationKind,
        recipe_id: RecipeId,
    },

    #[error("Not subscribed to user {author_id}")]
    SubscriptionNotFound { author_id: UserId },

    #[error("Already subscribed to user {author_id}")]
    AlreadySubscribed { author_id: UserId },

    #[error("A user with {field} '{value}' already exists")]
    UserExists { field: &'static str, value: String },

    #[error("Cannot subscribe to yourself")]
    SelfSubscription,

    #[error("Shopping cart is empty")]
    EmptyCart,

    #[error("Authentication credentials were not provided or are invalid")]
    Unauthorized,

    #[error("You do not have permission to perform this action")]
    Forbidden,

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn user_not_found(id: UserId) -> Self {
        Self::NotFound { entity: "User", id }
    }

    pub fn recipe_not_found(id: RecipeId) -> Self {
        Self::NotFound {
            entity: "Recipe",
            id,
        }
    }

    pub fn ingredient_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "Ingredient",
            id,
        }
    }

    pub fn relation_not_found(kind: RelationKind, recipe_id: RecipeId) -> Self {
        Self::RelationNotFound { kind, recipe_id }
    }

    pub fn relation_exists(kind: RelationKind, recipe_id: RecipeId) -> Self {
        Self::RelationExists { kind, recipe_id }
    }

    pub fn user_exists(field: &'static str, value: impl Into<String>) -> Self {
        Self::UserExists {
            field,
            value: value.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

impl From<RepoError> for DomainError {
    fn from(e: RepoError) -> Self {
        // Call sites that can race on a unique key map UniqueViolation themselves
        Self::database(e.to_string())
    }
}
