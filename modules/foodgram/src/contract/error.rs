use thiserror::Error;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FoodgramError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Cannot subscribe to yourself")]
    SelfSubscription,

    #[error("Shopping cart is empty")]
    EmptyCart,

    #[error("Authentication required")]
    Unauthorized,

    #[error("Permission denied")]
    Forbidden,

    #[error("Internal error")]
    Internal,
}

impl FoodgramError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

impl From<crate::domain::error::DomainError> for FoodgramError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        let message = domain_error.to_string();
        match domain_error {
            NotFound { .. } | RelationNotFound { .. } | SubscriptionNotFound { .. } => {
                Self::not_found(message)
            }
            RelationExists { .. } | AlreadySubscribed { .. } | UserExists { .. } => {
                Self::conflict(message)
            }
            Validation { field, message } => Self::validation(format!("{field}: {message}")),
            SelfSubscription => Self::SelfSubscription,
            EmptyCart => Self::EmptyCart,
            Unauthorized => Self::Unauthorized,
            Forbidden => Self::Forbidden,
            Database { .. } => Self::Internal,
        }
    }
}
