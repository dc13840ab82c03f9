//! Operation → required capabilities.
//!
//! Checks run in table order and stop at the first failure. Capabilities that
//! need the target recipe are evaluated in a second step, once it is loaded,
//! so an anonymous caller gets `Unauthorized` before any lookup happens.

use crate::contract::model::{Principal, UserId};
use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Authenticated,
    RecipeAuthor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GetUser,
    ListUsers,
    Me,
    SetAvatar,
    RemoveAvatar,
    Subscribe,
    Unsubscribe,
    ListSubscriptions,
    ListRecipes,
    GetRecipe,
    CreateRecipe,
    UpdateRecipe,
    DeleteRecipe,
    ShareLink,
    AddRelation,
    RemoveRelation,
    ListFavorites,
    DownloadShoppingList,
}

impl Operation {
    pub fn required(self) -> &'static [Capability] {
        use Capability::*;
        use Operation::*;
        match self {
            GetUser | ListUsers | ListRecipes | GetRecipe | ShareLink => &[],
            Me | SetAvatar | RemoveAvatar | Subscribe | Unsubscribe | ListSubscriptions
            | CreateRecipe | AddRelation | RemoveRelation | ListFavorites
            | DownloadShoppingList => &[Authenticated],
            UpdateRecipe | DeleteRecipe => &[Authenticated, RecipeAuthor],
        }
    }
}

/// Result of the caller-level checks for one operation.
#[derive(Debug, Clone, Copy)]
pub struct Access {
    op: Operation,
    principal: Principal,
}

impl Access {
    /// Caller id; `None` only for operations that allow anonymous callers.
    pub fn user_id(&self) -> Option<UserId> {
        self.principal.user_id()
    }

    /// Caller id for operations that require authentication.
    pub fn user(&self) -> Result<UserId, DomainError> {
        self.principal.user_id().ok_or(DomainError::Unauthorized)
    }

    /// Evaluate the recipe-scoped capabilities against the recipe's author.
    pub fn on_recipe(&self, author: UserId) -> Result<(), DomainError> {
        for cap in self.op.required() {
            if *cap == Capability::RecipeAuthor && self.principal.user_id() != Some(author) {
                return Err(DomainError::Forbidden);
            }
        }
        Ok(())
    }
}

/// Evaluate the capabilities that depend only on the caller.
pub fn authorize(op: Operation, principal: Principal) -> Result<Access, DomainError> {
    for cap in op.required() {
        if *cap == Capability::Authenticated && principal.user_id().is_none() {
            return Err(DomainError::Unauthorized);
        }
    }
    Ok(Access { op, principal })
}
