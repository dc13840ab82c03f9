//! Persistence ports for the domain layer.
//!
//! All traits are object-safe and async via `async_trait`. The service holds a
//! single `Arc<dyn Repository>`, which is any type implementing every port.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::contract::model::{
    Ingredient, IngredientId, NewIngredient, NewRecipe, NewUser, Recipe, RecipeId, RecipePatch,
    RelationKind, ShortRecipe, User, UserId,
};

#[derive(Debug, Error)]
pub enum RepoError {
    /// The store rejected a write because of a unique constraint.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Resolved list filters; the relation filters already name the user whose
/// relations restrict the result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub author: Option<UserId>,
    pub favorited_by: Option<UserId>,
    pub in_cart_of: Option<UserId>,
}

/// One aggregated shopping list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingItem {
    pub name: String,
    pub measurement_unit: String,
    pub total: i64,
}

#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Load a user; `viewer` drives the `is_subscribed` flag.
    async fn find_user(&self, id: UserId, viewer: Option<UserId>) -> RepoResult<Option<User>>;
    /// Users ordered by id, plus the total count.
    async fn list_users(
        &self,
        viewer: Option<UserId>,
        offset: u64,
        limit: u64,
    ) -> RepoResult<(Vec<User>, u64)>;
    async fn email_exists(&self, email: &str) -> RepoResult<bool>;
    async fn username_exists(&self, username: &str) -> RepoResult<bool>;
    async fn insert_user(&self, new_user: NewUser, now: DateTime<Utc>) -> RepoResult<User>;
    /// Returns false if the user does not exist.
    async fn set_avatar(&self, id: UserId, avatar: Option<String>) -> RepoResult<bool>;
    async fn user_for_token(&self, key: &str) -> RepoResult<Option<UserId>>;
}

#[async_trait]
pub trait IngredientsRepository: Send + Sync {
    /// Case-insensitive prefix search ordered by name. `prefix` is already lowercased.
    async fn search_ingredients(&self, prefix: &str, limit: u64) -> RepoResult<Vec<Ingredient>>;
    async fn find_ingredient(&self, id: IngredientId) -> RepoResult<Option<Ingredient>>;
    /// Subset of `ids` that exist.
    async fn existing_ingredient_ids(&self, ids: &[IngredientId]) -> RepoResult<Vec<IngredientId>>;
    /// Insert, skipping (name, unit) pairs already present. Returns inserted row count.
    async fn insert_ingredients(&self, items: Vec<NewIngredient>) -> RepoResult<u64>;
}

#[async_trait]
pub trait RecipesRepository: Send + Sync {
    /// Newest first, plus the total count matching `filter`.
    async fn list_recipes(
        &self,
        viewer: Option<UserId>,
        filter: RecipeFilter,
        offset: u64,
        limit: u64,
    ) -> RepoResult<(Vec<Recipe>, u64)>;
    async fn find_recipe(&self, id: RecipeId, viewer: Option<UserId>)
        -> RepoResult<Option<Recipe>>;
    async fn find_short_recipe(&self, id: RecipeId) -> RepoResult<Option<ShortRecipe>>;
    async fn recipe_author(&self, id: RecipeId) -> RepoResult<Option<UserId>>;
    /// Insert the recipe and its ingredient set in one transaction.
    async fn insert_recipe(
        &self,
        author: UserId,
        new_recipe: NewRecipe,
        now: DateTime<Utc>,
    ) -> RepoResult<RecipeId>;
    /// Apply the patch in one transaction; a present ingredient list replaces the set.
    async fn update_recipe(&self, id: RecipeId, patch: RecipePatch) -> RepoResult<()>;
    async fn delete_recipe(&self, id: RecipeId) -> RepoResult<bool>;
}

#[async_trait]
pub trait RelationsRepository: Send + Sync {
    async fn relation_exists(
        &self,
        user: UserId,
        recipe: RecipeId,
        kind: RelationKind,
    ) -> RepoResult<bool>;
    async fn add_relation(
        &self,
        user: UserId,
        recipe: RecipeId,
        kind: RelationKind,
        now: DateTime<Utc>,
    ) -> RepoResult<()>;
    async fn remove_relation(
        &self,
        user: UserId,
        recipe: RecipeId,
        kind: RelationKind,
    ) -> RepoResult<bool>;
    /// Amounts summed per (name, unit) over the user's cart, ordered by name then unit.
    async fn shopping_list(&self, user: UserId) -> RepoResult<Vec<ShoppingItem>>;
}

#[async_trait]
pub trait SubscriptionsRepository: Send + Sync {
    async fn add_subscription(
        &self,
        user: UserId,
        author: UserId,
        now: DateTime<Utc>,
    ) -> RepoResult<()>;
    async fn remove_subscription(&self, user: UserId, author: UserId) -> RepoResult<bool>;
    /// Authors followed by `user`, ordered by id, plus the total count.
    async fn list_followed(
        &self,
        user: UserId,
        offset: u64,
        limit: u64,
    ) -> RepoResult<(Vec<User>, u64)>;
    async fn recipe_counts(&self, authors: &[UserId]) -> RepoResult<HashMap<UserId, u64>>;
    /// Newest recipes of `author`; `None` means all of them.
    async fn recent_recipes(
        &self,
        author: UserId,
        limit: Option<u64>,
    ) -> RepoResult<Vec<ShortRecipe>>;
}

/// Everything the service needs from storage.
pub trait Repository:
    UsersRepository
    + IngredientsRepository
    + RecipesRepository
    + RelationsRepository
    + SubscriptionsRepository
{
}

impl<T> Repository for T where
    T: UsersRepository
        + IngredientsRepository
        + RecipesRepository
        + RelationsRepository
        + SubscriptionsRepository
{
}
