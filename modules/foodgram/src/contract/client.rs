use async_trait::async_trait;

use crate::contract::{
    error::FoodgramError,
    model::{
        Ingredient, IngredientId, NewRecipe, NewUser, Page, PageRequest, Principal, Recipe,
        RecipeId, RecipePatch, RecipeQuery, RelationKind, ShareLink, ShortRecipe, Subscription,
        User, UserId,
    },
};

/// Public API of the foodgram module for in-process consumers
#[async_trait]
pub trait FoodgramApi: Send + Sync {
    /// Resolve an API token to the principal it belongs to
    async fn authenticate(&self, token: &str) -> Result<Principal, FoodgramError>;

    async fn register_user(&self, new_user: NewUser) -> Result<User, FoodgramError>;

    async fn get_user(&self, viewer: Principal, id: UserId) -> Result<User, FoodgramError>;

    async fn list_users(
        &self,
        viewer: Principal,
        page: PageRequest,
    ) -> Result<Page<User>, FoodgramError>;

    async fn me(&self, viewer: Principal) -> Result<User, FoodgramError>;

    /// Store a base64 image data URI as the caller's avatar
    async fn set_avatar(&self, viewer: Principal, data_uri: String)
        -> Result<String, FoodgramError>;

    async fn remove_avatar(&self, viewer: Principal) -> Result<(), FoodgramError>;

    async fn list_recipes(
        &self,
        viewer: Principal,
        query: RecipeQuery,
        page: PageRequest,
    ) -> Result<Page<Recipe>, FoodgramError>;

    async fn list_favorites(
        &self,
        viewer: Principal,
        page: PageRequest,
    ) -> Result<Page<Recipe>, FoodgramError>;

    async fn get_recipe(&self, viewer: Principal, id: RecipeId) -> Result<Recipe, FoodgramError>;

    async fn create_recipe(
        &self,
        viewer: Principal,
        new_recipe: NewRecipe,
    ) -> Result<Recipe, FoodgramError>;

    async fn update_recipe(
        &self,
        viewer: Principal,
        id: RecipeId,
        patch: RecipePatch,
    ) -> Result<Recipe, FoodgramError>;

    async fn delete_recipe(&self, viewer: Principal, id: RecipeId) -> Result<(), FoodgramError>;

    async fn share_link(&self, viewer: Principal, id: RecipeId) -> Result<ShareLink, FoodgramError>;

    /// Mark a recipe as favorite or put it into the shopping cart
    async fn add_relation(
        &self,
        viewer: Principal,
        kind: RelationKind,
        recipe_id: RecipeId,
    ) -> Result<ShortRecipe, FoodgramError>;

    async fn remove_relation(
        &self,
        viewer: Principal,
        kind: RelationKind,
        recipe_id: RecipeId,
    ) -> Result<(), FoodgramError>;

    /// Rendered text shopping list for everything in the caller's cart
    async fn shopping_list(&self, viewer: Principal) -> Result<String, FoodgramError>;

    async fn subscribe(
        &self,
        viewer: Principal,
        author_id: UserId,
        recipes_limit: Option<u64>,
    ) -> Result<Subscription, FoodgramError>;

    async fn unsubscribe(&self, viewer: Principal, author_id: UserId)
        -> Result<(), FoodgramError>;

    async fn list_subscriptions(
        &self,
        viewer: Principal,
        page: PageRequest,
        recipes_limit: Option<u64>,
    ) -> Result<Page<Subscription>, FoodgramError>;

    async fn search_ingredients(&self, prefix: &str) -> Result<Vec<Ingredient>, FoodgramError>;

    async fn get_ingredient(&self, id: IngredientId) -> Result<Ingredient, FoodgramError>;
}
