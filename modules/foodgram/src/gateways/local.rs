use async_trait::async_trait;
use std::sync::Arc;

use crate::contract::{
    client::FoodgramApi,
    error::FoodgramError,
    model::{
        Ingredient, IngredientId, NewRecipe, NewUser, Page, PageRequest, Principal, Recipe,
        RecipeId, RecipePatch, RecipeQuery, RelationKind, ShareLink, ShortRecipe, Subscription,
        User, UserId,
    },
};
use crate::domain::service::Service;

/// Local implementation of the FoodgramApi trait that delegates to the domain service
pub struct FoodgramLocalClient {
    service: Arc<Service>,
}

impl FoodgramLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl FoodgramApi for FoodgramLocalClient {
    async fn authenticate(&self, token: &str) -> Result<Principal, FoodgramError> {
        Ok(self.service.authenticate(token).await?)
    }

    async fn register_user(&self, new_user: NewUser) -> Result<User, FoodgramError> {
        Ok(self.service.register_user(new_user).await?)
    }

    async fn get_user(&self, viewer: Principal, id: UserId) -> Result<User, FoodgramError> {
        Ok(self.service.get_user(viewer, id).await?)
    }

    async fn list_users(
        &self,
        viewer: Principal,
        page: PageRequest,
    ) -> Result<Page<User>, FoodgramError> {
        Ok(self.service.list_users(viewer, page).await?)
    }

    async fn me(&self, viewer: Principal) -> Result<User, FoodgramError> {
        Ok(self.service.me(viewer).await?)
    }

    async fn set_avatar(
        &self,
        viewer: Principal,
        data_uri: String,
    ) -> Result<String, FoodgramError> {
        Ok(self.service.set_avatar(viewer, data_uri).await?)
    }

    async fn remove_avatar(&self, viewer: Principal) -> Result<(), FoodgramError> {
        Ok(self.service.remove_avatar(viewer).await?)
    }

    async fn list_recipes(
        &self,
        viewer: Principal,
        query: RecipeQuery,
        page: PageRequest,
    ) -> Result<Page<Recipe>, FoodgramError> {
        Ok(self.service.list_recipes(viewer, query, page).await?)
    }

    async fn list_favorites(
        &self,
        viewer: Principal,
        page: PageRequest,
    ) -> Result<Page<Recipe>, FoodgramError> {
        Ok(self.service.list_favorites(viewer, page).await?)
    }

    async fn get_recipe(&self, viewer: Principal, id: RecipeId) -> Result<Recipe, FoodgramError> {
        Ok(self.service.get_recipe(viewer, id).await?)
    }

    async fn create_recipe(
        &self,
        viewer: Principal,
        new_recipe: NewRecipe,
    ) -> Result<Recipe, FoodgramError> {
        Ok(self.service.create_recipe(viewer, new_recipe).await?)
    }

    async fn update_recipe(
        &self,
        viewer: Principal,
        id: RecipeId,
        patch: RecipePatch,
    ) -> Result<Recipe, FoodgramError> {
        Ok(self.service.update_recipe(viewer, id, patch).await?)
    }

    async fn delete_recipe(&self, viewer: Principal, id: RecipeId) -> Result<(), FoodgramError> {
        Ok(self.service.delete_recipe(viewer, id).await?)
    }

    async fn share_link(&self, viewer: Principal, id: RecipeId) -> Result<ShareLink, FoodgramError> {
        Ok(self.service.share_link(viewer, id).await?)
    }

    async fn add_relation(
        &self,
        viewer: Principal,
        kind: RelationKind,
        recipe_id: RecipeId,
    ) -> Result<ShortRecipe, FoodgramError> {
        Ok(self.service.add_relation(viewer, kind, recipe_id).await?)
    }

    async fn remove_relation(
        &self,
        viewer: Principal,
        kind: RelationKind,
        recipe_id: RecipeId,
    ) -> Result<(), FoodgramError> {
        Ok(self.service.remove_relation(viewer, kind, recipe_id).await?)
    }

    async fn shopping_list(&self, viewer: Principal) -> Result<String, FoodgramError> {
        Ok(self.service.shopping_list(viewer).await?)
    }

    async fn subscribe(
        &self,
        viewer: Principal,
        author_id: UserId,
        recipes_limit: Option<u64>,
    ) -> Result<Subscription, FoodgramError> {
        Ok(self
            .service
            .subscribe(viewer, author_id, recipes_limit)
            .await?)
    }

    async fn unsubscribe(&self, viewer: Principal, author_id: UserId) -> Result<(), FoodgramError> {
        Ok(self.service.unsubscribe(viewer, author_id).await?)
    }

    async fn list_subscriptions(
        &self,
        viewer: Principal,
        page: PageRequest,
        recipes_limit: Option<u64>,
    ) -> Result<Page<Subscription>, FoodgramError> {
        Ok(self
            .service
            .list_subscriptions(viewer, page, recipes_limit)
            .await?)
    }

    async fn search_ingredients(&self, prefix: &str) -> Result<Vec<Ingredient>, FoodgramError> {
        Ok(self.service.search_ingredients(prefix).await?)
    }

    async fn get_ingredient(&self, id: IngredientId) -> Result<Ingredient, FoodgramError> {
        Ok(self.service.get_ingredient(id).await?)
    }
}
