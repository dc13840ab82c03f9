use std::collections::HashSet;

use chrono::Utc;
use tracing::{debug, info, instrument};

use super::{page_of, page_window, Service};
use crate::contract::model::{
    IngredientAmount, NewRecipe, Page, PageRequest, Principal, Recipe, RecipeId, RecipePatch,
    RecipeQuery, ShareLink,
};
use crate::domain::error::DomainError;
use crate::domain::permissions::{authorize, Operation};
use crate::domain::repo::RecipeFilter;
use crate::domain::validation;

impl Service {
    /// Newest-first recipe list. The relation flags of `query` narrow the list
    /// to the caller's own favorites or cart and are a no-op for anonymous callers.
    #[instrument(name = "foodgram.service.list_recipes", skip(self), fields(viewer = ?viewer.user_id()))]
    pub async fn list_recipes(
        &self,
        viewer: Principal,
        query: RecipeQuery,
        page: PageRequest,
    ) -> Result<Page<Recipe>, DomainError> {
        let access = authorize(Operation::ListRecipes, viewer)?;
        let me = access.user_id();
        let filter = RecipeFilter {
            author: query.author,
            favorited_by: me.filter(|_| query.is_favorited),
            in_cart_of: me.filter(|_| query.is_in_shopping_cart),
        };
        self.recipe_page(me, filter, page).await
    }

    #[instrument(name = "foodgram.service.list_favorites", skip(self), fields(viewer = ?viewer.user_id()))]
    pub async fn list_favorites(
        &self,
        viewer: Principal,
        page: PageRequest,
    ) -> Result<Page<Recipe>, DomainError> {
        let uid = authorize(Operation::ListFavorites, viewer)?.user()?;
        let filter = RecipeFilter {
            favorited_by: Some(uid),
            ..Default::default()
        };
        self.recipe_page(Some(uid), filter, page).await
    }

    async fn recipe_page(
        &self,
        viewer: Option<i64>,
        filter: RecipeFilter,
        page: PageRequest,
    ) -> Result<Page<Recipe>, DomainError> {
        let (page, limit, offset) = page_window(&self.config, page);
        let (recipes, total) = self
            .repo
            .list_recipes(viewer, filter, offset, limit)
            .await?;
        debug!(count = recipes.len(), total, "listed recipes");
        Ok(page_of(recipes, total, page, limit))
    }

    #[instrument(name = "foodgram.service.get_recipe", skip(self), fields(viewer = ?viewer.user_id()))]
    pub async fn get_recipe(&self, viewer: Principal, id: RecipeId) -> Result<Recipe, DomainError> {
        let access = authorize(Operation::GetRecipe, viewer)?;
        self.repo
            .find_recipe(id, access.user_id())
            .await?
            .ok_or_else(|| DomainError::recipe_not_found(id))
    }

    #[instrument(
        name = "foodgram.service.create_recipe",
        skip(self, new_recipe),
        fields(viewer = ?viewer.user_id(), ingredients = new_recipe.ingredients.len())
    )]
    pub async fn create_recipe(
        &self,
        viewer: Principal,
        new_recipe: NewRecipe,
    ) -> Result<Recipe, DomainError> {
        let uid = authorize(Operation::CreateRecipe, viewer)?.user()?;

        validation::validate_recipe_name(&new_recipe.name)?;
        validation::validate_text(&new_recipe.text)?;
        validation::validate_cooking_time(new_recipe.cooking_time)?;
        validation::validate_image("image", &new_recipe.image, self.config.max_image_bytes)?;
        validation::validate_ingredients(&new_recipe.ingredients)?;
        self.ensure_ingredients_exist(&new_recipe.ingredients).await?;

        let id = self.repo.insert_recipe(uid, new_recipe, Utc::now()).await?;
        info!(recipe_id = id, author = uid, "created recipe");

        self.repo
            .find_recipe(id, Some(uid))
            .await?
            .ok_or_else(|| DomainError::recipe_not_found(id))
    }

    /// Author-only partial update. A present ingredient list replaces the stored set.
    #[instrument(name = "foodgram.service.update_recipe", skip(self, patch), fields(viewer = ?viewer.user_id()))]
    pub async fn update_recipe(
        &self,
        viewer: Principal,
        id: RecipeId,
        patch: RecipePatch,
    ) -> Result<Recipe, DomainError> {
        let access = authorize(Operation::UpdateRecipe, viewer)?;
        let uid = access.user()?;
        let author = self
            .repo
            .recipe_author(id)
            .await?
            .ok_or_else(|| DomainError::recipe_not_found(id))?;
        access.on_recipe(author)?;

        validation::validate_recipe_patch(&patch, self.config.max_image_bytes)?;
        if let Some(items) = &patch.ingredients {
            self.ensure_ingredients_exist(items).await?;
        }

        self.repo.update_recipe(id, patch).await?;
        info!(recipe_id = id, "updated recipe");

        self.repo
            .find_recipe(id, Some(uid))
            .await?
            .ok_or_else(|| DomainError::recipe_not_found(id))
    }

    #[instrument(name = "foodgram.service.delete_recipe", skip(self), fields(viewer = ?viewer.user_id()))]
    pub async fn delete_recipe(&self, viewer: Principal, id: RecipeId) -> Result<(), DomainError> {
        let access = authorize(Operation::DeleteRecipe, viewer)?;
        let author = self
            .repo
            .recipe_author(id)
            .await?
            .ok_or_else(|| DomainError::recipe_not_found(id))?;
        access.on_recipe(author)?;

        if !self.repo.delete_recipe(id).await? {
            return Err(DomainError::recipe_not_found(id));
        }
        info!(recipe_id = id, "deleted recipe");
        Ok(())
    }

    #[instrument(name = "foodgram.service.share_link", skip(self), fields(viewer = ?viewer.user_id()))]
    pub async fn share_link(&self, viewer: Principal, id: RecipeId) -> Result<ShareLink, DomainError> {
        authorize(Operation::ShareLink, viewer)?;
        let recipe = self
            .repo
            .find_short_recipe(id)
            .await?
            .ok_or_else(|| DomainError::recipe_not_found(id))?;

        Ok(ShareLink {
            url: format!(
                "{}/recipes/{}/",
                self.config.public_base_url.trim_end_matches('/'),
                recipe.id
            ),
            recipe_id: recipe.id,
            recipe_name: recipe.name,
        })
    }

    async fn ensure_ingredients_exist(&self, items: &[IngredientAmount]) -> Result<(), DomainError> {
        let ids: Vec<i64> = items.iter().map(|i| i.ingredient_id).collect();
        let existing: HashSet<i64> = self
            .repo
            .existing_ingredient_ids(&ids)
            .await?
            .into_iter()
            .collect();

        match ids.iter().find(|id| !existing.contains(id)) {
            Some(missing) => Err(DomainError::validation(
                "ingredients",
                format!("ingredient {missing} does not exist"),
            )),
            None => Ok(()),
        }
    }
}
