use chrono::Utc;
use tracing::{debug, info, instrument};

use super::Service;
use crate::contract::model::{Principal, RecipeId, RelationKind, ShortRecipe};
use crate::domain::error::DomainError;
use crate::domain::permissions::{authorize, Operation};
use crate::domain::repo::RepoError;
use crate::domain::shopping_list;

impl Service {
    /// Put a recipe into one of the caller's lists. A repeated add is reported
    /// as a conflict instead of being ignored.
    #[instrument(
        name = "foodgram.service.add_relation",
        skip(self),
        fields(viewer = ?viewer.user_id(), kind = kind.as_str())
    )]
    pub async fn add_relation(
        &self,
        viewer: Principal,
        kind: RelationKind,
        recipe_id: RecipeId,
    ) -> Result<ShortRecipe, DomainError> {
        let uid = authorize(Operation::AddRelation, viewer)?.user()?;
        let recipe = self
            .repo
            .find_short_recipe(recipe_id)
            .await?
            .ok_or_else(|| DomainError::recipe_not_found(recipe_id))?;

        if self.repo.relation_exists(uid, recipe_id, kind).await? {
            return Err(DomainError::relation_exists(kind, recipe_id));
        }
        self.repo
            .add_relation(uid, recipe_id, kind, Utc::now())
            .await
            .map_err(|e| match e {
                RepoError::UniqueViolation(_) => DomainError::relation_exists(kind, recipe_id),
                other => other.into(),
            })?;

        info!(recipe_id, "relation added");
        Ok(recipe)
    }

    #[instrument(
        name = "foodgram.service.remove_relation",
        skip(self),
        fields(viewer = ?viewer.user_id(), kind = kind.as_str())
    )]
    pub async fn remove_relation(
        &self,
        viewer: Principal,
        kind: RelationKind,
        recipe_id: RecipeId,
    ) -> Result<(), DomainError> {
        let uid = authorize(Operation::RemoveRelation, viewer)?.user()?;
        if self.repo.recipe_author(recipe_id).await?.is_none() {
            return Err(DomainError::recipe_not_found(recipe_id));
        }
        if !self.repo.remove_relation(uid, recipe_id, kind).await? {
            return Err(DomainError::relation_not_found(kind, recipe_id));
        }
        info!(recipe_id, "relation removed");
        Ok(())
    }

    /// Aggregate the caller's cart into a text list.
    #[instrument(name = "foodgram.service.shopping_list", skip(self), fields(viewer = ?viewer.user_id()))]
    pub async fn shopping_list(&self, viewer: Principal) -> Result<String, DomainError> {
        let uid = authorize(Operation::DownloadShoppingList, viewer)?.user()?;
        let items = self.repo.shopping_list(uid).await?;
        if items.is_empty() {
            return Err(DomainError::EmptyCart);
        }
        debug!(lines = items.len(), "rendering shopping list");
        Ok(shopping_list::render(&items))
    }
}
