use tracing::{debug, info, instrument, warn};

use super::Service;
use crate::contract::model::{ImportReport, Ingredient, IngredientId, NewIngredient};
use crate::domain::error::DomainError;

impl Service {
    /// Case-insensitive name prefix search. A blank query yields nothing rather
    /// than the whole catalog.
    #[instrument(name = "foodgram.service.search_ingredients", skip(self))]
    pub async fn search_ingredients(&self, prefix: &str) -> Result<Vec<Ingredient>, DomainError> {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return Ok(Vec::new());
        }
        let found = self
            .repo
            .search_ingredients(&prefix, self.config.ingredient_search_limit)
            .await?;
        debug!(count = found.len(), "ingredient search");
        Ok(found)
    }

    #[instrument(name = "foodgram.service.get_ingredient", skip(self))]
    pub async fn get_ingredient(&self, id: IngredientId) -> Result<Ingredient, DomainError> {
        self.repo
            .find_ingredient(id)
            .await?
            .ok_or_else(|| DomainError::ingredient_not_found(id))
    }

    /// Bulk load reference data. Pairs already in the catalog are skipped, so
    /// re-running an import is harmless.
    #[instrument(name = "foodgram.service.import_ingredients", skip_all, fields(total = items.len()))]
    pub async fn import_ingredients(
        &self,
        items: Vec<NewIngredient>,
    ) -> Result<ImportReport, DomainError> {
        let total = items.len();
        let mut rows = Vec::with_capacity(total);
        for (idx, item) in items.into_iter().enumerate() {
            let name = item.name.trim().to_string();
            let measurement_unit = item.measurement_unit.trim().to_string();
            if name.is_empty() || measurement_unit.is_empty() {
                warn!(index = idx, "skipping ingredient with empty name or unit");
                continue;
            }
            rows.push(NewIngredient {
                name,
                measurement_unit,
            });
        }

        let mut inserted = 0;
        let batch = self.config.import_batch_size.max(1);
        for chunk in rows.chunks(batch) {
            inserted += self.repo.insert_ingredients(chunk.to_vec()).await?;
        }

        info!(total, inserted, "ingredient import finished");
        Ok(ImportReport { total, inserted })
    }
}
