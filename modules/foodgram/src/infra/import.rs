//! Bulk ingredient import from a JSON file.
//!
//! The file holds an array of `{"name": ..., "measurement_unit": ...}` objects.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::info;

use crate::contract::model::{ImportReport, NewIngredient};
use crate::domain::service::Service;

#[derive(Debug, Deserialize)]
struct IngredientRecord {
    name: String,
    measurement_unit: String,
}

/// Parse an ingredient file without touching the database.
pub async fn read_ingredients(path: &Path) -> anyhow::Result<Vec<NewIngredient>> {
    let raw = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let records: Vec<IngredientRecord> = serde_json::from_slice(&raw)
        .with_context(|| format!("{} is not a JSON array of ingredients", path.display()))?;

    Ok(records
        .into_iter()
        .map(|r| NewIngredient {
            name: r.name,
            measurement_unit: r.measurement_unit,
        })
        .collect())
}

pub async fn import_ingredients_file(service: &Service, path: &Path) -> anyhow::Result<ImportReport> {
    let items = read_ingredients(path).await?;
    info!(file = %path.display(), records = items.len(), "importing ingredients");
    let report = service
        .import_ingredients(items)
        .await
        .context("ingredient import failed")?;
    Ok(report)
}
