use std::path::Path;
use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::FoodgramConfig;
use crate::contract::client::FoodgramApi;
use crate::contract::model::ImportReport;
use crate::domain::service::Service;
use crate::gateways::local::FoodgramLocalClient;
use crate::infra::import::import_ingredients_file;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::SeaOrmRepository;

/// The Foodgram module: storage, domain service, REST routes and the
/// in-process client, wired from one database connection.
#[derive(Clone)]
pub struct Foodgram {
    conn: DatabaseConnection,
    service: Arc<Service>,
}

impl Foodgram {
    pub fn init(conn: DatabaseConnection, cfg: &FoodgramConfig) -> Self {
        info!("Initializing foodgram module");
        debug!(
            "Loaded foodgram config: default_page_size={}, max_page_size={}, public_base_url={}",
            cfg.default_page_size, cfg.max_page_size, cfg.public_base_url
        );

        let repo = SeaOrmRepository::new(conn.clone());
        let service = Service::new(Arc::new(repo), cfg.service_config());
        Self {
            conn,
            service: Arc::new(service),
        }
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        info!("Running foodgram database migrations");
        Migrator::up(&self.conn, None).await?;
        info!("Foodgram database migrations completed successfully");
        Ok(())
    }

    pub fn register_rest(&self, router: Router) -> Router {
        info!("Registering foodgram REST routes");
        routes::register_routes(router, self.service.clone())
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    pub fn client(&self) -> Arc<dyn FoodgramApi> {
        Arc::new(FoodgramLocalClient::new(self.service.clone()))
    }

    pub async fn import_ingredients(&self, path: &Path) -> anyhow::Result<ImportReport> {
        import_ingredients_file(&self.service, path).await
    }
}
