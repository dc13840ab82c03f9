//! Foodgram domain service.
//!
//! Every public operation takes the calling [`Principal`], evaluates its row of
//! the permission table and only then touches storage. Operations are split by
//! area into submodules; they all extend the single [`Service`] type.

use std::sync::Arc;

use crate::contract::model::{Page, PageRequest};
use crate::domain::repo::Repository;

mod ingredients;
mod recipes;
mod relations;
mod subscriptions;
mod users;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub default_page_size: u64,
    pub max_page_size: u64,
    /// Base of the links returned by `share_link`, without a trailing slash.
    pub public_base_url: String,
    pub max_image_bytes: usize,
    pub ingredient_search_limit: u64,
    pub import_batch_size: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_page_size: 6,
            max_page_size: 100,
            public_base_url: "http://localhost:8000".to_string(),
            max_image_bytes: 5 * 1024 * 1024,
            ingredient_search_limit: 10,
            import_batch_size: 400,
        }
    }
}

/// Domain service with business logic
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn Repository>,
    config: ServiceConfig,
}

impl Service {
    pub fn new(repo: Arc<dyn Repository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

/// Resolve a page request into `(page, limit, offset)`.
fn page_window(cfg: &ServiceConfig, req: PageRequest) -> (u64, u64, u64) {
    let limit = match req.limit {
        0 => cfg.default_page_size,
        n => n.min(cfg.max_page_size),
    }
    .max(1);
    // The store binds offsets as i64.
    let page = req.page.clamp(1, i64::MAX as u64 / limit + 1);
    (page, limit, (page - 1) * limit)
}

fn page_of<T>(items: Vec<T>, total: u64, page: u64, limit: u64) -> Page<T> {
    Page {
        items,
        total,
        page,
        limit,
    }
}
