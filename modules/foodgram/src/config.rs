use serde::{Deserialize, Serialize};

use crate::domain::service::ServiceConfig;

/// Configuration for the foodgram module (`modules.foodgram` in the app config)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FoodgramConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,
}

impl Default for FoodgramConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            public_base_url: default_public_base_url(),
            max_image_bytes: default_max_image_bytes(),
        }
    }
}

impl FoodgramConfig {
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            default_page_size: self.default_page_size,
            max_page_size: self.max_page_size,
            public_base_url: self.public_base_url.trim_end_matches('/').to_string(),
            max_image_bytes: self.max_image_bytes,
            ..ServiceConfig::default()
        }
    }
}

fn default_page_size() -> u64 {
    6
}

fn default_max_page_size() -> u64 {
    100
}

fn default_public_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_max_image_bytes() -> usize {
    5 * 1024 * 1024
}
