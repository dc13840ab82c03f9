pub mod client;
pub mod error;
pub mod model;

pub use client::FoodgramApi;
pub use error::FoodgramError;
pub use model::*;
