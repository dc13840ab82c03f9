//! SeaORM entities for the foodgram schema.

pub mod auth_token;
pub mod ingredient;
pub mod recipe;
pub mod recipe_ingredient;
pub mod subscription;
pub mod user;
pub mod user_recipe_relation;
