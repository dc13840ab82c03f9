#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use db::{ConnectOpts, DbHandle};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

use foodgram::contract::model::{
    Ingredient, IngredientAmount, NewIngredient, NewRecipe, NewUser, Principal, Recipe, User,
};
use foodgram::domain::service::Service;
use foodgram::infra::storage::entity::auth_token;
use foodgram::{Foodgram, FoodgramConfig};

/// 1x1 transparent PNG
pub const PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

pub struct TestApp {
    pub conn: DatabaseConnection,
    pub module: Foodgram,
    pub service: Arc<Service>,
}

/// Fresh in-memory database with migrations applied
pub async fn setup() -> TestApp {
    setup_with(FoodgramConfig::default()).await
}

pub async fn setup_with(cfg: FoodgramConfig) -> TestApp {
    let handle = DbHandle::connect("sqlite::memory:", ConnectOpts::default())
        .await
        .expect("Failed to connect to test database");
    let conn = handle.sea();
    let module = Foodgram::init(conn.clone(), &cfg);
    module.migrate().await.expect("Failed to run migrations");
    let service = module.service();
    TestApp {
        conn,
        module,
        service,
    }
}

impl TestApp {
    pub async fn user(&self, username: &str) -> User {
        self.service
            .register_user(NewUser {
                email: format!("{username}@example.com"),
                username: username.to_string(),
                first_name: "Test".to_string(),
                last_name: username.to_string(),
            })
            .await
            .expect("Failed to register user")
    }

    /// Register a user and issue an API token `<username>-token` for it.
    pub async fn user_with_token(&self, username: &str) -> (User, String) {
        let user = self.user(username).await;
        let key = format!("{username}-token");
        auth_token::ActiveModel {
            key: Set(key.clone()),
            user_id: Set(user.id),
            created_at: Set(Utc::now()),
        }
        .insert(&self.conn)
        .await
        .expect("Failed to insert token");
        (user, key)
    }

    pub async fn ingredient(&self, name: &str, unit: &str) -> Ingredient {
        self.service
            .import_ingredients(vec![NewIngredient {
                name: name.to_string(),
                measurement_unit: unit.to_string(),
            }])
            .await
            .expect("Failed to import ingredient");
        self.service
            .search_ingredients(name)
            .await
            .expect("Failed to search ingredients")
            .into_iter()
            .find(|i| i.name == name && i.measurement_unit == unit)
            .expect("Imported ingredient not found")
    }

    pub async fn recipe(&self, author: &User, name: &str, lines: &[(&Ingredient, i32)]) -> Recipe {
        self.service
            .create_recipe(Principal::User(author.id), new_recipe(name, lines))
            .await
            .expect("Failed to create recipe")
    }
}

pub fn new_recipe(name: &str, lines: &[(&Ingredient, i32)]) -> NewRecipe {
    NewRecipe {
        name: name.to_string(),
        image: PNG.to_string(),
        text: format!("How to cook {name}"),
        cooking_time: 15,
        ingredients: lines
            .iter()
            .map(|(i, amount)| IngredientAmount {
                ingredient_id: i.id,
                amount: *amount,
            })
            .collect(),
    }
}
