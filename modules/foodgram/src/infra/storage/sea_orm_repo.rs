//! SeaORM-backed implementation of the domain repository ports.
//!
//! Generic over `C: ConnectionTrait + TransactionTrait`, so it runs on a
//! `DatabaseConnection` or inside an outer transaction. Multi-statement writes
//! (recipe create/update) open their own transaction on `C`.
//!
//! Per-viewer flags (`is_subscribed`, `is_favorited`, `is_in_shopping_cart`)
//! are computed in the same SELECT through `EXISTS` subqueries; anonymous
//! viewers get a constant `false`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, LikeExpr, OnConflict, Query, SelectStatement, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult,
    JoinType, NotSet, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
    Set, TransactionTrait,
};

use crate::contract::model::{
    Ingredient, IngredientAmount, IngredientId, NewIngredient, NewRecipe, NewUser, Recipe,
    RecipeId, RecipeIngredient, RecipePatch, RelationKind, ShortRecipe, User, UserId,
};
use crate::domain::repo::{
    IngredientsRepository, RecipeFilter, RecipesRepository, RelationsRepository, RepoError,
    RepoResult, ShoppingItem, SubscriptionsRepository, UsersRepository,
};
use crate::infra::storage::entity::{
    auth_token, ingredient, recipe, recipe_ingredient, subscription, user, user_recipe_relation,
};

/// SeaORM repository impl.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

/// Translate a store error, keeping unique-constraint violations distinguishable.
fn db_err(op: &'static str) -> impl FnOnce(DbErr) -> RepoError {
    move |e| {
        if db::is_unique_violation(&e) {
            RepoError::UniqueViolation(format!("{op}: {e}"))
        } else {
            RepoError::Other(anyhow::Error::new(e).context(format!("{op} failed")))
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct UserRow {
    id: i64,
    email: String,
    username: String,
    first_name: String,
    last_name: String,
    avatar: Option<String>,
    is_subscribed: bool,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            id: r.id,
            email: r.email,
            username: r.username,
            first_name: r.first_name,
            last_name: r.last_name,
            avatar: r.avatar,
            is_subscribed: r.is_subscribed,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct RecipeRow {
    id: i64,
    author_id: i64,
    name: String,
    image: String,
    text: String,
    cooking_time: i32,
    created_at: DateTime<Utc>,
    is_favorited: bool,
    is_in_shopping_cart: bool,
}

#[derive(Debug, FromQueryResult)]
struct LineRow {
    recipe_id: i64,
    ingredient_id: i64,
    name: String,
    measurement_unit: String,
    amount: i32,
}

#[derive(Debug, FromQueryResult)]
struct ShoppingRow {
    name: String,
    measurement_unit: String,
    total: i64,
}

impl From<ingredient::Model> for Ingredient {
    fn from(m: ingredient::Model) -> Self {
        Ingredient {
            id: m.id,
            name: m.name,
            measurement_unit: m.measurement_unit,
        }
    }
}

impl From<recipe::Model> for ShortRecipe {
    fn from(m: recipe::Model) -> Self {
        ShortRecipe {
            id: m.id,
            name: m.name,
            image: m.image,
            cooking_time: m.cooking_time,
        }
    }
}

/// `EXISTS(viewer follows users.id)`, or `false` without a viewer.
fn subscribed_expr(viewer: Option<UserId>) -> SimpleExpr {
    match viewer {
        Some(v) => Expr::exists(
            Query::select()
                .expr(Expr::val(1))
                .from(subscription::Entity)
                .and_where(subscription::Column::UserId.eq(v))
                .and_where(
                    Expr::col((subscription::Entity, subscription::Column::AuthorId))
                        .equals((user::Entity, user::Column::Id)),
                )
                .to_owned(),
        ),
        None => Expr::val(false).into(),
    }
}

/// `EXISTS(viewer put recipes.id on the kind list)`, or `false` without a viewer.
fn relation_flag(viewer: Option<UserId>, kind: RelationKind) -> SimpleExpr {
    match viewer {
        Some(v) => Expr::exists(
            Query::select()
                .expr(Expr::val(1))
                .from(user_recipe_relation::Entity)
                .and_where(user_recipe_relation::Column::UserId.eq(v))
                .and_where(user_recipe_relation::Column::Kind.eq(kind.as_str()))
                .and_where(
                    Expr::col((
                        user_recipe_relation::Entity,
                        user_recipe_relation::Column::RecipeId,
                    ))
                    .equals((recipe::Entity, recipe::Column::Id)),
                )
                .to_owned(),
        ),
        None => Expr::val(false).into(),
    }
}

/// Recipe ids the user has in the `kind` list.
fn related_recipe_ids(user_id: UserId, kind: RelationKind) -> SelectStatement {
    Query::select()
        .column(user_recipe_relation::Column::RecipeId)
        .from(user_recipe_relation::Entity)
        .and_where(user_recipe_relation::Column::UserId.eq(user_id))
        .and_where(user_recipe_relation::Column::Kind.eq(kind.as_str()))
        .to_owned()
}

/// Escape LIKE wildcards so user input only ever matches literally.
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn user_select(viewer: Option<UserId>) -> Select<user::Entity> {
    user::Entity::find().column_as(subscribed_expr(viewer), "is_subscribed")
}

fn recipe_select(viewer: Option<UserId>, filter: RecipeFilter) -> Select<recipe::Entity> {
    let mut select = recipe::Entity::find();
    if let Some(author) = filter.author {
        select = select.filter(recipe::Column::AuthorId.eq(author));
    }
    if let Some(uid) = filter.favorited_by {
        select = select.filter(
            recipe::Column::Id.in_subquery(related_recipe_ids(uid, RelationKind::Favorite)),
        );
    }
    if let Some(uid) = filter.in_cart_of {
        select = select.filter(
            recipe::Column::Id.in_subquery(related_recipe_ids(uid, RelationKind::ShoppingCart)),
        );
    }
    select
        .column_as(relation_flag(viewer, RelationKind::Favorite), "is_favorited")
        .column_as(
            relation_flag(viewer, RelationKind::ShoppingCart),
            "is_in_shopping_cart",
        )
}

async fn insert_lines<T: ConnectionTrait>(
    conn: &T,
    recipe_id: RecipeId,
    items: &[IngredientAmount],
) -> Result<(), DbErr> {
    if items.is_empty() {
        return Ok(());
    }
    let rows = items.iter().map(|i| recipe_ingredient::ActiveModel {
        id: NotSet,
        recipe_id: Set(recipe_id),
        ingredient_id: Set(i.ingredient_id),
        amount: Set(i.amount),
    });
    recipe_ingredient::Entity::insert_many(rows)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

impl<C> SeaOrmRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    /// Attach authors and ingredient lines to bare recipe rows, keeping row order.
    async fn hydrate(&self, rows: Vec<RecipeRow>, viewer: Option<UserId>) -> RepoResult<Vec<Recipe>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let recipe_ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut author_ids: Vec<i64> = rows.iter().map(|r| r.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let authors: HashMap<i64, User> = user_select(viewer)
            .filter(user::Column::Id.is_in(author_ids))
            .into_model::<UserRow>()
            .all(&self.conn)
            .await
            .map_err(db_err("load recipe authors"))?
            .into_iter()
            .map(|r| (r.id, User::from(r)))
            .collect();

        let lines = recipe_ingredient::Entity::find()
            .select_only()
            .column(recipe_ingredient::Column::RecipeId)
            .column(recipe_ingredient::Column::IngredientId)
            .column(ingredient::Column::Name)
            .column(ingredient::Column::MeasurementUnit)
            .column(recipe_ingredient::Column::Amount)
            .join(
                JoinType::InnerJoin,
                recipe_ingredient::Relation::Ingredient.def(),
            )
            .filter(recipe_ingredient::Column::RecipeId.is_in(recipe_ids))
            .order_by_asc(recipe_ingredient::Column::Id)
            .into_model::<LineRow>()
            .all(&self.conn)
            .await
            .map_err(db_err("load recipe ingredients"))?;

        let mut by_recipe: HashMap<i64, Vec<RecipeIngredient>> = HashMap::new();
        for line in lines {
            by_recipe.entry(line.recipe_id).or_default().push(RecipeIngredient {
                id: line.ingredient_id,
                name: line.name,
                measurement_unit: line.measurement_unit,
                amount: line.amount,
            });
        }

        rows.into_iter()
            .map(|r| {
                let author = authors.get(&r.author_id).cloned().ok_or_else(|| {
                    RepoError::Other(anyhow::anyhow!(
                        "author {} of recipe {} is missing",
                        r.author_id,
                        r.id
                    ))
                })?;
                Ok(Recipe {
                    id: r.id,
                    author,
                    ingredients: by_recipe.remove(&r.id).unwrap_or_default(),
                    name: r.name,
                    image: r.image,
                    text: r.text,
                    cooking_time: r.cooking_time,
                    is_favorited: r.is_favorited,
                    is_in_shopping_cart: r.is_in_shopping_cart,
                    created_at: r.created_at,
                })
            })
            .collect()
    }
}

#[async_trait]
impl<C> UsersRepository for SeaOrmRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn find_user(&self, id: UserId, viewer: Option<UserId>) -> RepoResult<Option<User>> {
        let row = user_select(viewer)
            .filter(user::Column::Id.eq(id))
            .into_model::<UserRow>()
            .one(&self.conn)
            .await
            .map_err(db_err("find_user"))?;
        Ok(row.map(Into::into))
    }

    async fn list_users(
        &self,
        viewer: Option<UserId>,
        offset: u64,
        limit: u64,
    ) -> RepoResult<(Vec<User>, u64)> {
        let total = user::Entity::find()
            .count(&self.conn)
            .await
            .map_err(db_err("count users"))?;
        let rows = user_select(viewer)
            .order_by_asc(user::Column::Id)
            .offset(offset)
            .limit(limit)
            .into_model::<UserRow>()
            .all(&self.conn)
            .await
            .map_err(db_err("list_users"))?;
        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    async fn email_exists(&self, email: &str) -> RepoResult<bool> {
        let count = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .count(&self.conn)
            .await
            .map_err(db_err("email_exists"))?;
        Ok(count > 0)
    }

    async fn username_exists(&self, username: &str) -> RepoResult<bool> {
        let count = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .count(&self.conn)
            .await
            .map_err(db_err("username_exists"))?;
        Ok(count > 0)
    }

    async fn insert_user(&self, new_user: NewUser, now: DateTime<Utc>) -> RepoResult<User> {
        let m = user::ActiveModel {
            id: NotSet,
            email: Set(new_user.email),
            username: Set(new_user.username),
            first_name: Set(new_user.first_name),
            last_name: Set(new_user.last_name),
            avatar: Set(None),
            created_at: Set(now),
        }
        .insert(&self.conn)
        .await
        .map_err(db_err("insert_user"))?;

        Ok(User {
            id: m.id,
            email: m.email,
            username: m.username,
            first_name: m.first_name,
            last_name: m.last_name,
            avatar: m.avatar,
            is_subscribed: false,
        })
    }

    async fn set_avatar(&self, id: UserId, avatar: Option<String>) -> RepoResult<bool> {
        let res = user::Entity::update_many()
            .col_expr(user::Column::Avatar, Expr::value(avatar))
            .filter(user::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .map_err(db_err("set_avatar"))?;
        Ok(res.rows_affected > 0)
    }

    async fn user_for_token(&self, key: &str) -> RepoResult<Option<UserId>> {
        let token = auth_token::Entity::find_by_id(key.to_owned())
            .one(&self.conn)
            .await
            .map_err(db_err("user_for_token"))?;
        Ok(token.map(|t| t.user_id))
    }
}

#[async_trait]
impl<C> IngredientsRepository for SeaOrmRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn search_ingredients(&self, prefix: &str, limit: u64) -> RepoResult<Vec<Ingredient>> {
        let pattern = format!("{}%", escape_like(prefix));
        let rows = ingredient::Entity::find()
            .filter(
                Expr::col((ingredient::Entity, ingredient::Column::SearchName))
                    .like(LikeExpr::new(pattern).escape('\\')),
            )
            .order_by_asc(ingredient::Column::Name)
            .order_by_asc(ingredient::Column::MeasurementUnit)
            .limit(limit)
            .all(&self.conn)
            .await
            .map_err(db_err("search_ingredients"))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_ingredient(&self, id: IngredientId) -> RepoResult<Option<Ingredient>> {
        let row = ingredient::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .map_err(db_err("find_ingredient"))?;
        Ok(row.map(Into::into))
    }

    async fn existing_ingredient_ids(&self, ids: &[IngredientId]) -> RepoResult<Vec<IngredientId>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        ingredient::Entity::find()
            .select_only()
            .column(ingredient::Column::Id)
            .filter(ingredient::Column::Id.is_in(ids.iter().copied()))
            .into_tuple::<i64>()
            .all(&self.conn)
            .await
            .map_err(db_err("existing_ingredient_ids"))
    }

    async fn insert_ingredients(&self, items: Vec<NewIngredient>) -> RepoResult<u64> {
        if items.is_empty() {
            return Ok(0);
        }
        let rows = items.into_iter().map(|i| ingredient::ActiveModel {
            id: NotSet,
            search_name: Set(i.name.to_lowercase()),
            name: Set(i.name),
            measurement_unit: Set(i.measurement_unit),
        });
        ingredient::Entity::insert_many(rows)
            .on_conflict(
                OnConflict::columns([
                    ingredient::Column::Name,
                    ingredient::Column::MeasurementUnit,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .map_err(db_err("insert_ingredients"))
    }
}

#[async_trait]
impl<C> RecipesRepository for SeaOrmRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn list_recipes(
        &self,
        viewer: Option<UserId>,
        filter: RecipeFilter,
        offset: u64,
        limit: u64,
    ) -> RepoResult<(Vec<Recipe>, u64)> {
        let select = recipe_select(viewer, filter);
        let total = select
            .clone()
            .count(&self.conn)
            .await
            .map_err(db_err("count recipes"))?;
        let rows = select
            .order_by_desc(recipe::Column::CreatedAt)
            .order_by_desc(recipe::Column::Id)
            .offset(offset)
            .limit(limit)
            .into_model::<RecipeRow>()
            .all(&self.conn)
            .await
            .map_err(db_err("list_recipes"))?;
        Ok((self.hydrate(rows, viewer).await?, total))
    }

    async fn find_recipe(&self, id: RecipeId, viewer: Option<UserId>) -> RepoResult<Option<Recipe>> {
        let row = recipe_select(viewer, RecipeFilter::default())
            .filter(recipe::Column::Id.eq(id))
            .into_model::<RecipeRow>()
            .one(&self.conn)
            .await
            .map_err(db_err("find_recipe"))?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(self.hydrate(vec![row], viewer).await?.pop())
    }

    async fn find_short_recipe(&self, id: RecipeId) -> RepoResult<Option<ShortRecipe>> {
        let row = recipe::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .map_err(db_err("find_short_recipe"))?;
        Ok(row.map(Into::into))
    }

    async fn recipe_author(&self, id: RecipeId) -> RepoResult<Option<UserId>> {
        recipe::Entity::find_by_id(id)
            .select_only()
            .column(recipe::Column::AuthorId)
            .into_tuple::<i64>()
            .one(&self.conn)
            .await
            .map_err(db_err("recipe_author"))
    }

    async fn insert_recipe(
        &self,
        author: UserId,
        new_recipe: NewRecipe,
        now: DateTime<Utc>,
    ) -> RepoResult<RecipeId> {
        let txn = self.conn.begin().await.map_err(db_err("begin"))?;

        let m = recipe::ActiveModel {
            id: NotSet,
            author_id: Set(author),
            name: Set(new_recipe.name),
            image: Set(new_recipe.image),
            text: Set(new_recipe.text),
            cooking_time: Set(new_recipe.cooking_time),
            created_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(db_err("insert_recipe"))?;

        insert_lines(&txn, m.id, &new_recipe.ingredients)
            .await
            .map_err(db_err("insert recipe ingredients"))?;

        txn.commit().await.map_err(db_err("commit"))?;
        Ok(m.id)
    }

    async fn update_recipe(&self, id: RecipeId, patch: RecipePatch) -> RepoResult<()> {
        let txn = self.conn.begin().await.map_err(db_err("begin"))?;

        let mut update = recipe::Entity::update_many().filter(recipe::Column::Id.eq(id));
        let mut changed = false;
        if let Some(name) = patch.name {
            update = update.col_expr(recipe::Column::Name, Expr::value(name));
            changed = true;
        }
        if let Some(image) = patch.image {
            update = update.col_expr(recipe::Column::Image, Expr::value(image));
            changed = true;
        }
        if let Some(text) = patch.text {
            update = update.col_expr(recipe::Column::Text, Expr::value(text));
            changed = true;
        }
        if let Some(minutes) = patch.cooking_time {
            update = update.col_expr(recipe::Column::CookingTime, Expr::value(minutes));
            changed = true;
        }
        if changed {
            update.exec(&txn).await.map_err(db_err("update_recipe"))?;
        }

        if let Some(items) = patch.ingredients {
            recipe_ingredient::Entity::delete_many()
                .filter(recipe_ingredient::Column::RecipeId.eq(id))
                .exec(&txn)
                .await
                .map_err(db_err("clear recipe ingredients"))?;
            insert_lines(&txn, id, &items)
                .await
                .map_err(db_err("insert recipe ingredients"))?;
        }

        txn.commit().await.map_err(db_err("commit"))?;
        Ok(())
    }

    async fn delete_recipe(&self, id: RecipeId) -> RepoResult<bool> {
        let res = recipe::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .map_err(db_err("delete_recipe"))?;
        Ok(res.rows_affected > 0)
    }
}

#[async_trait]
impl<C> RelationsRepository for SeaOrmRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn relation_exists(
        &self,
        user_id: UserId,
        recipe_id: RecipeId,
        kind: RelationKind,
    ) -> RepoResult<bool> {
        let count = user_recipe_relation::Entity::find()
            .filter(user_recipe_relation::Column::UserId.eq(user_id))
            .filter(user_recipe_relation::Column::RecipeId.eq(recipe_id))
            .filter(user_recipe_relation::Column::Kind.eq(kind.as_str()))
            .count(&self.conn)
            .await
            .map_err(db_err("relation_exists"))?;
        Ok(count > 0)
    }

    async fn add_relation(
        &self,
        user_id: UserId,
        recipe_id: RecipeId,
        kind: RelationKind,
        now: DateTime<Utc>,
    ) -> RepoResult<()> {
        user_recipe_relation::ActiveModel {
            id: NotSet,
            user_id: Set(user_id),
            recipe_id: Set(recipe_id),
            kind: Set(kind.as_str().to_owned()),
            created_at: Set(now),
        }
        .insert(&self.conn)
        .await
        .map_err(db_err("add_relation"))?;
        Ok(())
    }

    async fn remove_relation(
        &self,
        user_id: UserId,
        recipe_id: RecipeId,
        kind: RelationKind,
    ) -> RepoResult<bool> {
        let res = user_recipe_relation::Entity::delete_many()
            .filter(user_recipe_relation::Column::UserId.eq(user_id))
            .filter(user_recipe_relation::Column::RecipeId.eq(recipe_id))
            .filter(user_recipe_relation::Column::Kind.eq(kind.as_str()))
            .exec(&self.conn)
            .await
            .map_err(db_err("remove_relation"))?;
        Ok(res.rows_affected > 0)
    }

    async fn shopping_list(&self, user_id: UserId) -> RepoResult<Vec<ShoppingItem>> {
        let rows = recipe_ingredient::Entity::find()
            .select_only()
            .column(ingredient::Column::Name)
            .column(ingredient::Column::MeasurementUnit)
            .column_as(
                Expr::col((recipe_ingredient::Entity, recipe_ingredient::Column::Amount)).sum(),
                "total",
            )
            .join(
                JoinType::InnerJoin,
                recipe_ingredient::Relation::Ingredient.def(),
            )
            .filter(
                recipe_ingredient::Column::RecipeId
                    .in_subquery(related_recipe_ids(user_id, RelationKind::ShoppingCart)),
            )
            .group_by(ingredient::Column::Name)
            .group_by(ingredient::Column::MeasurementUnit)
            .order_by_asc(ingredient::Column::Name)
            .order_by_asc(ingredient::Column::MeasurementUnit)
            .into_model::<ShoppingRow>()
            .all(&self.conn)
            .await
            .map_err(db_err("shopping_list"))?;

        Ok(rows
            .into_iter()
            .map(|r| ShoppingItem {
                name: r.name,
                measurement_unit: r.measurement_unit,
                total: r.total,
            })
            .collect())
    }
}

#[async_trait]
impl<C> SubscriptionsRepository for SeaOrmRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn add_subscription(
        &self,
        user_id: UserId,
        author_id: UserId,
        now: DateTime<Utc>,
    ) -> RepoResult<()> {
        subscription::ActiveModel {
            id: NotSet,
            user_id: Set(user_id),
            author_id: Set(author_id),
            created_at: Set(now),
        }
        .insert(&self.conn)
        .await
        .map_err(db_err("add_subscription"))?;
        Ok(())
    }

    async fn remove_subscription(&self, user_id: UserId, author_id: UserId) -> RepoResult<bool> {
        let res = subscription::Entity::delete_many()
            .filter(subscription::Column::UserId.eq(user_id))
            .filter(subscription::Column::AuthorId.eq(author_id))
            .exec(&self.conn)
            .await
            .map_err(db_err("remove_subscription"))?;
        Ok(res.rows_affected > 0)
    }

    async fn list_followed(
        &self,
        user_id: UserId,
        offset: u64,
        limit: u64,
    ) -> RepoResult<(Vec<User>, u64)> {
        let followed = Query::select()
            .column(subscription::Column::AuthorId)
            .from(subscription::Entity)
            .and_where(subscription::Column::UserId.eq(user_id))
            .to_owned();

        let total = user::Entity::find()
            .filter(user::Column::Id.in_subquery(followed.clone()))
            .count(&self.conn)
            .await
            .map_err(db_err("count followed"))?;
        let rows = user_select(Some(user_id))
            .filter(user::Column::Id.in_subquery(followed))
            .order_by_asc(user::Column::Id)
            .offset(offset)
            .limit(limit)
            .into_model::<UserRow>()
            .all(&self.conn)
            .await
            .map_err(db_err("list_followed"))?;
        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    async fn recipe_counts(&self, authors: &[UserId]) -> RepoResult<HashMap<UserId, u64>> {
        if authors.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = recipe::Entity::find()
            .select_only()
            .column(recipe::Column::AuthorId)
            .column_as(
                Expr::col((recipe::Entity, recipe::Column::Id)).count(),
                "recipes_count",
            )
            .filter(recipe::Column::AuthorId.is_in(authors.iter().copied()))
            .group_by(recipe::Column::AuthorId)
            .into_tuple::<(i64, i64)>()
            .all(&self.conn)
            .await
            .map_err(db_err("recipe_counts"))?;
        Ok(rows
            .into_iter()
            .map(|(author, n)| (author, u64::try_from(n).unwrap_or(0)))
            .collect())
    }

    async fn recent_recipes(
        &self,
        author_id: UserId,
        limit: Option<u64>,
    ) -> RepoResult<Vec<ShortRecipe>> {
        let mut select = recipe::Entity::find()
            .filter(recipe::Column::AuthorId.eq(author_id))
            .order_by_desc(recipe::Column::CreatedAt)
            .order_by_desc(recipe::Column::Id);
        if let Some(n) = limit {
            // bound as i64
            select = select.limit(n.min(i64::MAX as u64));
        }
        let rows = select
            .all(&self.conn)
            .await
            .map_err(db_err("recent_recipes"))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
