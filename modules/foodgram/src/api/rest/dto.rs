use std::str::FromStr;

use axum::http::Uri;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;
use utoipa::ToSchema;

use crate::contract::model::{
    Ingredient, IngredientAmount, NewRecipe, NewUser, Page, PageRequest, Recipe,
    RecipeIngredient, RecipePatch, ShareLink, ShortRecipe, Subscription, User, UserId,
};

/// REST DTO for a user profile as seen by the caller
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub avatar: Option<String>,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            username: u.username,
            first_name: u.first_name,
            last_name: u.last_name,
            is_subscribed: u.is_subscribed,
            avatar: u.avatar,
        }
    }
}

/// Registration payload. Credentials are handled by the external token issuer.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterUserReq {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<RegisterUserReq> for NewUser {
    fn from(req: RegisterUserReq) -> Self {
        Self {
            email: req.email,
            username: req.username,
            first_name: req.first_name,
            last_name: req.last_name,
        }
    }
}

/// Avatar as a base64 data URI, used for both request and response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AvatarDto {
    pub avatar: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IngredientDto {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
}

impl From<Ingredient> for IngredientDto {
    fn from(i: Ingredient) -> Self {
        Self {
            id: i.id,
            name: i.name,
            measurement_unit: i.measurement_unit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipeIngredientDto {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

impl From<RecipeIngredient> for RecipeIngredientDto {
    fn from(i: RecipeIngredient) -> Self {
        Self {
            id: i.id,
            name: i.name,
            measurement_unit: i.measurement_unit,
            amount: i.amount,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipeDto {
    pub id: i64,
    pub author: UserDto,
    pub ingredients: Vec<RecipeIngredientDto>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

impl From<Recipe> for RecipeDto {
    fn from(r: Recipe) -> Self {
        Self {
            id: r.id,
            author: r.author.into(),
            ingredients: r.ingredients.into_iter().map(Into::into).collect(),
            is_favorited: r.is_favorited,
            is_in_shopping_cart: r.is_in_shopping_cart,
            name: r.name,
            image: r.image,
            text: r.text,
            cooking_time: r.cooking_time,
        }
    }
}

/// Compact recipe form used in relation responses and subscription previews
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShortRecipeDto {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl From<ShortRecipe> for ShortRecipeDto {
    fn from(r: ShortRecipe) -> Self {
        Self {
            id: r.id,
            name: r.name,
            image: r.image,
            cooking_time: r.cooking_time,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IngredientAmountReq {
    pub id: i64,
    pub amount: i32,
}

impl From<IngredientAmountReq> for IngredientAmount {
    fn from(req: IngredientAmountReq) -> Self {
        Self {
            ingredient_id: req.id,
            amount: req.amount,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRecipeReq {
    pub ingredients: Vec<IngredientAmountReq>,
    /// Base64 image data URI
    pub image: String,
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
}

impl From<CreateRecipeReq> for NewRecipe {
    fn from(req: CreateRecipeReq) -> Self {
        Self {
            name: req.name,
            image: req.image,
            text: req.text,
            cooking_time: req.cooking_time,
            ingredients: req.ingredients.into_iter().map(Into::into).collect(),
        }
    }
}

/// Partial update; a present `ingredients` list replaces the stored one
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateRecipeReq {
    pub ingredients: Option<Vec<IngredientAmountReq>>,
    pub image: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
}

impl From<UpdateRecipeReq> for RecipePatch {
    fn from(req: UpdateRecipeReq) -> Self {
        Self {
            name: req.name,
            image: req.image,
            text: req.text,
            cooking_time: req.cooking_time,
            ingredients: req
                .ingredients
                .map(|items| items.into_iter().map(Into::into).collect()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShareLinkDto {
    #[serde(rename = "short-link")]
    pub short_link: String,
    pub recipe_id: i64,
    pub recipe_name: String,
}

impl From<ShareLink> for ShareLinkDto {
    fn from(l: ShareLink) -> Self {
        Self {
            short_link: l.url,
            recipe_id: l.recipe_id,
            recipe_name: l.recipe_name,
        }
    }
}

/// Followed author: the profile fields plus a recipe preview
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionDto {
    #[serde(flatten)]
    pub user: UserDto,
    pub recipes: Vec<ShortRecipeDto>,
    pub recipes_count: u64,
}

impl From<Subscription> for SubscriptionDto {
    fn from(s: Subscription) -> Self {
        Self {
            user: s.author.into(),
            recipes: s.recipes.into_iter().map(Into::into).collect(),
            recipes_count: s.recipes_count,
        }
    }
}

/// Page envelope shared by every list endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Paginated<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Build the envelope; `next`/`previous` reuse the request path and query
    /// with only `page` swapped.
    pub fn from_page<U>(page: Page<U>, uri: &Uri) -> Self
    where
        T: From<U>,
    {
        let next = page.has_next().then(|| page_link(uri, page.page + 1));
        let previous = page.has_previous().then(|| page_link(uri, page.page - 1));
        let page = page.map(T::from);
        Self {
            count: page.total,
            next,
            previous,
            results: page.items,
        }
    }
}

fn page_link(uri: &Uri, page: u64) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    if let Some(raw) = uri.query() {
        for (k, v) in form_urlencoded::parse(raw.as_bytes()) {
            if k != "page" {
                query.append_pair(&k, &v);
            }
        }
    }
    if page > 1 {
        query.append_pair("page", &page.to_string());
    }
    let query = query.finish();
    if query.is_empty() {
        uri.path().to_string()
    } else {
        format!("{}?{}", uri.path(), query)
    }
}

/// Query parameters for paginated lists
/// Values that are empty or unparsable fall back to defaults.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

fn page_request(page: Option<&str>, limit: Option<&str>) -> PageRequest {
    PageRequest {
        page: parse_number(page).unwrap_or(0),
        limit: parse_number(limit).unwrap_or(0),
    }
}

/// Lenient numeric query value: empty or malformed input is treated as absent.
pub fn parse_number<T: FromStr>(value: Option<&str>) -> Option<T> {
    value?.trim().parse().ok()
}

impl PageQuery {
    pub fn page_request(&self) -> PageRequest {
        page_request(self.page.as_deref(), self.limit.as_deref())
    }
}

/// Query parameters for `GET /recipes/`
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RecipeListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub author: Option<String>,
    pub is_favorited: Option<String>,
    pub is_in_shopping_cart: Option<String>,
}

impl RecipeListQuery {
    pub fn page_request(&self) -> PageRequest {
        page_request(self.page.as_deref(), self.limit.as_deref())
    }

    pub fn author(&self) -> Option<UserId> {
        parse_number(self.author.as_deref())
    }
}

/// `1`/`true` switch a relation filter on; anything else leaves it off.
pub fn parse_flag(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some(v) if v == "1" || v.eq_ignore_ascii_case("true"))
}

/// `recipes_limit` counts only when it is a plain non-negative integer.
pub fn parse_recipes_limit(value: Option<&str>) -> Option<u64> {
    let v = value?.trim();
    if v.is_empty() || !v.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    v.parse().ok()
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SubscriptionsQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub recipes_limit: Option<String>,
}

impl SubscriptionsQuery {
    pub fn page_request(&self) -> PageRequest {
        page_request(self.page.as_deref(), self.limit.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SubscribeQuery {
    pub recipes_limit: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct IngredientSearchQuery {
    pub name: Option<String>,
}
