use std::sync::Arc;

use axum::{
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    Extension,
};
use tracing::{error, info};

use crate::api::rest::auth::CurrentPrincipal;
use crate::api::rest::dto::{
    parse_flag, parse_recipes_limit, AvatarDto, CreateRecipeReq, IngredientDto,
    IngredientSearchQuery, PageQuery, Paginated, RecipeDto, RecipeListQuery, RegisterUserReq,
    ShareLinkDto, ShortRecipeDto, SubscribeQuery, SubscriptionDto, SubscriptionsQuery,
    UpdateRecipeReq, UserDto,
};
use crate::api::rest::error::map_domain_error;
use crate::api::rest::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::rest::problem::ProblemResponse;
use crate::contract::model::{RecipeQuery, RelationKind};
use crate::domain::service::Service;

type Svc = Extension<Arc<Service>>;

pub const SHOPPING_LIST_FILENAME: &str = "shopping_list.txt";

// ---- users ----

pub async fn register_user(
    uri: Uri,
    Extension(svc): Svc,
    ApiJson(req): ApiJson<RegisterUserReq>,
) -> Result<(StatusCode, Json<UserDto>), ProblemResponse> {
    info!("Registering user: {}", req.username);

    match svc.register_user(req.into()).await {
        Ok(user) => Ok((StatusCode::CREATED, Json(UserDto::from(user)))),
        Err(e) => {
            error!("Failed to register user: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn list_users(
    uri: Uri,
    Extension(svc): Svc,
    CurrentPrincipal(viewer): CurrentPrincipal,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<Paginated<UserDto>>, ProblemResponse> {
    info!("Listing users with query: {:?}", query);

    match svc.list_users(viewer, query.page_request()).await {
        Ok(page) => Ok(Json(Paginated::from_page(page, &uri))),
        Err(e) => {
            error!("Failed to list users: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn get_user(
    uri: Uri,
    Extension(svc): Svc,
    CurrentPrincipal(viewer): CurrentPrincipal,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<UserDto>, ProblemResponse> {
    info!("Getting user with id: {}", id);

    match svc.get_user(viewer, id).await {
        Ok(user) => Ok(Json(UserDto::from(user))),
        Err(e) => {
            error!("Failed to get user {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn me(
    uri: Uri,
    Extension(svc): Svc,
    CurrentPrincipal(viewer): CurrentPrincipal,
) -> Result<Json<UserDto>, ProblemResponse> {
    match svc.me(viewer).await {
        Ok(user) => Ok(Json(UserDto::from(user))),
        Err(e) => {
            error!("Failed to load current user: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn set_avatar(
    uri: Uri,
    Extension(svc): Svc,
    CurrentPrincipal(viewer): CurrentPrincipal,
    ApiJson(req): ApiJson<AvatarDto>,
) -> Result<Json<AvatarDto>, ProblemResponse> {
    info!("Updating avatar");

    match svc.set_avatar(viewer, req.avatar).await {
        Ok(avatar) => Ok(Json(AvatarDto { avatar })),
        Err(e) => {
            error!("Failed to set avatar: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn remove_avatar(
    uri: Uri,
    Extension(svc): Svc,
    CurrentPrincipal(viewer): CurrentPrincipal,
) -> Result<StatusCode, ProblemResponse> {
    info!("Removing avatar");

    match svc.remove_avatar(viewer).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to remove avatar: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

// ---- subscriptions ----

pub async fn subscribe(
    uri: Uri,
    Extension(svc): Svc,
    CurrentPrincipal(viewer): CurrentPrincipal,
    ApiPath(author_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<SubscribeQuery>,
) -> Result<(StatusCode, Json<SubscriptionDto>), ProblemResponse> {
    info!("Subscribing to user {}", author_id);
    let recipes_limit = parse_recipes_limit(query.recipes_limit.as_deref());

    match svc.subscribe(viewer, author_id, recipes_limit).await {
        Ok(sub) => Ok((StatusCode::CREATED, Json(SubscriptionDto::from(sub)))),
        Err(e) => {
            error!("Failed to subscribe to user {}: {}", author_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn unsubscribe(
    uri: Uri,
    Extension(svc): Svc,
    CurrentPrincipal(viewer): CurrentPrincipal,
    ApiPath(author_id): ApiPath<i64>,
) -> Result<StatusCode, ProblemResponse> {
    info!("Unsubscribing from user {}", author_id);

    match svc.unsubscribe(viewer, author_id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to unsubscribe from user {}: {}", author_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn list_subscriptions(
    uri: Uri,
    Extension(svc): Svc,
    CurrentPrincipal(viewer): CurrentPrincipal,
    ApiQuery(query): ApiQuery<SubscriptionsQuery>,
) -> Result<Json<Paginated<SubscriptionDto>>, ProblemResponse> {
    info!("Listing subscriptions with query: {:?}", query);
    let recipes_limit = parse_recipes_limit(query.recipes_limit.as_deref());

    match svc
        .list_subscriptions(viewer, query.page_request(), recipes_limit)
        .await
    {
        Ok(page) => Ok(Json(Paginated::from_page(page, &uri))),
        Err(e) => {
            error!("Failed to list subscriptions: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

// ---- recipes ----

pub async fn list_recipes(
    uri: Uri,
    Extension(svc): Svc,
    CurrentPrincipal(viewer): CurrentPrincipal,
    ApiQuery(query): ApiQuery<RecipeListQuery>,
) -> Result<Json<Paginated<RecipeDto>>, ProblemResponse> {
    info!("Listing recipes with query: {:?}", query);
    let filter = RecipeQuery {
        author: query.author(),
        is_favorited: parse_flag(query.is_favorited.as_deref()),
        is_in_shopping_cart: parse_flag(query.is_in_shopping_cart.as_deref()),
    };

    match svc.list_recipes(viewer, filter, query.page_request()).await {
        Ok(page) => Ok(Json(Paginated::from_page(page, &uri))),
        Err(e) => {
            error!("Failed to list recipes: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn list_favorites(
    uri: Uri,
    Extension(svc): Svc,
    CurrentPrincipal(viewer): CurrentPrincipal,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<Paginated<RecipeDto>>, ProblemResponse> {
    match svc.list_favorites(viewer, query.page_request()).await {
        Ok(page) => Ok(Json(Paginated::from_page(page, &uri))),
        Err(e) => {
            error!("Failed to list favorites: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn get_recipe(
    uri: Uri,
    Extension(svc): Svc,
    CurrentPrincipal(viewer): CurrentPrincipal,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<RecipeDto>, ProblemResponse> {
    info!("Getting recipe with id: {}", id);

    match svc.get_recipe(viewer, id).await {
        Ok(recipe) => Ok(Json(RecipeDto::from(recipe))),
        Err(e) => {
            error!("Failed to get recipe {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn create_recipe(
    uri: Uri,
    Extension(svc): Svc,
    CurrentPrincipal(viewer): CurrentPrincipal,
    ApiJson(req): ApiJson<CreateRecipeReq>,
) -> Result<(StatusCode, Json<RecipeDto>), ProblemResponse> {
    info!("Creating recipe: {}", req.name);

    match svc.create_recipe(viewer, req.into()).await {
        Ok(recipe) => Ok((StatusCode::CREATED, Json(RecipeDto::from(recipe)))),
        Err(e) => {
            error!("Failed to create recipe: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn update_recipe(
    uri: Uri,
    Extension(svc): Svc,
    CurrentPrincipal(viewer): CurrentPrincipal,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateRecipeReq>,
) -> Result<Json<RecipeDto>, ProblemResponse> {
    info!("Updating recipe {}", id);

    match svc.update_recipe(viewer, id, req.into()).await {
        Ok(recipe) => Ok(Json(RecipeDto::from(recipe))),
        Err(e) => {
            error!("Failed to update recipe {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn delete_recipe(
    uri: Uri,
    Extension(svc): Svc,
    CurrentPrincipal(viewer): CurrentPrincipal,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ProblemResponse> {
    info!("Deleting recipe {}", id);

    match svc.delete_recipe(viewer, id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to delete recipe {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn share_link(
    uri: Uri,
    Extension(svc): Svc,
    CurrentPrincipal(viewer): CurrentPrincipal,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ShareLinkDto>, ProblemResponse> {
    match svc.share_link(viewer, id).await {
        Ok(link) => Ok(Json(ShareLinkDto::from(link))),
        Err(e) => {
            error!("Failed to build link for recipe {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

async fn add_relation(
    uri: Uri,
    svc: Arc<Service>,
    viewer: crate::contract::model::Principal,
    kind: RelationKind,
    id: i64,
) -> Result<(StatusCode, Json<ShortRecipeDto>), ProblemResponse> {
    info!("Adding recipe {} to {}", id, kind);

    match svc.add_relation(viewer, kind, id).await {
        Ok(recipe) => Ok((StatusCode::CREATED, Json(ShortRecipeDto::from(recipe)))),
        Err(e) => {
            error!("Failed to add recipe {} to {}: {}", id, kind, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

async fn remove_relation(
    uri: Uri,
    svc: Arc<Service>,
    viewer: crate::contract::model::Principal,
    kind: RelationKind,
    id: i64,
) -> Result<StatusCode, ProblemResponse> {
    info!("Removing recipe {} from {}", id, kind);

    match svc.remove_relation(viewer, kind, id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to remove recipe {} from {}: {}", id, kind, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn add_favorite(
    uri: Uri,
    Extension(svc): Svc,
    CurrentPrincipal(viewer): CurrentPrincipal,
    ApiPath(id): ApiPath<i64>,
) -> Result<(StatusCode, Json<ShortRecipeDto>), ProblemResponse> {
    add_relation(uri, svc, viewer, RelationKind::Favorite, id).await
}

pub async fn remove_favorite(
    uri: Uri,
    Extension(svc): Svc,
    CurrentPrincipal(viewer): CurrentPrincipal,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ProblemResponse> {
    remove_relation(uri, svc, viewer, RelationKind::Favorite, id).await
}

pub async fn add_to_cart(
    uri: Uri,
    Extension(svc): Svc,
    CurrentPrincipal(viewer): CurrentPrincipal,
    ApiPath(id): ApiPath<i64>,
) -> Result<(StatusCode, Json<ShortRecipeDto>), ProblemResponse> {
    add_relation(uri, svc, viewer, RelationKind::ShoppingCart, id).await
}

pub async fn remove_from_cart(
    uri: Uri,
    Extension(svc): Svc,
    CurrentPrincipal(viewer): CurrentPrincipal,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ProblemResponse> {
    remove_relation(uri, svc, viewer, RelationKind::ShoppingCart, id).await
}

/// Shopping list as a `text/plain` attachment
pub async fn download_shopping_cart(
    uri: Uri,
    Extension(svc): Svc,
    CurrentPrincipal(viewer): CurrentPrincipal,
) -> Result<Response, ProblemResponse> {
    info!("Downloading shopping list");

    match svc.shopping_list(viewer).await {
        Ok(text) => Ok((
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{SHOPPING_LIST_FILENAME}\""),
                ),
            ],
            text,
        )
            .into_response()),
        Err(e) => {
            error!("Failed to build shopping list: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

// ---- ingredients ----

pub async fn search_ingredients(
    uri: Uri,
    Extension(svc): Svc,
    ApiQuery(query): ApiQuery<IngredientSearchQuery>,
) -> Result<Json<Vec<IngredientDto>>, ProblemResponse> {
    let prefix = query.name.unwrap_or_default();

    match svc.search_ingredients(&prefix).await {
        Ok(items) => Ok(Json(items.into_iter().map(IngredientDto::from).collect())),
        Err(e) => {
            error!("Failed to search ingredients: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn get_ingredient(
    uri: Uri,
    Extension(svc): Svc,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<IngredientDto>, ProblemResponse> {
    match svc.get_ingredient(id).await {
        Ok(item) => Ok(Json(IngredientDto::from(item))),
        Err(e) => {
            error!("Failed to get ingredient {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
