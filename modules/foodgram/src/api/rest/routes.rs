use std::sync::Arc;

use axum::{
    routing::{get, post, put, MethodRouter},
    Extension, Router,
};

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Register `path` both with and without its trailing slash.
fn route_both(router: Router, path: &str, method: MethodRouter) -> Router {
    let trimmed = path.trim_end_matches('/');
    router
        .route(trimmed, method.clone())
        .route(&format!("{trimmed}/"), method)
}

pub fn register_routes(mut router: Router, service: Arc<Service>) -> Router {
    // POST /api/users - Register, GET /api/users - List users
    router = route_both(
        router,
        "/api/users/",
        get(handlers::list_users).post(handlers::register_user),
    );

    // GET /api/users/me - Current user
    router = route_both(router, "/api/users/me/", get(handlers::me));

    // PUT, DELETE /api/users/me/avatar
    router = route_both(
        router,
        "/api/users/me/avatar/",
        put(handlers::set_avatar).delete(handlers::remove_avatar),
    );

    // GET /api/users/subscriptions - Followed authors
    router = route_both(
        router,
        "/api/users/subscriptions/",
        get(handlers::list_subscriptions),
    );

    // GET /api/users/{id}
    router = route_both(router, "/api/users/{id}/", get(handlers::get_user));

    // POST, DELETE /api/users/{id}/subscribe
    router = route_both(
        router,
        "/api/users/{id}/subscribe/",
        post(handlers::subscribe).delete(handlers::unsubscribe),
    );

    // GET, POST /api/recipes
    router = route_both(
        router,
        "/api/recipes/",
        get(handlers::list_recipes).post(handlers::create_recipe),
    );

    // GET /api/recipes/favorites - Caller's favorite recipes
    router = route_both(router, "/api/recipes/favorites/", get(handlers::list_favorites));

    // GET /api/recipes/download_shopping_cart - Plain-text shopping list
    router = route_both(
        router,
        "/api/recipes/download_shopping_cart/",
        get(handlers::download_shopping_cart),
    );

    // GET, PATCH, DELETE /api/recipes/{id}
    router = route_both(
        router,
        "/api/recipes/{id}/",
        get(handlers::get_recipe)
            .patch(handlers::update_recipe)
            .delete(handlers::delete_recipe),
    );

    // GET /api/recipes/{id}/get-link
    router = route_both(router, "/api/recipes/{id}/get-link/", get(handlers::share_link));

    // POST, DELETE /api/recipes/{id}/favorite
    router = route_both(
        router,
        "/api/recipes/{id}/favorite/",
        post(handlers::add_favorite).delete(handlers::remove_favorite),
    );

    // POST, DELETE /api/recipes/{id}/shopping_cart
    router = route_both(
        router,
        "/api/recipes/{id}/shopping_cart/",
        post(handlers::add_to_cart).delete(handlers::remove_from_cart),
    );

    // GET /api/ingredients?name=<prefix>
    router = route_both(router, "/api/ingredients/", get(handlers::search_ingredients));

    // GET /api/ingredients/{id}
    router = route_both(router, "/api/ingredients/{id}/", get(handlers::get_ingredient));

    router.layer(Extension(service))
}
