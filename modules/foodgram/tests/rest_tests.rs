mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{setup, TestApp, PNG};
use foodgram::contract::model::{Principal, RelationKind};

fn router(app: &TestApp) -> Router {
    app.module.register_rest(Router::new())
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Token {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(router: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = router.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn register_and_fetch_user() {
    let app = setup().await;
    let body = json!({
        "email": "chef@example.com",
        "username": "chef",
        "first_name": "Gordon",
        "last_name": "Ramsay"
    });

    let (status, user) = send(router(&app), request(Method::POST, "/api/users/", None, Some(body.clone()))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["username"], "chef");
    assert_eq!(user["is_subscribed"], false);

    let (status, problem) = send(router(&app), request(Method::POST, "/api/users", None, Some(body))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(problem["code"], "FOODGRAM_CONFLICT");

    let uri = format!("/api/users/{}/", user["id"]);
    let (status, fetched) = send(router(&app), request(Method::GET, &uri, None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["email"], "chef@example.com");
}

#[tokio::test]
async fn auth_header_rules() {
    let app = setup().await;
    let (user, token) = app.user_with_token("chef").await;

    let (status, problem) = send(router(&app), request(Method::GET, "/api/users/me/", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(problem["status"], 401);
    assert_eq!(problem["instance"], "/api/users/me/");

    let (status, me) = send(router(&app), request(Method::GET, "/api/users/me/", Some(token.as_str()), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], user.id);

    // An unknown token is rejected even where anonymous access is allowed.
    let (status, _) = send(router(&app), request(Method::GET, "/api/recipes/", Some("nope"), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .uri("/api/recipes/")
        .header(header::AUTHORIZATION, "garbage")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(router(&app), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .uri("/api/users/me")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(router(&app), req).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn recipe_lifecycle_over_http() {
    let app = setup().await;
    let (_, chef) = app.user_with_token("chef").await;
    let (_, critic) = app.user_with_token("critic").await;
    let eggs = app.ingredient("eggs", "шт").await;

    let body = json!({
        "ingredients": [{"id": eggs.id, "amount": 3}],
        "image": PNG,
        "name": "Omelette",
        "text": "Beat and fry",
        "cooking_time": 10
    });
    let (status, _) = send(router(&app), request(Method::POST, "/api/recipes/", None, Some(body.clone()))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, recipe) = send(router(&app), request(Method::POST, "/api/recipes/", Some(chef.as_str()), Some(body))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(recipe["ingredients"][0]["measurement_unit"], "шт");
    assert_eq!(recipe["ingredients"][0]["amount"], 3);
    let uri = format!("/api/recipes/{}/", recipe["id"]);

    let patch = json!({"cooking_time": 0});
    let (status, problem) = send(router(&app), request(Method::PATCH, &uri, Some(chef.as_str()), Some(patch))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(problem["code"], "FOODGRAM_VALIDATION");
    assert_eq!(problem["errors"][0]["pointer"], "/cooking_time");

    let patch = json!({"name": "Stolen"});
    let (status, problem) = send(router(&app), request(Method::PATCH, &uri, Some(critic.as_str()), Some(patch))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(problem["code"], "FOODGRAM_FORBIDDEN");

    let patch = json!({"name": "Fluffy omelette"});
    let (status, updated) = send(router(&app), request(Method::PATCH, &uri, Some(chef.as_str()), Some(patch))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Fluffy omelette");

    let link_uri = format!("/api/recipes/{}/get-link/", recipe["id"]);
    let (status, link) = send(router(&app), request(Method::GET, &link_uri, None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        link["short-link"],
        format!("http://localhost:8000/recipes/{}/", recipe["id"])
    );

    let (status, _) = send(router(&app), request(Method::DELETE, &uri, Some(critic.as_str()), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(router(&app), request(Method::DELETE, &uri, Some(chef.as_str()), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, problem) = send(router(&app), request(Method::GET, &uri, None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(problem["code"], "FOODGRAM_NOT_FOUND");
}

#[tokio::test]
async fn malformed_input_is_a_problem_response() {
    let app = setup().await;
    let (_, chef) = app.user_with_token("chef").await;

    let (status, problem) = send(router(&app), request(Method::GET, "/api/recipes/abc/", None, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(problem["code"], "FOODGRAM_BAD_REQUEST");

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/recipes/")
        .header(header::AUTHORIZATION, format!("Token {chef}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = router(&app).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/problem+json"
    );
}

#[tokio::test]
async fn recipe_list_envelope_and_links() {
    let app = setup().await;
    let chef = app.user("chef").await;
    let eggs = app.ingredient("eggs", "шт").await;
    for name in ["One", "Two", "Three"] {
        app.recipe(&chef, name, &[(&eggs, 1)]).await;
    }

    let (status, page) = send(router(&app), request(Method::GET, "/api/recipes/?limit=2", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 3);
    assert_eq!(page["results"].as_array().unwrap().len(), 2);
    assert_eq!(page["results"][0]["name"], "Three");
    assert_eq!(page["next"], "/api/recipes/?limit=2&page=2");
    assert_eq!(page["previous"], Value::Null);

    let uri = format!("/api/recipes/?author={}&limit=2&page=2", chef.id);
    let (_, page) = send(router(&app), request(Method::GET, &uri, None, None)).await;
    assert_eq!(page["results"].as_array().unwrap().len(), 1);
    assert_eq!(page["next"], Value::Null);
    assert_eq!(page["previous"], format!("/api/recipes/?author={}&limit=2", chef.id));
}

#[tokio::test]
async fn list_query_tolerates_blank_and_malformed_values() {
    let app = setup().await;
    let chef = app.user("chef").await;
    let eggs = app.ingredient("eggs", "шт").await;
    for name in ["One", "Two"] {
        app.recipe(&chef, name, &[(&eggs, 1)]).await;
    }

    let uri = "/api/recipes/?author=&is_favorited=&is_in_shopping_cart=&page=";
    let (status, page) = send(router(&app), request(Method::GET, uri, None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 2);

    let (status, page) =
        send(router(&app), request(Method::GET, "/api/recipes/?limit=abc&author=x", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["results"].as_array().unwrap().len(), 2);

    let (status, page) = send(router(&app), request(Method::GET, "/api/users/?page=abc", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 1);
}

#[tokio::test]
async fn huge_page_numbers_return_an_empty_page() {
    let app = setup().await;
    let (_, token) = app.user_with_token("chef").await;
    let eggs = app.ingredient("eggs", "шт").await;
    let cook = app.user("cook").await;
    app.recipe(&cook, "One", &[(&eggs, 1)]).await;

    let page = u64::MAX;
    for uri in [
        format!("/api/recipes/?page={page}"),
        format!("/api/recipes/?page={page}&limit=1"),
        format!("/api/recipes/favorites/?page={page}"),
        format!("/api/users/?page={page}"),
        format!("/api/users/subscriptions/?page={page}"),
    ] {
        let (status, body) = send(router(&app), request(Method::GET, &uri, Some(token.as_str()), None)).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["results"], json!([]), "{uri}");
        assert_eq!(body["next"], Value::Null, "{uri}");
    }

    let (reader, reader_token) = app.user_with_token("reader").await;
    app.service
        .subscribe(Principal::User(reader.id), cook.id, None)
        .await
        .unwrap();
    let uri = format!("/api/users/subscriptions/?recipes_limit={page}");
    let (status, body) = send(router(&app), request(Method::GET, &uri, Some(reader_token.as_str()), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["recipes"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn favorites_and_cart_toggles() {
    let app = setup().await;
    let chef = app.user("chef").await;
    let (_, buyer) = app.user_with_token("buyer").await;
    let eggs = app.ingredient("eggs", "шт").await;
    let recipe = app.recipe(&chef, "Omelette", &[(&eggs, 3)]).await;

    for segment in ["favorite", "shopping_cart"] {
        let uri = format!("/api/recipes/{}/{segment}/", recipe.id);
        let (status, short) = send(router(&app), request(Method::POST, &uri, Some(buyer.as_str()), None)).await;
        assert_eq!(status, StatusCode::CREATED, "{segment}");
        assert_eq!(short["name"], "Omelette");
        assert!(short.get("ingredients").is_none());

        let (status, _) = send(router(&app), request(Method::POST, &uri, Some(buyer.as_str()), None)).await;
        assert_eq!(status, StatusCode::CONFLICT, "{segment}");
    }

    let uri = "/api/recipes/?is_favorited=1&is_in_shopping_cart=true";
    let (_, page) = send(router(&app), request(Method::GET, uri, Some(buyer.as_str()), None)).await;
    assert_eq!(page["count"], 1);
    assert_eq!(page["results"][0]["is_favorited"], true);
    assert_eq!(page["results"][0]["is_in_shopping_cart"], true);

    let uri = format!("/api/recipes/{}/favorite/", recipe.id);
    let (status, _) = send(router(&app), request(Method::DELETE, &uri, Some(buyer.as_str()), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, problem) = send(router(&app), request(Method::DELETE, &uri, Some(buyer.as_str()), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(problem["code"], "FOODGRAM_NOT_FOUND");
}

#[tokio::test]
async fn shopping_list_download_is_a_text_attachment() {
    let app = setup().await;
    let chef = app.user("chef").await;
    let (buyer, token) = app.user_with_token("buyer").await;
    let eggs = app.ingredient("eggs", "шт").await;
    let recipe = app.recipe(&chef, "Omelette", &[(&eggs, 3)]).await;

    let uri = "/api/recipes/download_shopping_cart/";
    let (status, problem) = send(router(&app), request(Method::GET, uri, Some(token.as_str()), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(problem["code"], "FOODGRAM_EMPTY_CART");

    app.service
        .add_relation(Principal::User(buyer.id), RelationKind::ShoppingCart, recipe.id)
        .await
        .unwrap();

    let resp = router(&app)
        .oneshot(request(Method::GET, uri, Some(token.as_str()), None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/plain; charset=utf-8"
    );
    assert_eq!(
        resp.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"shopping_list.txt\""
    );
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("- eggs (шт) — 3\n"));
}

#[tokio::test]
async fn subscriptions_over_http() {
    let app = setup().await;
    let chef = app.user("chef").await;
    let (reader, token) = app.user_with_token("reader").await;
    let eggs = app.ingredient("eggs", "шт").await;
    for name in ["One", "Two", "Three"] {
        app.recipe(&chef, name, &[(&eggs, 1)]).await;
    }

    let uri = format!("/api/users/{}/subscribe/", reader.id);
    let (status, problem) = send(router(&app), request(Method::POST, &uri, Some(token.as_str()), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(problem["code"], "FOODGRAM_SELF_SUBSCRIPTION");

    let uri = format!("/api/users/{}/subscribe/?recipes_limit=1", chef.id);
    let (status, sub) = send(router(&app), request(Method::POST, &uri, Some(token.as_str()), None)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sub["username"], "chef");
    assert_eq!(sub["is_subscribed"], true);
    assert_eq!(sub["recipes_count"], 3);
    assert_eq!(sub["recipes"].as_array().unwrap().len(), 1);

    // A non-numeric limit is ignored.
    let (status, page) = send(
        router(&app),
        request(Method::GET, "/api/users/subscriptions/?recipes_limit=abc", Some(token.as_str()), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 1);
    assert_eq!(page["results"][0]["recipes"].as_array().unwrap().len(), 3);

    let uri = format!("/api/users/{}/subscribe/", chef.id);
    let (status, _) = send(router(&app), request(Method::DELETE, &uri, Some(token.as_str()), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(router(&app), request(Method::DELETE, &uri, Some(token.as_str()), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn ingredient_endpoints() {
    let app = setup().await;
    let eggs = app.ingredient("eggs", "шт").await;
    app.ingredient("pepper", "g").await;

    let (status, found) = send(router(&app), request(Method::GET, "/api/ingredients/?name=egg", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found, json!([{"id": eggs.id, "name": "eggs", "measurement_unit": "шт"}]));

    let (_, found) = send(router(&app), request(Method::GET, "/api/ingredients/", None, None)).await;
    assert_eq!(found, json!([]));

    let uri = format!("/api/ingredients/{}", eggs.id);
    let (status, one) = send(router(&app), request(Method::GET, &uri, None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(one["name"], "eggs");

    let (status, _) = send(router(&app), request(Method::GET, "/api/ingredients/999/", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn avatar_endpoints() {
    let app = setup().await;
    let (_, token) = app.user_with_token("chef").await;
    let uri = "/api/users/me/avatar/";

    let (status, body) = send(router(&app), request(Method::PUT, uri, Some(token.as_str()), Some(json!({"avatar": PNG})))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["avatar"], PNG);

    let (status, problem) = send(
        router(&app),
        request(Method::PUT, uri, Some(token.as_str()), Some(json!({"avatar": "data:text/plain;base64,aGk="}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(problem["errors"][0]["pointer"], "/avatar");

    let (status, _) = send(router(&app), request(Method::DELETE, uri, Some(token.as_str()), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, me) = send(router(&app), request(Method::GET, "/api/users/me/", Some(token.as_str()), None)).await;
    assert_eq!(me["avatar"], Value::Null);
}
