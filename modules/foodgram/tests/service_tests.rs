mod common;

use std::collections::HashSet;

use common::{new_recipe, setup, PNG};
use foodgram::contract::model::{
    IngredientAmount, NewIngredient, NewUser, PageRequest, Principal, RecipePatch, RecipeQuery,
    RelationKind,
};
use foodgram::domain::error::DomainError;

#[tokio::test]
async fn create_recipe_stores_exact_ingredient_set() {
    let app = setup().await;
    let author = app.user("chef").await;
    let eggs = app.ingredient("eggs", "шт").await;
    let flour = app.ingredient("flour", "cup").await;

    let recipe = app.recipe(&author, "Pancakes", &[(&eggs, 2), (&flour, 1)]).await;

    let stored: HashSet<(i64, i32)> = recipe.ingredients.iter().map(|i| (i.id, i.amount)).collect();
    assert_eq!(stored, HashSet::from([(eggs.id, 2), (flour.id, 1)]));
    assert_eq!(recipe.author.id, author.id);
    assert!(!recipe.is_favorited);
    assert!(!recipe.is_in_shopping_cart);
}

#[tokio::test]
async fn duplicate_ingredient_ids_are_rejected() {
    let app = setup().await;
    let author = app.user("chef").await;
    let eggs = app.ingredient("eggs", "шт").await;
    let viewer = Principal::User(author.id);

    let err = app
        .service
        .create_recipe(viewer, new_recipe("Omelette", &[(&eggs, 2), (&eggs, 3)]))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));

    let recipe = app.recipe(&author, "Omelette", &[(&eggs, 2)]).await;
    let patch = RecipePatch {
        ingredients: Some(vec![
            IngredientAmount {
                ingredient_id: eggs.id,
                amount: 1,
            },
            IngredientAmount {
                ingredient_id: eggs.id,
                amount: 1,
            },
        ]),
        ..Default::default()
    };
    let err = app
        .service
        .update_recipe(viewer, recipe.id, patch)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));
}

#[tokio::test]
async fn cooking_time_bounds_apply_to_create_and_update() {
    let app = setup().await;
    let author = app.user("chef").await;
    let eggs = app.ingredient("eggs", "шт").await;
    let viewer = Principal::User(author.id);

    for bad in [0, -5, 1441] {
        let mut req = new_recipe("Boiled eggs", &[(&eggs, 2)]);
        req.cooking_time = bad;
        let err = app.service.create_recipe(viewer, req).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }), "{bad}");
    }

    let recipe = app.recipe(&author, "Boiled eggs", &[(&eggs, 2)]).await;
    let patch = RecipePatch {
        cooking_time: Some(0),
        ..Default::default()
    };
    let err = app
        .service
        .update_recipe(viewer, recipe.id, patch)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));

    let patch = RecipePatch {
        cooking_time: Some(1440),
        ..Default::default()
    };
    let updated = app.service.update_recipe(viewer, recipe.id, patch).await.unwrap();
    assert_eq!(updated.cooking_time, 1440);
}

#[tokio::test]
async fn update_replaces_ingredient_set() {
    let app = setup().await;
    let author = app.user("chef").await;
    let eggs = app.ingredient("eggs", "шт").await;
    let flour = app.ingredient("flour", "cup").await;
    let milk = app.ingredient("milk", "ml").await;
    let recipe = app.recipe(&author, "Pancakes", &[(&eggs, 2), (&flour, 1)]).await;

    let patch = RecipePatch {
        name: Some("Crepes".into()),
        ingredients: Some(vec![IngredientAmount {
            ingredient_id: milk.id,
            amount: 250,
        }]),
        ..Default::default()
    };
    let updated = app
        .service
        .update_recipe(Principal::User(author.id), recipe.id, patch)
        .await
        .unwrap();

    assert_eq!(updated.name, "Crepes");
    assert_eq!(updated.ingredients.len(), 1);
    assert_eq!(updated.ingredients[0].id, milk.id);
    assert_eq!(updated.ingredients[0].amount, 250);
    assert_eq!(updated.text, recipe.text);
}

#[tokio::test]
async fn unknown_ingredient_is_a_validation_error() {
    let app = setup().await;
    let author = app.user("chef").await;
    let mut req = new_recipe("Mystery", &[]);
    req.ingredients = vec![IngredientAmount {
        ingredient_id: 999,
        amount: 1,
    }];

    let err = app
        .service
        .create_recipe(Principal::User(author.id), req)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));
}

#[tokio::test]
async fn only_the_author_may_modify_a_recipe() {
    let app = setup().await;
    let author = app.user("chef").await;
    let other = app.user("critic").await;
    let eggs = app.ingredient("eggs", "шт").await;
    let recipe = app.recipe(&author, "Omelette", &[(&eggs, 3)]).await;

    let err = app
        .service
        .update_recipe(Principal::User(other.id), recipe.id, RecipePatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden));

    let err = app
        .service
        .delete_recipe(Principal::Anonymous, recipe.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Unauthorized));

    let err = app
        .service
        .delete_recipe(Principal::User(other.id), 4242)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));

    app.service
        .delete_recipe(Principal::User(author.id), recipe.id)
        .await
        .unwrap();
    let err = app
        .service
        .get_recipe(Principal::Anonymous, recipe.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn relation_add_twice_conflicts_and_remove_without_add_is_not_found() {
    let app = setup().await;
    let author = app.user("chef").await;
    let fan = app.user("fan").await;
    let eggs = app.ingredient("eggs", "шт").await;
    let recipe = app.recipe(&author, "Omelette", &[(&eggs, 3)]).await;
    let viewer = Principal::User(fan.id);

    for kind in [RelationKind::Favorite, RelationKind::ShoppingCart] {
        let err = app
            .service
            .remove_relation(viewer, kind, recipe.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::RelationNotFound { .. }), "{kind}");

        let short = app.service.add_relation(viewer, kind, recipe.id).await.unwrap();
        assert_eq!(short.id, recipe.id);
        assert_eq!(short.name, "Omelette");

        let err = app
            .service
            .add_relation(viewer, kind, recipe.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::RelationExists { .. }), "{kind}");
    }

    let seen = app.service.get_recipe(viewer, recipe.id).await.unwrap();
    assert!(seen.is_favorited);
    assert!(seen.is_in_shopping_cart);

    // The author has not marked it.
    let own = app
        .service
        .get_recipe(Principal::User(author.id), recipe.id)
        .await
        .unwrap();
    assert!(!own.is_favorited);

    app.service
        .remove_relation(viewer, RelationKind::Favorite, recipe.id)
        .await
        .unwrap();
    let seen = app.service.get_recipe(viewer, recipe.id).await.unwrap();
    assert!(!seen.is_favorited);
    assert!(seen.is_in_shopping_cart);
}

#[tokio::test]
async fn relation_on_missing_recipe_is_not_found() {
    let app = setup().await;
    let fan = app.user("fan").await;

    let err = app
        .service
        .add_relation(Principal::User(fan.id), RelationKind::Favorite, 77)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn shopping_list_sums_amounts_across_cart() {
    let app = setup().await;
    let author = app.user("chef").await;
    let buyer = app.user("buyer").await;
    let eggs = app.ingredient("eggs", "шт").await;
    let flour = app.ingredient("flour", "cup").await;
    let r1 = app.recipe(&author, "Recipe1", &[(&eggs, 2)]).await;
    let r2 = app.recipe(&author, "Recipe2", &[(&eggs, 3), (&flour, 1)]).await;
    let viewer = Principal::User(buyer.id);

    let err = app.service.shopping_list(viewer).await.unwrap_err();
    assert!(matches!(err, DomainError::EmptyCart));

    for id in [r1.id, r2.id] {
        app.service
            .add_relation(viewer, RelationKind::ShoppingCart, id)
            .await
            .unwrap();
    }
    // Favorites never reach the shopping list.
    app.service
        .add_relation(Principal::User(author.id), RelationKind::Favorite, r1.id)
        .await
        .unwrap();

    let text = app.service.shopping_list(viewer).await.unwrap();
    assert_eq!(
        text,
        "Список покупок:\n\n- eggs (шт) — 5\n- flour (cup) — 1\n\nКонец списка"
    );
    let again = app.service.shopping_list(viewer).await.unwrap();
    assert_eq!(text, again);
}

#[tokio::test]
async fn shopping_list_orders_lines_by_name() {
    let app = setup().await;
    let author = app.user("chef").await;
    let buyer = app.user("buyer").await;
    let zucchini = app.ingredient("zucchini", "g").await;
    let milk = app.ingredient("milk", "ml").await;
    let apple = app.ingredient("apple", "шт").await;
    let r1 = app
        .recipe(&author, "Stew", &[(&zucchini, 300), (&milk, 100)])
        .await;
    let r2 = app.recipe(&author, "Pie", &[(&apple, 4), (&milk, 50)]).await;
    let viewer = Principal::User(buyer.id);
    for id in [r1.id, r2.id] {
        app.service
            .add_relation(viewer, RelationKind::ShoppingCart, id)
            .await
            .unwrap();
    }

    let text = app.service.shopping_list(viewer).await.unwrap();
    assert_eq!(
        text,
        "Список покупок:\n\n- apple (шт) — 4\n- milk (ml) — 150\n- zucchini (g) — 300\n\nКонец списка"
    );
}

#[tokio::test]
async fn subscriptions_follow_and_unfollow() {
    let app = setup().await;
    let author = app.user("chef").await;
    let reader = app.user("reader").await;
    let eggs = app.ingredient("eggs", "шт").await;
    for name in ["First", "Second", "Third"] {
        app.recipe(&author, name, &[(&eggs, 1)]).await;
    }
    let viewer = Principal::User(reader.id);

    let err = app
        .service
        .subscribe(viewer, reader.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::SelfSubscription));

    let sub = app.service.subscribe(viewer, author.id, Some(2)).await.unwrap();
    assert_eq!(sub.author.id, author.id);
    assert!(sub.author.is_subscribed);
    assert_eq!(sub.recipes_count, 3);
    assert_eq!(sub.recipes.len(), 2);
    assert_eq!(sub.recipes[0].name, "Third");

    let err = app
        .service
        .subscribe(viewer, author.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::AlreadySubscribed { .. }));

    // Self-subscription stays rejected whatever else the user follows.
    let err = app
        .service
        .subscribe(viewer, reader.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::SelfSubscription));

    let page = app
        .service
        .list_subscriptions(viewer, PageRequest::default(), None)
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].recipes.len(), 3);

    let profile = app.service.get_user(viewer, author.id).await.unwrap();
    assert!(profile.is_subscribed);
    let anon = app
        .service
        .get_user(Principal::Anonymous, author.id)
        .await
        .unwrap();
    assert!(!anon.is_subscribed);

    app.service.unsubscribe(viewer, author.id).await.unwrap();
    let err = app.service.unsubscribe(viewer, author.id).await.unwrap_err();
    assert!(matches!(err, DomainError::SubscriptionNotFound { .. }));

    let err = app.service.subscribe(viewer, 999, None).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn ingredient_search_is_prefix_and_case_insensitive() {
    let app = setup().await;
    app.ingredient("eggs", "шт").await;
    app.ingredient("pepper", "g").await;
    app.ingredient("Яблоко", "шт").await;

    let found = app.service.search_ingredients("egg").await.unwrap();
    let names: Vec<_> = found.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["eggs"]);

    assert!(app.service.search_ingredients("").await.unwrap().is_empty());
    assert!(app.service.search_ingredients("   ").await.unwrap().is_empty());

    let found = app.service.search_ingredients("EG").await.unwrap();
    assert_eq!(found.len(), 1);

    let found = app.service.search_ingredients("ябл").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Яблоко");

    // LIKE wildcards in the query are literal.
    assert!(app.service.search_ingredients("%").await.unwrap().is_empty());
}

#[tokio::test]
async fn ingredient_search_is_capped() {
    let app = setup().await;
    let items = (0..15)
        .map(|i| NewIngredient {
            name: format!("salt {i:02}"),
            measurement_unit: "g".into(),
        })
        .collect();
    app.service.import_ingredients(items).await.unwrap();

    let found = app.service.search_ingredients("salt").await.unwrap();
    assert_eq!(found.len(), 10);
    assert_eq!(found[0].name, "salt 00");
}

#[tokio::test]
async fn import_skips_existing_pairs() {
    let app = setup().await;
    let batch = || {
        vec![
            NewIngredient {
                name: "sugar".into(),
                measurement_unit: "g".into(),
            },
            NewIngredient {
                name: " sugar ".into(),
                measurement_unit: "kg".into(),
            },
            NewIngredient {
                name: "".into(),
                measurement_unit: "g".into(),
            },
        ]
    };

    let first = app.service.import_ingredients(batch()).await.unwrap();
    assert_eq!(first.total, 3);
    assert_eq!(first.inserted, 2);

    let second = app.service.import_ingredients(batch()).await.unwrap();
    assert_eq!(second.inserted, 0);
    assert_eq!(app.service.search_ingredients("sugar").await.unwrap().len(), 2);
}

#[tokio::test]
async fn registration_rejects_duplicates() {
    let app = setup().await;
    app.user("chef").await;

    let err = app
        .service
        .register_user(NewUser {
            email: "chef@example.com".into(),
            username: "other".into(),
            first_name: "A".into(),
            last_name: "B".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::UserExists { field: "email", .. }));

    let err = app
        .service
        .register_user(NewUser {
            email: "new@example.com".into(),
            username: "chef".into(),
            first_name: "A".into(),
            last_name: "B".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::UserExists { field: "username", .. }));
}

#[tokio::test]
async fn avatar_set_and_remove() {
    let app = setup().await;
    let user = app.user("chef").await;
    let viewer = Principal::User(user.id);

    let stored = app.service.set_avatar(viewer, PNG.to_string()).await.unwrap();
    assert_eq!(stored, PNG);
    assert_eq!(app.service.me(viewer).await.unwrap().avatar.as_deref(), Some(PNG));

    let err = app
        .service
        .set_avatar(viewer, "not an image".into())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));

    app.service.remove_avatar(viewer).await.unwrap();
    assert!(app.service.me(viewer).await.unwrap().avatar.is_none());

    let err = app
        .service
        .set_avatar(Principal::Anonymous, PNG.to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Unauthorized));
}

#[tokio::test]
async fn recipe_list_filters_and_pages() {
    let app = setup().await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    let eggs = app.ingredient("eggs", "шт").await;
    let mut ids = Vec::new();
    for i in 0..4 {
        let r = app.recipe(&alice, &format!("Alice {i}"), &[(&eggs, 1)]).await;
        ids.push(r.id);
    }
    app.recipe(&bob, "Bob 0", &[(&eggs, 1)]).await;
    let viewer = Principal::User(bob.id);
    app.service
        .add_relation(viewer, RelationKind::Favorite, ids[1])
        .await
        .unwrap();

    let all = app
        .service
        .list_recipes(Principal::Anonymous, RecipeQuery::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(all.total, 5);
    assert_eq!(all.items[0].name, "Bob 0");

    let page = app
        .service
        .list_recipes(
            Principal::Anonymous,
            RecipeQuery {
                author: Some(alice.id),
                ..Default::default()
            },
            PageRequest { page: 2, limit: 3 },
        )
        .await
        .unwrap();
    assert_eq!(page.total, 4);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "Alice 0");
    assert!(!page.has_next());
    assert!(page.has_previous());

    let favs = app
        .service
        .list_recipes(
            viewer,
            RecipeQuery {
                is_favorited: true,
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(favs.total, 1);
    assert_eq!(favs.items[0].id, ids[1]);
    assert!(favs.items[0].is_favorited);

    // The flag means nothing without a user.
    let anon = app
        .service
        .list_recipes(
            Principal::Anonymous,
            RecipeQuery {
                is_favorited: true,
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(anon.total, 5);

    let shortcut = app
        .service
        .list_favorites(viewer, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(shortcut.total, 1);
}

#[tokio::test]
async fn share_link_uses_public_base_url() {
    let app = setup().await;
    let author = app.user("chef").await;
    let eggs = app.ingredient("eggs", "шт").await;
    let recipe = app.recipe(&author, "Omelette", &[(&eggs, 3)]).await;

    let link = app
        .service
        .share_link(Principal::Anonymous, recipe.id)
        .await
        .unwrap();
    assert_eq!(link.url, format!("http://localhost:8000/recipes/{}/", recipe.id));
    assert_eq!(link.recipe_name, "Omelette");
}

#[tokio::test]
async fn deleting_a_recipe_empties_relations() {
    let app = setup().await;
    let author = app.user("chef").await;
    let buyer = app.user("buyer").await;
    let eggs = app.ingredient("eggs", "шт").await;
    let recipe = app.recipe(&author, "Omelette", &[(&eggs, 3)]).await;
    let viewer = Principal::User(buyer.id);
    app.service
        .add_relation(viewer, RelationKind::ShoppingCart, recipe.id)
        .await
        .unwrap();

    app.service
        .delete_recipe(Principal::User(author.id), recipe.id)
        .await
        .unwrap();

    let err = app.service.shopping_list(viewer).await.unwrap_err();
    assert!(matches!(err, DomainError::EmptyCart));
}
