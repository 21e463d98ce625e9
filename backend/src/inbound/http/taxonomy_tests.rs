//! Tests for tag and ingredient handlers.

use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::inbound::http::test_utils::TestContext;

async fn send(
    ctx: &TestContext,
    request: actix_test::TestRequest,
    auth: Option<&str>,
) -> (StatusCode, Value) {
    let app = actix_test::init_service(ctx.app()).await;
    let request = match auth {
        Some(auth) => request.insert_header((AUTHORIZATION, auth.to_owned())),
        None => request,
    };
    let response = actix_test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

async fn create(ctx: &TestContext, auth: &str, collection: &str, name: &str) -> i64 {
    let (status, body) = send(
        ctx,
        actix_test::TestRequest::post()
            .uri(&format!("/api/{collection}"))
            .set_json(json!({ "name": name })),
        Some(auth),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().expect("numeric id")
}

async fn create_recipe(ctx: &TestContext, auth: &str, payload: Value) {
    let (status, body) = send(
        ctx,
        actix_test::TestRequest::post()
            .uri("/api/recipes")
            .set_json(payload),
        Some(auth),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
}

fn names(body: &Value) -> Vec<&str> {
    body.as_array()
        .expect("list body")
        .iter()
        .filter_map(|item| item["name"].as_str())
        .collect()
}

#[rstest]
#[case("tags")]
#[case("ingredients")]
#[actix_web::test]
async fn listing_requires_authentication(#[case] collection: &str) {
    let ctx = TestContext::new();
    let (status, body) = send(
        &ctx,
        actix_test::TestRequest::get().uri(&format!("/api/{collection}")),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[rstest]
#[case("tags")]
#[case("ingredients")]
#[actix_web::test]
async fn listing_is_owner_scoped_and_name_descending(#[case] collection: &str) {
    let ctx = TestContext::new();
    let alice = ctx.login_as("alice@example.com").await;
    let bob = ctx.login_as("bob@example.com").await;
    create(&ctx, &alice, collection, "Apple").await;
    create(&ctx, &alice, collection, "Cherry").await;
    create(&ctx, &alice, collection, "Banana").await;
    create(&ctx, &bob, collection, "Apple").await;

    let (status, body) = send(
        &ctx,
        actix_test::TestRequest::get().uri(&format!("/api/{collection}")),
        Some(&alice),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Cherry", "Banana", "Apple"]);
}

#[actix_web::test]
async fn created_items_have_id_and_name_only() {
    let ctx = TestContext::new();
    let auth = ctx.login_as("cook@example.com").await;
    let (status, body) = send(
        &ctx,
        actix_test::TestRequest::post()
            .uri("/api/tags")
            .set_json(json!({ "name": "Dessert" })),
        Some(&auth),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let object = body.as_object().expect("object body");
    assert_eq!(object.len(), 2);
    assert_eq!(body["name"], "Dessert");
}

#[rstest]
#[case(json!({ "name": "" }), "blank")]
#[case(json!({ "name": "   " }), "blank")]
#[case(json!({}), "missing_field")]
#[actix_web::test]
async fn create_rejects_invalid_names(#[case] payload: Value, #[case] code: &str) {
    let ctx = TestContext::new();
    let auth = ctx.login_as("cook@example.com").await;
    let (status, body) = send(
        &ctx,
        actix_test::TestRequest::post()
            .uri("/api/ingredients")
            .set_json(payload),
        Some(&auth),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "name");
    assert_eq!(body["details"]["code"], code);
}

#[actix_web::test]
async fn duplicate_names_are_allowed() {
    let ctx = TestContext::new();
    let auth = ctx.login_as("cook@example.com").await;
    let first = create(&ctx, &auth, "tags", "Vegan").await;
    let second = create(&ctx, &auth, "tags", "Vegan").await;
    assert_ne!(first, second);
}

#[actix_web::test]
async fn assigned_only_lists_linked_ingredients_once() {
    let ctx = TestContext::new();
    let auth = ctx.login_as("cook@example.com").await;
    let eggs = create(&ctx, &auth, "ingredients", "Eggs").await;
    create(&ctx, &auth, "ingredients", "Cheese").await;
    for title in ["Omelette", "Pancakes"] {
        create_recipe(
            &ctx,
            &auth,
            json!({ "title": title, "time_minutes": 10, "price": "2.00", "ingredients": [eggs] }),
        )
        .await;
    }

    let (status, body) = send(
        &ctx,
        actix_test::TestRequest::get().uri("/api/ingredients?assigned_only=1"),
        Some(&auth),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Eggs"]);
}

#[actix_web::test]
async fn assigned_only_rejects_unknown_flags() {
    let ctx = TestContext::new();
    let auth = ctx.login_as("cook@example.com").await;
    let (status, body) = send(
        &ctx,
        actix_test::TestRequest::get().uri("/api/tags?assigned_only=maybe"),
        Some(&auth),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "assigned_only");
}

#[actix_web::test]
async fn items_of_other_users_are_not_found() {
    let ctx = TestContext::new();
    let alice = ctx.login_as("alice@example.com").await;
    let bob = ctx.login_as("bob@example.com").await;
    let id = create(&ctx, &alice, "tags", "Private").await;

    for request in [
        actix_test::TestRequest::get().uri(&format!("/api/tags/{id}")),
        actix_test::TestRequest::patch()
            .uri(&format!("/api/tags/{id}"))
            .set_json(json!({ "name": "Stolen" })),
        actix_test::TestRequest::delete().uri(&format!("/api/tags/{id}")),
    ] {
        let (status, body) = send(&ctx, request, Some(&bob)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "not_found");
    }
}

#[actix_web::test]
async fn tag_ids_are_not_ingredient_ids() {
    let ctx = TestContext::new();
    let auth = ctx.login_as("cook@example.com").await;
    let id = create(&ctx, &auth, "tags", "Quick").await;

    let (status, _) = send(
        &ctx,
        actix_test::TestRequest::get().uri(&format!("/api/ingredients/{id}")),
        Some(&auth),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn rename_and_delete_round_trip() {
    let ctx = TestContext::new();
    let auth = ctx.login_as("cook@example.com").await;
    let id = create(&ctx, &auth, "tags", "Quick").await;

    let (status, body) = send(
        &ctx,
        actix_test::TestRequest::put()
            .uri(&format!("/api/tags/{id}"))
            .set_json(json!({ "name": "Fast" })),
        Some(&auth),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": id, "name": "Fast" }));

    let (status, body) = send(
        &ctx,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/tags/{id}"))
            .set_json(json!({})),
        Some(&auth),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Fast");

    let (status, _) = send(
        &ctx,
        actix_test::TestRequest::delete().uri(&format!("/api/tags/{id}")),
        Some(&auth),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &ctx,
        actix_test::TestRequest::get().uri(&format!("/api/tags/{id}")),
        Some(&auth),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn put_requires_a_name() {
    let ctx = TestContext::new();
    let auth = ctx.login_as("cook@example.com").await;
    let id = create(&ctx, &auth, "ingredients", "Salt").await;

    let (status, body) = send(
        &ctx,
        actix_test::TestRequest::put()
            .uri(&format!("/api/ingredients/{id}"))
            .set_json(json!({})),
        Some(&auth),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["code"], "missing_field");
}

#[rstest]
#[case("/api/tags/abc")]
#[case("/api/ingredients/1.5")]
#[actix_web::test]
async fn non_numeric_ids_are_not_found(#[case] uri: &str) {
    let ctx = TestContext::new();
    let auth = ctx.login_as("cook@example.com").await;
    let (status, _) = send(&ctx, actix_test::TestRequest::get().uri(uri), Some(&auth)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn collection_rejects_delete() {
    let ctx = TestContext::new();
    let auth = ctx.login_as("cook@example.com").await;
    let (status, body) = send(
        &ctx,
        actix_test::TestRequest::delete().uri("/api/tags"),
        Some(&auth),
    )
    .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["code"], "method_not_allowed");
}
