use actix_web::{http::StatusCode, test::TestRequest};
use reseller_engine::db_types::UserId;
use serde_json::json;

use super::helpers::{private_text, TestShop};
use crate::replies::UNKNOWN_COMMAND;

#[actix_web::test]
async fn health_check() {
    let (shop, _) = TestShop::new().await;
    let (status, body) = shop.call(TestRequest::get().uri("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
}

#[actix_web::test]
async fn wrong_secret_is_refused_before_anything_happens() {
    let (shop, _) = TestShop::new().await;
    let shop = shop.with_secret("letmein");
    let update = private_text(UserId(100), "/start");

    let (status, body) = shop.post(&update, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("secret"), "{body}");

    let (status, _) = shop.post(&update, Some("letmeout")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(shop.transport.sent().is_empty());

    let (status, _) = shop.post(&update, Some("letmein")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shop.transport.texts_to(UserId(100).into()).len(), 1);
}

#[actix_web::test]
async fn malformed_updates_are_bad_requests() {
    let (shop, _) = TestShop::new().await;
    let req = TestRequest::post()
        .uri("/telegram/webhook")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"update_id\": ");
    let (status, _) = shop.call(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = shop.post(&json!({ "message": "hello" }), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn updates_without_anything_to_do_are_accepted() {
    let (shop, _) = TestShop::new().await;
    shop.send(json!({ "update_id": 1, "edited_message": { "message_id": 4 } })).await;
    let from_bot = json!({
        "update_id": 2,
        "message": {
            "message_id": 1,
            "from": { "id": 999, "is_bot": true, "first_name": "otherbot" },
            "chat": { "id": 999, "type": "private" },
            "text": "/products"
        }
    });
    shop.send(from_bot).await;
    assert!(shop.transport.sent().is_empty());
}

#[actix_web::test]
async fn failed_replies_do_not_fail_the_update() {
    let (shop, _) = TestShop::new().await;
    shop.transport.fail_chat(UserId(100).into());
    // Telegram retries anything that is not a 200, and that must not replay the command
    shop.send(private_text(UserId(100), "/hello")).await;
    shop.send(private_text(UserId(101), "/hello")).await;
    assert_eq!(shop.transport.texts_to(UserId(101).into()), vec![UNKNOWN_COMMAND.to_string()]);
}
