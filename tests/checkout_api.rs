#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use base64::{Engine, engine::general_purpose::STANDARD};
use common::{bearer, register, send, setup};
use jersey_arena::config::EsewaConfig;
use jersey_arena::entities::product_sku_entity as skus;
use jersey_arena::external::{EsewaService, SIGNED_FIELD_NAMES, canonical_message};
use jersey_arena::services::LOCKER_CHECKOUT_NAME;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde_json::json;

async fn sku_id(pool: &DatabaseConnection, code: &str) -> i32 {
    skus::Entity::find()
        .filter(skus::Column::SkuCode.eq(code))
        .one(pool)
        .await
        .unwrap()
        .unwrap()
        .id
}

fn add_item(token: &str, sku_id: i32, body: serde_json::Value) -> actix_http::Request {
    let mut payload = body;
    payload["sku_id"] = json!(sku_id);
    TestRequest::post()
        .uri("/api/v1/cart/add_item")
        .insert_header(bearer(token))
        .set_json(payload)
        .to_request()
}

fn verify(token: &str, session_id: &str) -> actix_http::Request {
    TestRequest::post()
        .uri("/api/v1/payment/verify-payment")
        .insert_header(bearer(token))
        .set_json(json!({ "session_id": session_id }))
        .to_request()
}

#[actix_web::test]
async fn test_empty_locker_cannot_check_out() {
    let ctx = setup().await;
    let app = init_app!(ctx);
    let token = register(&app, "emptyhanded").await;

    let req = TestRequest::post()
        .uri("/api/v1/payment/create-checkout-session")
        .insert_header(bearer(&token))
        .set_json(json!({}))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Locker is empty");

    let req = TestRequest::post()
        .uri("/api/v1/payment/process-esewa")
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::BAD_REQUEST);
    assert!(ctx.gateway.requests.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn test_repeated_verification_creates_one_order() {
    let ctx = setup().await;
    let app = init_app!(ctx);
    let token = register(&app, "buyer").await;
    let arg = sku_id(&ctx.pool, "ARG-10-M").await;
    let mci = sku_id(&ctx.pool, "MCI-9-L").await;

    send(&app, add_item(&token, arg, json!({ "custom_name": "messi", "custom_number": 10 }))).await;
    send(&app, add_item(&token, mci, json!({ "quantity": 2 }))).await;

    let req = TestRequest::post()
        .uri("/api/v1/payment/create-checkout-session")
        .insert_header(bearer(&token))
        .set_json(json!({ "is_instant": false }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let session_id = ctx.gateway.last_session_id();
    assert_eq!(
        body["data"]["url"],
        format!("https://checkout.test/{session_id}")
    );

    // 13500 + 2 * 11000 + 1000 shipping
    let request = ctx.gateway.last_request();
    assert_eq!(request.amount, 36500);
    assert_eq!(request.line_item_name, LOCKER_CHECKOUT_NAME);
    assert_eq!(request.metadata["is_instant"], "false");
    assert!(request.metadata.contains_key("cart_id"));
    assert!(request.success_url.starts_with("http://localhost:5173/success"));

    ctx.gateway.mark_paid(&session_id);

    let (status, first) = send(&app, verify(&token, &session_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["data"]["status"], "success");
    let order_id = first["data"]["order_id"].as_i64().unwrap();

    let (status, second) = send(&app, verify(&token, &session_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["data"]["message"], "Order already processed");
    assert_eq!(second["data"]["order_id"], order_id);

    let req = TestRequest::get()
        .uri("/api/v1/orders")
        .insert_header(bearer(&token))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["data"][0]["total_amount"], 36500);
    assert_eq!(body["data"]["data"][0]["payment_provider"], "stripe");

    let req = TestRequest::get()
        .uri(&format!("/api/v1/orders/{order_id}"))
        .insert_header(bearer(&token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["price_at_purchase"], 13500);
    assert_eq!(items[0]["custom_name"], "MESSI");
    assert_eq!(items[1]["quantity"], 2);
    assert_eq!(items[1]["product_name"], "Man City 24/25 (Haaland)");

    let req = TestRequest::get()
        .uri("/api/v1/cart")
        .insert_header(bearer(&token))
        .to_request();
    let (_, cart) = send(&app, req).await;
    assert_eq!(cart["data"]["items"].as_array().unwrap().len(), 0);
    let cart_id = cart["data"]["id"].as_i64().unwrap();

    let req = TestRequest::get()
        .uri(&format!("/api/v1/payment/{cart_id}/check-status"))
        .insert_header(bearer(&token))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["data"]["status"], "completed");

    let req = TestRequest::get()
        .uri("/api/v1/me")
        .insert_header(bearer(&token))
        .to_request();
    let (_, me) = send(&app, req).await;
    assert_eq!(me["data"]["profile"]["points"], 365);
    assert_eq!(me["data"]["profile"]["tier"], "Bronze");
}

#[actix_web::test]
async fn test_unpaid_session_is_rejected() {
    let ctx = setup().await;
    let app = init_app!(ctx);
    let token = register(&app, "hesitant").await;
    let por = sku_id(&ctx.pool, "POR-7-L").await;
    send(&app, add_item(&token, por, json!({}))).await;

    let req = TestRequest::post()
        .uri("/api/v1/payment/create-checkout-session")
        .insert_header(bearer(&token))
        .set_json(json!({}))
        .to_request();
    send(&app, req).await;
    let session_id = ctx.gateway.last_session_id();

    let (status, body) = send(&app, verify(&token, &session_id)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Payment failed");

    let (status, _) = send(&app, verify(&token, "")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = TestRequest::get()
        .uri("/api/v1/cart")
        .insert_header(bearer(&token))
        .to_request();
    let (_, cart) = send(&app, req).await;
    assert_eq!(cart["data"]["items"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn test_session_of_another_user_is_forbidden() {
    let ctx = setup().await;
    let app = init_app!(ctx);
    let owner = register(&app, "payer").await;
    let other = register(&app, "freerider").await;
    let rma = sku_id(&ctx.pool, "RMA-9-M").await;
    send(&app, add_item(&owner, rma, json!({}))).await;

    let req = TestRequest::post()
        .uri("/api/v1/payment/create-checkout-session")
        .insert_header(bearer(&owner))
        .set_json(json!({}))
        .to_request();
    send(&app, req).await;
    let session_id = ctx.gateway.last_session_id();
    ctx.gateway.mark_paid(&session_id);

    let (status, _) = send(&app, verify(&other, &session_id)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, verify(&owner, &session_id)).await;
    assert_eq!(status, StatusCode::OK);

    // once processed, the session still reveals nothing to other users
    let (status, body) = send(&app, verify(&other, &session_id)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["data"]["order_id"].is_null());
}

#[actix_web::test]
async fn test_instant_purchase_leaves_locker_alone() {
    let ctx = setup().await;
    let app = init_app!(ctx);
    let token = register(&app, "impulse").await;
    let kc = sku_id(&ctx.pool, "KC-15-L").await;
    let mia = sku_id(&ctx.pool, "MIA-10-S").await;
    send(&app, add_item(&token, mia, json!({}))).await;

    let instant = |payload: serde_json::Value| {
        TestRequest::post()
            .uri("/api/v1/payment/create-checkout-session")
            .insert_header(bearer(&token))
            .set_json(payload)
            .to_request()
    };

    let (status, _) = send(&app, instant(json!({ "is_instant": true }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, instant(json!({ "is_instant": true, "sku_id": 9999 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) =
        send(&app, instant(json!({ "is_instant": true, "sku_id": kc, "qty": 2 }))).await;
    assert_eq!(status, StatusCode::OK);
    let request = ctx.gateway.last_request();
    assert_eq!(request.amount, 2 * 17000 + 1000);
    assert_eq!(
        request.line_item_name,
        "Instant Purchase: Kansas City Chiefs (Mahomes)"
    );
    assert_eq!(request.metadata["sku_id"], kc.to_string());
    assert_eq!(request.metadata["qty"], "2");

    let session_id = ctx.gateway.last_session_id();
    ctx.gateway.mark_paid(&session_id);
    let (status, body) = send(&app, verify(&token, &session_id)).await;
    assert_eq!(status, StatusCode::OK);
    let order_id = body["data"]["order_id"].as_i64().unwrap();

    let req = TestRequest::get()
        .uri(&format!("/api/v1/orders/{order_id}"))
        .insert_header(bearer(&token))
        .to_request();
    let (_, order) = send(&app, req).await;
    let items = order["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 2);
    assert_eq!(items[0]["price_at_purchase"], 17000);

    let req = TestRequest::get()
        .uri("/api/v1/cart")
        .insert_header(bearer(&token))
        .to_request();
    let (_, cart) = send(&app, req).await;
    assert_eq!(cart["data"]["items"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn test_esewa_round_trip() {
    let ctx = setup().await;
    let app = init_app!(ctx);
    let token = register(&app, "kathmandu").await;
    let arg = sku_id(&ctx.pool, "ARG-10-M").await;
    send(&app, add_item(&token, arg, json!({}))).await;

    let req = TestRequest::post()
        .uri("/api/v1/payment/process-esewa")
        .insert_header(bearer(&token))
        .to_request();
    let (status, form) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let form = &form["data"];
    assert_eq!(form["total_amount"], "130.00");
    assert_eq!(form["product_code"], "EPAYTEST");
    assert_eq!(form["signed_field_names"], SIGNED_FIELD_NAMES);

    let esewa = EsewaService::new(EsewaConfig::default());
    let uuid = form["transaction_uuid"].as_str().unwrap();
    assert_eq!(
        form["signature"],
        esewa.sign_payment("130.00", uuid).unwrap()
    );

    let callback_names = "transaction_code,status,total_amount,transaction_uuid,product_code,signed_field_names";
    let message = canonical_message([
        ("transaction_code", "000AWEO"),
        ("status", "COMPLETE"),
        ("total_amount", "130.00"),
        ("transaction_uuid", uuid),
        ("product_code", "EPAYTEST"),
        ("signed_field_names", callback_names),
    ]);
    let callback = json!({
        "transaction_code": "000AWEO",
        "status": "COMPLETE",
        "total_amount": "130.00",
        "transaction_uuid": uuid,
        "product_code": "EPAYTEST",
        "signed_field_names": callback_names,
        "signature": esewa.sign(&message).unwrap(),
    });
    let data = STANDARD.encode(callback.to_string());

    let verify_esewa = |data: &str| {
        TestRequest::post()
            .uri("/api/v1/payment/verify-esewa")
            .insert_header(bearer(&token))
            .set_json(json!({ "data": data }))
            .to_request()
    };

    let (status, body) = send(&app, verify_esewa(&data)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "success");
    let order_id = body["data"]["order_id"].as_i64().unwrap();

    let (status, body) = send(&app, verify_esewa(&data)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "Order already processed");
    assert_eq!(body["data"]["order_id"], order_id);

    let mut forged = callback.clone();
    forged["total_amount"] = json!("1.00");
    let (status, _) = send(&app, verify_esewa(&STANDARD.encode(forged.to_string()))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = TestRequest::get()
        .uri(&format!("/api/v1/orders/{order_id}"))
        .insert_header(bearer(&token))
        .to_request();
    let (_, order) = send(&app, req).await;
    assert_eq!(order["data"]["total_amount"], 13000);
    assert_eq!(order["data"]["payment_provider"], "esewa");
    assert_eq!(order["data"]["transaction_id"], uuid);
}

fn signed_callback(uuid: &str, total_amount: &str) -> String {
    let names = "transaction_code,status,total_amount,transaction_uuid,product_code,signed_field_names";
    let message = canonical_message([
        ("transaction_code", "000BXQ1"),
        ("status", "COMPLETE"),
        ("total_amount", total_amount),
        ("transaction_uuid", uuid),
        ("product_code", "EPAYTEST"),
        ("signed_field_names", names),
    ]);
    let signature = EsewaService::new(EsewaConfig::default())
        .sign(&message)
        .unwrap();
    let callback = json!({
        "transaction_code": "000BXQ1",
        "status": "COMPLETE",
        "total_amount": total_amount,
        "transaction_uuid": uuid,
        "product_code": "EPAYTEST",
        "signed_field_names": names,
        "signature": signature,
    });
    STANDARD.encode(callback.to_string())
}

fn verify_esewa(token: &str, data: &str) -> actix_http::Request {
    TestRequest::post()
        .uri("/api/v1/payment/verify-esewa")
        .insert_header(bearer(token))
        .set_json(json!({ "data": data }))
        .to_request()
}

#[actix_web::test]
async fn test_esewa_form_signature_does_not_prove_payment() {
    let ctx = setup().await;
    let app = init_app!(ctx);
    let token = register(&app, "replayer").await;
    let arg = sku_id(&ctx.pool, "ARG-10-M").await;
    send(&app, add_item(&token, arg, json!({}))).await;

    let req = TestRequest::post()
        .uri("/api/v1/payment/process-esewa")
        .insert_header(bearer(&token))
        .to_request();
    let (_, form) = send(&app, req).await;
    let form = &form["data"];

    let replayed = json!({
        "status": "COMPLETE",
        "total_amount": form["total_amount"],
        "transaction_uuid": form["transaction_uuid"],
        "product_code": form["product_code"],
        "signed_field_names": form["signed_field_names"],
        "signature": form["signature"],
    });
    let (status, body) =
        send(&app, verify_esewa(&token, &STANDARD.encode(replayed.to_string()))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid eSewa signature");

    let req = TestRequest::get()
        .uri("/api/v1/orders")
        .insert_header(bearer(&token))
        .to_request();
    let (_, orders) = send(&app, req).await;
    assert_eq!(orders["data"]["total"], 0);

    let req = TestRequest::get()
        .uri("/api/v1/cart")
        .insert_header(bearer(&token))
        .to_request();
    let (_, cart) = send(&app, req).await;
    assert_eq!(cart["data"]["items"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn test_esewa_callback_of_another_user_is_forbidden() {
    let ctx = setup().await;
    let app = init_app!(ctx);
    let owner = register(&app, "pokhara").await;
    let other = register(&app, "lalitpur").await;
    let mci = sku_id(&ctx.pool, "MCI-9-L").await;
    send(&app, add_item(&owner, mci, json!({}))).await;

    let req = TestRequest::post()
        .uri("/api/v1/payment/process-esewa")
        .insert_header(bearer(&owner))
        .to_request();
    let (_, form) = send(&app, req).await;
    let uuid = form["data"]["transaction_uuid"].as_str().unwrap().to_string();
    let data = signed_callback(&uuid, "120.00");

    let (status, _) = send(&app, verify_esewa(&other, &data)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, verify_esewa(&owner, &data)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "success");

    let (status, body) = send(&app, verify_esewa(&other, &data)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["data"]["order_id"].is_null());
}

#[actix_web::test]
async fn test_locker_changed_after_payment_is_not_ordered() {
    let ctx = setup().await;
    let app = init_app!(ctx);
    let token = register(&app, "sneaky").await;
    let arg = sku_id(&ctx.pool, "ARG-10-M").await;
    send(&app, add_item(&token, arg, json!({}))).await;

    let req = TestRequest::post()
        .uri("/api/v1/payment/create-checkout-session")
        .insert_header(bearer(&token))
        .set_json(json!({}))
        .to_request();
    send(&app, req).await;
    let session_id = ctx.gateway.last_session_id();
    assert_eq!(ctx.gateway.last_request().amount, 13000);
    ctx.gateway.mark_paid(&session_id);

    send(&app, add_item(&token, arg, json!({ "quantity": 9 }))).await;

    let (status, body) = send(&app, verify(&token, &session_id)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");

    let req = TestRequest::get()
        .uri("/api/v1/orders")
        .insert_header(bearer(&token))
        .to_request();
    let (_, orders) = send(&app, req).await;
    assert_eq!(orders["data"]["total"], 0);

    let req = TestRequest::get()
        .uri("/api/v1/cart_items")
        .insert_header(bearer(&token))
        .to_request();
    let (_, items) = send(&app, req).await;
    assert_eq!(items["data"][0]["quantity"], 10);
    let item_id = items["data"][0]["id"].as_i64().unwrap();

    let req = TestRequest::patch()
        .uri(&format!("/api/v1/cart_items/{item_id}"))
        .insert_header(bearer(&token))
        .set_json(json!({ "quantity": 1 }))
        .to_request();
    send(&app, req).await;

    let (status, body) = send(&app, verify(&token, &session_id)).await;
    assert_eq!(status, StatusCode::OK);
    let order_id = body["data"]["order_id"].as_i64().unwrap();

    let req = TestRequest::get()
        .uri(&format!("/api/v1/orders/{order_id}"))
        .insert_header(bearer(&token))
        .to_request();
    let (_, order) = send(&app, req).await;
    assert_eq!(order["data"]["total_amount"], 13000);
    assert_eq!(order["data"]["items"][0]["quantity"], 1);
}
