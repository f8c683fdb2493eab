#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use common::{bearer, register, send, setup};
use serde_json::json;

#[actix_web::test]
async fn test_register_creates_bronze_profile() {
    let ctx = setup().await;
    let app = init_app!(ctx);
    let token = register(&app, "newfan").await;

    let req = TestRequest::get()
        .uri("/api/v1/me")
        .insert_header(bearer(&token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "newfan");
    assert_eq!(body["data"]["email"], "newfan@example.com");
    assert_eq!(body["data"]["profile"]["tier"], "Bronze");
    assert_eq!(body["data"]["profile"]["points"], 0);
}

#[actix_web::test]
async fn test_register_rejects_bad_input() {
    let ctx = setup().await;
    let app = init_app!(ctx);
    register(&app, "taken").await;

    let cases = [
        json!({
            "username": "taken",
            "email": "other@example.com",
            "password": "locker-room-9",
            "re_password": "locker-room-9",
        }),
        json!({
            "username": "mismatch",
            "email": "mismatch@example.com",
            "password": "locker-room-9",
            "re_password": "locker-room-8",
        }),
        json!({
            "username": "numeric",
            "email": "numeric@example.com",
            "password": "12345678901",
            "re_password": "12345678901",
        }),
        json!({
            "username": "bademail",
            "email": "not-an-email",
            "password": "locker-room-9",
            "re_password": "locker-room-9",
        }),
    ];
    for payload in cases {
        let req = TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(payload)
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}

#[actix_web::test]
async fn test_login_and_refresh() {
    let ctx = setup().await;
    let app = init_app!(ctx);
    register(&app, "returning").await;

    let req = TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "username": "returning", "password": "wrong-password" }))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::UNAUTHORIZED);

    let req = TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "username": "returning", "password": "locker-room-9" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let access = body["data"]["access_token"].as_str().unwrap().to_string();
    let refresh = body["data"]["refresh_token"].as_str().unwrap().to_string();

    // an access token cannot be used to refresh
    let req = TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .insert_header(bearer(&access))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::UNAUTHORIZED);

    let req = TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .insert_header(bearer(&refresh))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let renewed = body["data"]["access_token"].as_str().unwrap();

    let req = TestRequest::get()
        .uri("/api/v1/me")
        .insert_header(bearer(renewed))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::OK);
}

#[actix_web::test]
async fn test_update_me_saves_shipping_details() {
    let ctx = setup().await;
    let app = init_app!(ctx);
    let token = register(&app, "mover").await;

    let req = TestRequest::patch()
        .uri("/api/v1/me")
        .insert_header(bearer(&token))
        .set_json(json!({ "phone_number": "abc" }))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::BAD_REQUEST);

    let req = TestRequest::patch()
        .uri("/api/v1/me")
        .insert_header(bearer(&token))
        .set_json(json!({
            "phone_number": "+9779800000000",
            "shipping_address": " Thamel 12 ",
            "city": "Kathmandu",
            "zip_code": "44600",
        }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["phone_number"], "+9779800000000");
    assert_eq!(body["data"]["profile"]["shipping_address"], "Thamel 12");
    assert_eq!(body["data"]["profile"]["city"], "Kathmandu");
}

#[actix_web::test]
async fn test_protected_routes_reject_anonymous_callers() {
    let ctx = setup().await;
    let app = init_app!(ctx);

    let requests = vec![
        TestRequest::get().uri("/api/v1/cart").to_request(),
        TestRequest::get().uri("/api/v1/me").to_request(),
        TestRequest::get().uri("/api/v1/orders").to_request(),
        TestRequest::post()
            .uri("/api/v1/payment/verify-payment")
            .set_json(json!({ "session_id": "cs_test_1" }))
            .to_request(),
        TestRequest::get()
            .uri("/api/v1/cart_items")
            .insert_header(("Authorization", "Bearer not-a-jwt"))
            .to_request(),
    ];
    for req in requests {
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

#[actix_web::test]
async fn test_newsletter_is_public_and_unique() {
    let ctx = setup().await;
    let app = init_app!(ctx);

    let subscribe = |email: &str| {
        TestRequest::post()
            .uri("/api/v1/newsletter")
            .set_json(json!({ "email": email }))
            .to_request()
    };

    let (status, body) = send(&app, subscribe("Fan@Example.com")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["email"], "fan@example.com");

    let (status, body) = send(&app, subscribe("fan@example.com ")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "This email is already subscribed");

    let (status, _) = send(&app, subscribe("nobody")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_catalog_is_public_and_filterable() {
    let ctx = setup().await;
    let app = init_app!(ctx);

    let list = |query: &str| {
        TestRequest::get()
            .uri(&format!("/api/v1/products{query}"))
            .to_request()
    };

    let (status, body) = send(&app, list("")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 6);
    assert_eq!(body["data"]["page_size"], 9);

    let (_, body) = send(&app, list("?category=club-teams")).await;
    assert_eq!(body["data"]["total"], 3);
    for product in body["data"]["data"].as_array().unwrap() {
        assert_eq!(product["category_name"], "Club Teams");
    }

    let (_, body) = send(&app, list("?team=man%20city")).await;
    assert_eq!(body["data"]["total"], 1);
    let product = &body["data"]["data"][0];
    assert_eq!(product["team"], "Man City");
    assert_eq!(
        product["main_image"],
        "http://127.0.0.1:8000/media/products/h.png"
    );
    assert_eq!(product["skus"][0]["price"], 11000);

    let (_, body) = send(&app, list("?category=no-such-category")).await;
    assert_eq!(body["data"]["total"], 0);

    let (_, body) = send(&app, list("?page=2&page_size=4")).await;
    assert_eq!(body["data"]["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["total_pages"], 2);

    let id = product["id"].as_i64().unwrap();
    let (status, body) = send(&app, list(&format!("/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Man City 24/25 (Haaland)");

    let (status, _) = send(&app, list("/9999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let req = TestRequest::post()
        .uri("/api/v1/products")
        .set_json(json!({}))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::UNAUTHORIZED);
}
