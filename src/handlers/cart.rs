use crate::middlewares::current_user_id;
use crate::models::*;
use crate::services::CartService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/cart",
    tag = "cart",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Caller's cart, created on first access", body = CartResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_cart(cart_service: web::Data<CartService>, req: HttpRequest) -> Result<HttpResponse> {
    let user_id = match current_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match cart_service.get_cart(user_id).await {
        Ok(cart) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": cart
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/cart/add_item",
    tag = "cart",
    request_body = AddItemRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Item added to locker", body = MessageResponse),
        (status = 400, description = "Invalid quantity or customization"),
        (status = 404, description = "SKU not found")
    )
)]
pub async fn add_item(
    cart_service: web::Data<CartService>,
    req: HttpRequest,
    request: web::Json<AddItemRequest>,
) -> Result<HttpResponse> {
    let user_id = match current_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match cart_service.add_item(user_id, request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/cart/{id}/update_shipping",
    tag = "cart",
    request_body = UpdateShippingRequest,
    params(
        ("id" = i32, Path, description = "Cart id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Shipping updated", body = UpdateShippingResponse),
        (status = 404, description = "Cart not found")
    )
)]
pub async fn update_shipping(
    cart_service: web::Data<CartService>,
    req: HttpRequest,
    path: web::Path<i32>,
    request: web::Json<UpdateShippingRequest>,
) -> Result<HttpResponse> {
    let user_id = match current_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match cart_service
        .update_shipping(user_id, path.into_inner(), request.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn cart_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/cart")
            .route("", web::get().to(get_cart))
            .route("/", web::get().to(get_cart))
            .route("/my_cart", web::get().to(get_cart))
            .route("/add_item", web::post().to(add_item))
            .route("/{id}/update_shipping", web::patch().to(update_shipping)),
    );
}
