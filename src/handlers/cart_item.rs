use crate::middlewares::current_user_id;
use crate::models::*;
use crate::services::CartService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/cart_items",
    tag = "cart",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Lines of the caller's cart", body = [CartItemResponse])
    )
)]
pub async fn list_cart_items(
    cart_service: web::Data<CartService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = match current_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match cart_service.list_items(user_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": items
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/cart_items/{id}",
    tag = "cart",
    request_body = UpdateCartItemRequest,
    params(
        ("id" = i32, Path, description = "Cart item id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Quantity updated", body = CartItemResponse),
        (status = 400, description = "Quantity below 1"),
        (status = 404, description = "Not a line of the caller's cart")
    )
)]
pub async fn update_cart_item(
    cart_service: web::Data<CartService>,
    req: HttpRequest,
    path: web::Path<i32>,
    request: web::Json<UpdateCartItemRequest>,
) -> Result<HttpResponse> {
    let user_id = match current_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match cart_service
        .update_item(user_id, path.into_inner(), request.into_inner())
        .await
    {
        Ok(item) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": item
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/cart_items/{id}",
    tag = "cart",
    params(
        ("id" = i32, Path, description = "Cart item id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Removed"),
        (status = 404, description = "Not a line of the caller's cart")
    )
)]
pub async fn delete_cart_item(
    cart_service: web::Data<CartService>,
    req: HttpRequest,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let user_id = match current_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match cart_service.delete_item(user_id, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn cart_item_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/cart_items")
            .route("", web::get().to(list_cart_items))
            .route("/", web::get().to(list_cart_items))
            .route("/{id}", web::patch().to(update_cart_item))
            .route("/{id}", web::delete().to(delete_cart_item)),
    );
}
