use crate::middlewares::current_user_id;
use crate::models::*;
use crate::services::PaymentService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/payment/{cart_id}/check-status",
    tag = "payment",
    params(
        ("cart_id" = i32, Path, description = "Cart id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Whether the cart has been converted", body = CartStatusResponse)
    )
)]
pub async fn check_status(
    payment_service: web::Data<PaymentService>,
    req: HttpRequest,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let user_id = match current_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match payment_service
        .check_cart_status(user_id, path.into_inner())
        .await
    {
        Ok(status) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": status
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/payment/create-checkout-session",
    tag = "payment",
    request_body = CreateCheckoutSessionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Hosted checkout url", body = CheckoutSessionResponse),
        (status = 400, description = "Empty locker or missing sku_id"),
        (status = 404, description = "SKU not found"),
        (status = 502, description = "Payment provider unavailable")
    )
)]
pub async fn create_checkout_session(
    payment_service: web::Data<PaymentService>,
    req: HttpRequest,
    request: web::Json<CreateCheckoutSessionRequest>,
) -> Result<HttpResponse> {
    let user_id = match current_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match payment_service
        .create_checkout_session(user_id, request.into_inner())
        .await
    {
        Ok(session) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": session
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/payment/process-esewa",
    tag = "payment",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Signed eSewa form fields", body = EsewaPaymentResponse),
        (status = 400, description = "Empty locker")
    )
)]
pub async fn process_esewa(
    payment_service: web::Data<PaymentService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = match current_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match payment_service.process_esewa(user_id).await {
        Ok(form) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": form
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/payment/verify-payment",
    tag = "payment",
    request_body = VerifyPaymentRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Order created or already processed", body = VerifyPaymentResponse),
        (status = 400, description = "Missing session id or payment not completed")
    )
)]
pub async fn verify_payment(
    payment_service: web::Data<PaymentService>,
    req: HttpRequest,
    request: web::Json<VerifyPaymentRequest>,
) -> Result<HttpResponse> {
    let user_id = match current_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match payment_service
        .verify_payment(user_id, request.into_inner())
        .await
    {
        Ok(outcome) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": outcome
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/payment/verify-esewa",
    tag = "payment",
    request_body = VerifyEsewaRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Order created or already processed", body = VerifyPaymentResponse),
        (status = 400, description = "Bad signature or payment not completed")
    )
)]
pub async fn verify_esewa(
    payment_service: web::Data<PaymentService>,
    req: HttpRequest,
    request: web::Json<VerifyEsewaRequest>,
) -> Result<HttpResponse> {
    let user_id = match current_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match payment_service
        .verify_esewa(user_id, request.into_inner())
        .await
    {
        Ok(outcome) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": outcome
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn payment_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payment")
            .route("/{cart_id}/check-status", web::get().to(check_status))
            .route(
                "/create-checkout-session",
                web::post().to(create_checkout_session),
            )
            .route("/process-esewa", web::post().to(process_esewa))
            .route("/verify-payment", web::post().to(verify_payment))
            .route("/verify-esewa", web::post().to(verify_esewa)),
    );
}
