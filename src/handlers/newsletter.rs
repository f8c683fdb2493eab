use crate::models::*;
use crate::services::NewsletterService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/newsletter",
    tag = "newsletter",
    request_body = NewsletterRequest,
    responses(
        (status = 201, description = "Subscribed", body = NewsletterResponse),
        (status = 400, description = "Invalid or already subscribed address")
    )
)]
pub async fn subscribe(
    newsletter_service: web::Data<NewsletterService>,
    request: web::Json<NewsletterRequest>,
) -> Result<HttpResponse> {
    match newsletter_service.subscribe(request.into_inner()).await {
        Ok(subscription) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": subscription
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn newsletter_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/newsletter").route(web::post().to(subscribe)));
}
