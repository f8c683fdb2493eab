use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{JerseyType, OrderStatus, PaymentProvider, Tier};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::user::get_me,
        handlers::user::update_me,
        handlers::product::list_products,
        handlers::product::get_product,
        handlers::cart::get_cart,
        handlers::cart::add_item,
        handlers::cart::update_shipping,
        handlers::cart_item::list_cart_items,
        handlers::cart_item::update_cart_item,
        handlers::cart_item::delete_cart_item,
        handlers::payment::check_status,
        handlers::payment::create_checkout_session,
        handlers::payment::process_esewa,
        handlers::payment::verify_payment,
        handlers::payment::verify_esewa,
        handlers::order::get_orders,
        handlers::order::get_order,
        handlers::newsletter::subscribe,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            MeResponse,
            ProfileResponse,
            UpdateMeRequest,
            Tier,
            ProductResponse,
            SkuResponse,
            JerseyType,
            CartResponse,
            CartItemResponse,
            AddItemRequest,
            UpdateShippingRequest,
            UpdateShippingResponse,
            UpdateCartItemRequest,
            MessageResponse,
            CreateCheckoutSessionRequest,
            CheckoutSessionResponse,
            EsewaPaymentResponse,
            VerifyPaymentRequest,
            VerifyEsewaRequest,
            VerifyPaymentResponse,
            CartStatusResponse,
            OrderResponse,
            OrderItemResponse,
            OrderStatus,
            PaymentProvider,
            NewsletterRequest,
            NewsletterResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration and tokens"),
        (name = "user", description = "Current user and loyalty profile"),
        (name = "products", description = "Jersey catalog"),
        (name = "cart", description = "Locker (cart) and its lines"),
        (name = "payment", description = "Hosted checkout and eSewa"),
        (name = "orders", description = "Order history"),
        (name = "newsletter", description = "Newsletter signup"),
    ),
    info(
        title = "Jersey Arena API",
        version = "1.0.0",
        description = "Jersey Arena storefront REST API"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_checkout_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/payment/verify-payment"));
        assert!(paths.contains_key("/cart/add_item"));
        assert!(paths.contains_key("/products/{id}"));
    }
}
