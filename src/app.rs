use crate::config::Config;
use crate::database::DbPool;
use crate::external::{CheckoutGateway, EsewaService};
use crate::handlers;
use crate::services::*;
use crate::swagger::swagger_config;
use crate::utils::JwtService;
use actix_web::web;
use std::sync::Arc;

/// Shared services handed to every worker.
#[derive(Clone)]
pub struct AppServices {
    pub jwt_service: JwtService,
    pub auth: AuthService,
    pub user: UserService,
    pub catalog: CatalogService,
    pub cart: CartService,
    pub payment: PaymentService,
    pub order: OrderService,
    pub newsletter: NewsletterService,
}

impl AppServices {
    pub fn new(pool: DbPool, config: &Config, gateway: Arc<dyn CheckoutGateway>) -> Self {
        let jwt_service = JwtService::new(
            &config.jwt.secret,
            config.jwt.access_token_expires_in,
            config.jwt.refresh_token_expires_in,
        );
        let esewa = EsewaService::new(config.esewa.clone());

        Self {
            auth: AuthService::new(pool.clone(), jwt_service.clone()),
            user: UserService::new(pool.clone()),
            catalog: CatalogService::new(pool.clone(), config.media.clone()),
            cart: CartService::new(pool.clone()),
            payment: PaymentService::new(
                pool.clone(),
                gateway,
                esewa,
                config.checkout.clone(),
                config.client.clone(),
            ),
            order: OrderService::new(pool.clone()),
            newsletter: NewsletterService::new(pool),
            jwt_service,
        }
    }

    /// Registers app data, API routes and the Swagger UI.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.auth.clone()))
            .app_data(web::Data::new(self.user.clone()))
            .app_data(web::Data::new(self.catalog.clone()))
            .app_data(web::Data::new(self.cart.clone()))
            .app_data(web::Data::new(self.payment.clone()))
            .app_data(web::Data::new(self.order.clone()))
            .app_data(web::Data::new(self.newsletter.clone()))
            .configure(swagger_config)
            .configure(handlers::api_config);
    }
}
