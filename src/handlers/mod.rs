pub mod auth;
pub mod cart;
pub mod cart_item;
pub mod newsletter;
pub mod order;
pub mod payment;
pub mod product;
pub mod user;

pub use auth::auth_config;
pub use cart::cart_config;
pub use cart_item::cart_item_config;
pub use newsletter::newsletter_config;
pub use order::order_config;
pub use payment::payment_config;
pub use product::product_config;
pub use user::user_config;

use actix_web::web;

/// Every `/api/v1` route.
pub fn api_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(auth_config)
            .configure(user_config)
            .configure(product_config)
            .configure(cart_config)
            .configure(cart_item_config)
            .configure(payment_config)
            .configure(order_config)
            .configure(newsletter_config),
    );
}
