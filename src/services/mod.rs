pub mod auth_service;
pub mod cart_service;
pub mod catalog_service;
pub mod newsletter_service;
pub mod order_service;
pub mod payment_service;
pub mod seed_service;
pub mod user_service;

pub use auth_service::*;
pub use cart_service::CartService;
pub use catalog_service::*;
pub use newsletter_service::*;
pub use order_service::*;
pub use payment_service::*;
pub use seed_service::*;
pub use user_service::UserService;
