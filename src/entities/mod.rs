pub mod cart_items;
pub mod carts;
pub mod categories;
pub mod newsletters;
pub mod order_items;
pub mod orders;
pub mod product_skus;
pub mod products;
pub mod profiles;
pub mod users;

pub use cart_items as cart_item_entity;
pub use carts as cart_entity;
pub use categories as category_entity;
pub use newsletters as newsletter_entity;
pub use order_items as order_item_entity;
pub use orders as order_entity;
pub use product_skus as product_sku_entity;
pub use products as product_entity;
pub use profiles as profile_entity;
pub use users as user_entity;

pub use orders::{OrderStatus, PaymentProvider};
pub use products::JerseyType;
pub use profiles::Tier;
