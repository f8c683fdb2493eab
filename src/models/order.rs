use crate::entities::{OrderStatus, PaymentProvider, order_entity, order_item_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: i32,
    pub sku: Option<i32>,
    pub product_name: String,
    pub price_at_purchase: i64,
    pub quantity: i32,
    pub custom_name: Option<String>,
    pub custom_number: Option<i32>,
}

impl From<order_item_entity::Model> for OrderItemResponse {
    fn from(item: order_item_entity::Model) -> Self {
        Self {
            id: item.id,
            sku: item.sku_id,
            product_name: item.product_name,
            price_at_purchase: item.price_at_purchase,
            quantity: item.quantity,
            custom_name: item.custom_name,
            custom_number: item.custom_number,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: i32,
    pub total_amount: i64,
    pub status: OrderStatus,
    pub payment_provider: PaymentProvider,
    pub shipping_address: String,
    pub city: String,
    pub zip_code: String,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<OrderItemResponse>>,
}

impl From<order_entity::Model> for OrderResponse {
    fn from(order: order_entity::Model) -> Self {
        Self {
            id: order.id,
            total_amount: order.total_amount,
            status: order.status,
            payment_provider: order.payment_provider,
            shipping_address: order.shipping_address,
            city: order.city,
            zip_code: order.zip_code,
            transaction_id: order.transaction_id,
            created_at: order.created_at,
            items: None,
        }
    }
}

impl OrderResponse {
    pub fn with_items(mut self, items: Vec<order_item_entity::Model>) -> Self {
        self.items = Some(items.into_iter().map(OrderItemResponse::from).collect());
        self
    }
}
