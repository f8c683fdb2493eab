use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartItemResponse {
    pub id: i32,
    pub sku: i32,
    pub quantity: i32,
    pub custom_name: Option<String>,
    pub custom_number: Option<i32>,
    /// Minor units, printing surcharge included
    pub total_item_price: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartResponse {
    pub id: i32,
    pub shipping_method: Option<String>,
    pub items: Vec<CartItemResponse>,
    pub total_price: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddItemRequest {
    pub sku_id: i32,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    #[schema(example = "messi")]
    pub custom_name: Option<String>,
    /// Integer or numeric string
    #[schema(value_type = Option<Object>, example = 10)]
    pub custom_number: Option<serde_json::Value>,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateShippingRequest {
    #[schema(example = "express")]
    pub shipping_method: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateShippingResponse {
    pub status: String,
    pub cart_id: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}
