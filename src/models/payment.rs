use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateCheckoutSessionRequest {
    #[serde(default)]
    pub is_instant: bool,
    pub sku_id: Option<i32>,
    pub qty: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckoutSessionResponse {
    pub url: String,
}

/// Form fields the browser posts to eSewa.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EsewaPaymentResponse {
    #[schema(example = "250.00")]
    pub amount: String,
    pub tax_amount: String,
    pub total_amount: String,
    #[schema(example = "CART-3-1735689600")]
    pub transaction_uuid: String,
    pub product_code: String,
    pub product_service_charge: String,
    pub product_delivery_charge: String,
    pub success_url: String,
    pub failure_url: String,
    pub signed_field_names: String,
    pub signature: String,
    pub esewa_url: String,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct VerifyPaymentRequest {
    pub session_id: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct VerifyEsewaRequest {
    /// Base64 JSON blob eSewa appends to the success URL
    pub data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum VerifyPaymentResponse {
    Created { order_id: i32, status: String },
    AlreadyProcessed { message: String, order_id: i32 },
}

impl VerifyPaymentResponse {
    pub fn created(order_id: i32) -> Self {
        Self::Created {
            order_id,
            status: "success".to_string(),
        }
    }

    pub fn already_processed(order_id: i32) -> Self {
        Self::AlreadyProcessed {
            message: "Order already processed".to_string(),
            order_id,
        }
    }

    pub fn order_id(&self) -> i32 {
        match self {
            Self::Created { order_id, .. } | Self::AlreadyProcessed { order_id, .. } => *order_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartStatusResponse {
    pub status: String,
    pub is_converted: bool,
}

impl CartStatusResponse {
    pub fn completed() -> Self {
        Self {
            status: "completed".to_string(),
            is_converted: true,
        }
    }

    pub fn active() -> Self {
        Self {
            status: "active".to_string(),
            is_converted: false,
        }
    }
}
