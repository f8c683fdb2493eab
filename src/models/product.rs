use crate::entities::{JerseyType, product_entity, product_sku_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SkuResponse {
    pub id: i32,
    pub sku_code: Option<String>,
    pub size: String,
    /// Minor units
    pub price: i64,
    pub custom_printing_cost: i64,
    pub stock_quantity: i32,
    pub image: Option<String>,
}

impl SkuResponse {
    pub fn new(sku: product_sku_entity::Model, image_url: Option<String>) -> Self {
        Self {
            id: sku.id,
            sku_code: sku.sku_code,
            size: sku.size,
            price: sku.price,
            custom_printing_cost: sku.custom_printing_cost,
            stock_quantity: sku.stock_quantity,
            image: image_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: i32,
    pub category: i32,
    pub category_name: Option<String>,
    pub name: String,
    pub team: String,
    pub season: String,
    pub jersey_type: JerseyType,
    pub description: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub skus: Vec<SkuResponse>,
    /// First SKU image, as an absolute URL
    pub main_image: Option<String>,
}

impl ProductResponse {
    pub fn new(
        product: product_entity::Model,
        category_name: Option<String>,
        skus: Vec<SkuResponse>,
    ) -> Self {
        let main_image = skus.iter().find_map(|s| s.image.clone());
        Self {
            id: product.id,
            category: product.category_id,
            category_name,
            name: product.name,
            team: product.team,
            season: product.season,
            jersey_type: product.jersey_type,
            description: product.description,
            is_active: product.is_active,
            created_at: product.created_at,
            skus,
            main_image,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema, IntoParams)]
pub struct ProductQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    /// Category id or slug
    pub category: Option<String>,
    pub team: Option<String>,
}
