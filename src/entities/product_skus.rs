use sea_orm::entity::prelude::*;

/// A purchasable size of a product. Money columns are minor units.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "product_skus")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub product_id: i32,
    #[sea_orm(unique)]
    pub sku_code: Option<String>,
    pub size: String,
    pub price: i64,
    pub custom_printing_cost: i64,
    pub stock_quantity: i32,
    /// Path relative to the media root
    pub image: Option<String>,
}

impl Model {
    pub fn has_image(&self) -> bool {
        self.image.as_deref().is_some_and(|p| !p.trim().is_empty())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
