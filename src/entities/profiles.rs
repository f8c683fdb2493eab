use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Loyalty level; always derived from points through [`Tier::from_points`].
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    ToSchema,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(10))")]
pub enum Tier {
    #[sea_orm(string_value = "Bronze")]
    Bronze,
    #[sea_orm(string_value = "Silver")]
    Silver,
    #[sea_orm(string_value = "Gold")]
    Gold,
}

impl Tier {
    pub const SILVER_POINTS: i64 = 500;
    pub const GOLD_POINTS: i64 = 2000;

    pub fn from_points(points: i64) -> Self {
        if points >= Self::GOLD_POINTS {
            Tier::Gold
        } else if points >= Self::SILVER_POINTS {
            Tier::Silver
        } else {
            Tier::Bronze
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Bronze => write!(f, "Bronze"),
            Tier::Silver => write!(f, "Silver"),
            Tier::Gold => write!(f, "Gold"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub user_id: i32,
    pub points: i64,
    pub tier: Tier,
    pub shipping_address: String,
    pub city: String,
    pub zip_code: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
