use crate::entities::{
    JerseyType, category_entity as categories, product_entity as products,
    product_sku_entity as skus,
};
use crate::error::AppResult;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set, TransactionTrait,
};

pub const SEED_STOCK: i32 = 50;

pub struct SeedCategory {
    pub name: &'static str,
    pub slug: &'static str,
}

pub struct SeedJersey {
    pub name: &'static str,
    pub category_slug: &'static str,
    pub team: &'static str,
    pub season: &'static str,
    pub price: i64,
    pub sku_code: &'static str,
    pub size: &'static str,
    pub image: &'static str,
}

pub const CATEGORIES: &[SeedCategory] = &[
    SeedCategory {
        name: "International",
        slug: "international",
    },
    SeedCategory {
        name: "Club Teams",
        slug: "club-teams",
    },
    SeedCategory {
        name: "American Football (NFL)",
        slug: "american-football-nfl",
    },
];

pub const JERSEYS: &[SeedJersey] = &[
    SeedJersey {
        name: "Argentina 2024 Home (Messi)",
        category_slug: "international",
        team: "Argentina",
        season: "2024",
        price: 12000,
        sku_code: "ARG-10-M",
        size: "M",
        image: "products/mes.png",
    },
    SeedJersey {
        name: "Portugal 2024 Home (Ronaldo)",
        category_slug: "international",
        team: "Portugal",
        season: "2024",
        price: 12000,
        sku_code: "POR-7-L",
        size: "L",
        image: "products/arsenal.png",
    },
    SeedJersey {
        name: "Real Madrid 24/25 (Mbappe)",
        category_slug: "club-teams",
        team: "Real Madrid",
        season: "24/25",
        price: 14000,
        sku_code: "RMA-9-M",
        size: "M",
        image: "products/mb.png",
    },
    SeedJersey {
        name: "Man City 24/25 (Haaland)",
        category_slug: "club-teams",
        team: "Man City",
        season: "24/25",
        price: 11000,
        sku_code: "MCI-9-L",
        size: "L",
        image: "products/h.png",
    },
    SeedJersey {
        name: "Inter Miami Home (Messi)",
        category_slug: "club-teams",
        team: "Inter Miami",
        season: "2024",
        price: 13000,
        sku_code: "MIA-10-S",
        size: "S",
        image: "products/i.png",
    },
    SeedJersey {
        name: "Kansas City Chiefs (Mahomes)",
        category_slug: "american-football-nfl",
        team: "Kansas City Chiefs",
        season: "2024",
        price: 17000,
        sku_code: "KC-15-L",
        size: "L",
        image: "products/mahomes.png",
    },
];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub categories_created: usize,
    pub products_created: usize,
    pub skus_created: usize,
    pub skus_updated: usize,
}

/// Idempotent catalog sync: categories and products are get-or-create,
/// SKUs are update-or-create keyed by product and sku code.
pub struct CatalogSeeder {
    pool: DatabaseConnection,
}

impl CatalogSeeder {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn sync(&self) -> AppResult<SeedReport> {
        let mut report = SeedReport::default();
        let txn = self.pool.begin().await?;

        let mut category_ids = Vec::with_capacity(CATEGORIES.len());
        for seed in CATEGORIES {
            let existing = categories::Entity::find()
                .filter(categories::Column::Slug.eq(seed.slug))
                .one(&txn)
                .await?;
            let category = match existing {
                Some(c) => c,
                None => {
                    report.categories_created += 1;
                    categories::ActiveModel {
                        name: Set(seed.name.to_string()),
                        slug: Set(seed.slug.to_string()),
                        ..Default::default()
                    }
                    .insert(&txn)
                    .await?
                }
            };
            category_ids.push((seed.slug, category.id));
        }

        for jersey in JERSEYS {
            let Some(&(_, category_id)) = category_ids
                .iter()
                .find(|(slug, _)| *slug == jersey.category_slug)
            else {
                log::warn!("Unknown category {} for {}", jersey.category_slug, jersey.name);
                continue;
            };

            let existing = products::Entity::find()
                .filter(products::Column::Name.eq(jersey.name))
                .filter(products::Column::CategoryId.eq(category_id))
                .one(&txn)
                .await?;
            let product = match existing {
                Some(p) => p,
                None => {
                    report.products_created += 1;
                    products::ActiveModel {
                        category_id: Set(category_id),
                        name: Set(jersey.name.to_string()),
                        team: Set(jersey.team.to_string()),
                        season: Set(jersey.season.to_string()),
                        jersey_type: Set(JerseyType::Home),
                        description: Set(format!("Official {} {} jersey.", jersey.team, jersey.season)),
                        is_active: Set(true),
                        created_at: Set(Utc::now()),
                        ..Default::default()
                    }
                    .insert(&txn)
                    .await?
                }
            };

            let existing = skus::Entity::find()
                .filter(skus::Column::ProductId.eq(product.id))
                .filter(skus::Column::SkuCode.eq(jersey.sku_code))
                .one(&txn)
                .await?;
            match existing {
                Some(sku) => {
                    report.skus_updated += 1;
                    let mut active = sku.into_active_model();
                    active.size = Set(jersey.size.to_string());
                    active.price = Set(jersey.price);
                    active.stock_quantity = Set(SEED_STOCK);
                    active.image = Set(Some(jersey.image.to_string()));
                    active.update(&txn).await?;
                }
                None => {
                    report.skus_created += 1;
                    skus::ActiveModel {
                        product_id: Set(product.id),
                        sku_code: Set(Some(jersey.sku_code.to_string())),
                        size: Set(jersey.size.to_string()),
                        price: Set(jersey.price),
                        custom_printing_cost: Set(1500),
                        stock_quantity: Set(SEED_STOCK),
                        image: Set(Some(jersey.image.to_string())),
                        ..Default::default()
                    }
                    .insert(&txn)
                    .await?;
                }
            }
            log::info!("Synced: {}", jersey.name);
        }

        txn.commit().await?;
        Ok(report)
    }
}
