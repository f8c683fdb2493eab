use crate::config::MediaConfig;
use crate::entities::{
    category_entity as categories, product_entity as products, product_sku_entity as skus,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use std::collections::HashMap;

#[derive(Clone)]
pub struct CatalogService {
    pool: DatabaseConnection,
    media: MediaConfig,
}

impl CatalogService {
    pub fn new(pool: DatabaseConnection, media: MediaConfig) -> Self {
        Self { pool, media }
    }

    /// Resolves `category` as an id first, then as a slug.
    async fn resolve_category(&self, raw: &str) -> AppResult<Option<i32>> {
        let raw = raw.trim();
        let mut condition = Condition::any().add(categories::Column::Slug.eq(raw));
        if let Ok(id) = raw.parse::<i32>() {
            condition = condition.add(categories::Column::Id.eq(id));
        }
        Ok(categories::Entity::find()
            .filter(condition)
            .order_by_asc(categories::Column::Id)
            .one(&self.pool)
            .await?
            .map(|c| c.id))
    }

    pub async fn list_products(
        &self,
        query: ProductQuery,
    ) -> AppResult<PaginatedResponse<ProductResponse>> {
        let params = PaginationParams {
            page: query.page,
            page_size: query.page_size,
        };
        let page_size = params.page_size();

        let mut select = products::Entity::find().filter(products::Column::IsActive.eq(true));

        if let Some(category) = query.category.as_deref().filter(|c| !c.trim().is_empty()) {
            match self.resolve_category(category).await? {
                Some(id) => select = select.filter(products::Column::CategoryId.eq(id)),
                None => {
                    return Ok(PaginatedResponse::new(vec![], params.page(), page_size, 0));
                }
            }
        }

        if let Some(team) = query.team.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(products::Column::Team)))
                    .eq(team.to_lowercase()),
            );
        }

        let paginator = select
            .order_by_desc(products::Column::CreatedAt)
            .order_by_desc(products::Column::Id)
            .paginate(&self.pool, page_size);
        let total = paginator.num_items().await?;
        let page = paginator.fetch_page(params.page_index()).await?;

        let data = self.assemble(page).await?;
        Ok(PaginatedResponse::new(data, params.page(), page_size, total))
    }

    pub async fn get_product(&self, product_id: i32) -> AppResult<ProductResponse> {
        let product = products::Entity::find_by_id(product_id)
            .filter(products::Column::IsActive.eq(true))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

        self.assemble(vec![product])
            .await?
            .pop()
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
    }

    /// Attaches SKUs (ordered by id) and category names to a page of products.
    async fn assemble(&self, page: Vec<products::Model>) -> AppResult<Vec<ProductResponse>> {
        if page.is_empty() {
            return Ok(vec![]);
        }
        let product_ids: Vec<i32> = page.iter().map(|p| p.id).collect();
        let category_ids: Vec<i32> = page.iter().map(|p| p.category_id).collect();

        let mut skus_by_product: HashMap<i32, Vec<SkuResponse>> = HashMap::new();
        for sku in skus::Entity::find()
            .filter(skus::Column::ProductId.is_in(product_ids))
            .order_by_asc(skus::Column::Id)
            .all(&self.pool)
            .await?
        {
            let image = sku
                .has_image()
                .then(|| sku.image.as_deref().map(|p| self.media.url_for(p)))
                .flatten();
            skus_by_product
                .entry(sku.product_id)
                .or_default()
                .push(SkuResponse::new(sku, image));
        }

        let category_names: HashMap<i32, String> = categories::Entity::find()
            .filter(categories::Column::Id.is_in(category_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        Ok(page
            .into_iter()
            .map(|product| {
                let skus = skus_by_product.remove(&product.id).unwrap_or_default();
                let category_name = category_names.get(&product.category_id).cloned();
                ProductResponse::new(product, category_name, skus)
            })
            .collect())
    }
}
