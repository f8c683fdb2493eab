use crate::entities::{order_entity as orders, order_item_entity as order_items};
use crate::error::{AppError, AppResult};
use crate::models::*;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};

#[derive(Clone)]
pub struct OrderService {
    pool: DatabaseConnection,
}

impl OrderService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Caller's orders, newest first.
    pub async fn list_orders(
        &self,
        user_id: i32,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<OrderResponse>> {
        let page_size = params.page_size();
        let paginator = orders::Entity::find()
            .filter(orders::Column::UserId.eq(user_id))
            .order_by_desc(orders::Column::CreatedAt)
            .order_by_desc(orders::Column::Id)
            .paginate(&self.pool, page_size);

        let total = paginator.num_items().await?;
        let data = paginator
            .fetch_page(params.page_index())
            .await?
            .into_iter()
            .map(OrderResponse::from)
            .collect();

        Ok(PaginatedResponse::new(data, params.page(), page_size, total))
    }

    pub async fn get_order(&self, user_id: i32, order_id: i32) -> AppResult<OrderResponse> {
        let order = orders::Entity::find_by_id(order_id)
            .filter(orders::Column::UserId.eq(user_id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

        let items = order_items::Entity::find()
            .filter(order_items::Column::OrderId.eq(order.id))
            .order_by_asc(order_items::Column::Id)
            .all(&self.pool)
            .await?;

        Ok(OrderResponse::from(order).with_items(items))
    }
}
