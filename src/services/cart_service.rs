use crate::entities::{
    cart_entity as carts, cart_item_entity as cart_items, product_sku_entity as skus,
};
use crate::error::{AppError, AppResult, is_unique_violation};
use crate::models::*;
use crate::utils::customization::{is_customized, normalize_custom_name, normalize_custom_number};
use crate::utils::pricing::{LinePrice, cart_total};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, ModelTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::collections::HashMap;

/// Largest quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: i32 = 99;

pub(crate) fn check_quantity(quantity: i32) -> AppResult<()> {
    if !(1..=MAX_LINE_QUANTITY).contains(&quantity) {
        return Err(AppError::ValidationError(format!(
            "quantity must be between 1 and {MAX_LINE_QUANTITY}"
        )));
    }
    Ok(())
}

/// A cart line together with the SKU it points at.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub item: cart_items::Model,
    pub sku: skus::Model,
}

impl CartLine {
    pub fn price(&self) -> LinePrice {
        LinePrice {
            unit_price: self.sku.price,
            printing_cost: self.sku.custom_printing_cost,
            quantity: self.item.quantity,
            customized: is_customized(self.item.custom_name.as_deref(), self.item.custom_number),
        }
    }

    fn to_response(&self) -> CartItemResponse {
        CartItemResponse {
            id: self.item.id,
            sku: self.item.sku_id,
            quantity: self.item.quantity,
            custom_name: self.item.custom_name.clone(),
            custom_number: self.item.custom_number,
            total_item_price: self.price().total(),
        }
    }
}

pub fn lines_total(lines: &[CartLine]) -> i64 {
    let prices: Vec<LinePrice> = lines.iter().map(CartLine::price).collect();
    cart_total(&prices)
}

pub(crate) async fn find_cart<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> AppResult<Option<carts::Model>> {
    Ok(carts::Entity::find()
        .filter(carts::Column::UserId.eq(user_id))
        .one(db)
        .await?)
}

/// One cart per user, created on first use.
pub(crate) async fn get_or_create_cart<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> AppResult<carts::Model> {
    if let Some(cart) = find_cart(db, user_id).await? {
        return Ok(cart);
    }

    let inserted = carts::ActiveModel {
        user_id: Set(user_id),
        shipping_method: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await;

    match inserted {
        Ok(cart) => Ok(cart),
        // lost the race against a concurrent first request
        Err(e) if is_unique_violation(&e) => find_cart(db, user_id)
            .await?
            .ok_or_else(|| AppError::InternalError("Cart vanished after conflict".to_string())),
        Err(e) => Err(e.into()),
    }
}

/// Lines of a cart in insertion order.
pub(crate) async fn load_cart_lines<C: ConnectionTrait>(
    db: &C,
    cart_id: i32,
) -> AppResult<Vec<CartLine>> {
    let items = cart_items::Entity::find()
        .filter(cart_items::Column::CartId.eq(cart_id))
        .order_by_asc(cart_items::Column::Id)
        .all(db)
        .await?;
    if items.is_empty() {
        return Ok(vec![]);
    }

    let sku_ids: Vec<i32> = items.iter().map(|i| i.sku_id).collect();
    let sku_map: HashMap<i32, skus::Model> = skus::Entity::find()
        .filter(skus::Column::Id.is_in(sku_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    Ok(items
        .into_iter()
        .filter_map(|item| {
            let sku = sku_map.get(&item.sku_id)?.clone();
            Some(CartLine { item, sku })
        })
        .collect())
}

#[derive(Clone)]
pub struct CartService {
    pool: DatabaseConnection,
}

impl CartService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn get_cart(&self, user_id: i32) -> AppResult<CartResponse> {
        let cart = get_or_create_cart(&self.pool, user_id).await?;
        let lines = load_cart_lines(&self.pool, cart.id).await?;

        Ok(CartResponse {
            id: cart.id,
            shipping_method: cart.shipping_method,
            total_price: lines_total(&lines),
            items: lines.iter().map(CartLine::to_response).collect(),
        })
    }

    pub async fn add_item(&self, user_id: i32, request: AddItemRequest) -> AppResult<MessageResponse> {
        check_quantity(request.quantity)?;
        let custom_name = normalize_custom_name(request.custom_name.as_deref())?;
        let custom_number = normalize_custom_number(request.custom_number.as_ref())?;

        skus::Entity::find_by_id(request.sku_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Product SKU not found".to_string()))?;

        let txn = self.pool.begin().await?;

        let cart = get_or_create_cart(&txn, user_id).await?;

        let mut same_line = cart_items::Entity::find()
            .filter(cart_items::Column::CartId.eq(cart.id))
            .filter(cart_items::Column::SkuId.eq(request.sku_id));
        same_line = match &custom_name {
            Some(name) => same_line.filter(cart_items::Column::CustomName.eq(name.as_str())),
            None => same_line.filter(cart_items::Column::CustomName.is_null()),
        };
        same_line = match custom_number {
            Some(number) => same_line.filter(cart_items::Column::CustomNumber.eq(number)),
            None => same_line.filter(cart_items::Column::CustomNumber.is_null()),
        };

        match same_line.one(&txn).await? {
            Some(existing) => {
                let Some(quantity) = existing
                    .quantity
                    .checked_add(request.quantity)
                    .filter(|q| *q <= MAX_LINE_QUANTITY)
                else {
                    txn.rollback().await?;
                    return Err(AppError::ValidationError(format!(
                        "A locker line holds at most {MAX_LINE_QUANTITY} jerseys"
                    )));
                };
                let mut active = existing.into_active_model();
                active.quantity = Set(quantity);
                active.update(&txn).await?;
            }
            None => {
                cart_items::ActiveModel {
                    cart_id: Set(cart.id),
                    sku_id: Set(request.sku_id),
                    quantity: Set(request.quantity),
                    custom_name: Set(custom_name),
                    custom_number: Set(custom_number),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
            }
        }

        txn.commit().await?;
        Ok(MessageResponse::new("Item added to locker"))
    }

    pub async fn update_shipping(
        &self,
        user_id: i32,
        cart_id: i32,
        request: UpdateShippingRequest,
    ) -> AppResult<UpdateShippingResponse> {
        let cart = carts::Entity::find_by_id(cart_id)
            .filter(carts::Column::UserId.eq(user_id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Cart not found".to_string()))?;

        if let Some(method) = request
            .shipping_method
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
        {
            let mut active = cart.into_active_model();
            active.shipping_method = Set(Some(method));
            active.update(&self.pool).await?;
        }

        Ok(UpdateShippingResponse {
            status: "shipping updated".to_string(),
            cart_id,
        })
    }

    pub async fn list_items(&self, user_id: i32) -> AppResult<Vec<CartItemResponse>> {
        let Some(cart) = find_cart(&self.pool, user_id).await? else {
            return Ok(vec![]);
        };
        let lines = load_cart_lines(&self.pool, cart.id).await?;
        Ok(lines.iter().map(CartLine::to_response).collect())
    }

    /// A line of the caller's cart; lines of other carts are reported as missing.
    async fn owned_item<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: i32,
        item_id: i32,
    ) -> AppResult<cart_items::Model> {
        let not_found = || AppError::NotFound("Cart item not found".to_string());
        let cart = find_cart(db, user_id).await?.ok_or_else(not_found)?;
        cart_items::Entity::find_by_id(item_id)
            .filter(cart_items::Column::CartId.eq(cart.id))
            .one(db)
            .await?
            .ok_or_else(not_found)
    }

    pub async fn update_item(
        &self,
        user_id: i32,
        item_id: i32,
        request: UpdateCartItemRequest,
    ) -> AppResult<CartItemResponse> {
        check_quantity(request.quantity)?;
        let item = self.owned_item(&self.pool, user_id, item_id).await?;
        let sku = skus::Entity::find_by_id(item.sku_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Product SKU not found".to_string()))?;

        let mut active = item.into_active_model();
        active.quantity = Set(request.quantity);
        let item = active.update(&self.pool).await?;

        Ok(CartLine { item, sku }.to_response())
    }

    pub async fn delete_item(&self, user_id: i32, item_id: i32) -> AppResult<()> {
        let item = self.owned_item(&self.pool, user_id, item_id).await?;
        item.delete(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_bounds() {
        assert!(check_quantity(1).is_ok());
        assert!(check_quantity(MAX_LINE_QUANTITY).is_ok());
        assert!(check_quantity(0).is_err());
        assert!(check_quantity(-3).is_err());
        assert!(check_quantity(MAX_LINE_QUANTITY + 1).is_err());
        assert!(check_quantity(i32::MAX).is_err());
    }
}
