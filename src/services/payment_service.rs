//! Hosted checkout, eSewa signing, and cart-to-order conversion.
//!
//! Orders are keyed by the provider's transaction id. Verification is
//! idempotent: a pre-check answers repeated calls, and the unique index on
//! `orders.transaction_id` catches concurrent ones.

use crate::config::{CheckoutConfig, ClientConfig};
use crate::entities::{
    OrderStatus, PaymentProvider, cart_entity as carts, cart_item_entity as cart_items,
    order_entity as orders, order_item_entity as order_items, product_entity as products,
    product_sku_entity as skus, Tier,
};
use crate::error::{AppError, AppResult};
use crate::external::{
    CheckoutGateway, EsewaService, HostedCheckoutRequest, SIGNED_FIELD_NAMES, STATUS_COMPLETE,
};
use crate::models::*;
use crate::services::cart_service::{
    check_quantity, get_or_create_cart, lines_total, load_cart_lines,
};
use crate::services::user_service::get_or_create_profile;
use crate::utils::pricing::{format_minor, instant_total, loyalty_points_for, parse_minor};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use std::collections::HashMap;
use std::sync::Arc;

pub const LOCKER_CHECKOUT_NAME: &str = "Jersey Arena - Locker Checkout";

/// What a verified payment paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSource {
    Instant { sku_id: i32, quantity: i32 },
    Cart { cart_id: i32 },
}

/// A verified payment, ready to become an order.
#[derive(Debug, Clone)]
pub struct PaidTransaction {
    pub user_id: i32,
    pub provider: PaymentProvider,
    pub transaction_id: String,
    pub total_amount: i64,
    pub source: OrderSource,
}

struct OrderLine {
    sku_id: i32,
    product_name: String,
    price_at_purchase: i64,
    quantity: i32,
    custom_name: Option<String>,
    custom_number: Option<i32>,
}

/// `CART-<cart id>-<unix seconds>`
pub fn esewa_transaction_uuid(cart_id: i32, timestamp: i64) -> String {
    format!("CART-{cart_id}-{timestamp}")
}

pub fn cart_id_from_uuid(uuid: &str) -> Option<i32> {
    let mut parts = uuid.splitn(3, '-');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("CART"), Some(id), Some(ts)) if ts.chars().all(|c| c.is_ascii_digit()) => {
            id.parse().ok()
        }
        _ => None,
    }
}

/// Product name for an order line; falls back to the SKU when the product is gone.
fn line_product_name(names: &HashMap<i32, String>, sku: &skus::Model) -> String {
    if let Some(name) = names.get(&sku.product_id) {
        return name.clone();
    }
    log::warn!(
        "Product {} of SKU {} is missing, naming the order line after the SKU",
        sku.product_id,
        sku.id
    );
    sku.sku_code
        .clone()
        .filter(|code| !code.is_empty())
        .unwrap_or_else(|| format!("SKU {}", sku.id))
}

fn metadata_i32(metadata: &HashMap<String, String>, key: &str) -> Option<i32> {
    metadata.get(key).and_then(|v| v.trim().parse().ok())
}

#[derive(Clone)]
pub struct PaymentService {
    pool: DatabaseConnection,
    gateway: Arc<dyn CheckoutGateway>,
    esewa: EsewaService,
    checkout: CheckoutConfig,
    client: ClientConfig,
}

impl PaymentService {
    pub fn new(
        pool: DatabaseConnection,
        gateway: Arc<dyn CheckoutGateway>,
        esewa: EsewaService,
        checkout: CheckoutConfig,
        client: ClientConfig,
    ) -> Self {
        Self {
            pool,
            gateway,
            esewa,
            checkout,
            client,
        }
    }

    fn client_url(&self, path: &str) -> String {
        format!("{}{path}", self.client.frontend_url.trim_end_matches('/'))
    }

    pub async fn check_cart_status(&self, user_id: i32, cart_id: i32) -> AppResult<CartStatusResponse> {
        let cart = carts::Entity::find_by_id(cart_id)
            .filter(carts::Column::UserId.eq(user_id))
            .one(&self.pool)
            .await?;
        let Some(cart) = cart else {
            return Ok(CartStatusResponse::completed());
        };

        let items = cart_items::Entity::find()
            .filter(cart_items::Column::CartId.eq(cart.id))
            .count(&self.pool)
            .await?;

        Ok(if items == 0 {
            CartStatusResponse::completed()
        } else {
            CartStatusResponse::active()
        })
    }

    pub async fn create_checkout_session(
        &self,
        user_id: i32,
        request: CreateCheckoutSessionRequest,
    ) -> AppResult<CheckoutSessionResponse> {
        let shipping = self.checkout.shipping_cents;
        let mut metadata = HashMap::new();
        metadata.insert("user_id".to_string(), user_id.to_string());

        let (amount, line_item_name) = if request.is_instant {
            let sku_id = request.sku_id.ok_or_else(|| {
                AppError::ValidationError("sku_id is required for instant purchase".to_string())
            })?;
            let quantity = request.qty.unwrap_or(1);
            check_quantity(quantity)?;

            let sku = skus::Entity::find_by_id(sku_id)
                .one(&self.pool)
                .await?
                .ok_or_else(|| AppError::NotFound("Product SKU not found".to_string()))?;
            let product = products::Entity::find_by_id(sku.product_id)
                .one(&self.pool)
                .await?
                .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

            metadata.insert("sku_id".to_string(), sku.id.to_string());
            metadata.insert("qty".to_string(), quantity.to_string());
            metadata.insert("is_instant".to_string(), "true".to_string());
            (
                instant_total(sku.price, quantity) + shipping,
                format!("Instant Purchase: {}", product.name),
            )
        } else {
            let cart = get_or_create_cart(&self.pool, user_id).await?;
            let lines = load_cart_lines(&self.pool, cart.id).await?;
            if lines.is_empty() {
                return Err(AppError::ValidationError("Locker is empty".to_string()));
            }

            metadata.insert("is_instant".to_string(), "false".to_string());
            metadata.insert("cart_id".to_string(), cart.id.to_string());
            (lines_total(&lines) + shipping, LOCKER_CHECKOUT_NAME.to_string())
        };

        let session = self
            .gateway
            .create_session(HostedCheckoutRequest::new(
                &self.checkout,
                &self.client.frontend_url,
                line_item_name,
                amount,
                metadata,
            ))
            .await?;

        let url = session.url.ok_or_else(|| {
            AppError::ExternalApiError("Checkout session has no redirect url".to_string())
        })?;
        Ok(CheckoutSessionResponse { url })
    }

    pub async fn process_esewa(&self, user_id: i32) -> AppResult<EsewaPaymentResponse> {
        let cart = get_or_create_cart(&self.pool, user_id).await?;
        let lines = load_cart_lines(&self.pool, cart.id).await?;
        if lines.is_empty() {
            return Err(AppError::ValidationError("Locker is empty".to_string()));
        }

        let total = format_minor(lines_total(&lines) + self.checkout.shipping_cents);
        let transaction_uuid = esewa_transaction_uuid(cart.id, Utc::now().timestamp());
        let signature = self.esewa.sign_payment(&total, &transaction_uuid)?;

        Ok(EsewaPaymentResponse {
            amount: total.clone(),
            tax_amount: "0".to_string(),
            total_amount: total,
            transaction_uuid,
            product_code: self.esewa.product_code().to_string(),
            product_service_charge: "0".to_string(),
            product_delivery_charge: "0".to_string(),
            success_url: self.client_url("/success"),
            failure_url: self.client_url("/cart"),
            signed_field_names: SIGNED_FIELD_NAMES.to_string(),
            signature,
            esewa_url: self.esewa.form_url().to_string(),
        })
    }

    pub async fn verify_payment(
        &self,
        user_id: i32,
        request: VerifyPaymentRequest,
    ) -> AppResult<VerifyPaymentResponse> {
        let session_id = request
            .session_id
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::ValidationError("session_id required".to_string()))?;

        let session = self.gateway.retrieve_session(&session_id).await?;
        if !session.paid {
            log::warn!("Checkout session {session_id} is not paid");
            return Err(AppError::ValidationError("Payment failed".to_string()));
        }

        if metadata_i32(&session.metadata, "user_id") != Some(user_id) {
            log::warn!("User {user_id} tried to verify checkout session {session_id} of another user");
            return Err(AppError::Forbidden);
        }

        if let Some(order) = self.find_by_transaction(&session.id).await? {
            return Ok(VerifyPaymentResponse::already_processed(order.id));
        }

        let source = if session.metadata.get("is_instant").map(String::as_str) == Some("true") {
            let sku_id = metadata_i32(&session.metadata, "sku_id").ok_or_else(|| {
                AppError::ValidationError("Session metadata has no sku_id".to_string())
            })?;
            let quantity = metadata_i32(&session.metadata, "qty").unwrap_or(1).max(1);
            OrderSource::Instant { sku_id, quantity }
        } else {
            let cart_id = metadata_i32(&session.metadata, "cart_id").ok_or_else(|| {
                AppError::ValidationError("Session metadata has no cart_id".to_string())
            })?;
            OrderSource::Cart { cart_id }
        };

        let total_amount = session.amount_total.ok_or_else(|| {
            AppError::ExternalApiError("Checkout session has no amount".to_string())
        })?;

        self.materialize_order(PaidTransaction {
            user_id,
            provider: PaymentProvider::Stripe,
            transaction_id: session.id,
            total_amount,
            source,
        })
        .await
    }

    pub async fn verify_esewa(
        &self,
        user_id: i32,
        request: VerifyEsewaRequest,
    ) -> AppResult<VerifyPaymentResponse> {
        let data = request
            .data
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| AppError::ValidationError("data required".to_string()))?;

        let callback = self.esewa.decode_callback(&data)?;
        if callback.product_code != self.esewa.product_code() {
            return Err(AppError::ValidationError(
                "Unexpected eSewa product code".to_string(),
            ));
        }
        if callback.status != STATUS_COMPLETE {
            log::warn!(
                "eSewa transaction {} reported status {}",
                callback.transaction_uuid,
                callback.status
            );
            return Err(AppError::ValidationError("Payment failed".to_string()));
        }

        let cart_id = cart_id_from_uuid(&callback.transaction_uuid).ok_or_else(|| {
            AppError::ValidationError("Malformed transaction_uuid".to_string())
        })?;
        let total_amount = parse_minor(&callback.total_amount)
            .ok_or_else(|| AppError::ValidationError("Malformed total_amount".to_string()))?;

        let cart = carts::Entity::find_by_id(cart_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Cart not found".to_string()))?;
        if cart.user_id != user_id {
            log::warn!(
                "User {user_id} tried to verify eSewa transaction {} of another user",
                callback.transaction_uuid
            );
            return Err(AppError::Forbidden);
        }

        if self.esewa.confirms_with_status_api() {
            let status = self
                .esewa
                .check_status(&callback.transaction_uuid, &format_minor(total_amount))
                .await?;
            if status.status != STATUS_COMPLETE {
                return Err(AppError::ValidationError("Payment failed".to_string()));
            }
        }

        self.materialize_order(PaidTransaction {
            user_id,
            provider: PaymentProvider::Esewa,
            transaction_id: callback.transaction_uuid,
            total_amount,
            source: OrderSource::Cart { cart_id },
        })
        .await
    }

    async fn find_by_transaction(&self, transaction_id: &str) -> AppResult<Option<orders::Model>> {
        Ok(orders::Entity::find()
            .filter(orders::Column::TransactionId.eq(transaction_id))
            .one(&self.pool)
            .await?)
    }

    /// Turns a verified payment into exactly one order.
    pub async fn materialize_order(
        &self,
        paid: PaidTransaction,
    ) -> AppResult<VerifyPaymentResponse> {
        if let Some(order) = self.find_by_transaction(&paid.transaction_id).await? {
            return Ok(VerifyPaymentResponse::already_processed(order.id));
        }
        self.record_order(paid).await
    }

    /// Writes the order in one transaction; a duplicate transaction id
    /// rejected by the unique index resolves to the order already stored.
    pub async fn record_order(&self, paid: PaidTransaction) -> AppResult<VerifyPaymentResponse> {
        let txn = self.pool.begin().await?;
        match self.create_order(&txn, &paid).await {
            Ok(order_id) => {
                txn.commit().await?;
                log::info!(
                    "Order {order_id} created from {} transaction {}",
                    paid.provider,
                    paid.transaction_id
                );
                Ok(VerifyPaymentResponse::created(order_id))
            }
            Err(err) if err.is_unique_violation() => {
                txn.rollback().await?;
                let order = self
                    .find_by_transaction(&paid.transaction_id)
                    .await?
                    .ok_or(err)?;
                log::info!(
                    "Transaction {} was processed concurrently as order {}",
                    paid.transaction_id,
                    order.id
                );
                Ok(VerifyPaymentResponse::already_processed(order.id))
            }
            Err(err) => {
                txn.rollback().await?;
                Err(err)
            }
        }
    }

    async fn order_lines(
        &self,
        txn: &DatabaseTransaction,
        paid: &PaidTransaction,
    ) -> AppResult<Vec<OrderLine>> {
        let lines: Vec<(skus::Model, i32, Option<String>, Option<i32>, i64)> = match paid.source {
            OrderSource::Instant { sku_id, quantity } => {
                let sku = skus::Entity::find_by_id(sku_id)
                    .one(txn)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Product SKU not found".to_string()))?;
                let price = sku.price;
                vec![(sku, quantity, None, None, price)]
            }
            OrderSource::Cart { cart_id } => {
                let cart = carts::Entity::find_by_id(cart_id)
                    .filter(carts::Column::UserId.eq(paid.user_id))
                    .one(txn)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Cart not found".to_string()))?;
                load_cart_lines(txn, cart.id)
                    .await?
                    .into_iter()
                    .map(|line| {
                        let unit = line.price().unit_total();
                        (
                            line.sku,
                            line.item.quantity,
                            line.item.custom_name,
                            line.item.custom_number,
                            unit,
                        )
                    })
                    .collect()
            }
        };

        let product_ids: Vec<i32> = lines.iter().map(|(sku, ..)| sku.product_id).collect();
        let names: HashMap<i32, String> = products::Entity::find()
            .filter(products::Column::Id.is_in(product_ids))
            .all(txn)
            .await?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();

        Ok(lines
            .into_iter()
            .map(|(sku, quantity, custom_name, custom_number, unit)| {
                OrderLine {
                    sku_id: sku.id,
                    product_name: line_product_name(&names, &sku),
                    price_at_purchase: unit,
                    quantity,
                    custom_name,
                    custom_number,
                }
            })
            .collect())
    }

    async fn create_order(&self, txn: &DatabaseTransaction, paid: &PaidTransaction) -> AppResult<i32> {
        let lines = self.order_lines(txn, paid).await?;
        if let OrderSource::Cart { cart_id } = paid.source {
            let expected = lines
                .iter()
                .map(|line| line.price_at_purchase * i64::from(line.quantity))
                .sum::<i64>()
                + self.checkout.shipping_cents;
            if expected != paid.total_amount {
                log::error!(
                    "Cart {cart_id} now totals {expected} but transaction {} paid {}",
                    paid.transaction_id,
                    paid.total_amount
                );
                return Err(AppError::Conflict(
                    "Locker changed after payment, restore it to match the payment and verify again"
                        .to_string(),
                ));
            }
        }

        let profile = get_or_create_profile(txn, paid.user_id).await?;

        let order = orders::ActiveModel {
            user_id: Set(paid.user_id),
            total_amount: Set(paid.total_amount),
            status: Set(OrderStatus::Paid),
            payment_provider: Set(paid.provider),
            shipping_address: Set(profile.shipping_address.clone()),
            city: Set(profile.city.clone()),
            zip_code: Set(profile.zip_code.clone()),
            transaction_id: Set(Some(paid.transaction_id.clone())),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        for line in lines {
            order_items::ActiveModel {
                order_id: Set(order.id),
                sku_id: Set(Some(line.sku_id)),
                product_name: Set(line.product_name),
                price_at_purchase: Set(line.price_at_purchase),
                quantity: Set(line.quantity),
                custom_name: Set(line.custom_name),
                custom_number: Set(line.custom_number),
                ..Default::default()
            }
            .insert(txn)
            .await?;
        }

        if let OrderSource::Cart { cart_id } = paid.source {
            cart_items::Entity::delete_many()
                .filter(cart_items::Column::CartId.eq(cart_id))
                .exec(txn)
                .await?;
        }

        let points = profile.points + loyalty_points_for(paid.total_amount);
        let mut active = profile.into_active_model();
        active.points = Set(points);
        active.tier = Set(Tier::from_points(points));
        active.update(txn).await?;

        Ok(order.id)
    }
}
