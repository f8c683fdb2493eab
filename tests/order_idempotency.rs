#[macro_use]
mod common;

use chrono::Utc;
use common::{bearer, register, send, setup};
use jersey_arena::AppError;
use jersey_arena::entities::{
    OrderStatus, PaymentProvider, order_entity as orders, product_sku_entity as skus,
};
use jersey_arena::models::VerifyPaymentResponse;
use jersey_arena::services::{OrderSource, PaidTransaction};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};

fn paid_order(user_id: i32, transaction_id: &str) -> orders::ActiveModel {
    orders::ActiveModel {
        user_id: Set(user_id),
        total_amount: Set(18000),
        status: Set(OrderStatus::Paid),
        payment_provider: Set(PaymentProvider::Stripe),
        shipping_address: Set(String::new()),
        city: Set(String::new()),
        zip_code: Set(String::new()),
        transaction_id: Set(Some(transaction_id.to_string())),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
}

async fn orders_for(pool: &DatabaseConnection, transaction_id: &str) -> u64 {
    orders::Entity::find()
        .filter(orders::Column::TransactionId.eq(transaction_id))
        .count(pool)
        .await
        .unwrap()
}

#[actix_web::test]
async fn test_duplicate_transaction_id_is_a_unique_violation() {
    let ctx = setup().await;
    let app = init_app!(ctx);
    let token = register(&app, "racer").await;
    let req = actix_web::test::TestRequest::get()
        .uri("/api/v1/me")
        .insert_header(bearer(&token))
        .to_request();
    let (_, me) = send(&app, req).await;
    let user_id = me["data"]["id"].as_i64().unwrap() as i32;

    let first = paid_order(user_id, "cs_test_race").insert(&ctx.pool).await.unwrap();
    let err = paid_order(user_id, "cs_test_race")
        .insert(&ctx.pool)
        .await
        .unwrap_err();
    assert!(AppError::from(err).is_unique_violation());
    assert_eq!(orders_for(&ctx.pool, "cs_test_race").await, 1);

    let sku = skus::Entity::find()
        .filter(skus::Column::SkuCode.eq("MCI-9-L"))
        .one(&ctx.pool)
        .await
        .unwrap()
        .unwrap();
    let paid = PaidTransaction {
        user_id,
        provider: PaymentProvider::Stripe,
        transaction_id: "cs_test_race".to_string(),
        total_amount: 12000,
        source: OrderSource::Instant {
            sku_id: sku.id,
            quantity: 1,
        },
    };

    // the losing writer of a concurrent pair skips the pre-check and hits the index
    let outcome = ctx.services.payment.record_order(paid.clone()).await.unwrap();
    assert_eq!(outcome, VerifyPaymentResponse::already_processed(first.id));

    let outcome = ctx.services.payment.materialize_order(paid).await.unwrap();
    assert_eq!(outcome, VerifyPaymentResponse::already_processed(first.id));
    assert_eq!(orders_for(&ctx.pool, "cs_test_race").await, 1);
}
