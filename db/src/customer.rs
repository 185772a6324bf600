use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::customer::BillingCustomer;

pub async fn get_customer_by_user_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<Option<BillingCustomer>> {
    sqlx::query_as::<_, BillingCustomer>("SELECT * FROM billing_customers WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

pub async fn get_customer_by_stripe_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    stripe_customer_id: &str,
) -> Res<Option<BillingCustomer>> {
    sqlx::query_as::<_, BillingCustomer>(
        "SELECT * FROM billing_customers WHERE stripe_customer_id = $1",
    )
    .bind(stripe_customer_id)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

/// Stores the customer mapping. Returns `None` when the user already has one.
pub async fn insert_customer<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    stripe_customer_id: &str,
) -> Res<Option<BillingCustomer>> {
    sqlx::query_as::<_, BillingCustomer>(
        r#"
        INSERT INTO billing_customers (user_id, stripe_customer_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(stripe_customer_id)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}
