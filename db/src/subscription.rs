use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{dtos::subscription::SubscriptionUpsertRequest, models::subscription::SubscriptionRow};

/// Returns the user's subscription row, if the webhook ever wrote one.
pub async fn get_subscription_by_user_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<Option<SubscriptionRow>> {
    sqlx::query_as::<_, SubscriptionRow>("SELECT * FROM subscriptions WHERE user_id = $1 LIMIT 1")
        .bind(user_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

/// Writes the user's subscription row. An event about a different
/// subscription never replaces an `active` row unless it is active itself;
/// `None` means the event was skipped for that reason.
pub async fn upsert_subscription<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: SubscriptionUpsertRequest,
) -> Res<Option<SubscriptionRow>> {
    sqlx::query_as::<_, SubscriptionRow>(
        r#"
        INSERT INTO subscriptions
            (id, user_id, status, plan, current_period_end, cancel_at_period_end)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (user_id) DO UPDATE SET
            id = EXCLUDED.id,
            status = EXCLUDED.status,
            plan = EXCLUDED.plan,
            current_period_end = EXCLUDED.current_period_end,
            cancel_at_period_end = EXCLUDED.cancel_at_period_end,
            updated_at = NOW()
        WHERE subscriptions.id = EXCLUDED.id
            OR subscriptions.status <> 'active'
            OR EXCLUDED.status = 'active'
        RETURNING *
        "#,
    )
    .bind(data.id)
    .bind(data.user_id)
    .bind(data.status)
    .bind(data.plan)
    .bind(data.current_period_end)
    .bind(data.cancel_at_period_end)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}
