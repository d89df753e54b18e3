use chrono::{DateTime, Duration, Utc};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::domain::{reference, BillingCycle};
use crate::models::{Membership, MembershipTier};
use crate::utils::error::AppError;

const MEMBERSHIP_NUMBER_ATTEMPTS: u32 = 3;

pub struct NewMembership {
    pub user_id: Uuid,
    pub tier_id: Uuid,
    pub membership_number: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub billing_cycle: String,
    pub payment_method: Option<String>,
}

pub async fn list_active_tiers(
    executor: impl PgExecutor<'_>,
) -> Result<Vec<MembershipTier>, AppError> {
    let tiers = sqlx::query_as::<_, MembershipTier>(
        "SELECT * FROM membership_tiers WHERE is_active ORDER BY sort_order",
    )
    .fetch_all(executor)
    .await?;

    Ok(tiers)
}

pub async fn find_tier_by_slug(
    executor: impl PgExecutor<'_>,
    slug: &str,
) -> Result<Option<MembershipTier>, AppError> {
    let tier = sqlx::query_as::<_, MembershipTier>(
        "SELECT * FROM membership_tiers WHERE slug = $1 AND is_active",
    )
    .bind(slug)
    .fetch_optional(executor)
    .await?;

    Ok(tier)
}

pub async fn find_tier_by_id(
    executor: impl PgExecutor<'_>,
    id: Uuid,
) -> Result<Option<MembershipTier>, AppError> {
    let tier = sqlx::query_as::<_, MembershipTier>("SELECT * FROM membership_tiers WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(tier)
}

pub async fn find_by_id(
    executor: impl PgExecutor<'_>,
    id: Uuid,
) -> Result<Option<Membership>, AppError> {
    let membership = sqlx::query_as::<_, Membership>("SELECT * FROM memberships WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(membership)
}

/// The user's currently-active membership: explicitly active and not yet
/// past its end date. At most one is expected; the newest wins if data
/// drifts.
pub async fn find_active_for_user(
    executor: impl PgExecutor<'_>,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Option<Membership>, AppError> {
    let membership = sqlx::query_as::<_, Membership>(
        "SELECT * FROM memberships \
         WHERE user_id = $1 AND is_active AND end_date > $2 \
         ORDER BY created_at DESC \
         LIMIT 1",
    )
    .bind(user_id)
    .bind(now)
    .fetch_optional(executor)
    .await?;

    Ok(membership)
}

/// Creates a membership: start now, end one billing period later, number
/// generated fresh. A duplicate membership number is retried with a new one.
pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    tier_id: Uuid,
    billing_cycle: BillingCycle,
    payment_method: Option<String>,
    now: DateTime<Utc>,
) -> Result<Membership, AppError> {
    let start_date = now;
    let end_date = start_date + Duration::days(billing_cycle.period_days());
    let mut last_error = None;

    for attempt in 0..MEMBERSHIP_NUMBER_ATTEMPTS {
        let membership_number = reference::membership_number(now);

        match insert(
            pool,
            NewMembership {
                user_id,
                tier_id,
                membership_number: membership_number.clone(),
                start_date,
                end_date,
                billing_cycle: billing_cycle.as_str().to_string(),
                payment_method: payment_method.clone(),
            },
        )
        .await
        {
            Err(AppError::DatabaseError(e)) if is_number_collision(&e) => {
                tracing::warn!(
                    attempt,
                    number = %membership_number,
                    "Membership number collision, retrying with a fresh number"
                );
                last_error = Some(AppError::DatabaseError(e));
            }
            other => return other,
        }
    }

    Err(last_error.unwrap_or_else(|| {
        AppError::ValidationError("Could not allocate a membership number".to_string())
    }))
}

fn is_number_collision(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .map(|db| {
            db.is_unique_violation()
                && db.constraint() == Some("memberships_membership_number_key")
        })
        .unwrap_or(false)
}

pub async fn insert(
    executor: impl PgExecutor<'_>,
    new: NewMembership,
) -> Result<Membership, AppError> {
    let membership = sqlx::query_as::<_, Membership>(
        "INSERT INTO memberships \
         (user_id, tier_id, membership_number, start_date, end_date, billing_cycle, \
          next_payment_date, payment_method) \
         VALUES ($1, $2, $3, $4, $5, $6, $5, $7) \
         RETURNING *",
    )
    .bind(new.user_id)
    .bind(new.tier_id)
    .bind(new.membership_number)
    .bind(new.start_date)
    .bind(new.end_date)
    .bind(new.billing_cycle)
    .bind(new.payment_method)
    .fetch_one(executor)
    .await?;

    Ok(membership)
}

pub async fn update(
    executor: impl PgExecutor<'_>,
    membership: &Membership,
) -> Result<Membership, AppError> {
    let updated = sqlx::query_as::<_, Membership>(
        "UPDATE memberships SET \
         tier_id = $2, end_date = $3, payment_status = $4, last_payment_date = $5, \
         next_payment_date = $6, payment_method = $7, events_attended = $8, \
         total_bookings = $9, total_spent = $10, complimentary_drinks_used = $11, \
         is_active = $12, auto_renew = $13, updated_at = $14 \
         WHERE id = $1 \
         RETURNING *",
    )
    .bind(membership.id)
    .bind(membership.tier_id)
    .bind(membership.end_date)
    .bind(&membership.payment_status)
    .bind(membership.last_payment_date)
    .bind(membership.next_payment_date)
    .bind(&membership.payment_method)
    .bind(membership.events_attended)
    .bind(membership.total_bookings)
    .bind(membership.total_spent)
    .bind(membership.complimentary_drinks_used)
    .bind(membership.is_active)
    .bind(membership.auto_renew)
    .bind(membership.updated_at)
    .fetch_one(executor)
    .await?;

    Ok(updated)
}
