use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::Event;
use crate::utils::error::AppError;

pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: Decimal,
    pub max_guests: i32,
    pub date: DateTime<Utc>,
    pub duration_hours: i32,
    pub image_url: Option<String>,
    pub venue_location: Option<String>,
    pub features: Option<String>,
}

/// Active events that have not happened yet, optionally narrowed by category.
pub async fn list_available(
    executor: impl PgExecutor<'_>,
    category: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Vec<Event>, AppError> {
    let events = sqlx::query_as::<_, Event>(
        "SELECT * FROM events \
         WHERE is_active AND date > $1 AND ($2::text IS NULL OR category = $2) \
         ORDER BY date",
    )
    .bind(now)
    .bind(category)
    .fetch_all(executor)
    .await?;

    Ok(events)
}

pub async fn find_by_id(
    executor: impl PgExecutor<'_>,
    id: Uuid,
) -> Result<Option<Event>, AppError> {
    let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(event)
}

/// Locks the event row for the rest of the transaction. Serializes the
/// availability check against concurrent booking inserts on the same event.
pub async fn find_by_id_for_update(
    executor: impl PgExecutor<'_>,
    id: Uuid,
) -> Result<Option<Event>, AppError> {
    let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(event)
}

/// Sum of guests across this event's confirmed bookings.
pub async fn confirmed_guest_total(
    executor: impl PgExecutor<'_>,
    event_id: Uuid,
) -> Result<i64, AppError> {
    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(SUM(guest_count), 0) FROM bookings \
         WHERE event_id = $1 AND status = 'confirmed'",
    )
    .bind(event_id)
    .fetch_one(executor)
    .await?;

    Ok(total)
}

pub async fn insert(executor: impl PgExecutor<'_>, new: NewEvent) -> Result<Event, AppError> {
    let event = sqlx::query_as::<_, Event>(
        "INSERT INTO events \
         (title, description, category, price, max_guests, date, duration_hours, \
          image_url, venue_location, features) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING *",
    )
    .bind(new.title)
    .bind(new.description)
    .bind(new.category)
    .bind(new.price)
    .bind(new.max_guests)
    .bind(new.date)
    .bind(new.duration_hours)
    .bind(new.image_url)
    .bind(new.venue_location)
    .bind(new.features)
    .fetch_one(executor)
    .await?;

    Ok(event)
}

pub async fn update(executor: impl PgExecutor<'_>, event: &Event) -> Result<Event, AppError> {
    let updated = sqlx::query_as::<_, Event>(
        "UPDATE events SET \
         title = $2, description = $3, category = $4, price = $5, max_guests = $6, \
         date = $7, duration_hours = $8, image_url = $9, venue_location = $10, \
         features = $11, is_active = $12, updated_at = now() \
         WHERE id = $1 \
         RETURNING *",
    )
    .bind(event.id)
    .bind(&event.title)
    .bind(&event.description)
    .bind(&event.category)
    .bind(event.price)
    .bind(event.max_guests)
    .bind(event.date)
    .bind(event.duration_hours)
    .bind(&event.image_url)
    .bind(&event.venue_location)
    .bind(&event.features)
    .bind(event.is_active)
    .fetch_one(executor)
    .await?;

    Ok(updated)
}

pub async fn delete(executor: impl PgExecutor<'_>, id: Uuid) -> Result<(), AppError> {
    sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(())
}

pub async fn has_bookings(
    executor: impl PgExecutor<'_>,
    event_id: Uuid,
) -> Result<bool, AppError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM bookings WHERE event_id = $1)",
    )
    .bind(event_id)
    .fetch_one(executor)
    .await?;

    Ok(exists)
}
