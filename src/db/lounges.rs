use chrono::{NaiveDate, NaiveTime};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::domain::TimeSlot;
use crate::models::Lounge;
use crate::utils::error::AppError;

/// Active lounges, optionally narrowed by category, cheapest first within
/// each category.
pub async fn list_active(
    executor: impl PgExecutor<'_>,
    category: Option<&str>,
) -> Result<Vec<Lounge>, AppError> {
    let lounges = sqlx::query_as::<_, Lounge>(
        "SELECT * FROM lounges \
         WHERE is_active AND ($1::text IS NULL OR category = $1) \
         ORDER BY category, hourly_rate",
    )
    .bind(category)
    .fetch_all(executor)
    .await?;

    Ok(lounges)
}

pub async fn find_by_id(
    executor: impl PgExecutor<'_>,
    id: Uuid,
) -> Result<Option<Lounge>, AppError> {
    let lounge = sqlx::query_as::<_, Lounge>("SELECT * FROM lounges WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(lounge)
}

/// Locks the lounge row for the rest of the transaction, serializing the
/// slot-conflict check against concurrent inserts for the same lounge.
pub async fn find_by_id_for_update(
    executor: impl PgExecutor<'_>,
    id: Uuid,
) -> Result<Option<Lounge>, AppError> {
    let lounge = sqlx::query_as::<_, Lounge>("SELECT * FROM lounges WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(lounge)
}

/// Slots already held on this lounge and date by confirmed or checked-in
/// bookings. Pending and cancelled bookings never block a slot.
pub async fn taken_slots(
    executor: impl PgExecutor<'_>,
    lounge_id: Uuid,
    date: NaiveDate,
) -> Result<Vec<TimeSlot>, AppError> {
    let rows = sqlx::query_as::<_, (NaiveTime, i32)>(
        "SELECT booking_time, duration_hours FROM bookings \
         WHERE lounge_id = $1 AND booking_date = $2 \
           AND status IN ('confirmed', 'checked_in')",
    )
    .bind(lounge_id)
    .bind(date)
    .fetch_all(executor)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(start, duration)| TimeSlot::new(start, duration))
        .collect())
}
