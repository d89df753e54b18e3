use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::db::{events, lounges, memberships};
use crate::domain::{pricing, reference, BookingTarget, TimeSlot};
use crate::models::Booking;
use crate::utils::error::AppError;

/// Attempts before giving up on a booking-reference collision. The random
/// suffix makes a second collision vanishingly unlikely.
const REFERENCE_ATTEMPTS: u32 = 3;

pub struct NewBooking {
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub guest_count: i32,
    pub special_requests: Option<String>,
    pub target: BookingTarget,
    pub booking_date: NaiveDate,
    pub booking_time: NaiveTime,
    pub duration_hours: i32,
    pub user_id: Option<Uuid>,
}

pub async fn find_by_reference(
    executor: impl PgExecutor<'_>,
    booking_reference: &str,
) -> Result<Option<Booking>, AppError> {
    let booking =
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE booking_reference = $1")
            .bind(booking_reference)
            .fetch_optional(executor)
            .await?;

    Ok(booking)
}

/// Locks the booking row for the rest of the transaction. Every state
/// transition loads through this, so a racing confirm and cancel serialize
/// instead of overwriting each other.
pub async fn find_by_reference_for_update(
    executor: impl PgExecutor<'_>,
    booking_reference: &str,
) -> Result<Option<Booking>, AppError> {
    let booking = sqlx::query_as::<_, Booking>(
        "SELECT * FROM bookings WHERE booking_reference = $1 FOR UPDATE",
    )
    .bind(booking_reference)
    .fetch_optional(executor)
    .await?;

    Ok(booking)
}

pub async fn list_for_user(
    executor: impl PgExecutor<'_>,
    user_id: Uuid,
) -> Result<Vec<Booking>, AppError> {
    let bookings = sqlx::query_as::<_, Booking>(
        "SELECT * FROM bookings WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;

    Ok(bookings)
}

/// Persists the mutable part of a booking after a state transition.
pub async fn update(executor: impl PgExecutor<'_>, booking: &Booking) -> Result<Booking, AppError> {
    let updated = sqlx::query_as::<_, Booking>(
        "UPDATE bookings SET \
         payment_status = $2, payment_method = $3, payment_reference = $4, \
         status = $5, qr_code = $6, check_in_time = $7, updated_at = $8 \
         WHERE id = $1 \
         RETURNING *",
    )
    .bind(booking.id)
    .bind(&booking.payment_status)
    .bind(&booking.payment_method)
    .bind(&booking.payment_reference)
    .bind(&booking.status)
    .bind(&booking.qr_code)
    .bind(booking.check_in_time)
    .bind(booking.updated_at)
    .fetch_one(executor)
    .await?;

    Ok(updated)
}

/// Creates a booking in `pending` state. The availability check and the
/// insert run inside one transaction that first locks the target event or
/// lounge row. A pending booking does not yet consume capacity; that happens
/// at confirmation, which takes the same locks and re-runs the admission
/// check before flipping the status.
///
/// A duplicate booking reference rolls the transaction back and the whole
/// attempt is retried with a fresh reference.
pub async fn create(
    pool: &PgPool,
    new: &NewBooking,
    now: DateTime<Utc>,
) -> Result<Booking, AppError> {
    let mut last_error = None;

    for attempt in 0..REFERENCE_ATTEMPTS {
        let booking_reference = reference::booking_reference(now);

        match try_create(pool, new, &booking_reference, now).await {
            Err(AppError::DatabaseError(e)) if is_reference_collision(&e) => {
                tracing::warn!(
                    attempt,
                    reference = %booking_reference,
                    "Booking reference collision, retrying with a fresh reference"
                );
                last_error = Some(AppError::DatabaseError(e));
            }
            other => return other,
        }
    }

    Err(last_error.unwrap_or_else(|| {
        AppError::ValidationError("Could not allocate a booking reference".to_string())
    }))
}

async fn try_create(
    pool: &PgPool,
    new: &NewBooking,
    booking_reference: &str,
    now: DateTime<Utc>,
) -> Result<Booking, AppError> {
    let mut tx = pool.begin().await?;

    let total_amount = match new.target {
        BookingTarget::Event(event_id) => {
            let event = events::find_by_id_for_update(&mut *tx, event_id)
                .await?
                .filter(|e| e.is_active)
                .ok_or_else(|| AppError::NotFound("Event not found or inactive".to_string()))?;

            let confirmed = events::confirmed_guest_total(&mut *tx, event_id).await?;
            if !event.is_available(confirmed, new.guest_count, now) {
                return Err(AppError::CapacityExceeded(
                    "Event not available for requested guest count".to_string(),
                ));
            }

            pricing::event_total_cost(event.price, new.guest_count)
        }
        BookingTarget::Lounge(lounge_id) => {
            let lounge = lounges::find_by_id_for_update(&mut *tx, lounge_id)
                .await?
                .filter(|l| l.is_active)
                .ok_or_else(|| AppError::NotFound("Lounge not found or inactive".to_string()))?;

            let taken = lounges::taken_slots(&mut *tx, lounge_id, new.booking_date).await?;
            let requested = TimeSlot::new(new.booking_time, new.duration_hours);
            if !lounge.is_available(requested, &taken) {
                return Err(AppError::CapacityExceeded(
                    "Lounge not available for requested time slot".to_string(),
                ));
            }

            lounge.total_cost(new.duration_hours)
        }
    };

    // Membership discount, applied exactly once at creation time
    let total_amount = match new.user_id {
        Some(user_id) => apply_membership_discount(&mut tx, user_id, total_amount, now).await?,
        None => total_amount,
    };

    let booking = sqlx::query_as::<_, Booking>(
        "INSERT INTO bookings \
         (booking_reference, guest_name, guest_email, guest_phone, guest_count, \
          special_requests, event_id, lounge_id, booking_date, booking_time, \
          duration_hours, total_amount, user_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
         RETURNING *",
    )
    .bind(booking_reference)
    .bind(&new.guest_name)
    .bind(&new.guest_email)
    .bind(&new.guest_phone)
    .bind(new.guest_count)
    .bind(&new.special_requests)
    .bind(new.target.event_id())
    .bind(new.target.lounge_id())
    .bind(new.booking_date)
    .bind(new.booking_time)
    .bind(new.duration_hours)
    .bind(total_amount)
    .bind(new.user_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(booking)
}

async fn apply_membership_discount(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: Uuid,
    amount: Decimal,
    now: DateTime<Utc>,
) -> Result<Decimal, AppError> {
    let Some(membership) = memberships::find_active_for_user(&mut **tx, user_id, now).await? else {
        return Ok(amount);
    };
    let Some(tier) = memberships::find_tier_by_id(&mut **tx, membership.tier_id).await? else {
        return Ok(amount);
    };

    Ok(membership.apply_discount(&tier, amount, now))
}

fn is_reference_collision(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .map(|db| db.is_unique_violation() && db.constraint() == Some("bookings_booking_reference_key"))
        .unwrap_or(false)
}
