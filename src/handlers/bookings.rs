use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{bookings, events, lounges, memberships, users};
use crate::db::bookings::NewBooking;
use crate::domain::availability::parse_time_hhmm;
use crate::domain::{BookingTarget, TimeSlot};
use crate::models::event::EventResponse;
use crate::models::lounge::LoungeResponse;
use crate::models::Booking;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub guest_count: i32,
    pub special_requests: Option<String>,
    pub event_id: Option<Uuid>,
    pub lounge_id: Option<Uuid>,
    pub booking_date: NaiveDate,
    pub booking_time: String,
    pub duration_hours: Option<i32>,
    pub user_id: Option<Uuid>,
}

pub async fn create_booking(
    State(state): State<AppState>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Response, AppError> {
    let now = Utc::now();

    if req.guest_count < 1 {
        return Err(AppError::ValidationError(
            "Guest count must be at least 1".to_string(),
        ));
    }
    if req.booking_date <= now.date_naive() {
        return Err(AppError::ValidationError(
            "Booking date must be in the future".to_string(),
        ));
    }

    let target = BookingTarget::from_ids(req.event_id, req.lounge_id)?;
    let booking_time = parse_time_hhmm(&req.booking_time)?;
    let duration_hours = req.duration_hours.unwrap_or(2);
    if duration_hours < 1 {
        return Err(AppError::ValidationError(
            "Duration must be at least 1 hour".to_string(),
        ));
    }

    let booking = bookings::create(
        &state.pool,
        &NewBooking {
            guest_name: req.guest_name,
            guest_email: req.guest_email,
            guest_phone: req.guest_phone,
            guest_count: req.guest_count,
            special_requests: req.special_requests,
            target,
            booking_date: req.booking_date,
            booking_time,
            duration_hours,
            user_id: req.user_id,
        },
        now,
    )
    .await?;

    tracing::info!(
        reference = %booking.booking_reference,
        total = %booking.total_amount,
        "Booking created"
    );
    Ok(created(
        booking.to_response(None, None),
        "Booking created successfully",
    ))
}

/// Loads the event or lounge a booking points at, for embedding into the
/// booking payload.
async fn expand_target(
    pool: &PgPool,
    booking: &Booking,
) -> Result<(Option<EventResponse>, Option<LoungeResponse>), AppError> {
    match booking.target()? {
        BookingTarget::Event(id) => {
            let event = events::find_by_id(pool, id)
                .await?
                .map(|e| e.to_response(None));
            Ok((event, None))
        }
        BookingTarget::Lounge(id) => {
            let lounge = lounges::find_by_id(pool, id)
                .await?
                .map(|l| l.to_response(None));
            Ok((None, lounge))
        }
    }
}

pub async fn get_booking(
    State(state): State<AppState>,
    Path(booking_reference): Path<String>,
) -> Result<Response, AppError> {
    let booking = bookings::find_by_reference(&state.pool, &booking_reference)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    let (event, lounge) = expand_target(&state.pool, &booking).await?;
    Ok(success(
        booking.to_response(event, lounge),
        "Booking retrieved successfully",
    ))
}

#[derive(Deserialize, Default)]
pub struct ConfirmBookingRequest {
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
}

/// Capacity is consumed when a booking confirms, not when it is created, so
/// the admission check must run again here: lock the target row, count only
/// the other confirmed bookings, and reject if this party no longer fits.
async fn ensure_capacity_to_confirm(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    booking: &Booking,
) -> Result<(), AppError> {
    match booking.target()? {
        BookingTarget::Event(event_id) => {
            let event = events::find_by_id_for_update(&mut **tx, event_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

            let confirmed = events::confirmed_guest_total(&mut **tx, event_id).await?;
            if !event.can_accommodate(confirmed, booking.guest_count) {
                return Err(AppError::CapacityExceeded(
                    "Event no longer has room for this booking".to_string(),
                ));
            }
        }
        BookingTarget::Lounge(lounge_id) => {
            let lounge = lounges::find_by_id_for_update(&mut **tx, lounge_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Lounge not found".to_string()))?;

            let taken = lounges::taken_slots(&mut **tx, lounge_id, booking.booking_date).await?;
            let requested = TimeSlot::new(booking.booking_time, booking.duration_hours);
            if !lounge.is_available(requested, &taken) {
                return Err(AppError::CapacityExceeded(
                    "Lounge slot is no longer available for this booking".to_string(),
                ));
            }
        }
    }

    Ok(())
}

pub async fn confirm_booking(
    State(state): State<AppState>,
    Path(booking_reference): Path<String>,
    body: Option<Json<ConfirmBookingRequest>>,
) -> Result<Response, AppError> {
    let now = Utc::now();
    let Json(req) = body.unwrap_or_default();

    let mut tx = state.pool.begin().await?;

    let mut booking = bookings::find_by_reference_for_update(&mut *tx, &booking_reference)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    ensure_capacity_to_confirm(&mut tx, &booking).await?;
    booking.confirm(req.payment_method, req.payment_reference, now)?;
    let booking = bookings::update(&mut *tx, &booking).await?;

    // Membership usage counters for registered guests
    if let Some(user_id) = booking.user_id {
        if let Some(mut membership) =
            memberships::find_active_for_user(&mut *tx, user_id, now).await?
        {
            membership.record_booking(booking.total_amount, now);
            memberships::update(&mut *tx, &membership).await?;
        }
    }

    tx.commit().await?;

    tracing::info!(reference = %booking.booking_reference, "Booking confirmed");
    Ok(success(
        booking.to_response(None, None),
        "Booking confirmed successfully",
    ))
}

pub async fn checkin_booking(
    State(state): State<AppState>,
    Path(booking_reference): Path<String>,
) -> Result<Response, AppError> {
    let now = Utc::now();
    let mut tx = state.pool.begin().await?;

    let mut booking = bookings::find_by_reference_for_update(&mut *tx, &booking_reference)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    booking.check_in(now)?;
    let booking = bookings::update(&mut *tx, &booking).await?;

    if let Some(user_id) = booking.user_id {
        if let Some(mut membership) =
            memberships::find_active_for_user(&mut *tx, user_id, now).await?
        {
            membership.record_attendance(now);
            memberships::update(&mut *tx, &membership).await?;
        }
    }

    tx.commit().await?;

    tracing::info!(reference = %booking.booking_reference, "Guest checked in");
    Ok(success(
        booking.to_response(None, None),
        "Guest checked in successfully",
    ))
}

pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(booking_reference): Path<String>,
) -> Result<Response, AppError> {
    let now = Utc::now();
    let mut tx = state.pool.begin().await?;

    let mut booking = bookings::find_by_reference_for_update(&mut *tx, &booking_reference)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    booking.cancel(now)?;
    let booking = bookings::update(&mut *tx, &booking).await?;

    tx.commit().await?;

    tracing::info!(reference = %booking.booking_reference, "Booking cancelled");
    Ok(success(
        booking.to_response(None, None),
        "Booking cancelled successfully",
    ))
}

pub async fn get_user_bookings(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Response, AppError> {
    users::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let user_bookings = bookings::list_for_user(&state.pool, user_id).await?;

    let mut payload = Vec::with_capacity(user_bookings.len());
    for booking in &user_bookings {
        let (event, lounge) = expand_target(&state.pool, booking).await?;
        payload.push(booking.to_response(event, lounge));
    }

    let total = payload.len();
    Ok(success(
        json!({ "bookings": payload, "total": total }),
        "Bookings retrieved successfully",
    ))
}
