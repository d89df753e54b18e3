use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::db::events;
use crate::db::events::NewEvent;
use crate::handlers::category_filter;
use crate::models::event::EventResponse;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

#[derive(Deserialize)]
pub struct ListEventsParams {
    pub category: Option<String>,
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<ListEventsParams>,
) -> Result<Response, AppError> {
    let now = Utc::now();
    let category = category_filter(params.category);
    let events = events::list_available(&state.pool, category.as_deref(), now).await?;

    let mut payload: Vec<EventResponse> = Vec::with_capacity(events.len());
    for event in &events {
        let confirmed = events::confirmed_guest_total(&state.pool, event.id).await?;
        payload.push(event.to_response(Some(event.available_spots(confirmed))));
    }

    let total = payload.len();
    Ok(success(
        json!({ "events": payload, "total": total }),
        "Events retrieved successfully",
    ))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = events::find_by_id(&state.pool, event_id)
        .await?
        .filter(|e| e.is_active)
        .ok_or_else(|| AppError::NotFound("Event not found or inactive".to_string()))?;

    let confirmed = events::confirmed_guest_total(&state.pool, event.id).await?;
    let payload = event.to_response(Some(event.available_spots(confirmed)));

    Ok(success(payload, "Event retrieved successfully"))
}

#[derive(Deserialize)]
pub struct EventAvailabilityParams {
    pub guests: Option<i32>,
}

pub async fn check_event_availability(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Query(params): Query<EventAvailabilityParams>,
) -> Result<Response, AppError> {
    let event = events::find_by_id(&state.pool, event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    let guest_count = params.guests.unwrap_or(1);
    if guest_count < 1 {
        return Err(AppError::ValidationError(
            "Guest count must be at least 1".to_string(),
        ));
    }

    let now = Utc::now();
    let confirmed = events::confirmed_guest_total(&state.pool, event.id).await?;

    Ok(success(
        json!({
            "available": event.is_available(confirmed, guest_count, now),
            "available_spots": event.available_spots(confirmed),
            "requested_guests": guest_count,
            "event_date": event.date,
        }),
        "Availability checked",
    ))
}

#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: Decimal,
    pub max_guests: i32,
    pub date: DateTime<Utc>,
    pub duration_hours: Option<i32>,
    pub image_url: Option<String>,
    pub venue_location: Option<String>,
    pub features: Option<String>,
}

pub async fn create_event(
    State(state): State<AppState>,
    Json(req): Json<CreateEventRequest>,
) -> Result<Response, AppError> {
    if req.max_guests < 1 {
        return Err(AppError::ValidationError(
            "max_guests must be at least 1".to_string(),
        ));
    }
    if req.price < Decimal::ZERO {
        return Err(AppError::ValidationError(
            "price cannot be negative".to_string(),
        ));
    }

    let event = events::insert(
        &state.pool,
        NewEvent {
            title: req.title,
            description: req.description,
            category: req.category,
            price: req.price,
            max_guests: req.max_guests,
            date: req.date,
            duration_hours: req.duration_hours.unwrap_or(3),
            image_url: req.image_url,
            venue_location: req.venue_location,
            features: req.features,
        },
    )
    .await?;

    tracing::info!(event_id = %event.id, title = %event.title, "Event created");
    Ok(created(event.to_response(None), "Event created successfully"))
}

#[derive(Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub max_guests: Option<i32>,
    pub date: Option<DateTime<Utc>>,
    pub duration_hours: Option<i32>,
    pub image_url: Option<String>,
    pub venue_location: Option<String>,
    pub features: Option<String>,
    pub is_active: Option<bool>,
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Response, AppError> {
    let mut event = events::find_by_id(&state.pool, event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    if let Some(title) = req.title {
        event.title = title;
    }
    if let Some(description) = req.description {
        event.description = description;
    }
    if let Some(category) = req.category {
        event.category = category;
    }
    if let Some(price) = req.price {
        event.price = price;
    }
    if let Some(max_guests) = req.max_guests {
        event.max_guests = max_guests;
    }
    if let Some(date) = req.date {
        event.date = date;
    }
    if let Some(duration_hours) = req.duration_hours {
        event.duration_hours = duration_hours;
    }
    if let Some(image_url) = req.image_url {
        event.image_url = Some(image_url);
    }
    if let Some(venue_location) = req.venue_location {
        event.venue_location = Some(venue_location);
    }
    if let Some(features) = req.features {
        event.features = Some(features);
    }
    if let Some(is_active) = req.is_active {
        event.is_active = is_active;
    }

    let updated = events::update(&state.pool, &event).await?;
    Ok(success(updated.to_response(None), "Event updated successfully"))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = events::find_by_id(&state.pool, event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    if events::has_bookings(&state.pool, event.id).await? {
        return Err(AppError::ValidationError(
            "Cannot delete event with existing bookings".to_string(),
        ));
    }

    events::delete(&state.pool, event.id).await?;
    tracing::info!(event_id = %event.id, "Event deleted");
    Ok(empty_success("Event deleted successfully"))
}
