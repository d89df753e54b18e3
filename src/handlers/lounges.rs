use axum::extract::{Path, Query, State};
use axum::response::Response;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::db::lounges;
use crate::domain::availability::parse_time_hhmm;
use crate::domain::TimeSlot;
use crate::handlers::category_filter;
use crate::models::lounge::LoungeResponse;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

#[derive(Deserialize)]
pub struct ListLoungesParams {
    pub category: Option<String>,
}

pub async fn list_lounges(
    State(state): State<AppState>,
    Query(params): Query<ListLoungesParams>,
) -> Result<Response, AppError> {
    let category = category_filter(params.category);
    let lounges = lounges::list_active(&state.pool, category.as_deref()).await?;

    let payload: Vec<LoungeResponse> = lounges.iter().map(|l| l.to_response(None)).collect();
    let total = payload.len();

    Ok(success(
        json!({ "lounges": payload, "total": total }),
        "Lounges retrieved successfully",
    ))
}

pub async fn get_lounge(
    State(state): State<AppState>,
    Path(lounge_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let lounge = lounges::find_by_id(&state.pool, lounge_id)
        .await?
        .filter(|l| l.is_active)
        .ok_or_else(|| AppError::NotFound("Lounge not found or inactive".to_string()))?;

    Ok(success(lounge.to_response(None), "Lounge retrieved successfully"))
}

#[derive(Deserialize)]
pub struct LoungeAvailabilityParams {
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub duration: Option<i32>,
    pub category: Option<String>,
}

/// Lists the lounges still free for the requested slot, each annotated with
/// the cost of booking it for the requested duration.
pub async fn check_lounge_availability(
    State(state): State<AppState>,
    Query(params): Query<LoungeAvailabilityParams>,
) -> Result<Response, AppError> {
    let (date, time) = match (params.date, params.time) {
        (Some(date), Some(time)) => (date, time),
        _ => {
            return Err(AppError::ValidationError(
                "Date and time parameters are required".to_string(),
            ));
        }
    };

    let start_time = parse_time_hhmm(&time)?;
    let duration = params.duration.unwrap_or(2);
    if duration < 1 {
        return Err(AppError::ValidationError(
            "Duration must be at least 1 hour".to_string(),
        ));
    }

    let requested = TimeSlot::new(start_time, duration);
    let category = category_filter(params.category);
    let lounges_list = lounges::list_active(&state.pool, category.as_deref()).await?;

    let mut available: Vec<LoungeResponse> = Vec::new();
    for lounge in &lounges_list {
        let taken = lounges::taken_slots(&state.pool, lounge.id, date).await?;
        if lounge.is_available(requested, &taken) {
            available.push(lounge.to_response(Some(lounge.total_cost(duration))));
        }
    }

    Ok(success(
        json!({
            "available_lounges": available,
            "date": date,
            "time": time,
            "duration": duration,
        }),
        "Lounge availability checked",
    ))
}
