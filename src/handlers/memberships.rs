use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::db::{memberships, users};
use crate::domain::BillingCycle;
use crate::models::membership::TierResponse;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

pub async fn get_membership_tiers(State(state): State<AppState>) -> Result<Response, AppError> {
    let tiers = memberships::list_active_tiers(&state.pool).await?;
    let payload: Vec<TierResponse> = tiers.iter().map(|t| t.to_response()).collect();
    let total = payload.len();

    Ok(success(
        json!({ "tiers": payload, "total": total }),
        "Membership tiers retrieved successfully",
    ))
}

pub async fn get_membership_tier(
    State(state): State<AppState>,
    Path(tier_slug): Path<String>,
) -> Result<Response, AppError> {
    let tier = memberships::find_tier_by_slug(&state.pool, &tier_slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Membership tier not found".to_string()))?;

    Ok(success(tier.to_response(), "Membership tier retrieved successfully"))
}

#[derive(Deserialize)]
pub struct CreateMembershipRequest {
    pub user_id: Uuid,
    pub tier_id: Uuid,
    pub billing_cycle: String,
    pub payment_method: Option<String>,
}

pub async fn create_membership(
    State(state): State<AppState>,
    Json(req): Json<CreateMembershipRequest>,
) -> Result<Response, AppError> {
    let now = Utc::now();

    let billing_cycle = BillingCycle::parse(&req.billing_cycle).ok_or_else(|| {
        AppError::ValidationError(format!(
            "Invalid billing cycle '{}', expected 'monthly' or 'annual'",
            req.billing_cycle
        ))
    })?;

    users::find_by_id(&state.pool, req.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let tier = memberships::find_tier_by_id(&state.pool, req.tier_id)
        .await?
        .filter(|t| t.is_active)
        .ok_or_else(|| AppError::NotFound("Membership tier not found or inactive".to_string()))?;

    if memberships::find_active_for_user(&state.pool, req.user_id, now)
        .await?
        .is_some()
    {
        return Err(AppError::StateConflict(
            "User already has an active membership".to_string(),
        ));
    }

    let membership = memberships::create(
        &state.pool,
        req.user_id,
        req.tier_id,
        billing_cycle,
        req.payment_method,
        now,
    )
    .await?;

    tracing::info!(
        number = %membership.membership_number,
        tier = %tier.slug,
        "Membership created"
    );
    Ok(created(
        membership.to_response(Some(tier.to_response())),
        "Membership created successfully",
    ))
}

pub async fn get_user_membership(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Response, AppError> {
    users::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let now = Utc::now();
    match memberships::find_active_for_user(&state.pool, user_id, now).await? {
        Some(membership) => {
            let tier = memberships::find_tier_by_id(&state.pool, membership.tier_id)
                .await?
                .map(|t| t.to_response());
            Ok(success(
                membership.to_response(tier),
                "Membership retrieved successfully",
            ))
        }
        None => Ok(success(
            json!({ "membership": null }),
            "User has no active membership",
        )),
    }
}

#[derive(Deserialize, Default)]
pub struct RenewMembershipRequest {
    pub payment_method: Option<String>,
}

pub async fn renew_membership(
    State(state): State<AppState>,
    Path(membership_id): Path<Uuid>,
    body: Option<Json<RenewMembershipRequest>>,
) -> Result<Response, AppError> {
    let now = Utc::now();
    let Json(req) = body.unwrap_or_default();

    let mut membership = memberships::find_by_id(&state.pool, membership_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Membership not found".to_string()))?;

    membership.renew(now)?;
    if req.payment_method.is_some() {
        membership.payment_method = req.payment_method;
    }

    let membership = memberships::update(&state.pool, &membership).await?;

    tracing::info!(number = %membership.membership_number, "Membership renewed");
    Ok(success(
        membership.to_response(None),
        "Membership renewed successfully",
    ))
}

pub async fn cancel_membership(
    State(state): State<AppState>,
    Path(membership_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let now = Utc::now();

    let mut membership = memberships::find_by_id(&state.pool, membership_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Membership not found".to_string()))?;

    membership.cancel(now)?;
    let membership = memberships::update(&state.pool, &membership).await?;

    tracing::info!(number = %membership.membership_number, "Membership cancelled");
    Ok(success(
        membership.to_response(None),
        "Membership cancelled successfully",
    ))
}

#[derive(Deserialize)]
pub struct UpgradeMembershipRequest {
    pub new_tier_id: Uuid,
    pub payment_method: Option<String>,
}

pub async fn upgrade_membership(
    State(state): State<AppState>,
    Path(membership_id): Path<Uuid>,
    Json(req): Json<UpgradeMembershipRequest>,
) -> Result<Response, AppError> {
    let now = Utc::now();

    let mut membership = memberships::find_by_id(&state.pool, membership_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Membership not found".to_string()))?;

    let current_tier = memberships::find_tier_by_id(&state.pool, membership.tier_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Current membership tier not found".to_string()))?;

    let new_tier = memberships::find_tier_by_id(&state.pool, req.new_tier_id)
        .await?
        .filter(|t| t.is_active)
        .ok_or_else(|| {
            AppError::NotFound("New membership tier not found or inactive".to_string())
        })?;

    membership.upgrade(&current_tier, &new_tier, now)?;
    if req.payment_method.is_some() {
        membership.payment_method = req.payment_method;
    }

    let membership = memberships::update(&state.pool, &membership).await?;

    tracing::info!(
        number = %membership.membership_number,
        from = %current_tier.slug,
        to = %new_tier.slug,
        "Membership upgraded"
    );
    Ok(success(
        membership.to_response(Some(new_tier.to_response())),
        format!(
            "Membership upgraded from {} to {}",
            current_tier.name, new_tier.name
        ),
    ))
}

pub async fn get_membership_benefits(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Response, AppError> {
    users::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let now = Utc::now();
    let Some(membership) = memberships::find_active_for_user(&state.pool, user_id, now).await?
    else {
        return Ok(success(
            json!({ "has_membership": false, "benefits": null }),
            "User has no active membership",
        ));
    };

    let tier = memberships::find_tier_by_id(&state.pool, membership.tier_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Membership tier not found".to_string()))?;

    Ok(success(
        json!({
            "has_membership": true,
            "tier": tier.to_response(),
            "membership_details": {
                "membership_number": membership.membership_number,
                "start_date": membership.start_date,
                "end_date": membership.end_date,
                "days_until_expiry": membership.days_until_expiry(now),
                "billing_cycle": membership.billing_cycle,
                "payment_status": membership.payment_status,
            },
            "usage_stats": {
                "events_attended": membership.events_attended,
                "total_bookings": membership.total_bookings,
                "total_spent": membership.total_spent,
                "complimentary_drinks_used": membership.complimentary_drinks_used,
            },
            "active_benefits": {
                "discount_percentage": tier.discount_percentage,
                "priority_booking": tier.priority_booking,
                "complimentary_drinks": tier.complimentary_drinks,
                "private_lounge_access": tier.private_lounge_access,
                "concierge_service": tier.concierge_service,
                "exclusive_events": tier.exclusive_events,
                "birthday_perks": tier.birthday_perks,
                "transportation_service": tier.transportation_service,
            },
        }),
        "Membership benefits retrieved successfully",
    ))
}
