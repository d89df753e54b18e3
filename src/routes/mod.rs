use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, security_headers};
use crate::handlers::{bookings, events, health_check, lounges, memberships};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health_check))
        // Events
        .route("/events", get(events::list_events).post(events::create_event))
        .route(
            "/events/:event_id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route(
            "/events/:event_id/availability",
            get(events::check_event_availability),
        )
        // Lounges
        .route("/lounges", get(lounges::list_lounges))
        .route("/lounges/:lounge_id", get(lounges::get_lounge))
        .route(
            "/availability/lounges",
            get(lounges::check_lounge_availability),
        )
        // Bookings
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings/:booking_reference", get(bookings::get_booking))
        .route(
            "/bookings/:booking_reference/confirm",
            post(bookings::confirm_booking),
        )
        .route(
            "/bookings/:booking_reference/checkin",
            post(bookings::checkin_booking),
        )
        .route(
            "/bookings/:booking_reference/cancel",
            post(bookings::cancel_booking),
        )
        .route("/users/:user_id/bookings", get(bookings::get_user_bookings))
        // Memberships
        .route("/membership-tiers", get(memberships::get_membership_tiers))
        .route(
            "/membership-tiers/:tier_slug",
            get(memberships::get_membership_tier),
        )
        .route("/memberships", post(memberships::create_membership))
        .route(
            "/memberships/:membership_id/renew",
            post(memberships::renew_membership),
        )
        .route(
            "/memberships/:membership_id/cancel",
            post(memberships::cancel_membership),
        )
        .route(
            "/memberships/:membership_id/upgrade",
            post(memberships::upgrade_membership),
        )
        .route(
            "/users/:user_id/membership",
            get(memberships::get_user_membership),
        )
        .route(
            "/users/:user_id/membership/benefits",
            get(memberships::get_membership_benefits),
        );

    Router::new()
        .nest("/api", api)
        .layer(axum::middleware::from_fn(security_headers))
        .layer(create_cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
