use axum::response::Response;
use serde::Serialize;

use crate::utils::response::success;

pub mod bookings;
pub mod events;
pub mod lounges;
pub mod memberships;

/// Normalizes a `?category=` query value; empty and `all` mean no filter.
pub(crate) fn category_filter(category: Option<String>) -> Option<String> {
    category.filter(|c| !c.is_empty() && c != "all")
}

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "elevate-api",
    };

    success(payload, "Health check successful")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_filter_drops_empty_and_all() {
        assert_eq!(category_filter(None), None);
        assert_eq!(category_filter(Some(String::new())), None);
        assert_eq!(category_filter(Some("all".to_string())), None);
        assert_eq!(
            category_filter(Some("vip".to_string())),
            Some("vip".to_string())
        );
    }
}
