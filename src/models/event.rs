use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::availability;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
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
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Spots left given the confirmed guest total loaded for this event.
    pub fn available_spots(&self, confirmed_guests: i64) -> i32 {
        availability::available_spots(self.max_guests, confirmed_guests)
    }

    /// Room for the whole party next to the already-confirmed guests. Run
    /// whenever a booking is about to consume capacity, notably at
    /// confirmation time.
    pub fn can_accommodate(&self, confirmed_guests: i64, guest_count: i32) -> bool {
        availability::can_accommodate(self.max_guests, confirmed_guests, guest_count)
    }

    pub fn is_available(&self, confirmed_guests: i64, guest_count: i32, now: DateTime<Utc>) -> bool {
        availability::event_is_available(
            self.max_guests,
            confirmed_guests,
            self.date,
            guest_count,
            now,
        )
    }

    pub fn to_response(&self, available_spots: Option<i32>) -> EventResponse {
        EventResponse {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            price: self.price,
            max_guests: self.max_guests,
            date: self.date,
            duration_hours: self.duration_hours,
            image_url: self.image_url.clone(),
            venue_location: self.venue_location.clone(),
            features: self.features.clone(),
            is_active: self.is_active,
            available_spots,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub id: Uuid,
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
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_spots: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn sample_event(max_guests: i32, date: DateTime<Utc>) -> Event {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        Event {
            id: Uuid::new_v4(),
            title: "Rooftop Jazz Night".to_string(),
            description: "Live quartet with skyline views".to_string(),
            category: "premium".to_string(),
            price: dec!(250),
            max_guests,
            date,
            duration_hours: 3,
            image_url: None,
            venue_location: Some("Rooftop Terrace".to_string()),
            features: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_fresh_event_has_full_capacity() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let event = sample_event(40, now + Duration::days(14));

        assert_eq!(event.available_spots(0), 40);
        assert!(event.is_available(0, 5, now));
    }

    #[test]
    fn test_confirmed_guests_reduce_spots() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let event = sample_event(40, now + Duration::days(14));

        assert_eq!(event.available_spots(5), 35);
        assert!(event.is_available(5, 35, now));
        assert!(!event.is_available(5, 36, now));
    }

    #[test]
    fn test_pending_bookings_do_not_block_each_other_but_confirmation_does() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let event = sample_event(40, now + Duration::days(14));

        // Two full-capacity parties can both sit pending, since pending
        // bookings consume no capacity.
        assert!(event.is_available(0, 40, now));
        assert!(event.is_available(0, 40, now));

        // Confirming the first consumes the room; the second must fail the
        // admission check at its own confirmation.
        assert!(event.can_accommodate(0, 40));
        assert!(!event.can_accommodate(40, 40));
        assert!(!event.can_accommodate(40, 1));
    }

    #[test]
    fn test_past_event_is_never_available() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let event = sample_event(40, now - Duration::hours(1));

        assert_eq!(event.available_spots(0), 40);
        assert!(!event.is_available(0, 1, now));
    }
}
