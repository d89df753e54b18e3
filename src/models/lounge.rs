use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::availability::{lounge_slot_is_free, TimeSlot};
use crate::domain::pricing;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Lounge {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub capacity: i32,
    pub hourly_rate: Decimal,
    pub minimum_hours: i32,
    pub maximum_hours: i32,
    pub features: Option<String>,
    pub amenities: Option<String>,
    pub image_urls: Option<String>,
    pub is_active: bool,
    pub operating_hours_start: String,
    pub operating_hours_end: String,
    pub floor_level: Option<String>,
    pub max_standing: Option<i32>,
    pub max_seated: Option<i32>,
    pub has_private_bar: bool,
    pub has_sound_system: bool,
    pub has_lighting_control: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lounge {
    /// Whether the requested slot is clear of every already-taken slot on the
    /// same date. `taken` holds the confirmed and checked-in bookings only.
    pub fn is_available(&self, requested: TimeSlot, taken: &[TimeSlot]) -> bool {
        lounge_slot_is_free(requested, taken)
    }

    /// Cost of booking this lounge, with the duration clamped into
    /// `[minimum_hours, maximum_hours]`.
    pub fn total_cost(&self, duration_hours: i32) -> Decimal {
        pricing::lounge_total_cost(
            self.hourly_rate,
            duration_hours,
            self.minimum_hours,
            self.maximum_hours,
        )
    }

    pub fn to_response(&self, total_cost: Option<Decimal>) -> LoungeResponse {
        LoungeResponse {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            capacity: self.capacity,
            hourly_rate: self.hourly_rate,
            minimum_hours: self.minimum_hours,
            maximum_hours: self.maximum_hours,
            features: self.features.clone(),
            amenities: self.amenities.clone(),
            image_urls: self.image_urls.clone(),
            is_active: self.is_active,
            operating_hours_start: self.operating_hours_start.clone(),
            operating_hours_end: self.operating_hours_end.clone(),
            floor_level: self.floor_level.clone(),
            max_standing: self.max_standing,
            max_seated: self.max_seated,
            has_private_bar: self.has_private_bar,
            has_sound_system: self.has_sound_system,
            has_lighting_control: self.has_lighting_control,
            total_cost,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoungeResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub capacity: i32,
    pub hourly_rate: Decimal,
    pub minimum_hours: i32,
    pub maximum_hours: i32,
    pub features: Option<String>,
    pub amenities: Option<String>,
    pub image_urls: Option<String>,
    pub is_active: bool,
    pub operating_hours_start: String,
    pub operating_hours_end: String,
    pub floor_level: Option<String>,
    pub max_standing: Option<i32>,
    pub max_seated: Option<i32>,
    pub has_private_bar: bool,
    pub has_sound_system: bool,
    pub has_lighting_control: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone};
    use rust_decimal_macros::dec;

    fn sample_lounge() -> Lounge {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        Lounge {
            id: Uuid::new_v4(),
            name: "Velvet Room".to_string(),
            description: "Private lounge with skyline bar".to_string(),
            category: "vip".to_string(),
            capacity: 20,
            hourly_rate: dec!(150),
            minimum_hours: 2,
            maximum_hours: 6,
            features: None,
            amenities: None,
            image_urls: None,
            is_active: true,
            operating_hours_start: "18:00".to_string(),
            operating_hours_end: "02:00".to_string(),
            floor_level: Some("21".to_string()),
            max_standing: Some(30),
            max_seated: Some(20),
            has_private_bar: true,
            has_sound_system: true,
            has_lighting_control: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_total_cost_clamps_duration() {
        let lounge = sample_lounge();
        assert_eq!(lounge.total_cost(1), dec!(300));
        assert_eq!(lounge.total_cost(4), dec!(600));
        assert_eq!(lounge.total_cost(10), dec!(900));
    }

    #[test]
    fn test_slot_availability_against_taken_slots() {
        let lounge = sample_lounge();
        let taken = vec![TimeSlot::new(t(18, 0), 2)];

        // Ends exactly when an existing booking starts
        assert!(lounge.is_available(TimeSlot::new(t(16, 0), 2), &taken));
        // Starts exactly when the existing booking ends
        assert!(lounge.is_available(TimeSlot::new(t(20, 0), 2), &taken));
        assert!(!lounge.is_available(TimeSlot::new(t(19, 0), 2), &taken));
    }

    #[test]
    fn test_slot_stays_open_until_a_booking_confirms() {
        let lounge = sample_lounge();
        let slot = TimeSlot::new(t(20, 0), 2);

        // Pending bookings never appear among the taken slots, so two
        // identical requests both look free before either is paid.
        assert!(lounge.is_available(slot, &[]));
        assert!(lounge.is_available(slot, &[]));

        // Once the first confirms, its slot is taken and the second must be
        // turned away when it tries to confirm.
        let taken = vec![slot];
        assert!(!lounge.is_available(slot, &taken));
    }
}
