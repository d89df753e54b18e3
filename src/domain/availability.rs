use chrono::{DateTime, NaiveTime, Timelike, Utc};

use crate::utils::error::AppError;

/// Half-open time interval `[start, end)` measured in minutes since midnight.
/// A slot that runs past midnight keeps accumulating past 1440 so that it
/// stays comparable against other slots on the same booking date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    start_min: i64,
    end_min: i64,
}

impl TimeSlot {
    pub fn new(start: NaiveTime, duration_hours: i32) -> Self {
        let start_min = i64::from(start.hour()) * 60 + i64::from(start.minute());
        Self {
            start_min,
            end_min: start_min + i64::from(duration_hours) * 60,
        }
    }

    /// Two half-open intervals overlap iff `a1 < b2 AND b1 < a2`.
    /// Back-to-back slots (one ending exactly when the other starts) do not.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start_min < other.end_min && other.start_min < self.end_min
    }
}

/// Parses a wall-clock time in the `HH:MM` form used by booking requests.
pub fn parse_time_hhmm(s: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| AppError::ValidationError(format!("Invalid time '{s}', expected HH:MM")))
}

/// Spots still open on an event: capacity minus confirmed guests, never
/// negative.
pub fn available_spots(max_guests: i32, confirmed_guests: i64) -> i32 {
    let remaining = i64::from(max_guests) - confirmed_guests;
    remaining.max(0) as i32
}

/// Whether a party of `guest_count` still fits next to the already-confirmed
/// guests. This is the admission check run when a booking consumes capacity.
pub fn can_accommodate(max_guests: i32, confirmed_guests: i64, guest_count: i32) -> bool {
    available_spots(max_guests, confirmed_guests) >= guest_count
}

/// An event accepts a booking only while it still lies in the future and has
/// room for the whole party.
pub fn event_is_available(
    max_guests: i32,
    confirmed_guests: i64,
    event_date: DateTime<Utc>,
    guest_count: i32,
    now: DateTime<Utc>,
) -> bool {
    can_accommodate(max_guests, confirmed_guests, guest_count) && event_date > now
}

/// A lounge slot is free when it overlaps none of the already-taken slots on
/// the same date. Callers pass only bookings with status confirmed or
/// checked_in; pending and cancelled ones never block a slot.
pub fn lounge_slot_is_free(requested: TimeSlot, taken: &[TimeSlot]) -> bool {
    !taken.iter().any(|slot| slot.overlaps(&requested))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_available_spots_never_negative() {
        assert_eq!(available_spots(40, 0), 40);
        assert_eq!(available_spots(40, 5), 35);
        assert_eq!(available_spots(40, 40), 0);
        assert_eq!(available_spots(40, 55), 0);
    }

    #[test]
    fn test_available_spots_non_increasing() {
        let mut previous = available_spots(40, 0);
        for confirmed in 1..50 {
            let current = available_spots(40, confirmed);
            assert!(current <= previous);
            previous = current;
        }
    }

    #[test]
    fn test_can_accommodate_tracks_confirmed_total() {
        assert!(can_accommodate(40, 0, 40));
        assert!(can_accommodate(40, 35, 5));
        assert!(!can_accommodate(40, 36, 5));
        assert!(!can_accommodate(40, 40, 1));
    }

    #[test]
    fn test_event_availability_needs_future_date_and_room() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let future = now + Duration::days(7);
        let past = now - Duration::days(1);

        assert!(event_is_available(40, 0, future, 5, now));
        assert!(!event_is_available(40, 36, future, 5, now));
        assert!(!event_is_available(40, 0, past, 5, now));
        // Exactly at capacity still fits
        assert!(event_is_available(40, 35, future, 5, now));
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let a = TimeSlot::new(t(18, 0), 3);
        let b = TimeSlot::new(t(19, 0), 2);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_back_to_back_slots_do_not_conflict() {
        // One booking ends 20:00, the next starts 20:00
        let first = TimeSlot::new(t(18, 0), 2);
        let second = TimeSlot::new(t(20, 0), 2);
        assert!(!first.overlaps(&second));
        assert!(!second.overlaps(&first));
    }

    #[test]
    fn test_containment_counts_as_overlap() {
        let outer = TimeSlot::new(t(18, 0), 6);
        let inner = TimeSlot::new(t(20, 0), 1);
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn test_slot_past_midnight_still_conflicts() {
        // 23:00 + 3h runs until 02:00 next morning; a 23:30 request collides
        let late = TimeSlot::new(t(23, 0), 3);
        let request = TimeSlot::new(t(23, 30), 1);
        assert!(late.overlaps(&request));
    }

    #[test]
    fn test_lounge_slot_is_free() {
        let taken = vec![TimeSlot::new(t(18, 0), 2), TimeSlot::new(t(22, 0), 2)];
        assert!(lounge_slot_is_free(TimeSlot::new(t(20, 0), 2), &taken));
        assert!(!lounge_slot_is_free(TimeSlot::new(t(19, 0), 2), &taken));
        assert!(!lounge_slot_is_free(TimeSlot::new(t(21, 0), 2), &taken));
        assert!(lounge_slot_is_free(TimeSlot::new(t(20, 0), 2), &[]));
    }

    #[test]
    fn test_parse_time_hhmm() {
        assert_eq!(parse_time_hhmm("19:00").unwrap(), t(19, 0));
        assert_eq!(parse_time_hhmm("09:30:00").unwrap(), t(9, 30));
        assert!(parse_time_hhmm("7pm").is_err());
        assert!(parse_time_hhmm("25:00").is_err());
    }
}
