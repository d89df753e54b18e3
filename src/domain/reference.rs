use chrono::{DateTime, Datelike, Utc};
use uuid::Uuid;

/// Human-facing booking reference: `EE` + UTC date + 8 uppercase hex chars.
/// Collisions are caught by the unique column constraint; callers retry on a
/// duplicate-key rejection.
pub fn booking_reference(now: DateTime<Utc>) -> String {
    format!("EE{}{}", now.format("%Y%m%d"), random_suffix())
}

/// Membership number: `EE` + current year + 8 uppercase hex chars.
pub fn membership_number(now: DateTime<Utc>) -> String {
    format!("EE{}{}", now.year(), random_suffix())
}

fn random_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 15, 10, 30, 0).unwrap()
    }

    #[test]
    fn test_booking_reference_format() {
        let reference = booking_reference(fixed_now());
        assert_eq!(reference.len(), 2 + 8 + 8);
        assert!(reference.starts_with("EE20250315"));
        let suffix = &reference[10..];
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn test_membership_number_format() {
        let number = membership_number(fixed_now());
        assert_eq!(number.len(), 2 + 4 + 8);
        assert!(number.starts_with("EE2025"));
        let suffix = &number[6..];
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn test_no_collisions_in_ten_thousand_references() {
        let now = fixed_now();
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(booking_reference(now)));
        }
    }

    #[test]
    fn test_no_collisions_in_ten_thousand_membership_numbers() {
        let now = fixed_now();
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(membership_number(now)));
        }
    }
}
