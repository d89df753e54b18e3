use rust_decimal::Decimal;

/// Clamps a requested lounge duration into the lounge's bookable range.
pub fn clamp_duration(duration_hours: i32, minimum_hours: i32, maximum_hours: i32) -> i32 {
    duration_hours.clamp(minimum_hours, maximum_hours)
}

/// Total cost of a lounge booking: hourly rate times the clamped duration.
pub fn lounge_total_cost(
    hourly_rate: Decimal,
    duration_hours: i32,
    minimum_hours: i32,
    maximum_hours: i32,
) -> Decimal {
    let hours = clamp_duration(duration_hours, minimum_hours, maximum_hours);
    hourly_rate * Decimal::from(hours)
}

/// Total cost of an event booking: per-guest price times party size.
pub fn event_total_cost(price: Decimal, guest_count: i32) -> Decimal {
    price * Decimal::from(guest_count)
}

/// Applies a percentage membership discount. Callers apply this exactly once,
/// at booking-creation time; the stored total is never re-discounted.
pub fn apply_discount(amount: Decimal, discount_percentage: Decimal) -> Decimal {
    amount - amount * discount_percentage / Decimal::from(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_duration_clamped_into_lounge_range() {
        assert_eq!(clamp_duration(1, 2, 6), 2);
        assert_eq!(clamp_duration(4, 2, 6), 4);
        assert_eq!(clamp_duration(10, 2, 6), 6);
    }

    #[test]
    fn test_lounge_cost_clamps_both_ends() {
        // 150/hr lounge, 2..=6 bookable hours
        assert_eq!(lounge_total_cost(dec!(150), 1, 2, 6), dec!(300));
        assert_eq!(lounge_total_cost(dec!(150), 10, 2, 6), dec!(900));
        assert_eq!(lounge_total_cost(dec!(150), 4, 2, 6), dec!(600));
    }

    #[test]
    fn test_lounge_cost_monotonic_in_clamped_duration() {
        let mut previous = lounge_total_cost(dec!(150), 0, 2, 6);
        for d in 1..12 {
            let current = lounge_total_cost(dec!(150), d, 2, 6);
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn test_event_total_scales_with_guests() {
        assert_eq!(event_total_cost(dec!(250), 1), dec!(250));
        assert_eq!(event_total_cost(dec!(250), 4), dec!(1000));
    }

    #[test]
    fn test_discount_applied_as_percentage() {
        assert_eq!(apply_discount(dec!(1000), dec!(20)), dec!(800));
        assert_eq!(apply_discount(dec!(1000), dec!(0)), dec!(1000));
        assert_eq!(apply_discount(dec!(300), dec!(10)), dec!(270));
    }
}
