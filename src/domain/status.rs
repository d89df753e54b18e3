use uuid::Uuid;

use crate::utils::error::AppError;

/// Lifecycle of a booking. Stored as plain text in the `status` column,
/// parsed back into this enum before any transition is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    CheckedIn,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::CheckedIn => "checked_in",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "checked_in" => Some(BookingStatus::CheckedIn),
            "cancelled" => Some(BookingStatus::Cancelled),
            "completed" => Some(BookingStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingCycle {
    Monthly,
    Annual,
}

impl BillingCycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Annual => "annual",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "monthly" => Some(BillingCycle::Monthly),
            "annual" => Some(BillingCycle::Annual),
            _ => None,
        }
    }

    /// Length of one billing period in days.
    pub fn period_days(&self) -> i64 {
        match self {
            BillingCycle::Monthly => 30,
            BillingCycle::Annual => 365,
        }
    }
}

/// What a booking reserves. Exactly one of event or lounge; the database
/// enforces the same with a CHECK constraint, this enum enforces it in code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingTarget {
    Event(Uuid),
    Lounge(Uuid),
}

impl BookingTarget {
    pub fn from_ids(event_id: Option<Uuid>, lounge_id: Option<Uuid>) -> Result<Self, AppError> {
        match (event_id, lounge_id) {
            (Some(id), None) => Ok(BookingTarget::Event(id)),
            (None, Some(id)) => Ok(BookingTarget::Lounge(id)),
            (Some(_), Some(_)) => Err(AppError::ValidationError(
                "A booking cannot target both an event and a lounge".to_string(),
            )),
            (None, None) => Err(AppError::ValidationError(
                "Either event_id or lounge_id must be provided".to_string(),
            )),
        }
    }

    pub fn event_id(&self) -> Option<Uuid> {
        match self {
            BookingTarget::Event(id) => Some(*id),
            BookingTarget::Lounge(_) => None,
        }
    }

    pub fn lounge_id(&self) -> Option<Uuid> {
        match self {
            BookingTarget::Lounge(id) => Some(*id),
            BookingTarget::Event(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_status_round_trips() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::CheckedIn,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ] {
            assert_eq!(BookingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(BookingStatus::parse("unknown"), None);
    }

    #[test]
    fn test_billing_cycle_periods() {
        assert_eq!(BillingCycle::Monthly.period_days(), 30);
        assert_eq!(BillingCycle::Annual.period_days(), 365);
        assert_eq!(BillingCycle::parse("annual"), Some(BillingCycle::Annual));
        assert_eq!(BillingCycle::parse("weekly"), None);
    }

    #[test]
    fn test_booking_target_requires_exactly_one_id() {
        let event = Uuid::new_v4();
        let lounge = Uuid::new_v4();

        assert_eq!(
            BookingTarget::from_ids(Some(event), None).unwrap(),
            BookingTarget::Event(event)
        );
        assert_eq!(
            BookingTarget::from_ids(None, Some(lounge)).unwrap(),
            BookingTarget::Lounge(lounge)
        );
        assert!(BookingTarget::from_ids(Some(event), Some(lounge)).is_err());
        assert!(BookingTarget::from_ids(None, None).is_err());
    }
}
