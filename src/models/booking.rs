use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::{BookingStatus, BookingTarget, PaymentStatus};
use crate::models::event::EventResponse;
use crate::models::lounge::LoungeResponse;
use crate::utils::error::AppError;

/// Minimum notice for a cancellation, measured against the scheduled start.
const CANCELLATION_NOTICE_HOURS: i64 = 24;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub booking_reference: String,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub guest_count: i32,
    pub special_requests: Option<String>,
    pub event_id: Option<Uuid>,
    pub lounge_id: Option<Uuid>,
    pub booking_date: NaiveDate,
    pub booking_time: NaiveTime,
    pub duration_hours: i32,
    pub total_amount: Decimal,
    pub payment_status: String,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
    pub status: String,
    pub qr_code: Option<String>,
    pub check_in_time: Option<DateTime<Utc>>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn target(&self) -> Result<BookingTarget, AppError> {
        BookingTarget::from_ids(self.event_id, self.lounge_id)
    }

    fn current_status(&self) -> Result<BookingStatus, AppError> {
        BookingStatus::parse(&self.status).ok_or_else(|| {
            AppError::StateConflict(format!(
                "Booking {} has unrecognized status '{}'",
                self.booking_reference, self.status
            ))
        })
    }

    /// Scheduled start as a naive UTC instant, combined from the stored date
    /// and time-of-day columns.
    pub fn scheduled_at(&self) -> NaiveDateTime {
        NaiveDateTime::new(self.booking_date, self.booking_time)
    }

    /// Payload encoded into the entry QR code at confirmation time.
    pub fn qr_payload(&self) -> String {
        format!(
            "ELEVATE_BOOKING:{}:{}:{}:{}",
            self.booking_reference,
            self.guest_name,
            self.booking_date.format("%Y-%m-%d"),
            self.booking_time.format("%H:%M"),
        )
    }

    /// Confirms a pending booking: records the (simulated) payment and
    /// generates the QR code. Any other starting state is rejected.
    pub fn confirm(
        &mut self,
        payment_method: Option<String>,
        payment_reference: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if self.current_status()? != BookingStatus::Pending {
            return Err(AppError::StateConflict(format!(
                "Booking {} cannot be confirmed from status '{}'",
                self.booking_reference, self.status
            )));
        }

        self.payment_status = PaymentStatus::Paid.as_str().to_string();
        self.payment_method = payment_method.or_else(|| Some("stripe".to_string()));
        self.payment_reference = payment_reference;
        self.status = BookingStatus::Confirmed.as_str().to_string();
        self.qr_code = Some(self.qr_payload());
        self.updated_at = now;
        Ok(())
    }

    /// Checks the guest in. Only a confirmed booking that has not already
    /// been checked in qualifies.
    pub fn check_in(&mut self, now: DateTime<Utc>) -> Result<(), AppError> {
        if self.current_status()? != BookingStatus::Confirmed {
            return Err(AppError::StateConflict(format!(
                "Booking {} must be confirmed before check-in",
                self.booking_reference
            )));
        }
        if self.check_in_time.is_some() {
            return Err(AppError::StateConflict(format!(
                "Guest already checked in for booking {}",
                self.booking_reference
            )));
        }

        self.check_in_time = Some(now);
        self.status = BookingStatus::CheckedIn.as_str().to_string();
        self.updated_at = now;
        Ok(())
    }

    /// Cancels the booking. Allowed from pending or confirmed, and only with
    /// more than 24 hours of notice before the scheduled start.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), AppError> {
        match self.current_status()? {
            BookingStatus::Pending | BookingStatus::Confirmed => {}
            _ => {
                return Err(AppError::StateConflict(format!(
                    "Booking {} cannot be cancelled from status '{}'",
                    self.booking_reference, self.status
                )));
            }
        }

        let deadline = self.scheduled_at() - chrono::Duration::hours(CANCELLATION_NOTICE_HOURS);
        if now.naive_utc() >= deadline {
            return Err(AppError::StateConflict(format!(
                "Booking {} can only be cancelled more than {} hours before the scheduled time",
                self.booking_reference, CANCELLATION_NOTICE_HOURS
            )));
        }

        self.status = BookingStatus::Cancelled.as_str().to_string();
        self.updated_at = now;
        Ok(())
    }

    pub fn to_response(
        &self,
        event: Option<EventResponse>,
        lounge: Option<LoungeResponse>,
    ) -> BookingResponse {
        BookingResponse {
            id: self.id,
            booking_reference: self.booking_reference.clone(),
            guest_name: self.guest_name.clone(),
            guest_email: self.guest_email.clone(),
            guest_phone: self.guest_phone.clone(),
            guest_count: self.guest_count,
            special_requests: self.special_requests.clone(),
            event_id: self.event_id,
            lounge_id: self.lounge_id,
            booking_date: self.booking_date,
            booking_time: self.booking_time.format("%H:%M").to_string(),
            duration_hours: self.duration_hours,
            total_amount: self.total_amount,
            payment_status: self.payment_status.clone(),
            payment_method: self.payment_method.clone(),
            status: self.status.clone(),
            qr_code: self.qr_code.clone(),
            check_in_time: self.check_in_time,
            user_id: self.user_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            event,
            lounge,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub booking_reference: String,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub guest_count: i32,
    pub special_requests: Option<String>,
    pub event_id: Option<Uuid>,
    pub lounge_id: Option<Uuid>,
    pub booking_date: NaiveDate,
    pub booking_time: String,
    pub duration_hours: i32,
    pub total_amount: Decimal,
    pub payment_status: String,
    pub payment_method: Option<String>,
    pub status: String,
    pub qr_code: Option<String>,
    pub check_in_time: Option<DateTime<Utc>>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<EventResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lounge: Option<LoungeResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn sample_booking(scheduled: NaiveDateTime) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            booking_reference: "EE20250601A1B2C3D4".to_string(),
            guest_name: "Ava Laurent".to_string(),
            guest_email: "ava@example.com".to_string(),
            guest_phone: None,
            guest_count: 2,
            special_requests: None,
            event_id: None,
            lounge_id: Some(Uuid::new_v4()),
            booking_date: scheduled.date(),
            booking_time: scheduled.time(),
            duration_hours: 2,
            total_amount: dec!(300),
            payment_status: "pending".to_string(),
            payment_method: None,
            payment_reference: None,
            status: "pending".to_string(),
            qr_code: None,
            check_in_time: None,
            user_id: None,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn scheduled_in(hours: i64) -> NaiveDateTime {
        (now() + Duration::hours(hours)).naive_utc()
    }

    #[test]
    fn test_confirm_generates_qr_payload() {
        let mut booking = sample_booking(scheduled_in(48));
        booking.confirm(Some("stripe".to_string()), None, now()).unwrap();

        assert_eq!(booking.status, "confirmed");
        assert_eq!(booking.payment_status, "paid");
        let qr = booking.qr_code.as_deref().unwrap();
        assert!(qr.starts_with("ELEVATE_BOOKING:EE20250601A1B2C3D4:Ava Laurent:"));
        assert!(qr.ends_with(&format!(
            "{}:{}",
            booking.booking_date.format("%Y-%m-%d"),
            booking.booking_time.format("%H:%M")
        )));
    }

    #[test]
    fn test_confirm_is_rejected_twice() {
        let mut booking = sample_booking(scheduled_in(48));
        booking.confirm(None, None, now()).unwrap();

        let err = booking.confirm(None, None, now()).unwrap_err();
        assert!(matches!(err, AppError::StateConflict(_)));
        assert_eq!(booking.status, "confirmed");
    }

    #[test]
    fn test_check_in_requires_confirmed() {
        let mut booking = sample_booking(scheduled_in(48));

        let err = booking.check_in(now()).unwrap_err();
        assert!(matches!(err, AppError::StateConflict(_)));
        assert_eq!(booking.status, "pending");
        assert!(booking.check_in_time.is_none());
    }

    #[test]
    fn test_check_in_happy_path_then_double_check_in_fails() {
        let mut booking = sample_booking(scheduled_in(48));
        booking.confirm(None, None, now()).unwrap();
        booking.check_in(now()).unwrap();

        assert_eq!(booking.status, "checked_in");
        assert_eq!(booking.check_in_time, Some(now()));

        let err = booking.check_in(now()).unwrap_err();
        assert!(matches!(err, AppError::StateConflict(_)));
    }

    #[test]
    fn test_cancel_with_enough_notice() {
        let mut booking = sample_booking(scheduled_in(25));
        booking.cancel(now()).unwrap();
        assert_eq!(booking.status, "cancelled");
    }

    #[test]
    fn test_cancel_inside_notice_window_fails() {
        let mut booking = sample_booking(scheduled_in(23));
        let err = booking.cancel(now()).unwrap_err();
        assert!(matches!(err, AppError::StateConflict(_)));
        assert_eq!(booking.status, "pending");
    }

    #[test]
    fn test_cancel_at_exact_deadline_fails() {
        let mut booking = sample_booking(scheduled_in(24));
        assert!(booking.cancel(now()).is_err());
    }

    #[test]
    fn test_cancel_after_check_in_fails() {
        let mut booking = sample_booking(scheduled_in(48));
        booking.confirm(None, None, now()).unwrap();
        booking.check_in(now()).unwrap();

        let err = booking.cancel(now()).unwrap_err();
        assert!(matches!(err, AppError::StateConflict(_)));
        assert_eq!(booking.status, "checked_in");
    }

    #[test]
    fn test_completed_booking_cannot_be_cancelled() {
        let mut booking = sample_booking(scheduled_in(48));
        booking.status = "completed".to_string();
        assert!(booking.cancel(now()).is_err());
        assert_eq!(booking.status, "completed");
    }

    #[test]
    fn test_target_resolves_tagged_variant() {
        let booking = sample_booking(scheduled_in(48));
        assert!(matches!(
            booking.target().unwrap(),
            BookingTarget::Lounge(_)
        ));
    }
}
