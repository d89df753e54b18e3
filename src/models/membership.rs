use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::{pricing, BillingCycle};
use crate::utils::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MembershipTier {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub monthly_price: Decimal,
    pub annual_price: Option<Decimal>,
    pub discount_percentage: Decimal,
    pub priority_booking: bool,
    pub complimentary_drinks: i32,
    pub private_lounge_access: bool,
    pub concierge_service: String,
    pub exclusive_events: bool,
    pub birthday_perks: bool,
    pub transportation_service: bool,
    pub features: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Membership {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tier_id: Uuid,
    pub membership_number: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub billing_cycle: String,
    pub payment_status: String,
    pub last_payment_date: Option<DateTime<Utc>>,
    pub next_payment_date: Option<DateTime<Utc>>,
    pub payment_method: Option<String>,
    pub events_attended: i32,
    pub total_bookings: i32,
    pub total_spent: Decimal,
    pub complimentary_drinks_used: i32,
    pub is_active: bool,
    pub auto_renew: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Membership {
    fn cycle(&self) -> Result<BillingCycle, AppError> {
        BillingCycle::parse(&self.billing_cycle).ok_or_else(|| {
            AppError::ValidationError(format!(
                "Membership {} has unrecognized billing cycle '{}'",
                self.membership_number, self.billing_cycle
            ))
        })
    }

    /// Date-based expiry, independent of the explicit `is_active` flag.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.end_date
    }

    pub fn days_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        if self.is_expired(now) {
            0
        } else {
            (self.end_date - now).num_days()
        }
    }

    /// Extends the membership by one billing period counted from the current
    /// end date, and records the payment.
    pub fn renew(&mut self, now: DateTime<Utc>) -> Result<(), AppError> {
        if !self.is_active {
            return Err(AppError::StateConflict(format!(
                "Membership {} is not active and cannot be renewed",
                self.membership_number
            )));
        }

        self.end_date = self.end_date + Duration::days(self.cycle()?.period_days());
        self.next_payment_date = Some(self.end_date);
        self.last_payment_date = Some(now);
        self.payment_status = "active".to_string();
        self.updated_at = now;
        Ok(())
    }

    /// Terminal cancellation: the membership stays on record but never
    /// reactivates or auto-renews.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), AppError> {
        if !self.is_active {
            return Err(AppError::StateConflict(format!(
                "Membership {} is already inactive",
                self.membership_number
            )));
        }

        self.is_active = false;
        self.auto_renew = false;
        self.payment_status = "cancelled".to_string();
        self.updated_at = now;
        Ok(())
    }

    /// Moves the membership onto `new_tier`. Only an upgrade to a strictly
    /// more expensive tier is permitted.
    pub fn upgrade(
        &mut self,
        current_tier: &MembershipTier,
        new_tier: &MembershipTier,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if new_tier.monthly_price <= current_tier.monthly_price {
            return Err(AppError::ValidationError(
                "Can only upgrade to a higher tier".to_string(),
            ));
        }

        self.tier_id = new_tier.id;
        self.updated_at = now;
        Ok(())
    }

    /// Membership discount on a booking amount. Applied once at
    /// booking-creation time; an inactive or date-expired membership leaves
    /// the amount unchanged.
    pub fn apply_discount(
        &self,
        tier: &MembershipTier,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Decimal {
        if self.is_active && !self.is_expired(now) {
            pricing::apply_discount(amount, tier.discount_percentage)
        } else {
            amount
        }
    }

    pub fn record_booking(&mut self, amount: Decimal, now: DateTime<Utc>) {
        self.total_bookings += 1;
        self.total_spent += amount;
        self.updated_at = now;
    }

    pub fn record_attendance(&mut self, now: DateTime<Utc>) {
        self.events_attended += 1;
        self.updated_at = now;
    }

    pub fn to_response(&self, tier: Option<TierResponse>) -> MembershipResponse {
        MembershipResponse {
            id: self.id,
            user_id: self.user_id,
            tier_id: self.tier_id,
            membership_number: self.membership_number.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            billing_cycle: self.billing_cycle.clone(),
            payment_status: self.payment_status.clone(),
            last_payment_date: self.last_payment_date,
            next_payment_date: self.next_payment_date,
            payment_method: self.payment_method.clone(),
            events_attended: self.events_attended,
            total_bookings: self.total_bookings,
            total_spent: self.total_spent,
            complimentary_drinks_used: self.complimentary_drinks_used,
            is_active: self.is_active,
            auto_renew: self.auto_renew,
            created_at: self.created_at,
            updated_at: self.updated_at,
            tier,
        }
    }
}

impl MembershipTier {
    pub fn to_response(&self) -> TierResponse {
        TierResponse {
            id: self.id,
            name: self.name.clone(),
            slug: self.slug.clone(),
            description: self.description.clone(),
            monthly_price: self.monthly_price,
            annual_price: self.annual_price,
            discount_percentage: self.discount_percentage,
            priority_booking: self.priority_booking,
            complimentary_drinks: self.complimentary_drinks,
            private_lounge_access: self.private_lounge_access,
            concierge_service: self.concierge_service.clone(),
            exclusive_events: self.exclusive_events,
            birthday_perks: self.birthday_perks,
            transportation_service: self.transportation_service,
            features: self.features.clone(),
            is_active: self.is_active,
            sort_order: self.sort_order,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TierResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub monthly_price: Decimal,
    pub annual_price: Option<Decimal>,
    pub discount_percentage: Decimal,
    pub priority_booking: bool,
    pub complimentary_drinks: i32,
    pub private_lounge_access: bool,
    pub concierge_service: String,
    pub exclusive_events: bool,
    pub birthday_perks: bool,
    pub transportation_service: bool,
    pub features: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
}

#[derive(Debug, Serialize)]
pub struct MembershipResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tier_id: Uuid,
    pub membership_number: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub billing_cycle: String,
    pub payment_status: String,
    pub last_payment_date: Option<DateTime<Utc>>,
    pub next_payment_date: Option<DateTime<Utc>>,
    pub payment_method: Option<String>,
    pub events_attended: i32,
    pub total_bookings: i32,
    pub total_spent: Decimal,
    pub complimentary_drinks_used: i32,
    pub is_active: bool,
    pub auto_renew: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<TierResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn sample_tier(slug: &str, monthly_price: Decimal, discount: Decimal) -> MembershipTier {
        MembershipTier {
            id: Uuid::new_v4(),
            name: slug.to_uppercase(),
            slug: slug.to_string(),
            description: None,
            monthly_price,
            annual_price: None,
            discount_percentage: discount,
            priority_booking: false,
            complimentary_drinks: 2,
            private_lounge_access: false,
            concierge_service: "basic".to_string(),
            exclusive_events: false,
            birthday_perks: false,
            transportation_service: false,
            features: None,
            is_active: true,
            sort_order: 0,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn sample_membership(cycle: &str, end_date: DateTime<Utc>) -> Membership {
        Membership {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            tier_id: Uuid::new_v4(),
            membership_number: "EE2025A1B2C3D4".to_string(),
            start_date: now() - Duration::days(10),
            end_date,
            billing_cycle: cycle.to_string(),
            payment_status: "active".to_string(),
            last_payment_date: None,
            next_payment_date: Some(end_date),
            payment_method: None,
            events_attended: 0,
            total_bookings: 0,
            total_spent: dec!(0),
            complimentary_drinks_used: 0,
            is_active: true,
            auto_renew: true,
            created_at: now(),
            updated_at: now(),
        }
    }

    #[test]
    fn test_expiry_is_date_based() {
        let membership = sample_membership("monthly", now() - Duration::days(1));
        assert!(membership.is_expired(now()));
        assert!(membership.is_active);

        let current = sample_membership("monthly", now() + Duration::days(20));
        assert!(!current.is_expired(now()));
        assert_eq!(current.days_until_expiry(now()), 20);
    }

    #[test]
    fn test_renew_extends_from_current_end_date() {
        let end = now() + Duration::days(5);
        let mut membership = sample_membership("monthly", end);
        membership.renew(now()).unwrap();

        assert_eq!(membership.end_date, end + Duration::days(30));
        assert_eq!(membership.next_payment_date, Some(membership.end_date));
        assert_eq!(membership.last_payment_date, Some(now()));
        assert_eq!(membership.payment_status, "active");
    }

    #[test]
    fn test_annual_renew_adds_a_year() {
        let end = now() + Duration::days(5);
        let mut membership = sample_membership("annual", end);
        membership.renew(now()).unwrap();
        assert_eq!(membership.end_date, end + Duration::days(365));
    }

    #[test]
    fn test_cancel_is_terminal() {
        let mut membership = sample_membership("monthly", now() + Duration::days(20));
        membership.cancel(now()).unwrap();

        assert!(!membership.is_active);
        assert!(!membership.auto_renew);
        assert_eq!(membership.payment_status, "cancelled");

        assert!(membership.cancel(now()).is_err());
        assert!(membership.renew(now()).is_err());
    }

    #[test]
    fn test_upgrade_requires_strictly_higher_price() {
        let standard = sample_tier("standard", dec!(99), dec!(10));
        let vip = sample_tier("vip", dec!(199), dec!(20));
        let mut membership = sample_membership("monthly", now() + Duration::days(20));
        membership.tier_id = standard.id;

        membership.upgrade(&standard, &vip, now()).unwrap();
        assert_eq!(membership.tier_id, vip.id);

        // Downgrade and same-price moves are rejected
        let err = membership.upgrade(&vip, &standard, now()).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        let same = sample_tier("vip-2", dec!(199), dec!(20));
        assert!(membership.upgrade(&vip, &same, now()).is_err());
    }

    #[test]
    fn test_discount_only_for_active_unexpired_membership() {
        let tier = sample_tier("vip", dec!(199), dec!(20));

        let active = sample_membership("monthly", now() + Duration::days(20));
        assert_eq!(active.apply_discount(&tier, dec!(1000), now()), dec!(800));

        let expired = sample_membership("monthly", now() - Duration::days(1));
        assert_eq!(expired.apply_discount(&tier, dec!(1000), now()), dec!(1000));

        let mut cancelled = sample_membership("monthly", now() + Duration::days(20));
        cancelled.cancel(now()).unwrap();
        assert_eq!(cancelled.apply_discount(&tier, dec!(1000), now()), dec!(1000));
    }

    #[test]
    fn test_usage_counters() {
        let mut membership = sample_membership("monthly", now() + Duration::days(20));
        membership.record_booking(dec!(300), now());
        membership.record_booking(dec!(450), now());
        membership.record_attendance(now());

        assert_eq!(membership.total_bookings, 2);
        assert_eq!(membership.total_spent, dec!(750));
        assert_eq!(membership.events_attended, 1);
    }
}
