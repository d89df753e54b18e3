//! Pure booking-domain logic: availability checks, pricing, reference
//! generation and status transitions. Nothing in here touches the database;
//! callers load the entities, invoke these functions, and persist the result.

pub mod availability;
pub mod pricing;
pub mod reference;
pub mod status;

pub use availability::TimeSlot;
pub use status::{BillingCycle, BookingStatus, BookingTarget, PaymentStatus};
