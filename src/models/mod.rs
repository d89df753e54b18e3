pub mod booking;
pub mod event;
pub mod lounge;
pub mod membership;
pub mod user;

pub use booking::Booking;
pub use event::Event;
pub use lounge::Lounge;
pub use membership::{Membership, MembershipTier};
pub use user::User;
