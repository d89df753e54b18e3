//! Query layer over PostgreSQL. Every function takes a `PgExecutor`, so the
//! same query runs against the shared pool or inside a caller-owned
//! transaction; multi-step writes (booking creation, state transitions with
//! membership counters) are committed or rolled back at the handler boundary.

pub mod bookings;
pub mod events;
pub mod lounges;
pub mod memberships;
pub mod users;
