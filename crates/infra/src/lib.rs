//! `skillbridge-infra` — store implementations behind the domain traits.
//!
//! The in-memory backend is the default (dev/test); the Postgres backend is
//! compiled in with the `postgres` feature and selected at runtime by the
//! API wiring.

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use in_memory::{InMemoryEventStore, InMemoryUserStore};
#[cfg(feature = "postgres")]
pub use postgres::{PostgresEventStore, PostgresUserStore};
