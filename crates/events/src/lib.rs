//! `skillbridge-events` — event lifecycle and registration core.
//!
//! Owns the event record with its embedded attendance list, the listing
//! query model, the [`EventStore`] boundary, and the [`EventService`] that
//! enforces ownership and capacity invariants.

pub mod event;
pub mod query;
pub mod service;
pub mod store;

pub use event::{
    Attendance, AttendanceStatus, Category, Event, EventPatch, NewEvent, DEFAULT_IMAGE,
    DEFAULT_LOCATION,
};
pub use query::{EventFilter, EventQuery, PageInfo, Pagination, PriceFilter, SortField, SortOrder};
pub use service::{AttendeeView, EventService, EventView, UserEvents};
pub use store::EventStore;
