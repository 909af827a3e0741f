//! Storage boundary for event records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use skillbridge_core::{DomainResult, EventId, UserId};

use crate::event::{Event, EventPatch};
use crate::query::EventQuery;

/// Persistence boundary for events and their embedded attendance lists.
///
/// The event document is the concurrency arena: `register_attendee` must
/// perform its not-present / not-full check and the append as one atomic
/// operation keyed by event id. Two concurrent registrations for a single
/// remaining slot must never both succeed. Everything else is plain CRUD.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert(&self, event: Event) -> DomainResult<Event>;

    async fn find(&self, id: EventId) -> DomainResult<Option<Event>>;

    /// Filtered, sorted, paginated listing. Returns the page of events and
    /// the total match count (pre-pagination).
    async fn list(&self, query: &EventQuery) -> DomainResult<(Vec<Event>, u64)>;

    /// Apply a partial update. Returns the updated record, or `None` if the
    /// event does not exist.
    async fn update(
        &self,
        id: EventId,
        patch: EventPatch,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<Event>>;

    /// Remove the event and its attendance list together. Returns whether
    /// anything was deleted.
    async fn delete(&self, id: EventId) -> DomainResult<bool>;

    /// Atomically append a confirmed attendance entry.
    ///
    /// Fails with `NotFound`, `AlreadyRegistered` (non-cancelled entry
    /// present) or `EventFull` (confirmed count at capacity). On success
    /// returns the updated event.
    async fn register_attendee(
        &self,
        id: EventId,
        user: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Event>;

    /// Remove the caller's attendance entry.
    ///
    /// Fails with `NotFound` or `NotRegistered`. On success returns the
    /// updated event.
    async fn remove_attendee(&self, id: EventId, user: UserId) -> DomainResult<Event>;

    /// Events hosted by `user`, date ascending.
    async fn hosted_by(&self, user: UserId) -> DomainResult<Vec<Event>>;

    /// Events where `user` holds a non-cancelled attendance entry, date
    /// ascending.
    async fn registered_for(&self, user: UserId) -> DomainResult<Vec<Event>>;
}
