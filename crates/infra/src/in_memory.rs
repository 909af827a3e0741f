//! In-memory store implementations.
//!
//! Intended for tests/dev. Not optimized for performance: listings scan the
//! whole map. Correctness matters though — the event map's write lock is the
//! serialization point for registration, so the capacity check and the
//! append happen atomically with respect to concurrent registrations.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use skillbridge_core::{DomainError, DomainResult, EventId, UserId};
use skillbridge_events::{
    Attendance, AttendanceStatus, Event, EventPatch, EventQuery, EventStore, SortOrder,
};
use skillbridge_identity::{ProfileUpdate, User, UserStore};

fn poisoned() -> DomainError {
    DomainError::store("lock poisoned")
}

/// In-memory user store.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: User) -> DomainResult<User> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        if users.values().any(|u| u.email == user.email) {
            return Err(DomainError::DuplicateEmail);
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> DomainResult<Option<User>> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn update_profile(
        &self,
        id: UserId,
        update: ProfileUpdate,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<User>> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        Ok(users.get_mut(&id).map(|user| {
            update.apply(user, now);
            user.clone()
        }))
    }
}

/// In-memory event store.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: RwLock<HashMap<EventId, Event>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn insert(&self, event: Event) -> DomainResult<Event> {
        let mut events = self.events.write().map_err(|_| poisoned())?;
        events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn find(&self, id: EventId) -> DomainResult<Option<Event>> {
        let events = self.events.read().map_err(|_| poisoned())?;
        Ok(events.get(&id).cloned())
    }

    async fn list(&self, query: &EventQuery) -> DomainResult<(Vec<Event>, u64)> {
        let events = self.events.read().map_err(|_| poisoned())?;

        let mut matched: Vec<Event> = events
            .values()
            .filter(|e| query.filter.matches(e))
            .cloned()
            .collect();

        matched.sort_by(|a, b| {
            let ord = query.sort.compare(a, b);
            match query.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });

        let total = matched.len() as u64;
        let page: Vec<Event> = matched
            .into_iter()
            .skip(query.page.offset() as usize)
            .take(query.page.limit as usize)
            .collect();

        Ok((page, total))
    }

    async fn update(
        &self,
        id: EventId,
        patch: EventPatch,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<Event>> {
        let mut events = self.events.write().map_err(|_| poisoned())?;
        Ok(events.get_mut(&id).map(|event| {
            patch.apply(event, now);
            event.clone()
        }))
    }

    async fn delete(&self, id: EventId) -> DomainResult<bool> {
        let mut events = self.events.write().map_err(|_| poisoned())?;
        Ok(events.remove(&id).is_some())
    }

    async fn register_attendee(
        &self,
        id: EventId,
        user: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Event> {
        // Write lock held across check and append: the admission decision
        // and the mutation are one atomic step per the store contract.
        let mut events = self.events.write().map_err(|_| poisoned())?;
        let event = events.get_mut(&id).ok_or(DomainError::NotFound)?;

        if event.has_active_registration(user) {
            return Err(DomainError::AlreadyRegistered);
        }
        if event.is_full() {
            return Err(DomainError::EventFull);
        }

        // A lingering cancelled entry is dropped so the user appears once.
        event.attendees.retain(|a| a.user_id != user);
        event.attendees.push(Attendance {
            user_id: user,
            status: AttendanceStatus::Confirmed,
            registered_at: now,
        });
        event.updated_at = now;

        Ok(event.clone())
    }

    async fn remove_attendee(&self, id: EventId, user: UserId) -> DomainResult<Event> {
        let mut events = self.events.write().map_err(|_| poisoned())?;
        let event = events.get_mut(&id).ok_or(DomainError::NotFound)?;

        let before = event.attendees.len();
        event.attendees.retain(|a| a.user_id != user);
        if event.attendees.len() == before {
            return Err(DomainError::NotRegistered);
        }
        event.updated_at = Utc::now();

        Ok(event.clone())
    }

    async fn hosted_by(&self, user: UserId) -> DomainResult<Vec<Event>> {
        let events = self.events.read().map_err(|_| poisoned())?;
        let mut hosted: Vec<Event> = events.values().filter(|e| e.host == user).cloned().collect();
        hosted.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(hosted)
    }

    async fn registered_for(&self, user: UserId) -> DomainResult<Vec<Event>> {
        let events = self.events.read().map_err(|_| poisoned())?;
        let mut registered: Vec<Event> = events
            .values()
            .filter(|e| e.has_active_registration(user))
            .cloned()
            .collect();
        registered.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(registered)
    }
}
