//! Event lifecycle operations: create / list / get / update / delete and
//! the registration state transitions.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use skillbridge_core::{DomainError, DomainResult, EventId, UserId};
use skillbridge_identity::{UserStore, UserSummary};

use crate::event::{
    Attendance, AttendanceStatus, Category, Event, EventPatch, NewEvent, DEFAULT_IMAGE,
    DEFAULT_LOCATION,
};
use crate::query::{EventQuery, PageInfo};
use crate::store::EventStore;

/// Client-facing event representation with the host (and optionally the
/// attendee list) resolved to display identities. Never carries credential
/// material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventView {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub price: f64,
    #[serde(rename = "type")]
    pub category: Category,
    pub skills: Vec<String>,
    pub image: String,
    pub max_attendees: u32,
    pub location: String,
    pub host: UserSummary,
    pub attendees: Vec<AttendeeView>,
    pub attendee_count: usize,
    pub is_full: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Attendance entry with the attendee resolved to a display identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendeeView {
    pub user: UserSummary,
    pub status: AttendanceStatus,
    pub registered_at: DateTime<Utc>,
}

/// Dashboard view: events hosted by a user and events they attend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEvents {
    pub hosted: Vec<EventView>,
    pub registered: Vec<EventView>,
}

/// Enforces ownership rules and registration invariants over an injected
/// [`EventStore`], cross-referencing the [`UserStore`] for display data.
pub struct EventService {
    events: Arc<dyn EventStore>,
    users: Arc<dyn UserStore>,
}

impl EventService {
    pub fn new(events: Arc<dyn EventStore>, users: Arc<dyn UserStore>) -> Self {
        Self { events, users }
    }

    /// Create an event with the caller as host.
    ///
    /// Past-dated events are rejected here, not left to clients.
    pub async fn create_event(&self, host: UserId, input: NewEvent) -> DomainResult<EventView> {
        let title = required_text(input.title, "title")?;
        let description = required_text(input.description, "description")?;
        let max_attendees = positive_capacity(input.max_attendees)?;
        let price = valid_price(input.price.unwrap_or(0.0))?;

        let now = Utc::now();
        let date = future_date(input.date, now)?;

        let event = Event {
            id: EventId::new(),
            title,
            description,
            date,
            price,
            category: input.category,
            skills: trim_tags(input.skills),
            image: input.image.filter(|i| !i.is_empty()).unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
            max_attendees,
            host,
            attendees: Vec::new(),
            location: input
                .location
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            created_at: now,
            updated_at: now,
        };

        let event = self.events.insert(event).await?;
        tracing::info!(event_id = %event.id, host = %host, "event created");

        self.view(event, HostDetail::Brief).await
    }

    /// Filtered, sorted, paginated listing with hosts resolved.
    pub async fn list_events(
        &self,
        query: &EventQuery,
    ) -> DomainResult<(Vec<EventView>, PageInfo)> {
        let (events, total) = self.events.list(query).await?;
        let views = self.views(events).await?;
        Ok((views, PageInfo::new(total, query.page)))
    }

    /// Single event with host bio and attendee identities resolved.
    pub async fn get_event(&self, id: EventId) -> DomainResult<EventView> {
        let event = self.events.find(id).await?.ok_or(DomainError::NotFound)?;
        self.view(event, HostDetail::WithBio).await
    }

    /// Partial update, host only.
    ///
    /// Patched fields obey the same rules as creation; a host cannot update
    /// an event into a state creation would have rejected.
    pub async fn update_event(
        &self,
        caller: UserId,
        id: EventId,
        patch: EventPatch,
    ) -> DomainResult<EventView> {
        self.ensure_host(caller, id).await?;

        let patch = EventPatch {
            title: patch.title.map(|t| required_text(t, "title")).transpose()?,
            description: patch
                .description
                .map(|d| required_text(d, "description"))
                .transpose()?,
            date: patch.date.map(|d| future_date(d, Utc::now())).transpose()?,
            price: patch.price.map(valid_price).transpose()?,
            category: patch.category,
            skills: patch.skills.map(trim_tags),
            image: patch.image,
            max_attendees: patch.max_attendees.map(positive_capacity).transpose()?,
            location: patch.location,
        };

        let event = self
            .events
            .update(id, patch, Utc::now())
            .await?
            .ok_or(DomainError::NotFound)?;

        self.view(event, HostDetail::Brief).await
    }

    /// Delete, host only. The attendance list goes with the event.
    pub async fn delete_event(&self, caller: UserId, id: EventId) -> DomainResult<()> {
        self.ensure_host(caller, id).await?;

        if !self.events.delete(id).await? {
            return Err(DomainError::NotFound);
        }
        tracing::info!(event_id = %id, "event deleted");
        Ok(())
    }

    /// First-come-first-served registration against fixed capacity.
    ///
    /// The admission check runs inside the store's serialized update; this
    /// method never reads-then-writes the attendance list itself.
    pub async fn register(&self, user: UserId, id: EventId) -> DomainResult<EventView> {
        let event = self.events.register_attendee(id, user, Utc::now()).await?;
        tracing::info!(event_id = %id, user = %user, "registration confirmed");
        self.view(event, HostDetail::Brief).await
    }

    /// Cancel the caller's registration, freeing the slot for others.
    pub async fn cancel_registration(&self, user: UserId, id: EventId) -> DomainResult<EventView> {
        let event = self.events.remove_attendee(id, user).await?;
        tracing::info!(event_id = %id, user = %user, "registration cancelled");
        self.view(event, HostDetail::Brief).await
    }

    /// Hosted + registered events for a dashboard.
    ///
    /// Store failures degrade to empty lists instead of propagating, so a
    /// flaky store never blanks the whole dashboard.
    pub async fn user_events(&self, user: UserId) -> UserEvents {
        let hosted = match self.events.hosted_by(user).await {
            Ok(events) => self.views(events).await.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(user = %user, error = %e, "failed to load hosted events");
                Vec::new()
            }
        };

        let registered = match self.events.registered_for(user).await {
            Ok(events) => self.views(events).await.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(user = %user, error = %e, "failed to load registered events");
                Vec::new()
            }
        };

        UserEvents { hosted, registered }
    }

    async fn ensure_host(&self, caller: UserId, id: EventId) -> DomainResult<()> {
        let event = self.events.find(id).await?.ok_or(DomainError::NotFound)?;
        if event.host != caller {
            return Err(DomainError::Forbidden);
        }
        Ok(())
    }

    async fn view(&self, event: Event, detail: HostDetail) -> DomainResult<EventView> {
        let host = self
            .users
            .find_by_id(event.host)
            .await?
            .ok_or_else(|| DomainError::store(format!("host missing for event {}", event.id)))?;

        let host = match detail {
            HostDetail::Brief => host.summary(),
            HostDetail::WithBio => host.summary_with_bio(),
        };

        let attendees = self.attendee_views(&event.attendees).await?;
        Ok(assemble_view(event, host, attendees))
    }

    async fn views(&self, events: Vec<Event>) -> DomainResult<Vec<EventView>> {
        // Hosts repeat across a page; resolve each user once.
        let mut cache: HashMap<UserId, UserSummary> = HashMap::new();
        let mut views = Vec::with_capacity(events.len());

        for event in events {
            let host = match cache.get(&event.host) {
                Some(summary) => summary.clone(),
                None => {
                    let user = self.users.find_by_id(event.host).await?.ok_or_else(|| {
                        DomainError::store(format!("host missing for event {}", event.id))
                    })?;
                    let summary = user.summary();
                    cache.insert(event.host, summary.clone());
                    summary
                }
            };

            let attendees = self.attendee_views(&event.attendees).await?;
            views.push(assemble_view(event, host, attendees));
        }

        Ok(views)
    }

    async fn attendee_views(&self, attendees: &[Attendance]) -> DomainResult<Vec<AttendeeView>> {
        let mut views = Vec::with_capacity(attendees.len());
        for attendance in attendees {
            // An attendee account that vanished is skipped, not fatal.
            let Some(user) = self.users.find_by_id(attendance.user_id).await? else {
                continue;
            };
            views.push(AttendeeView {
                user: user.summary(),
                status: attendance.status,
                registered_at: attendance.registered_at,
            });
        }
        Ok(views)
    }
}

enum HostDetail {
    Brief,
    WithBio,
}

fn assemble_view(event: Event, host: UserSummary, attendees: Vec<AttendeeView>) -> EventView {
    let confirmed = event.confirmed_count();
    EventView {
        id: event.id,
        title: event.title,
        description: event.description,
        date: event.date,
        price: event.price,
        category: event.category,
        skills: event.skills,
        image: event.image,
        max_attendees: event.max_attendees,
        location: event.location,
        host,
        attendee_count: confirmed,
        is_full: confirmed >= event.max_attendees as usize,
        attendees,
        created_at: event.created_at,
        updated_at: event.updated_at,
    }
}

fn trim_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn required_text(value: String, field: &str) -> DomainResult<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(value)
}

fn valid_price(price: f64) -> DomainResult<f64> {
    if !price.is_finite() || price < 0.0 {
        return Err(DomainError::validation("price must be zero or positive"));
    }
    Ok(price)
}

fn positive_capacity(max_attendees: u32) -> DomainResult<u32> {
    if max_attendees < 1 {
        return Err(DomainError::validation(
            "maximum attendees must be a positive integer",
        ));
    }
    Ok(max_attendees)
}

fn future_date(date: DateTime<Utc>, now: DateTime<Utc>) -> DomainResult<DateTime<Utc>> {
    if date < now {
        return Err(DomainError::validation("event date must be in the future"));
    }
    Ok(date)
}
