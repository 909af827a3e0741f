//! Event record with embedded attendance sub-records.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use skillbridge_core::{DomainError, EventId, UserId};

/// Placeholder artwork used when a creator supplies no image.
pub const DEFAULT_IMAGE: &str = "https://source.unsplash.com/random/800x600?event";

/// Default location for events without one.
pub const DEFAULT_LOCATION: &str = "Online";

/// Fixed event category enumeration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Workshop,
    Meetup,
    Course,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Workshop => "workshop",
            Category::Meetup => "meetup",
            Category::Course => "course",
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "workshop" => Ok(Category::Workshop),
            "meetup" => Ok(Category::Meetup),
            "course" => Ok(Category::Course),
            other => Err(DomainError::validation(format!(
                "unknown event type '{other}': must be one of workshop, meetup, course"
            ))),
        }
    }
}

/// Registration state of a single attendance entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Confirmed,
    Pending,
    Cancelled,
}

/// Per-attendee sub-record embedded in an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendance {
    pub user_id: UserId,
    pub status: AttendanceStatus,
    pub registered_at: DateTime<Utc>,
}

/// Persisted event record.
///
/// # Invariants
/// - Exactly one host, referencing an existing user.
/// - A given user appears at most once in `attendees`.
/// - Confirmed attendee count never exceeds `max_attendees`; enforced by the
///   store's serialized register operation, not by continuous validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
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
    pub host: UserId,
    pub attendees: Vec<Attendance>,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Number of confirmed attendees (derived, never stored).
    pub fn confirmed_count(&self) -> usize {
        self.attendees
            .iter()
            .filter(|a| a.status == AttendanceStatus::Confirmed)
            .count()
    }

    pub fn is_full(&self) -> bool {
        self.confirmed_count() >= self.max_attendees as usize
    }

    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.date < now
    }

    /// Whether `user` holds a non-cancelled attendance entry.
    pub fn has_active_registration(&self, user: UserId) -> bool {
        self.attendees
            .iter()
            .any(|a| a.user_id == user && a.status != AttendanceStatus::Cancelled)
    }
}

/// Input to event creation. Tag fields arrive already coerced to lists.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub price: Option<f64>,
    pub category: Category,
    pub skills: Vec<String>,
    pub image: Option<String>,
    pub max_attendees: u32,
    pub location: Option<String>,
}

/// Partial event update. `None` leaves the prior value untouched.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub price: Option<f64>,
    pub category: Option<Category>,
    pub skills: Option<Vec<String>>,
    pub image: Option<String>,
    pub max_attendees: Option<u32>,
    pub location: Option<String>,
}

impl EventPatch {
    /// Apply the patch in place, bumping `updated_at`.
    pub fn apply(self, event: &mut Event, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            event.title = title;
        }
        if let Some(description) = self.description {
            event.description = description;
        }
        if let Some(date) = self.date {
            event.date = date;
        }
        if let Some(price) = self.price {
            event.price = price;
        }
        if let Some(category) = self.category {
            event.category = category;
        }
        if let Some(skills) = self.skills {
            event.skills = skills;
        }
        if let Some(image) = self.image {
            event.image = image;
        }
        if let Some(max_attendees) = self.max_attendees {
            event.max_attendees = max_attendees;
        }
        if let Some(location) = self.location {
            event.location = location;
        }
        event.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn event(max_attendees: u32) -> Event {
        let now = Utc::now();
        Event {
            id: EventId::new(),
            title: "Rust workshop".to_string(),
            description: "Intro to ownership".to_string(),
            date: now + Duration::days(7),
            price: 0.0,
            category: Category::Workshop,
            skills: vec![],
            image: DEFAULT_IMAGE.to_string(),
            max_attendees,
            host: UserId::new(),
            attendees: vec![],
            location: DEFAULT_LOCATION.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn attendance(status: AttendanceStatus) -> Attendance {
        Attendance {
            user_id: UserId::new(),
            status,
            registered_at: Utc::now(),
        }
    }

    #[test]
    fn confirmed_count_ignores_other_statuses() {
        let mut e = event(5);
        e.attendees.push(attendance(AttendanceStatus::Confirmed));
        e.attendees.push(attendance(AttendanceStatus::Pending));
        e.attendees.push(attendance(AttendanceStatus::Cancelled));

        assert_eq!(e.confirmed_count(), 1);
        assert!(!e.is_full());
    }

    #[test]
    fn full_at_capacity() {
        let mut e = event(2);
        e.attendees.push(attendance(AttendanceStatus::Confirmed));
        e.attendees.push(attendance(AttendanceStatus::Confirmed));

        assert!(e.is_full());
    }

    #[test]
    fn past_check_uses_start_timestamp() {
        let mut e = event(1);
        assert!(!e.is_past(Utc::now()));

        e.date = Utc::now() - Duration::hours(1);
        assert!(e.is_past(Utc::now()));
    }

    #[test]
    fn cancelled_entry_is_not_an_active_registration() {
        let mut e = event(3);
        let user = UserId::new();
        e.attendees.push(Attendance {
            user_id: user,
            status: AttendanceStatus::Cancelled,
            registered_at: Utc::now(),
        });

        assert!(!e.has_active_registration(user));
    }

    #[test]
    fn patch_applies_only_supplied_fields() {
        let mut e = event(3);
        let before = e.clone();

        EventPatch {
            title: Some("New title".to_string()),
            max_attendees: Some(10),
            ..Default::default()
        }
        .apply(&mut e, Utc::now());

        assert_eq!(e.title, "New title");
        assert_eq!(e.max_attendees, 10);
        assert_eq!(e.description, before.description);
        assert_eq!(e.date, before.date);
    }

    #[test]
    fn category_parse_is_case_insensitive() {
        assert_eq!("Workshop".parse::<Category>().unwrap(), Category::Workshop);
        assert!("concert".parse::<Category>().is_err());
    }
}
