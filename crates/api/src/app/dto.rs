//! Request DTOs and their mapping into domain inputs.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use skillbridge_core::{DomainError, DomainResult};
use skillbridge_events::{
    Category, EventFilter, EventPatch, EventQuery, NewEvent, Pagination, PriceFilter, SortField,
    SortOrder,
};
use skillbridge_identity::{NewUser, ProfileUpdate};

/// Tag lists arrive either as a JSON array or as one comma-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TagsField {
    List(Vec<String>),
    Csv(String),
}

impl TagsField {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            TagsField::List(items) => items,
            TagsField::Csv(csv) => csv.split(',').map(|s| s.to_string()).collect(),
        }
    }
}

fn tags(field: Option<TagsField>) -> Vec<String> {
    field.map(TagsField::into_vec).unwrap_or_default()
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub bio: Option<String>,
    pub skills: Option<TagsField>,
    pub interests: Option<TagsField>,
}

impl RegisterRequest {
    pub fn into_new_user(self) -> NewUser {
        NewUser {
            name: self.name,
            email: self.email,
            password: self.password,
            bio: self.bio,
            skills: tags(self.skills),
            interests: tags(self.interests),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<TagsField>,
    pub interests: Option<TagsField>,
    pub avatar: Option<String>,
}

impl UpdateProfileRequest {
    pub fn into_update(self) -> ProfileUpdate {
        ProfileUpdate {
            name: self.name,
            bio: self.bio,
            skills: self.skills.map(TagsField::into_vec),
            interests: self.interests.map(TagsField::into_vec),
            avatar: self.avatar,
        }
    }
}

/// Required fields are `Option` here so a missing field surfaces as a
/// domain validation error (JSON `{error, message}`, 400) instead of the
/// extractor's bare rejection.
#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub price: Option<f64>,
    #[serde(rename = "type")]
    pub category: Option<String>,
    pub skills: Option<TagsField>,
    pub image: Option<String>,
    #[serde(alias = "maxAttendees")]
    pub max_attendees: Option<u32>,
    pub location: Option<String>,
}

impl CreateEventRequest {
    pub fn into_new_event(self) -> DomainResult<NewEvent> {
        Ok(NewEvent {
            title: required(self.title, "title")?,
            description: required(self.description, "description")?,
            date: required(self.date, "date")?,
            price: self.price,
            category: required(self.category, "type")?.parse::<Category>()?,
            skills: tags(self.skills),
            image: self.image,
            max_attendees: required(self.max_attendees, "max_attendees")?,
            location: self.location,
        })
    }
}

fn required<T>(value: Option<T>, field: &str) -> DomainResult<T> {
    value.ok_or_else(|| DomainError::validation(format!("{field} is required")))
}

#[derive(Debug, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub price: Option<f64>,
    #[serde(rename = "type")]
    pub category: Option<String>,
    pub skills: Option<TagsField>,
    pub image: Option<String>,
    #[serde(alias = "maxAttendees")]
    pub max_attendees: Option<u32>,
    pub location: Option<String>,
}

impl UpdateEventRequest {
    pub fn into_patch(self) -> DomainResult<EventPatch> {
        let category = match self.category {
            Some(c) => Some(c.parse::<Category>()?),
            None => None,
        };

        Ok(EventPatch {
            title: self.title,
            description: self.description,
            date: self.date,
            price: self.price,
            category,
            skills: self.skills.map(TagsField::into_vec),
            image: self.image,
            max_attendees: self.max_attendees,
            location: self.location,
        })
    }
}

/// Query string for `GET /api/events`. `type=all` and `price=all` mean
/// "no filter", matching what list UIs send for the default dropdown state.
#[derive(Debug, Default, Deserialize)]
pub struct ListEventsParams {
    #[serde(rename = "type")]
    pub category: Option<String>,
    pub search: Option<String>,
    pub price: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListEventsParams {
    pub fn into_query(self) -> DomainResult<EventQuery> {
        let category = match self.category.as_deref() {
            None => None,
            Some(c) if c.is_empty() || c.eq_ignore_ascii_case("all") => None,
            Some(c) => Some(c.parse::<Category>()?),
        };

        let price = match self.price.as_deref() {
            None => None,
            Some(p) if p.is_empty() || p.eq_ignore_ascii_case("all") => None,
            Some(p) => Some(p.parse::<PriceFilter>()?),
        };

        let sort = match self.sort.as_deref() {
            None => SortField::default(),
            Some(s) => s.parse::<SortField>()?,
        };

        let order = match self.order.as_deref() {
            None => SortOrder::default(),
            Some(o) => o.parse::<SortOrder>()?,
        };

        Ok(EventQuery {
            filter: EventFilter {
                search: self.search.filter(|s| !s.trim().is_empty()),
                category,
                price,
            },
            sort,
            order,
            page: Pagination::new(
                self.page.unwrap_or(1),
                self.limit.unwrap_or(Pagination::DEFAULT_LIMIT),
            ),
        })
    }
}
