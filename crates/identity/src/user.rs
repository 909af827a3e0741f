//! Persisted user record and its externally-visible projections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use skillbridge_core::UserId;

/// Persisted user record.
///
/// # Invariants
/// - `email` is unique across all users (trimmed, lowercased at the service
///   boundary before it ever reaches a store).
/// - `password_hash` is an Argon2id PHC string. It must never appear in any
///   externally-visible representation; serialize [`UserProfile`] or
///   [`UserSummary`] instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub bio: String,
    pub skills: Vec<String>,
    pub interests: Vec<String>,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Full client-facing view of the account (no credential material).
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            bio: self.bio.clone(),
            skills: self.skills.clone(),
            interests: self.interests.clone(),
            avatar: self.avatar.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Minimal identity used when embedding a user inside an event view.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            bio: None,
        }
    }

    /// Like [`User::summary`] but including the bio (single-event display).
    pub fn summary_with_bio(&self) -> UserSummary {
        UserSummary {
            bio: Some(self.bio.clone()),
            ..self.summary()
        }
    }
}

/// Client-facing account view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub bio: String,
    pub skills: Vec<String>,
    pub interests: Vec<String>,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Display identity embedded in event views (host, attendees).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// Input to registration. Tag fields arrive already coerced to lists.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub interests: Vec<String>,
}

/// Partial profile update. `None` leaves the prior value untouched.
///
/// Email and password are deliberately absent: neither is mutable through
/// the profile path.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
    pub interests: Option<Vec<String>>,
    pub avatar: Option<String>,
}

impl ProfileUpdate {
    /// Apply the update in place, bumping `updated_at`.
    pub fn apply(self, user: &mut User, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(bio) = self.bio {
            user.bio = bio;
        }
        if let Some(skills) = self.skills {
            user.skills = skills;
        }
        if let Some(interests) = self.interests {
            user.interests = interests;
        }
        if let Some(avatar) = self.avatar {
            user.avatar = avatar;
        }
        user.updated_at = now;
    }
}
