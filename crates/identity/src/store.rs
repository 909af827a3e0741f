//! Storage boundary for user records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use skillbridge_core::{DomainResult, UserId};

use crate::user::{ProfileUpdate, User};

/// Persistence boundary for user records.
///
/// Implementations are injected into [`crate::AuthService`]; there is no
/// process-global store handle. Emails are stored already normalized
/// (trimmed, lowercased), so uniqueness is a plain equality check.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Fails with `DomainError::DuplicateEmail` if the
    /// email is already taken.
    async fn insert(&self, user: User) -> DomainResult<User>;

    async fn find_by_id(&self, id: UserId) -> DomainResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    /// Apply a partial profile update. Returns the updated record, or `None`
    /// if the user does not exist.
    async fn update_profile(
        &self,
        id: UserId,
        update: ProfileUpdate,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<User>>;
}
