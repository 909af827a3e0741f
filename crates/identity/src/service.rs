//! Register / login / profile operations.

use std::sync::Arc;

use chrono::Utc;

use skillbridge_auth::{JwtIssuer, hash_password, verify_password};
use skillbridge_core::{DomainError, DomainResult, UserId};

use crate::store::UserStore;
use crate::user::{NewUser, ProfileUpdate, User, UserProfile};

const MIN_PASSWORD_LEN: usize = 8;

/// Issues and redeems identities.
///
/// Stateless between requests; holds only the injected store and token
/// signer.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt: Arc<dyn JwtIssuer>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt: Arc<dyn JwtIssuer>) -> Self {
        Self { users, jwt }
    }

    /// Create an account and mint a bearer token for it.
    pub async fn register(&self, input: NewUser) -> DomainResult<(String, UserProfile)> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("name is required"));
        }

        let email = normalize_email(&input.email);
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::validation("invalid email format"));
        }

        if input.password.len() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(DomainError::DuplicateEmail);
        }

        let password_hash =
            hash_password(&input.password).map_err(|e| DomainError::store(e.to_string()))?;

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            name,
            email,
            password_hash,
            bio: input.bio.unwrap_or_default(),
            skills: trim_tags(input.skills),
            interests: trim_tags(input.interests),
            avatar: String::new(),
            created_at: now,
            updated_at: now,
        };

        // The store re-checks uniqueness; a concurrent duplicate surfaces here.
        let user = self.users.insert(user).await?;
        tracing::info!(user_id = %user.id, "user registered");

        let token = self.issue_token(user.id)?;
        Ok((token, user.profile()))
    }

    /// Verify credentials and mint a bearer token.
    ///
    /// The error is identical for unknown email and wrong password.
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<(String, UserProfile)> {
        let email = normalize_email(email);
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(DomainError::InvalidCredentials)?;

        let matches = verify_password(password, &user.password_hash)
            .map_err(|e| DomainError::store(e.to_string()))?;
        if !matches {
            return Err(DomainError::InvalidCredentials);
        }

        let token = self.issue_token(user.id)?;
        Ok((token, user.profile()))
    }

    /// Resolve the profile behind an already-verified token subject.
    pub async fn current_user(&self, id: UserId) -> DomainResult<UserProfile> {
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound)?;
        Ok(user.profile())
    }

    /// Partial profile update. Email and password are not mutable here.
    pub async fn update_profile(
        &self,
        id: UserId,
        update: ProfileUpdate,
    ) -> DomainResult<UserProfile> {
        let update = ProfileUpdate {
            skills: update.skills.map(trim_tags),
            interests: update.interests.map(trim_tags),
            ..update
        };

        let user = self
            .users
            .update_profile(id, update, Utc::now())
            .await?
            .ok_or(DomainError::NotFound)?;
        Ok(user.profile())
    }

    fn issue_token(&self, user_id: UserId) -> DomainResult<String> {
        self.jwt
            .issue(user_id, Utc::now())
            .map_err(|e| DomainError::store(format!("token issuance failed: {e}")))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn trim_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
