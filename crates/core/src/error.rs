//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic business failures (validation,
/// ownership, registration state). Infrastructure failures are folded into
/// `Store` and are the only variant that maps to a 500 at the API boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed or missing input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Registration attempted with an email that is already taken.
    #[error("user already exists with this email")]
    DuplicateEmail,

    /// Login failed. Deliberately does not say whether the email exists.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Missing, malformed or expired bearer credential.
    #[error("authentication required")]
    Unauthenticated,

    /// Authenticated but not allowed (e.g. non-host editing an event).
    #[error("not authorized to perform this action")]
    Forbidden,

    /// A referenced entity does not exist.
    #[error("not found")]
    NotFound,

    /// Caller already holds a non-cancelled attendance entry.
    #[error("already registered for this event")]
    AlreadyRegistered,

    /// Confirmed attendee count has reached capacity.
    #[error("event is full")]
    EventFull,

    /// Caller has no attendance entry to cancel.
    #[error("not registered for this event")]
    NotRegistered,

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Underlying persistence failure. Logged, never retried automatically.
    #[error("store error: {0}")]
    Store(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
