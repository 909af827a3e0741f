//! `skillbridge-identity` — user accounts and the auth service.
//!
//! Owns the persisted user record, the [`UserStore`] boundary, and the
//! register/login/profile operations. Token and password primitives come
//! from `skillbridge-auth`; storage comes from whoever implements the trait.

pub mod service;
pub mod store;
pub mod user;

pub use service::AuthService;
pub use store::UserStore;
pub use user::{NewUser, ProfileUpdate, User, UserProfile, UserSummary};
