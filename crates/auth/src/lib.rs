//! `skillbridge-auth` — pure authentication boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it knows how
//! to hash/verify passwords and how to mint/validate bearer tokens, nothing
//! else. Who calls it and where the users live is someone else's problem.

pub mod claims;
pub mod jwt;
pub mod password;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256Jwt, JwtIssuer, JwtValidator, TokenError};
pub use password::{PasswordError, hash_password, verify_password};
