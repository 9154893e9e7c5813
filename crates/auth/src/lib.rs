//! `stockroom-auth` — identity boundary.
//!
//! This crate resolves a bearer token into an opaque user identifier and
//! nothing more; authorization happens in the data layer through ownership
//! scoping, not roles.

pub mod claims;
pub mod identity;
pub mod jwt;

pub use claims::{validate_claims, JwtClaims, TokenValidationError};
pub use identity::Identity;
pub use jwt::{Hs256JwtValidator, JwtValidator};
