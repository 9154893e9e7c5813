//! `stockroom-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod scope;
pub mod validate;
pub mod version;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ItemId, StoreId, UserId};
pub use scope::{resolve_id, ResourceKind};
pub use validate::{FieldViolation, Violations};
pub use version::Version;
