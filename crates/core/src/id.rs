//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::scope::{resolve_id, ResourceKind};

/// Identifier of a store (positive, backend-assigned).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreId(i64);

/// Identifier of an item (positive, backend-assigned).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(i64);

macro_rules! impl_row_id_newtype {
    ($t:ty, $kind:expr) => {
        impl $t {
            /// Wrap a backend-assigned row id.
            ///
            /// Only the persistence layer mints these; untrusted path values
            /// must go through [`Self::resolve`] instead.
            pub fn from_row(id: i64) -> Self {
                Self(id)
            }

            /// Resolve an untrusted path value into a typed id.
            ///
            /// Fails with [`DomainError::InvalidScope`] unless the value
            /// parses as an integer >= 1.
            pub fn resolve(path_value: &str) -> Result<Self, DomainError> {
                resolve_id(path_value, $kind).map(Self)
            }

            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::resolve(s)
            }
        }
    };
}

impl_row_id_newtype!(StoreId, ResourceKind::Store);
impl_row_id_newtype!(ItemId, ResourceKind::Item);

/// Identifier of a user (external identity, opaque).
///
/// Never minted here; produced by the identity collaborator and only
/// referenced as a foreign owner key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for UserId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
