//! Opaque optimistic-concurrency token.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Concurrency token carried by every mutable entity.
///
/// The backend regenerates the token on every successful mutation; callers
/// present the value they last observed as a precondition, never a value to
/// persist verbatim.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(Uuid);

impl Version {
    /// Mint a fresh token. Only persistence implementations should call this.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl core::fmt::Display for Version {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for Version {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for Version {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_differ() {
        assert_ne!(Version::generate(), Version::generate());
    }
}
