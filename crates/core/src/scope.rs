//! Resource scope resolution.
//!
//! Translates a path-supplied numeric identifier into a validated id before
//! any business logic consumes it. Ownership is NOT checked here; that is
//! the repositories' concern.

use crate::error::DomainError;

/// Kind of resource a path id refers to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Store,
    Item,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Store => "store",
            ResourceKind::Item => "item",
        }
    }
}

impl core::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate a raw path value as a positive integer id.
///
/// Fails with [`DomainError::InvalidScope`] when the value does not parse
/// as an integer >= 1.
pub fn resolve_id(path_value: &str, kind: ResourceKind) -> Result<i64, DomainError> {
    let id: i64 = path_value
        .trim()
        .parse()
        .map_err(|_| DomainError::invalid_scope(format!("{kind} id must be an integer")))?;

    if id < 1 {
        return Err(DomainError::invalid_scope(format!(
            "{kind} id must be >= 1, got {id}"
        )));
    }

    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_minimal_valid_id() {
        assert_eq!(resolve_id("1", ResourceKind::Store).unwrap(), 1);
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(resolve_id(" 7 ", ResourceKind::Item).unwrap(), 7);
    }

    #[test]
    fn rejects_non_numeric() {
        let err = resolve_id("pantry", ResourceKind::Store).unwrap_err();
        assert!(matches!(err, DomainError::InvalidScope(_)));
    }

    #[test]
    fn rejects_non_positive() {
        assert!(resolve_id("0", ResourceKind::Item).is_err());
        assert!(resolve_id("-1", ResourceKind::Item).is_err());
    }
}
