//! Structural validation vocabulary.
//!
//! Declarative per-field rule evaluation happens in the entity crates;
//! this module only provides the violation shape and a collector so every
//! offending field is reported, not just the first.

use serde::Serialize;

use crate::error::{DomainError, DomainResult};

/// One structural rule violation on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Name of the offending field, as the caller sent it.
    pub field: &'static str,
    /// Short rule identifier (`required`, `min_length`, ...).
    pub rule: &'static str,
    /// Rule parameter or offending value, human-readable.
    pub param: String,
}

/// Collector for field violations.
#[derive(Debug, Default)]
pub struct Violations {
    inner: Vec<FieldViolation>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, rule: &'static str, param: impl Into<String>) {
        self.inner.push(FieldViolation {
            field,
            rule,
            param: param.into(),
        });
    }

    /// Check a rule; record a violation when it does not hold.
    pub fn check(
        &mut self,
        ok: bool,
        field: &'static str,
        rule: &'static str,
        param: impl Into<String>,
    ) {
        if !ok {
            self.push(field, rule, param);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Ok when nothing was collected, otherwise `DomainError::Validation`.
    pub fn finish(self) -> DomainResult<()> {
        if self.inner.is_empty() {
            Ok(())
        } else {
            Err(DomainError::validation(self.inner))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_collector_passes() {
        assert!(Violations::new().finish().is_ok());
    }

    #[test]
    fn collects_every_offending_field() {
        let mut v = Violations::new();
        v.check(false, "name", "required", "");
        v.check(true, "name", "min_length", "3");
        v.check(false, "current_capacity", "min", "1");

        match v.finish() {
            Err(DomainError::Validation(violations)) => {
                assert_eq!(violations.len(), 2);
                assert_eq!(violations[0].field, "name");
                assert_eq!(violations[1].field, "current_capacity");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
