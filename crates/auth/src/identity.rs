use stockroom_core::UserId;

/// Identity context for a request.
///
/// Immutable, constructed once by the auth boundary and passed by parameter;
/// absence of an identity is a construction-time error, never a runtime cast
/// failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    user_id: UserId,
}

impl Identity {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }
}
