use skillbridge_core::UserId;

/// Authenticated caller for a request.
///
/// Inserted by the auth middleware after signature and expiry checks; its
/// presence means the bearer token was valid.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AuthContext {
    user_id: UserId,
}

impl AuthContext {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}
