use crate::config::CoachConfig;
use crate::schema::UserId;

/// Identity every page and operation acts on behalf of.
///
/// Passed explicitly into each page controller; nothing in the crate reads a
/// process-wide user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: UserId,
}

impl UserContext {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn from_config(config: &CoachConfig) -> Self {
        Self::new(config.user.id)
    }
}
