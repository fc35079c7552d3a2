use ch_core::{BootstrapState, FetchError, ProfileRow, UserId};

/// Observable result of the profile bootstrap, shaped like a query result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapStatus {
    /// User the status belongs to, `None` while disabled.
    pub user_id: Option<UserId>,
    pub data: Option<ProfileRow>,
    pub is_loading: bool,
    pub error: Option<FetchError>,
}

impl BootstrapStatus {
    /// Status of a disabled bootstrap (no session).
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Whether this status describes `user_id`'s bootstrap.
    pub fn is_for(&self, user_id: Option<&UserId>) -> bool {
        self.user_id.as_ref() == user_id
    }

    pub fn from_state(state: &BootstrapState) -> Self {
        Self {
            user_id: state.user_id().cloned(),
            data: state.profile().cloned(),
            is_loading: state.is_loading(),
            error: state.error().cloned(),
        }
    }
}
