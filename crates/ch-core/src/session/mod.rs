//! Session identity domain model.
//!
//! A session identity exists only while the user is authenticated. It is owned
//! by the persisted app store and is the sole source of "who is signed in".

use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// Identity of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub user_id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

impl SessionIdentity {
    pub fn new(user_id: impl Into<UserId>, email: Option<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email,
        }
    }
}

/// Returns the user id of an optional session, if any.
pub fn user_id_of(session: Option<&SessionIdentity>) -> Option<&UserId> {
    session.map(|s| &s.user_id)
}
