use serde::{Deserialize, Serialize};

use super::{Completion, ProfileRow};

/// Cached profile subset held by the app store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    #[serde(default, rename = "completed")]
    pub completion: Completion,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl From<&ProfileRow> for ProfileSummary {
    fn from(row: &ProfileRow) -> Self {
        Self {
            completion: Completion::from(row.completed),
            full_name: row.full_name.clone(),
            username: row.username.clone(),
            avatar_url: row.avatar_url.clone(),
        }
    }
}
