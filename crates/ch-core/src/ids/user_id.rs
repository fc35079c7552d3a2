use serde::{Deserialize, Serialize};

use super::id_macro::impl_id;

/// Backend-assigned user identifier.
///
/// Identifiers are opaque; the client never generates them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl_id!(UserId);
