use serde::{Deserialize, Serialize};

use ch_core::{ProfileSummary, SessionIdentity};

/// Version written into the persisted envelope.
pub const PERSIST_VERSION: u32 = 0;

/// Full observable state of the app store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppSnapshot {
    pub session: Option<SessionIdentity>,
    pub profile: ProfileSummary,
    /// False until the persisted snapshot has been loaded (or failed to load).
    pub hydrated: bool,
    /// Bumped on every change of signed-in user, including signing out.
    /// Not persisted.
    pub session_epoch: u64,
}

/// Fields that survive a restart. `hydrated` is deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub session: Option<SessionIdentity>,
    #[serde(default)]
    pub profile: ProfileSummary,
}

/// On-disk envelope: `{"state": {...}, "version": 0}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedEnvelope {
    pub state: PersistedState,
    #[serde(default)]
    pub version: u32,
}

impl PersistedEnvelope {
    pub fn capture(snapshot: &AppSnapshot) -> Self {
        Self {
            state: PersistedState {
                session: snapshot.session.clone(),
                profile: snapshot.profile.clone(),
            },
            version: PERSIST_VERSION,
        }
    }

    pub fn encode(&self) -> anyhow::Result<String> {
        serde_json::to_string(self)
            .map_err(|e| anyhow::anyhow!("Failed to serialize app store snapshot: {e}"))
    }

    /// Decode a stored envelope. Envelopes with another version are rejected.
    pub fn decode(raw: &str) -> anyhow::Result<Self> {
        let envelope: PersistedEnvelope = serde_json::from_str(raw)
            .map_err(|e| anyhow::anyhow!("Failed to parse app store snapshot: {e}"))?;
        if envelope.version != PERSIST_VERSION {
            anyhow::bail!(
                "Unsupported app store snapshot version {} (expected {})",
                envelope.version,
                PERSIST_VERSION
            );
        }
        Ok(envelope)
    }
}
