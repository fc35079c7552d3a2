//! Shared fakes for unit tests.

use std::sync::Arc;

use async_trait::async_trait;

use ch_core::auth::{AuthSession, Credentials, OtpKind, SignUpOutcome};
use ch_core::ports::{AuthPort, KeyValueStorePort, NotificationRepositoryPort, ProfileRepositoryPort};
use ch_core::{AuthError, FetchError, ProfileRow, ProfileUpdate, SessionIdentity, UserId};

use crate::store::{AppStore, StoreConfig};

mockall::mock! {
    pub Auth {}

    #[async_trait]
    impl AuthPort for Auth {
        async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession, AuthError>;
        async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpOutcome, AuthError>;
        async fn sign_out(&self) -> Result<(), AuthError>;
        async fn verify_otp(&self, email: &str, token: &str, kind: OtpKind) -> Result<AuthSession, AuthError>;
        async fn resend_otp(&self, email: &str, kind: OtpKind) -> Result<(), AuthError>;
        async fn refresh_session(&self) -> Result<AuthSession, AuthError>;
        async fn delete_account(&self) -> Result<(), AuthError>;
    }
}

mockall::mock! {
    pub Profiles {}

    #[async_trait]
    impl ProfileRepositoryPort for Profiles {
        async fn get_by_id(&self, id: &UserId) -> Result<ProfileRow, FetchError>;
        async fn update(&self, id: &UserId, update: &ProfileUpdate) -> Result<ProfileRow, FetchError>;
    }
}

mockall::mock! {
    pub Notifications {}

    #[async_trait]
    impl NotificationRepositoryPort for Notifications {
        async fn unread_count(&self, user_id: &UserId) -> Result<u64, FetchError>;
    }
}

pub struct NullKeyValueStore;

#[async_trait]
impl KeyValueStorePort for NullKeyValueStore {
    async fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
        Ok(())
    }

    async fn remove(&self, _key: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

pub async fn hydrated_store() -> Arc<AppStore> {
    let store = AppStore::new(Arc::new(NullKeyValueStore), StoreConfig::default());
    store.hydrate().await;
    store
}

pub async fn signed_in_store(user: &str) -> Arc<AppStore> {
    let store = hydrated_store().await;
    store.set_session(SessionIdentity::new(user, None));
    store
}

pub fn auth_session(user: &str) -> AuthSession {
    AuthSession {
        user_id: UserId::from(user),
        email: Some(format!("{user}@campus.edu")),
        access_token: format!("access-{user}"),
        refresh_token: format!("refresh-{user}"),
        expires_at: None,
    }
}

pub fn profile_row(user: &str, completed: Option<bool>) -> ProfileRow {
    let mut row = ProfileRow::empty(user);
    row.completed = completed;
    row
}
