//! GoTrue style authentication adapter.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use ch_core::auth::{AuthSession, Credentials, OtpKind, SignUpOutcome};
use ch_core::ports::AuthPort;
use ch_core::{AuthError, UserId};

use super::client::RestBackendClient;
use super::errors::{auth_error_from_status, auth_error_from_transport};

#[derive(Debug, Deserialize)]
struct UserBody {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: UserBody,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> AuthSession {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .or_else(|| self.expires_in.map(|secs| now + Duration::seconds(secs)));
        AuthSession {
            user_id: UserId::new(self.user.id),
            email: self.user.email,
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
        }
    }
}

pub struct RemoteAuthService {
    client: Arc<RestBackendClient>,
}

impl RemoteAuthService {
    pub fn new(client: Arc<RestBackendClient>) -> Self {
        Self { client }
    }

    async fn post(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: serde_json::Value,
    ) -> Result<Response, AuthError> {
        self.client
            .request(Method::POST, path)
            .await
            .query(query)
            .json(&body)
            .send()
            .await
            .map_err(|err| auth_error_from_transport(&err))
    }

    async fn start_session(&self, response: Response) -> Result<AuthSession, AuthError> {
        let token: TokenResponse = read_auth_json(response).await?;
        let session = token.into_session(Utc::now());
        self.client.set_session(session.clone()).await;
        Ok(session)
    }
}

async fn read_auth_body(response: Response) -> Result<String, AuthError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| auth_error_from_transport(&err))?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(auth_error_from_status(status, &body))
    }
}

async fn read_auth_json<T: DeserializeOwned>(response: Response) -> Result<T, AuthError> {
    let status = response.status();
    let body = read_auth_body(response).await?;
    serde_json::from_str(&body).map_err(|err| AuthError::Backend {
        status: status.as_u16(),
        message: format!("malformed auth response: {err}"),
    })
}

#[async_trait]
impl AuthPort for RemoteAuthService {
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession, AuthError> {
        let response = self
            .post(
                "/auth/v1/token",
                &[("grant_type", "password")],
                json!({ "email": credentials.email, "password": credentials.password }),
            )
            .await?;
        let session = self.start_session(response).await?;
        info!(user_id = %session.user_id, "password sign-in accepted");
        Ok(session)
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpOutcome, AuthError> {
        let response = self
            .post(
                "/auth/v1/signup",
                &[],
                json!({ "email": credentials.email, "password": credentials.password }),
            )
            .await?;
        let status = response.status();
        let body: serde_json::Value = read_auth_json(response).await?;

        // With email confirmation enabled the backend returns the bare user.
        if body.get("access_token").is_none() {
            let email = body
                .get("email")
                .and_then(|v| v.as_str())
                .unwrap_or(credentials.email.as_str())
                .to_string();
            debug!(email = %email, "sign-up requires confirmation");
            return Ok(SignUpOutcome::ConfirmationRequired { email });
        }

        let token: TokenResponse =
            serde_json::from_value(body).map_err(|err| AuthError::Backend {
                status: status.as_u16(),
                message: format!("malformed auth response: {err}"),
            })?;
        let session = token.into_session(Utc::now());
        self.client.set_session(session.clone()).await;
        Ok(SignUpOutcome::SignedIn(session))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if self.client.current_session().await.is_none() {
            return Ok(());
        }
        let result = match self.post("/auth/v1/logout", &[], json!({})).await {
            Ok(response) => match read_auth_body(response).await {
                Ok(_) | Err(AuthError::NotSignedIn) => Ok(()),
                Err(err) => Err(err),
            },
            Err(err) => Err(err),
        };
        self.client.clear_session().await;
        result
    }

    async fn verify_otp(
        &self,
        email: &str,
        token: &str,
        kind: OtpKind,
    ) -> Result<AuthSession, AuthError> {
        let response = self
            .post(
                "/auth/v1/verify",
                &[],
                json!({ "type": kind, "email": email, "token": token }),
            )
            .await?;
        self.start_session(response).await
    }

    async fn resend_otp(&self, email: &str, kind: OtpKind) -> Result<(), AuthError> {
        let response = self
            .post("/auth/v1/resend", &[], json!({ "type": kind, "email": email }))
            .await?;
        read_auth_body(response).await.map(|_| ())
    }

    async fn refresh_session(&self) -> Result<AuthSession, AuthError> {
        let Some(current) = self.client.current_session().await else {
            return Err(AuthError::NotSignedIn);
        };
        let response = self
            .post(
                "/auth/v1/token",
                &[("grant_type", "refresh_token")],
                json!({ "refresh_token": current.refresh_token }),
            )
            .await?;
        match self.start_session(response).await {
            Ok(session) => Ok(session),
            Err(AuthError::InvalidRefreshToken)
            | Err(AuthError::InvalidCredentials)
            | Err(AuthError::NotSignedIn) => {
                warn!(user_id = %current.user_id, "refresh token rejected");
                self.client.clear_session().await;
                Err(AuthError::InvalidRefreshToken)
            }
            Err(err) => Err(err),
        }
    }

    async fn delete_account(&self) -> Result<(), AuthError> {
        let Some(current) = self.client.current_session().await else {
            return Err(AuthError::NotSignedIn);
        };
        let response = self
            .client
            .request(Method::DELETE, "/auth/v1/user")
            .await
            .send()
            .await
            .map_err(|err| auth_error_from_transport(&err))?;
        if response.status() != StatusCode::NO_CONTENT {
            read_auth_body(response).await?;
        }
        self.client.clear_session().await;
        info!(user_id = %current.user_id, "account deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::InMemoryKeyValueStore;
    use crate::remote::{BackendConfig, AUTH_TOKEN_KEY};
    use ch_core::ports::KeyValueStorePort;
    use mockito::{Matcher, Server, ServerGuard};

    const TOKEN_BODY: &str = r#"{
        "access_token": "access-1",
        "token_type": "bearer",
        "expires_in": 3600,
        "expires_at": 1893456000,
        "refresh_token": "refresh-1",
        "user": {"id": "u1", "email": "u1@campus.edu", "aud": "authenticated"}
    }"#;

    async fn service(
        server: &ServerGuard,
    ) -> (
        RemoteAuthService,
        Arc<RestBackendClient>,
        Arc<InMemoryKeyValueStore>,
    ) {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let client = Arc::new(
            RestBackendClient::new(BackendConfig::new(server.url(), "anon"), kv.clone()).unwrap(),
        );
        (RemoteAuthService::new(client.clone()), client, kv)
    }

    #[tokio::test]
    async fn sign_in_stores_tokens() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/v1/token")
            .match_query(Matcher::UrlEncoded("grant_type".into(), "password".into()))
            .match_header("apikey", "anon")
            .match_body(Matcher::PartialJson(json!({"email": "u1@campus.edu"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(TOKEN_BODY)
            .create_async()
            .await;
        let (auth, client, kv) = service(&server).await;

        let session = auth
            .sign_in(&Credentials::new("u1@campus.edu", "secret"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(session.user_id, UserId::from("u1"));
        assert_eq!(session.expires_at, DateTime::from_timestamp(1893456000, 0));
        assert_eq!(client.current_session().await, Some(session));
        assert!(kv.get(AUTH_TOKEN_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn bad_password_maps_to_invalid_credentials() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/auth/v1/token")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"code":400,"error_code":"invalid_credentials","msg":"Invalid login credentials"}"#)
            .create_async()
            .await;
        let (auth, client, _) = service(&server).await;

        let err = auth
            .sign_in(&Credentials::new("u1@campus.edu", "wrong"))
            .await
            .unwrap_err();

        assert_eq!(err, AuthError::InvalidCredentials);
        assert!(client.current_session().await.is_none());
    }

    #[tokio::test]
    async fn sign_up_without_session_needs_confirmation() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/auth/v1/signup")
            .with_status(200)
            .with_body(r#"{"id":"u2","email":"new@campus.edu","confirmation_sent_at":"2026-01-01T00:00:00Z"}"#)
            .create_async()
            .await;
        let (auth, client, _) = service(&server).await;

        let outcome = auth
            .sign_up(&Credentials::new("new@campus.edu", "secret"))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            SignUpOutcome::ConfirmationRequired {
                email: "new@campus.edu".into()
            }
        );
        assert!(client.current_session().await.is_none());
    }

    #[tokio::test]
    async fn verify_otp_starts_session() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/v1/verify")
            .match_body(Matcher::Json(
                json!({"type": "signup", "email": "u1@campus.edu", "token": "123456"}),
            ))
            .with_status(200)
            .with_body(TOKEN_BODY)
            .create_async()
            .await;
        let (auth, client, _) = service(&server).await;

        auth.verify_otp("u1@campus.edu", "123456", OtpKind::Signup)
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(client.current_session().await.is_some());
    }

    #[tokio::test]
    async fn rejected_refresh_clears_tokens() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/auth/v1/token")
            .match_query(Matcher::UrlEncoded("grant_type".into(), "password".into()))
            .with_status(200)
            .with_body(TOKEN_BODY)
            .create_async()
            .await;
        server
            .mock("POST", "/auth/v1/token")
            .match_query(Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()))
            .match_body(Matcher::Json(json!({"refresh_token": "refresh-1"})))
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant","error_description":"Invalid Refresh Token: Already Used"}"#)
            .create_async()
            .await;
        let (auth, client, kv) = service(&server).await;
        auth.sign_in(&Credentials::new("u1@campus.edu", "secret"))
            .await
            .unwrap();

        let err = auth.refresh_session().await.unwrap_err();

        assert_eq!(err, AuthError::InvalidRefreshToken);
        assert!(client.current_session().await.is_none());
        assert!(kv.get(AUTH_TOKEN_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn refresh_without_tokens_is_not_signed_in() {
        let server = Server::new_async().await;
        let (auth, _, _) = service(&server).await;

        assert_eq!(
            auth.refresh_session().await.unwrap_err(),
            AuthError::NotSignedIn
        );
    }

    #[tokio::test]
    async fn sign_out_clears_tokens_even_when_remote_fails() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/auth/v1/token")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(TOKEN_BODY)
            .create_async()
            .await;
        server
            .mock("POST", "/auth/v1/logout")
            .match_header("authorization", "Bearer access-1")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;
        let (auth, client, _) = service(&server).await;
        auth.sign_in(&Credentials::new("u1@campus.edu", "secret"))
            .await
            .unwrap();

        let result = auth.sign_out().await;

        assert!(matches!(result, Err(AuthError::Backend { status: 500, .. })));
        assert!(client.current_session().await.is_none());
    }

    #[tokio::test]
    async fn delete_account_uses_user_token() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/auth/v1/token")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(TOKEN_BODY)
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/auth/v1/user")
            .match_header("authorization", "Bearer access-1")
            .with_status(204)
            .create_async()
            .await;
        let (auth, client, _) = service(&server).await;
        auth.sign_in(&Credentials::new("u1@campus.edu", "secret"))
            .await
            .unwrap();

        auth.delete_account().await.unwrap();

        delete.assert_async().await;
        assert!(client.current_session().await.is_none());
    }

    #[tokio::test]
    async fn unreachable_backend_is_network_error() {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let client = Arc::new(
            RestBackendClient::new(BackendConfig::new("http://127.0.0.1:1", "anon"), kv).unwrap(),
        );
        let auth = RemoteAuthService::new(client);

        let err = auth
            .sign_in(&Credentials::new("u1@campus.edu", "secret"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Network(_)));
    }
}
