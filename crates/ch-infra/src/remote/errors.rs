//! Mapping of HTTP outcomes onto port errors.

use reqwest::StatusCode;
use serde::Deserialize;

use ch_core::{AuthError, FetchError};

/// Error body of either API. GoTrue uses `error_code`/`msg` (older versions
/// `error`/`error_description`); PostgREST uses `code`/`message`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    fn code(&self) -> Option<&str> {
        self.error_code.as_deref().or(self.error.as_deref())
    }

    fn message(&self, status: StatusCode, body: &str) -> String {
        self.msg
            .clone()
            .or_else(|| self.message.clone())
            .or_else(|| self.error_description.clone())
            .unwrap_or_else(|| {
                let body = body.trim();
                if body.is_empty() {
                    status.to_string()
                } else {
                    body.chars().take(200).collect()
                }
            })
    }
}

pub(crate) fn fetch_error_from_transport(err: &reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else if err.is_decode() {
        FetchError::Malformed(err.to_string())
    } else if let Some(status) = err.status() {
        fetch_error_from_status(status, "")
    } else {
        FetchError::Network(err.to_string())
    }
}

pub(crate) fn fetch_error_from_status(status: StatusCode, body: &str) -> FetchError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FetchError::Unauthorized,
        StatusCode::NOT_FOUND => FetchError::NotFound,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => FetchError::Timeout,
        _ if status.is_server_error() => FetchError::Server {
            status: status.as_u16(),
            message: ErrorBody::parse(body).message(status, body),
        },
        _ => FetchError::Malformed(format!(
            "unexpected status {}: {}",
            status.as_u16(),
            ErrorBody::parse(body).message(status, body)
        )),
    }
}

pub(crate) fn auth_error_from_transport(err: &reqwest::Error) -> AuthError {
    AuthError::Network(err.to_string())
}

pub(crate) fn auth_error_from_status(status: StatusCode, body: &str) -> AuthError {
    let parsed = ErrorBody::parse(body);
    let message = parsed.message(status, body);
    let lowered = message.to_ascii_lowercase();

    match parsed.code() {
        Some("invalid_credentials") => return AuthError::InvalidCredentials,
        Some("email_not_confirmed") => return AuthError::EmailNotConfirmed,
        Some("otp_expired") => return AuthError::InvalidOtp,
        Some("refresh_token_not_found")
        | Some("refresh_token_already_used")
        | Some("session_not_found") => return AuthError::InvalidRefreshToken,
        Some("over_request_rate_limit") | Some("over_email_send_rate_limit") => {
            return AuthError::RateLimited
        }
        Some("invalid_grant") if lowered.contains("refresh token") => {
            return AuthError::InvalidRefreshToken
        }
        Some("invalid_grant") if lowered.contains("email not confirmed") => {
            return AuthError::EmailNotConfirmed
        }
        Some("invalid_grant") => return AuthError::InvalidCredentials,
        _ => {}
    }

    match status {
        StatusCode::TOO_MANY_REQUESTS => AuthError::RateLimited,
        StatusCode::UNAUTHORIZED => AuthError::NotSignedIn,
        _ => AuthError::Backend {
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_statuses_map_to_kinds() {
        assert_eq!(
            fetch_error_from_status(StatusCode::UNAUTHORIZED, ""),
            FetchError::Unauthorized
        );
        assert_eq!(
            fetch_error_from_status(StatusCode::FORBIDDEN, ""),
            FetchError::Unauthorized
        );
        assert_eq!(
            fetch_error_from_status(StatusCode::NOT_FOUND, ""),
            FetchError::NotFound
        );
        assert_eq!(
            fetch_error_from_status(StatusCode::REQUEST_TIMEOUT, ""),
            FetchError::Timeout
        );
        assert_eq!(
            fetch_error_from_status(
                StatusCode::SERVICE_UNAVAILABLE,
                r#"{"code":"PGRST000","message":"connection refused"}"#
            ),
            FetchError::Server {
                status: 503,
                message: "connection refused".into()
            }
        );
        assert!(matches!(
            fetch_error_from_status(StatusCode::BAD_REQUEST, "bad filter"),
            FetchError::Malformed(msg) if msg.contains("bad filter")
        ));
    }

    #[test]
    fn gotrue_error_codes_map_to_auth_errors() {
        assert_eq!(
            auth_error_from_status(
                StatusCode::BAD_REQUEST,
                r#"{"code":400,"error_code":"invalid_credentials","msg":"Invalid login credentials"}"#
            ),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            auth_error_from_status(
                StatusCode::BAD_REQUEST,
                r#"{"error":"invalid_grant","error_description":"Email not confirmed"}"#
            ),
            AuthError::EmailNotConfirmed
        );
        assert_eq!(
            auth_error_from_status(
                StatusCode::BAD_REQUEST,
                r#"{"error":"invalid_grant","error_description":"Invalid Refresh Token: Already Used"}"#
            ),
            AuthError::InvalidRefreshToken
        );
        assert_eq!(
            auth_error_from_status(
                StatusCode::FORBIDDEN,
                r#"{"error_code":"otp_expired","msg":"Token has expired or is invalid"}"#
            ),
            AuthError::InvalidOtp
        );
        assert_eq!(
            auth_error_from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            AuthError::RateLimited
        );
        assert_eq!(
            auth_error_from_status(StatusCode::UNAUTHORIZED, "{}"),
            AuthError::NotSignedIn
        );
        assert_eq!(
            auth_error_from_status(StatusCode::INTERNAL_SERVER_ERROR, "upstream down"),
            AuthError::Backend {
                status: 500,
                message: "upstream down".into()
            }
        );
    }
}
