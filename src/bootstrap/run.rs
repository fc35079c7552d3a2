//! Headless entry: start the runtime, wait for the gate to settle and report.

use tracing::{info, warn};

use ch_core::auth::Credentials;
use ch_core::config::AppConfig;

use super::runtime::AppRuntime;
use super::wiring::wire_dependencies;

pub const EMAIL_ENV: &str = "CAMPUS_HUB_EMAIL";
pub const PASSWORD_ENV: &str = "CAMPUS_HUB_PASSWORD";

/// Credentials from the environment, if both variables are set and non-empty.
fn env_credentials() -> Option<Credentials> {
    let email = std::env::var(EMAIL_ENV).ok().filter(|v| !v.trim().is_empty())?;
    let password = std::env::var(PASSWORD_ENV).ok().filter(|v| !v.is_empty())?;
    Some(Credentials::new(email, password))
}

/// Run the shell until the navigation gate picks a subtree or Ctrl-C arrives.
pub async fn run_app(config: AppConfig) -> anyhow::Result<()> {
    let deps = wire_dependencies(&config)?;
    let runtime = AppRuntime::new(deps);
    runtime.start().await?;

    if runtime.store().session().is_none() {
        if let Some(credentials) = env_credentials() {
            if let Err(err) = runtime.usecases().sign_in().execute(&credentials).await {
                warn!(error = %err, "sign-in from environment failed");
            }
        }
    }

    if runtime.store().session().is_none() {
        info!("not signed in; set {EMAIL_ENV} and {PASSWORD_ENV} to sign in");
        return runtime.shutdown().await;
    }

    let mut gate = runtime.navigation_gate();
    let mount = tokio::select! {
        mount = gate.settled() => mount,
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted before navigation settled");
            None
        }
    };

    if let Some(mount) = mount {
        info!(mount = %mount, "navigation settled");
        match runtime.usecases().get_unread_notification_count().execute().await {
            Ok(count) => info!(unread = count, "notifications"),
            Err(err) => warn!(error = %err, "failed to load unread notification count"),
        }
    }
    let status = runtime.coordinator().status();
    if let Some(error) = status.error.as_ref() {
        warn!(error = %error, "profile bootstrap ended with an error");
    }

    runtime.shutdown().await
}
