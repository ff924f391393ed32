//! Client configuration.
//!
//! Carries the application identity used for the identification header, the
//! directory designated for the shared response cache, and the runtime
//! bounds (per-request deadline, redirect budget) applied to every request.

use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for a [`NetworkClient`](crate::client::NetworkClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Application name, first half of the `User-Agent` value.
    pub app_name: String,
    /// Application version, second half of the `User-Agent` value.
    pub app_version: String,
    /// Directory backing the process-wide response cache store.
    pub cache_dir: PathBuf,
    /// Deadline applied uniformly to every dispatched operation.
    pub request_timeout: Duration,
    /// Maximum number of redirect follow-ups per logical request. The
    /// original request is always sent, so `max_redirects` hops may follow.
    pub max_redirects: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            app_name: env!("CARGO_PKG_NAME").to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            cache_dir: std::env::temp_dir().join("reqguard-cache"),
            request_timeout: Duration::from_secs(30),
            max_redirects: 10,
        }
    }
}

impl ClientConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `request_timeout` is zero
    /// - `app_name` is empty
    pub fn validate(&self) -> Result<(), String> {
        if self.request_timeout.is_zero() {
            return Err("request_timeout cannot be zero".to_string());
        }

        if self.app_name.is_empty() {
            return Err("app_name cannot be empty".to_string());
        }

        Ok(())
    }

    /// The identification header value, `"<app-name> <app-version>"`.
    #[must_use]
    pub fn user_agent(&self) -> String {
        format!("{} {}", self.app_name, self.app_version)
    }
}
