//! Environment-sourced suite configuration.
//!
//! Credentials are required and validated before any browser interaction;
//! a missing variable aborts the run with a configuration error that names
//! the variable and how to provide it.

use crate::result::{SondeoError, SondeoResult};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Default origin for the application under test
pub const DEFAULT_BASE_URL: &str = "http://localhost:5173";

/// Suite configuration resolved from the environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Admin account email (required)
    pub admin_email: String,
    /// Admin account password (required)
    pub admin_password: String,
    /// Origin of the application under test
    pub base_url: String,
    /// Run the browser headless
    pub headless: bool,
}

impl SuiteConfig {
    /// Resolve configuration from the process environment.
    ///
    /// Fails fast with [`SondeoError::Configuration`] when `ADMIN_EMAIL` or
    /// `ADMIN_PASSWORD` is unset or blank.
    pub fn from_env() -> SondeoResult<Self> {
        let admin_email = required_var("ADMIN_EMAIL")?;
        let admin_password = required_var("ADMIN_PASSWORD")?;
        let base_url = std::env::var("BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let headless = std::env::var("HEADLESS")
            .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
            .unwrap_or(true);

        let config = Self {
            admin_email,
            admin_password,
            base_url,
            headless,
        };
        info!(base_url = %config.base_url, headless = config.headless, "suite configured");
        Ok(config)
    }

    /// Build a configuration directly (tests, embedding)
    #[must_use]
    pub fn new(admin_email: impl Into<String>, admin_password: impl Into<String>) -> Self {
        Self {
            admin_email: admin_email.into(),
            admin_password: admin_password.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            headless: true,
        }
    }

    /// Set the application origin
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

fn required_var(name: &str) -> SondeoResult<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            SondeoError::configuration(format!(
                "{name} must be set in the environment. \
                 Copy .env.sample to .env and fill in the credentials."
            ))
        })
}
