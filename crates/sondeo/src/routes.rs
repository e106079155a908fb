//! Logical routes and route discovery.
//!
//! The route table maps logical names to concrete paths. It is seeded with
//! conventional defaults and refined by [`discover`], which follows the
//! application's own navigation affordances instead of trusting the
//! defaults. Discovery returns an explicit snapshot; scenarios receive it
//! as a parameter, so there is no ambient shared table to race on.

use crate::catalog::{candidates_for, Intent};
use crate::driver::{url_path, Driver};
use crate::probe::{ProbeResult, Prober};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Per-candidate visibility budget during discovery (1 second)
pub const DISCOVERY_CANDIDATE_TIMEOUT_MS: u64 = 1_000;

/// Settle budget after clicking a navigation affordance
pub const DISCOVERY_SETTLE_TIMEOUT_MS: u64 = 10_000;

/// Logical route names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Landing page
    Home,
    /// Login page
    Login,
    /// Signup page
    Signup,
    /// Post-login dashboard
    Dashboard,
}

impl Route {
    /// Conventional default path for this route
    #[must_use]
    pub const fn default_path(&self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::Signup => "/signup",
            Self::Dashboard => "/dashboard",
        }
    }
}

/// Snapshot of logical route names to concrete paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    home: String,
    login: String,
    signup: String,
    dashboard: String,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            home: Route::Home.default_path().to_string(),
            login: Route::Login.default_path().to_string(),
            signup: Route::Signup.default_path().to_string(),
            dashboard: Route::Dashboard.default_path().to_string(),
        }
    }
}

impl RouteTable {
    /// Concrete path for a logical route
    #[must_use]
    pub fn get(&self, route: Route) -> &str {
        match route {
            Route::Home => &self.home,
            Route::Login => &self.login,
            Route::Signup => &self.signup,
            Route::Dashboard => &self.dashboard,
        }
    }

    /// Overwrite one entry with a discovered path.
    ///
    /// Entries are only ever overwritten, never removed; an empty path is
    /// ignored so discovery can never degrade the table below its defaults.
    pub fn record(&mut self, route: Route, path: impl Into<String>) {
        let path = path.into();
        if path.is_empty() {
            return;
        }
        let slot = match route {
            Route::Home => &mut self.home,
            Route::Login => &mut self.login,
            Route::Signup => &mut self.signup,
            Route::Dashboard => &mut self.dashboard,
        };
        *slot = path;
    }
}

/// Discover actual routes by navigating the application and following
/// login/signup affordances.
///
/// Exhaustion of an intent's candidates is a degraded-but-usable outcome:
/// the entry keeps its default and scenarios fall back to direct
/// navigation. Running discovery twice against an unchanged application
/// yields the same table.
pub async fn discover(driver: &dyn Driver) -> RouteTable {
    let mut table = RouteTable::default();
    let prober = Prober::new(driver);
    let per_candidate = Duration::from_millis(DISCOVERY_CANDIDATE_TIMEOUT_MS);

    for (route, intent) in [
        (Route::Login, Intent::LoginNavigation),
        (Route::Signup, Intent::SignupNavigation),
    ] {
        if let Err(err) = driver.goto(table.get(Route::Home)).await {
            warn!(error = %err, "route discovery could not reach home; keeping defaults");
            return table;
        }

        match prober.probe(&candidates_for(intent), per_candidate).await {
            ProbeResult::Matched { handle, .. } => {
                let followed = async {
                    driver.click(&handle).await?;
                    driver
                        .wait_for_settle(Duration::from_millis(DISCOVERY_SETTLE_TIMEOUT_MS))
                        .await?;
                    driver.current_url().await
                }
                .await;

                match followed {
                    Ok(url) => {
                        let path = url_path(&url);
                        info!(route = ?route, %path, "discovered route");
                        table.record(route, path);
                    }
                    Err(err) => {
                        debug!(route = ?route, error = %err, "affordance did not lead anywhere; keeping default");
                    }
                }
            }
            ProbeResult::Exhausted => {
                debug!(route = ?route, "no affordance found; keeping default path");
            }
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_matches_conventions() {
        let table = RouteTable::default();
        assert_eq!(table.get(Route::Home), "/");
        assert_eq!(table.get(Route::Login), "/login");
        assert_eq!(table.get(Route::Signup), "/signup");
        assert_eq!(table.get(Route::Dashboard), "/dashboard");
    }

    #[test]
    fn test_record_overwrites_entry() {
        let mut table = RouteTable::default();
        table.record(Route::Login, "/auth/signin");
        assert_eq!(table.get(Route::Login), "/auth/signin");
        // Other entries untouched.
        assert_eq!(table.get(Route::Signup), "/signup");
    }

    #[test]
    fn test_record_ignores_empty_path() {
        let mut table = RouteTable::default();
        table.record(Route::Signup, "");
        assert_eq!(table.get(Route::Signup), "/signup");
    }

    #[test]
    fn test_table_is_cloneable_snapshot() {
        let mut table = RouteTable::default();
        let snapshot = table.clone();
        table.record(Route::Dashboard, "/home");
        assert_eq!(snapshot.get(Route::Dashboard), "/dashboard");
        assert_eq!(table.get(Route::Dashboard), "/home");
    }
}
