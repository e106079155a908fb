//! End-to-end scenario procedures.
//!
//! Each scenario composes route discovery, the action executor, and the
//! outcome verifier into one named check and produces a
//! [`ScenarioOutcome`](crate::scenario::ScenarioOutcome). Scenarios degrade
//! to a skip whenever a precondition probe is exhausted; only contradicted
//! expectations fail.

pub mod auth;
pub mod crud;

use crate::action::ActionExecutor;
use crate::catalog::Intent;
use crate::config::SuiteConfig;
use crate::driver::Driver;
use crate::pattern::UrlPattern;
use crate::result::{SondeoError, SondeoResult};
use crate::routes::{discover, Route, RouteTable};
use crate::scenario::SuiteReport;
use crate::verify::{Signal, VerificationSet, Verifier};
use std::time::Duration;
use tracing::{info, warn};

/// Verification budget for primary outcomes (10 seconds)
pub const VERIFY_TIMEOUT_MS: u64 = 10_000;

/// Verification budget for secondary/per-route checks (3 seconds)
pub const SHORT_VERIFY_MS: u64 = 3_000;

/// Observation window for absence checks (1.5 seconds)
pub const ABSENCE_WINDOW_MS: u64 = 1_500;

pub(crate) fn verify_timeout() -> Duration {
    Duration::from_millis(VERIFY_TIMEOUT_MS)
}

pub(crate) fn short_verify() -> Duration {
    Duration::from_millis(SHORT_VERIFY_MS)
}

pub(crate) fn absence_window() -> Duration {
    Duration::from_millis(ABSENCE_WINDOW_MS)
}

/// Log in through the UI with the fallback ladder.
///
/// Primary evidence is a race between leaving the login area and a visible
/// logout control. When neither shows up, an ARIA alert is surfaced as the
/// failure message, and a generic sweep for authenticated indicators gets
/// the final word before declaring failure.
pub async fn login_as(
    driver: &dyn Driver,
    routes: &RouteTable,
    email: &str,
    password: &str,
) -> SondeoResult<()> {
    if email.is_empty() || password.is_empty() {
        return Err(SondeoError::configuration(
            "login requires a non-empty email and password",
        ));
    }

    info!(%email, "attempting login");
    driver.goto(routes.get(Route::Login)).await?;

    let executor = ActionExecutor::new(driver);
    executor.fill_field(Intent::EmailField, email).await?;
    executor.fill_field(Intent::PasswordField, password).await?;
    executor
        .invoke_with_fallback_submit(Intent::PasswordField)
        .await?;

    let verifier = Verifier::new(driver);
    let logged_in = VerificationSet::named("logged in")
        .with(Signal::UrlNotMatches(UrlPattern::login_area()))
        .with(Signal::IntentVisible(Intent::LogoutAction));

    if verifier.verify(&logged_in, verify_timeout()).await {
        info!(%email, "logged in");
        return Ok(());
    }

    // Surface the application's own error message when there is one.
    if let Some(alert) = executor.locate(Intent::ErrorIndicator).await {
        let message = alert.text.unwrap_or_default();
        return Err(SondeoError::UnexpectedState {
            message: format!("login failed with error: {}", message.trim()),
        });
    }

    // Last tier: any authenticated indicator at all.
    if executor.locate(Intent::AuthenticatedIndicator).await.is_some() {
        info!(%email, "logged in (authenticated indicator found)");
        return Ok(());
    }

    Err(SondeoError::UnexpectedState {
        message: "login appears to have failed: still on login page with no \
                  authenticated indicators"
            .to_string(),
    })
}

/// Run every scenario against one driver, discovering routes once.
///
/// Discovery is serialized ahead of the scenarios and its snapshot is
/// threaded into each of them; scenarios never re-discover.
pub async fn run_all(driver: &dyn Driver, config: &SuiteConfig) -> SuiteReport {
    let routes = discover(driver).await;
    info!(?routes, "route discovery complete");

    // One driver is reused across scenarios here, so the session is dropped
    // between them to approximate the fresh-context-per-scenario model.
    let mut report = SuiteReport::new();
    report.push(auth::valid_login(driver, config, &routes).await);
    let _ = driver.clear_session().await;
    report.push(auth::invalid_login(driver, config, &routes).await);
    let _ = driver.clear_session().await;
    report.push(auth::empty_credentials_login(driver, &routes).await);
    let _ = driver.clear_session().await;
    report.push(auth::signup_new_user(driver, &routes).await);
    let _ = driver.clear_session().await;
    report.push(auth::duplicate_signup(driver, config, &routes).await);
    let _ = driver.clear_session().await;
    report.push(auth::guard_blocks_unauthenticated(driver, &routes).await);
    let _ = driver.clear_session().await;
    report.push(auth::logout_clears_session(driver, config, &routes).await);
    let _ = driver.clear_session().await;
    report.push(auth::session_persists(driver, config, &routes).await);
    let _ = driver.clear_session().await;
    report.push(crud::create_entity(driver, config, &routes).await);
    let _ = driver.clear_session().await;
    report.push(crud::create_entity_invalid_input(driver, config, &routes).await);
    let _ = driver.clear_session().await;
    report.push(crud::update_entity(driver, config, &routes).await);
    let _ = driver.clear_session().await;
    report.push(crud::delete_entity(driver, config, &routes).await);

    if report.all_green() {
        info!("suite green\n{}", report.render());
    } else {
        warn!("suite has failures\n{}", report.render());
    }
    report
}
