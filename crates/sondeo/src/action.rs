//! Action executor: intent-addressed interactions.
//!
//! Composes the selector catalog with the candidate prober to perform one
//! unit of interaction. Retries live in the candidate list only: if the
//! matched candidate's action itself errors, that error propagates.
//! Discovery is retried across strategies; actions are not.

use crate::catalog::{candidates_for, Intent};
use crate::driver::{Driver, ElementHandle};
use crate::probe::{ProbeResult, Prober, DEFAULT_CANDIDATE_TIMEOUT_MS};
use crate::result::{SondeoError, SondeoResult};
use std::time::Duration;
use tracing::{debug, info};

/// Settle budget after an invoking click (10 seconds)
pub const DEFAULT_SETTLE_TIMEOUT_MS: u64 = 10_000;

/// Executes intent-addressed interactions against a driver
pub struct ActionExecutor<'d> {
    driver: &'d dyn Driver,
    per_candidate_timeout: Duration,
    settle_timeout: Duration,
}

impl std::fmt::Debug for ActionExecutor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionExecutor")
            .field("per_candidate_timeout", &self.per_candidate_timeout)
            .field("settle_timeout", &self.settle_timeout)
            .finish_non_exhaustive()
    }
}

impl<'d> ActionExecutor<'d> {
    /// Create an executor with default budgets
    #[must_use]
    pub fn new(driver: &'d dyn Driver) -> Self {
        Self {
            driver,
            per_candidate_timeout: Duration::from_millis(DEFAULT_CANDIDATE_TIMEOUT_MS),
            settle_timeout: Duration::from_millis(DEFAULT_SETTLE_TIMEOUT_MS),
        }
    }

    /// Set the per-candidate probe budget
    #[must_use]
    pub const fn with_candidate_timeout(mut self, timeout: Duration) -> Self {
        self.per_candidate_timeout = timeout;
        self
    }

    /// Set the settle budget applied after invoking clicks
    #[must_use]
    pub const fn with_settle_timeout(mut self, timeout: Duration) -> Self {
        self.settle_timeout = timeout;
        self
    }

    /// The underlying driver
    #[must_use]
    pub const fn driver(&self) -> &'d dyn Driver {
        self.driver
    }

    /// Probe an intent without failing on exhaustion.
    ///
    /// Precondition checks go through here: a `None` lets the scenario
    /// degrade to a skip instead of a failure.
    pub async fn locate(&self, intent: Intent) -> Option<ElementHandle> {
        let prober = Prober::new(self.driver);
        prober
            .probe(&candidates_for(intent), self.per_candidate_timeout)
            .await
            .into_handle()
    }

    /// Clear then set the field behind an intent
    pub async fn fill_field(&self, intent: Intent, value: &str) -> SondeoResult<()> {
        let handle = self.require(intent).await?;
        self.driver.fill(&handle, value).await?;
        debug!(intent = %intent, "filled field");
        Ok(())
    }

    /// Click the control behind an intent and wait for the application to
    /// settle
    pub async fn invoke(&self, intent: Intent) -> SondeoResult<()> {
        let handle = self.require(intent).await?;
        self.driver.click(&handle).await?;
        self.driver.wait_for_settle(self.settle_timeout).await?;
        debug!(intent = %intent, "invoked");
        Ok(())
    }

    /// Click the control behind an intent without waiting for settle.
    ///
    /// Menus and popovers render synchronously; a settle wait after opening
    /// one can outlast the menu itself.
    pub async fn open_menu(&self, intent: Intent) -> SondeoResult<()> {
        let handle = self.require(intent).await?;
        self.driver.click(&handle).await?;
        debug!(intent = %intent, "opened menu");
        Ok(())
    }

    /// Invoke the submit action, falling back to a synthetic commit gesture
    /// on `field_intent` when no submit affordance is discoverable.
    ///
    /// Submit affordances are inconsistently marked across applications;
    /// pressing Enter in the form's field is the universal second tier.
    pub async fn invoke_with_fallback_submit(&self, field_intent: Intent) -> SondeoResult<()> {
        match self.invoke(Intent::SubmitAction).await {
            Ok(()) => Ok(()),
            Err(SondeoError::ElementNotFound { .. }) => {
                info!(field = %field_intent, "no submit affordance; pressing Enter on field");
                let handle = self.require(field_intent).await?;
                self.driver.press(&handle, "Enter").await?;
                self.driver.wait_for_settle(self.settle_timeout).await?;
                Ok(())
            }
            Err(other) => Err(other),
        }
    }

    async fn require(&self, intent: Intent) -> SondeoResult<ElementHandle> {
        let candidates = candidates_for(intent);
        let prober = Prober::new(self.driver);
        match prober.probe(&candidates, self.per_candidate_timeout).await {
            ProbeResult::Matched { handle, .. } => Ok(handle),
            ProbeResult::Exhausted => Err(SondeoError::ElementNotFound {
                intent: intent.label().to_string(),
                tried: candidates.len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Resolution;
    use crate::selector::Strategy;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Driver that matches a configured set of strategies and records every
    /// interaction.
    #[derive(Default)]
    struct RecordingDriver {
        matching: Vec<Strategy>,
        log: Mutex<Vec<String>>,
    }

    impl RecordingDriver {
        fn matching(strategies: Vec<Strategy>) -> Self {
            Self {
                matching: strategies,
                log: Mutex::new(Vec::new()),
            }
        }

        fn log(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Driver for RecordingDriver {
        async fn goto(&self, path: &str) -> SondeoResult<()> {
            self.log.lock().unwrap().push(format!("goto {path}"));
            Ok(())
        }

        async fn current_url(&self) -> SondeoResult<String> {
            Ok("/".to_string())
        }

        async fn resolve(&self, strategy: &Strategy) -> SondeoResult<Resolution> {
            if self.matching.contains(strategy) {
                Ok(Resolution::Found(ElementHandle::new(strategy.clone())))
            } else {
                Ok(Resolution::NotFound)
            }
        }

        async fn click(&self, handle: &ElementHandle) -> SondeoResult<()> {
            self.log
                .lock()
                .unwrap()
                .push(format!("click {}", handle.strategy));
            Ok(())
        }

        async fn fill(&self, handle: &ElementHandle, value: &str) -> SondeoResult<()> {
            self.log
                .lock()
                .unwrap()
                .push(format!("fill {} = {value}", handle.strategy));
            Ok(())
        }

        async fn press(&self, handle: &ElementHandle, key: &str) -> SondeoResult<()> {
            self.log
                .lock()
                .unwrap()
                .push(format!("press {key} on {}", handle.strategy));
            Ok(())
        }

        async fn wait_for_settle(&self, _timeout: Duration) -> SondeoResult<()> {
            self.log.lock().unwrap().push("settle".to_string());
            Ok(())
        }

        async fn clear_session(&self) -> SondeoResult<()> {
            Ok(())
        }
    }

    fn fast(driver: &RecordingDriver) -> ActionExecutor<'_> {
        ActionExecutor::new(driver).with_candidate_timeout(Duration::from_millis(20))
    }

    #[tokio::test]
    async fn test_fill_field_targets_matched_candidate() {
        let driver =
            RecordingDriver::matching(vec![Strategy::attribute("input", "type", "email")]);
        fast(&driver)
            .fill_field(Intent::EmailField, "admin@example.com")
            .await
            .unwrap();

        let log = driver.log();
        assert_eq!(log.len(), 1);
        assert!(log[0].starts_with("fill input[type~email]"));
        assert!(log[0].ends_with("admin@example.com"));
    }

    #[tokio::test]
    async fn test_invoke_clicks_then_settles() {
        let driver = RecordingDriver::matching(vec![Strategy::attribute(
            "button", "type", "submit",
        )]);
        fast(&driver).invoke(Intent::SubmitAction).await.unwrap();

        let log = driver.log();
        assert_eq!(log.len(), 2);
        assert!(log[0].starts_with("click"));
        assert_eq!(log[1], "settle");
    }

    #[tokio::test]
    async fn test_open_menu_skips_settle() {
        let driver =
            RecordingDriver::matching(vec![Strategy::css("tbody button[aria-haspopup=\"menu\"]")]);
        fast(&driver).open_menu(Intent::RowActionsMenu).await.unwrap();

        let log = driver.log();
        assert_eq!(log.len(), 1);
        assert!(log[0].starts_with("click"));
    }

    #[tokio::test]
    async fn test_exhaustion_is_element_not_found() {
        let driver = RecordingDriver::default();
        let err = fast(&driver)
            .invoke(Intent::LogoutAction)
            .await
            .unwrap_err();

        match err {
            SondeoError::ElementNotFound { intent, tried } => {
                assert_eq!(intent, "logout action");
                assert_eq!(tried, candidates_for(Intent::LogoutAction).len());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(driver.log().is_empty());
    }

    #[tokio::test]
    async fn test_fallback_submit_presses_enter_on_field() {
        // No submit affordance anywhere, but the password field exists.
        let driver =
            RecordingDriver::matching(vec![Strategy::attribute("input", "name", "password")]);
        fast(&driver)
            .invoke_with_fallback_submit(Intent::PasswordField)
            .await
            .unwrap();

        let log = driver.log();
        assert_eq!(log.len(), 2);
        assert!(log[0].starts_with("press Enter on"));
        assert_eq!(log[1], "settle");
    }

    #[tokio::test]
    async fn test_fallback_submit_prefers_real_submit() {
        let driver = RecordingDriver::matching(vec![
            Strategy::attribute("button", "type", "submit"),
            Strategy::attribute("input", "name", "password"),
        ]);
        fast(&driver)
            .invoke_with_fallback_submit(Intent::PasswordField)
            .await
            .unwrap();

        let log = driver.log();
        assert!(log[0].starts_with("click"));
        assert!(!log.iter().any(|line| line.starts_with("press")));
    }

    #[tokio::test]
    async fn test_locate_returns_none_on_exhaustion() {
        let driver = RecordingDriver::default();
        assert!(fast(&driver).locate(Intent::CreateAction).await.is_none());
    }
}
