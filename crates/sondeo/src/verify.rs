//! Outcome verification through disjunctions of independent signals.
//!
//! Target applications signal outcomes in heterogeneous ways: a redirect, a
//! toast, an ARIA alert, or just the disappearance of a prior element.
//! Requiring one specific signal would be brittle and requiring all of them
//! would be too strict, so a [`VerificationSet`] is an unordered disjunction
//! with an any-one-true policy, polled in a bounded loop.

use crate::catalog::{candidates_for, Intent};
use crate::driver::Driver;
use crate::pattern::UrlPattern;
use crate::probe::Prober;
use crate::result::{SondeoError, SondeoResult};
use crate::selector::Strategy;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Default polling interval between verification ticks (100ms)
pub const DEFAULT_VERIFY_POLL_MS: u64 = 100;

/// One independently-checkable condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// The current URL matches a pattern
    UrlMatches(UrlPattern),
    /// The current URL does not match a pattern
    UrlNotMatches(UrlPattern),
    /// Some candidate for an intent is visible
    IntentVisible(Intent),
    /// No candidate for an intent is visible
    IntentAbsent(Intent),
    /// The given text is visible somewhere on the page
    TextVisible(String),
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UrlMatches(p) => write!(f, "{p}"),
            Self::UrlNotMatches(p) => write!(f, "not ({p})"),
            Self::IntentVisible(i) => write!(f, "'{i}' visible"),
            Self::IntentAbsent(i) => write!(f, "'{i}' absent"),
            Self::TextVisible(t) => write!(f, "text '{t}' visible"),
        }
    }
}

/// An unordered disjunction of signals with an any-one-true policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationSet {
    /// Name of the outcome being verified, for diagnostics
    pub name: String,
    /// The signals; any one becoming true verifies the outcome
    pub signals: Vec<Signal>,
}

impl VerificationSet {
    /// Start an empty set for a named outcome
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signals: Vec::new(),
        }
    }

    /// Add a signal
    #[must_use]
    pub fn with(mut self, signal: Signal) -> Self {
        self.signals.push(signal);
        self
    }

    /// Description of the whole set, for timeout diagnostics
    #[must_use]
    pub fn describe(&self) -> String {
        let signals: Vec<String> = self.signals.iter().map(ToString::to_string).collect();
        format!("{} [{}]", self.name, signals.join(" | "))
    }
}

/// Verifier over a driver
pub struct Verifier<'d> {
    driver: &'d dyn Driver,
    poll_interval: Duration,
}

impl std::fmt::Debug for Verifier<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier")
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl<'d> Verifier<'d> {
    /// Create a verifier with the default tick interval
    #[must_use]
    pub fn new(driver: &'d dyn Driver) -> Self {
        Self {
            driver,
            poll_interval: Duration::from_millis(DEFAULT_VERIFY_POLL_MS),
        }
    }

    /// Set the tick interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Poll all signals until any one becomes true or the budget elapses.
    ///
    /// Returns as soon as a signal holds; returns `false` at the timeout
    /// boundary, never hangs.
    pub async fn verify(&self, set: &VerificationSet, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(signal) = self.any_true(set).await {
                debug!(outcome = %set.name, signal = %signal, "verified");
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                debug!(outcome = %set.name, "verification timed out");
                return false;
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }

    /// Best-effort negative check: true when no signal becomes true within
    /// the window. A signal whose target never existed is vacuously absent.
    pub async fn verify_absence(&self, set: &VerificationSet, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(signal) = self.any_true(set).await {
                debug!(outcome = %set.name, signal = %signal, "absence violated");
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }

    /// Like [`Self::verify`] but maps a negative outcome to
    /// [`SondeoError::VerificationTimeout`] carrying the signal set.
    pub async fn expect_verified(
        &self,
        set: &VerificationSet,
        timeout: Duration,
    ) -> SondeoResult<()> {
        if self.verify(set, timeout).await {
            Ok(())
        } else {
            Err(SondeoError::VerificationTimeout {
                signals: set.describe(),
                ms: timeout.as_millis() as u64,
            })
        }
    }

    /// One tick: the first signal that currently holds, if any.
    ///
    /// Driver errors during a tick are treated as "signal not true yet";
    /// the enclosing loop owns the time budget.
    async fn any_true<'a>(&self, set: &'a VerificationSet) -> Option<&'a Signal> {
        for signal in &set.signals {
            match self.check(signal).await {
                Ok(true) => return Some(signal),
                Ok(false) => {}
                Err(err) => {
                    trace!(signal = %signal, error = %err, "signal check errored");
                }
            }
        }
        None
    }

    async fn check(&self, signal: &Signal) -> SondeoResult<bool> {
        match signal {
            Signal::UrlMatches(pattern) => {
                let url = self.driver.current_url().await?;
                Ok(pattern.matches(&url))
            }
            Signal::UrlNotMatches(pattern) => {
                let url = self.driver.current_url().await?;
                Ok(!pattern.matches(&url))
            }
            Signal::IntentVisible(intent) => {
                let prober = Prober::new(self.driver);
                Ok(prober.probe_once(&candidates_for(*intent)).await.is_matched())
            }
            Signal::IntentAbsent(intent) => {
                let prober = Prober::new(self.driver);
                Ok(!prober.probe_once(&candidates_for(*intent)).await.is_matched())
            }
            Signal::TextVisible(text) => {
                let resolution = self.driver.resolve(&Strategy::text(text.clone())).await?;
                Ok(resolution.is_found())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{ElementHandle, Resolution};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Instant as StdInstant;

    /// Driver whose page state flips after a configured delay.
    struct FlippingDriver {
        url: Mutex<String>,
        visible_after: Option<Duration>,
        started: StdInstant,
    }

    impl FlippingDriver {
        fn new(url: &str, visible_after: Option<Duration>) -> Self {
            Self {
                url: Mutex::new(url.to_string()),
                visible_after,
                started: StdInstant::now(),
            }
        }

        fn element_visible(&self) -> bool {
            self.visible_after
                .is_some_and(|after| self.started.elapsed() >= after)
        }
    }

    #[async_trait]
    impl Driver for FlippingDriver {
        async fn goto(&self, path: &str) -> SondeoResult<()> {
            *self.url.lock().unwrap() = path.to_string();
            Ok(())
        }

        async fn current_url(&self) -> SondeoResult<String> {
            Ok(self.url.lock().unwrap().clone())
        }

        async fn resolve(&self, strategy: &Strategy) -> SondeoResult<Resolution> {
            if self.element_visible() {
                Ok(Resolution::Found(ElementHandle::new(strategy.clone())))
            } else {
                Ok(Resolution::NotFound)
            }
        }

        async fn click(&self, _handle: &ElementHandle) -> SondeoResult<()> {
            Ok(())
        }

        async fn fill(&self, _handle: &ElementHandle, _value: &str) -> SondeoResult<()> {
            Ok(())
        }

        async fn press(&self, _handle: &ElementHandle, _key: &str) -> SondeoResult<()> {
            Ok(())
        }

        async fn wait_for_settle(&self, _timeout: Duration) -> SondeoResult<()> {
            Ok(())
        }

        async fn clear_session(&self) -> SondeoResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_any_one_true_returns_near_signal_time() {
        let driver = FlippingDriver::new("/login", Some(Duration::from_millis(300)));
        let set = VerificationSet::named("login feedback")
            .with(Signal::UrlMatches(UrlPattern::Contains("/nowhere".into())))
            .with(Signal::IntentVisible(Intent::ErrorIndicator))
            .with(Signal::TextVisible("unrelated".to_string()));

        let start = StdInstant::now();
        let verified = Verifier::new(&driver)
            .with_poll_interval(Duration::from_millis(25))
            .verify(&set, Duration::from_secs(2))
            .await;
        let elapsed = start.elapsed();

        assert!(verified);
        assert!(elapsed >= Duration::from_millis(250), "returned at {elapsed:?}");
        assert!(elapsed < Duration::from_millis(800), "returned at {elapsed:?}");
    }

    #[tokio::test]
    async fn test_verify_false_at_timeout_boundary() {
        let driver = FlippingDriver::new("/login", None);
        let set = VerificationSet::named("never")
            .with(Signal::IntentVisible(Intent::SuccessIndicator));

        let start = StdInstant::now();
        let verified = Verifier::new(&driver)
            .with_poll_interval(Duration::from_millis(25))
            .verify(&set, Duration::from_millis(300))
            .await;
        let elapsed = start.elapsed();

        assert!(!verified);
        assert!(elapsed >= Duration::from_millis(300));
        assert!(elapsed < Duration::from_millis(600), "returned at {elapsed:?}");
    }

    #[tokio::test]
    async fn test_url_signal_holds_immediately() {
        let driver = FlippingDriver::new("http://localhost:5173/dashboard", None);
        let set = VerificationSet::named("left the login area")
            .with(Signal::UrlNotMatches(UrlPattern::login_area()));

        let start = StdInstant::now();
        assert!(
            Verifier::new(&driver)
                .verify(&set, Duration::from_secs(2))
                .await
        );
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_verify_absence_vacuous_when_nothing_appears() {
        let driver = FlippingDriver::new("/login", None);
        let set = VerificationSet::named("no auth evidence")
            .with(Signal::IntentVisible(Intent::AuthenticatedIndicator));

        assert!(
            Verifier::new(&driver)
                .with_poll_interval(Duration::from_millis(25))
                .verify_absence(&set, Duration::from_millis(200))
                .await
        );
    }

    #[tokio::test]
    async fn test_verify_absence_fails_when_signal_appears() {
        let driver = FlippingDriver::new("/dashboard", Some(Duration::from_millis(50)));
        let set = VerificationSet::named("no auth evidence")
            .with(Signal::IntentVisible(Intent::AuthenticatedIndicator));

        assert!(
            !Verifier::new(&driver)
                .with_poll_interval(Duration::from_millis(25))
                .verify_absence(&set, Duration::from_millis(500))
                .await
        );
    }

    #[tokio::test]
    async fn test_expect_verified_carries_signal_set() {
        let driver = FlippingDriver::new("/login", None);
        let set = VerificationSet::named("entity saved")
            .with(Signal::IntentVisible(Intent::SuccessIndicator))
            .with(Signal::IntentAbsent(Intent::ModalDialog));

        // IntentAbsent holds here (no modal), so this verifies instantly.
        assert!(Verifier::new(&driver)
            .expect_verified(&set, Duration::from_millis(200))
            .await
            .is_ok());

        let strict = VerificationSet::named("entity saved")
            .with(Signal::IntentVisible(Intent::SuccessIndicator));
        let err = Verifier::new(&driver)
            .expect_verified(&strict, Duration::from_millis(100))
            .await
            .unwrap_err();
        match err {
            SondeoError::VerificationTimeout { signals, ms } => {
                assert!(signals.contains("entity saved"));
                assert!(signals.contains("success indicator"));
                assert_eq!(ms, 100);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_describe_joins_signals() {
        let set = VerificationSet::named("logged in")
            .with(Signal::UrlNotMatches(UrlPattern::login_area()))
            .with(Signal::IntentVisible(Intent::LogoutAction));
        let description = set.describe();
        assert!(description.starts_with("logged in ["));
        assert!(description.contains(" | "));
        assert!(description.contains("logout action"));
    }
}
