//! Candidate prober: ordered, fault-tolerant element discovery.
//!
//! Candidates are tried strictly in priority order with a bounded
//! visibility check per candidate. A driver error during one candidate's
//! evaluation means "this candidate did not match", never a probe failure;
//! one brittle structural selector must not poison a list that also carries
//! stable role-based queries. Exhaustion of the whole list is an ordinary
//! value, not an error.

use crate::driver::{Driver, ElementHandle, Resolution};
use crate::selector::Candidate;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Default polling interval while waiting on one candidate (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Default per-candidate visibility budget (1 second)
pub const DEFAULT_CANDIDATE_TIMEOUT_MS: u64 = 1_000;

/// Outcome of probing an ordered candidate list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    /// A candidate resolved to a visible element
    Matched {
        /// Index of the winning candidate in the probed list
        index: usize,
        /// Resolved element handle
        handle: ElementHandle,
    },
    /// Every candidate failed, timed out, or errored
    Exhausted,
}

impl ProbeResult {
    /// True when a candidate matched
    #[must_use]
    pub const fn is_matched(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    /// The winning handle, if any
    #[must_use]
    pub fn into_handle(self) -> Option<ElementHandle> {
        match self {
            Self::Matched { handle, .. } => Some(handle),
            Self::Exhausted => None,
        }
    }
}

/// Prober over a driver
pub struct Prober<'d> {
    driver: &'d dyn Driver,
    poll_interval: Duration,
}

impl std::fmt::Debug for Prober<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prober")
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl<'d> Prober<'d> {
    /// Create a prober with the default polling interval
    #[must_use]
    pub fn new(driver: &'d dyn Driver) -> Self {
        Self {
            driver,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    /// Set the polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Try candidates in declared order, first match wins.
    ///
    /// Each candidate gets its own `per_candidate_timeout` window; total
    /// time is bounded by `candidates.len() * per_candidate_timeout`.
    pub async fn probe(
        &self,
        candidates: &[Candidate],
        per_candidate_timeout: Duration,
    ) -> ProbeResult {
        for (index, candidate) in candidates.iter().enumerate() {
            let deadline = Instant::now() + per_candidate_timeout;
            loop {
                match self.driver.resolve(&candidate.strategy).await {
                    Ok(Resolution::Found(handle)) => {
                        debug!(candidate = %candidate.describe(), index, "probe matched");
                        return ProbeResult::Matched { index, handle };
                    }
                    Ok(Resolution::NotFound) => {
                        if Instant::now() >= deadline {
                            break;
                        }
                        tokio::time::sleep(self.poll_interval).await;
                    }
                    Err(err) => {
                        // Treated as "did not match"; move to the next tier.
                        debug!(candidate = %candidate.describe(), error = %err, "candidate errored");
                        break;
                    }
                }
            }
        }
        ProbeResult::Exhausted
    }

    /// Single non-waiting pass over the candidates.
    ///
    /// Used by the verifier's poll ticks, where the enclosing loop owns the
    /// time budget.
    pub async fn probe_once(&self, candidates: &[Candidate]) -> ProbeResult {
        for (index, candidate) in candidates.iter().enumerate() {
            match self.driver.resolve(&candidate.strategy).await {
                Ok(Resolution::Found(handle)) => {
                    return ProbeResult::Matched { index, handle };
                }
                Ok(Resolution::NotFound) => {}
                Err(err) => {
                    debug!(candidate = %candidate.describe(), error = %err, "candidate errored");
                }
            }
        }
        ProbeResult::Exhausted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{SondeoError, SondeoResult};
    use crate::selector::Strategy;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Scripted driver: each strategy resolves to a canned outcome.
    #[derive(Default)]
    struct ScriptedDriver {
        outcomes: HashMap<String, Outcome>,
        resolve_calls: AtomicUsize,
    }

    enum Outcome {
        Found,
        NotFound,
        Error,
    }

    impl ScriptedDriver {
        fn script(mut self, strategy: &Strategy, outcome: Outcome) -> Self {
            self.outcomes.insert(format!("{strategy:?}"), outcome);
            self
        }
    }

    #[async_trait]
    impl Driver for ScriptedDriver {
        async fn goto(&self, _path: &str) -> SondeoResult<()> {
            Ok(())
        }

        async fn current_url(&self) -> SondeoResult<String> {
            Ok("/".to_string())
        }

        async fn resolve(&self, strategy: &Strategy) -> SondeoResult<Resolution> {
            self.resolve_calls.fetch_add(1, Ordering::SeqCst);
            match self.outcomes.get(&format!("{strategy:?}")) {
                Some(Outcome::Found) => {
                    Ok(Resolution::Found(ElementHandle::new(strategy.clone())))
                }
                Some(Outcome::Error) => Err(SondeoError::Evaluation {
                    message: "malformed selector".to_string(),
                }),
                _ => Ok(Resolution::NotFound),
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

    fn candidates(strategies: &[Strategy]) -> Vec<Candidate> {
        strategies.iter().cloned().map(Candidate::new).collect()
    }

    #[tokio::test]
    async fn test_probe_respects_declared_order() {
        let a = Strategy::role("button", "save");
        let b = Strategy::css("button.save");
        let driver = ScriptedDriver::default()
            .script(&a, Outcome::Found)
            .script(&b, Outcome::Found);

        let result = Prober::new(&driver)
            .probe(&candidates(&[a.clone(), b]), Duration::from_millis(100))
            .await;

        match result {
            ProbeResult::Matched { index, handle } => {
                assert_eq!(index, 0);
                assert_eq!(handle.strategy, a);
            }
            ProbeResult::Exhausted => panic!("expected a match"),
        }
    }

    #[tokio::test]
    async fn test_probe_survives_erroring_candidate() {
        let a = Strategy::css("tbody button:has(svg)");
        let b = Strategy::role("button", "edit");
        let driver = ScriptedDriver::default()
            .script(&a, Outcome::Error)
            .script(&b, Outcome::Found);

        let result = Prober::new(&driver)
            .probe(&candidates(&[a, b.clone()]), Duration::from_millis(100))
            .await;

        match result {
            ProbeResult::Matched { index, handle } => {
                assert_eq!(index, 1);
                assert_eq!(handle.strategy, b);
            }
            ProbeResult::Exhausted => panic!("expected the fallback to match"),
        }
    }

    #[tokio::test]
    async fn test_probe_exhaustion_is_bounded_by_sum_of_timeouts() {
        let strategies = [
            Strategy::text("nothing"),
            Strategy::css(".nope"),
            Strategy::role("button", "missing"),
        ];
        let driver = ScriptedDriver::default();

        let per_candidate = Duration::from_millis(100);
        let start = std::time::Instant::now();
        let result = Prober::new(&driver)
            .probe(&candidates(&strategies), per_candidate)
            .await;
        let elapsed = start.elapsed();

        assert_eq!(result, ProbeResult::Exhausted);
        // Three candidates at 100ms each, plus scheduling slack.
        assert!(
            elapsed < Duration::from_millis(600),
            "exhaustion took {elapsed:?}"
        );
        assert!(elapsed >= Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_erroring_candidate_fails_fast_within_its_window() {
        let a = Strategy::css("bad[[selector");
        let driver = ScriptedDriver::default().script(&a, Outcome::Error);

        let start = std::time::Instant::now();
        let result = Prober::new(&driver)
            .probe(&candidates(&[a]), Duration::from_secs(5))
            .await;

        assert_eq!(result, ProbeResult::Exhausted);
        // No point re-evaluating a selector the driver rejects.
        assert!(start.elapsed() < Duration::from_millis(200));
        assert_eq!(driver.resolve_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_probe_once_does_not_wait() {
        let driver = ScriptedDriver::default();
        let start = std::time::Instant::now();
        let result = Prober::new(&driver)
            .probe_once(&candidates(&[Strategy::text("gone"), Strategy::css(".gone")]))
            .await;
        assert_eq!(result, ProbeResult::Exhausted);
        assert!(start.elapsed() < Duration::from_millis(50));
        assert_eq!(driver.resolve_calls.load(Ordering::SeqCst), 2);
    }
}
