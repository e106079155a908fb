//! Scenario lifecycle, verdicts, and suite reporting.
//!
//! A scenario moves through a fixed state machine:
//!
//! ```text
//! NotStarted → RoutesDiscovered → ActionsInFlight → Verified{passed|failed}
//!                    │                   │
//!                    └───────────────────┴──────→ Aborted{skipped}
//! ```
//!
//! Skipped is not failed: it records that a precondition for exercising the
//! behavior could not be established (no create button, no row menu), not
//! that the application violated a contract. Verified{failed} is reserved
//! for expectations that were actually contradicted.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Final verdict of one scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Behavior verified
    Passed,
    /// Behavior contradicted an expectation
    Failed {
        /// What disagreed, naming the intent or signal set involved
        diagnostic: String,
    },
    /// Preconditions for testing the behavior could not be established
    Skipped {
        /// Which precondition was missing
        diagnostic: String,
    },
}

impl Verdict {
    /// A failing verdict with a diagnostic
    #[must_use]
    pub fn failed(diagnostic: impl Into<String>) -> Self {
        Self::Failed {
            diagnostic: diagnostic.into(),
        }
    }

    /// A skipped verdict with a diagnostic
    #[must_use]
    pub fn skipped(diagnostic: impl Into<String>) -> Self {
        Self::Skipped {
            diagnostic: diagnostic.into(),
        }
    }

    /// True for [`Verdict::Passed`]
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// True for [`Verdict::Failed`]
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// True for [`Verdict::Skipped`]
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    /// Diagnostic message, when present
    #[must_use]
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::Passed => None,
            Self::Failed { diagnostic } | Self::Skipped { diagnostic } => Some(diagnostic),
        }
    }
}

/// Scenario lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioState {
    /// Created, nothing run yet
    NotStarted,
    /// Route discovery completed (or deliberately reused)
    RoutesDiscovered,
    /// Interactions are being executed
    ActionsInFlight,
    /// Terminal: outcome verified
    Verified {
        /// Whether the verification agreed with the expectation
        passed: bool,
    },
    /// Terminal: skipped on a missing precondition
    Aborted,
}

impl ScenarioState {
    /// True for terminal states
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Verified { .. } | Self::Aborted)
    }
}

/// One scenario's lifecycle tracker
#[derive(Debug)]
pub struct Scenario {
    name: String,
    state: ScenarioState,
    started: Instant,
}

impl Scenario {
    /// Begin tracking a named scenario
    #[must_use]
    pub fn begin(name: impl Into<String>) -> Self {
        let name = name.into();
        info!(scenario = %name, "starting");
        Self {
            name,
            state: ScenarioState::NotStarted,
            started: Instant::now(),
        }
    }

    /// Scenario name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> ScenarioState {
        self.state
    }

    /// Elapsed time since [`Scenario::begin`]
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Mark route discovery as done
    pub fn routes_discovered(&mut self) {
        debug_assert_eq!(self.state, ScenarioState::NotStarted);
        self.state = ScenarioState::RoutesDiscovered;
    }

    /// Mark interactions as started
    pub fn actions_in_flight(&mut self) {
        debug_assert!(!self.state.is_terminal());
        self.state = ScenarioState::ActionsInFlight;
    }

    /// Terminal: expectations verified
    pub fn pass(mut self) -> ScenarioOutcome {
        self.state = ScenarioState::Verified { passed: true };
        info!(scenario = %self.name, "passed");
        self.outcome(Verdict::Passed)
    }

    /// Terminal: an expectation was contradicted
    pub fn fail(mut self, diagnostic: impl Into<String>) -> ScenarioOutcome {
        let diagnostic = diagnostic.into();
        self.state = ScenarioState::Verified { passed: false };
        warn!(scenario = %self.name, %diagnostic, "failed");
        self.outcome(Verdict::failed(diagnostic))
    }

    /// Terminal: a required precondition could not be established
    pub fn skip(mut self, diagnostic: impl Into<String>) -> ScenarioOutcome {
        let diagnostic = diagnostic.into();
        self.state = ScenarioState::Aborted;
        info!(scenario = %self.name, %diagnostic, "skipped");
        self.outcome(Verdict::skipped(diagnostic))
    }

    fn outcome(self, verdict: Verdict) -> ScenarioOutcome {
        ScenarioOutcome {
            name: self.name,
            verdict,
            duration: self.started.elapsed(),
        }
    }
}

/// Result of one completed scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    /// Scenario name
    pub name: String,
    /// Final verdict
    pub verdict: Verdict,
    /// Wall-clock duration
    pub duration: Duration,
}

/// Aggregated verdicts for a suite run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Individual outcomes in execution order
    pub outcomes: Vec<ScenarioOutcome>,
}

impl SuiteReport {
    /// Create an empty report
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one outcome
    pub fn push(&mut self, outcome: ScenarioOutcome) {
        self.outcomes.push(outcome);
    }

    /// Count of passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.verdict.is_passed()).count()
    }

    /// Count of failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.verdict.is_failed()).count()
    }

    /// Count of skipped scenarios
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.verdict.is_skipped()).count()
    }

    /// True when no scenario failed (skips allowed)
    #[must_use]
    pub fn all_green(&self) -> bool {
        self.failed_count() == 0
    }

    /// Total wall-clock time across scenarios
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.outcomes.iter().map(|o| o.duration).sum()
    }

    /// Render a text summary
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for outcome in &self.outcomes {
            let tag = match &outcome.verdict {
                Verdict::Passed => "PASS",
                Verdict::Failed { .. } => "FAIL",
                Verdict::Skipped { .. } => "SKIP",
            };
            out.push_str(&format!(
                "{tag} {} ({:.1}s)",
                outcome.name,
                outcome.duration.as_secs_f64()
            ));
            if let Some(diagnostic) = outcome.verdict.diagnostic() {
                out.push_str(&format!(": {diagnostic}"));
            }
            out.push('\n');
        }
        out.push_str(&format!(
            "{} passed, {} failed, {} skipped ({:.1}s)\n",
            self.passed_count(),
            self.failed_count(),
            self.skipped_count(),
            self.total_duration().as_secs_f64()
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_machine_happy_path() {
        let mut scenario = Scenario::begin("valid login");
        assert_eq!(scenario.state(), ScenarioState::NotStarted);

        scenario.routes_discovered();
        assert_eq!(scenario.state(), ScenarioState::RoutesDiscovered);

        scenario.actions_in_flight();
        assert_eq!(scenario.state(), ScenarioState::ActionsInFlight);

        let outcome = scenario.pass();
        assert!(outcome.verdict.is_passed());
        assert_eq!(outcome.name, "valid login");
    }

    #[test]
    fn test_skip_is_not_failure() {
        let mut scenario = Scenario::begin("update entity");
        scenario.routes_discovered();
        let outcome = scenario.skip("no row actions menu found");

        assert!(outcome.verdict.is_skipped());
        assert!(!outcome.verdict.is_failed());
        assert_eq!(
            outcome.verdict.diagnostic(),
            Some("no row actions menu found")
        );
    }

    #[test]
    fn test_fail_carries_diagnostic() {
        let mut scenario = Scenario::begin("invalid login");
        scenario.routes_discovered();
        scenario.actions_in_flight();
        let outcome = scenario.fail("logout control visible after bad password");

        assert!(outcome.verdict.is_failed());
        assert!(outcome
            .verdict
            .diagnostic()
            .unwrap()
            .contains("logout control"));
    }

    #[test]
    fn test_terminal_states() {
        assert!(ScenarioState::Verified { passed: true }.is_terminal());
        assert!(ScenarioState::Verified { passed: false }.is_terminal());
        assert!(ScenarioState::Aborted.is_terminal());
        assert!(!ScenarioState::ActionsInFlight.is_terminal());
    }

    #[test]
    fn test_report_counts_and_render() {
        let mut report = SuiteReport::new();
        report.push(ScenarioOutcome {
            name: "valid login".to_string(),
            verdict: Verdict::Passed,
            duration: Duration::from_millis(1500),
        });
        report.push(ScenarioOutcome {
            name: "delete entity".to_string(),
            verdict: Verdict::skipped("no confirm dialog"),
            duration: Duration::from_millis(400),
        });
        report.push(ScenarioOutcome {
            name: "route guard".to_string(),
            verdict: Verdict::failed("dashboard reachable while logged out"),
            duration: Duration::from_millis(900),
        });

        assert_eq!(report.passed_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.skipped_count(), 1);
        assert!(!report.all_green());

        let rendered = report.render();
        assert!(rendered.contains("PASS valid login"));
        assert!(rendered.contains("SKIP delete entity"));
        assert!(rendered.contains("no confirm dialog"));
        assert!(rendered.contains("FAIL route guard"));
        assert!(rendered.contains("1 passed, 1 failed, 1 skipped"));
    }

    #[test]
    fn test_all_green_with_skips() {
        let mut report = SuiteReport::new();
        report.push(ScenarioOutcome {
            name: "create entity".to_string(),
            verdict: Verdict::skipped("no create affordance"),
            duration: Duration::ZERO,
        });
        assert!(report.all_green());
    }
}
