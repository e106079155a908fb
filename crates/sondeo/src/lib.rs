//! Sondeo: adaptive UI-probing and outcome-verification engine for
//! black-box browser testing.
//!
//! Sondeo drives a web application through a driver boundary and validates
//! authentication flows and entity CRUD without hardcoded coupling to the
//! application's markup. Elements and routes are located through ordered
//! candidate strategies, and outcomes are verified through disjunctions of
//! redundant signals, because no single reliable signal is guaranteed to
//! exist in a black-box target.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     SONDEO Architecture                           │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌──────────────┐   ┌──────────┐   ┌───────────┐  │
//! │  │ Scenario │──►│ Route        │──►│ Action   │──►│ Outcome   │  │
//! │  │ (flows)  │   │ Discoverer   │   │ Executor │   │ Verifier  │  │
//! │  └──────────┘   └──────────────┘   └────┬─────┘   └─────┬─────┘  │
//! │                                         │               │        │
//! │                  ┌──────────────┐   ┌───▼─────────┐     │        │
//! │                  │ Selector     │──►│ Candidate   │◄────┘        │
//! │                  │ Catalog      │   │ Prober      │              │
//! │                  └──────────────┘   └───┬─────────┘              │
//! │                                         ▼                        │
//! │                    Driver boundary (CDP browser / simulation)    │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design rules
//!
//! - **First match wins.** Candidate lists are ordered by trust; the prober
//!   never picks a "better" later match over an earlier one.
//! - **No-match is a value.** Strategy evaluation returns
//!   [`driver::Resolution`]; errors are reserved for infrastructure
//!   failures, and the prober swallows those per candidate.
//! - **Any-one-true verification.** A [`verify::VerificationSet`] is a
//!   disjunction polled in a bounded loop; one signal is enough.
//! - **Skip is not fail.** A scenario whose precondition probe exhausts
//!   reports [`scenario::Verdict::Skipped`] with a diagnostic, never a
//!   failure.

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

pub mod action;
#[cfg(feature = "browser")]
pub mod browser;
pub mod catalog;
pub mod config;
pub mod data;
pub mod driver;
pub mod flows;
pub mod pattern;
pub mod probe;
pub mod result;
pub mod routes;
pub mod scenario;
pub mod selector;
pub mod sim;
pub mod verify;

pub use action::ActionExecutor;
pub use catalog::{candidates_for, Intent};
pub use config::SuiteConfig;
pub use driver::{Driver, ElementHandle, Resolution};
pub use pattern::UrlPattern;
pub use probe::{ProbeResult, Prober};
pub use result::{SondeoError, SondeoResult};
pub use routes::{discover, Route, RouteTable};
pub use scenario::{Scenario, ScenarioOutcome, ScenarioState, SuiteReport, Verdict};
pub use selector::{Candidate, MatchMode, Strategy};
pub use sim::{SimOptions, SimulatedApp};
pub use verify::{Signal, VerificationSet, Verifier};

#[cfg(feature = "browser")]
pub use browser::BrowserDriver;
