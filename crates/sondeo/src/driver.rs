//! Abstract driver boundary over the browser-automation layer.
//!
//! The engine consumes navigation, resolution, and interaction through this
//! trait and nothing else. Two implementations ship with the crate: a real
//! CDP driver (feature `browser`, see [`crate::browser`]) and a deterministic
//! in-memory application model for tests (see [`crate::sim`]).
//!
//! Ordinary "did not match" outcomes are values ([`Resolution::NotFound`]),
//! never errors. `Err` from a driver method signals an infrastructure
//! failure: lost connection, malformed selector, detached element.

use crate::result::SondeoResult;
use crate::selector::Strategy;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Handle to a resolved element.
///
/// Carries the strategy that won the probe so follow-up interactions can
/// re-target the same element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Strategy that resolved this element
    pub strategy: Strategy,
    /// Text content at resolution time, when the driver can cheaply read it
    pub text: Option<String>,
}

impl ElementHandle {
    /// Create a handle for a winning strategy
    #[must_use]
    pub const fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            text: None,
        }
    }

    /// Attach resolved text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Outcome of evaluating one strategy against the live application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A visible element matched
    Found(ElementHandle),
    /// No visible element matched
    NotFound,
}

impl Resolution {
    /// True when an element was found
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// The handle, if found
    #[must_use]
    pub fn handle(self) -> Option<ElementHandle> {
        match self {
            Self::Found(handle) => Some(handle),
            Self::NotFound => None,
        }
    }
}

/// Driver operations the engine depends on.
///
/// Implementations must make every operation resolve or fail within a
/// bounded time; the engine layers its own timeouts on top and never
/// tolerates an indefinite hang.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Navigate to a path (relative to the configured origin) or full URL
    async fn goto(&self, path_or_url: &str) -> SondeoResult<()>;

    /// Current page URL
    async fn current_url(&self) -> SondeoResult<String>;

    /// Evaluate one strategy against the current page
    async fn resolve(&self, strategy: &Strategy) -> SondeoResult<Resolution>;

    /// Click the element behind a handle
    async fn click(&self, handle: &ElementHandle) -> SondeoResult<()>;

    /// Clear then set the value of the field behind a handle
    async fn fill(&self, handle: &ElementHandle, value: &str) -> SondeoResult<()>;

    /// Press a key with the element behind a handle focused
    async fn press(&self, handle: &ElementHandle, key: &str) -> SondeoResult<()>;

    /// Wait until the application is judged to have finished reacting to the
    /// last interaction (network-idle equivalent). Best-effort: returns `Ok`
    /// at the deadline even if activity continues.
    async fn wait_for_settle(&self, timeout: Duration) -> SondeoResult<()>;

    /// Drop session state (cookies, local storage). Fallback path for
    /// logout scenarios when no logout affordance is discoverable.
    async fn clear_session(&self) -> SondeoResult<()>;
}

/// Current URL's path component, tolerating bare paths
#[must_use]
pub fn url_path(url: &str) -> String {
    let without_scheme = url
        .split_once("://")
        .map_or(url, |(_, rest)| rest);
    let path_start = without_scheme.find('/').unwrap_or(without_scheme.len());
    let path = &without_scheme[path_start..];
    let end = path
        .find(['?', '#'])
        .unwrap_or(path.len());
    let path = &path[..end];
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}
