//! Locator strategies for element selection.
//!
//! A [`Strategy`] is one concrete way of locating the element behind a
//! semantic intent. Strategies are declarative tagged variants so the prober
//! stays strategy-agnostic: every strategy is evaluated through the single
//! polymorphic `Driver::resolve` interface.
//!
//! Strategy lists mix reliability tiers on purpose: stable role-based
//! queries first, brittle structural CSS last. Order within a list is the
//! candidate's priority; first match wins.

use serde::{Deserialize, Serialize};

/// How a name or text parameter is matched against the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchMode {
    /// Whole-string match, ASCII case-insensitive
    Exact,
    /// Case-insensitive substring match
    Fuzzy,
}

/// One concrete strategy for locating an element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// Match by ARIA role (explicit or implicit) and accessible name.
    ///
    /// `name` may be an alternation (`"log in|sign in|submit"`); any
    /// alternative matching the element's accessible name counts.
    ByRole {
        /// ARIA role ("button", "link", "textbox", "alert", ...)
        role: String,
        /// Accessible-name pattern; empty matches any name
        name: String,
        /// Name matching mode
        mode: MatchMode,
    },
    /// Match by visible text content
    ByText {
        /// Text pattern, `|`-separated alternatives
        text: String,
        /// Text matching mode
        mode: MatchMode,
    },
    /// Match by tag and attribute value
    ByAttribute {
        /// Element tag name ("input", "a", ...); empty matches any tag
        tag: String,
        /// Attribute name ("name", "type", "href", "placeholder", ...)
        attribute: String,
        /// Attribute value pattern
        value: String,
        /// Value matching mode
        mode: MatchMode,
    },
    /// Match by raw structural CSS selector (last-resort tier)
    ByStructure {
        /// CSS selector, comma-separated alternatives allowed
        css: String,
    },
}

impl Strategy {
    /// Role + accessible-name strategy with fuzzy matching
    #[must_use]
    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::ByRole {
            role: role.into(),
            name: name.into(),
            mode: MatchMode::Fuzzy,
        }
    }

    /// Role + accessible-name strategy with exact matching
    #[must_use]
    pub fn role_exact(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::ByRole {
            role: role.into(),
            name: name.into(),
            mode: MatchMode::Exact,
        }
    }

    /// Visible-text strategy with fuzzy matching
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::ByText {
            text: text.into(),
            mode: MatchMode::Fuzzy,
        }
    }

    /// Visible-text strategy with exact matching
    #[must_use]
    pub fn text_exact(text: impl Into<String>) -> Self {
        Self::ByText {
            text: text.into(),
            mode: MatchMode::Exact,
        }
    }

    /// Tag + attribute strategy with exact value matching
    #[must_use]
    pub fn attribute(
        tag: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::ByAttribute {
            tag: tag.into(),
            attribute: attribute.into(),
            value: value.into(),
            mode: MatchMode::Exact,
        }
    }

    /// Tag + attribute strategy with substring value matching
    #[must_use]
    pub fn attribute_contains(
        tag: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::ByAttribute {
            tag: tag.into(),
            attribute: attribute.into(),
            value: value.into(),
            mode: MatchMode::Fuzzy,
        }
    }

    /// Structural CSS strategy
    #[must_use]
    pub fn css(css: impl Into<String>) -> Self {
        Self::ByStructure { css: css.into() }
    }

    /// Strategy kind as a short tag, for diagnostics
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ByRole { .. } => "role",
            Self::ByText { .. } => "text",
            Self::ByAttribute { .. } => "attribute",
            Self::ByStructure { .. } => "structure",
        }
    }

    /// CSS selector set covering a role's explicit and implicit markup
    #[must_use]
    pub fn role_selector(role: &str) -> String {
        match role {
            "button" => {
                "button, [role=\"button\"], input[type=\"submit\"], input[type=\"button\"]"
                    .to_string()
            }
            "link" => "a[href], [role=\"link\"]".to_string(),
            "textbox" => {
                "input:not([type=\"checkbox\"]):not([type=\"radio\"]):not([type=\"submit\"])\
                 :not([type=\"button\"]):not([type=\"hidden\"]), textarea, [role=\"textbox\"]"
                    .to_string()
            }
            "heading" => "h1, h2, h3, h4, h5, h6, [role=\"heading\"]".to_string(),
            "dialog" => "dialog, [role=\"dialog\"], [role=\"alertdialog\"]".to_string(),
            "navigation" => "nav, [role=\"navigation\"]".to_string(),
            "table" => "table, [role=\"table\"]".to_string(),
            "row" => "tr, [role=\"row\"]".to_string(),
            other => format!("[role={other:?}]"),
        }
    }

    /// Compile to a JavaScript expression resolving to the first visible
    /// matching element, or `null`.
    ///
    /// Consumed by the CDP driver; the simulated driver matches the variant
    /// structurally instead.
    #[must_use]
    pub fn finder_js(&self) -> String {
        let vis = "const vis = el => !!el && el.getClientRects().length > 0 \
                   && getComputedStyle(el).visibility !== 'hidden';";
        let name_fn = "const nm = el => (el.getAttribute('aria-label') || el.placeholder \
                       || el.labels?.[0]?.textContent || el.textContent || el.name || '')\
                       .trim().toLowerCase();";
        let matcher = |pattern: &str, mode: MatchMode| {
            let alts: Vec<String> = pattern
                .split('|')
                .map(|a| a.trim().to_lowercase())
                .collect();
            let alts_js = serde_json::to_string(&alts).unwrap_or_else(|_| "[]".to_string());
            match mode {
                MatchMode::Exact => format!("{alts_js}.some(a => hay === a)"),
                MatchMode::Fuzzy => format!("{alts_js}.some(a => hay.includes(a))"),
            }
        };

        match self {
            Self::ByRole { role, name, mode } => {
                let selector = Self::role_selector(role);
                if name.is_empty() {
                    format!(
                        "(() => {{ {vis} \
                         return Array.from(document.querySelectorAll({selector:?}))\
                         .find(el => vis(el)) || null; }})()"
                    )
                } else {
                    let test = matcher(name, *mode);
                    format!(
                        "(() => {{ {vis} {name_fn} \
                         return Array.from(document.querySelectorAll({selector:?}))\
                         .find(el => vis(el) && (() => {{ const hay = nm(el); return {test}; }})()) \
                         || null; }})()"
                    )
                }
            }
            Self::ByText { text, mode } => {
                let test = matcher(text, *mode);
                format!(
                    "(() => {{ {vis} \
                     return Array.from(document.querySelectorAll('body *'))\
                     .filter(el => el.children.length === 0)\
                     .find(el => vis(el) && (() => {{ \
                       const hay = (el.textContent || '').trim().toLowerCase(); \
                       return {test}; }})()) || null; }})()"
                )
            }
            Self::ByAttribute {
                tag,
                attribute,
                value,
                mode,
            } => {
                let tag_sel = if tag.is_empty() { "*" } else { tag.as_str() };
                let op = match mode {
                    MatchMode::Exact => "=",
                    MatchMode::Fuzzy => "*=",
                };
                let selector = format!("{tag_sel}[{attribute}{op}{value:?}]");
                format!(
                    "(() => {{ {vis} \
                     return Array.from(document.querySelectorAll({selector:?}))\
                     .find(el => vis(el)) || null; }})()"
                )
            }
            Self::ByStructure { css } => {
                format!(
                    "(() => {{ {vis} \
                     return Array.from(document.querySelectorAll({css:?}))\
                     .find(el => vis(el)) || null; }})()"
                )
            }
        }
    }

    /// JavaScript expression evaluating to `true` when a visible match exists
    #[must_use]
    pub fn visibility_js(&self) -> String {
        format!("!!({})", self.finder_js())
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ByRole { role, name, .. } if name.is_empty() => write!(f, "role={role}"),
            Self::ByRole { role, name, .. } => write!(f, "role={role}[name~{name}]"),
            Self::ByText { text, .. } => write!(f, "text~{text}"),
            Self::ByAttribute {
                tag,
                attribute,
                value,
                ..
            } => write!(f, "{tag}[{attribute}~{value}]"),
            Self::ByStructure { css } => write!(f, "css({css})"),
        }
    }
}

/// One candidate in an intent's ordered list.
///
/// Priority is positional: earlier candidates are preferred, and the first
/// match wins over any later, possibly better one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// The locator strategy
    pub strategy: Strategy,
}

impl Candidate {
    /// Wrap a strategy as a candidate
    #[must_use]
    pub const fn new(strategy: Strategy) -> Self {
        Self { strategy }
    }

    /// Human-readable description for diagnostics
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{} ({})", self.strategy, self.strategy.kind())
    }
}

impl From<Strategy> for Candidate {
    fn from(strategy: Strategy) -> Self {
        Self::new(strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod strategy_tests {
        use super::*;

        #[test]
        fn test_role_strategy_defaults_to_fuzzy() {
            let s = Strategy::role("button", "submit");
            assert!(matches!(
                s,
                Strategy::ByRole {
                    mode: MatchMode::Fuzzy,
                    ..
                }
            ));
        }

        #[test]
        fn test_role_exact_strategy() {
            let s = Strategy::role_exact("textbox", "password");
            assert!(matches!(
                s,
                Strategy::ByRole {
                    mode: MatchMode::Exact,
                    ..
                }
            ));
        }

        #[test]
        fn test_kind_tags() {
            assert_eq!(Strategy::role("button", "save").kind(), "role");
            assert_eq!(Strategy::text("welcome").kind(), "text");
            assert_eq!(Strategy::attribute("input", "type", "email").kind(), "attribute");
            assert_eq!(Strategy::css(".modal").kind(), "structure");
        }

        #[test]
        fn test_role_selector_covers_implicit_markup() {
            let sel = Strategy::role_selector("button");
            assert!(sel.contains("button"));
            assert!(sel.contains("[role=\"button\"]"));
            assert!(sel.contains("input[type=\"submit\"]"));
        }

        #[test]
        fn test_role_selector_unknown_role_falls_back_to_aria() {
            assert_eq!(Strategy::role_selector("menuitem"), "[role=\"menuitem\"]");
        }
    }

    mod finder_js_tests {
        use super::*;

        #[test]
        fn test_role_finder_queries_role_selector() {
            let js = Strategy::role("button", "save").finder_js();
            assert!(js.contains("querySelectorAll"));
            assert!(js.contains("role=\\\"button\\\""));
            assert!(js.contains("save"));
        }

        #[test]
        fn test_text_finder_checks_text_content() {
            let js = Strategy::text("Sign up").finder_js();
            assert!(js.contains("textContent"));
            assert!(js.contains("sign up"));
        }

        #[test]
        fn test_attribute_finder_builds_attribute_selector() {
            let js = Strategy::attribute_contains("a", "href", "login").finder_js();
            assert!(js.contains("href*="));
            assert!(js.contains("login"));
        }

        #[test]
        fn test_structure_finder_uses_raw_css() {
            let js = Strategy::css(".error, .alert-error").finder_js();
            assert!(js.contains(".error, .alert-error"));
        }

        #[test]
        fn test_visibility_js_is_boolean_coerced() {
            let js = Strategy::text("loading").visibility_js();
            assert!(js.starts_with("!!("));
        }

        #[test]
        fn test_alternation_expands_to_every_alternative() {
            let js = Strategy::role("button", "log in|sign in|submit").finder_js();
            assert!(js.contains("log in"));
            assert!(js.contains("sign in"));
            assert!(js.contains("submit"));
        }
    }

    mod candidate_tests {
        use super::*;

        #[test]
        fn test_describe_names_strategy_and_kind() {
            let c = Candidate::new(Strategy::role("button", "logout|sign out"));
            let d = c.describe();
            assert!(d.contains("logout"));
            assert!(d.contains("(role)"));
        }

        #[test]
        fn test_from_strategy() {
            let c: Candidate = Strategy::css("nav").into();
            assert_eq!(c.strategy.kind(), "structure");
        }
    }
}
