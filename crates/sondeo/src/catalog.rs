//! Selector catalog: semantic intents and their candidate lists.
//!
//! The catalog is a pure mapping from an abstract UI target (an [`Intent`])
//! to an ordered list of [`Candidate`] strategies. It is defined statically
//! and immutable during a run. An intent with no candidates is a
//! configuration defect caught by the catalog tests, not a runtime error.
//!
//! Candidate ordering encodes trust: role/name queries lead, attribute
//! conventions follow, structural CSS classes come last.

use crate::selector::{Candidate, Strategy};

/// A named abstract UI target, independent of the application's markup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Email input on login/signup forms
    EmailField,
    /// Password input
    PasswordField,
    /// Confirm-password input on signup forms
    ConfirmPasswordField,
    /// Full-name input on signup forms
    FullNameField,
    /// Entity title input
    TitleField,
    /// Entity description input
    DescriptionField,
    /// Form submission control
    SubmitAction,
    /// Logout control
    LogoutAction,
    /// Navigation affordance leading to the login page
    LoginNavigation,
    /// Navigation affordance leading to the signup page
    SignupNavigation,
    /// Control that starts entity creation
    CreateAction,
    /// Save control inside a create/edit dialog
    SaveAction,
    /// Cancel/close control inside a dialog
    CancelAction,
    /// Per-row actions menu trigger in an entity table
    RowActionsMenu,
    /// Edit option inside an opened row menu
    EditMenuItem,
    /// Delete option inside an opened row menu
    DeleteMenuItem,
    /// Destructive confirmation control in a confirm dialog
    ConfirmDeleteAction,
    /// Error feedback (validation messages, alerts)
    ErrorIndicator,
    /// Success feedback (toasts, banners)
    SuccessIndicator,
    /// Duplicate-registration feedback
    DuplicateEmailError,
    /// Access-denied feedback on guarded routes
    AccessDeniedIndicator,
    /// Any evidence of an authenticated session
    AuthenticatedIndicator,
    /// The login form itself
    LoginForm,
    /// A modal or confirmation dialog
    ModalDialog,
    /// User/account menu in the chrome
    UserMenu,
    /// Entity listing table
    DataTable,
    /// In-flight feedback (spinners, busy markers)
    LoadingIndicator,
}

impl Intent {
    /// Every intent the catalog defines
    pub const ALL: [Self; 27] = [
        Self::EmailField,
        Self::PasswordField,
        Self::ConfirmPasswordField,
        Self::FullNameField,
        Self::TitleField,
        Self::DescriptionField,
        Self::SubmitAction,
        Self::LogoutAction,
        Self::LoginNavigation,
        Self::SignupNavigation,
        Self::CreateAction,
        Self::SaveAction,
        Self::CancelAction,
        Self::RowActionsMenu,
        Self::EditMenuItem,
        Self::DeleteMenuItem,
        Self::ConfirmDeleteAction,
        Self::ErrorIndicator,
        Self::SuccessIndicator,
        Self::DuplicateEmailError,
        Self::AccessDeniedIndicator,
        Self::AuthenticatedIndicator,
        Self::LoginForm,
        Self::ModalDialog,
        Self::UserMenu,
        Self::DataTable,
        Self::LoadingIndicator,
    ];

    /// Human-readable intent name for diagnostics
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::EmailField => "email field",
            Self::PasswordField => "password field",
            Self::ConfirmPasswordField => "confirm password field",
            Self::FullNameField => "full name field",
            Self::TitleField => "title field",
            Self::DescriptionField => "description field",
            Self::SubmitAction => "submit action",
            Self::LogoutAction => "logout action",
            Self::LoginNavigation => "login navigation",
            Self::SignupNavigation => "signup navigation",
            Self::CreateAction => "create action",
            Self::SaveAction => "save action",
            Self::CancelAction => "cancel action",
            Self::RowActionsMenu => "row actions menu",
            Self::EditMenuItem => "edit menu item",
            Self::DeleteMenuItem => "delete menu item",
            Self::ConfirmDeleteAction => "confirm delete action",
            Self::ErrorIndicator => "error indicator",
            Self::SuccessIndicator => "success indicator",
            Self::DuplicateEmailError => "duplicate email error",
            Self::AccessDeniedIndicator => "access denied indicator",
            Self::AuthenticatedIndicator => "authenticated indicator",
            Self::LoginForm => "login form",
            Self::ModalDialog => "modal dialog",
            Self::UserMenu => "user menu",
            Self::DataTable => "data table",
            Self::LoadingIndicator => "loading indicator",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordered candidate list for an intent. First match wins.
#[must_use]
pub fn candidates_for(intent: Intent) -> Vec<Candidate> {
    let strategies = match intent {
        Intent::EmailField => vec![
            Strategy::role("textbox", "email"),
            Strategy::attribute("input", "type", "email"),
            Strategy::attribute_contains("input", "placeholder", "email"),
            Strategy::attribute("input", "name", "email"),
        ],
        Intent::PasswordField => vec![
            Strategy::attribute("input", "name", "password"),
            Strategy::role_exact("textbox", "password"),
            Strategy::attribute("input", "type", "password"),
        ],
        Intent::ConfirmPasswordField => vec![
            Strategy::attribute("input", "name", "confirm_password"),
            Strategy::role_exact("textbox", "confirm password"),
            Strategy::attribute_contains("input", "name", "confirm"),
        ],
        Intent::FullNameField => vec![
            Strategy::role("textbox", "full name"),
            Strategy::attribute("input", "name", "full_name"),
            Strategy::attribute("input", "name", "fullName"),
            Strategy::attribute_contains("input", "placeholder", "name"),
        ],
        Intent::TitleField => vec![
            Strategy::role("textbox", "title"),
            Strategy::attribute("input", "name", "title"),
            Strategy::attribute_contains("input", "placeholder", "title"),
            Strategy::css("input#title"),
        ],
        Intent::DescriptionField => vec![
            Strategy::role("textbox", "description"),
            Strategy::attribute("textarea", "name", "description"),
            Strategy::attribute("input", "name", "description"),
            Strategy::css("textarea#description"),
        ],
        Intent::SubmitAction => vec![
            Strategy::role(
                "button",
                "log in|sign in|submit|continue|sign up|create account|register",
            ),
            Strategy::attribute("button", "type", "submit"),
        ],
        Intent::LogoutAction => vec![
            Strategy::role("button", "logout|log out|sign out"),
            Strategy::role("link", "logout|log out|sign out"),
            Strategy::text("log out|logout|sign out"),
            Strategy::css("[data-testid*=\"logout\"], [data-cy*=\"logout\"]"),
        ],
        Intent::LoginNavigation => vec![
            Strategy::text("sign in|log in|login"),
            Strategy::attribute_contains("a", "href", "login"),
            Strategy::role("button", "sign in|log in"),
        ],
        Intent::SignupNavigation => vec![
            Strategy::text("sign up|create account|register"),
            Strategy::attribute_contains("a", "href", "signup"),
            Strategy::attribute_contains("a", "href", "register"),
            Strategy::role("button", "sign up|create account"),
        ],
        Intent::CreateAction => vec![
            Strategy::role("button", "add|create|new"),
            Strategy::role("link", "add|create|new"),
            Strategy::css("button[aria-label*=\"add\"], button[aria-label*=\"create\"]"),
            Strategy::css("[data-testid*=\"add\"], [data-testid*=\"create\"]"),
        ],
        Intent::SaveAction => vec![
            Strategy::role_exact("button", "save"),
            Strategy::attribute("button", "type", "submit"),
        ],
        Intent::CancelAction => vec![
            Strategy::role("button", "cancel|close"),
            Strategy::css("[aria-label=\"Close\"]"),
        ],
        Intent::RowActionsMenu => vec![
            Strategy::css("tbody button[aria-haspopup=\"menu\"]"),
            Strategy::css("table button[data-scope=\"menu\"][data-part=\"trigger\"]"),
            Strategy::css("td button[aria-haspopup=\"menu\"]"),
            Strategy::css("tbody button:has(svg)"),
            Strategy::css("tr button:has(svg)"),
        ],
        Intent::EditMenuItem => vec![
            Strategy::role("menuitem", "edit"),
            Strategy::role("button", "edit"),
            Strategy::role("link", "edit"),
        ],
        Intent::DeleteMenuItem => vec![
            Strategy::role("menuitem", "delete"),
            Strategy::role("button", "delete|remove"),
            Strategy::role("link", "delete|remove"),
        ],
        Intent::ConfirmDeleteAction => vec![
            Strategy::role_exact("button", "delete"),
            Strategy::role("button", "confirm"),
            Strategy::css("[role=\"alertdialog\"] button[class*=\"danger\"]"),
        ],
        Intent::ErrorIndicator => vec![
            Strategy::role("alert", ""),
            Strategy::css(".error, .alert-error, .field-error, .validation-error"),
            Strategy::css(".text-red-500, .text-danger"),
            Strategy::text("error|invalid|required|must be"),
        ],
        Intent::SuccessIndicator => vec![
            Strategy::css(".success, .alert-success, .toast-success"),
            Strategy::css(".text-green-500, .text-success"),
            Strategy::text("success|created|updated|saved"),
        ],
        Intent::DuplicateEmailError => vec![
            Strategy::text(
                "already exists|already registered|already in use|email taken|user exists|email in use",
            ),
            Strategy::role("alert", "already|exists|taken|in use"),
        ],
        Intent::AccessDeniedIndicator => vec![
            Strategy::text("access denied|unauthorized|forbidden|not authorized"),
            Strategy::text("login required|please login|please sign in|sign in required"),
            Strategy::role("alert", "access|login|auth"),
        ],
        Intent::AuthenticatedIndicator => vec![
            Strategy::role("button", "logout|log out|sign out"),
            Strategy::role("heading", "dashboard"),
            Strategy::role("link", "dashboard"),
            Strategy::text("dashboard|profile"),
            Strategy::css(".user-menu, .account-menu, .profile-menu, [data-testid*=\"user\"]"),
        ],
        Intent::LoginForm => vec![
            Strategy::css("form input[type=\"password\"]"),
            Strategy::attribute("input", "type", "password"),
        ],
        Intent::ModalDialog => vec![
            Strategy::role("dialog", ""),
            Strategy::css(".modal, .chakra-modal, .overlay"),
        ],
        Intent::UserMenu => vec![
            Strategy::css(".user-menu, .account-menu, .profile-menu"),
            Strategy::css(
                "[aria-label*=\"user\"], [aria-label*=\"account\"], [aria-label*=\"profile\"]",
            ),
        ],
        Intent::DataTable => vec![
            Strategy::role("table", ""),
            Strategy::css(".table, .users-table, .user-list"),
        ],
        Intent::LoadingIndicator => vec![
            Strategy::css(".loading, .spinner, [aria-busy=\"true\"]"),
            Strategy::text("loading|please wait"),
        ],
    };

    strategies.into_iter().map(Candidate::new).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_intent_has_candidates() {
        for intent in Intent::ALL {
            let candidates = candidates_for(intent);
            assert!(
                !candidates.is_empty(),
                "intent '{intent}' has an empty candidate list"
            );
        }
    }

    #[test]
    fn test_no_duplicate_strategies_within_an_intent() {
        for intent in Intent::ALL {
            let candidates = candidates_for(intent);
            let mut seen = HashSet::new();
            for candidate in &candidates {
                let key = format!("{:?}", candidate.strategy);
                assert!(
                    seen.insert(key),
                    "intent '{intent}' lists a duplicate strategy: {}",
                    candidate.describe()
                );
            }
        }
    }

    #[test]
    fn test_catalog_is_stable_across_calls() {
        for intent in Intent::ALL {
            assert_eq!(candidates_for(intent), candidates_for(intent));
        }
    }

    #[test]
    fn test_role_strategies_lead_attribute_and_css_follow() {
        // Stable tiers first: the email field must prefer the role query
        // over the structural fallbacks.
        let email = candidates_for(Intent::EmailField);
        assert_eq!(email[0].strategy.kind(), "role");

        let menu = candidates_for(Intent::RowActionsMenu);
        assert!(menu.iter().all(|c| c.strategy.kind() == "structure"));
    }

    #[test]
    fn test_password_field_prefers_name_attribute() {
        // Matching "password" by fuzzy role name would also hit the
        // confirm-password box; the name attribute is the discriminating
        // signal and must come first.
        let pw = candidates_for(Intent::PasswordField);
        assert_eq!(
            pw[0].strategy,
            crate::selector::Strategy::attribute("input", "name", "password")
        );
    }

    #[test]
    fn test_submit_action_covers_auth_verbs() {
        let submit = candidates_for(Intent::SubmitAction);
        let described = submit[0].describe();
        for verb in ["log in", "sign in", "sign up", "register"] {
            assert!(described.contains(verb), "missing verb {verb}");
        }
    }

    #[test]
    fn test_intent_labels_are_unique() {
        let mut labels = HashSet::new();
        for intent in Intent::ALL {
            assert!(labels.insert(intent.label()));
        }
    }
}
