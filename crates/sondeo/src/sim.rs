//! Simulated application driver.
//!
//! A deterministic in-memory model of a small web application (auth flows,
//! route guards, and an entity table with modal CRUD) implementing the
//! [`Driver`] boundary. It exists so the whole engine can be exercised
//! end-to-end without a browser: elements are addressable by role, name,
//! text, attribute, and structural selector, exactly the affordance surface
//! the catalog assumes.
//!
//! The page set is rendered declaratively from application state on every
//! driver call, and interactions mutate that state the way conventional web
//! apps do: successful login redirects, failed login raises an ARIA alert
//! and stays, guarded paths bounce to the login page, modal saves append
//! table rows and raise a toast.
//!
//! [`SimOptions`] removes affordances or moves routes so degraded-discovery
//! and fallback paths stay testable. `action_latency` defers the effect of
//! form submissions, which is what makes verifier timing observable.

use crate::driver::{Driver, ElementHandle, Resolution};
use crate::result::{SondeoError, SondeoResult};
use crate::selector::{MatchMode, Strategy};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Where the logout affordance lives, if anywhere
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutStyle {
    /// Logout button directly in the page chrome
    DirectButton,
    /// Logout entry hidden inside the user menu
    InUserMenu,
    /// No logout affordance at all
    None,
}

/// Configuration knobs for the simulated application
#[derive(Debug, Clone)]
pub struct SimOptions {
    /// Application origin
    pub base_url: String,
    /// Concrete login path
    pub login_path: String,
    /// Concrete signup path
    pub signup_path: String,
    /// Concrete dashboard path
    pub dashboard_path: String,
    /// Concrete entity list path
    pub items_path: String,
    /// Render a login link on the home page
    pub home_login_link: bool,
    /// Render a signup link on the home page
    pub home_signup_link: bool,
    /// Render a submit button on the login form
    pub login_submit_button: bool,
    /// Render the create control on the entity list
    pub create_button: bool,
    /// Logout affordance placement
    pub logout_style: LogoutStyle,
    /// Render an access-denied banner after a guard redirect
    pub access_denied_banner: bool,
    /// Raise success toasts after CRUD saves
    pub success_toasts: bool,
    /// Delay before form submissions take effect
    pub action_latency: Duration,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5173".to_string(),
            login_path: "/login".to_string(),
            signup_path: "/signup".to_string(),
            dashboard_path: "/dashboard".to_string(),
            items_path: "/items".to_string(),
            home_login_link: true,
            home_signup_link: true,
            login_submit_button: true,
            create_button: true,
            logout_style: LogoutStyle::DirectButton,
            access_denied_banner: true,
            success_toasts: true,
            action_latency: Duration::ZERO,
        }
    }
}

/// Form fields the simulated pages expose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Field {
    Email,
    Password,
    ConfirmPassword,
    FullName,
    Title,
    Description,
}

/// What clicking an element does
#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Navigate(String),
    SubmitLogin,
    SubmitSignup,
    Logout,
    OpenUserMenu,
    OpenCreateModal,
    OpenRowMenu(usize),
    MenuEdit,
    MenuDelete,
    SaveModal,
    CancelModal,
    ConfirmDelete,
}

/// Currently open overlay, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Overlay {
    None,
    UserMenu,
    RowMenu(usize),
    CreateModal,
    EditModal(usize),
    DeleteConfirm(usize),
}

/// One renderable element
#[derive(Debug, Clone)]
struct Element {
    tag: &'static str,
    role: Option<&'static str>,
    name: Option<String>,
    text: Option<String>,
    attrs: Vec<(&'static str, String)>,
    classes: Vec<&'static str>,
    selectors: Vec<&'static str>,
    field: Option<Field>,
    action: Option<Action>,
}

impl Element {
    fn new(tag: &'static str) -> Self {
        Self {
            tag,
            role: None,
            name: None,
            text: None,
            attrs: Vec::new(),
            classes: Vec::new(),
            selectors: Vec::new(),
            field: None,
            action: None,
        }
    }

    fn role(mut self, role: &'static str) -> Self {
        self.role = Some(role);
        self
    }

    fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    fn attr(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((key, value.into()));
        self
    }

    fn class(mut self, class: &'static str) -> Self {
        self.classes.push(class);
        self
    }

    fn selector(mut self, selector: &'static str) -> Self {
        self.selectors.push(selector);
        self
    }

    fn field(mut self, field: Field) -> Self {
        self.field = Some(field);
        self
    }

    fn action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    fn attr_value(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Implicit ARIA role derived from markup, when none is declared
    fn effective_role(&self) -> Option<&str> {
        if let Some(role) = self.role {
            return Some(role);
        }
        match self.tag {
            "button" => Some("button"),
            "a" if self.attr_value("href").is_some() => Some("link"),
            "textarea" => Some("textbox"),
            "input" => match self.attr_value("type") {
                Some("checkbox" | "radio" | "submit" | "button" | "hidden") => None,
                _ => Some("textbox"),
            },
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => Some("heading"),
            "table" => Some("table"),
            "tr" => Some("row"),
            "nav" => Some("navigation"),
            "dialog" => Some("dialog"),
            _ => None,
        }
    }

    /// Accessible-ish name: explicit name, aria-label, placeholder, or text
    fn accessible_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.attr_value("aria-label").map(String::from))
            .or_else(|| self.attr_value("placeholder").map(String::from))
            .or_else(|| self.text.clone())
            .unwrap_or_default()
    }

    fn matches(&self, strategy: &Strategy) -> bool {
        match strategy {
            Strategy::ByRole { role, name, mode } => {
                let Some(el_role) = self.effective_role() else {
                    return false;
                };
                let role_ok =
                    el_role == role || (role == "dialog" && el_role == "alertdialog");
                role_ok && (name.is_empty() || pattern_match(name, &self.accessible_name(), *mode))
            }
            Strategy::ByText { text, mode } => self
                .text
                .as_ref()
                .is_some_and(|t| pattern_match(text, t, *mode)),
            Strategy::ByAttribute {
                tag,
                attribute,
                value,
                mode,
            } => {
                if !tag.is_empty() && self.tag != tag {
                    return false;
                }
                self.attr_value(attribute).is_some_and(|v| match mode {
                    MatchMode::Exact => v == value,
                    MatchMode::Fuzzy => v.contains(value.as_str()),
                })
            }
            Strategy::ByStructure { css } => css.split(',').map(str::trim).any(|alt| {
                self.selectors.iter().any(|s| *s == alt)
                    || alt
                        .strip_prefix('.')
                        .is_some_and(|class| self.classes.iter().any(|c| *c == class))
            }),
        }
    }
}

/// `|`-separated alternation match against a haystack
fn pattern_match(pattern: &str, haystack: &str, mode: MatchMode) -> bool {
    let hay = haystack.trim().to_lowercase();
    pattern.split('|').map(|alt| alt.trim().to_lowercase()).any(|alt| match mode {
        MatchMode::Exact => hay == alt,
        MatchMode::Fuzzy => hay.contains(&alt),
    })
}

#[derive(Debug, Clone)]
struct Entity {
    title: String,
    description: String,
}

#[derive(Debug, Clone)]
enum Deferred {
    Login { email: String, password: String },
    Signup { email: String, password: String, confirm: String, full_name: String },
}

#[derive(Debug)]
struct Inner {
    options: SimOptions,
    path: String,
    session: bool,
    users: Vec<(String, String)>,
    entities: Vec<Entity>,
    form: Vec<(Field, String)>,
    overlay: Overlay,
    alert: Option<String>,
    toast: Option<String>,
    pending: Vec<(Instant, Deferred)>,
}

/// In-memory application implementing the driver boundary
pub struct SimulatedApp {
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for SimulatedApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedApp").finish_non_exhaustive()
    }
}

impl SimulatedApp {
    /// Create an application with one registered account
    #[must_use]
    pub fn new(options: SimOptions, admin_email: &str, admin_password: &str) -> Self {
        Self {
            inner: Mutex::new(Inner {
                options,
                path: "/".to_string(),
                session: false,
                users: vec![(admin_email.to_string(), admin_password.to_string())],
                entities: Vec::new(),
                form: Vec::new(),
                overlay: Overlay::None,
                alert: None,
                toast: None,
                pending: Vec::new(),
            }),
        }
    }

    /// Default options with the given account
    #[must_use]
    pub fn with_admin(admin_email: &str, admin_password: &str) -> Self {
        Self::new(SimOptions::default(), admin_email, admin_password)
    }

    /// Seed the entity table
    pub fn seed_entity(&self, title: &str, description: &str) {
        self.inner.lock().unwrap().entities.push(Entity {
            title: title.to_string(),
            description: description.to_string(),
        });
    }

    /// Whether a session is currently established (test inspection)
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.lock().unwrap().session
    }

    /// Current entity titles (test inspection)
    #[must_use]
    pub fn entity_titles(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .entities
            .iter()
            .map(|e| e.title.clone())
            .collect()
    }

    /// Number of registered accounts (test inspection)
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.inner.lock().unwrap().users.len()
    }
}

impl Inner {
    fn form_value(&self, field: Field) -> String {
        self.form
            .iter()
            .rev()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v.clone())
            .unwrap_or_default()
    }

    fn set_form_value(&mut self, field: Field, value: &str) {
        self.form.retain(|(f, _)| *f != field);
        self.form.push((field, value.to_string()));
    }

    fn reset_page_state(&mut self) {
        self.form.clear();
        self.overlay = Overlay::None;
        self.alert = None;
        self.toast = None;
    }

    fn apply_due(&mut self) {
        let now = Instant::now();
        let due: Vec<Deferred> = {
            let mut due = Vec::new();
            self.pending.retain(|(at, deferred)| {
                if *at <= now {
                    due.push(deferred.clone());
                    false
                } else {
                    true
                }
            });
            due
        };
        for deferred in due {
            match deferred {
                Deferred::Login { email, password } => self.complete_login(&email, &password),
                Deferred::Signup {
                    email,
                    password,
                    confirm,
                    full_name,
                } => self.complete_signup(&email, &password, &confirm, &full_name),
            }
        }
    }

    fn submit_login(&mut self) {
        let email = self.form_value(Field::Email);
        let password = self.form_value(Field::Password);
        if self.options.action_latency.is_zero() {
            self.complete_login(&email, &password);
        } else {
            let at = Instant::now() + self.options.action_latency;
            self.pending.push((at, Deferred::Login { email, password }));
        }
    }

    fn complete_login(&mut self, email: &str, password: &str) {
        if email.trim().is_empty() || password.is_empty() {
            self.alert = Some("Email and password are required".to_string());
            return;
        }
        let ok = self
            .users
            .iter()
            .any(|(e, p)| e == email && p == password);
        if ok {
            self.session = true;
            self.path = self.options.dashboard_path.clone();
            self.reset_page_state();
        } else {
            self.alert = Some("Invalid email or password".to_string());
        }
    }

    fn submit_signup(&mut self) {
        let email = self.form_value(Field::Email);
        let password = self.form_value(Field::Password);
        let confirm = self.form_value(Field::ConfirmPassword);
        let full_name = self.form_value(Field::FullName);
        if self.options.action_latency.is_zero() {
            self.complete_signup(&email, &password, &confirm, &full_name);
        } else {
            let at = Instant::now() + self.options.action_latency;
            self.pending.push((
                at,
                Deferred::Signup {
                    email,
                    password,
                    confirm,
                    full_name,
                },
            ));
        }
    }

    fn complete_signup(&mut self, email: &str, password: &str, confirm: &str, full_name: &str) {
        if email.trim().is_empty() || password.is_empty() || full_name.trim().is_empty() {
            self.alert = Some("All fields are required".to_string());
            return;
        }
        if password != confirm {
            self.alert = Some("Passwords must match".to_string());
            return;
        }
        if self.users.iter().any(|(e, _)| e == email) {
            self.alert = Some("An account with this email already exists".to_string());
            return;
        }
        self.users.push((email.to_string(), password.to_string()));
        self.session = true;
        self.path = self.options.dashboard_path.clone();
        self.reset_page_state();
    }

    fn save_modal(&mut self) {
        let title = self.form_value(Field::Title);
        if title.trim().is_empty() {
            self.alert = Some("Title is required".to_string());
            return;
        }
        let description = self.form_value(Field::Description);
        match self.overlay {
            Overlay::CreateModal => {
                self.entities.push(Entity { title, description });
            }
            Overlay::EditModal(index) => {
                if let Some(entity) = self.entities.get_mut(index) {
                    entity.title = title;
                    entity.description = description;
                }
            }
            _ => return,
        }
        self.overlay = Overlay::None;
        self.alert = None;
        self.form.retain(|(f, _)| !matches!(f, Field::Title | Field::Description));
        if self.options.success_toasts {
            self.toast = Some("Item saved".to_string());
        }
    }

    fn perform(&mut self, action: &Action) {
        match action {
            Action::Navigate(path) => self.navigate(path.clone()),
            Action::SubmitLogin => self.submit_login(),
            Action::SubmitSignup => self.submit_signup(),
            Action::Logout => {
                self.session = false;
                self.path = self.options.login_path.clone();
                self.reset_page_state();
            }
            Action::OpenUserMenu => self.overlay = Overlay::UserMenu,
            Action::OpenCreateModal => {
                self.overlay = Overlay::CreateModal;
                self.alert = None;
            }
            Action::OpenRowMenu(index) => self.overlay = Overlay::RowMenu(*index),
            Action::MenuEdit => {
                if let Overlay::RowMenu(index) = self.overlay {
                    if let Some(entity) = self.entities.get(index) {
                        let (title, description) =
                            (entity.title.clone(), entity.description.clone());
                        self.set_form_value(Field::Title, &title);
                        self.set_form_value(Field::Description, &description);
                    }
                    self.overlay = Overlay::EditModal(index);
                }
            }
            Action::MenuDelete => {
                if let Overlay::RowMenu(index) = self.overlay {
                    self.overlay = Overlay::DeleteConfirm(index);
                }
            }
            Action::SaveModal => self.save_modal(),
            Action::CancelModal => {
                self.overlay = Overlay::None;
                self.alert = None;
            }
            Action::ConfirmDelete => {
                if let Overlay::DeleteConfirm(index) = self.overlay {
                    if index < self.entities.len() {
                        self.entities.remove(index);
                    }
                    self.overlay = Overlay::None;
                    if self.options.success_toasts {
                        self.toast = Some("Item deleted".to_string());
                    }
                }
            }
        }
    }

    fn navigate(&mut self, target: String) {
        let guarded = target == self.options.dashboard_path || target == self.options.items_path;
        self.reset_page_state();
        if guarded && !self.session {
            self.path = self.options.login_path.clone();
            if self.options.access_denied_banner {
                self.alert = Some("Please sign in to continue".to_string());
            }
            return;
        }
        self.path = target;
    }

    /// Declarative render of the current page + overlay
    fn render(&self) -> Vec<Element> {
        let mut elements = Vec::new();
        let opts = &self.options;

        if let Some(message) = &self.alert {
            elements.push(
                Element::new("div")
                    .role("alert")
                    .text(message.clone())
                    .class("alert-error"),
            );
        }
        if let Some(message) = &self.toast {
            elements.push(
                Element::new("div")
                    .role("status")
                    .text(message.clone())
                    .class("toast-success"),
            );
        }

        if self.path == "/" {
            elements.push(Element::new("h1").text("Welcome"));
            if opts.home_login_link {
                elements.push(
                    Element::new("a")
                        .text("Sign in")
                        .attr("href", opts.login_path.clone())
                        .action(Action::Navigate(opts.login_path.clone())),
                );
            }
            if opts.home_signup_link {
                elements.push(
                    Element::new("a")
                        .text("Sign up")
                        .attr("href", opts.signup_path.clone())
                        .action(Action::Navigate(opts.signup_path.clone())),
                );
            }
        } else if self.path == opts.login_path {
            elements.push(
                Element::new("input")
                    .name("Email")
                    .attr("type", "email")
                    .attr("name", "email")
                    .attr("placeholder", "Email")
                    .field(Field::Email),
            );
            elements.push(
                Element::new("input")
                    .name("Password")
                    .attr("type", "password")
                    .attr("name", "password")
                    .field(Field::Password),
            );
            if opts.login_submit_button {
                elements.push(
                    Element::new("button")
                        .name("Log in")
                        .text("Log in")
                        .attr("type", "submit")
                        .action(Action::SubmitLogin),
                );
            }
        } else if self.path == opts.signup_path {
            elements.push(
                Element::new("input")
                    .name("Full Name")
                    .attr("name", "full_name")
                    .attr("placeholder", "Full Name")
                    .field(Field::FullName),
            );
            elements.push(
                Element::new("input")
                    .name("Email")
                    .attr("type", "email")
                    .attr("name", "email")
                    .field(Field::Email),
            );
            elements.push(
                Element::new("input")
                    .name("Password")
                    .attr("type", "password")
                    .attr("name", "password")
                    .field(Field::Password),
            );
            elements.push(
                Element::new("input")
                    .name("Confirm Password")
                    .attr("type", "password")
                    .attr("name", "confirm_password")
                    .field(Field::ConfirmPassword),
            );
            elements.push(
                Element::new("button")
                    .name("Sign up")
                    .text("Sign up")
                    .attr("type", "submit")
                    .action(Action::SubmitSignup),
            );
        } else if self.session && self.path == opts.dashboard_path {
            elements.push(Element::new("h1").text("Dashboard"));
            elements.push(
                Element::new("a")
                    .text("Items")
                    .attr("href", opts.items_path.clone())
                    .action(Action::Navigate(opts.items_path.clone())),
            );
            self.render_chrome(&mut elements);
        } else if self.session && self.path == opts.items_path {
            elements.push(Element::new("h1").text("Items"));
            if opts.create_button {
                elements.push(
                    Element::new("button")
                        .name("Add Item")
                        .text("Add Item")
                        .action(Action::OpenCreateModal),
                );
            }
            elements.push(Element::new("table"));
            for (index, entity) in self.entities.iter().enumerate() {
                elements.push(Element::new("td").text(entity.title.clone()));
                elements.push(
                    Element::new("button")
                        .attr("aria-haspopup", "menu")
                        .selector("tbody button[aria-haspopup=\"menu\"]")
                        .selector("td button[aria-haspopup=\"menu\"]")
                        .action(Action::OpenRowMenu(index)),
                );
            }
            self.render_chrome(&mut elements);
            self.render_overlay(&mut elements);
        }

        elements
    }

    /// Authenticated page chrome: logout affordance per configured style
    fn render_chrome(&self, elements: &mut Vec<Element>) {
        match self.options.logout_style {
            LogoutStyle::DirectButton => {
                elements.push(
                    Element::new("button")
                        .name("Log out")
                        .text("Log out")
                        .action(Action::Logout),
                );
            }
            LogoutStyle::InUserMenu => {
                elements.push(
                    Element::new("button")
                        .attr("aria-label", "user account")
                        .class("user-menu")
                        .action(Action::OpenUserMenu),
                );
                if self.overlay == Overlay::UserMenu {
                    elements.push(
                        Element::new("div")
                            .role("menuitem")
                            .name("Log out")
                            .text("Log out")
                            .action(Action::Logout),
                    );
                }
            }
            LogoutStyle::None => {}
        }
    }

    fn render_overlay(&self, elements: &mut Vec<Element>) {
        match self.overlay {
            Overlay::None | Overlay::UserMenu => {}
            Overlay::RowMenu(_) => {
                elements.push(
                    Element::new("div")
                        .role("menuitem")
                        .name("Edit item")
                        .text("Edit item")
                        .action(Action::MenuEdit),
                );
                elements.push(
                    Element::new("div")
                        .role("menuitem")
                        .name("Delete item")
                        .text("Delete item")
                        .action(Action::MenuDelete),
                );
            }
            Overlay::CreateModal | Overlay::EditModal(_) => {
                elements.push(Element::new("div").role("dialog").class("modal"));
                elements.push(
                    Element::new("input")
                        .name("Title")
                        .attr("name", "title")
                        .field(Field::Title),
                );
                elements.push(
                    Element::new("textarea")
                        .name("Description")
                        .attr("name", "description")
                        .field(Field::Description),
                );
                elements.push(
                    Element::new("button")
                        .name("Save")
                        .text("Save")
                        .attr("type", "submit")
                        .action(Action::SaveModal),
                );
                elements.push(
                    Element::new("button")
                        .name("Cancel")
                        .text("Cancel")
                        .action(Action::CancelModal),
                );
            }
            Overlay::DeleteConfirm(_) => {
                elements.push(Element::new("div").role("alertdialog").class("modal"));
                elements.push(
                    Element::new("p").text("Are you sure you want to delete this item?"),
                );
                elements.push(
                    Element::new("button")
                        .name("Cancel")
                        .text("Cancel")
                        .action(Action::CancelModal),
                );
                elements.push(
                    Element::new("button")
                        .name("Delete")
                        .text("Delete")
                        .class("danger")
                        .action(Action::ConfirmDelete),
                );
            }
        }
    }

    fn find(&self, strategy: &Strategy) -> Option<Element> {
        self.render().into_iter().find(|el| el.matches(strategy))
    }

    /// Enter submits whatever form owns the focus on this page
    fn enter_action(&self) -> Option<Action> {
        if matches!(self.overlay, Overlay::CreateModal | Overlay::EditModal(_)) {
            return Some(Action::SaveModal);
        }
        if self.path == self.options.login_path {
            Some(Action::SubmitLogin)
        } else if self.path == self.options.signup_path {
            Some(Action::SubmitSignup)
        } else {
            None
        }
    }
}

#[async_trait]
impl Driver for SimulatedApp {
    async fn goto(&self, path_or_url: &str) -> SondeoResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.apply_due();
        let path = crate::driver::url_path(path_or_url);
        inner.navigate(path);
        Ok(())
    }

    async fn current_url(&self) -> SondeoResult<String> {
        let mut inner = self.inner.lock().unwrap();
        inner.apply_due();
        Ok(format!("{}{}", inner.options.base_url, inner.path))
    }

    async fn resolve(&self, strategy: &Strategy) -> SondeoResult<Resolution> {
        let mut inner = self.inner.lock().unwrap();
        inner.apply_due();
        Ok(inner.find(strategy).map_or(Resolution::NotFound, |el| {
            let handle = ElementHandle::new(strategy.clone());
            Resolution::Found(match el.text {
                Some(text) => handle.with_text(text),
                None => handle,
            })
        }))
    }

    async fn click(&self, handle: &ElementHandle) -> SondeoResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.apply_due();
        let element = inner
            .find(&handle.strategy)
            .ok_or_else(|| SondeoError::Interaction {
                message: format!("element detached: {}", handle.strategy),
            })?;
        if let Some(action) = element.action {
            inner.perform(&action);
        }
        Ok(())
    }

    async fn fill(&self, handle: &ElementHandle, value: &str) -> SondeoResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.apply_due();
        let element = inner
            .find(&handle.strategy)
            .ok_or_else(|| SondeoError::Interaction {
                message: format!("element detached: {}", handle.strategy),
            })?;
        let field = element.field.ok_or_else(|| SondeoError::Interaction {
            message: format!("not a fillable field: {}", handle.strategy),
        })?;
        inner.set_form_value(field, value);
        Ok(())
    }

    async fn press(&self, handle: &ElementHandle, key: &str) -> SondeoResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.apply_due();
        if inner.find(&handle.strategy).is_none() {
            return Err(SondeoError::Interaction {
                message: format!("element detached: {}", handle.strategy),
            });
        }
        if key == "Enter" {
            if let Some(action) = inner.enter_action() {
                inner.perform(&action);
            }
        }
        Ok(())
    }

    async fn wait_for_settle(&self, timeout: Duration) -> SondeoResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            let next_due = {
                let mut inner = self.inner.lock().unwrap();
                inner.apply_due();
                inner.pending.iter().map(|(at, _)| *at).min()
            };
            match next_due {
                None => return Ok(()),
                Some(at) if at > deadline => return Ok(()),
                Some(at) => {
                    let now = Instant::now();
                    if at > now {
                        tokio::time::sleep(at - now).await;
                    }
                }
            }
        }
    }

    async fn clear_session(&self) -> SondeoResult<()> {
        self.inner.lock().unwrap().session = false;
        Ok(())
    }
}
