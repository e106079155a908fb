//! Authentication scenarios: login, signup, route guards, logout.

use super::{absence_window, login_as, short_verify, verify_timeout};
use crate::action::ActionExecutor;
use crate::catalog::Intent;
use crate::config::SuiteConfig;
use crate::data::SampleUser;
use crate::driver::Driver;
use crate::pattern::UrlPattern;
use crate::routes::{Route, RouteTable};
use crate::scenario::{Scenario, ScenarioOutcome};
use crate::verify::{Signal, VerificationSet, Verifier};
use tracing::info;

/// Login with configured admin credentials succeeds and leaves the app in
/// an authenticated state.
pub async fn valid_login(
    driver: &dyn Driver,
    config: &SuiteConfig,
    routes: &RouteTable,
) -> ScenarioOutcome {
    let mut scenario = Scenario::begin("valid login");
    scenario.routes_discovered();

    if let Err(err) = driver.goto(routes.get(Route::Login)).await {
        return scenario.fail(format!("could not reach login page: {err}"));
    }

    let executor = ActionExecutor::new(driver);
    if executor.locate(Intent::EmailField).await.is_none() {
        return scenario.skip("no login form found at the login route");
    }
    scenario.actions_in_flight();

    if let Err(err) = login_as(driver, routes, &config.admin_email, &config.admin_password).await
    {
        return scenario.fail(format!("login flow did not complete: {err}"));
    }

    let authenticated = VerificationSet::named("authenticated state")
        .with(Signal::UrlNotMatches(UrlPattern::login_area()))
        .with(Signal::IntentVisible(Intent::LogoutAction))
        .with(Signal::TextVisible("dashboard".to_string()));

    if Verifier::new(driver).verify(&authenticated, verify_timeout()).await {
        scenario.pass()
    } else {
        scenario.fail(format!(
            "no authenticated evidence after login: {}",
            authenticated.describe()
        ))
    }
}

/// Login with a wrong password is rejected with visible feedback and no
/// authenticated UI.
pub async fn invalid_login(
    driver: &dyn Driver,
    config: &SuiteConfig,
    routes: &RouteTable,
) -> ScenarioOutcome {
    let mut scenario = Scenario::begin("invalid login");
    scenario.routes_discovered();

    if let Err(err) = driver.goto(routes.get(Route::Login)).await {
        return scenario.fail(format!("could not reach login page: {err}"));
    }

    let executor = ActionExecutor::new(driver);
    if executor.locate(Intent::EmailField).await.is_none() {
        return scenario.skip("no login form found at the login route");
    }
    scenario.actions_in_flight();

    let filled = async {
        executor
            .fill_field(Intent::EmailField, &config.admin_email)
            .await?;
        executor
            .fill_field(Intent::PasswordField, "wrongpassword123")
            .await?;
        executor
            .invoke_with_fallback_submit(Intent::PasswordField)
            .await
    }
    .await;
    if let Err(err) = filled {
        return scenario.fail(format!("could not submit credentials: {err}"));
    }

    let login_path = routes.get(Route::Login).to_string();
    let rejected = VerificationSet::named("login rejected")
        .with(Signal::IntentVisible(Intent::ErrorIndicator))
        .with(Signal::UrlMatches(UrlPattern::Contains(login_path)));
    if !Verifier::new(driver).verify(&rejected, verify_timeout()).await {
        return scenario.fail(format!(
            "no rejection evidence after wrong password: {}",
            rejected.describe()
        ));
    }

    // Authenticated controls must not appear either.
    let auth_evidence = VerificationSet::named("authenticated controls")
        .with(Signal::IntentVisible(Intent::LogoutAction));
    if Verifier::new(driver)
        .verify_absence(&auth_evidence, absence_window())
        .await
    {
        scenario.pass()
    } else {
        scenario.fail("logout control visible after rejected login")
    }
}

/// Submitting the login form with no credentials is rejected.
pub async fn empty_credentials_login(driver: &dyn Driver, routes: &RouteTable) -> ScenarioOutcome {
    let mut scenario = Scenario::begin("empty credentials login");
    scenario.routes_discovered();

    if let Err(err) = driver.goto(routes.get(Route::Login)).await {
        return scenario.fail(format!("could not reach login page: {err}"));
    }

    let executor = ActionExecutor::new(driver);
    if executor.locate(Intent::EmailField).await.is_none() {
        return scenario.skip("no login form found at the login route");
    }
    scenario.actions_in_flight();

    if let Err(err) = executor
        .invoke_with_fallback_submit(Intent::EmailField)
        .await
    {
        return scenario.skip(format!("no way to submit an empty form: {err}"));
    }

    let login_path = routes.get(Route::Login).to_string();
    let rejected = VerificationSet::named("empty submission rejected")
        .with(Signal::IntentVisible(Intent::ErrorIndicator))
        .with(Signal::UrlMatches(UrlPattern::Contains(login_path)));
    if Verifier::new(driver).verify(&rejected, short_verify()).await {
        scenario.pass()
    } else {
        scenario.fail("empty credentials were accepted")
    }
}

/// Signing up a fresh user completes without validation errors.
///
/// Some applications deliberately emit no success feedback, so a redirect
/// away from the signup form, or simply the absence of validation errors,
/// counts as success.
pub async fn signup_new_user(driver: &dyn Driver, routes: &RouteTable) -> ScenarioOutcome {
    let mut scenario = Scenario::begin("signup new user");
    scenario.routes_discovered();

    let user = SampleUser::generate();
    info!(email = %user.email, "creating user");

    if let Err(err) = navigate_to_signup(driver, routes).await {
        return scenario.fail(format!("could not reach signup page: {err}"));
    }

    let executor = ActionExecutor::new(driver);
    if executor.locate(Intent::EmailField).await.is_none()
        || executor.locate(Intent::ConfirmPasswordField).await.is_none()
    {
        return scenario.skip("no signup form found at the signup route");
    }
    scenario.actions_in_flight();

    if let Err(err) = fill_signup_form(&executor, &user).await {
        return scenario.fail(format!("could not fill signup form: {err}"));
    }
    if let Err(err) = executor
        .invoke_with_fallback_submit(Intent::ConfirmPasswordField)
        .await
    {
        return scenario.fail(format!("could not submit signup form: {err}"));
    }

    let signup_path = routes.get(Route::Signup).to_string();
    let succeeded = VerificationSet::named("signup accepted")
        .with(Signal::IntentVisible(Intent::SuccessIndicator))
        .with(Signal::UrlNotMatches(UrlPattern::Contains(signup_path)));
    if Verifier::new(driver).verify(&succeeded, verify_timeout()).await {
        return scenario.pass();
    }

    // Still on the form: acceptable only when nothing complained.
    let complaints = VerificationSet::named("validation errors")
        .with(Signal::IntentVisible(Intent::ErrorIndicator));
    if Verifier::new(driver)
        .verify_absence(&complaints, absence_window())
        .await
    {
        scenario.pass()
    } else {
        scenario.fail("signup form rejected a freshly generated user")
    }
}

/// Signing up with an already-registered email must not silently succeed.
pub async fn duplicate_signup(
    driver: &dyn Driver,
    config: &SuiteConfig,
    routes: &RouteTable,
) -> ScenarioOutcome {
    let mut scenario = Scenario::begin("duplicate signup");
    scenario.routes_discovered();

    if let Err(err) = navigate_to_signup(driver, routes).await {
        return scenario.fail(format!("could not reach signup page: {err}"));
    }

    let executor = ActionExecutor::new(driver);
    if executor.locate(Intent::EmailField).await.is_none()
        || executor.locate(Intent::ConfirmPasswordField).await.is_none()
    {
        return scenario.skip("no signup form found at the signup route");
    }
    scenario.actions_in_flight();

    let duplicate = SampleUser {
        email: config.admin_email.clone(),
        ..SampleUser::generate()
    };
    info!(email = %duplicate.email, "attempting duplicate registration");

    if let Err(err) = fill_signup_form(&executor, &duplicate).await {
        return scenario.fail(format!("could not fill signup form: {err}"));
    }
    if let Err(err) = executor
        .invoke_with_fallback_submit(Intent::ConfirmPasswordField)
        .await
    {
        return scenario.fail(format!("could not submit signup form: {err}"));
    }

    // A duplicate error, or continued presence of the signup form; either
    // way, not a silent success. Enforcement itself is application policy.
    let signup_path = routes.get(Route::Signup).to_string();
    let not_silent = VerificationSet::named("duplicate not silently accepted")
        .with(Signal::IntentVisible(Intent::DuplicateEmailError))
        .with(Signal::IntentVisible(Intent::ErrorIndicator))
        .with(Signal::UrlMatches(UrlPattern::Contains(signup_path)))
        .with(Signal::IntentVisible(Intent::ConfirmPasswordField));
    if Verifier::new(driver).verify(&not_silent, verify_timeout()).await {
        scenario.pass()
    } else {
        scenario.fail("duplicate registration was silently accepted")
    }
}

/// Unauthenticated access to protected paths is denied.
pub async fn guard_blocks_unauthenticated(
    driver: &dyn Driver,
    routes: &RouteTable,
) -> ScenarioOutcome {
    let mut scenario = Scenario::begin("route guard");
    scenario.routes_discovered();
    scenario.actions_in_flight();

    let dashboard = routes.get(Route::Dashboard).to_string();
    let protected: Vec<&str> = vec![
        dashboard.as_str(),
        "/profile",
        "/settings",
        "/admin",
        "/users",
        "/items",
        "/notes",
        "/tasks",
    ];

    let denied = VerificationSet::named("access denied")
        .with(Signal::UrlMatches(UrlPattern::login_area()))
        .with(Signal::IntentVisible(Intent::LoginForm))
        .with(Signal::IntentVisible(Intent::AccessDeniedIndicator));

    let verifier = Verifier::new(driver);
    for path in protected {
        info!(%path, "probing protected route");
        if driver.goto(path).await.is_err() {
            continue;
        }
        if verifier.verify(&denied, short_verify()).await {
            info!(%path, "access denied as expected");
            return scenario.pass();
        }
    }

    scenario.fail("no protected path redirected to login or showed an access-denied message")
}

/// Logout tears the session down and protected routes become unreachable.
///
/// Ladder: explicit logout control, then a logout entry behind the user
/// menu, then session-clearing as the last resort (noted in the verdict).
pub async fn logout_clears_session(
    driver: &dyn Driver,
    config: &SuiteConfig,
    routes: &RouteTable,
) -> ScenarioOutcome {
    let mut scenario = Scenario::begin("logout clears session");
    scenario.routes_discovered();

    if let Err(err) = login_as(driver, routes, &config.admin_email, &config.admin_password).await
    {
        return scenario.skip(format!("could not establish authenticated session: {err}"));
    }
    scenario.actions_in_flight();

    let executor = ActionExecutor::new(driver);
    let mut used_fallback = false;

    if let Some(handle) = executor.locate(Intent::LogoutAction).await {
        if let Err(err) = driver.click(&handle).await {
            return scenario.fail(format!("logout control would not click: {err}"));
        }
    } else if executor.locate(Intent::UserMenu).await.is_some() {
        // The control may be folded into the user menu.
        if let Err(err) = executor.open_menu(Intent::UserMenu).await {
            return scenario.fail(format!("user menu would not open: {err}"));
        }
        match executor.locate(Intent::LogoutAction).await {
            Some(handle) => {
                if let Err(err) = driver.click(&handle).await {
                    return scenario.fail(format!("logout entry would not click: {err}"));
                }
            }
            None => return scenario.skip("user menu has no logout entry"),
        }
    } else {
        info!("no logout affordance; clearing session state directly");
        used_fallback = true;
        if let Err(err) = driver.clear_session().await {
            return scenario.fail(format!("could not clear session state: {err}"));
        }
    }

    // Logout is proven by a protected route bouncing again.
    if let Err(err) = driver.goto(routes.get(Route::Dashboard)).await {
        return scenario.fail(format!("could not re-request a protected route: {err}"));
    }
    let denied = VerificationSet::named("access denied after logout")
        .with(Signal::UrlMatches(UrlPattern::login_area()))
        .with(Signal::IntentVisible(Intent::LoginForm))
        .with(Signal::IntentVisible(Intent::AccessDeniedIndicator));
    if Verifier::new(driver).verify(&denied, verify_timeout()).await {
        if used_fallback {
            scenario.skip("session cleared directly; no logout affordance to exercise")
        } else {
            scenario.pass()
        }
    } else {
        scenario.fail("protected route still reachable after logout")
    }
}

/// An authenticated session keeps access to protected routes.
pub async fn session_persists(
    driver: &dyn Driver,
    config: &SuiteConfig,
    routes: &RouteTable,
) -> ScenarioOutcome {
    let mut scenario = Scenario::begin("session persistence");
    scenario.routes_discovered();

    if let Err(err) = login_as(driver, routes, &config.admin_email, &config.admin_password).await
    {
        return scenario.skip(format!("could not establish authenticated session: {err}"));
    }
    scenario.actions_in_flight();

    if let Err(err) = driver.goto(routes.get(Route::Dashboard)).await {
        return scenario.fail(format!("could not request the dashboard: {err}"));
    }

    let still_in = VerificationSet::named("still authenticated")
        .with(Signal::UrlNotMatches(UrlPattern::login_area()));
    let verifier = Verifier::new(driver);
    if !verifier.verify(&still_in, short_verify()).await {
        return scenario.fail("authenticated session was bounced to login");
    }

    let evidence = VerificationSet::named("authenticated evidence")
        .with(Signal::IntentVisible(Intent::AuthenticatedIndicator));
    if verifier.verify(&evidence, short_verify()).await {
        scenario.pass()
    } else {
        scenario.fail("protected page rendered without any authenticated indicator")
    }
}

/// Reach the signup page: affordance first, direct navigation second.
async fn navigate_to_signup(
    driver: &dyn Driver,
    routes: &RouteTable,
) -> crate::result::SondeoResult<()> {
    driver.goto(routes.get(Route::Home)).await?;
    let executor = ActionExecutor::new(driver);
    match executor.invoke(Intent::SignupNavigation).await {
        Ok(()) => Ok(()),
        Err(crate::result::SondeoError::ElementNotFound { .. }) => {
            info!("no signup affordance on home; navigating directly");
            driver.goto(routes.get(Route::Signup)).await
        }
        Err(other) => Err(other),
    }
}

async fn fill_signup_form(
    executor: &ActionExecutor<'_>,
    user: &SampleUser,
) -> crate::result::SondeoResult<()> {
    // Full name is optional in many signup forms; fill it when present.
    if executor.locate(Intent::FullNameField).await.is_some() {
        executor
            .fill_field(Intent::FullNameField, &user.full_name)
            .await?;
    }
    executor.fill_field(Intent::EmailField, &user.email).await?;
    executor
        .fill_field(Intent::PasswordField, &user.password)
        .await?;
    executor
        .fill_field(Intent::ConfirmPasswordField, &user.password)
        .await?;
    Ok(())
}
