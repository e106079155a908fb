//! Entity CRUD scenarios: create, validate, update, delete.
//!
//! All four operate on the entity list page through generic affordances: a
//! create control, a per-row actions menu with edit/delete entries, and
//! modal forms with save/cancel. Any missing affordance degrades the
//! scenario to a skip; these flows test the behavior, not the furniture.

use super::{absence_window, login_as, short_verify, verify_timeout};
use crate::action::ActionExecutor;
use crate::catalog::Intent;
use crate::config::SuiteConfig;
use crate::data::SampleEntity;
use crate::driver::Driver;
use crate::routes::RouteTable;
use crate::scenario::{Scenario, ScenarioOutcome};
use crate::verify::{Signal, VerificationSet, Verifier};
use tracing::info;

/// Conventional path of the entity list page
pub const ENTITY_LIST_PATH: &str = "/items";

/// Creating an entity through the create dialog lands it in the list.
pub async fn create_entity(
    driver: &dyn Driver,
    config: &SuiteConfig,
    routes: &RouteTable,
) -> ScenarioOutcome {
    let mut scenario = Scenario::begin("create entity");
    scenario.routes_discovered();

    let executor = ActionExecutor::new(driver);
    match open_create_dialog(driver, config, routes, &executor).await {
        Ok(()) => {}
        Err(reason) => return scenario.skip(reason),
    }
    scenario.actions_in_flight();

    let entity = SampleEntity::generate();
    info!(title = %entity.title, "creating entity");

    if let Err(err) = executor.fill_field(Intent::TitleField, &entity.title).await {
        return scenario.fail(format!("could not fill the title field: {err}"));
    }
    // Description is optional in conventional create forms.
    if executor.locate(Intent::DescriptionField).await.is_some() {
        if let Err(err) = executor
            .fill_field(Intent::DescriptionField, &entity.description)
            .await
        {
            return scenario.fail(format!("could not fill the description field: {err}"));
        }
    }
    if let Err(err) = executor.invoke(Intent::SaveAction).await {
        return scenario.fail(format!("could not save the new entity: {err}"));
    }

    let created = VerificationSet::named("entity created")
        .with(Signal::TextVisible(entity.title.clone()))
        .with(Signal::IntentVisible(Intent::SuccessIndicator));
    if Verifier::new(driver).verify(&created, verify_timeout()).await {
        scenario.pass()
    } else {
        scenario.fail(format!(
            "no creation evidence after save: {}",
            created.describe()
        ))
    }
}

/// Saving with a blank required title must not silently create an entity.
pub async fn create_entity_invalid_input(
    driver: &dyn Driver,
    config: &SuiteConfig,
    routes: &RouteTable,
) -> ScenarioOutcome {
    let mut scenario = Scenario::begin("create entity with invalid input");
    scenario.routes_discovered();

    let executor = ActionExecutor::new(driver);
    match open_create_dialog(driver, config, routes, &executor).await {
        Ok(()) => {}
        Err(reason) => return scenario.skip(reason),
    }
    scenario.actions_in_flight();

    // Title stays blank on purpose. A save control disabled by client-side
    // validation clicks without effect; the still-open dialog below covers
    // that case too.
    match executor.invoke(Intent::SaveAction).await {
        Ok(()) => {}
        Err(err) => {
            info!(error = %err, "save control not invocable with blank title");
        }
    }

    let rejected = VerificationSet::named("blank title rejected")
        .with(Signal::IntentVisible(Intent::ErrorIndicator))
        .with(Signal::IntentVisible(Intent::ModalDialog));
    let outcome = if Verifier::new(driver).verify(&rejected, short_verify()).await {
        scenario.pass()
    } else {
        scenario.fail("blank required title was accepted silently")
    };

    // Leave the page clean for whatever runs next.
    if let Some(cancel) = executor.locate(Intent::CancelAction).await {
        let _ = driver.click(&cancel).await;
    }
    outcome
}

/// Editing the first row through its actions menu persists the new title.
pub async fn update_entity(
    driver: &dyn Driver,
    config: &SuiteConfig,
    routes: &RouteTable,
) -> ScenarioOutcome {
    let mut scenario = Scenario::begin("update entity");
    scenario.routes_discovered();

    let executor = ActionExecutor::new(driver);
    if let Err(reason) = open_entity_list(driver, config, routes).await {
        return scenario.skip(reason);
    }
    match open_row_menu_entry(&executor, Intent::EditMenuItem).await {
        Ok(()) => {}
        Err(reason) => return scenario.skip(reason),
    }
    if executor.locate(Intent::ModalDialog).await.is_none() {
        return scenario.skip("edit entry opened no dialog");
    }
    scenario.actions_in_flight();

    let updated = SampleEntity::generate().updated();
    info!(title = %updated.title, "updating entity");

    if let Err(err) = executor.fill_field(Intent::TitleField, &updated.title).await {
        return scenario.fail(format!("could not update the title field: {err}"));
    }
    if executor.locate(Intent::DescriptionField).await.is_some() {
        if let Err(err) = executor
            .fill_field(Intent::DescriptionField, &updated.description)
            .await
        {
            return scenario.fail(format!("could not update the description field: {err}"));
        }
    }
    if let Err(err) = executor.invoke(Intent::SaveAction).await {
        return scenario.fail(format!("could not save the edited entity: {err}"));
    }

    let saved = VerificationSet::named("entity updated")
        .with(Signal::TextVisible(updated.title.clone()))
        .with(Signal::IntentVisible(Intent::SuccessIndicator));
    if !Verifier::new(driver).verify(&saved, verify_timeout()).await {
        return scenario.fail(format!(
            "no update evidence after save: {}",
            saved.describe()
        ));
    }

    // The dialog closing is the second half of "the save stuck".
    let dialog = VerificationSet::named("edit dialog")
        .with(Signal::IntentVisible(Intent::ModalDialog));
    if Verifier::new(driver)
        .verify_absence(&dialog, absence_window())
        .await
    {
        scenario.pass()
    } else {
        scenario.fail("edit dialog still open after save")
    }
}

/// Deleting the first row through its actions menu removes it, after an
/// explicit confirmation.
pub async fn delete_entity(
    driver: &dyn Driver,
    config: &SuiteConfig,
    routes: &RouteTable,
) -> ScenarioOutcome {
    let mut scenario = Scenario::begin("delete entity");
    scenario.routes_discovered();

    let executor = ActionExecutor::new(driver);
    if let Err(reason) = open_entity_list(driver, config, routes).await {
        return scenario.skip(reason);
    }

    // Remember what the first row said so removal is checkable.
    let first_row_text = executor
        .locate(Intent::DataTable)
        .await
        .and_then(|handle| handle.text);

    match open_row_menu_entry(&executor, Intent::DeleteMenuItem).await {
        Ok(()) => {}
        Err(reason) => return scenario.skip(reason),
    }
    if executor.locate(Intent::ModalDialog).await.is_none() {
        return scenario.skip("delete entry opened no confirmation dialog");
    }
    scenario.actions_in_flight();

    if let Err(err) = executor.invoke(Intent::ConfirmDeleteAction).await {
        return scenario.fail(format!("could not confirm the deletion: {err}"));
    }

    if let Some(text) = first_row_text.filter(|t| !t.is_empty()) {
        info!(row = %text, "expecting row to disappear");
    }
    let deleted = VerificationSet::named("entity deleted")
        .with(Signal::IntentVisible(Intent::SuccessIndicator))
        .with(Signal::IntentAbsent(Intent::ModalDialog));

    if Verifier::new(driver).verify(&deleted, verify_timeout()).await {
        scenario.pass()
    } else {
        scenario.fail(format!(
            "no deletion evidence after confirm: {}",
            deleted.describe()
        ))
    }
}

/// Authenticate and land on the entity list page.
async fn open_entity_list(
    driver: &dyn Driver,
    config: &SuiteConfig,
    routes: &RouteTable,
) -> Result<(), String> {
    login_as(driver, routes, &config.admin_email, &config.admin_password)
        .await
        .map_err(|err| format!("could not establish authenticated session: {err}"))?;
    driver
        .goto(ENTITY_LIST_PATH)
        .await
        .map_err(|err| format!("could not reach the entity list: {err}"))?;
    Ok(())
}

/// Authenticate, open the list, and open the create dialog.
async fn open_create_dialog(
    driver: &dyn Driver,
    config: &SuiteConfig,
    routes: &RouteTable,
    executor: &ActionExecutor<'_>,
) -> Result<(), String> {
    open_entity_list(driver, config, routes).await?;
    if executor.locate(Intent::CreateAction).await.is_none() {
        return Err("no create affordance on the entity list".to_string());
    }
    executor
        .invoke(Intent::CreateAction)
        .await
        .map_err(|err| format!("create control would not open: {err}"))?;
    if executor.locate(Intent::TitleField).await.is_none() {
        return Err("create dialog has no title field".to_string());
    }
    Ok(())
}

/// Open the first row's actions menu and click one of its entries.
async fn open_row_menu_entry(
    executor: &ActionExecutor<'_>,
    entry: Intent,
) -> Result<(), String> {
    if executor.locate(Intent::RowActionsMenu).await.is_none() {
        return Err("no row actions menu in the entity table".to_string());
    }
    executor
        .open_menu(Intent::RowActionsMenu)
        .await
        .map_err(|err| format!("row actions menu would not open: {err}"))?;
    match executor.locate(entry).await {
        Some(handle) => executor
            .driver()
            .click(&handle)
            .await
            .map_err(|err| format!("menu entry would not click: {err}")),
        None => Err(format!("row menu has no '{entry}' entry")),
    }
}
