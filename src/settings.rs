//! The settings page and the endpoints for changing the salary and categories.
//!
//! Every change is written to the config file before it is applied to the
//! in-memory settings, so a failed save leaves both untouched.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState, Error,
    config::{Config, ConfigStore, parse_category_list, parse_salary},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        base, format_currency,
    },
    navigation::NavBar,
};

/// The state needed for the settings page and endpoints.
#[derive(Debug, Clone)]
pub struct SettingsState {
    /// The current settings.
    pub config: Arc<Mutex<Config>>,
    /// Where the settings are saved.
    pub config_store: ConfigStore,
}

impl FromRef<AppState> for SettingsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            config: state.config.clone(),
            config_store: state.config_store.clone(),
        }
    }
}

/// The form data for the salary.
#[derive(Debug, Deserialize)]
pub struct SalaryForm {
    /// The monthly salary as typed by the user.
    pub salary: String,
}

/// The form data for the category list.
#[derive(Debug, Deserialize)]
pub struct CategoriesForm {
    /// Comma separated category names.
    pub categories: String,
}

/// Renders the settings page.
pub async fn get_settings_page(State(state): State<SettingsState>) -> Result<Response, Error> {
    let config = state
        .config
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire config lock: {error}"))
        .map_err(|_| Error::ConfigLockError)?
        .clone();

    Ok(settings_view(&config).into_response())
}

/// A route handler for setting the monthly salary, redirects to the settings page on success.
pub async fn update_salary_endpoint(
    State(state): State<SettingsState>,
    Form(form): Form<SalaryForm>,
) -> Response {
    let result = parse_salary(&form.salary).and_then(|salary| {
        update_config(&state, |config| config.salary = salary)
            .inspect(|_| tracing::info!("Set monthly salary to {salary}"))
    });

    redirect_or_alert(result)
}

/// A route handler for replacing the category list, redirects to the settings page on success.
pub async fn update_categories_endpoint(
    State(state): State<SettingsState>,
    Form(form): Form<CategoriesForm>,
) -> Response {
    let result = parse_category_list(&form.categories).and_then(|categories| {
        tracing::info!("Set categories to {categories:?}");
        update_config(&state, |config| config.categories = categories)
    });

    redirect_or_alert(result)
}

fn update_config(state: &SettingsState, change: impl FnOnce(&mut Config)) -> Result<(), Error> {
    let mut config = state
        .config
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire config lock: {error}"))
        .map_err(|_| Error::ConfigLockError)?;

    let mut updated = config.clone();
    change(&mut updated);
    state.config_store.save(&updated)?;
    *config = updated;

    Ok(())
}

fn redirect_or_alert(result: Result<(), Error>) -> Response {
    match result {
        Ok(()) => (
            HxRedirect(endpoints::SETTINGS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => error.into_alert_response(),
    }
}

fn settings_view(config: &Config) -> Markup {
    let nav_bar = NavBar::new(endpoints::SETTINGS_VIEW).into_html();
    let category_list = config.categories.join(", ");

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full space-y-8"
            {
                form
                    id="salary-form"
                    hx-put=(endpoints::SALARY_API)
                    hx-target-error="#alert-container"
                    class="space-y-4"
                {
                    h2 class="text-xl font-bold" { "Monthly Salary" }

                    p class="text-sm"
                    {
                        "Currently " (format_currency(config.salary)) ". "
                        "You will be warned when a month's expenses go over this amount."
                    }

                    div
                    {
                        label for="salary" class=(FORM_LABEL_STYLE) { "Salary" }
                        input
                            name="salary"
                            id="salary"
                            type="text"
                            inputmode="decimal"
                            required
                            value=(config.salary.to_string())
                            class=(FORM_TEXT_INPUT_STYLE);
                    }

                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Salary" }
                }

                form
                    id="categories-form"
                    hx-put=(endpoints::CATEGORIES_API)
                    hx-target-error="#alert-container"
                    class="space-y-4"
                {
                    h2 class="text-xl font-bold" { "Categories" }

                    p class="text-sm"
                    {
                        "Separate categories with commas. "
                        "Transactions keep their category if it is removed from this list."
                    }

                    div
                    {
                        label for="categories" class=(FORM_LABEL_STYLE) { "Categories" }
                        input
                            name="categories"
                            id="categories"
                            type="text"
                            required
                            value=(category_list)
                            class=(FORM_TEXT_INPUT_STYLE);
                    }

                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Categories" }
                }
            }
        }
    };

    base("Settings", &[], &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use axum_extra::extract::Form;

    use crate::{
        config::{Config, test_utils::temp_config_store},
        endpoints,
        settings::{
            CategoriesForm, SalaryForm, SettingsState, get_settings_page,
            update_categories_endpoint, update_salary_endpoint,
        },
        test_utils::{
            assert_form_input_with_value, assert_hx_endpoint, assert_hx_redirect,
            assert_status_ok, assert_valid_html, must_get_form_by_id, parse_html_document,
        },
    };

    fn get_test_state() -> SettingsState {
        let config_store = temp_config_store();
        let config = config_store.load().unwrap();

        SettingsState {
            config: Arc::new(Mutex::new(config)),
            config_store,
        }
    }

    #[tokio::test]
    async fn settings_page_shows_current_values() {
        let state = get_test_state();
        state.config.lock().unwrap().salary = 2500.0;

        let response = get_settings_page(State(state)).await.unwrap();

        assert_status_ok(&response);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let salary_form = must_get_form_by_id(&document, "salary-form");
        assert_hx_endpoint(&salary_form, endpoints::SALARY_API, "hx-put");
        assert_form_input_with_value(&salary_form, "salary", "text", "2500");

        let categories_form = must_get_form_by_id(&document, "categories-form");
        assert_hx_endpoint(&categories_form, endpoints::CATEGORIES_API, "hx-put");
        assert_form_input_with_value(
            &categories_form,
            "categories",
            "text",
            "food, utilities, transport, leisure",
        );
    }

    #[tokio::test]
    async fn can_update_salary() {
        let state = get_test_state();

        let response = update_salary_endpoint(
            State(state.clone()),
            Form(SalaryForm {
                salary: " 3200.50 ".to_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::SETTINGS_VIEW);
        assert_eq!(state.config.lock().unwrap().salary, 3200.5);
        assert_eq!(state.config_store.load().unwrap().salary, 3200.5);
    }

    #[tokio::test]
    async fn rejects_invalid_salary() {
        let state = get_test_state();

        let response = update_salary_endpoint(
            State(state.clone()),
            Form(SalaryForm {
                salary: "lots".to_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(*state.config.lock().unwrap(), Config::default());
        assert_eq!(state.config_store.load().unwrap(), Config::default());
    }

    #[tokio::test]
    async fn can_update_categories() {
        let state = get_test_state();

        let response = update_categories_endpoint(
            State(state.clone()),
            Form(CategoriesForm {
                categories: "rent, food ,, rent".to_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let want = vec!["rent".to_owned(), "food".to_owned()];
        assert_eq!(state.config.lock().unwrap().categories, want);
        assert_eq!(state.config_store.load().unwrap().categories, want);
    }

    #[tokio::test]
    async fn rejects_empty_category_list() {
        let state = get_test_state();

        let response = update_categories_endpoint(
            State(state.clone()),
            Form(CategoriesForm {
                categories: " , ".to_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(*state.config.lock().unwrap(), Config::default());
    }
}
