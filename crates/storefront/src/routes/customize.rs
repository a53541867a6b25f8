//! "Build your own" configurator routes.
//!
//! The wizard lives in the session. Every action saves it and re-renders
//! the configurator fragment for HTMX, or redirects back to the page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use threadline_core::configurator::{
    Collar, Color, Fabric, Fit, Sleeve, StepState, Wizard, WizardStep,
};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::models::session_keys;
use crate::routes::layout::{Layout, is_htmx};
use crate::services::notify;
use crate::state::AppState;

// =============================================================================
// Views
// =============================================================================

/// One selectable card in the configurator.
#[derive(Debug, Clone)]
pub struct ChoiceView {
    pub id: &'static str,
    pub name: &'static str,
    /// Surcharge label, fit description or hex swatch, depending on the field.
    pub detail: String,
    pub selected: bool,
}

/// A step in the progress indicator.
#[derive(Debug, Clone)]
pub struct StepView {
    pub number: u8,
    pub name: &'static str,
    pub completed: bool,
    pub current: bool,
}

/// Everything the configurator fragment renders.
#[derive(Debug, Clone)]
pub struct ConfiguratorView {
    pub step: u8,
    pub steps: Vec<StepView>,
    pub fabrics: Vec<ChoiceView>,
    pub fits: Vec<ChoiceView>,
    pub collars: Vec<ChoiceView>,
    pub sleeves: Vec<ChoiceView>,
    pub colors: Vec<ChoiceView>,
    /// Names of the current selection, for the preview step.
    pub summary: Vec<(&'static str, &'static str)>,
    pub color_hex: &'static str,
    pub price: String,
    pub is_first: bool,
    pub is_last: bool,
}

fn surcharge_label(fabric: Fabric) -> String {
    match fabric.surcharge() {
        0 => "Included".to_string(),
        n => format!("+₹{n}"),
    }
}

fn choices<T: Copy + PartialEq>(
    all: &[T],
    current: T,
    id: impl Fn(T) -> &'static str,
    name: impl Fn(T) -> &'static str,
    detail: impl Fn(T) -> String,
) -> Vec<ChoiceView> {
    all.iter()
        .map(|&choice| ChoiceView {
            id: id(choice),
            name: name(choice),
            detail: detail(choice),
            selected: choice == current,
        })
        .collect()
}

impl From<&Wizard> for ConfiguratorView {
    fn from(wizard: &Wizard) -> Self {
        let selection = wizard.selection();
        let step = wizard.current_step();

        Self {
            step: step.number(),
            steps: wizard
                .step_states()
                .iter()
                .map(|&(step, state)| StepView {
                    number: step.number(),
                    name: step.name(),
                    completed: state == StepState::Completed,
                    current: state == StepState::Current,
                })
                .collect(),
            fabrics: choices(
                Fabric::ALL,
                selection.fabric,
                Fabric::id,
                Fabric::name,
                surcharge_label,
            ),
            fits: choices(Fit::ALL, selection.fit, Fit::id, Fit::name, |f| {
                f.description().to_string()
            }),
            collars: choices(
                Collar::ALL,
                selection.collar,
                Collar::id,
                Collar::name,
                |_| String::new(),
            ),
            sleeves: choices(
                Sleeve::ALL,
                selection.sleeve,
                Sleeve::id,
                Sleeve::name,
                |_| String::new(),
            ),
            colors: choices(Color::ALL, selection.color, Color::id, Color::name, |c| {
                c.id().to_string()
            }),
            summary: vec![
                ("Fabric", selection.fabric.name()),
                ("Fit", selection.fit.name()),
                ("Collar", selection.collar.name()),
                ("Sleeve", selection.sleeve.name()),
                ("Color", selection.color.name()),
            ],
            color_hex: selection.color.id(),
            price: wizard.derived_price().to_string(),
            is_first: step == WizardStep::Fabric,
            is_last: step == WizardStep::Preview,
        }
    }
}

/// Configurator page template.
#[derive(Template, WebTemplate)]
#[template(path = "customize/show.html")]
pub struct CustomizeTemplate {
    pub layout: Layout,
    pub wizard: ConfiguratorView,
}

/// Configurator fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/configurator.html")]
pub struct ConfiguratorTemplate {
    pub wizard: ConfiguratorView,
}

// =============================================================================
// Session
// =============================================================================

async fn load_wizard(session: &Session) -> Result<Wizard> {
    Ok(session
        .get::<Wizard>(session_keys::WIZARD)
        .await?
        .unwrap_or_default())
}

async fn save_wizard(session: &Session, wizard: &Wizard) -> Result<()> {
    session.insert(session_keys::WIZARD, wizard).await?;
    Ok(())
}

/// Load, change and save the wizard, then answer the request.
async fn apply(
    session: &Session,
    headers: &HeaderMap,
    change: impl FnOnce(&mut Wizard) -> Result<()>,
) -> Result<Response> {
    let mut wizard = load_wizard(session).await?;
    change(&mut wizard)?;
    save_wizard(session, &wizard).await?;
    Ok(respond(headers, &wizard))
}

fn respond(headers: &HeaderMap, wizard: &Wizard) -> Response {
    if is_htmx(headers) {
        ConfiguratorTemplate {
            wizard: ConfiguratorView::from(wizard),
        }
        .into_response()
    } else {
        Redirect::to("/customize").into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Configurator selection form data.
#[derive(Debug, Deserialize)]
pub struct SelectForm {
    pub field: String,
    pub value: String,
}

/// Display the configurator page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let wizard = load_wizard(&session).await?;
    Ok(CustomizeTemplate {
        layout: Layout::load(&state, &session).await,
        wizard: ConfiguratorView::from(&wizard),
    })
}

/// Change one selection.
#[instrument(skip(session, headers))]
pub async fn select(
    session: Session,
    headers: HeaderMap,
    Form(form): Form<SelectForm>,
) -> Result<Response> {
    apply(&session, &headers, |wizard| {
        wizard
            .select(&form.field, &form.value)
            .map_err(AppError::from)
    })
    .await
}

/// Advance one step.
#[instrument(skip(session, headers))]
pub async fn next(session: Session, headers: HeaderMap) -> Result<Response> {
    apply(&session, &headers, |wizard| {
        wizard.next();
        Ok(())
    })
    .await
}

/// Go back one step.
#[instrument(skip(session, headers))]
pub async fn back(session: Session, headers: HeaderMap) -> Result<Response> {
    apply(&session, &headers, |wizard| {
        wizard.back();
        Ok(())
    })
    .await
}

/// Jump to a step from the progress indicator.
#[instrument(skip(session, headers))]
pub async fn jump(
    session: Session,
    headers: HeaderMap,
    Path(step): Path<i64>,
) -> Result<Response> {
    let step = WizardStep::try_from(step)?;
    apply(&session, &headers, |wizard| {
        wizard.jump_to(step);
        Ok(())
    })
    .await
}

/// Finish the design and announce it.
#[instrument(skip(session, headers))]
pub async fn commit(session: Session, headers: HeaderMap) -> Result<Response> {
    let wizard = load_wizard(&session).await?;
    let design = wizard.commit();
    let notification = design.saved_notification();

    let price = design.price.to_string();
    add_breadcrumb(
        "configurator",
        "Custom design committed",
        Some(&[
            ("fabric", design.selection.fabric.id()),
            ("price", price.as_str()),
        ]),
    );
    tracing::info!(fabric = design.selection.fabric.id(), %price, "Custom design committed");

    if is_htmx(&headers) {
        let trigger = notify::hx_trigger(&notification, false);
        return Ok(notify::with_trigger(respond(&headers, &wizard), trigger));
    }

    notify::push(&session, notification).await;
    Ok(Redirect::to("/customize").into_response())
}

#[cfg(test)]
mod tests {
    use threadline_core::configurator::OptionChoice;

    use super::*;

    #[test]
    fn test_view_marks_selection() {
        let mut wizard = Wizard::new();
        wizard.select_option(OptionChoice::Fabric(Fabric::Linen));
        let view = ConfiguratorView::from(&wizard);

        let selected: Vec<_> = view.fabrics.iter().filter(|c| c.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, "linen");
        assert_eq!(selected[0].detail, "+₹500");
        assert_eq!(view.fabrics[0].detail, "Included");
        assert_eq!(view.price, "₹2,499.00");
    }

    #[test]
    fn test_view_steps() {
        let mut wizard = Wizard::new();
        wizard.jump_to(WizardStep::Details);
        let view = ConfiguratorView::from(&wizard);

        assert_eq!(view.step, 3);
        assert!(view.steps[0].completed && view.steps[1].completed);
        assert!(view.steps[2].current);
        assert!(!view.steps[3].completed && !view.steps[3].current);
        assert!(!view.is_first && !view.is_last);
    }
}
