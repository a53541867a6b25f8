//! Account and wishlist route handlers.
//!
//! There are no customer accounts yet; the page is a placeholder and the
//! wishlist only announces itself.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use threadline_core::Notification;
use tower_sessions::Session;

use crate::filters;
use crate::routes::layout::{Layout, is_htmx};
use crate::services::notify;
use crate::state::AppState;

/// Account page template.
#[derive(Template, WebTemplate)]
#[template(path = "account.html")]
pub struct AccountTemplate {
    pub layout: Layout,
}

/// Display account page.
pub async fn index(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    AccountTemplate {
        layout: Layout::load(&state, &session).await,
    }
}

/// Wishlist toggle. Not built yet, so it just says so.
pub async fn wishlist(session: Session, headers: HeaderMap) -> Response {
    let notification = Notification::info("Wishlist feature coming soon!");

    if is_htmx(&headers) {
        let trigger = notify::hx_trigger(&notification, false);
        return notify::with_trigger(StatusCode::NO_CONTENT, trigger);
    }

    notify::push(&session, notification).await;
    Redirect::to("/products").into_response()
}
