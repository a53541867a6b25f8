//! Data every full page needs: header navigation, cart badge and toasts.

use axum::http::HeaderMap;
use threadline_core::Notification;
use tower_sessions::Session;

use crate::middleware::existing_cart_key;
use crate::services::{CartSnapshot, notify};
use crate::state::AppState;

/// A header navigation entry.
#[derive(Debug, Clone, Copy)]
pub struct NavLink {
    pub label: &'static str,
    pub href: &'static str,
}

pub const NAV_LINKS: &[NavLink] = &[
    NavLink {
        label: "Men",
        href: "/products?category=men",
    },
    NavLink {
        label: "Women",
        href: "/products?category=women",
    },
    NavLink {
        label: "Accessories",
        href: "/products?category=accessories",
    },
    NavLink {
        label: "Build Your Own",
        href: "/customize",
    },
];

/// Shared page chrome.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub cart_count: u32,
    /// A cart change is still syncing; add-to-cart buttons render disabled.
    pub cart_loading: bool,
    pub notifications: Vec<Notification>,
}

impl Layout {
    /// Read the cart badge and drain pending notifications.
    pub async fn load(state: &AppState, session: &Session) -> Self {
        let cart = cart_snapshot(state, session).await;
        Self {
            cart_count: cart.cart.item_count(),
            cart_loading: cart.is_loading,
            notifications: notify::take(session).await,
        }
    }

    #[must_use]
    pub const fn nav(&self) -> &'static [NavLink] {
        NAV_LINKS
    }
}

/// Units in the session's cart; zero if it has none.
pub async fn cart_count(state: &AppState, session: &Session) -> u32 {
    cart_snapshot(state, session).await.cart.item_count()
}

/// Latest state of the session's cart; empty if it has none.
async fn cart_snapshot(state: &AppState, session: &Session) -> CartSnapshot {
    let key = match existing_cart_key(session).await {
        Ok(Some(key)) => key,
        Ok(None) => return CartSnapshot::default(),
        Err(e) => {
            tracing::warn!("Failed to read cart key from session: {e}");
            return CartSnapshot::default();
        }
    };
    match state.carts().get(key.as_str()).await {
        Some(store) => store.snapshot(),
        None => CartSnapshot::default(),
    }
}

/// Whether the request came from HTMX and expects a fragment.
#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("hx-request")
        .is_some_and(|v| v.as_bytes() == b"true")
}
