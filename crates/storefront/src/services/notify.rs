//! Shopper notifications (toasts).
//!
//! Full-page responses drain a session flash queue into the layout; HTMX
//! fragment responses carry the notification in an `HX-Trigger` header as
//! `{"notify": {...}}`, which the page script turns into a toast.

use axum::{
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
};
use threadline_core::Notification;
use tower_sessions::Session;

use crate::models::session_keys;

/// Response header HTMX reads client-side events from.
pub static HX_TRIGGER: HeaderName = HeaderName::from_static("hx-trigger");

/// Queue a notification for the next full page render.
///
/// Session store failures are logged, not surfaced; a lost toast never
/// fails the request.
pub async fn push(session: &Session, notification: Notification) {
    let mut queue = pending(session).await;
    queue.push(notification);
    if let Err(e) = session.insert(session_keys::FLASH, queue).await {
        tracing::error!("Failed to queue notification: {e}");
    }
}

/// Drain queued notifications.
pub async fn take(session: &Session) -> Vec<Notification> {
    session
        .remove::<Vec<Notification>>(session_keys::FLASH)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

async fn pending(session: &Session) -> Vec<Notification> {
    session
        .get::<Vec<Notification>>(session_keys::FLASH)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// `HX-Trigger` header value announcing `notification`, plus a
/// `cart-updated` event when the cart changed.
#[must_use]
pub fn hx_trigger(notification: &Notification, cart_updated: bool) -> Option<HeaderValue> {
    let mut events = serde_json::Map::new();
    events.insert(
        "notify".to_string(),
        serde_json::to_value(notification).ok()?,
    );
    if cart_updated {
        events.insert("cart-updated".to_string(), serde_json::Value::Null);
    }
    HeaderValue::from_str(&ascii_json(&serde_json::Value::Object(events).to_string())).ok()
}

/// `HX-Trigger` value for a cart change with nothing to announce.
pub static CART_UPDATED: HeaderValue = HeaderValue::from_static("cart-updated");

/// Attach an `HX-Trigger` header to a fragment response.
pub fn with_trigger(response: impl IntoResponse, trigger: Option<HeaderValue>) -> Response {
    let mut response = response.into_response();
    if let Some(value) = trigger {
        response.headers_mut().insert(HX_TRIGGER.clone(), value);
    }
    response
}

/// Escape non-ASCII characters as `\uXXXX`; header values must be ASCII.
fn ascii_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::middleware::session_store;

    #[tokio::test]
    async fn flash_queue_drains_in_order() {
        let session = Session::new(None, Arc::new(session_store()), None);

        push(&session, Notification::success("Added to cart!")).await;
        push(&session, Notification::info("Wishlist feature coming soon!")).await;

        let drained = take(&session).await;
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].message, "Added to cart!");
        assert!(take(&session).await.is_empty());
    }

    #[test]
    fn hx_trigger_payload() {
        let n = Notification::success("Added to cart!").with_description("2x Oxford Shirt");
        let header = hx_trigger(&n, true).unwrap();
        let json: serde_json::Value = serde_json::from_str(header.to_str().unwrap()).unwrap();

        assert_eq!(json["notify"]["kind"], "success");
        assert_eq!(json["notify"]["description"], "2x Oxford Shirt");
        assert!(json.get("cart-updated").is_some());
    }

    #[test]
    fn hx_trigger_escapes_non_ascii() {
        let n = Notification::success("Saved").with_description("Total ₹3,499.00");
        let header = hx_trigger(&n, false).unwrap();
        let raw = header.to_str().unwrap();
        assert!(raw.contains("\\u20b9"));

        let json: serde_json::Value = serde_json::from_str(raw).unwrap();
        assert_eq!(json["notify"]["description"], "Total ₹3,499.00");
        assert!(json.get("cart-updated").is_none());
    }
}
