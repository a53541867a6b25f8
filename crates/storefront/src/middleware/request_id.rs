//! Request ID middleware for request tracing and correlation.
//!
//! An upstream `x-request-id` is trusted only when it is short and made of
//! URL-safe characters; otherwise a UUID v4 is minted. The ID is recorded
//! on the current span, tagged on the Sentry scope, stored as a
//! [`RequestId`] extension for handlers, and echoed in the response.

use axum::{
    extract::{FromRequestParts, Request},
    http::{HeaderValue, request::Parts},
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_UPSTREAM_LEN: usize = 64;

/// The current request's ID. Extracting it never fails; outside the
/// middleware it is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestId(pub String);

impl<S: Send + Sync> FromRequestParts<S> for RequestId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Self>().cloned().unwrap_or_default())
    }
}

fn upstream_id(request: &Request) -> Option<String> {
    let raw = request.headers().get(REQUEST_ID_HEADER)?.to_str().ok()?;
    let valid = !raw.is_empty()
        && raw.len() <= MAX_UPSTREAM_LEN
        && raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'));
    valid.then(|| raw.to_string())
}

/// Middleware that ensures every request has a unique request ID.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = upstream_id(&request).unwrap_or_else(|| Uuid::new_v4().to_string());

    Span::current().record("request_id", &request_id);
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, routing::get};
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        Router::new()
            .route("/", get(|RequestId(id): RequestId| async move { id }))
            .layer(axum::middleware::from_fn(request_id_middleware))
    }

    async fn call(header: Option<&str>) -> (String, String) {
        let mut builder = axum::http::Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(REQUEST_ID_HEADER, value);
        }
        let response = app()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let echoed = response.headers()[REQUEST_ID_HEADER]
            .to_str()
            .unwrap()
            .to_string();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (echoed, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn upstream_id_is_kept() {
        let (echoed, seen) = call(Some("cf-ray-8a1b2c")).await;
        assert_eq!(echoed, "cf-ray-8a1b2c");
        assert_eq!(seen, "cf-ray-8a1b2c");
    }

    #[tokio::test]
    async fn junk_upstream_id_is_replaced() {
        let (echoed, seen) = call(Some("<script>")).await;
        assert_ne!(echoed, "<script>");
        assert!(Uuid::parse_str(&echoed).is_ok());
        assert_eq!(echoed, seen);
    }

    #[tokio::test]
    async fn missing_id_is_generated() {
        let (echoed, _) = call(None).await;
        assert!(Uuid::parse_str(&echoed).is_ok());
    }
}
