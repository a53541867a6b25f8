//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (Shopify reachable)
//!
//! # Products
//! GET  /products               - Product listing (?category, ?search, ?sort, ?view)
//! GET  /product/{handle}       - Product detail (?image, ?quantity, ?<Option>=<value>)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (count badge + HX-Trigger, or redirect)
//! POST /cart/update            - Update quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove item (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout               - Redirect to Shopify checkout
//!
//! # Configurator
//! GET  /customize              - Build-your-own page
//! POST /customize/select       - Change one selection
//! POST /customize/next         - Next step
//! POST /customize/back         - Previous step
//! POST /customize/step/{step}  - Jump to a step
//! POST /customize/commit       - Save the design
//!
//! # Account
//! GET  /account                - Account placeholder
//! POST /wishlist               - Wishlist placeholder (toast)
//! ```

pub mod account;
pub mod cart;
pub mod customize;
pub mod home;
pub mod layout;
pub mod products;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::middleware::{create_session_layer, request_id_middleware};
use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the configurator routes router.
pub fn customize_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(customize::show))
        .route("/select", post(customize::select))
        .route("/next", post(customize::next))
        .route("/back", post(customize::back))
        .route("/step/{step}", post(customize::jump))
        .route("/commit", post(customize::commit))
}

/// Create all page routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/products", get(products::index))
        .route("/product/{handle}", get(products::show))
        .nest("/cart", cart_routes())
        .route("/checkout", get(cart::checkout))
        .nest("/customize", customize_routes())
        .route("/account", get(account::index))
        .route("/wishlist", post(account::wishlist))
}

/// Assemble the application: routes, static files and the middleware stack.
///
/// Sentry layers are added by the binary so tests run without a client.
pub fn build_app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .nest_service("/static", ServeDir::new("crates/storefront/static"))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the Storefront API cannot be queried.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.storefront().get_products(1, None).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!("Readiness check failed: {e}");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
